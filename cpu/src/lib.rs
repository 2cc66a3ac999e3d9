//! This crate emulates the RSSB machine: its memory (including the
//! five memory-mapped registers), the single "reverse subtract and
//! skip if borrow" instruction, and the console through which the
//! input and output ports talk to the outside world.
#![crate_name = "cpu"]
#![deny(unsafe_code)]

mod alarm;
mod alu;
mod control;
mod io;
mod memory;
mod vm;

pub use alarm::Alarm;
pub use alu::{subtract, Subtraction};
pub use control::ControlUnit;
pub use io::{Console, StreamConsole, TransferFailed, END_OF_INPUT};
pub use memory::{
    Listing, MemoryConfiguration, MemoryConfigurationError, MemoryGeometry, MemoryUnit,
    DEFAULT_CAPACITY,
};
pub use vm::{RunOutcome, Vm};
