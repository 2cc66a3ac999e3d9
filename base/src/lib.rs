//! The `base` crate defines the RSSB-related things which are useful
//! in both the virtual machine and the assembler.  The idea is that
//! the assembler depends on the base crate but does not need to
//! depend on the simulator library itself; it only needs something
//! which implements [`AssemblyTarget`](target::AssemblyTarget).
#![deny(unsafe_code)]
#![warn(clippy::must_use_candidate)]

mod numeric;
mod target;
mod types;

pub mod prelude;
