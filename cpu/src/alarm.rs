//! Runtime faults.
//!
//! Any of these stops the machine.  There is no way for a program to
//! catch them.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use base::prelude::Word;

use super::io::TransferFailed;

#[derive(Debug)]
pub enum Alarm {
    /// The instruction pointer (after masking) is outside memory.
    InvalidCodeAddress { ip: Word },
    /// The operand of the instruction at `ip` (after masking) is
    /// outside memory.
    InvalidMemoryAccess { address: Word, ip: Word },
    InputFailed { ip: Word, error: TransferFailed },
    OutputFailed { ip: Word, error: TransferFailed },
}

impl Display for Alarm {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Alarm::InvalidCodeAddress { ip } => write!(f, "invalid code address {ip:#x}"),
            Alarm::InvalidMemoryAccess { address, ip } => {
                write!(f, "invalid memory access to {address:#x} at {ip:#x}")
            }
            Alarm::InputFailed { ip, error } => {
                write!(f, "input failed at {ip:#x}: {error}")
            }
            Alarm::OutputFailed { ip, error } => {
                write!(f, "output failed at {ip:#x}: {error}")
            }
        }
    }
}

impl Error for Alarm {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Alarm::InputFailed { error, .. } | Alarm::OutputFailed { error, .. } => Some(error),
            Alarm::InvalidCodeAddress { .. } | Alarm::InvalidMemoryAccess { .. } => None,
        }
    }
}
