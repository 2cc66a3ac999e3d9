//! The interface through which the assembler places words into
//! memory.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use super::types::{ArithmeticMode, Word};

/// Returned when a word cannot be written because the write cursor
/// is outside memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteFailed {
    pub address: Word,
    pub capacity: Word,
}

impl Display for WriteFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot write a word at address {:#x}: memory holds only {:#x} words",
            self.address, self.capacity
        )
    }
}

impl Error for WriteFailed {}

/// Something the assembler can emit code into.  The assembler only
/// ever writes at the cursor, reads the cursor back, or moves it.
pub trait AssemblyTarget {
    /// Write `word` at the cursor and advance the cursor by one.
    ///
    /// # Errors
    ///
    /// Fails when the cursor is not inside memory.
    fn write_word(&mut self, word: Word) -> Result<(), WriteFailed>;

    fn cursor(&self) -> Word;

    fn set_cursor(&mut self, address: Word);

    /// Select the arithmetic mode requested by the program's
    /// options.
    fn set_arithmetic_mode(&mut self, mode: ArithmeticMode);
}
