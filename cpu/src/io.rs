//! The console: the outside world as seen through the input and
//! output ports.
//!
//! The machine never touches stdin or stdout directly; it always
//! goes through a [`Console`].  Each unit of input or output is one
//! byte.
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::io::{self, ErrorKind, Read, Write};

use tracing::{event, Level};

use base::prelude::Word;

/// The word read from the input port once input is exhausted.
pub const END_OF_INPUT: Word = Word::MAX;

#[derive(Debug)]
pub enum TransferFailed {
    Input(io::Error),
    Output(io::Error),
}

impl Display for TransferFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            TransferFailed::Input(e) => write!(f, "failed to read input: {e}"),
            TransferFailed::Output(e) => write!(f, "failed to write output: {e}"),
        }
    }
}

impl Error for TransferFailed {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TransferFailed::Input(e) | TransferFailed::Output(e) => Some(e),
        }
    }
}

pub trait Console {
    /// Obtain one unit of input, blocking until it is available.
    /// Once input is exhausted this returns [`END_OF_INPUT`].
    ///
    /// # Errors
    ///
    /// Fails when the underlying input cannot be read.
    fn read_unit(&mut self) -> Result<Word, TransferFailed>;

    /// Emit one unit of output.
    ///
    /// # Errors
    ///
    /// Fails when the underlying output cannot be written.
    fn write_unit(&mut self, unit: Word) -> Result<(), TransferFailed>;

    /// # Errors
    ///
    /// Fails when buffered output cannot be written.
    fn flush(&mut self) -> Result<(), TransferFailed> {
        Ok(())
    }
}

/// A console backed by a byte reader and a byte writer.  Output
/// units are truncated to their low eight bits.
pub struct StreamConsole<R, W> {
    input: R,
    output: W,
}

impl<R, W> Debug for StreamConsole<R, W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("StreamConsole").finish_non_exhaustive()
    }
}

impl<R: Read, W: Write> StreamConsole<R, W> {
    pub fn new(input: R, output: W) -> StreamConsole<R, W> {
        StreamConsole { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl StreamConsole<io::Stdin, io::Stdout> {
    #[must_use]
    pub fn stdio() -> Self {
        StreamConsole::new(io::stdin(), io::stdout())
    }
}

impl<R: Read, W: Write> Console for StreamConsole<R, W> {
    fn read_unit(&mut self) -> Result<Word, TransferFailed> {
        let mut buf = [0_u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => {
                    event!(Level::TRACE, "end of input");
                    return Ok(END_OF_INPUT);
                }
                Ok(_) => return Ok(Word::from(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransferFailed::Input(e)),
            }
        }
    }

    fn write_unit(&mut self, unit: Word) -> Result<(), TransferFailed> {
        let byte: u8 = unit.to_le_bytes()[0];
        self.output
            .write_all(&[byte])
            .map_err(TransferFailed::Output)
    }

    fn flush(&mut self) -> Result<(), TransferFailed> {
        self.output.flush().map_err(TransferFailed::Output)
    }
}

#[test]
fn test_stream_console_reads_bytes_then_end_of_input() {
    let mut console = StreamConsole::new(&b"hi"[..], Vec::new());
    assert_eq!(console.read_unit().unwrap(), Word::from(b'h'));
    assert_eq!(console.read_unit().unwrap(), Word::from(b'i'));
    assert_eq!(console.read_unit().unwrap(), END_OF_INPUT);
    assert_eq!(console.read_unit().unwrap(), END_OF_INPUT);
}

#[test]
fn test_stream_console_writes_low_byte() {
    let mut console = StreamConsole::new(io::empty(), Vec::new());
    console.write_unit(0x141).unwrap();
    console.write_unit(Word::from(b'!')).unwrap();
    console.flush().unwrap();
    assert_eq!(console.output().as_slice(), b"A!");
}
