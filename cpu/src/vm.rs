//! The complete machine: memory, control unit and console.
use tracing::{event, Level};

use base::prelude::*;

use crate::alarm::Alarm;
use crate::control::ControlUnit;
use crate::io::Console;
use crate::memory::{Listing, MemoryConfiguration, MemoryConfigurationError, MemoryUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The machine reached the halt state.
    Halted { steps: u64 },
    /// The step limit was used up before the machine halted.
    StepLimitReached { steps: u64 },
}

#[derive(Debug)]
pub struct Vm<C> {
    control: ControlUnit,
    mem: MemoryUnit,
    console: C,
}

impl<C: Console> Vm<C> {
    /// # Errors
    ///
    /// Fails when the memory configuration is invalid.
    pub fn new(config: &MemoryConfiguration, console: C) -> Result<Vm<C>, MemoryConfigurationError> {
        Ok(Vm {
            control: ControlUnit::default(),
            mem: MemoryUnit::new(config)?,
            console,
        })
    }

    pub fn memory(&self) -> &MemoryUnit {
        &self.mem
    }

    pub fn mode(&self) -> ArithmeticMode {
        self.control.mode()
    }

    pub fn into_console(self) -> C {
        self.console
    }

    pub fn listing(&self) -> Listing<'_> {
        self.mem.listing()
    }

    pub fn is_halted(&self) -> bool {
        self.control.is_halted(&self.mem)
    }

    /// Execute one instruction.
    ///
    /// # Errors
    ///
    /// See [`ControlUnit::execute_instruction`].
    pub fn step(&mut self) -> Result<(), Alarm> {
        self.control
            .execute_instruction(&mut self.mem, &mut self.console)
    }

    /// Run until the machine halts, or until `limit` instructions
    /// have been executed.  With no limit, a program which never
    /// halts runs forever.
    ///
    /// Console output is flushed before returning, whether or not an
    /// alarm occurred.
    ///
    /// # Errors
    ///
    /// Returns the first alarm raised.
    pub fn run(&mut self, limit: Option<u64>) -> Result<RunOutcome, Alarm> {
        event!(
            Level::DEBUG,
            "starting execution at {:#x} in {} mode",
            self.mem.register(ReservedAddress::Ip),
            self.control.mode()
        );
        let mut steps: u64 = 0;
        let outcome = loop {
            if self.is_halted() {
                break Ok(RunOutcome::Halted { steps });
            }
            if limit.is_some_and(|max| steps >= max) {
                break Ok(RunOutcome::StepLimitReached { steps });
            }
            if let Err(alarm) = self.step() {
                break Err(alarm);
            }
            steps += 1;
        };
        event!(Level::DEBUG, "execution stopped: {outcome:?}");
        let ip = self.mem.register(ReservedAddress::Ip);
        match (outcome, self.console.flush()) {
            (Err(alarm), _) => Err(alarm),
            (Ok(_), Err(error)) => Err(Alarm::OutputFailed { ip, error }),
            (Ok(outcome), Ok(())) => Ok(outcome),
        }
    }
}

impl<C> AssemblyTarget for Vm<C> {
    fn write_word(&mut self, word: Word) -> Result<(), WriteFailed> {
        self.mem.put_word(word)
    }

    fn cursor(&self) -> Word {
        self.mem.cursor()
    }

    fn set_cursor(&mut self, address: Word) {
        self.mem.set_cursor(address);
    }

    fn set_arithmetic_mode(&mut self, mode: ArithmeticMode) {
        event!(Level::DEBUG, "selecting {mode} arithmetic");
        self.control.set_mode(mode);
    }
}
