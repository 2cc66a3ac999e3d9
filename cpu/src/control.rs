//! Emulates the control unit of the RSSB machine.
//!
//! There is only one instruction, so there is no decoding to speak
//! of.  Each instruction is a single memory word holding the address
//! of its operand.  Executing it:
//!
//! 1. reads the accumulator and instruction pointer (both masked);
//! 2. fetches the operand address stored at the instruction pointer;
//! 3. loads the operand (from the console if the operand address is
//!    the input port);
//! 4. subtracts the accumulator from the operand (see [`crate::alu`]);
//! 5. stores the result in the accumulator;
//! 6. stores the result at the operand address too, unless that is
//!    the discard address (nothing happens) or the output port (the
//!    result is sent to the console);
//! 7. advances the instruction pointer by one, or by two if the
//!    instruction skips.
//!
//! Control flow is entirely due to step 7 and to programs writing the
//! instruction pointer register.
use tracing::{event, Level};

use base::prelude::*;

use crate::alarm::Alarm;
use crate::alu::{subtract, Subtraction};
use crate::io::Console;
use crate::memory::MemoryUnit;

#[derive(Debug, Default)]
pub struct ControlUnit {
    mode: ArithmeticMode,
}

impl ControlUnit {
    #[must_use]
    pub fn new(mode: ArithmeticMode) -> ControlUnit {
        ControlUnit { mode }
    }

    #[must_use]
    pub fn mode(&self) -> ArithmeticMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ArithmeticMode) {
        self.mode = mode;
    }

    /// The machine stops when the instruction pointer register holds
    /// 2 and the accumulator holds 1.  Executing `rssb IP` twice in
    /// succession reaches exactly this state:
    ///
    /// ```text
    /// rssb IP    ; A' = ip - A, IP = A' + 1
    /// rssb IP    ; A'' = (A' + 1) - A' = 1, IP = A'' + 1 = 2
    /// ```
    ///
    /// The raw register values are compared, without masking.
    #[must_use]
    pub fn is_halted(&self, mem: &MemoryUnit) -> bool {
        mem.register(ReservedAddress::Ip) == 2 && mem.register(ReservedAddress::Acc) == 1
    }

    /// Execute the instruction at the instruction pointer.
    ///
    /// # Errors
    ///
    /// Raises an alarm for an out-of-range instruction pointer or
    /// operand address, or for a failed console transfer.
    pub fn execute_instruction<C: Console + ?Sized>(
        &self,
        mem: &mut MemoryUnit,
        console: &mut C,
    ) -> Result<(), Alarm> {
        let geometry = *mem.geometry();
        let mask = geometry.address_mask();

        let acc: Word = mem.register(ReservedAddress::Acc) & mask;
        let ip: Word = mem.register(ReservedAddress::Ip) & mask;
        let operand_address: Word = match mem.fetch(ip) {
            Some(w) => w & mask,
            None => return Err(Alarm::InvalidCodeAddress { ip }),
        };
        let destination = ReservedAddress::try_from_address(operand_address);

        let operand: Word = if destination == Some(ReservedAddress::In) {
            console
                .read_unit()
                .map_err(|error| Alarm::InputFailed { ip, error })?
        } else {
            match mem.fetch(operand_address) {
                Some(w) => w & mask,
                None => {
                    return Err(Alarm::InvalidMemoryAccess {
                        address: operand_address,
                        ip,
                    })
                }
            }
        };

        let Subtraction { result, skip } = subtract(
            self.mode,
            operand,
            acc,
            destination == Some(ReservedAddress::Out),
            geometry.sign_mask(),
        );
        event!(
            Level::TRACE,
            "[{ip:04x}] rssb {operand_address:#06x}: {operand:04x} - {acc:04x} = {:04x} [{}]",
            result & mask,
            if skip { 'S' } else { ' ' }
        );

        mem.set_register(ReservedAddress::Acc, result);
        match destination {
            Some(ReservedAddress::Out) => console
                .write_unit(result)
                .map_err(|error| Alarm::OutputFailed { ip, error })?,
            Some(ReservedAddress::Zero) => (),
            _ => match mem.get_mut(operand_address) {
                Some(cell) => *cell = result,
                None => {
                    return Err(Alarm::InvalidMemoryAccess {
                        address: operand_address,
                        ip,
                    })
                }
            },
        }

        // Re-read the register, since the store above may have
        // targeted it.
        let next = mem
            .register(ReservedAddress::Ip)
            .wrapping_add(if skip { 2 } else { 1 });
        mem.set_register(ReservedAddress::Ip, next);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
