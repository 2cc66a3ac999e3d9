//! The arithmetic of the single instruction.
//!
//! The instruction computes `operand - accumulator`.  What happens
//! next depends on the arithmetic mode:
//!
//! | Mode   | Result                                     | Skip when               |
//! | ------ | ------------------------------------------ | ----------------------- |
//! | strict | `operand - acc`                            | `acc > operand` (borrow)|
//! | dumb   | `acc` for the output port, else as strict  | `result & sign_mask != 0` |
use base::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subtraction {
    pub result: Word,
    pub skip: bool,
}

/// Perform the subtraction of the single instruction.
///
/// `to_output` is true when the operand address is the output port;
/// only dumb mode cares.  `sign_mask` is the top bit of the masked
/// address range.
#[must_use]
pub fn subtract(
    mode: ArithmeticMode,
    operand: Word,
    acc: Word,
    to_output: bool,
    sign_mask: Word,
) -> Subtraction {
    match mode {
        ArithmeticMode::Strict => Subtraction {
            result: operand.wrapping_sub(acc),
            skip: acc > operand,
        },
        ArithmeticMode::Dumb => {
            let result = if to_output {
                acc
            } else {
                operand.wrapping_sub(acc)
            };
            Subtraction {
                result,
                skip: result & sign_mask != 0,
            }
        }
    }
}
