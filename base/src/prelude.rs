//! The prelude exports the items which are useful in representing
//! things to do with the RSSB machine.  Providing this prelude is the
//! main purpose of the base crate.
pub use super::numeric::{scan_char_literal, scan_integer};
pub use super::target::{AssemblyTarget, WriteFailed};
pub use super::types::*;
