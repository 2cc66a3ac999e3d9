//! Assembler for RSSB, the "reverse subtract and skip if borrow"
//! one-instruction computer.
//!
//! Source text is parsed into a [`Program`], which is then compiled
//! into anything implementing [`base::prelude::AssemblyTarget`]
//! (normally the simulator's memory).
#![deny(unreachable_pub)]
#![deny(unsafe_code)]
#![warn(clippy::must_use_candidate)]
#![warn(clippy::manual_string_new)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::return_self_not_must_use)]
#![warn(clippy::wildcard_imports)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::items_after_statements)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::pedantic)]
#![allow(clippy::enum_glob_use)] // fix later
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)] // fix soon

mod ast;
mod driver;
mod eval;
mod lexer;
mod parser;
mod state;
mod symbol;
mod types;

pub use ast::Program;
pub use driver::*;
pub use symbol::SymbolName;
pub use types::{AssemblerFailure, CompileFailure, LineNumber, Location};
