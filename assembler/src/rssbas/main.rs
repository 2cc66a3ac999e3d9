use std::error::Error;
use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::io::{self, Write};

use clap::ArgAction::{Append, Set};
use clap::Parser;
use tracing::{event, span, Level};
use tracing_subscriber::prelude::*;

use assembler::*;
use base::prelude::*;
use cpu::{MemoryConfiguration, StreamConsole, Vm, DEFAULT_CAPACITY};

/// Assembler for the RSSB one-instruction computer.  Prints the
/// assembled memory image.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Files from which assembly source is read, in order.
    #[clap(action = Append, required = true)]
    input: Vec<OsString>,

    /// Number of words of memory to assemble into.
    #[clap(action = Set, long, default_value_t = DEFAULT_CAPACITY)]
    memory_size: Word,

    /// Give up if any part of the program needs more than this many
    /// passes to resolve its forward references.
    #[clap(action = Set, long, default_value_t = DEFAULT_MAX_PASSES)]
    max_passes: usize,
}

#[derive(Debug)]
enum Fail {
    /// We initialised the assembler but then it fails.
    AsmFail(AssemblerFailure),
    /// We were not able to correctly initialise the assembler.
    InitialisationFailure(String),
    /// The listing could not be written.
    ListingFailure(io::Error),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::AsmFail(assembler_failure) => assembler_failure.fmt(f),
            Fail::InitialisationFailure(msg) => f.write_str(msg.as_str()),
            Fail::ListingFailure(e) => write!(f, "failed to write listing: {e}"),
        }
    }
}

impl Error for Fail {}

fn run_assembler() -> Result<(), Fail> {
    let cli = Cli::parse();

    // See
    // https://docs.rs/tracing-subscriber/0.2.19/tracing_subscriber/fmt/index.html#filtering-events-with-environment-variables
    // for instructions on how to select which trace messages get
    // printed.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Err(e) => {
            return Err(Fail::InitialisationFailure(format!(
                "failed to initialise tracing filter (perhaps there is a problem with environment variables): {e}"
            )));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let span = span!(Level::ERROR, "assemble", input=?cli.input);
    let _enter = span.enter();

    let config = MemoryConfiguration {
        capacity: cli.memory_size,
    };
    // The image is never run, so it needs no real input or output.
    let mut vm = Vm::new(&config, StreamConsole::new(io::empty(), io::sink()))
        .map_err(|e| Fail::InitialisationFailure(e.to_string()))?;
    let options = AssemblerOptions {
        max_passes: cli.max_passes,
    };
    let result = assemble_files(&cli.input, &mut vm, &options).map_err(Fail::AsmFail);
    match &result {
        Err(e) => {
            event!(Level::ERROR, "assembly failed: {:?}", e);
        }
        Ok(_) => {
            event!(
                Level::INFO,
                "assembly succeeded, footprint is {:#x}",
                vm.memory().footprint()
            );
        }
    }
    result?;

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", vm.listing())
        .and_then(|()| stdout.flush())
        .map_err(Fail::ListingFailure)
}

fn main() {
    unsafe { backtrace_on_stack_overflow::enable() };

    match run_assembler() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
