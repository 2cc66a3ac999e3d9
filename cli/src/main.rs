use std::error::Error;
use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::io::{self, Write};

use clap::ArgAction::{Append, Set, SetTrue};
use clap::Parser;
use tracing::{event, span, Level};
use tracing_subscriber::prelude::*;

use assembler::{assemble_files, AssemblerFailure, AssemblerOptions, DEFAULT_MAX_PASSES};
use base::prelude::*;
use cpu::{Alarm, MemoryConfiguration, RunOutcome, StreamConsole, Vm, DEFAULT_CAPACITY};

/// Assemble and run programs for the RSSB one-instruction computer.
/// The program reads from standard input and writes to standard
/// output.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Source files, assembled in order into a single program.
    #[clap(action = Append, required = true)]
    files: Vec<OsString>,

    /// Number of words of memory.
    #[clap(action = Set, long, default_value_t = DEFAULT_CAPACITY)]
    memory_size: Word,

    /// Give up if any part of the program needs more than this many
    /// passes to resolve its forward references.
    #[clap(action = Set, long, default_value_t = DEFAULT_MAX_PASSES)]
    max_passes: usize,

    /// Stop (unsuccessfully) after executing this many instructions.
    /// By default there is no limit.
    #[clap(action = Set, long)]
    max_steps: Option<u64>,

    /// Print the assembled memory image instead of running it.
    #[clap(action = SetTrue, long)]
    list: bool,
}

#[derive(Debug)]
enum Fail {
    /// The program could not be loaded or assembled.
    AsmFail(AssemblerFailure),
    /// The program raised an alarm.
    RunFail(Alarm),
    /// The program was still running when the step limit ran out.
    StepLimitReached(u64),
    /// The listing could not be written.
    ListingFailure(io::Error),
    /// We were not able to correctly initialise the simulator.
    InitialisationFailure(String),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::AsmFail(e) => e.fmt(f),
            Fail::RunFail(alarm) => write!(f, "execution stopped: {alarm}"),
            Fail::StepLimitReached(steps) => {
                write!(f, "program did not halt within {steps} steps")
            }
            Fail::ListingFailure(e) => write!(f, "failed to write listing: {e}"),
            Fail::InitialisationFailure(msg) => f.write_str(msg.as_str()),
        }
    }
}

impl Error for Fail {}

fn run_simulator() -> Result<(), Fail> {
    let cli = Cli::parse();

    // See
    // https://docs.rs/tracing-subscriber/0.2.19/tracing_subscriber/fmt/index.html#filtering-events-with-environment-variables
    // for instructions on how to select which trace messages get
    // printed.  They go to stderr so that they do not mix with the
    // program's own output.
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

    let span = span!(Level::ERROR, "rssb", files=?cli.files);
    let _enter = span.enter();

    let config = MemoryConfiguration {
        capacity: cli.memory_size,
    };
    let mut vm = Vm::new(&config, StreamConsole::stdio())
        .map_err(|e| Fail::InitialisationFailure(e.to_string()))?;
    let options = AssemblerOptions {
        max_passes: cli.max_passes,
    };
    assemble_files(&cli.files, &mut vm, &options).map_err(Fail::AsmFail)?;
    event!(
        Level::DEBUG,
        "program occupies addresses up to {:#x}",
        vm.memory().footprint()
    );

    if cli.list {
        let mut stdout = io::stdout().lock();
        return write!(stdout, "{}", vm.listing())
            .and_then(|()| stdout.flush())
            .map_err(Fail::ListingFailure);
    }

    match vm.run(cli.max_steps) {
        Ok(RunOutcome::Halted { steps }) => {
            event!(Level::INFO, "program halted after {steps} steps");
            Ok(())
        }
        Ok(RunOutcome::StepLimitReached { steps }) => Err(Fail::StepLimitReached(steps)),
        Err(alarm) => Err(Fail::RunFail(alarm)),
    }
}

fn main() {
    unsafe { backtrace_on_stack_overflow::enable() };

    match run_simulator() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
