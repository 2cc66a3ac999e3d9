use std::ffi::OsString;
use std::io::Write;

use tempfile::NamedTempFile;

use assembler::*;
use base::prelude::*;
use cpu::{MemoryConfiguration, RunOutcome, StreamConsole, Vm};

type TestVm = Vm<StreamConsole<&'static [u8], Vec<u8>>>;

const MACROS: &str = "
.macro putc k
  rssb A
  rssb k
  rssb out
  rssb zero
.end

.macro halt
  rssb A
  rssb IP
  rssb IP
.end
";

fn source_file(body: &str) -> NamedTempFile {
    let mut f = tempfile::Builder::new()
        .suffix(".rssb")
        .tempfile()
        .expect("should be able to create a temporary file");
    f.write_all(body.as_bytes())
        .expect("should be able to write a temporary file");
    f
}

fn new_vm(input: &'static [u8]) -> TestVm {
    Vm::new(
        &MemoryConfiguration::default(),
        StreamConsole::new(input, Vec::new()),
    )
    .expect("default memory configuration should be valid")
}

fn assemble_sources(sources: &[&str], vm: &mut TestVm) -> Result<Program, AssemblerFailure> {
    let files: Vec<NamedTempFile> = sources.iter().map(|s| source_file(s)).collect();
    let names: Vec<OsString> = files
        .iter()
        .map(|f| f.path().as_os_str().to_owned())
        .collect();
    assemble_files(&names, vm, &AssemblerOptions::default())
}

fn run_sources(sources: &[&str], input: &'static [u8]) -> (RunOutcome, Vec<u8>) {
    let mut vm = new_vm(input);
    if let Err(e) = assemble_sources(sources, &mut vm) {
        panic!("test program should assemble: {e}");
    }
    let outcome = match vm.run(Some(10_000)) {
        Ok(outcome) => outcome,
        Err(alarm) => panic!("test program should run without an alarm: {alarm}"),
    };
    (outcome, vm.into_console().into_parts().1)
}

#[test]
fn test_hello() {
    let program = "
putc h
putc i
halt
h:
  rssb -72
i:
  rssb -105
";
    let (outcome, output) = run_sources(&[MACROS, program], b"");
    assert_eq!(outcome, RunOutcome::Halted { steps: 9 });
    assert_eq!(output, b"Hi");
}

#[test]
fn test_dumb_mode_outputs_accumulator() {
    let program = "
.option dumb
.macro putc k
  rssb A
  rssb k
  rssb out
.end
.macro halt
  rssb A
  rssb IP
  rssb IP
.end
putc oh
putc kay
halt
oh:
  rssb 79
kay:
  rssb 75
";
    let (outcome, output) = run_sources(&[program], b"");
    assert_eq!(outcome, RunOutcome::Halted { steps: 9 });
    assert_eq!(output, b"OK");
}

#[test]
fn test_echo_one_character() {
    let program = "
rssb A
rssb in
rssb zero
rssb zero
rssb out
rssb zero
halt
";
    let (outcome, output) = run_sources(&[MACROS, program], b"x");
    assert_eq!(outcome, RunOutcome::Halted { steps: 7 });
    assert_eq!(output, b"x");
}

#[test]
fn test_listing_of_assembled_image() {
    let mut vm = new_vm(b"");
    if let Err(e) = assemble_sources(&["rssb 7\nrssb out\n"], &mut vm) {
        panic!("test program should assemble: {e}");
    }
    let listing = vm.listing().to_string();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "0x00000000: rssb 0x00000005");
    assert_eq!(lines[5], "0x00000005: rssb 0x00000007");
    assert_eq!(lines[6], "0x00000006: rssb 0x00000004");
}

#[test]
fn test_syntax_error_names_file_and_line() {
    let mut vm = new_vm(b"");
    let bad = source_file("rssb 1\n.origin\n");
    let name = bad.path().as_os_str().to_owned();
    match assemble_files([&name], &mut vm, &AssemblerOptions::default()) {
        Err(AssemblerFailure::SyntaxError { filename, line, .. }) => {
            assert_eq!(filename, name);
            assert_eq!(line, 2);
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn test_program_too_big_for_memory() {
    let mut vm = Vm::new(
        &MemoryConfiguration { capacity: 8 },
        StreamConsole::new(&b""[..], Vec::new()),
    )
    .expect("test memory configuration should be valid");
    let program = ".macro four\nrssb 1\nrssb 2\nrssb 3\nrssb 4\n.end\nfour\n";
    match assemble_sources(&[program], &mut vm) {
        Err(AssemblerFailure::CompileError(CompileFailure::InMacroCall { inner, .. })) => {
            assert!(matches!(
                *inner,
                CompileFailure::CapacityExceeded {
                    error: WriteFailed {
                        address: 8,
                        capacity: 8
                    },
                    ..
                }
            ));
        }
        other => panic!("expected capacity to be exceeded, got {other:?}"),
    }
}
