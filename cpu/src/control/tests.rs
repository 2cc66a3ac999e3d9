use std::io;

use base::prelude::*;

use super::ControlUnit;
use crate::alarm::Alarm;
use crate::io::StreamConsole;
use crate::memory::{MemoryConfiguration, MemoryUnit};

type TestConsole = StreamConsole<&'static [u8], Vec<u8>>;

fn setup(capacity: Word, mode: ArithmeticMode) -> (ControlUnit, MemoryUnit) {
    let mem = MemoryUnit::new(&MemoryConfiguration { capacity })
        .expect("test memory configuration should be valid");
    (ControlUnit::new(mode), mem)
}

fn console_with_input(input: &'static [u8]) -> TestConsole {
    StreamConsole::new(input, Vec::new())
}

fn poke(mem: &mut MemoryUnit, address: Word, value: Word) {
    *mem.get_mut(address).expect("test address should be valid") = value;
}

fn step(control: &ControlUnit, mem: &mut MemoryUnit, console: &mut TestConsole) {
    if let Err(e) = control.execute_instruction(mem, console) {
        panic!("instruction should execute without an alarm, but got: {e}");
    }
}

#[test]
fn test_strict_borrow_skips() {
    let (control, mut mem) = setup(16, ArithmeticMode::Strict);
    let mut console = console_with_input(b"");
    poke(&mut mem, 5, 10);
    poke(&mut mem, 10, 3);
    mem.set_register(ReservedAddress::Acc, 5);
    step(&control, &mut mem, &mut console);
    assert_eq!(mem.register(ReservedAddress::Acc), 0xFFFF_FFFE);
    assert_eq!(mem.fetch(10), Some(0xFFFF_FFFE));
    assert_eq!(mem.register(ReservedAddress::Ip), 7);
}

#[test]
fn test_strict_no_borrow_does_not_skip() {
    let (control, mut mem) = setup(16, ArithmeticMode::Strict);
    let mut console = console_with_input(b"");
    poke(&mut mem, 5, 10);
    poke(&mut mem, 10, 9);
    mem.set_register(ReservedAddress::Acc, 4);
    step(&control, &mut mem, &mut console);
    assert_eq!(mem.register(ReservedAddress::Acc), 5);
    assert_eq!(mem.fetch(10), Some(5));
    assert_eq!(mem.register(ReservedAddress::Ip), 6);
}

#[test]
fn test_dumb_mode_skips_on_sign() {
    let (control, mut mem) = setup(16, ArithmeticMode::Dumb);
    let mut console = console_with_input(b"");
    poke(&mut mem, 5, 10);
    poke(&mut mem, 10, 3);
    mem.set_register(ReservedAddress::Acc, 5);
    step(&control, &mut mem, &mut console);
    assert_eq!(mem.register(ReservedAddress::Acc), 0xFFFF_FFFE);
    assert_eq!(mem.register(ReservedAddress::Ip), 7);

    // With 16 words the sign mask is 8, so 9 - 0 looks negative even
    // though there was no borrow.
    let (control, mut mem) = setup(16, ArithmeticMode::Dumb);
    poke(&mut mem, 5, 10);
    poke(&mut mem, 10, 9);
    step(&control, &mut mem, &mut console);
    assert_eq!(mem.register(ReservedAddress::Acc), 9);
    assert_eq!(mem.register(ReservedAddress::Ip), 7);
}

fn output_test(mode: ArithmeticMode) -> Vec<u8> {
    let (control, mut mem) = setup(256, mode);
    let mut console = console_with_input(b"");
    poke(&mut mem, 5, ReservedAddress::Out.address());
    poke(&mut mem, ReservedAddress::Out.address(), 106);
    mem.set_register(ReservedAddress::Acc, 41);
    step(&control, &mut mem, &mut console);
    // Output never writes back to the port's memory cell.
    assert_eq!(mem.fetch(ReservedAddress::Out.address()), Some(106));
    console.into_parts().1
}

#[test]
fn test_output_in_strict_mode_emits_difference() {
    assert_eq!(output_test(ArithmeticMode::Strict), b"A");
}

#[test]
fn test_output_in_dumb_mode_emits_accumulator() {
    assert_eq!(output_test(ArithmeticMode::Dumb), b")");
}

#[test]
fn test_input_port() {
    let (control, mut mem) = setup(256, ArithmeticMode::Strict);
    let mut console = console_with_input(b"A");
    poke(&mut mem, 5, ReservedAddress::In.address());
    mem.set_register(ReservedAddress::Acc, 1);
    step(&control, &mut mem, &mut console);
    assert_eq!(mem.register(ReservedAddress::Acc), 64);
    assert_eq!(mem.register(ReservedAddress::Ip), 6);
}

#[test]
fn test_discard_address_is_never_written() {
    let (control, mut mem) = setup(16, ArithmeticMode::Strict);
    let mut console = console_with_input(b"");
    let zero = ReservedAddress::Zero.address();
    for address in 5..16 {
        poke(&mut mem, address, zero);
    }
    mem.set_register(ReservedAddress::Acc, 3);
    for _ in 0..5 {
        step(&control, &mut mem, &mut console);
        assert_eq!(mem.fetch(zero), Some(0));
    }
    // Every step borrowed, so execution went 5, 7, 9, 11, 13.
    assert_eq!(mem.register(ReservedAddress::Ip), 15);
    assert_eq!(mem.register(ReservedAddress::Acc), 0u32.wrapping_sub(3));
}

#[test]
fn test_halt_idiom() {
    // Zero-filled memory is a sequence of "rssb IP" instructions.
    let (control, mut mem) = setup(16, ArithmeticMode::Strict);
    let mut console = console_with_input(b"");
    assert!(!control.is_halted(&mem));
    step(&control, &mut mem, &mut console);
    assert!(!control.is_halted(&mem));
    assert_eq!(mem.register(ReservedAddress::Ip), 6);
    assert_eq!(mem.register(ReservedAddress::Acc), 5);
    step(&control, &mut mem, &mut console);
    assert_eq!(mem.register(ReservedAddress::Ip), 2);
    assert_eq!(mem.register(ReservedAddress::Acc), 1);
    assert!(control.is_halted(&mem));
}

#[test]
fn test_registers_are_masked() {
    let (control, mut mem) = setup(16, ArithmeticMode::Strict);
    let mut console = console_with_input(b"");
    mem.set_register(ReservedAddress::Ip, 0x10 + 5);
    poke(&mut mem, 5, 10);
    poke(&mut mem, 10, 3);
    step(&control, &mut mem, &mut console);
    assert_eq!(mem.register(ReservedAddress::Acc), 3);
    assert_eq!(mem.register(ReservedAddress::Ip), 0x10 + 6);
}

#[test]
fn test_invalid_code_address() {
    let (control, mut mem) = setup(100, ArithmeticMode::Strict);
    let mut console = console_with_input(b"");
    mem.set_register(ReservedAddress::Ip, 120);
    match control.execute_instruction(&mut mem, &mut console) {
        Err(Alarm::InvalidCodeAddress { ip: 120 }) => (),
        other => panic!("expected an invalid code address alarm, got {other:?}"),
    }
}

#[test]
fn test_invalid_operand_address_in_mask_hole() {
    // 100 words need a 7-bit mask, so 110 is a masked address which
    // nevertheless does not exist.
    let (control, mut mem) = setup(100, ArithmeticMode::Strict);
    let mut console = console_with_input(b"");
    poke(&mut mem, 5, 110);
    match control.execute_instruction(&mut mem, &mut console) {
        Err(Alarm::InvalidMemoryAccess {
            address: 110,
            ip: 5,
        }) => (),
        other => panic!("expected an invalid memory access alarm, got {other:?}"),
    }
}

#[test]
fn test_output_failure_raises_alarm() {
    struct Broken;

    impl io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let (control, mut mem) = setup(16, ArithmeticMode::Strict);
    let mut console = StreamConsole::new(io::empty(), Broken);
    poke(&mut mem, 5, ReservedAddress::Out.address());
    assert!(matches!(
        control.execute_instruction(&mut mem, &mut console),
        Err(Alarm::OutputFailed { ip: 5, .. })
    ));
}
