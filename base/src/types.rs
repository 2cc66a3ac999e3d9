//! Words, reserved addresses and arithmetic modes.
//!
//! RSSB memory is memory-mapped in the same way as everything else
//! about the machine: the instruction pointer and the accumulator
//! are ordinary memory locations which simply happen to live at the
//! bottom of the address space.
use std::fmt::{self, Display, Formatter};

/// The unit of both memory and registers.
pub type Word = u32;

/// The five addresses which have special read/write behaviour.
///
/// The discriminants are the addresses themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReservedAddress {
    /// Instruction pointer register.
    Ip = 0,
    /// Accumulator register.
    Acc = 1,
    /// Writes here are discarded.
    Zero = 2,
    /// Reads from here consume one unit of input.
    In = 3,
    /// Writes to here produce one unit of output.
    Out = 4,
}

impl ReservedAddress {
    pub const ALL: [ReservedAddress; 5] = [
        ReservedAddress::Ip,
        ReservedAddress::Acc,
        ReservedAddress::Zero,
        ReservedAddress::In,
        ReservedAddress::Out,
    ];

    /// The number of reserved addresses.  This is also the first
    /// address at which a program can be placed.
    pub const COUNT: Word = 5;

    #[must_use]
    pub const fn address(self) -> Word {
        self as Word
    }

    /// Look up one of the built-in register names.  The comparison
    /// is case-insensitive.
    ///
    /// `$0` is also a name for the discard address, though the
    /// assembler's relative-address rule normally sees it first.
    #[must_use]
    pub fn from_register_name(name: &str) -> Option<ReservedAddress> {
        const NAMES: [(&str, ReservedAddress); 10] = [
            ("A", ReservedAddress::Acc),
            ("AC", ReservedAddress::Acc),
            ("IP", ReservedAddress::Ip),
            ("PC", ReservedAddress::Ip),
            ("ZERO", ReservedAddress::Zero),
            ("$0", ReservedAddress::Zero),
            ("IN", ReservedAddress::In),
            ("INPUT", ReservedAddress::In),
            ("OUT", ReservedAddress::Out),
            ("OUTPUT", ReservedAddress::Out),
        ];
        NAMES
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, reserved)| *reserved)
    }

    #[must_use]
    pub fn try_from_address(address: Word) -> Option<ReservedAddress> {
        ReservedAddress::ALL
            .into_iter()
            .find(|r| r.address() == address)
    }
}

impl Display for ReservedAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReservedAddress::Ip => "IP",
            ReservedAddress::Acc => "A",
            ReservedAddress::Zero => "ZERO",
            ReservedAddress::In => "IN",
            ReservedAddress::Out => "OUT",
        })
    }
}

/// Selects how the single instruction interprets its subtraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArithmeticMode {
    /// Skip on unsigned borrow.
    #[default]
    Strict,
    /// Skip when the result looks negative; writes to the output
    /// port emit the accumulator unchanged.
    Dumb,
}

impl ArithmeticMode {
    /// The `.option` value which selects [`ArithmeticMode::Dumb`].
    pub const DUMB_OPTION: &'static str = "dumb";

    /// Choose a mode from the options accumulated by `.option`
    /// directives.
    pub fn from_options<'a, I>(options: I) -> ArithmeticMode
    where
        I: IntoIterator<Item = &'a str>,
    {
        if options.into_iter().any(|opt| opt == Self::DUMB_OPTION) {
            ArithmeticMode::Dumb
        } else {
            ArithmeticMode::Strict
        }
    }
}

impl Display for ArithmeticMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithmeticMode::Strict => "strict",
            ArithmeticMode::Dumb => "dumb",
        })
    }
}

#[test]
fn test_reserved_addresses_are_dense() {
    for (i, r) in ReservedAddress::ALL.into_iter().enumerate() {
        assert_eq!(r.address(), Word::try_from(i).unwrap());
        assert_eq!(ReservedAddress::try_from_address(r.address()), Some(r));
    }
    assert_eq!(ReservedAddress::try_from_address(ReservedAddress::COUNT), None);
}

#[test]
fn test_register_names_ignore_case() {
    assert_eq!(
        ReservedAddress::from_register_name("a"),
        Some(ReservedAddress::Acc)
    );
    assert_eq!(
        ReservedAddress::from_register_name("Pc"),
        Some(ReservedAddress::Ip)
    );
    assert_eq!(
        ReservedAddress::from_register_name("zero"),
        Some(ReservedAddress::Zero)
    );
    assert_eq!(
        ReservedAddress::from_register_name("Input"),
        Some(ReservedAddress::In)
    );
    assert_eq!(
        ReservedAddress::from_register_name("OUTPUT"),
        Some(ReservedAddress::Out)
    );
    assert_eq!(ReservedAddress::from_register_name("loop"), None);
}

#[test]
fn test_mode_from_options() {
    assert_eq!(ArithmeticMode::from_options([]), ArithmeticMode::Strict);
    assert_eq!(
        ArithmeticMode::from_options(["verbose", "dumb"]),
        ArithmeticMode::Dumb
    );
    assert_eq!(
        ArithmeticMode::from_options(["DUMB"]),
        ArithmeticMode::Strict
    );
}
