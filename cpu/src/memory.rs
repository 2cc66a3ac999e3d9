//! This module emulates the RSSB memory.
//!
//! Memory is a flat array of words addressed from zero.  The first
//! five locations are the memory-mapped registers (see
//! [`ReservedAddress`]).  The instruction pointer and accumulator are
//! read through an address mask, which is derived from the capacity:
//! the mask covers the smallest power of two not smaller than the
//! capacity.  When the capacity is not itself a power of two, some
//! masked addresses lie beyond the end of memory; accessing those is
//! an alarm, not a wrap-around.
use std::error;
use std::fmt::{self, Debug, Display, Formatter};

use tracing::{event, Level};

use base::prelude::*;

/// The memory size used when nothing else is configured.
pub const DEFAULT_CAPACITY: Word = 65536;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfiguration {
    /// Number of words of memory.
    pub capacity: Word,
}

impl Default for MemoryConfiguration {
    fn default() -> Self {
        MemoryConfiguration {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryConfigurationError {
    /// There must be room for at least one word beyond the reserved
    /// addresses.
    TooSmall { capacity: Word },
    /// The host could not provide that much memory.
    AllocationFailed { capacity: Word },
}

impl Display for MemoryConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            MemoryConfigurationError::TooSmall { capacity } => write!(
                f,
                "memory capacity {capacity} is too small; it must be greater than {}",
                ReservedAddress::COUNT
            ),
            MemoryConfigurationError::AllocationFailed { capacity } => write!(
                f,
                "failed to allocate {capacity} words of memory for the RSSB machine"
            ),
        }
    }
}

impl error::Error for MemoryConfigurationError {}

/// The capacity of memory and the masks derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryGeometry {
    capacity: Word,
    address_mask: Word,
    sign_mask: Word,
}

impl MemoryGeometry {
    /// # Errors
    ///
    /// Fails when `capacity` does not exceed the number of reserved
    /// addresses.
    pub fn new(capacity: Word) -> Result<MemoryGeometry, MemoryConfigurationError> {
        if capacity <= ReservedAddress::COUNT {
            return Err(MemoryConfigurationError::TooSmall { capacity });
        }
        let (address_mask, sign_mask) = match capacity.checked_next_power_of_two() {
            Some(m) => (m - 1, m >> 1),
            // The next power of two is 2^32, which covers every word.
            None => (Word::MAX, 1 << (Word::BITS - 1)),
        };
        Ok(MemoryGeometry {
            capacity,
            address_mask,
            sign_mask,
        })
    }

    #[must_use]
    pub fn capacity(&self) -> Word {
        self.capacity
    }

    #[must_use]
    pub fn address_mask(&self) -> Word {
        self.address_mask
    }

    #[must_use]
    pub fn sign_mask(&self) -> Word {
        self.sign_mask
    }

    #[must_use]
    pub fn contains(&self, address: Word) -> bool {
        address < self.capacity
    }
}

pub struct MemoryUnit {
    geometry: MemoryGeometry,
    words: Vec<Word>,
    /// Where the assembler writes the next word.
    cursor: Word,
    /// The highest address ever written by the assembler.
    footprint: Word,
}

impl Debug for MemoryUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        // The words themselves would swamp the output.
        f.debug_struct("MemoryUnit")
            .field("geometry", &self.geometry)
            .field("cursor", &self.cursor)
            .field("footprint", &self.footprint)
            .finish_non_exhaustive()
    }
}

fn allocate_words(capacity: Word) -> Result<Vec<Word>, MemoryConfigurationError> {
    let failed = MemoryConfigurationError::AllocationFailed { capacity };
    let len = usize::try_from(capacity).map_err(|_| failed.clone())?;
    let mut words: Vec<Word> = Vec::new();
    words.try_reserve_exact(len).map_err(|_| failed)?;
    words.resize(len, 0);
    Ok(words)
}

impl MemoryUnit {
    /// Allocate zero-filled memory.  The instruction pointer and the
    /// write cursor both start at the first non-reserved address.
    ///
    /// # Errors
    ///
    /// Fails when the configured capacity is too small, or too large
    /// to allocate.
    pub fn new(config: &MemoryConfiguration) -> Result<MemoryUnit, MemoryConfigurationError> {
        let geometry = MemoryGeometry::new(config.capacity)?;
        let mut words: Vec<Word> = allocate_words(config.capacity)?;
        words[ReservedAddress::Ip.address() as usize] = ReservedAddress::COUNT;
        event!(
            Level::DEBUG,
            "allocated {} words of memory (address mask {:#x}, sign mask {:#x})",
            geometry.capacity(),
            geometry.address_mask(),
            geometry.sign_mask()
        );
        Ok(MemoryUnit {
            geometry,
            words,
            cursor: ReservedAddress::COUNT,
            footprint: 0,
        })
    }

    #[must_use]
    pub fn geometry(&self) -> &MemoryGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn footprint(&self) -> Word {
        self.footprint
    }

    /// Read a word, or `None` if `address` is outside memory.
    #[must_use]
    pub fn fetch(&self, address: Word) -> Option<Word> {
        self.words.get(address as usize).copied()
    }

    pub(crate) fn get_mut(&mut self, address: Word) -> Option<&mut Word> {
        self.words.get_mut(address as usize)
    }

    /// Read the raw (unmasked) value of a register.
    #[must_use]
    pub fn register(&self, reg: ReservedAddress) -> Word {
        // Construction guarantees that every reserved address is
        // inside memory.
        self.words[reg.address() as usize]
    }

    pub fn set_register(&mut self, reg: ReservedAddress, value: Word) {
        self.words[reg.address() as usize] = value;
    }

    #[must_use]
    pub fn cursor(&self) -> Word {
        self.cursor
    }

    pub fn set_cursor(&mut self, address: Word) {
        self.cursor = address;
    }

    /// Write `word` at the cursor and advance the cursor.
    ///
    /// # Errors
    ///
    /// Fails when the cursor is outside memory.
    pub fn put_word(&mut self, word: Word) -> Result<(), WriteFailed> {
        let address = self.cursor;
        match self.words.get_mut(address as usize) {
            Some(slot) => {
                *slot = word;
                self.footprint = self.footprint.max(address);
                self.cursor = address.wrapping_add(1);
                Ok(())
            }
            None => Err(WriteFailed {
                address,
                capacity: self.geometry.capacity(),
            }),
        }
    }

    /// A listing of every word from address zero up to the
    /// footprint.
    #[must_use]
    pub fn listing(&self) -> Listing<'_> {
        Listing { mem: self }
    }
}

/// Displays the memory image, one `rssb` line per word.
pub struct Listing<'a> {
    mem: &'a MemoryUnit,
}

impl Display for Listing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let end = self.mem.footprint as usize;
        for (address, word) in self.mem.words.iter().enumerate().take(end + 1) {
            writeln!(f, "{address:#010x}: rssb {word:#010x}")?;
        }
        Ok(())
    }
}
