//! Memory, time and resource units.
//!
//! Units parse case-insensitively so that `MB`, `mb` and `Mb` are all
//! accepted, and every conversion is checked: anything that would not fit
//! in a signed 64-bit quantity yields `None` rather than wrapping.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoreError;

/// Largest amount a 64-bit signed quantity can hold.
const MAX_SIGNED: u64 = i64::MAX as u64;

/// Binary memory units (`kB` = 1024 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemoryUnit {
    B,
    KB,
    MB,
    GB,
    TB,
    PB,
}

impl MemoryUnit {
    fn shift(self) -> u32 {
        match self {
            MemoryUnit::B => 0,
            MemoryUnit::KB => 10,
            MemoryUnit::MB => 20,
            MemoryUnit::GB => 30,
            MemoryUnit::TB => 40,
            MemoryUnit::PB => 50,
        }
    }

    /// Converts `amount` of this unit into bytes.
    ///
    /// Returns `None` when the result exceeds `i64::MAX`.
    pub fn to_bytes(self, amount: u64) -> Option<u64> {
        let shift = self.shift();
        if amount > MAX_SIGNED >> shift {
            return None;
        }
        Some(amount << shift)
    }

    /// Expresses `bytes` in this unit, truncating any remainder.
    pub fn from_bytes(self, bytes: u64) -> u64 {
        bytes >> self.shift()
    }

    /// Returns all memory units, smallest first.
    pub fn all() -> &'static [Self] {
        &[Self::B, Self::KB, Self::MB, Self::GB, Self::TB, Self::PB]
    }
}

impl fmt::Display for MemoryUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemoryUnit::B => "B",
            MemoryUnit::KB => "kB",
            MemoryUnit::MB => "MB",
            MemoryUnit::GB => "GB",
            MemoryUnit::TB => "TB",
            MemoryUnit::PB => "PB",
        };
        f.write_str(name)
    }
}

impl FromStr for MemoryUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "B" => Ok(Self::B),
            "KB" => Ok(Self::KB),
            "MB" => Ok(Self::MB),
            "GB" => Ok(Self::GB),
            "TB" => Ok(Self::TB),
            "PB" => Ok(Self::PB),
            _ => Err(CoreError::unknown_unit("memory", s)),
        }
    }
}

/// Time units accepted by timeout elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Nanos,
    Micros,
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Converts `amount` of this unit into a [`Duration`].
    ///
    /// Returns `None` when `amount` or the resulting number of whole seconds
    /// exceeds `i64::MAX`.
    pub fn to_duration(self, amount: u64) -> Option<Duration> {
        if amount > MAX_SIGNED {
            return None;
        }
        let seconds = |factor: u64| {
            amount
                .checked_mul(factor)
                .filter(|secs| *secs <= MAX_SIGNED)
                .map(Duration::from_secs)
        };
        match self {
            TimeUnit::Nanos => Some(Duration::from_nanos(amount)),
            TimeUnit::Micros => Some(Duration::from_micros(amount)),
            TimeUnit::Millis => Some(Duration::from_millis(amount)),
            TimeUnit::Seconds => seconds(1),
            TimeUnit::Minutes => seconds(60),
            TimeUnit::Hours => seconds(60 * 60),
            TimeUnit::Days => seconds(24 * 60 * 60),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Nanos => "nanos",
            TimeUnit::Micros => "micros",
            TimeUnit::Millis => "millis",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nanos" | "nanoseconds" => Ok(Self::Nanos),
            "micros" | "microseconds" => Ok(Self::Micros),
            "millis" | "milliseconds" => Ok(Self::Millis),
            "seconds" => Ok(Self::Seconds),
            "minutes" => Ok(Self::Minutes),
            "hours" => Ok(Self::Hours),
            "days" => Ok(Self::Days),
            _ => Err(CoreError::unknown_unit("time", s)),
        }
    }
}

/// Unit of a sized resource pool: entry count or memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceUnit {
    Entries,
    Memory(MemoryUnit),
}

impl fmt::Display for ResourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceUnit::Entries => f.write_str("entries"),
            ResourceUnit::Memory(unit) => write!(f, "{}", unit),
        }
    }
}

impl FromStr for ResourceUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("entries") {
            return Ok(Self::Entries);
        }
        s.parse::<MemoryUnit>()
            .map(Self::Memory)
            .map_err(|_| CoreError::unknown_unit("resource", s))
    }
}

impl From<MemoryUnit> for ResourceUnit {
    fn from(unit: MemoryUnit) -> Self {
        Self::Memory(unit)
    }
}
