//! Trap identity resolved from the two hardware strap pins.
//!
//! ```text
//!  strap1 strap2 │ id    name          topology
//!  ──────────────┼──────────────────────────────
//!    0      0    │ One   Mousetrap 1   Single
//!    0      1    │ Two   Mousetrap 2   Dual
//!    1      0    │ Three Mousetrap 3   Unknown
//!    1      1    │ Four  Mousetrap 4   Dual
//! ```
//!
//! The table is the only place names and topologies are decided.  Anything
//! outside it resolves to `Mousetrap X` with an unknown topology.

use core::fmt;

use crate::config::SystemConfig;

/// Hardware variant of the trap mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// One beam, one door.  The second channel is never evaluated.
    Single,
    /// Two independent beams and doors.
    Dual,
    /// Build not recorded; both channels are evaluated.
    Unknown,
}

impl Topology {
    /// Number of beam/solenoid channels evaluated for this topology.
    pub const fn channels(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Dual | Self::Unknown => 2,
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Dual => write!(f, "dual"),
            Self::Unknown => write!(f, "tba"),
        }
    }
}

/// Strap-selected device slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TrapId {
    One = 0,
    Two = 1,
    Three = 2,
    Four = 3,
    Unknown = 4,
}

impl TrapId {
    /// Convert a strap index back to `TrapId`.  Out-of-range indices map to
    /// `Unknown`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::One,
            1 => Self::Two,
            2 => Self::Three,
            3 => Self::Four,
            _ => Self::Unknown,
        }
    }

    /// Slot selected by the two strap levels (`strap1` is the high bit).
    pub fn from_straps(strap1: u8, strap2: u8) -> Self {
        if strap1 > 1 || strap2 > 1 {
            return Self::Unknown;
        }
        Self::from_index(usize::from((strap1 << 1) | strap2))
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::One => "Mousetrap 1",
            Self::Two => "Mousetrap 2",
            Self::Three => "Mousetrap 3",
            Self::Four => "Mousetrap 4",
            Self::Unknown => "Mousetrap X",
        }
    }

    pub const fn topology(self) -> Topology {
        match self {
            Self::One => Topology::Single,
            Self::Two | Self::Four => Topology::Dual,
            Self::Three | Self::Unknown => Topology::Unknown,
        }
    }
}

/// Immutable description of this device, fixed at start-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapIdentity {
    pub id: TrapId,
    pub name: &'static str,
    pub topology: Topology,
    /// Volts at ADC full scale for this board's divider.
    pub battery_cal: f32,
    /// Loop ticks per hour on this board.
    pub hourly_ticks: u32,
}

impl TrapIdentity {
    /// Resolve the identity from raw strap levels and per-device tuning.
    pub fn resolve(strap1: u8, strap2: u8, config: &SystemConfig) -> Self {
        let id = TrapId::from_straps(strap1, strap2);
        let tuning = config.tuning(id as usize);
        Self {
            id,
            name: id.name(),
            topology: id.topology(),
            battery_cal: tuning.battery_cal,
            hourly_ticks: tuning.hourly_ticks,
        }
    }
}
