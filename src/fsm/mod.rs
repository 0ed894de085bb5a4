//! Table-driven beam latch state machine.
//!
//! Each physical beam channel owns one [`BeamLatch`].  Transitions are
//! looked up in a fixed table of function pointers, one row per state:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  LatchTable                                          │
//! │  ┌───────────┬────────────────────────────────────┐  │
//! │  │ LatchState │ on_event                           │  │
//! │  ├───────────┼────────────────────────────────────┤  │
//! │  │ Idle       │ Tripped        -> Some(Fired)      │  │
//! │  │ Fired      │ SweepStarted   -> Some(Confirmed)  │  │
//! │  │ Confirmed  │ *              -> None (terminal)  │  │
//! │  └───────────┴────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! There is no row that leads back to `Idle`: only a device reset re-arms
//! a latch.

use log::info;

use crate::identity::Topology;

/// Physical beam/solenoid channels on the board.
pub const MAX_CHANNELS: usize = 2;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Per-channel trigger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum LatchState {
    /// Waiting for the beam to be broken.
    Idle = 0,
    /// Door fired; capture not yet checked.
    Fired = 1,
    /// Confirmation sweep has run for this door.
    Confirmed = 2,
}

impl LatchState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert an index back to `LatchState`.  Out-of-range indices map to
    /// `Confirmed` so a corrupted latch can never fire again.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Fired,
            2 => Self::Confirmed,
            _ => {
                debug_assert!(false, "invalid latch index: {idx}");
                Self::Confirmed
            }
        }
    }
}

/// Inputs the controller feeds into a latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchEvent {
    /// The beam was interrupted while armed and the door fired.
    Tripped,
    /// The capture-confirmation sweep started for this door.
    SweepStarted,
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Signature for a state's event handler.
/// Returns `Some(next)` to transition, or `None` to stay.
pub type LatchEventFn = fn(LatchEvent) -> Option<LatchState>;

/// Static descriptor for a single latch state.
pub struct LatchDescriptor {
    pub id: LatchState,
    pub name: &'static str,
    pub on_event: LatchEventFn,
}

fn idle_on_event(event: LatchEvent) -> Option<LatchState> {
    match event {
        LatchEvent::Tripped => Some(LatchState::Fired),
        LatchEvent::SweepStarted => None,
    }
}

fn fired_on_event(event: LatchEvent) -> Option<LatchState> {
    match event {
        LatchEvent::SweepStarted => Some(LatchState::Confirmed),
        LatchEvent::Tripped => None,
    }
}

fn confirmed_on_event(_event: LatchEvent) -> Option<LatchState> {
    None
}

/// Build the transition table, indexed by `LatchState as usize`.
pub const fn build_latch_table() -> [LatchDescriptor; LatchState::COUNT] {
    [
        LatchDescriptor {
            id: LatchState::Idle,
            name: "IDLE",
            on_event: idle_on_event,
        },
        LatchDescriptor {
            id: LatchState::Fired,
            name: "FIRED",
            on_event: fired_on_event,
        },
        LatchDescriptor {
            id: LatchState::Confirmed,
            name: "CONFIRMED",
            on_event: confirmed_on_event,
        },
    ]
}

static LATCH_TABLE: [LatchDescriptor; LatchState::COUNT] = build_latch_table();

// ---------------------------------------------------------------------------
// BeamLatch
// ---------------------------------------------------------------------------

/// Monotonic trigger latch for one beam channel.
#[derive(Debug, Clone, Copy)]
pub struct BeamLatch {
    channel: usize,
    current: usize,
}

impl BeamLatch {
    pub fn new(channel: usize) -> Self {
        Self {
            channel,
            current: LatchState::Idle as usize,
        }
    }

    pub fn state(&self) -> LatchState {
        LatchState::from_index(self.current)
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Feed an event.  Returns `true` if the latch moved.
    pub fn handle(&mut self, event: LatchEvent) -> bool {
        let row = &LATCH_TABLE[self.current];
        match (row.on_event)(event) {
            Some(next) => {
                info!(
                    "Latch {}: {} -> {}",
                    self.channel + 1,
                    row.name,
                    LATCH_TABLE[next as usize].name
                );
                self.current = next as usize;
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// LatchBank
// ---------------------------------------------------------------------------

/// The set of latches evaluated for this trap's topology.
#[derive(Debug, Clone)]
pub struct LatchBank {
    latches: [BeamLatch; MAX_CHANNELS],
    active: usize,
}

impl LatchBank {
    pub fn new(topology: Topology) -> Self {
        Self {
            latches: [BeamLatch::new(0), BeamLatch::new(1)],
            active: topology.channels().min(MAX_CHANNELS),
        }
    }

    /// Number of channels evaluated (1 for single-door traps).
    pub fn channels(&self) -> usize {
        self.active
    }

    /// State of `channel`; channels the board does not have read as idle.
    pub fn state(&self, channel: usize) -> LatchState {
        self.active_latches()
            .get(channel)
            .map_or(LatchState::Idle, BeamLatch::state)
    }

    /// Snapshot of the evaluated latches.
    pub fn states(&self) -> heapless::Vec<LatchState, MAX_CHANNELS> {
        self.active_latches().iter().map(BeamLatch::state).collect()
    }

    /// Channels still waiting for a trigger.
    pub fn idle_channels(&self) -> heapless::Vec<usize, MAX_CHANNELS> {
        self.active_latches()
            .iter()
            .filter(|l| l.state() == LatchState::Idle)
            .map(BeamLatch::channel)
            .collect()
    }

    /// Advance an idle channel to `Fired`.  Returns `false` if the channel
    /// was not idle.
    pub fn fire(&mut self, channel: usize) -> bool {
        channel < self.active && self.latches[channel].handle(LatchEvent::Tripped)
    }

    pub fn any_fired(&self) -> bool {
        self.active_latches()
            .iter()
            .any(|l| l.state() == LatchState::Fired)
    }

    /// Advance every `Fired` latch to `Confirmed` and return those channels.
    pub fn confirm_fired(&mut self) -> heapless::Vec<usize, MAX_CHANNELS> {
        let mut confirmed = heapless::Vec::new();
        for latch in &mut self.latches[..self.active] {
            if latch.handle(LatchEvent::SweepStarted) {
                let _ = confirmed.push(latch.channel());
            }
        }
        confirmed
    }

    pub fn all_confirmed(&self) -> bool {
        self.active_latches()
            .iter()
            .all(|l| l.state() == LatchState::Confirmed)
    }

    fn active_latches(&self) -> &[BeamLatch] {
        &self.latches[..self.active]
    }
}
