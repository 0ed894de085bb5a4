//! Tick-driven timers for the periodic side effects of the control loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        MainLoop tick                          │
//! │                                                              │
//! │  ┌─────────────┐   ┌──────────────┐   ┌──────────────────┐   │
//! │  │ Heartbeat   │   │ CycleTimer   │   │ DailyAlarm       │   │
//! │  │ every N     │   │ every hour   │   │ at report HH:MM  │   │
//! │  │ ticks       │   │ (tick count) │   │ (wall clock)     │   │
//! │  └──────┬──────┘   └──────┬───────┘   └────────┬─────────┘   │
//! │         ▼                 ▼                    ▼             │
//! │    toggle LED      battery sample      reconnect + status    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tick counts stand in for elapsed time; the blocking delays inside a tick
//! (solenoid hold, sweep) stretch the hour slightly.  Per-board tick
//! targets absorb the average drift.

use log::info;

// ═══════════════════════════════════════════════════════════════
//  CycleTimer
// ═══════════════════════════════════════════════════════════════

/// Counts ticks and fires once every `period` ticks, then wraps.
#[derive(Debug, Clone)]
pub struct CycleTimer {
    count: u32,
    period: u32,
}

impl CycleTimer {
    pub fn new(period: u32) -> Self {
        Self {
            count: 0,
            period: period.max(1),
        }
    }

    /// Advance by one tick.  Returns `true` on the tick that reaches the
    /// period, at which point the counter restarts from zero.
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.period {
            self.count = 0;
            true
        } else {
            false
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn period(&self) -> u32 {
        self.period
    }
}

// ═══════════════════════════════════════════════════════════════
//  DailyAlarm
// ═══════════════════════════════════════════════════════════════

/// Fires once when the local clock reads `hour:minute`.
///
/// The fired flag clears as soon as the clock shows any other minute, so
/// the alarm re-arms for the next day.
#[derive(Debug, Clone)]
pub struct DailyAlarm {
    hour: u8,
    minute: u8,
    fired: bool,
}

impl DailyAlarm {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour,
            minute,
            fired: false,
        }
    }

    /// Poll with the current local time.  Returns `true` exactly once per
    /// visit to the alarm minute.
    pub fn poll(&mut self, hour: u8, minute: u8) -> bool {
        if hour == self.hour && minute == self.minute {
            if self.fired {
                return false;
            }
            self.fired = true;
            info!("Scheduler: daily alarm {:02}:{:02} fired", self.hour, self.minute);
            true
        } else {
            self.fired = false;
            false
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

// ═══════════════════════════════════════════════════════════════
//  Heartbeat
// ═══════════════════════════════════════════════════════════════

/// Square-wave LED heartbeat: flips level once every `period` ticks.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    timer: CycleTimer,
    level: bool,
}

impl Heartbeat {
    pub fn new(period: u32) -> Self {
        Self {
            timer: CycleTimer::new(period),
            level: false,
        }
    }

    /// Advance by one tick.  Returns the new LED level when it flips.
    pub fn tick(&mut self) -> Option<bool> {
        if self.timer.tick() {
            self.level = !self.level;
            Some(self.level)
        } else {
            None
        }
    }

    pub fn level(&self) -> bool {
        self.level
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
