//! Wall-clock and delay adapters.
//!
//! - [`SntpClock`] implements [`ClockPort`].
//!   - **`target_os = "espidf"`**: `esp_idf_svc::sntp::EspSntp` against the
//!     configured server; the fallback time base is written with
//!     `settimeofday`.
//!   - **other targets**: the host system clock plus a settable offset.
//! - [`StdDelay`] is the host-side [`DelayNs`]; on the device `main` uses
//!   `esp_idf_hal::delay::FreeRtos` instead.

use std::time::{SystemTime, UNIX_EPOCH};

use embedded_hal::delay::DelayNs;
use log::{info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sntp::{EspSntp, SntpConf, SyncStatus};

use crate::app::ports::ClockPort;
use crate::error::ClockError;

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

pub struct SntpClock {
    server: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    sntp: Option<EspSntp<'static>>,
    /// Seconds added to the host clock by `set_unix_time`.
    #[cfg(not(target_os = "espidf"))]
    offset_secs: i64,
}

impl SntpClock {
    pub fn new(server: &str) -> Self {
        let mut s = heapless::String::new();
        if s.push_str(server).is_err() {
            warn!("Clock: server name '{}' too long, using pool.ntp.org", server);
            let _ = s.push_str("pool.ntp.org");
        }
        Self {
            server: s,
            #[cfg(target_os = "espidf")]
            sntp: None,
            #[cfg(not(target_os = "espidf"))]
            offset_secs: 0,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    fn system_secs() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

impl ClockPort for SntpClock {
    /// One poll of the SNTP service.  The service is started on the first
    /// call and keeps running in the background between polls.
    #[cfg(target_os = "espidf")]
    fn sync(&mut self) -> Result<(), ClockError> {
        if self.sntp.is_none() {
            let mut conf = SntpConf::default();
            conf.servers[0] = self.server.as_str();
            let sntp = EspSntp::new(&conf).map_err(|e| {
                warn!("Clock(espidf): SNTP start failed: {}", e);
                ClockError::Unavailable
            })?;
            info!("Clock(espidf): SNTP started against {}", self.server);
            self.sntp = Some(sntp);
        }
        match self.sntp.as_ref().map(EspSntp::get_sync_status) {
            Some(SyncStatus::Completed) => {
                info!("Clock(espidf): synchronised");
                Ok(())
            }
            _ => Err(ClockError::SyncTimeout),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn sync(&mut self) -> Result<(), ClockError> {
        info!("Clock(sim): using host time for {}", self.server);
        self.offset_secs = 0;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn unix_time(&self) -> i64 {
        Self::system_secs()
    }

    #[cfg(not(target_os = "espidf"))]
    fn unix_time(&self) -> i64 {
        Self::system_secs() + self.offset_secs
    }

    #[cfg(target_os = "espidf")]
    fn set_unix_time(&mut self, secs: i64) {
        let tv = esp_idf_svc::sys::timeval {
            tv_sec: secs as esp_idf_svc::sys::time_t,
            tv_usec: 0,
        };
        // SAFETY: `tv` is a valid timeval and the timezone argument may be null.
        let rc = unsafe { esp_idf_svc::sys::settimeofday(&tv, core::ptr::null()) };
        if rc != 0 {
            warn!("Clock(espidf): settimeofday failed (rc={})", rc);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_unix_time(&mut self, secs: i64) {
        self.offset_secs = secs - Self::system_secs();
    }
}

// ───────────────────────────────────────────────────────────────
// Delay
// ───────────────────────────────────────────────────────────────

/// Blocking delay backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}
