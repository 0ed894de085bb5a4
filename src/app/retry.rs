//! Bounded retry for start-up connectivity and clock synchronisation.

use core::fmt::Display;
use core::net::Ipv4Addr;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::error::{ClockError, ConnectivityError};

use super::ports::{ClockPort, ConnectivityPort};

/// Run `op` up to `attempts` times, pausing `retry_ms` between failures.
/// Returns the last error if every attempt fails.
pub fn retry<T, E: Display>(
    label: &str,
    attempts: u8,
    retry_ms: u32,
    delay: &mut dyn DelayNs,
    mut op: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(v) => {
                if attempt > 1 {
                    info!("{}: succeeded on attempt {}/{}", label, attempt, attempts);
                }
                return Ok(v);
            }
            Err(e) if attempt >= attempts => {
                warn!("{}: giving up after {} attempts ({})", label, attempts, e);
                return Err(e);
            }
            Err(e) => {
                warn!("{}: attempt {}/{} failed ({})", label, attempt, attempts, e);
                delay.delay_ms(retry_ms);
                attempt += 1;
            }
        }
    }
}

pub fn connect_with_retry(
    net: &mut dyn ConnectivityPort,
    delay: &mut dyn DelayNs,
    attempts: u8,
    retry_ms: u32,
) -> Result<Ipv4Addr, ConnectivityError> {
    retry("WiFi", attempts, retry_ms, delay, || net.connect())
}

pub fn sync_with_retry(
    clock: &mut dyn ClockPort,
    delay: &mut dyn DelayNs,
    attempts: u8,
    retry_ms: u32,
) -> Result<(), ClockError> {
    retry("SNTP", attempts, retry_ms, delay, || clock.sync())
}
