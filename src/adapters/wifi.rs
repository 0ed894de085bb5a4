//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! connectivity.  Each `connect()` is exactly one association attempt; the
//! bounded retry lives in [`app::retry`](crate::app::retry).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via
//!   `esp_idf_svc::wifi::BlockingWifi`.
//! - **all other targets**: deterministic simulation stubs for host-side tests.

use core::net::Ipv4Addr;

use log::{info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

use super::utils::is_printable_ascii;
use crate::app::ports::ConnectivityPort;
use crate::config::NetworkConfig;
use crate::error::ConnectivityError;

/// Address handed out by the simulated access point.
#[cfg(not(target_os = "espidf"))]
pub const SIM_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 2);

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    address: Option<Ipv4Addr>,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: number of upcoming attempts that should fail.
    #[cfg(not(target_os = "espidf"))]
    sim_refusals: u32,
}

impl WifiAdapter {
    /// Wrap an already-constructed driver.  Credentials are applied on
    /// the next `connect()`.
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>) -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            address: None,
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            address: None,
            sim_refusals: 0,
        }
    }

    /// Validate and store station credentials.
    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    /// Apply the credentials baked into a [`NetworkConfig`].  An empty
    /// SSID is left unset so that `connect()` reports `NoCredentials`.
    pub fn configure(&mut self, net: &NetworkConfig) -> Result<(), ConnectivityError> {
        if net.wifi_ssid.is_empty() {
            warn!("WiFi: no SSID configured");
            return Ok(());
        }
        self.set_credentials(&net.wifi_ssid, &net.wifi_password)
    }

    /// Address obtained by the last successful association.
    pub fn address(&self) -> Option<Ipv4Addr> {
        self.address
    }

    /// Make the next `n` simulated attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_refuse_next(&mut self, n: u32) {
        self.sim_refusals = n;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<Ipv4Addr, ConnectivityError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        let failed = |stage: &str, e: esp_idf_svc::sys::EspError| {
            warn!("WiFi(espidf): {} failed: {}", stage, e);
            ConnectivityError::ConnectionFailed
        };

        if self.wifi.is_connected().unwrap_or(false) {
            let _ = self.wifi.disconnect();
        }
        self.wifi
            .set_configuration(&conf)
            .map_err(|e| failed("set_configuration", e))?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(|e| failed("start", e))?;
        }
        self.wifi.connect().map_err(|e| failed("connect", e))?;
        self.wifi
            .wait_netif_up()
            .map_err(|e| failed("wait_netif_up", e))?;

        let ip_info = self
            .wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .map_err(|e| failed("get_ip_info", e))?;
        Ok(ip_info.ip)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<Ipv4Addr, ConnectivityError> {
        if self.sim_refusals > 0 {
            self.sim_refusals -= 1;
            warn!("WiFi(sim): simulated association failure");
            return Err(ConnectivityError::ConnectionFailed);
        }
        info!("WiFi(sim): associated with '{}'", self.ssid);
        Ok(SIM_ADDRESS)
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.address.is_some()
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<Ipv4Addr, ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        self.address = None;

        let addr = self.platform_connect()?;
        self.address = Some(addr);
        info!("WiFi: connected, address {}", addr);
        Ok(addr)
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
