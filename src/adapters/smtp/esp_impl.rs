//! ESP-IDF relay connection for `SmtpMailer`.
//!
//! Compiled only for `target_os = "espidf"`.  Opens an implicit-TLS
//! session (port 465) with `esp_idf_svc::tls::EspTls`, verifying the relay
//! against the built-in certificate bundle.

use log::{info, warn};

use esp_idf_svc::sys::EspError;
use esp_idf_svc::tls::{Config, EspTls, InternalSocket};

use super::MailTransport;
use crate::error::NotifyError;

/// Socket timeout for the whole SMTP conversation.
const TIMEOUT_MS: u32 = 10_000;

pub(super) struct TlsRelay {
    tls: EspTls<InternalSocket>,
}

impl TlsRelay {
    pub(super) fn connect(host: &str, port: u16) -> Result<Self, NotifyError> {
        let mut tls = EspTls::new().map_err(|e| {
            warn!("SMTP(espidf): TLS context allocation failed: {}", e);
            NotifyError::ConnectFailed
        })?;
        let conf = Config {
            common_name: Some(host),
            timeout_ms: TIMEOUT_MS,
            ..Config::new()
        };
        tls.connect(host, port, &conf).map_err(|e| {
            warn!("SMTP(espidf): TLS connect to {}:{} failed: {}", host, port, e);
            NotifyError::ConnectFailed
        })?;
        info!("SMTP(espidf): connected to {}:{}", host, port);
        Ok(Self { tls })
    }
}

impl MailTransport for TlsRelay {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.tls.read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tls.write_all(data)
    }
}
