//! SMTP mail adapter.
//!
//! Implements [`NotificationPort`] by running one complete SMTP submission
//! per notice over a byte-oriented [`MailTransport`].
//!
//! ## Dialogue
//!
//! ```text
//!   S: 220 greeting
//!   C: EHLO mousetrap          S: 250 (multi-line)
//!   C: AUTH LOGIN              S: 334
//!   C: base64(user)            S: 334
//!   C: base64(password)        S: 235
//!   C: MAIL FROM:<user>        S: 250
//!   C: RCPT TO:<recipient>     S: 250 / 251
//!   C: DATA                    S: 354
//!   C: headers, body, "."      S: 250
//!   C: QUIT                    S: 221
//! ```
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: implicit TLS via `esp_idf_svc::tls::EspTls`.
//! - **all other targets**: plaintext `std::net::TcpStream` for host testing.

use core::fmt::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::{debug, info, warn};

use super::utils::{has_line_break, is_printable_ascii};
use crate::app::notices::Notice;
use crate::app::ports::NotificationPort;
use crate::clock::WallClock;
use crate::config::MailConfig;
use crate::error::NotifyError;

#[cfg(target_os = "espidf")]
mod esp_impl;

/// Longest reply line accepted from the relay (RFC 5321 allows 512).
const MAX_REPLY_LINE: usize = 512;

/// Receive buffer: one maximal line plus the read that completes it.
const PENDING_CAP: usize = MAX_REPLY_LINE * 2;

/// Name announced in EHLO.
const CLIENT_NAME: &str = "mousetrap";

// ───────────────────────────────────────────────────────────────
// Transport
// ───────────────────────────────────────────────────────────────

/// Blocking byte stream to a mail relay.
pub trait MailTransport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Block until at least one byte arrives.  `Ok(0)` means the peer
    /// closed the connection.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `data`.
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// Plaintext TCP relay connection used on the host.
#[cfg(not(target_os = "espidf"))]
pub struct TcpRelay {
    stream: std::net::TcpStream,
}

#[cfg(not(target_os = "espidf"))]
impl TcpRelay {
    pub fn connect(host: &str, port: u16) -> Result<Self, NotifyError> {
        let stream = std::net::TcpStream::connect((host, port)).map_err(|e| {
            warn!("SMTP(sim): connect to {}:{} failed: {}", host, port, e);
            NotifyError::ConnectFailed
        })?;
        stream
            .set_read_timeout(Some(std::time::Duration::from_secs(10)))
            .map_err(|_| NotifyError::Io)?;
        info!("SMTP(sim): connected to {}:{} (plaintext)", host, port);
        Ok(Self { stream })
    }
}

#[cfg(not(target_os = "espidf"))]
impl MailTransport for TcpRelay {
    type Error = std::io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.stream, buf)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        std::io::Write::write_all(&mut self.stream, data)
    }
}

// ───────────────────────────────────────────────────────────────
// Session
// ───────────────────────────────────────────────────────────────

/// One SMTP conversation over an open transport.
pub struct SmtpSession<T: MailTransport> {
    transport: T,
    pending: heapless::Vec<u8, PENDING_CAP>,
}

impl<T: MailTransport> SmtpSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pending: heapless::Vec::new(),
        }
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Submit `notice` from `config.username` to `config.recipient`.
    ///
    /// Header values are checked before anything is written, so a rejected
    /// notice never reaches the relay.
    pub fn deliver(
        &mut self,
        config: &MailConfig,
        at: &WallClock,
        notice: &Notice,
    ) -> Result<(), NotifyError> {
        let message = compose(config, at, notice)?;

        self.expect(&[220])?;
        self.command(&format!("EHLO {CLIENT_NAME}"), &[250])?;
        self.command("AUTH LOGIN", &[334])?;
        self.secret(&BASE64.encode(config.username.as_bytes()), &[334])?;
        self.secret(&BASE64.encode(config.password.as_bytes()), &[235])?;
        self.command(&format!("MAIL FROM:<{}>", config.username), &[250])?;
        self.command(&format!("RCPT TO:<{}>", config.recipient), &[250, 251])?;
        self.command("DATA", &[354])?;
        self.send_raw(message.as_bytes())?;
        self.expect(&[250])?;

        // The message is accepted at this point; a failed QUIT is harmless.
        if let Err(e) = self.command("QUIT", &[221]) {
            debug!("SMTP: QUIT not acknowledged: {}", e);
        }
        Ok(())
    }

    fn command(&mut self, line: &str, accept: &[u16]) -> Result<u16, NotifyError> {
        debug!("SMTP > {}", line);
        self.send_line(line)?;
        self.expect(accept)
    }

    /// Like [`command`](Self::command) but never logs the line.
    fn secret(&mut self, line: &str, accept: &[u16]) -> Result<u16, NotifyError> {
        self.send_line(line)?;
        self.expect(accept)
    }

    fn send_line(&mut self, line: &str) -> Result<(), NotifyError> {
        self.send_raw(line.as_bytes())?;
        self.send_raw(b"\r\n")
    }

    fn send_raw(&mut self, data: &[u8]) -> Result<(), NotifyError> {
        self.transport.write_all(data).map_err(|e| {
            warn!("SMTP: write failed: {:?}", e);
            NotifyError::Io
        })
    }

    fn expect(&mut self, accept: &[u16]) -> Result<u16, NotifyError> {
        let code = self.read_reply()?;
        if accept.contains(&code) {
            Ok(code)
        } else {
            warn!("SMTP: unexpected reply {} (wanted {:?})", code, accept);
            Err(NotifyError::Rejected(code))
        }
    }

    /// Read one reply, consuming every continuation line (`250-...`) up to
    /// the final one (`250 ...`).
    fn read_reply(&mut self) -> Result<u16, NotifyError> {
        loop {
            let line = self.read_line()?;
            let code = parse_code(&line)?;
            match line.get(3) {
                Some(b'-') => continue,
                Some(b' ') | None => {
                    debug!("SMTP < {}", String::from_utf8_lossy(&line));
                    return Ok(code);
                }
                Some(_) => return Err(NotifyError::MalformedReply),
            }
        }
    }

    fn read_line(&mut self) -> Result<heapless::Vec<u8, MAX_REPLY_LINE>, NotifyError> {
        loop {
            if let Some(pos) = self.pending.windows(2).position(|w| w == b"\r\n") {
                let line = heapless::Vec::from_slice(&self.pending[..pos])
                    .map_err(|()| NotifyError::MalformedReply)?;
                let consumed = pos + 2;
                let remaining = self.pending.len() - consumed;
                self.pending.copy_within(consumed.., 0);
                self.pending.truncate(remaining);
                return Ok(line);
            }
            if self.pending.len() > MAX_REPLY_LINE {
                return Err(NotifyError::MalformedReply);
            }

            let mut chunk = [0u8; 128];
            let n = self.transport.read(&mut chunk).map_err(|e| {
                warn!("SMTP: read failed: {:?}", e);
                NotifyError::Io
            })?;
            if n == 0 {
                warn!("SMTP: relay closed the connection");
                return Err(NotifyError::Io);
            }
            self.pending
                .extend_from_slice(&chunk[..n])
                .map_err(|()| NotifyError::MalformedReply)?;
        }
    }
}

fn parse_code(line: &[u8]) -> Result<u16, NotifyError> {
    let digits = line.get(..3).ok_or(NotifyError::MalformedReply)?;
    digits.iter().try_fold(0u16, |acc, &b| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + u16::from(b - b'0'))
        } else {
            Err(NotifyError::MalformedReply)
        }
    })
}

// ───────────────────────────────────────────────────────────────
// Message composition
// ───────────────────────────────────────────────────────────────

fn check_header(value: &str) -> Result<(), NotifyError> {
    if has_line_break(value) || !is_printable_ascii(value) {
        return Err(NotifyError::InvalidHeader);
    }
    Ok(())
}

/// Render the DATA payload including the terminating `.` line.
fn compose(config: &MailConfig, at: &WallClock, notice: &Notice) -> Result<String, NotifyError> {
    check_header(&config.sender_name)?;
    check_header(&config.username)?;
    check_header(&config.recipient)?;
    check_header(&notice.subject)?;

    let mut out = String::with_capacity(256 + notice.body.len());
    let _ = write!(out, "From: {} <{}>\r\n", config.sender_name, config.username);
    let _ = write!(out, "To: {}\r\n", config.recipient);
    let _ = write!(out, "Subject: {}\r\n", notice.subject);
    out.push_str("\r\n");
    let _ = write!(out, "{at} (Local time)\r\n\r\n");
    for line in notice.body.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.starts_with('.') {
            out.push('.');
        }
        out.push_str(line);
        out.push_str("\r\n");
    }
    out.push_str(".\r\n");
    Ok(out)
}

// ───────────────────────────────────────────────────────────────
// Mailer
// ───────────────────────────────────────────────────────────────

/// Opens a fresh relay connection for every notice.  One attempt, no
/// retry; the caller logs and drops failures.
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MailConfig {
        &self.config
    }

    #[cfg(target_os = "espidf")]
    fn open(&self) -> Result<esp_impl::TlsRelay, NotifyError> {
        esp_impl::TlsRelay::connect(&self.config.smtp_host, self.config.smtp_port)
    }

    #[cfg(not(target_os = "espidf"))]
    fn open(&self) -> Result<TcpRelay, NotifyError> {
        TcpRelay::connect(&self.config.smtp_host, self.config.smtp_port)
    }
}

impl NotificationPort for SmtpMailer {
    fn send(&mut self, at: &WallClock, notice: &Notice) -> Result<(), NotifyError> {
        if self.config.recipient.is_empty() {
            return Err(NotifyError::ConnectFailed);
        }
        // Reject bad headers before opening a connection.
        compose(&self.config, at, notice)?;

        let mut session = SmtpSession::new(self.open()?);
        session.deliver(&self.config, at, notice)?;
        info!("SMTP: sent '{}'", notice.subject);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
