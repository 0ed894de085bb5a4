//! Fuzz target: `SmtpSession::deliver`
//!
//! Plays arbitrary relay output against a full submission and asserts that
//! the session never panics and never reports success unless the relay
//! actually accepted the message.
//!
//! cargo fuzz run fuzz_smtp_reply

#![no_main]

use libfuzzer_sys::fuzz_target;
use mousetrap::adapters::smtp::{MailTransport, SmtpSession};
use mousetrap::app::notices::Notice;
use mousetrap::clock::WallClock;
use mousetrap::config::MailConfig;

struct Replay<'a> {
    data: &'a [u8],
    written: usize,
}

impl MailTransport for Replay<'_> {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), ()> {
        self.written += data.len();
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let mut config = MailConfig::default();
    let _ = config.username.push_str("trap@example.com");
    let _ = config.recipient.push_str("owner@example.com");
    let notice = Notice {
        subject: "Mousetrap 1 @ 10.0.0.2 is waiting".into(),
        body: "body".into(),
    };

    let mut session = SmtpSession::new(Replay { data, written: 0 });
    let ok = session
        .deliver(&config, &WallClock::unsynced(), &notice)
        .is_ok();

    if ok {
        // Acceptance needs at least the eight mandatory replies.
        assert!(data.len() >= 8 * 4, "accepted on a truncated dialogue");
        assert!(session.into_inner().written > 0);
    }
});
