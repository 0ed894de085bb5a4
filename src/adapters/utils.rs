//! Shared utilities for adapter-layer validation.

/// Returns `true` if every byte of `s` is in the printable ASCII range
/// `0x20..=0x7E` (space through tilde, inclusive).
///
/// Used to validate WiFi SSID strings and mail header values.
pub(super) fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// `true` if `s` contains CR or LF.  Such values would let a caller
/// inject extra mail headers.
pub(super) fn has_line_break(s: &str) -> bool {
    s.contains(['\r', '\n'])
}
