//! Link-label context filter.
//!
//! `$` is a legal byte in URLs and link text, so a span scanned inside
//! a link label is only honored as math when its content cannot be
//! part of the surrounding link syntax. The rule is asymmetric on
//! purpose: an unescaped `]` seen before any `[` would close the
//! enclosing label, so the span is rejected and left as plain text;
//! a `[` first (or no bracket at all) keeps the span. This lets
//! `[$[a]$](…)` stay math while `[a$b](c.tld/$)` stays a link, without
//! forcing authors to escape ordinary dollars in link targets.

/// Decide whether a span found inside a link label is honored as math.
///
/// Scans the span's content left to right, skipping backslash-escaped
/// bytes. Allowed iff the first unescaped bracket is `[`, or no
/// bracket occurs.
pub fn allowed_in_link_label(tex: &[u8]) -> bool {
    let mut c = 0;
    while c < tex.len() {
        match tex[c] {
            b'\\' => c += 2,
            b'[' => return true,
            b']' => {
                log::debug!("rejecting span in link label: ] before any [");
                return false;
            }
            _ => c += 1,
        }
    }
    true
}
