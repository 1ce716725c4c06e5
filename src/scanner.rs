//! Scanning for dollar-delimited math spans (`$...$` and `$$...$$`).
//!
//! The scanner is invoked by the host once per trigger byte (`$`) and
//! works on raw byte offsets into the host's source buffer. It has no
//! error conditions: anything that is not a well-formed span is a
//! plain non-match.

use memchr::memchr;

use crate::engine::Mode;

pub mod links;

/// The current line, from the scan position (the trigger `$`) to the
/// end of the line, as a `[start, stop)` byte range into the source
/// buffer. The trailing newline, if any, sits at `stop`. Input is
/// assumed newline-normalized (`\n`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub start: usize,
    pub stop: usize,
}

impl Line {
    pub fn new(start: usize, stop: usize) -> Line {
        Line { start, stop }
    }
}

/// A recognized math span.
///
/// `start..end` delimit the span's content in the source buffer,
/// delimiters excluded. `advance` is the width of the closing
/// delimiter (1 or 2 bytes) the host must skip past `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub mode: Mode,
    pub start: usize,
    pub end: usize,
    pub advance: usize,
}

impl Span {
    /// The span's content, borrowed from the source buffer.
    pub fn text<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        &source[self.start..self.end]
    }

    /// How many bytes the host must advance from `from` to move past
    /// the span and its closing delimiter.
    pub fn advance_from(&self, from: usize) -> usize {
        self.end + self.advance - from
    }
}

/// A successful scan: the span plus the number of newlines consumed
/// while continuing onto further lines, so the host's line counter
/// stays correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scan {
    pub span: Span,
    pub newlines: usize,
}

/// Try to scan a math span starting at the trigger `$` at the head of
/// `line`. Returns `None` if no well-formed span starts here.
///
/// Both forms terminate lazily on the first valid closing delimiter.
/// An unterminated span continues onto following lines within the
/// same paragraph; a blank line abandons it. Inline spans must not
/// open before whitespace, must not close after unescaped whitespace,
/// and treat any backslash-escaped byte as content.
pub fn scan(source: &[u8], line: Line) -> Option<Scan> {
    let text = source.get(line.start..line.stop)?;

    // Not enough bytes to tell $ from $$.
    if text.len() < 2 || text[0] != b'$' {
        return None;
    }

    // An escaped trigger never opens a span. The backslash run before
    // the trigger decides: an odd run escapes the $.
    let mut backslashes = 0;
    while backslashes < line.start && source[line.start - 1 - backslashes] == b'\\' {
        backslashes += 1;
    }
    if backslashes % 2 == 1 {
        return None;
    }

    let scan = if text[1] == b'$' {
        scan_display(source, line)
    } else if !text[1].is_ascii_whitespace() {
        scan_inline(source, line)
    } else {
        // `$ foo` is a dollar sign, not math.
        None
    };

    if let Some(scan) = &scan {
        log::debug!(
            "matched {} math at {}..{} ({} newlines)",
            scan.span.mode,
            scan.span.start,
            scan.span.end,
            scan.newlines
        );
    }
    scan
}

/// `$$...$$`: terminated by the first `$` pair. Escapes are not
/// recognized inside display content.
fn scan_display(source: &[u8], mut line: Line) -> Option<Scan> {
    let start = line.start + 2;
    let mut newlines = 0;
    let mut offset = 2;

    let end = 'scan: loop {
        let text = &source[line.start..line.stop];
        let mut c = offset;
        while c < text.len() {
            if text[c] == b'$' {
                if c + 1 == text.len() {
                    // A closing pair never splits across lines.
                    break;
                }
                if text[c + 1] == b'$' {
                    break 'scan line.start + c;
                }
                // Lone $; the byte after it cannot open a pair.
                c += 2;
            } else {
                c += 1;
            }
        }
        line = next_line(source, line.stop)?;
        newlines += 1;
        offset = 0;
    };

    (start < end).then_some(Scan {
        span: Span {
            mode: Mode::DISPLAY,
            start,
            end,
            advance: 2,
        },
        newlines,
    })
}

/// `$...$`: terminated by an unescaped `$` whose preceding byte is not
/// whitespace, unless that whitespace is itself escaped.
fn scan_inline(source: &[u8], mut line: Line) -> Option<Scan> {
    let start = line.start + 1;
    let mut newlines = 0;
    let mut offset = 1;

    let end = 'scan: loop {
        let text = &source[line.start..line.stop];
        let mut c = offset;
        while c < text.len() {
            match text[c] {
                // The escaped byte can never terminate the span.
                b'\\' => c += 2,
                // At c == 0 the candidate follows a newline, which is
                // whitespace, so it cannot close the span.
                b'$' if c > 0 => {
                    let after_escaped_space = c >= 2 && text[c - 2] == b'\\';
                    if !text[c - 1].is_ascii_whitespace() || after_escaped_space {
                        break 'scan line.start + c;
                    }
                    c += 1;
                }
                _ => c += 1,
            }
        }
        line = next_line(source, line.stop)?;
        newlines += 1;
        offset = 0;
    };

    (start < end).then_some(Scan {
        span: Span {
            mode: Mode::INLINE,
            start,
            end,
            advance: 1,
        },
        newlines,
    })
}

/// Advance past the newline at `stop` onto the following line.
/// Returns `None` at end of buffer or when the following line is
/// blank: a paragraph break abandons the span.
fn next_line(source: &[u8], stop: usize) -> Option<Line> {
    if stop >= source.len() {
        return None;
    }
    let start = stop + 1;
    let rest = &source[start..];
    let stop = start + memchr(b'\n', rest).unwrap_or(rest.len());
    if blank(&source[start..stop]) {
        return None;
    }
    Some(Line { start, stop })
}

fn blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}
