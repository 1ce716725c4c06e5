//! End-to-end simulation of a host parsing run: walk a document byte
//! by byte, scan at every `$` trigger, filter spans inside link
//! labels, render through the cache, and keep line bookkeeping from
//! the scanner's newline reports.

use std::cell::Cell;

use mathspan::{
    Engine, EngineResult, Line, MathRenderer, Mode, RunContext, allowed_in_link_label, scan,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Tags output by mode and rejects one designated input.
struct TagEngine {
    calls: Cell<usize>,
    reject: &'static [u8],
}

impl TagEngine {
    fn new() -> TagEngine {
        TagEngine {
            calls: Cell::new(0),
            reject: b"",
        }
    }

    fn rejecting(reject: &'static [u8]) -> TagEngine {
        TagEngine {
            calls: Cell::new(0),
            reject,
        }
    }
}

impl Engine for TagEngine {
    fn render(&self, dest: &mut [u8], src: &[u8], mode: Mode) -> EngineResult {
        self.calls.set(self.calls.get() + 1);
        if !self.reject.is_empty() && src == self.reject {
            return EngineResult::BadInput;
        }
        let open: &[u8] = if mode.is_display() { b"<d>" } else { b"<i>" };
        let close: &[u8] = if mode.is_display() { b"</d>" } else { b"</i>" };
        let mut out = open.to_vec();
        out.extend_from_slice(src);
        out.extend_from_slice(close);
        if out.len() <= dest.len() {
            dest[..out.len()].copy_from_slice(&out);
        }
        EngineResult::Size(out.len())
    }
}

/// Minimal host loop. Copies plain text through verbatim, renders
/// accepted spans, skips the output of failed ones, and counts lines.
fn process<E: Engine>(
    renderer: &MathRenderer<E>,
    source: &[u8],
    in_link_label: bool,
) -> (Vec<u8>, usize) {
    let mut run = RunContext::new();
    let mut out = Vec::new();
    let mut pos = 0;
    let mut line_no = 0;

    while pos < source.len() {
        let byte = source[pos];
        if byte == b'\n' {
            line_no += 1;
        }
        if byte == b'$' {
            let stop = pos
                + source[pos..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .unwrap_or(source.len() - pos);
            if let Some(scan) = scan(source, Line::new(pos, stop)) {
                let accepted = !in_link_label || allowed_in_link_label(scan.span.text(source));
                if accepted {
                    // Failures are per-span; the host just omits them.
                    let _ = renderer.render_span(&mut run, source, &scan.span, &mut out);
                    line_no += scan.newlines;
                    pos += scan.span.advance_from(pos);
                    continue;
                }
            }
        }
        out.push(byte);
        pos += 1;
    }

    (out, line_no)
}

#[test]
fn renders_mixed_document() {
    init_logger();
    let renderer = MathRenderer::new(TagEngine::new());
    let source = b"Let $x$ and $$y$$, plus \\$5.\n";

    let (out, lines) = process(&renderer, source, false);

    similar_asserts::assert_eq!(
        String::from_utf8(out).unwrap(),
        "Let <i>x</i> and <d>y</d>, plus \\$5.\n"
    );
    assert_eq!(lines, 1);
}

#[test]
fn spans_continue_across_soft_breaks() {
    init_logger();
    let renderer = MathRenderer::new(TagEngine::new());
    let source = b"$a +\nb$ done\n";

    let (out, lines) = process(&renderer, source, false);

    similar_asserts::assert_eq!(
        String::from_utf8(out).unwrap(),
        "<i>a +\nb</i> done\n"
    );
    // One newline consumed inside the span, one in plain text.
    assert_eq!(lines, 2);
}

#[test]
fn paragraph_break_leaves_text_alone() {
    init_logger();
    let renderer = MathRenderer::new(TagEngine::new());
    let source = b"$a +\n\nb$ done\n";

    let (out, _) = process(&renderer, source, false);

    // The abandoned opener and the stray closer stay plain text.
    similar_asserts::assert_eq!(
        String::from_utf8(out).unwrap(),
        "$a +\n\nb$ done\n"
    );
}

#[test]
fn link_labels_filter_spans() {
    init_logger();
    let renderer = MathRenderer::new(TagEngine::new());

    // A ] before any [ would close the enclosing label: plain text.
    let (out, _) = process(&renderer, b"$a]b$", true);
    assert_eq!(out, b"$a]b$");

    // Bracketed math inside a label is fine.
    let (out, _) = process(&renderer, b"$[a]+c$", true);
    assert_eq!(out, b"<i>[a]+c</i>");

    // No bracket at all is fine too.
    let (out, _) = process(&renderer, b"$a+b$", true);
    assert_eq!(out, b"<i>a+b</i>");
}

#[test]
fn cache_is_shared_across_runs() {
    init_logger();
    let engine = TagEngine::new();
    let renderer = MathRenderer::new(&engine);
    let source = b"$x$ then $x$ then $$x$$";

    let (first, _) = process(&renderer, source, false);
    let (second, _) = process(&renderer, source, false);

    similar_asserts::assert_eq!(first, second);
    // Two distinct keys: (x, inline) and (x, display).
    assert_eq!(engine.calls.get(), 2);
    assert_eq!(renderer.cache().len(), 2);
}

#[test]
fn failed_span_does_not_abort_the_run() {
    init_logger();
    let engine = TagEngine::rejecting(b"bad");
    let renderer = MathRenderer::new(&engine);
    let source = b"$bad$ and $good$ and $bad$";

    let (out, _) = process(&renderer, source, false);

    // The failing span is omitted, the rest renders; the cached
    // failure is not retried.
    similar_asserts::assert_eq!(
        String::from_utf8(out).unwrap(),
        " and <i>good</i> and "
    );
    assert_eq!(engine.calls.get(), 2);
}
