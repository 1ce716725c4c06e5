//! The render pipeline: buffer-size negotiation with the engine.
//!
//! A render call hands the engine a destination buffer and its
//! capacity. The engine reports the complete output size; if it did
//! not fit, the buffer is grown to exactly that size and the engine
//! is called once more. The two calls must agree on the size, or the
//! engine's internal state is presumed corrupt.

use thiserror::Error;

use crate::engine::{Engine, EngineResult, MAX_INPUT_LEN, Mode};

/// Initial capacity of a run's render buffer. TeX-heavy pages reuse
/// the same buffer for every span in the run, so this only bounds the
/// first few renders before the buffer settles at the page's largest
/// output.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Ways a render can fail. The pipeline never recovers from these
/// locally; the kind is propagated verbatim (and cached) so the host
/// decides whether to skip the span or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The input exceeds the engine's representable string length.
    /// Detected up front; the engine is never invoked.
    #[error("math input too large for the rendering engine")]
    TooLarge,

    /// The engine rejected the input as malformed or hit an internal
    /// failure. Distinct from TeX syntax errors, which the engine
    /// renders as visible error markup instead.
    #[error("rendering engine rejected the input")]
    BadInput,

    /// Two engine calls for the same render disagreed on the required
    /// size. The engine's internal state is presumed corrupt; the
    /// call is not retried.
    #[error("inconsistent output sizes across engine calls")]
    Inconsistent,
}

/// A reusable output buffer, owned by one parsing run and grown in
/// place across that run's renders to amortize allocation.
#[derive(Debug)]
pub struct RenderBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl RenderBuffer {
    pub fn new() -> RenderBuffer {
        RenderBuffer::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> RenderBuffer {
        RenderBuffer {
            bytes: vec![0; capacity],
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Output of the most recent render; empty after a failure.
    pub fn output(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Consume the buffer, keeping only the output bytes.
    pub fn into_output(mut self) -> Vec<u8> {
        self.bytes.truncate(self.len);
        self.bytes
    }

    // The old contents are dead after a failed fit; the engine
    // rewrites the output from scratch.
    fn grow_exact(&mut self, capacity: usize) {
        self.bytes = vec![0; capacity];
    }
}

impl Default for RenderBuffer {
    fn default() -> RenderBuffer {
        RenderBuffer::new()
    }
}

/// State owned by a single parsing run and threaded through every
/// render call of that run. Never shared between concurrent runs.
#[derive(Debug, Default)]
pub struct RunContext {
    pub(crate) buf: RenderBuffer,
}

impl RunContext {
    pub fn new() -> RunContext {
        RunContext::default()
    }

    pub fn buffer(&self) -> &RenderBuffer {
        &self.buf
    }
}

/// Render `src` into `dest`, negotiating the buffer size with the
/// engine. On success `dest.output()` holds the markup; on failure it
/// is empty and the error kind says why.
///
/// Empty input renders to empty output without invoking the engine.
pub fn render<E: Engine>(
    engine: &E,
    dest: &mut RenderBuffer,
    src: &[u8],
    mode: Mode,
) -> Result<(), RenderError> {
    dest.len = 0;
    if src.is_empty() {
        return Ok(());
    }
    if src.len() > MAX_INPUT_LEN {
        return Err(RenderError::TooLarge);
    }

    let size = match engine.render(&mut dest.bytes, src, mode) {
        EngineResult::Size(size) => size,
        EngineResult::BadInput => return Err(RenderError::BadInput),
    };

    if size > dest.capacity() {
        log::trace!("growing render buffer {} -> {}", dest.capacity(), size);
        dest.grow_exact(size);
        match engine.render(&mut dest.bytes, src, mode) {
            EngineResult::Size(second) if second == size => {}
            _ => return Err(RenderError::Inconsistent),
        }
    }

    dest.len = size;
    Ok(())
}

/// One-shot render without a reusable buffer, for callers that are
/// not rendering a lot of TeX. The initial capacity is sized from the
/// input so most inputs render in a single engine call.
pub fn render_once<E: Engine>(engine: &E, src: &[u8], mode: Mode) -> Result<Vec<u8>, RenderError> {
    let mut dest = RenderBuffer::with_capacity(src.len().saturating_mul(150));
    render(engine, &mut dest, src, mode)?;
    Ok(dest.into_output())
}
