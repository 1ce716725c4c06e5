//! Contract with the external math rendering engine.
//!
//! The engine is opaque to this crate: a single call that turns TeX
//! source and a mode into markup bytes. Engines are expected to be
//! callable concurrently from independent parsing runs.

use std::fmt;

use bitflags::bitflags;

/// Largest input accepted by the engine's string representation.
///
/// Inputs longer than this are rejected with
/// [`RenderError::TooLarge`](crate::render::RenderError::TooLarge)
/// before the engine is ever invoked.
pub const MAX_INPUT_LEN: usize = (1 << 30) - 1;

bitflags! {
    /// How a span is rendered.
    ///
    /// The two bits are orthogonal: `DISPLAY` selects block-level
    /// rendering over inline, `WARN` lets the engine surface its
    /// diagnostic warnings. Any combination is valid.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Mode: u8 {
        /// Render in display (block) style rather than inline.
        const DISPLAY = 1 << 0;
        /// Surface engine warnings instead of suppressing them.
        const WARN = 1 << 1;
    }
}

impl Mode {
    /// Inline rendering, warnings suppressed.
    pub const INLINE: Mode = Mode::empty();

    /// Returns a mode with the warning flag set or unset.
    pub fn warnings(on: bool) -> Mode {
        if on { Mode::WARN } else { Mode::empty() }
    }

    pub fn is_display(self) -> bool {
        self.contains(Mode::DISPLAY)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = if self.is_display() { "display" } else { "inline" };
        if self.contains(Mode::WARN) {
            write!(f, "{style}|warn")
        } else {
            f.write_str(style)
        }
    }
}

/// Outcome of a single call into the engine.
///
/// The required size travels out of band from failure, so no size
/// value is overloaded as an error sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineResult {
    /// The input was accepted; the complete output is this many bytes.
    ///
    /// When the size exceeds the destination's capacity, nothing was
    /// written and the caller must retry with a larger destination.
    Size(usize),
    /// The engine rejected the input as malformed or hit an internal
    /// failure. TeX syntax errors are not reported this way; engines
    /// render those as visible error markup.
    BadInput,
}

/// A math rendering engine.
///
/// `dest.len()` is the destination's capacity. An engine writes at
/// most that many bytes and reports the complete output size via
/// [`EngineResult::Size`]; if the output does not fit, it writes
/// nothing and still reports the full size. Implementations must be
/// safe to call from multiple threads at once.
pub trait Engine {
    fn render(&self, dest: &mut [u8], src: &[u8], mode: Mode) -> EngineResult;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn render(&self, dest: &mut [u8], src: &[u8], mode: Mode) -> EngineResult {
        (**self).render(dest, src, mode)
    }
}
