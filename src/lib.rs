//! Dollar-delimited TeX span scanning and cached math rendering for
//! Markdown pipelines.
//!
//! The crate covers the two halves of server-side math support that a
//! Markdown host cannot get from its engine: finding `$...$` and
//! `$$...$$` spans across soft line breaks with escape- and
//! link-aware termination rules, and turning each span's text into
//! markup through a buffer-reuse protocol with a shared result cache
//! in front of it.
//!
//! The host drives the loop: it calls [`scan`] once per trigger `$`,
//! filters spans found inside link labels with
//! [`allowed_in_link_label`], and hands accepted spans to a
//! [`MathRenderer`] together with its per-run [`RunContext`]:
//!
//! ```no_run
//! use mathspan::{Line, MathRenderer, RunContext, scan};
//!
//! # fn engine() -> impl mathspan::Engine { unimplemented!() }
//! let renderer = MathRenderer::new(engine());
//! let mut run = RunContext::new();
//! let mut html = Vec::new();
//!
//! let source = b"Euler: $e^{i\\pi} = -1$";
//! if let Some(scan) = scan(source, Line::new(7, source.len())) {
//!     renderer.render_span(&mut run, source, &scan.span, &mut html)?;
//! }
//! # Ok::<(), mathspan::RenderError>(())
//! ```
//!
//! The renderer's cache is shared across concurrent parsing runs and
//! grows without bound; see [`RenderCache`]. The engine itself is
//! external, opaque behind the [`Engine`] trait.

pub mod cache;
pub mod engine;
pub mod render;
pub mod scanner;

pub use cache::{CacheEntry, RenderCache};
pub use engine::{Engine, EngineResult, MAX_INPUT_LEN, Mode};
pub use render::{
    DEFAULT_BUFFER_SIZE, RenderBuffer, RenderError, RunContext, render, render_once,
};
pub use scanner::links::allowed_in_link_label;
pub use scanner::{Line, Scan, Span, scan};

/// Cache-aware span renderer.
///
/// Holds the engine, the warning flag, and the shared result cache.
/// One `MathRenderer` serves any number of concurrent parsing runs;
/// each run brings its own [`RunContext`].
pub struct MathRenderer<E> {
    engine: E,
    warn: Mode,
    cache: RenderCache,
}

impl<E: Engine> MathRenderer<E> {
    /// A renderer with warnings suppressed and the cache enabled.
    pub fn new(engine: E) -> MathRenderer<E> {
        MathRenderer {
            engine,
            warn: Mode::empty(),
            cache: RenderCache::new(),
        }
    }

    /// Let the engine surface its diagnostic warnings.
    pub fn with_warnings(mut self, on: bool) -> MathRenderer<E> {
        self.warn = Mode::warnings(on);
        self
    }

    /// Render every span through the engine, caching nothing. For
    /// callers that do not want unbounded memory growth.
    pub fn without_cache(mut self) -> MathRenderer<E> {
        self.cache = RenderCache::disabled();
        self
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Render a scanned span out of its source buffer, appending the
    /// markup to `out`.
    pub fn render_span(
        &self,
        run: &mut RunContext,
        source: &[u8],
        span: &Span,
        out: &mut Vec<u8>,
    ) -> Result<(), RenderError> {
        self.render_tex(run, span.text(source), span.mode, out)
    }

    /// Render `tex`, appending the markup to `out`.
    ///
    /// A cache hit and a cache miss produce byte-identical output and
    /// the same error outcome; failures are cached so identical
    /// failing input never re-invokes the engine.
    pub fn render_tex(
        &self,
        run: &mut RunContext,
        tex: &[u8],
        mode: Mode,
        out: &mut Vec<u8>,
    ) -> Result<(), RenderError> {
        if let Some(entry) = self.cache.load(tex, mode) {
            out.extend_from_slice(&entry.output);
            return entry.error.map_or(Ok(()), Err);
        }

        // The warn bit only changes engine diagnostics, never the
        // output, so it stays out of the cache key.
        let result = render::render(&self.engine, &mut run.buf, tex, mode | self.warn);
        out.extend_from_slice(run.buf.output());
        self.cache.store(
            tex,
            mode,
            CacheEntry {
                output: run.buf.output().to_vec(),
                error: result.err(),
            },
        );
        result
    }
}
