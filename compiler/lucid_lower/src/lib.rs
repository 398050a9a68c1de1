//! Lowering engine for Lucid.
//!
//! Consumes an already-parsed, already-type-checked [`Module`] and re-emits
//! equivalent source text with the compiler's implicit work made explicit.
//! The external driver picks a [`Mode`] and receives one generated-text
//! chunk per top-level declaration plus the resolved preamble:
//!
//! ```text
//! Module + Config
//!       |
//!  LoweringSession   (flags, counters, offset map)
//!       |
//!  Backend dispatch  (general rules / coroutine / dispatch-table)
//!       |
//!  LoweredModule     (chunks + preamble)
//! ```
//!
//! The engine is strictly single-threaded and synchronous; the only failure
//! escape is the placeholder-comment policy - every input produces output.

pub mod cfront;
pub mod config;
pub mod coro;
pub mod dispatch;
pub mod flags;
pub mod hoist;
pub mod layout;
pub mod lifetime;
pub mod printer;
pub mod rules;
pub mod session;
pub mod type_name;

pub use config::{Config, ConfigError, Mode};
pub use flags::{resolve_preamble, FeatureFlags};
pub use session::LoweringSession;

use lucid_ir::{Module, Span};

use cfront::CfrontBackend;
use coro::CoroBackend;
use dispatch::{Backend, DefaultBackend};
use printer::Printer;

/// One top-level declaration's generated text and the source span it
/// replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub span: Span,
    pub text: String,
}

/// Result of one lowering run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoweredModule {
    /// Generated text per top-level declaration, in declaration order.
    pub chunks: Vec<Chunk>,
    /// Boilerplate lines to prepend to the file, resolved from the feature
    /// flags in fixed order.
    pub preamble: Vec<String>,
}

/// Lower a module under the given configuration.
///
/// The module is borrowed mutably because lowering synthesizes tree
/// fragments into its arena; the front-end-supplied nodes are never
/// rewritten.
pub fn lower_module(module: &mut Module, config: Config) -> Result<LoweredModule, ConfigError> {
    config.validate()?;
    tracing::debug!(?config, "lowering run");
    let mut session = LoweringSession::new(module, config);
    let lowered = match config.mode {
        Mode::Default => run(&mut session, DefaultBackend),
        Mode::Coroutine => run(&mut session, CoroBackend::new()),
        Mode::Cfront => run(&mut session, CfrontBackend::new()),
    };
    Ok(lowered)
}

fn run<B: Backend>(session: &mut LoweringSession<'_>, mut backend: B) -> LoweredModule {
    let top_level = session.module.top_level.clone();
    let mut chunks = Vec::with_capacity(top_level.len());
    for decl in top_level {
        let span = session.module.arena.decl(decl).span;
        let mut printer = Printer::new(session);
        backend.decl(&mut printer, decl);
        chunks.push(Chunk {
            span,
            text: printer.out.into_string(),
        });
    }
    LoweredModule {
        chunks,
        preamble: resolve_preamble(session.flags),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_module_lowers_to_nothing() {
        let mut module = Module::new();
        let lowered = match lower_module(&mut module, Config::default()) {
            Ok(lowered) => lowered,
            Err(err) => panic!("unexpected config error: {err}"),
        };
        assert!(lowered.chunks.is_empty());
        assert!(lowered.preamble.is_empty());
    }
}
