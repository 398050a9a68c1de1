//! Printing context.
//!
//! A [`Printer`] bundles what every handler needs: the session (arena,
//! interners, flags, counters), the output buffer of the current top-level
//! declaration, the deferred-placement stack and the lifetime tracker.

use lucid_emit::OutputBuf;
use lucid_ir::{Name, NodeArena, TypeInterner};

use crate::hoist::HoistStack;
use crate::lifetime::LifetimeTracker;
use crate::session::LoweringSession;

/// Per-top-level-declaration printing context.
pub struct Printer<'s, 'm> {
    pub sess: &'s mut LoweringSession<'m>,
    pub out: OutputBuf,
    pub hoist: HoistStack,
    pub lifetime: LifetimeTracker,
    /// Inside a synthesized closure class whose captures include `this`,
    /// the spelling `this` must print as the capture field.
    pub closure_this: Option<&'static str>,
}

impl<'s, 'm> Printer<'s, 'm> {
    pub fn new(sess: &'s mut LoweringSession<'m>) -> Self {
        let show_lifetime = sess.config.show_lifetime;
        Printer {
            sess,
            out: OutputBuf::new(),
            hoist: HoistStack::new(),
            lifetime: LifetimeTracker::new(show_lifetime),
            closure_this: None,
        }
    }

    #[inline]
    pub fn arena(&self) -> &NodeArena {
        &self.sess.module.arena
    }

    #[inline]
    pub fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.sess.module.arena
    }

    #[inline]
    pub fn types(&self) -> &TypeInterner {
        &self.sess.module.types
    }

    #[inline]
    pub fn name(&self, name: Name) -> &'static str {
        self.sess.module.interner.lookup(name)
    }

    /// Visible, non-fatal placeholder for a node kind with no rule
    /// (the UnsupportedConstruct policy). `location` is the handler's own
    /// source position.
    pub fn unsupported(&mut self, kind: &str, location: &str) {
        tracing::debug!(kind, location, "unsupported construct");
        self.out
            .append_comment(&format!("UNSUPPORTED at {location}: {kind}"));
    }
}

/// Append the UnsupportedConstruct placeholder, capturing the handler's own
/// file and line.
macro_rules! unsupported {
    ($p:expr, $kind:expr) => {
        $p.unsupported($kind, concat!(file!(), ":", line!()))
    };
}

pub(crate) use unsupported;
