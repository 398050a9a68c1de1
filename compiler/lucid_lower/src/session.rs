//! Lowering session state.
//!
//! Everything mutable a run needs travels in one [`LoweringSession`] value:
//! feature flags, synthetic-name counters, the this-pointer offset map and
//! mutable access to the module for synthesis. A session is constructed once
//! per run and dropped at the end; there are no process-wide singletons, so
//! independent runs cannot observe each other's flags or counters.

use rustc_hash::FxHashMap;

use lucid_ir::{DeclId, Module, Name, Span};

use crate::config::Config;
use crate::flags::FeatureFlags;

/// Per-kind counters for synthetic names that have no source anchor.
///
/// Counters are session-scoped: lowering the same module twice yields the
/// same names both times.
#[derive(Default, Debug)]
pub struct NameCounters {
    temp: u32,
    closure: u32,
}

impl NameCounters {
    /// Next `__tmp<N>` temporary name.
    pub fn next_temp(&mut self) -> String {
        let n = self.temp;
        self.temp += 1;
        format!("__tmp{n}")
    }

    /// Fallback closure discriminator for classes without a source span.
    pub fn next_closure(&mut self) -> u32 {
        let n = self.closure;
        self.closure += 1;
        n
    }
}

/// The `(derived, base) -> this-pointer byte offset` map of the
/// virtual-dispatch backend.
///
/// Populated while a record's layout is walked, consulted when a cast
/// between the two types is lowered. Records must be visited in declaration
/// order for the map to be complete at every consultation site.
#[derive(Default, Debug)]
pub struct OffsetMap {
    offsets: FxHashMap<(DeclId, DeclId), u64>,
}

impl OffsetMap {
    pub fn record(&mut self, derived: DeclId, base: DeclId, offset: u64) {
        self.offsets.insert((derived, base), offset);
    }

    pub fn lookup(&self, derived: DeclId, base: DeclId) -> Option<u64> {
        self.offsets.get(&(derived, base)).copied()
    }
}

/// State for one lowering run.
pub struct LoweringSession<'m> {
    pub module: &'m mut Module,
    pub config: Config,
    pub flags: FeatureFlags,
    pub counters: NameCounters,
    pub offsets: OffsetMap,
    /// Names assigned to closure classes this session; cached so repeated
    /// lowering of the same closure yields identical text.
    pub closure_names: FxHashMap<DeclId, String>,
}

impl<'m> LoweringSession<'m> {
    pub fn new(module: &'m mut Module, config: Config) -> Self {
        LoweringSession {
            module,
            config,
            flags: FeatureFlags::empty(),
            counters: NameCounters::default(),
            offsets: OffsetMap::default(),
            closure_names: FxHashMap::default(),
        }
    }

    /// Monotonically set a feature flag.
    pub fn enable(&mut self, flag: FeatureFlags) {
        if !self.flags.contains(flag) {
            tracing::debug!(?flag, "feature flag enabled");
        }
        self.flags |= flag;
    }

    /// Resolve an interned name.
    #[inline]
    pub fn name(&self, name: Name) -> &'static str {
        self.module.interner.lookup(name)
    }

    /// Intern a string.
    #[inline]
    pub fn intern(&self, text: &str) -> Name {
        self.module.interner.intern(text)
    }

    /// `__<base>`: the marker prefix of every synthesized entity.
    pub fn internal_name(&self, base: &str) -> String {
        format!("__{base}")
    }

    /// `__<prefix><line>_<col>`: deterministic name anchored at a source
    /// location, so repeated lowering of the same lexical construct yields
    /// identical text.
    pub fn line_col_name(&self, prefix: &str, span: Span) -> String {
        let lc = self.module.line_index.span_start(span);
        format!("__{prefix}{}_{}", lc.line, lc.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucid_ir::LineIndex;
    use pretty_assertions::assert_eq;

    #[test]
    fn counters_are_deterministic() {
        let mut counters = NameCounters::default();
        assert_eq!(counters.next_temp(), "__tmp0");
        assert_eq!(counters.next_temp(), "__tmp1");

        let mut fresh = NameCounters::default();
        assert_eq!(fresh.next_temp(), "__tmp0");
    }

    #[test]
    fn offset_map_round_trip() {
        let mut map = OffsetMap::default();
        let derived = DeclId::new(1);
        let base = DeclId::new(2);
        map.record(derived, base, 8);
        assert_eq!(map.lookup(derived, base), Some(8));
        assert_eq!(map.lookup(base, derived), None);
    }

    #[test]
    fn line_col_names_are_stable() {
        let mut module = Module::new();
        module.line_index = LineIndex::new("void f()\n{\n  auto l = 1;\n}\n");
        let mut session = LoweringSession::new(&mut module, Config::default());
        let span = Span::new(13, 14);
        assert_eq!(session.line_col_name("lambda_", span), "__lambda_3_3");
        assert_eq!(session.line_col_name("lambda_", span), "__lambda_3_3");
        session.enable(FeatureFlags::ALLOC);
        assert!(session.flags.contains(FeatureFlags::ALLOC));
    }
}
