//! Compiled rule set cache
//!
//! Compiling every pattern on every submission is wasteful, so the compiled
//! set is kept behind an `Arc` and tagged with the `rule_set_state` revision
//! it was loaded at. Each snapshot costs one revision read; the set is
//! rebuilt only when the revision has moved. A rule committed by another
//! connection becomes visible on the next snapshot.

#![allow(clippy::result_large_err)]

use cmdgate_core::policy::CompiledRuleSet;
use cmdgate_store::errors::Result;
use cmdgate_store::RuleRepo;
use rusqlite::Connection;
use std::sync::{Arc, RwLock};

/// Shared, revision-keyed cache of the compiled rule set
#[derive(Debug, Default)]
pub struct RuleCache {
    current: RwLock<Option<Arc<CompiledRuleSet>>>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled rule set matching the persisted revision
    pub fn snapshot(&self, conn: &Connection) -> Result<Arc<CompiledRuleSet>> {
        let revision = RuleRepo::revision(conn)?;

        if let Some(set) = self.cached() {
            if set.revision() == revision {
                return Ok(set);
            }
        }

        // A rule landing between the two reads leaves this set tagged with
        // the older revision, so the next snapshot reloads it.
        let rules = RuleRepo::list(conn)?;
        let set = Arc::new(CompiledRuleSet::compile(revision, rules));
        tracing::debug!(
            revision,
            rules = set.len(),
            skipped = set.skipped(),
            "Compiled rule set"
        );

        if let Ok(mut guard) = self.current.write() {
            let newer = guard
                .as_ref()
                .map_or(true, |existing| existing.revision() <= revision);
            if newer {
                *guard = Some(Arc::clone(&set));
            }
        }

        Ok(set)
    }

    /// Revision of the cached set, if one has been loaded
    pub fn cached_revision(&self) -> Option<i64> {
        self.cached().map(|set| set.revision())
    }

    fn cached(&self) -> Option<Arc<CompiledRuleSet>> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }
}
