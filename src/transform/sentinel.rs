//! Legacy sentinel replacement
//!
//! Old linker sources spell null pointers as `P` and `S`. They are macros,
//! so they usually reach the tree as untracked names; matching is by
//! spelling rather than by symbol.

use super::{Refactor, RewriteRule};
use std::collections::BTreeMap;
use tracing::info;

impl Refactor {
    /// Replace every non-local reference spelled like a sentinel in all live
    /// bodies and initializers. Returns the number of references replaced.
    pub fn strip_sentinels(&mut self, sentinels: &BTreeMap<String, String>) -> usize {
        let rules: Vec<RewriteRule> = sentinels
            .iter()
            .map(|(name, replacement)| RewriteRule::name(name, replacement, true))
            .collect();
        let live = self.live();
        let replaced = self.apply_rules(&rules, &live);
        info!(replaced, "stripped sentinels");
        replaced
    }
}
