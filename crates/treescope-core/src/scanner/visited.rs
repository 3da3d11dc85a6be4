/// Canonical directories claimed by one build pass.
///
/// Real directories below a claimed directory are owned by it: the build
/// reaches them through their real path and never through a link. A
/// followed link is only descended when its canonical target lies outside
/// every claim, and claims are only added between parallel rounds, so which
/// path owns a directory never depends on worker scheduling.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone)]
pub struct VisitedSet {
    claims: HashSet<PathBuf>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `canonical` and everything below it. Returns `false` if it was
    /// already covered by an earlier claim.
    pub fn claim(&mut self, canonical: PathBuf) -> bool {
        if self.covers(&canonical) {
            return false;
        }
        self.claims.insert(canonical)
    }

    /// Whether `canonical` is a claimed directory or lies below one.
    pub fn covers(&self, canonical: &Path) -> bool {
        canonical.ancestors().any(|a| self.claims.contains(a))
    }

    /// Whether `canonical` is exactly the top of a claim.
    pub fn is_claim_root(&self, canonical: &Path) -> bool {
        self.claims.contains(canonical)
    }

    /// Number of claims.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}
