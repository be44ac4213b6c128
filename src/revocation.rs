use dashmap::DashMap;

use crate::model::Ms;

/// Revoked-token book-keeping for the embedding auth layer. Each entry keeps
/// the token's own expiry instant: past it the token can no longer
/// authenticate anyway, so the entry reads as not revoked and the pruner
/// drops it. Constructed by the embedder and shared by handle.
pub struct RevocationStore {
    entries: DashMap<String, Ms>,
}

impl RevocationStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Mark `token` revoked until it expires at `expires_at`.
    /// Revoking again overwrites the expiry.
    pub fn revoke(&self, token: impl Into<String>, expires_at: Ms) {
        self.entries.insert(token.into(), expires_at);
        metrics::gauge!(crate::observability::REVOKED_TOKENS_ACTIVE)
            .set(self.entries.len() as f64);
    }

    pub fn is_revoked(&self, token: &str, now: Ms) -> bool {
        self.entries
            .get(token)
            .is_some_and(|entry| *entry.value() > now)
    }

    /// Drop entries at or past their expiry. Returns how many were removed.
    pub fn prune(&self, now: Ms) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        let removed = before.saturating_sub(self.entries.len());
        metrics::gauge!(crate::observability::REVOKED_TOKENS_ACTIVE)
            .set(self.entries.len() as f64);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RevocationStore {
    fn default() -> Self {
        Self::new()
    }
}
