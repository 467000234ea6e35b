//! Ingestion limits
//!
//! Limits are clamped on the way in, so an `IngestConfig` is always usable.
//! Key bounds are not clamped: a range outside them is rejected instead.

/// Upper bound for moves resolved per individual
pub const MAX_MOVE_LIMIT: usize = 50;

/// Upper bound for keys taken from one type or generation listing
pub const MAX_GROUP_LIMIT: usize = 500;

/// Configuration for an [`Ingestor`](crate::Ingestor)
///
/// # Example
///
/// ```
/// use pokedex_ingest::IngestConfig;
///
/// let config = IngestConfig::default().with_move_limit(0);
/// assert_eq!(config.move_limit(), 1);
/// assert_eq!(config.max_key(), Some(1025));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// First N moves of each individual, in source order
    move_limit: usize,
    /// Default listing size for type/generation ingestion
    group_limit: usize,
    /// Smallest valid external ID
    min_key: u32,
    /// Largest valid external ID, if the source has one
    max_key: Option<u32>,
}

impl IngestConfig {
    pub fn with_move_limit(mut self, n: usize) -> Self {
        self.set_move_limit(n);
        self
    }

    pub fn with_group_limit(mut self, n: usize) -> Self {
        self.set_group_limit(n);
        self
    }

    /// Set the valid external ID bounds; a zero minimum becomes 1
    pub fn with_key_bounds(mut self, min_key: u32, max_key: Option<u32>) -> Self {
        self.min_key = min_key.max(1);
        self.max_key = max_key;
        self
    }

    pub fn move_limit(&self) -> usize {
        self.move_limit
    }

    pub fn set_move_limit(&mut self, n: usize) {
        self.move_limit = n.clamp(1, MAX_MOVE_LIMIT);
    }

    pub fn group_limit(&self) -> usize {
        self.group_limit
    }

    pub fn set_group_limit(&mut self, n: usize) {
        self.group_limit = n.clamp(1, MAX_GROUP_LIMIT);
    }

    pub fn min_key(&self) -> u32 {
        self.min_key
    }

    pub fn max_key(&self) -> Option<u32> {
        self.max_key
    }

    /// Clamp a caller-supplied listing limit, falling back to the default
    pub fn effective_group_limit(&self, requested: Option<usize>) -> usize {
        requested
            .map(|n| n.clamp(1, MAX_GROUP_LIMIT))
            .unwrap_or(self.group_limit)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            move_limit: 5,
            group_limit: 20,
            min_key: 1,
            max_key: Some(1025),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.move_limit(), 5);
        assert_eq!(config.group_limit(), 20);
        assert_eq!(config.min_key(), 1);
    }

    #[test]
    fn test_limits_are_clamped() {
        let config = IngestConfig::default()
            .with_move_limit(10_000)
            .with_group_limit(0);
        assert_eq!(config.move_limit(), MAX_MOVE_LIMIT);
        assert_eq!(config.group_limit(), 1);
        assert_eq!(config.effective_group_limit(Some(9999)), MAX_GROUP_LIMIT);
        assert_eq!(config.effective_group_limit(None), 1);
    }

    #[test]
    fn test_zero_min_key_becomes_one() {
        let config = IngestConfig::default().with_key_bounds(0, None);
        assert_eq!(config.min_key(), 1);
        assert_eq!(config.max_key(), None);
    }
}
