//! Logical speaker ids → model embedding indices.
//!
//! The UI-facing speaker selector uses small dense ids (0–4 in the reference
//! deployment) while the vocoder was trained with sparse embedding indices.
//! The table is total: any id outside the configured pairs resolves to the
//! designated default embedding, so resolution can never fail.

use serde::Deserialize;

/// Immutable speaker id translation table.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeakerMap {
    /// `(logical id, embedding index)` pairs.
    pairs: Vec<(i64, i64)>,
    /// Embedding index used for any logical id not in `pairs`.
    default: i64,
}

impl SpeakerMap {
    pub fn new(pairs: Vec<(i64, i64)>, default: i64) -> Self {
        Self { pairs, default }
    }

    /// Resolve a logical speaker id to its model embedding index.
    pub fn resolve(&self, logical_id: i64) -> i64 {
        self.pairs
            .iter()
            .find(|(logical, _)| *logical == logical_id)
            .map(|(_, embedding)| *embedding)
            .unwrap_or(self.default)
    }

    /// Logical ids with an explicit mapping, in table order.
    pub fn logical_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.pairs.iter().map(|(logical, _)| *logical)
    }
}

impl Default for SpeakerMap {
    /// Table of the reference voice set.
    fn default() -> Self {
        Self::new(vec![(0, 79), (1, 90), (2, 33), (3, 109), (4, 100)], 79)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_table_resolves_every_logical_id() {
        let map = SpeakerMap::default();
        assert_eq!(map.resolve(0), 79);
        assert_eq!(map.resolve(1), 90);
        assert_eq!(map.resolve(2), 33);
        assert_eq!(map.resolve(3), 109);
        assert_eq!(map.resolve(4), 100);
    }

    #[test]
    fn unmapped_id_falls_back_to_default() {
        let map = SpeakerMap::default();
        assert_eq!(map.resolve(99), 79);
        assert_eq!(map.resolve(-1), 79);
    }

    #[test]
    fn deserializes_from_config_json() {
        let map: SpeakerMap =
            serde_json::from_str(r#"{ "pairs": [[0, 7], [1, 11]], "default": 7 }"#).unwrap();
        assert_eq!(map.resolve(1), 11);
        assert_eq!(map.resolve(5), 7);
        assert_eq!(map.logical_ids().collect::<Vec<_>>(), vec![0, 1]);
    }
}
