//! Scoring configuration.
//!
//! Every similarity weight, recommendation strategy score and threshold lives
//! here as named data rather than scattered literals, stored in
//! `scoring.json` next to the data files. Tests assert on the exact default
//! values, and tuning a weight never touches scoring code.

use crate::error::{Result, ShelfError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "scoring.json";

/// Weights for the six similarity sub-scores. Must sum to 1.0 so the total
/// stays in [0, 1]; explicit relations (author, series) outweigh inferred
/// ones (genre, length, era, rating).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimilarityWeights {
    pub author: f64,
    pub series: f64,
    pub genre: f64,
    pub length: f64,
    pub era: f64,
    pub rating: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            author: 0.30,
            series: 0.20,
            genre: 0.25,
            length: 0.10,
            era: 0.08,
            rating: 0.07,
        }
    }
}

impl SimilarityWeights {
    pub fn sum(&self) -> f64 {
        self.author + self.series + self.genre + self.length + self.era + self.rating
    }
}

/// Base score per recommendation strategy, all on a shared 0-1 scale so the
/// merged list can rank across strategies. `read_next` stays at 1.0 so an
/// explicit user flag always surfaces first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StrategyScores {
    pub read_next: f64,
    pub by_series: f64,
    pub by_author: f64,
    pub by_genre: f64,
    pub highly_rated: f64,
    pub by_length: f64,
    pub quick_read: f64,
    pub recently_added: f64,
    pub long_awaited: f64,
}

impl Default for StrategyScores {
    fn default() -> Self {
        Self {
            read_next: 1.0,
            by_series: 0.9,
            by_author: 0.8,
            by_genre: 0.7,
            highly_rated: 0.6,
            by_length: 0.5,
            quick_read: 0.4,
            recently_added: 0.35,
            long_awaited: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    /// Similarity results at or below this total score are discarded.
    pub min_similarity: f64,
    /// Publication years this far apart score 0 on the era sub-score.
    pub era_span_years: f64,
    /// A book at most this long counts as a quick read.
    pub quick_read_max_pages: u32,
    /// Minimum Goodreads average for the highly-rated strategy.
    pub highly_rated_goodreads: f64,
    /// Minimum own rating for a book to seed favorites-based similarity.
    pub favorite_min_rating: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_similarity: 0.1,
            era_span_years: 50.0,
            quick_read_max_pages: 200,
            highly_rated_goodreads: 4.0,
            favorite_min_rating: 4,
        }
    }
}

/// Configuration for all discovery heuristics, stored in `scoring.json`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoringConfig {
    #[serde(default)]
    pub similarity: SimilarityWeights,
    #[serde(default)]
    pub recommend: StrategyScores,
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl ScoringConfig {
    /// Load config from the given directory, or return defaults if not found.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(ShelfError::Io)?;
        let config: ScoringConfig =
            serde_json::from_str(&content).map_err(ShelfError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory.
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(ShelfError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(ShelfError::Serialization)?;
        fs::write(config_path, content).map_err(ShelfError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let weights = SimilarityWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_relations_outweigh_inferred_ones() {
        let w = SimilarityWeights::default();
        assert!(w.author > w.length);
        assert!(w.author > w.era);
        assert!(w.author > w.rating);
        assert!(w.series > w.length);
    }

    #[test]
    fn read_next_has_top_strategy_score() {
        let s = StrategyScores::default();
        for other in [
            s.by_series,
            s.by_author,
            s.by_genre,
            s.highly_rated,
            s.by_length,
            s.quick_read,
            s.recently_added,
            s.long_awaited,
        ] {
            assert!(s.read_next > other);
        }
    }

    #[test]
    fn load_missing_config_returns_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ScoringConfig::load(temp_dir.path().join("nope")).unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut config = ScoringConfig::default();
        config.thresholds.quick_read_max_pages = 150;
        config.save(temp_dir.path()).unwrap();

        let loaded = ScoringConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.thresholds.quick_read_max_pages, 150);
        assert_eq!(loaded.similarity, config.similarity);
    }
}
