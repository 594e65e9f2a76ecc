//! Similarity scoring between books.
//!
//! A similarity score is a weighted sum of six independently-inspectable
//! sub-scores, each in [0, 1]. The weights come from
//! [`ScoringConfig::similarity`](crate::config::ScoringConfig) and sum to 1.0,
//! so the total is bounded in [0, 1] as well.

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::model::{Book, BookStatus};
use crate::store::DataStore;
use std::cmp::Ordering;
use uuid::Uuid;

pub const DEFAULT_LIMIT: usize = 10;

/// Similarity breakdown for one candidate book.
#[derive(Debug, Clone)]
pub struct SimilarityScore {
    pub book: Book,
    pub author_score: f64,
    pub series_score: f64,
    pub genre_score: f64,
    pub length_score: f64,
    pub era_score: f64,
    pub rating_score: f64,
    pub total_score: f64,
    /// One human-readable line per sub-score that cleared its reporting
    /// threshold. Never empty for a score that itself clears
    /// `thresholds.min_similarity`.
    pub match_reasons: Vec<String>,
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Score `candidate` against `source`.
pub fn score_pair(cfg: &ScoringConfig, source: &Book, candidate: &Book) -> SimilarityScore {
    let weights = cfg.similarity;
    let mut reasons = Vec::new();

    let author_score = if !source.author.is_empty() && eq_ci(&source.author, &candidate.author) {
        reasons.push(format!("Same author: {}", source.author));
        1.0
    } else {
        0.0
    };

    let series_score = match (&source.series, &candidate.series) {
        (Some(a), Some(b)) if !a.is_empty() && eq_ci(a, b) => {
            reasons.push(format!("Same series: {}", a));
            1.0
        }
        _ => 0.0,
    };

    let source_tags: Vec<String> = source.tag_list().iter().map(|t| t.to_lowercase()).collect();
    let candidate_tags: Vec<String> = candidate
        .tag_list()
        .iter()
        .map(|t| t.to_lowercase())
        .collect();
    let genre_score = if source_tags.is_empty() || candidate_tags.is_empty() {
        0.0
    } else {
        let shared: Vec<&String> = source_tags
            .iter()
            .filter(|t| candidate_tags.contains(t))
            .collect();
        let score = shared.len() as f64 / source_tags.len().max(candidate_tags.len()) as f64;
        if score >= 0.5 {
            let names: Vec<&str> = shared.iter().take(3).map(|s| s.as_str()).collect();
            reasons.push(format!("Shared genres: {}", names.join(", ")));
        }
        score
    };

    let length_score = match (source.page_count, candidate.page_count) {
        (Some(a), Some(b)) if a > 0 && b > 0 => {
            let diff = a.abs_diff(b) as f64;
            let score = (1.0 - diff / a.max(b) as f64).max(0.0);
            if score >= 0.8 {
                reasons.push("Similar length".to_string());
            }
            score
        }
        _ => 0.0,
    };

    let era_score = match (source.publication_year, candidate.publication_year) {
        (Some(a), Some(b)) => {
            let diff = (a - b).abs() as f64;
            let score = (1.0 - diff / cfg.thresholds.era_span_years).max(0.0);
            if score >= 0.9 {
                reasons.push("Same publication era".to_string());
            }
            score
        }
        _ => 0.0,
    };

    let rating_score = match (source.rating, candidate.rating) {
        (Some(a), Some(b)) => {
            let diff = (a - b).abs() as f64;
            let score = (1.0 - diff / 4.0).max(0.0);
            if score >= 0.75 {
                reasons.push("You rated these similarly".to_string());
            }
            score
        }
        _ => 0.0,
    };

    let total_score = author_score * weights.author
        + series_score * weights.series
        + genre_score * weights.genre
        + length_score * weights.length
        + era_score * weights.era
        + rating_score * weights.rating;

    // A reportable score must always explain itself, even when no single
    // sub-score cleared its own reason threshold.
    if reasons.is_empty() && total_score > cfg.thresholds.min_similarity {
        reasons.push("Close match across several signals".to_string());
    }

    SimilarityScore {
        book: candidate.clone(),
        author_score,
        series_score,
        genre_score,
        length_score,
        era_score,
        rating_score,
        total_score,
        match_reasons: reasons,
    }
}

fn by_score_desc(a: &SimilarityScore, b: &SimilarityScore) -> Ordering {
    b.total_score
        .partial_cmp(&a.total_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.book.id.cmp(&b.book.id))
}

/// Find books similar to the given one, best match first.
///
/// An unknown `book_id` yields an empty list; the source book itself is never
/// a candidate. With `include_read = false` (the default callers want),
/// already-read books (completed or DNF) are excluded from candidates.
pub fn find_similar<S: DataStore>(
    store: &S,
    cfg: &ScoringConfig,
    book_id: &Uuid,
    limit: usize,
    include_read: bool,
) -> Result<Vec<SimilarityScore>> {
    let Some(source) = store.get_book(book_id)? else {
        return Ok(Vec::new());
    };

    let mut scored: Vec<SimilarityScore> = store
        .list_books()?
        .into_iter()
        .filter(|candidate| candidate.id != source.id)
        .filter(|candidate| {
            include_read
                || !matches!(
                    candidate.parsed_status(),
                    Some(BookStatus::Completed) | Some(BookStatus::Dnf)
                )
        })
        .map(|candidate| score_pair(cfg, &source, &candidate))
        .filter(|score| score.total_score > cfg.thresholds.min_similarity)
        .collect();

    scored.sort_by(by_score_desc);
    scored.truncate(limit);
    Ok(scored)
}

/// Find unread books similar to any book rated at or above `min_rating`.
/// Each candidate keeps its best score across all seeds. Empty when nothing
/// is rated that highly.
pub fn find_similar_to_favorites<S: DataStore>(
    store: &S,
    cfg: &ScoringConfig,
    min_rating: i32,
    limit: usize,
) -> Result<Vec<SimilarityScore>> {
    let books = store.list_books()?;

    let mut seeds: Vec<&Book> = books
        .iter()
        .filter(|b| b.rating.is_some_and(|r| r >= min_rating))
        .collect();
    if seeds.is_empty() {
        return Ok(Vec::new());
    }
    seeds.sort_by_key(|b| b.id);

    let mut scored: Vec<SimilarityScore> = books
        .iter()
        .filter(|candidate| candidate.is_unread())
        .filter_map(|candidate| {
            let mut best: Option<SimilarityScore> = None;
            for seed in &seeds {
                if seed.id == candidate.id {
                    continue;
                }
                let score = score_pair(cfg, seed, candidate);
                let better = best
                    .as_ref()
                    .map(|b| score.total_score > b.total_score)
                    .unwrap_or(true);
                if better {
                    best = Some(score);
                }
            }
            best
        })
        .filter(|score| score.total_score > cfg.thresholds.min_similarity)
        .collect();

    scored.sort_by(by_score_desc);
    scored.truncate(limit);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::*;
    use crate::store::memory::InMemoryStore;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn self_comparison_maxes_author_and_series() {
        let mut book = completed("Dune", "Frank Herbert", 5);
        book.series = Some("Dune Saga".to_string());

        let score = score_pair(&cfg(), &book, &book);
        assert_eq!(score.author_score, 1.0);
        assert_eq!(score.series_score, 1.0);
        assert!(score.total_score <= 1.0);
    }

    #[test]
    fn total_score_is_bounded() {
        let mut a = completed("Dune", "Frank Herbert", 5);
        a.series = Some("Dune Saga".to_string());
        a.tags = Some(r#"["sci-fi"]"#.to_string());
        a.page_count = Some(400);
        a.publication_year = Some(1965);

        let mut b = a.clone();
        b.id = Uuid::new_v4();
        b.title = "Dune Messiah".to_string();

        let score = score_pair(&cfg(), &a, &b);
        assert!(score.total_score > 0.99);
        assert!(score.total_score <= 1.0 + 1e-9);
    }

    #[test]
    fn sub_scores_zero_when_data_missing() {
        let a = completed("Dune", "Frank Herbert", 5);
        let b = wishlist("Emma", "Jane Austen");

        let score = score_pair(&cfg(), &a, &b);
        assert_eq!(score.genre_score, 0.0);
        assert_eq!(score.length_score, 0.0);
        assert_eq!(score.era_score, 0.0);
        assert_eq!(score.rating_score, 0.0);
        assert_eq!(score.author_score, 0.0);
    }

    #[test]
    fn genre_score_grows_with_overlap() {
        let mut a = completed("A", "X", 5);
        a.tags = Some(r#"["sci-fi", "space", "epic"]"#.to_string());

        let mut one_shared = wishlist("B", "Y");
        one_shared.tags = Some(r#"["sci-fi", "noir", "short"]"#.to_string());
        let mut two_shared = wishlist("C", "Z");
        two_shared.tags = Some(r#"["sci-fi", "space", "short"]"#.to_string());

        let low = score_pair(&cfg(), &a, &one_shared);
        let high = score_pair(&cfg(), &a, &two_shared);
        assert!(high.genre_score > low.genre_score);
    }

    #[test]
    fn reported_scores_always_carry_reasons() {
        // No sub-score clears its own reason threshold here, but the total
        // still clears the reporting threshold.
        let mut a = completed("A", "X", 5);
        a.page_count = Some(300);
        a.publication_year = Some(2000);
        let mut b = wishlist("B", "Y");
        b.rating = Some(3); // rating 0.5, below its 0.75 reason cut
        b.page_count = Some(390); // length 0.77, below its 0.8 reason cut
        b.publication_year = Some(2007); // era 0.86, below its 0.9 reason cut

        let score = score_pair(&cfg(), &a, &b);
        assert!(score.total_score > cfg().thresholds.min_similarity);
        assert!(!score.match_reasons.is_empty());
    }

    #[test]
    fn unknown_source_returns_empty() {
        let store = InMemoryStore::new();
        let result = find_similar(&store, &cfg(), &Uuid::new_v4(), 10, false).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn source_is_never_in_results() {
        let source = completed("Dune", "Frank Herbert", 5);
        let sibling = wishlist("Dune Messiah", "Frank Herbert");
        let store = store_with(&[source.clone(), sibling]);

        let results = find_similar(&store, &cfg(), &source.id, 10, true).unwrap();
        assert!(results.iter().all(|s| s.book.id != source.id));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn include_read_gates_completed_and_dnf() {
        let source = completed("Dune", "Frank Herbert", 5);
        let done = completed("Dune Messiah", "Frank Herbert", 4);
        let mut abandoned = wishlist("Children of Dune", "Frank Herbert");
        abandoned.status = "dnf".to_string();
        let open = wishlist("God Emperor of Dune", "Frank Herbert");
        let store = store_with(&[source.clone(), done.clone(), abandoned, open.clone()]);

        let unread_only = find_similar(&store, &cfg(), &source.id, 10, false).unwrap();
        assert_eq!(unread_only.len(), 1);
        assert_eq!(unread_only[0].book.id, open.id);

        let everything = find_similar(&store, &cfg(), &source.id, 10, true).unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn results_sorted_descending_and_deterministic() {
        let mut source = completed("Dune", "Frank Herbert", 5);
        source.tags = Some(r#"["sci-fi"]"#.to_string());

        let strong = wishlist("Dune Messiah", "Frank Herbert");
        let mut weak = wishlist("Solaris", "Stanislaw Lem");
        weak.tags = Some(r#"["sci-fi"]"#.to_string());
        let store = store_with(&[source.clone(), strong, weak]);

        let first = find_similar(&store, &cfg(), &source.id, 10, false).unwrap();
        let second = find_similar(&store, &cfg(), &source.id, 10, false).unwrap();

        let ids: Vec<Uuid> = first.iter().map(|s| s.book.id).collect();
        assert_eq!(ids, second.iter().map(|s| s.book.id).collect::<Vec<_>>());
        for pair in first.windows(2) {
            assert!(pair[0].total_score >= pair[1].total_score);
        }
        assert_eq!(first[0].book.title, "Dune Messiah");
    }

    #[test]
    fn favorites_need_at_least_one_seed() {
        let store = store_with(&[wishlist("Emma", "Jane Austen")]);
        let result = find_similar_to_favorites(&store, &cfg(), 4, 10).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn favorites_surface_unread_matches() {
        let favorite = completed("Dune", "Frank Herbert", 5);
        let unread = wishlist("Dune Messiah", "Frank Herbert");
        let read = completed("Children of Dune", "Frank Herbert", 3);
        let store = store_with(&[favorite, unread.clone(), read]);

        let results = find_similar_to_favorites(&store, &cfg(), 4, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].book.id, unread.id);
        assert!(!results[0].match_reasons.is_empty());
    }
}
