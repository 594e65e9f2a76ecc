//! Reading recommendations.
//!
//! Several independent strategies each nominate unread books with a reason
//! and a score on a shared 0-1 scale; [`get_recommendations`] merges them,
//! de-duplicates by book (keeping the highest-scoring reason) and ranks the
//! result. Strategy base scores live in
//! [`ScoringConfig::recommend`](crate::config::ScoringConfig).

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::model::{parse_iso_date, Book, BookStatus};
use crate::store::DataStore;
use chrono::Local;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_LIMIT: usize = 10;

/// How many candidates a single strategy may nominate per run.
const STRATEGY_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecommendationType {
    ReadNext,
    ByAuthor,
    BySeries,
    ByGenre,
    QuickRead,
    HighlyRated,
    LongAwaited,
    ByLength,
    RecentlyAdded,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::ReadNext => "read_next",
            RecommendationType::ByAuthor => "by_author",
            RecommendationType::BySeries => "by_series",
            RecommendationType::ByGenre => "by_genre",
            RecommendationType::QuickRead => "quick_read",
            RecommendationType::HighlyRated => "highly_rated",
            RecommendationType::LongAwaited => "long_awaited",
            RecommendationType::ByLength => "by_length",
            RecommendationType::RecentlyAdded => "recently_added",
        }
    }

    pub fn parse(raw: &str) -> Option<RecommendationType> {
        [
            RecommendationType::ReadNext,
            RecommendationType::ByAuthor,
            RecommendationType::BySeries,
            RecommendationType::ByGenre,
            RecommendationType::QuickRead,
            RecommendationType::HighlyRated,
            RecommendationType::LongAwaited,
            RecommendationType::ByLength,
            RecommendationType::RecentlyAdded,
        ]
        .into_iter()
        .find(|k| k.as_str() == raw)
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub book: Book,
    pub kind: RecommendationType,
    pub reason: String,
    /// Relevance on the shared 0-1 scale.
    pub score: f64,
}

/// Personalized recommendations across all strategies, best first.
///
/// One snapshot of the library feeds every strategy; a book nominated by
/// several strategies appears once with its highest-scoring reason.
pub fn get_recommendations<S: DataStore>(
    store: &S,
    cfg: &ScoringConfig,
    limit: usize,
) -> Result<Vec<Recommendation>> {
    let books = store.list_books()?;

    let mut all = Vec::new();
    all.extend(recommend_read_next(&books, cfg, STRATEGY_LIMIT));
    all.extend(recommend_by_series(&books, cfg, STRATEGY_LIMIT));
    all.extend(recommend_by_author(&books, cfg, STRATEGY_LIMIT));
    all.extend(recommend_by_genre(&books, cfg, STRATEGY_LIMIT));
    all.extend(recommend_highly_rated(&books, cfg, STRATEGY_LIMIT));
    all.extend(recommend_quick_reads(&books, cfg, STRATEGY_LIMIT));
    all.extend(recommend_long_awaited(&books, cfg, STRATEGY_LIMIT));

    let mut best: HashMap<Uuid, Recommendation> = HashMap::new();
    for rec in all {
        match best.get(&rec.book.id) {
            Some(existing) if existing.score >= rec.score => {}
            _ => {
                best.insert(rec.book.id, rec);
            }
        }
    }

    let mut merged: Vec<Recommendation> = best.into_values().collect();
    merged.sort_by(by_score_desc);
    merged.truncate(limit);
    Ok(merged)
}

/// Recommendations from one strategy only.
pub fn get_recommendations_by_type<S: DataStore>(
    store: &S,
    cfg: &ScoringConfig,
    kind: RecommendationType,
    limit: usize,
) -> Result<Vec<Recommendation>> {
    let books = store.list_books()?;
    let recs = match kind {
        RecommendationType::ReadNext => recommend_read_next(&books, cfg, limit),
        RecommendationType::ByAuthor => recommend_by_author(&books, cfg, limit),
        RecommendationType::BySeries => recommend_by_series(&books, cfg, limit),
        RecommendationType::ByGenre => recommend_by_genre(&books, cfg, limit),
        RecommendationType::QuickRead => recommend_quick_reads(&books, cfg, limit),
        RecommendationType::HighlyRated => recommend_highly_rated(&books, cfg, limit),
        RecommendationType::LongAwaited => recommend_long_awaited(&books, cfg, limit),
        RecommendationType::ByLength => recommend_by_length(&books, cfg, limit),
        RecommendationType::RecentlyAdded => recommend_recently_added(&books, cfg, limit),
    };
    Ok(recs)
}

/// The single best pick, or `None` when nothing is waiting to be read.
pub fn what_to_read_next<S: DataStore>(
    store: &S,
    cfg: &ScoringConfig,
) -> Result<Option<Recommendation>> {
    Ok(get_recommendations(store, cfg, 1)?.into_iter().next())
}

fn by_score_desc(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.book.id.cmp(&b.book.id))
}

fn unread<'a>(books: &'a [Book]) -> impl Iterator<Item = &'a Book> {
    books.iter().filter(|b| b.is_unread())
}

/// Newest first; books without a date sort last, ties broken by id.
fn by_date_added_desc(a: &Book, b: &Book) -> Ordering {
    match (&a.date_added, &b.date_added) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}

fn recommend_read_next(books: &[Book], cfg: &ScoringConfig, limit: usize) -> Vec<Recommendation> {
    let mut flagged: Vec<&Book> = unread(books).filter(|b| b.read_next).collect();
    flagged.sort_by_key(|b| b.id);
    flagged
        .into_iter()
        .take(limit)
        .map(|book| Recommendation {
            book: book.clone(),
            kind: RecommendationType::ReadNext,
            reason: "You marked this as 'read next'".to_string(),
            score: cfg.recommend.read_next,
        })
        .collect()
}

fn recommend_by_series(books: &[Book], cfg: &ScoringConfig, limit: usize) -> Vec<Recommendation> {
    let mut started: Vec<&str> = books
        .iter()
        .filter(|b| b.has_status(BookStatus::Completed))
        .filter_map(|b| b.series.as_deref())
        .filter(|s| !s.is_empty())
        .collect();
    started.sort_unstable();
    started.dedup();

    let mut recommendations = Vec::new();
    for series in started {
        let max_read = books
            .iter()
            .filter(|b| b.has_status(BookStatus::Completed) && b.series.as_deref() == Some(series))
            .filter_map(|b| b.series_index)
            .fold(0.0_f64, f64::max);

        let next = unread(books)
            .filter(|b| b.series.as_deref() == Some(series))
            .filter(|b| b.series_index.is_some_and(|i| i > max_read))
            .min_by(|a, b| {
                a.series_index
                    .partial_cmp(&b.series_index)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.id.cmp(&b.id))
            });

        if let Some(book) = next {
            recommendations.push(Recommendation {
                book: book.clone(),
                kind: RecommendationType::BySeries,
                reason: format!("Continue the {} series", series),
                score: cfg.recommend.by_series,
            });
        }
    }

    recommendations.truncate(limit);
    recommendations
}

fn recommend_by_author(books: &[Book], cfg: &ScoringConfig, limit: usize) -> Vec<Recommendation> {
    let completed: Vec<&Book> = books
        .iter()
        .filter(|b| b.has_status(BookStatus::Completed))
        .collect();
    if completed.is_empty() {
        return Vec::new();
    }

    // (books read, rating sum, rated count) per author
    let mut stats: HashMap<&str, (usize, i64, usize)> = HashMap::new();
    for book in &completed {
        let entry = stats.entry(book.author.as_str()).or_default();
        entry.0 += 1;
        if let Some(rating) = book.rating {
            entry.1 += i64::from(rating);
            entry.2 += 1;
        }
    }

    let mut ranked: Vec<(&str, f64, usize)> = stats
        .into_iter()
        .map(|(author, (count, rating_sum, rated))| {
            let avg = if rated > 0 {
                rating_sum as f64 / rated as f64
            } else {
                3.0
            };
            (author, count as f64 * 0.5 + avg * 0.5, count)
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    ranked.truncate(5);

    let mut recommendations = Vec::new();
    for (author, author_score, count) in ranked {
        let mut candidates: Vec<&Book> = unread(books).filter(|b| b.author == author).collect();
        candidates.sort_by(|a, b| by_date_added_desc(a, b));
        for book in candidates.into_iter().take(2) {
            recommendations.push(Recommendation {
                book: book.clone(),
                kind: RecommendationType::ByAuthor,
                reason: format!("You've enjoyed {} book(s) by {}", count, author),
                score: cfg.recommend.by_author * (author_score / 10.0).min(1.0),
            });
        }
    }

    recommendations.truncate(limit);
    recommendations
}

fn recommend_by_genre(books: &[Book], cfg: &ScoringConfig, limit: usize) -> Vec<Recommendation> {
    let completed: Vec<&Book> = books
        .iter()
        .filter(|b| b.has_status(BookStatus::Completed))
        .collect();
    if completed.is_empty() {
        return Vec::new();
    }

    let mut stats: HashMap<String, (usize, i64, usize)> = HashMap::new();
    for book in &completed {
        for tag in book.tag_list() {
            let entry = stats.entry(tag.to_lowercase()).or_default();
            entry.0 += 1;
            if let Some(rating) = book.rating {
                entry.1 += i64::from(rating);
                entry.2 += 1;
            }
        }
    }
    if stats.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<(String, f64, usize)> = stats
        .into_iter()
        .map(|(genre, (count, rating_sum, rated))| {
            let avg = if rated > 0 {
                rating_sum as f64 / rated as f64
            } else {
                3.0
            };
            (genre, count as f64 * 0.4 + avg * 0.6, count)
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(5);

    let mut recommendations = Vec::new();
    let mut seen: HashSet<Uuid> = HashSet::new();
    for (genre, genre_score, _) in ranked {
        let mut candidates: Vec<&Book> = unread(books)
            .filter(|b| b.tag_list().iter().any(|t| t.to_lowercase() == genre))
            .collect();
        candidates.sort_by(|a, b| by_date_added_desc(a, b));
        for book in candidates.into_iter().take(3) {
            if !seen.insert(book.id) {
                continue;
            }
            recommendations.push(Recommendation {
                book: book.clone(),
                kind: RecommendationType::ByGenre,
                reason: format!("You enjoy {} books", genre),
                score: cfg.recommend.by_genre * (genre_score / 10.0).min(1.0),
            });
        }
    }

    recommendations.truncate(limit);
    recommendations
}

fn recommend_highly_rated(
    books: &[Book],
    cfg: &ScoringConfig,
    limit: usize,
) -> Vec<Recommendation> {
    let mut rated: Vec<&Book> = unread(books)
        .filter(|b| {
            b.goodreads_avg_rating
                .is_some_and(|r| r >= cfg.thresholds.highly_rated_goodreads)
        })
        .collect();
    rated.sort_by(|a, b| {
        b.goodreads_avg_rating
            .partial_cmp(&a.goodreads_avg_rating)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    rated
        .into_iter()
        .take(limit)
        .map(|book| Recommendation {
            book: book.clone(),
            kind: RecommendationType::HighlyRated,
            reason: format!(
                "Highly rated ({:.1} on Goodreads)",
                book.goodreads_avg_rating.unwrap_or_default()
            ),
            score: cfg.recommend.highly_rated,
        })
        .collect()
}

fn recommend_quick_reads(books: &[Book], cfg: &ScoringConfig, limit: usize) -> Vec<Recommendation> {
    let mut short: Vec<&Book> = unread(books)
        .filter(|b| {
            b.page_count
                .is_some_and(|p| p <= cfg.thresholds.quick_read_max_pages)
        })
        .collect();
    short.sort_by(|a, b| a.page_count.cmp(&b.page_count).then_with(|| a.id.cmp(&b.id)));

    short
        .into_iter()
        .take(limit)
        .map(|book| Recommendation {
            book: book.clone(),
            kind: RecommendationType::QuickRead,
            reason: format!(
                "Quick read at just {} pages",
                book.page_count.unwrap_or_default()
            ),
            score: cfg.recommend.quick_read,
        })
        .collect()
}

fn recommend_long_awaited(books: &[Book], cfg: &ScoringConfig, limit: usize) -> Vec<Recommendation> {
    let mut waiting: Vec<&Book> = unread(books).filter(|b| b.date_added.is_some()).collect();
    waiting.sort_by(|a, b| {
        a.date_added
            .cmp(&b.date_added)
            .then_with(|| a.id.cmp(&b.id))
    });

    let today = Local::now().date_naive();
    waiting
        .into_iter()
        .take(limit)
        .map(|book| {
            let days_waiting = book
                .date_added
                .as_deref()
                .and_then(parse_iso_date)
                .map(|added| (today - added).num_days().max(0))
                .unwrap_or(0);
            let time_str = if days_waiting < 365 {
                format!("{} days", days_waiting)
            } else {
                format!("{} year(s)", days_waiting / 365)
            };
            Recommendation {
                book: book.clone(),
                kind: RecommendationType::LongAwaited,
                reason: format!("Been on your list for {}", time_str),
                score: cfg.recommend.long_awaited,
            }
        })
        .collect()
}

/// Books close to the length the reader has actually been finishing lately.
/// Needs at least three recent completions to establish a preference.
fn recommend_by_length(books: &[Book], cfg: &ScoringConfig, limit: usize) -> Vec<Recommendation> {
    let cutoff = Local::now().date_naive() - chrono::Duration::days(90);
    let recent_pages: Vec<u32> = books
        .iter()
        .filter(|b| b.has_status(BookStatus::Completed))
        .filter(|b| {
            b.date_finished
                .as_deref()
                .and_then(parse_iso_date)
                .is_some_and(|d| d >= cutoff)
        })
        .filter_map(|b| b.page_count)
        .collect();
    if recent_pages.len() < 3 {
        return Vec::new();
    }

    let avg = recent_pages.iter().sum::<u32>() as f64 / recent_pages.len() as f64;
    let min_pages = (avg * 0.7) as u32;
    let max_pages = (avg * 1.3) as u32;

    let mut candidates: Vec<&Book> = unread(books)
        .filter(|b| {
            b.page_count
                .is_some_and(|p| p >= min_pages && p <= max_pages)
        })
        .collect();
    candidates.sort_by(|a, b| by_date_added_desc(a, b));

    candidates
        .into_iter()
        .take(limit)
        .map(|book| Recommendation {
            book: book.clone(),
            kind: RecommendationType::ByLength,
            reason: format!(
                "Similar length to books you typically read (~{} pages)",
                avg as u32
            ),
            score: cfg.recommend.by_length,
        })
        .collect()
}

fn recommend_recently_added(
    books: &[Book],
    cfg: &ScoringConfig,
    limit: usize,
) -> Vec<Recommendation> {
    let mut recent: Vec<&Book> = unread(books).collect();
    recent.sort_by(|a, b| by_date_added_desc(a, b));

    recent
        .into_iter()
        .take(limit)
        .map(|book| Recommendation {
            book: book.clone(),
            kind: RecommendationType::RecentlyAdded,
            reason: "Recently added to your list".to_string(),
            score: cfg.recommend.recently_added,
        })
        .collect()
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
    fn empty_library_recommends_nothing() {
        let store = InMemoryStore::new();
        assert!(get_recommendations(&store, &cfg(), 10).unwrap().is_empty());
        assert!(what_to_read_next(&store, &cfg()).unwrap().is_none());
    }

    #[test]
    fn read_next_flag_surfaces_first() {
        let mut flagged = wishlist("Piranesi", "Susanna Clarke");
        flagged.read_next = true;
        let mut short = wishlist("Animal Farm", "George Orwell");
        short.page_count = Some(112);
        let mut popular = wishlist("Project Hail Mary", "Andy Weir");
        popular.goodreads_avg_rating = Some(4.5);

        let store = store_with(&[flagged.clone(), short, popular]);
        let recs = get_recommendations(&store, &cfg(), 10).unwrap();

        assert_eq!(recs[0].book.id, flagged.id);
        assert_eq!(recs[0].kind, RecommendationType::ReadNext);
    }

    #[test]
    fn merged_list_deduplicates_keeping_best_reason() {
        // Qualifies for quick_read (0.4) and highly_rated (0.6): one entry,
        // the higher-scoring reason wins.
        let mut book = wishlist("Animal Farm", "George Orwell");
        book.page_count = Some(112);
        book.goodreads_avg_rating = Some(4.2);

        let store = store_with(&[book.clone()]);
        let recs = get_recommendations(&store, &cfg(), 10).unwrap();

        let hits: Vec<&Recommendation> =
            recs.iter().filter(|r| r.book.id == book.id).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, RecommendationType::HighlyRated);
    }

    #[test]
    fn scores_are_non_increasing_and_ids_unique() {
        let mut a = wishlist("A", "X");
        a.read_next = true;
        let mut b = wishlist("B", "Y");
        b.page_count = Some(90);
        b.goodreads_avg_rating = Some(4.8);
        let mut c = wishlist("C", "Z");
        c.date_added = Some("2020-01-01".to_string());

        let store = store_with(&[a, b, c]);
        let recs = get_recommendations(&store, &cfg(), 10).unwrap();

        for pair in recs.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        let mut ids: Vec<Uuid> = recs.iter().map(|r| r.book.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), recs.len());
        assert!(recs.iter().all(|r| !r.reason.is_empty()));
    }

    #[test]
    fn series_strategy_picks_the_next_unread_index() {
        let mut done = completed("First of the Cycle", "A. Author", 4);
        done.series = Some("The Cycle".to_string());
        done.series_index = Some(1.0);

        // An unread copy at index 1 must not be picked over index 2.
        let mut unread_one = wishlist("First of the Cycle (reissue)", "A. Author");
        unread_one.series = Some("The Cycle".to_string());
        unread_one.series_index = Some(1.0);

        let mut unread_two = wishlist("Second of the Cycle", "A. Author");
        unread_two.series = Some("The Cycle".to_string());
        unread_two.series_index = Some(2.0);

        let store = store_with(&[done, unread_one, unread_two.clone()]);
        let recs =
            get_recommendations_by_type(&store, &cfg(), RecommendationType::BySeries, 10).unwrap();

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].book.id, unread_two.id);
        assert!(recs[0].reason.contains("The Cycle"));
    }

    #[test]
    fn author_strategy_prefers_well_read_authors() {
        let store = store_with(&[
            completed("A1", "Author A", 5),
            completed("A2", "Author A", 5),
            completed("A3", "Author A", 5),
            completed("B1", "Author B", 3),
            completed("B2", "Author B", 3),
            wishlist("A4", "Author A"),
            wishlist("B3", "Author B"),
        ]);

        let recs =
            get_recommendations_by_type(&store, &cfg(), RecommendationType::ByAuthor, 10).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].book.author, "Author A");
        assert!(recs[0].reason.contains("3 book(s)"));
        assert!(recs[0].score > recs[1].score);
    }

    #[test]
    fn genre_strategy_reads_tags_from_completions() {
        let mut liked = completed("Dune", "Frank Herbert", 5);
        liked.tags = Some(r#"["sci-fi"]"#.to_string());
        let mut also_liked = completed("Solaris", "Stanislaw Lem", 4);
        also_liked.tags = Some(r#"["sci-fi"]"#.to_string());
        let mut candidate = wishlist("Roadside Picnic", "Strugatsky");
        candidate.tags = Some(r#"["Sci-Fi"]"#.to_string());

        let store = store_with(&[liked, also_liked, candidate.clone()]);
        let recs =
            get_recommendations_by_type(&store, &cfg(), RecommendationType::ByGenre, 10).unwrap();

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].book.id, candidate.id);
        assert!(recs[0].reason.contains("sci-fi"));
    }

    #[test]
    fn quick_read_respects_the_page_threshold() {
        let mut inside = wishlist("Short", "X");
        inside.page_count = Some(200);
        let mut outside = wishlist("Long", "Y");
        outside.page_count = Some(201);

        let store = store_with(&[inside.clone(), outside]);
        let recs =
            get_recommendations_by_type(&store, &cfg(), RecommendationType::QuickRead, 10).unwrap();

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].book.id, inside.id);
    }

    #[test]
    fn long_awaited_orders_oldest_first() {
        let mut old = wishlist("Old", "X");
        old.date_added = Some("2019-06-01".to_string());
        let mut newer = wishlist("Newer", "Y");
        newer.date_added = Some("2024-06-01".to_string());

        let store = store_with(&[newer, old.clone()]);
        let recs =
            get_recommendations_by_type(&store, &cfg(), RecommendationType::LongAwaited, 10)
                .unwrap();

        assert_eq!(recs[0].book.id, old.id);
        assert!(recs[0].reason.contains("year"));
    }

    #[test]
    fn only_unread_books_are_ever_recommended() {
        let mut reading = book("Now Reading", "X", BookStatus::Reading);
        reading.read_next = true;
        reading.page_count = Some(100);
        let mut done = completed("Done", "Y", 5);
        done.read_next = true;

        let store = store_with(&[reading, done]);
        let recs = get_recommendations(&store, &cfg(), 10).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn stable_output_across_repeated_calls() {
        let mut a = wishlist("A", "X");
        a.page_count = Some(100);
        let mut b = wishlist("B", "Y");
        b.page_count = Some(100);

        let store = store_with(&[a, b]);
        let first = get_recommendations(&store, &cfg(), 10).unwrap();
        let second = get_recommendations(&store, &cfg(), 10).unwrap();

        let ids = |recs: &[Recommendation]| recs.iter().map(|r| r.book.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }
}
