//! # API Facade
//!
//! [`ShelfApi`] is a thin facade over the discovery and integrity modules and
//! the single entry point for UI clients. It dispatches, fills in configured
//! defaults, and returns structured types; business logic lives in the
//! modules it delegates to, and nothing here touches stdout or the
//! filesystem directly.
//!
//! Generic over [`DataStore`] so the same facade runs against `FileStore` in
//! production and `InMemoryStore` in tests.

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::integrity::{self, FixOutcome, IntegrityIssue, IntegrityReport};
use crate::model::{Book, BookStatus};
use crate::recommend::{self, Recommendation, RecommendationType};
use crate::search::{self, SearchFilters, SearchResult, SortOrder};
use crate::similar::{self, SimilarityScore};
use crate::store::DataStore;
use uuid::Uuid;

pub struct ShelfApi<S: DataStore> {
    store: S,
    config: ScoringConfig,
}

impl<S: DataStore> ShelfApi<S> {
    pub fn new(store: S, config: ScoringConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    // --- Search ---

    pub fn search(&self, filters: &SearchFilters) -> Result<SearchResult> {
        search::search(&self.store, filters)
    }

    pub fn quick_search(&self, query: &str, limit: usize) -> Result<Vec<Book>> {
        search::quick_search(&self.store, query, limit)
    }

    pub fn search_by_author(
        &self,
        author: &str,
        status: Option<BookStatus>,
        limit: usize,
    ) -> Result<Vec<Book>> {
        search::search_by_author(&self.store, author, status, limit)
    }

    pub fn search_by_series(&self, series: &str, limit: usize) -> Result<Vec<Book>> {
        search::search_by_series(&self.store, series, limit)
    }

    pub fn search_by_tags(
        &self,
        tags: &[String],
        match_all: bool,
        limit: usize,
    ) -> Result<Vec<Book>> {
        search::search_by_tags(&self.store, tags, match_all, limit)
    }

    pub fn unread_books(&self, sort_by: SortOrder, limit: usize) -> Result<Vec<Book>> {
        search::unread_books(&self.store, sort_by, limit)
    }

    pub fn highly_rated(&self, min_rating: i32, limit: usize) -> Result<Vec<Book>> {
        search::highly_rated(&self.store, min_rating, limit)
    }

    // --- Similarity ---

    pub fn find_similar(
        &self,
        book_id: &Uuid,
        limit: usize,
        include_read: bool,
    ) -> Result<Vec<SimilarityScore>> {
        similar::find_similar(&self.store, &self.config, book_id, limit, include_read)
    }

    pub fn find_similar_to_favorites(&self, limit: usize) -> Result<Vec<SimilarityScore>> {
        similar::find_similar_to_favorites(
            &self.store,
            &self.config,
            self.config.thresholds.favorite_min_rating,
            limit,
        )
    }

    // --- Recommendations ---

    pub fn get_recommendations(&self, limit: usize) -> Result<Vec<Recommendation>> {
        recommend::get_recommendations(&self.store, &self.config, limit)
    }

    pub fn get_recommendations_by_type(
        &self,
        kind: RecommendationType,
        limit: usize,
    ) -> Result<Vec<Recommendation>> {
        recommend::get_recommendations_by_type(&self.store, &self.config, kind, limit)
    }

    pub fn what_to_read_next(&self) -> Result<Option<Recommendation>> {
        recommend::what_to_read_next(&self.store, &self.config)
    }

    // --- Integrity ---

    pub fn check_all(&self) -> Result<IntegrityReport> {
        integrity::check_all(&self.store)
    }

    pub fn check_book(&self, book_id: &Uuid) -> Result<IntegrityReport> {
        integrity::check_book(&self.store, book_id)
    }

    pub fn fix_issues(&mut self, issues: &[IntegrityIssue], dry_run: bool) -> Result<FixOutcome> {
        integrity::fix_issues(&mut self.store, issues, dry_run)
    }
}
