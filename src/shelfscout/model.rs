//! Core data types: [`Book`], [`ReadingLog`], and [`BookStatus`].
//!
//! Fields that cross the store boundary keep their raw stored representation:
//! `status` is a plain string, `tags` is JSON array text, dates are ISO-8601
//! strings. The accessors on [`Book`] validate on read, so a record with a bad
//! status or malformed tags still loads and can be reported by the integrity
//! checker instead of poisoning the whole data set at deserialization time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookStatus {
    Wishlist,
    Reading,
    Completed,
    OnHold,
    Dnf,
}

impl BookStatus {
    pub const ALL: [BookStatus; 5] = [
        BookStatus::Wishlist,
        BookStatus::Reading,
        BookStatus::Completed,
        BookStatus::OnHold,
        BookStatus::Dnf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Wishlist => "wishlist",
            BookStatus::Reading => "reading",
            BookStatus::Completed => "completed",
            BookStatus::OnHold => "on_hold",
            BookStatus::Dnf => "dnf",
        }
    }

    /// Parse a stored status string. Returns `None` for anything outside the
    /// enum; an unrecognized value is an integrity violation, not a crash.
    pub fn parse(raw: &str) -> Option<BookStatus> {
        BookStatus::ALL.iter().copied().find(|s| s.as_str() == raw)
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    /// Raw status string as stored; validate with [`Book::parsed_status`].
    pub status: String,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub page_count: Option<u32>,
    /// Reading position in `"<current>/<total>"` form.
    #[serde(default)]
    pub progress: Option<String>,
    /// JSON array text, e.g. `["fantasy", "classics"]`.
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub series_index: Option<f64>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub isbn13: Option<String>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub date_started: Option<String>,
    #[serde(default)]
    pub date_finished: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub goodreads_avg_rating: Option<f64>,
    #[serde(default)]
    pub read_next: bool,
    #[serde(default)]
    pub comments: Option<String>,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            status: BookStatus::Wishlist.as_str().to_string(),
            rating: None,
            page_count: None,
            progress: None,
            tags: None,
            series: None,
            series_index: None,
            isbn: None,
            isbn13: None,
            date_added: None,
            date_started: None,
            date_finished: None,
            publication_year: None,
            publisher: None,
            goodreads_avg_rating: None,
            read_next: false,
            comments: None,
        }
    }

    /// The validated status, or `None` if the stored string is not a known
    /// status value.
    pub fn parsed_status(&self) -> Option<BookStatus> {
        BookStatus::parse(&self.status)
    }

    pub fn has_status(&self, status: BookStatus) -> bool {
        self.parsed_status() == Some(status)
    }

    /// Unread means the book is still waiting: wishlist or on hold.
    pub fn is_unread(&self) -> bool {
        matches!(
            self.parsed_status(),
            Some(BookStatus::Wishlist) | Some(BookStatus::OnHold)
        )
    }

    /// Parsed tag list. Malformed JSON or a non-list payload yields an empty
    /// vec here; the integrity checker reports the malformation separately.
    pub fn tag_list(&self) -> Vec<String> {
        let Some(raw) = self.tags.as_deref() else {
            return Vec::new();
        };
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingLog {
    pub id: Uuid,
    pub book_id: Uuid,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub pages_read: Option<i32>,
    #[serde(default)]
    pub start_page: Option<i32>,
    #[serde(default)]
    pub end_page: Option<i32>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub location: Option<String>,
}

impl ReadingLog {
    pub fn new(book_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            date: None,
            pages_read: None,
            start_page: None,
            end_page: None,
            duration_minutes: None,
            location: None,
        }
    }
}

/// Parse a `"<current>/<total>"` progress string into its two page numbers.
/// Returns `None` when the string does not fit that shape.
pub fn parse_progress(raw: &str) -> Option<(u32, u32)> {
    let (current, total) = raw.split_once('/')?;
    let current = current.trim().parse().ok()?;
    let total = total.trim().parse().ok()?;
    Some((current, total))
}

/// Parse an ISO-8601 date string (`YYYY-MM-DD`).
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
