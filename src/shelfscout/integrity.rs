//! Data integrity checking and repair.
//!
//! [`check_all`] scans a snapshot of the whole library for structural and
//! semantic violations and returns them as structured [`IntegrityIssue`]
//! records; nothing the scanner finds is ever raised as an error, since
//! surfacing bad data without crashing is the point. [`fix_issues`] repairs
//! the auto-fixable subset, with dry-run as the default.

use crate::error::Result;
use crate::model::{parse_iso_date, parse_progress, Book, BookStatus, ReadingLog};
use crate::store::DataStore;
use chrono::{DateTime, Local, NaiveDate, Utc};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Info => "info",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Error => "error",
            IssueSeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCategory {
    RequiredField,
    Status,
    Rating,
    Dates,
    Progress,
    TagFormat,
    Series,
    Duplicate,
    OrphanedLog,
    Log,
    Isbn,
    Existence,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 12] = [
        IssueCategory::RequiredField,
        IssueCategory::Status,
        IssueCategory::Rating,
        IssueCategory::Dates,
        IssueCategory::Progress,
        IssueCategory::TagFormat,
        IssueCategory::Series,
        IssueCategory::Duplicate,
        IssueCategory::OrphanedLog,
        IssueCategory::Log,
        IssueCategory::Isbn,
        IssueCategory::Existence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::RequiredField => "required_field",
            IssueCategory::Status => "status",
            IssueCategory::Rating => "rating",
            IssueCategory::Dates => "dates",
            IssueCategory::Progress => "progress",
            IssueCategory::TagFormat => "tag_format",
            IssueCategory::Series => "series",
            IssueCategory::Duplicate => "duplicate",
            IssueCategory::OrphanedLog => "orphaned_log",
            IssueCategory::Log => "log",
            IssueCategory::Isbn => "isbn",
            IssueCategory::Existence => "existence",
        }
    }
}

/// One violation found during checking.
#[derive(Debug, Clone)]
pub struct IntegrityIssue {
    pub severity: IssueSeverity,
    pub category: IssueCategory,
    pub message: String,
    pub book_id: Option<Uuid>,
    pub book_title: Option<String>,
    pub suggestion: Option<String>,
}

impl IntegrityIssue {
    fn new(severity: IssueSeverity, category: IssueCategory, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            book_id: None,
            book_title: None,
            suggestion: None,
        }
    }

    fn for_book(mut self, book: &Book) -> Self {
        self.book_id = Some(book.id);
        if !book.title.is_empty() {
            self.book_title = Some(book.title.clone());
        }
        self
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.severity.as_str().to_uppercase(),
            self.category.as_str(),
            self.message
        )?;
        if let Some(title) = &self.book_title {
            write!(f, " (Book: {})", title)?;
        }
        Ok(())
    }
}

/// Result of an integrity scan.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub checked_at: DateTime<Utc>,
    pub book_count: usize,
    pub log_count: usize,
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    fn new() -> Self {
        Self {
            checked_at: Utc::now(),
            book_count: 0,
            log_count: 0,
            issues: Vec::new(),
        }
    }

    fn count(&self, severity: IssueSeverity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn critical_count(&self) -> usize {
        self.count(IssueSeverity::Critical)
    }

    pub fn error_count(&self) -> usize {
        self.count(IssueSeverity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(IssueSeverity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(IssueSeverity::Info)
    }

    /// A data set passes when nothing error-level or worse was found.
    pub fn passed(&self) -> bool {
        self.critical_count() == 0 && self.error_count() == 0
    }

    pub fn issues_by_severity(&self, severity: IssueSeverity) -> Vec<&IntegrityIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    pub fn issues_by_category(&self, category: IssueCategory) -> Vec<&IntegrityIssue> {
        self.issues
            .iter()
            .filter(|i| i.category == category)
            .collect()
    }
}

/// Run every check over the full library. One snapshot of books and logs
/// backs the entire scan.
pub fn check_all<S: DataStore>(store: &S) -> Result<IntegrityReport> {
    let books = store.list_books()?;
    let logs = store.list_logs()?;
    let today = Local::now().date_naive();

    let mut report = IntegrityReport::new();
    report.book_count = books.len();
    report.log_count = logs.len();

    for book in &books {
        report.issues.extend(check_single_book(book, today));
    }
    report.issues.extend(check_duplicates(&books));
    report.issues.extend(check_logs(&logs, &books));

    Ok(report)
}

/// Run the same rule set scoped to one book and its logs. An unknown ID
/// yields a failed report with one issue, never an error.
pub fn check_book<S: DataStore>(store: &S, book_id: &Uuid) -> Result<IntegrityReport> {
    let mut report = IntegrityReport::new();

    let Some(book) = store.get_book(book_id)? else {
        report.issues.push(IntegrityIssue::new(
            IssueSeverity::Error,
            IssueCategory::Existence,
            format!("Book not found: {}", book_id),
        ));
        return Ok(report);
    };

    let today = Local::now().date_naive();
    report.book_count = 1;
    report.issues.extend(check_single_book(&book, today));

    let logs = store.logs_for_book(book_id)?;
    report.log_count = logs.len();
    for log in &logs {
        report.issues.extend(check_log_fields(log, Some(&book)));
    }

    Ok(report)
}

fn check_single_book(book: &Book, today: NaiveDate) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    issues.extend(check_required_fields(book));
    issues.extend(check_status(book));
    issues.extend(check_dates(book, today));
    issues.extend(check_rating(book));
    issues.extend(check_progress(book));
    issues.extend(check_tags(book));
    issues.extend(check_series(book));
    issues.extend(check_isbn(book));
    issues
}

fn check_required_fields(book: &Book) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    if book.title.trim().is_empty() {
        issues.push(
            IntegrityIssue::new(
                IssueSeverity::Critical,
                IssueCategory::RequiredField,
                "Missing title",
            )
            .for_book(book)
            .suggest("Add a title to the book"),
        );
    }

    if book.author.trim().is_empty() {
        issues.push(
            IntegrityIssue::new(
                IssueSeverity::Error,
                IssueCategory::RequiredField,
                "Missing author",
            )
            .for_book(book)
            .suggest("Add an author to the book"),
        );
    }

    issues
}

fn check_status(book: &Book) -> Vec<IntegrityIssue> {
    if book.status.is_empty() || book.parsed_status().is_some() {
        return Vec::new();
    }

    let valid: Vec<&str> = BookStatus::ALL.iter().map(|s| s.as_str()).collect();
    vec![IntegrityIssue::new(
        IssueSeverity::Error,
        IssueCategory::Status,
        format!("Invalid status: {}", book.status),
    )
    .for_book(book)
    .suggest(format!("Valid statuses: {}", valid.join(", ")))]
}

fn check_dates(book: &Book, today: NaiveDate) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    let mut parse = |raw: &Option<String>| -> Option<NaiveDate> {
        let raw = raw.as_deref()?;
        match parse_iso_date(raw) {
            Some(date) => Some(date),
            None => {
                issues.push(
                    IntegrityIssue::new(
                        IssueSeverity::Error,
                        IssueCategory::Dates,
                        format!("Invalid date format: {}", raw),
                    )
                    .for_book(book),
                );
                None
            }
        }
    };

    let added = parse(&book.date_added);
    let started = parse(&book.date_started);
    let finished = parse(&book.date_finished);

    if let (Some(started), Some(finished)) = (started, finished) {
        if started > finished {
            issues.push(
                IntegrityIssue::new(
                    IssueSeverity::Error,
                    IssueCategory::Dates,
                    "Start date is after finish date",
                )
                .for_book(book)
                .suggest("Swap the dates or correct one of them"),
            );
        }
    }

    if let (Some(added), Some(started)) = (added, started) {
        if added > started {
            issues.push(
                IntegrityIssue::new(
                    IssueSeverity::Warning,
                    IssueCategory::Dates,
                    "Added date is after start date",
                )
                .for_book(book),
            );
        }
    }

    if book.has_status(BookStatus::Completed) && book.date_finished.is_none() {
        issues.push(
            IntegrityIssue::new(
                IssueSeverity::Warning,
                IssueCategory::Dates,
                "Completed book missing finish date",
            )
            .for_book(book)
            .suggest("Add a finish date"),
        );
    }

    if book.has_status(BookStatus::Reading) && book.date_started.is_none() {
        issues.push(
            IntegrityIssue::new(
                IssueSeverity::Info,
                IssueCategory::Dates,
                "Currently reading book missing start date",
            )
            .for_book(book),
        );
    }

    if finished.is_some_and(|f| f > today) {
        issues.push(
            IntegrityIssue::new(
                IssueSeverity::Warning,
                IssueCategory::Dates,
                "Finish date is in the future",
            )
            .for_book(book),
        );
    }

    issues
}

fn check_rating(book: &Book) -> Vec<IntegrityIssue> {
    let Some(rating) = book.rating else {
        return Vec::new();
    };
    let mut issues = Vec::new();

    if !(1..=5).contains(&rating) {
        issues.push(
            IntegrityIssue::new(
                IssueSeverity::Error,
                IssueCategory::Rating,
                format!("Invalid rating: {} (must be 1-5)", rating),
            )
            .for_book(book),
        );
    }

    if !book.has_status(BookStatus::Completed) {
        issues.push(
            IntegrityIssue::new(
                IssueSeverity::Info,
                IssueCategory::Rating,
                "Book has rating but status is not 'completed'",
            )
            .for_book(book),
        );
    }

    issues
}

fn check_progress(book: &Book) -> Vec<IntegrityIssue> {
    let Some(raw) = book.progress.as_deref().filter(|p| !p.is_empty()) else {
        return Vec::new();
    };
    let mut issues = Vec::new();

    match parse_progress(raw) {
        Some((current, total)) => {
            if current > total {
                issues.push(
                    IntegrityIssue::new(
                        IssueSeverity::Warning,
                        IssueCategory::Progress,
                        format!("Current progress ({}) exceeds total ({})", current, total),
                    )
                    .for_book(book),
                );
            }
            if let Some(pages) = book.page_count {
                if total != pages {
                    issues.push(
                        IntegrityIssue::new(
                            IssueSeverity::Info,
                            IssueCategory::Progress,
                            format!(
                                "Progress total ({}) differs from page count ({})",
                                total, pages
                            ),
                        )
                        .for_book(book),
                    );
                }
            }
        }
        None => {
            issues.push(
                IntegrityIssue::new(
                    IssueSeverity::Warning,
                    IssueCategory::Progress,
                    format!("Invalid progress format: {}", raw),
                )
                .for_book(book),
            );
        }
    }

    issues
}

fn check_tags(book: &Book) -> Vec<IntegrityIssue> {
    let Some(raw) = book.tags.as_deref().filter(|t| !t.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(_)) => Vec::new(),
        Ok(_) => vec![IntegrityIssue::new(
            IssueSeverity::Error,
            IssueCategory::TagFormat,
            "Tags are not stored as list",
        )
        .for_book(book)],
        Err(_) => vec![IntegrityIssue::new(
            IssueSeverity::Error,
            IssueCategory::TagFormat,
            "Invalid JSON in tags field",
        )
        .for_book(book)],
    }
}

fn check_series(book: &Book) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    let has_series = book.series.as_deref().is_some_and(|s| !s.is_empty());

    if has_series && book.series_index.is_none() {
        issues.push(
            IntegrityIssue::new(
                IssueSeverity::Warning,
                IssueCategory::Series,
                format!(
                    "Book in series '{}' missing series index",
                    book.series.as_deref().unwrap_or_default()
                ),
            )
            .for_book(book),
        );
    }

    if book.series_index.is_some() && !has_series {
        issues.push(
            IntegrityIssue::new(
                IssueSeverity::Warning,
                IssueCategory::Series,
                "Book has series index but no series name",
            )
            .for_book(book),
        );
    }

    issues
}

fn normalize_isbn(raw: &str) -> String {
    raw.replace(['-', ' '], "")
}

fn check_isbn(book: &Book) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    for raw in [book.isbn.as_deref(), book.isbn13.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
    {
        let isbn = normalize_isbn(raw);
        match isbn.len() {
            10 => {
                if !validate_isbn10(&isbn) {
                    issues.push(
                        IntegrityIssue::new(
                            IssueSeverity::Warning,
                            IssueCategory::Isbn,
                            format!("Invalid ISBN-10 checksum: {}", raw),
                        )
                        .for_book(book),
                    );
                }
            }
            13 => {
                if !validate_isbn13(&isbn) {
                    issues.push(
                        IntegrityIssue::new(
                            IssueSeverity::Warning,
                            IssueCategory::Isbn,
                            format!("Invalid ISBN-13 checksum: {}", raw),
                        )
                        .for_book(book),
                    );
                }
            }
            len => {
                issues.push(
                    IntegrityIssue::new(
                        IssueSeverity::Warning,
                        IssueCategory::Isbn,
                        format!("ISBN has invalid length ({}): {}", len, raw),
                    )
                    .for_book(book),
                );
            }
        }
    }

    issues
}

fn validate_isbn10(isbn: &str) -> bool {
    if isbn.len() != 10 {
        return false;
    }
    let mut total = 0u32;
    for (i, c) in isbn.chars().enumerate() {
        let value = if i == 9 && (c == 'X' || c == 'x') {
            10
        } else {
            match c.to_digit(10) {
                Some(d) => d,
                None => return false,
            }
        };
        total += value * (10 - i as u32);
    }
    total % 11 == 0
}

fn validate_isbn13(isbn: &str) -> bool {
    if isbn.len() != 13 {
        return false;
    }
    let mut total = 0u32;
    for (i, c) in isbn.chars().enumerate() {
        let Some(d) = c.to_digit(10) else {
            return false;
        };
        total += if i % 2 == 0 { d } else { d * 3 };
    }
    total % 10 == 0
}

fn check_duplicates(books: &[Book]) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    // isbn and isbn13 share one identifier space after stripping separators,
    // so one entry with hyphens and one without still collide.
    let mut by_isbn: HashMap<String, usize> = HashMap::new();
    for book in books {
        let mut own: Vec<String> = [book.isbn.as_deref(), book.isbn13.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .map(normalize_isbn)
            .collect();
        own.sort();
        own.dedup();
        for isbn in own {
            *by_isbn.entry(isbn).or_default() += 1;
        }
    }
    let mut duplicate_isbns: Vec<(&String, &usize)> =
        by_isbn.iter().filter(|(_, n)| **n > 1).collect();
    duplicate_isbns.sort();
    for (isbn, count) in duplicate_isbns {
        issues.push(
            IntegrityIssue::new(
                IssueSeverity::Error,
                IssueCategory::Duplicate,
                format!("Duplicate ISBN found: {} ({} books)", isbn, count),
            )
            .suggest("Review and merge duplicate entries"),
        );
    }

    let mut by_title_author: HashMap<(String, String), Vec<&Book>> = HashMap::new();
    for book in books {
        by_title_author
            .entry((book.title.to_lowercase(), book.author.to_lowercase()))
            .or_default()
            .push(book);
    }
    let mut near_duplicates: Vec<&Vec<&Book>> = by_title_author
        .values()
        .filter(|group| group.len() > 1)
        .collect();
    near_duplicates.sort_by_key(|group| group[0].id);
    for group in near_duplicates {
        issues.push(
            IntegrityIssue::new(
                IssueSeverity::Warning,
                IssueCategory::Duplicate,
                format!(
                    "Possible duplicate: '{}' by {} ({} entries)",
                    group[0].title,
                    group[0].author,
                    group.len()
                ),
            )
            .suggest("Review if these are the same book"),
        );
    }

    issues
}

fn check_logs(logs: &[ReadingLog], books: &[Book]) -> Vec<IntegrityIssue> {
    let by_id: HashMap<Uuid, &Book> = books.iter().map(|b| (b.id, b)).collect();
    let mut issues = Vec::new();

    for log in logs {
        match by_id.get(&log.book_id) {
            Some(book) => issues.extend(check_log_fields(log, Some(book))),
            None => {
                issues.push(
                    IntegrityIssue::new(
                        IssueSeverity::Error,
                        IssueCategory::OrphanedLog,
                        format!(
                            "Reading log {} references non-existent book {}",
                            log.id, log.book_id
                        ),
                    )
                    .suggest("Delete the orphaned log or restore the book"),
                );
                issues.extend(check_log_fields(log, None));
            }
        }
    }

    issues
}

fn check_log_fields(log: &ReadingLog, book: Option<&Book>) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    let mut push = |mut issue: IntegrityIssue| {
        if let Some(book) = book {
            issue = issue.for_book(book);
        }
        issues.push(issue);
    };

    if log.pages_read.is_some_and(|p| p < 0) {
        push(IntegrityIssue::new(
            IssueSeverity::Error,
            IssueCategory::Log,
            format!("Negative pages read: {}", log.pages_read.unwrap_or_default()),
        ));
    }

    if let (Some(start), Some(end)) = (log.start_page, log.end_page) {
        if start > end {
            push(IntegrityIssue::new(
                IssueSeverity::Error,
                IssueCategory::Log,
                format!("Start page ({}) > end page ({})", start, end),
            ));
        }
    }

    if log.duration_minutes.is_some_and(|d| d < 0) {
        push(IntegrityIssue::new(
            IssueSeverity::Error,
            IssueCategory::Log,
            format!(
                "Negative duration: {}",
                log.duration_minutes.unwrap_or_default()
            ),
        ));
    }

    issues
}

/// Outcome of a repair run.
#[derive(Debug, Default, Clone)]
pub struct FixOutcome {
    pub fixed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub details: Vec<String>,
}

/// Attempt to auto-correct the fixable subset of `issues`.
///
/// The repair decision for each issue is computed the same way in both modes;
/// `dry_run` only gates the final write, so a dry run reports exactly what a
/// real run would do. A failing write is counted and the batch continues.
pub fn fix_issues<S: DataStore>(
    store: &mut S,
    issues: &[IntegrityIssue],
    dry_run: bool,
) -> Result<FixOutcome> {
    let mut outcome = FixOutcome::default();

    for issue in issues {
        let Some(fix) = plan_fix(store, issue)? else {
            outcome.skipped += 1;
            outcome
                .details
                .push(format!("Skipped: {} (not auto-fixable)", issue.message));
            continue;
        };

        if dry_run {
            outcome.fixed += 1;
            outcome.details.push(format!("Would fix: {}", issue.message));
            continue;
        }

        match store.update_book(&fix) {
            Ok(()) => {
                outcome.fixed += 1;
                outcome.details.push(format!("Fixed: {}", issue.message));
            }
            Err(err) => {
                outcome.failed += 1;
                outcome
                    .details
                    .push(format!("Failed: {} - {}", issue.message, err));
            }
        }
    }

    Ok(outcome)
}

/// Compute the repaired record for an issue, or `None` when it is not
/// auto-fixable (wrong category, missing book, or nothing to change).
fn plan_fix<S: DataStore>(store: &S, issue: &IntegrityIssue) -> Result<Option<Book>> {
    if issue.category != IssueCategory::TagFormat {
        return Ok(None);
    }
    let Some(book_id) = issue.book_id else {
        return Ok(None);
    };
    let Some(mut book) = store.get_book(&book_id)? else {
        return Ok(None);
    };

    let Some(raw) = book.tags.as_deref().filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if matches!(
        serde_json::from_str::<serde_json::Value>(raw),
        Ok(serde_json::Value::Array(_))
    ) {
        return Ok(None); // already valid
    }

    // Treat the raw value as comma-separated text and re-encode it.
    let tags: Vec<String> = raw
        .split(',')
        .map(|t| t.trim().trim_matches(|c| c == '[' || c == ']' || c == '"'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect();
    if tags.is_empty() {
        return Ok(None);
    }

    book.tags = Some(serde_json::to_string(&tags)?);
    Ok(Some(book))
}
