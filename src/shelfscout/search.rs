//! Multi-criteria book search.
//!
//! [`search`] filters the library against an arbitrary conjunction of
//! criteria, sorts deterministically and paginates. The convenience functions
//! below it are thin wrappers that fill in a [`SearchFilters`] and delegate.

use crate::error::{Result, ShelfError};
use crate::model::{parse_iso_date, Book, BookStatus};
use crate::store::DataStore;
use std::cmp::Ordering;

pub const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    TitleAsc,
    TitleDesc,
    AuthorAsc,
    AuthorDesc,
    DateAddedAsc,
    #[default]
    DateAddedDesc,
    DateFinishedAsc,
    DateFinishedDesc,
    RatingAsc,
    RatingDesc,
    PageCountAsc,
    PageCountDesc,
    SeriesIndexAsc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<SortOrder> {
        let order = match raw {
            "title_asc" => SortOrder::TitleAsc,
            "title_desc" => SortOrder::TitleDesc,
            "author_asc" => SortOrder::AuthorAsc,
            "author_desc" => SortOrder::AuthorDesc,
            "date_added_asc" => SortOrder::DateAddedAsc,
            "date_added_desc" => SortOrder::DateAddedDesc,
            "date_finished_asc" => SortOrder::DateFinishedAsc,
            "date_finished_desc" => SortOrder::DateFinishedDesc,
            "rating_asc" => SortOrder::RatingAsc,
            "rating_desc" => SortOrder::RatingDesc,
            "page_count_asc" => SortOrder::PageCountAsc,
            "page_count_desc" => SortOrder::PageCountDesc,
            "series_index_asc" => SortOrder::SeriesIndexAsc,
            _ => return None,
        };
        Some(order)
    }
}

/// Search criteria. Every field is independently optional; an unset field
/// imposes no constraint.
#[derive(Debug, Clone)]
pub struct SearchFilters {
    /// Free-text match against title OR author, case-insensitive substring.
    pub query: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,

    pub status: Option<BookStatus>,
    pub statuses: Option<Vec<BookStatus>>,

    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub unrated_only: bool,

    // ISO date bounds, inclusive
    pub added_after: Option<String>,
    pub added_before: Option<String>,
    pub started_after: Option<String>,
    pub started_before: Option<String>,
    pub finished_after: Option<String>,
    pub finished_before: Option<String>,

    pub min_pages: Option<u32>,
    pub max_pages: Option<u32>,

    pub tags: Option<Vec<String>>,
    /// OR semantics across `tags` when true, AND when false.
    pub any_tag: bool,

    /// Series name, case-insensitive substring.
    pub series: Option<String>,
    /// `Some(true)` = only books in a series, `Some(false)` = standalone only.
    pub in_series: Option<bool>,

    pub publisher: Option<String>,
    pub year_published: Option<i32>,
    pub min_year_published: Option<i32>,
    pub max_year_published: Option<i32>,

    pub has_isbn: Option<bool>,
    pub read_next: Option<bool>,

    pub sort_by: SortOrder,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            query: None,
            title: None,
            author: None,
            status: None,
            statuses: None,
            min_rating: None,
            max_rating: None,
            unrated_only: false,
            added_after: None,
            added_before: None,
            started_after: None,
            started_before: None,
            finished_after: None,
            finished_before: None,
            min_pages: None,
            max_pages: None,
            tags: None,
            any_tag: true,
            series: None,
            in_series: None,
            publisher: None,
            year_published: None,
            min_year_published: None,
            max_year_published: None,
            has_isbn: None,
            read_next: None,
            sort_by: SortOrder::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// One page of results plus pagination metadata. `total_count` covers the
/// full filtered set, not just this page.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub books: Vec<Book>,
    pub total_count: usize,
    pub filters_applied: SearchFilters,
    /// 1-based page number.
    pub page: usize,
    pub total_pages: usize,
}

impl SearchResult {
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Execute a search. `limit == 0` is a caller bug and fails fast.
///
/// Pagination is stable only while the underlying data does not change
/// between calls; each call takes one fresh snapshot from the store.
pub fn search<S: DataStore>(store: &S, filters: &SearchFilters) -> Result<SearchResult> {
    if filters.limit == 0 {
        return Err(ShelfError::InvalidInput(
            "search limit must be at least 1".to_string(),
        ));
    }

    let mut matched: Vec<Book> = store
        .list_books()?
        .into_iter()
        .filter(|book| matches(filters, book))
        .collect();

    matched.sort_by(|a, b| compare(filters.sort_by, a, b).then_with(|| a.id.cmp(&b.id)));

    let total_count = matched.len();
    let total_pages = total_count.div_ceil(filters.limit);
    let page = filters.offset / filters.limit + 1;

    let books: Vec<Book> = matched
        .into_iter()
        .skip(filters.offset)
        .take(filters.limit)
        .collect();

    Ok(SearchResult {
        books,
        total_count,
        filters_applied: filters.clone(),
        page,
        total_pages,
    })
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches(filters: &SearchFilters, book: &Book) -> bool {
    if let Some(query) = &filters.query {
        if !contains_ci(&book.title, query) && !contains_ci(&book.author, query) {
            return false;
        }
    }
    if let Some(title) = &filters.title {
        if !contains_ci(&book.title, title) {
            return false;
        }
    }
    if let Some(author) = &filters.author {
        if !contains_ci(&book.author, author) {
            return false;
        }
    }

    if let Some(status) = filters.status {
        if !book.has_status(status) {
            return false;
        }
    } else if let Some(statuses) = &filters.statuses {
        match book.parsed_status() {
            Some(s) if statuses.contains(&s) => {}
            _ => return false,
        }
    }

    if let Some(min) = filters.min_rating {
        match book.rating {
            Some(r) if r >= min => {}
            _ => return false,
        }
    }
    if let Some(max) = filters.max_rating {
        match book.rating {
            Some(r) if r <= max => {}
            _ => return false,
        }
    }
    if filters.unrated_only && book.rating.is_some() {
        return false;
    }

    let date_bounds = [
        (&filters.added_after, &book.date_added, true),
        (&filters.added_before, &book.date_added, false),
        (&filters.started_after, &book.date_started, true),
        (&filters.started_before, &book.date_started, false),
        (&filters.finished_after, &book.date_finished, true),
        (&filters.finished_before, &book.date_finished, false),
    ];
    for (bound, value, is_after) in date_bounds {
        let Some(bound) = bound else { continue };
        let bound_date = parse_iso_date(bound);
        let book_date = value.as_deref().and_then(parse_iso_date);
        match (bound_date, book_date) {
            (Some(bound), Some(date)) => {
                let ok = if is_after { date >= bound } else { date <= bound };
                if !ok {
                    return false;
                }
            }
            // A date filter never matches a book without a parseable date.
            _ => return false,
        }
    }

    if let Some(min) = filters.min_pages {
        match book.page_count {
            Some(p) if p >= min => {}
            _ => return false,
        }
    }
    if let Some(max) = filters.max_pages {
        match book.page_count {
            Some(p) if p <= max => {}
            _ => return false,
        }
    }

    if let Some(tags) = &filters.tags {
        // Empty tag list matches nothing. Explicit policy, not an omission.
        if tags.is_empty() {
            return false;
        }
        let book_tags: Vec<String> = book.tag_list().iter().map(|t| t.to_lowercase()).collect();
        let wanted: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
        let hit = if filters.any_tag {
            wanted.iter().any(|t| book_tags.contains(t))
        } else {
            wanted.iter().all(|t| book_tags.contains(t))
        };
        if !hit {
            return false;
        }
    }

    if let Some(series) = &filters.series {
        match &book.series {
            Some(s) if contains_ci(s, series) => {}
            _ => return false,
        }
    }
    if let Some(in_series) = filters.in_series {
        let has_series = book.series.as_deref().is_some_and(|s| !s.is_empty());
        if has_series != in_series {
            return false;
        }
    }

    if let Some(publisher) = &filters.publisher {
        match &book.publisher {
            Some(p) if contains_ci(p, publisher) => {}
            _ => return false,
        }
    }

    if let Some(year) = filters.year_published {
        if book.publication_year != Some(year) {
            return false;
        }
    }
    if let Some(min) = filters.min_year_published {
        match book.publication_year {
            Some(y) if y >= min => {}
            _ => return false,
        }
    }
    if let Some(max) = filters.max_year_published {
        match book.publication_year {
            Some(y) if y <= max => {}
            _ => return false,
        }
    }

    if let Some(has_isbn) = filters.has_isbn {
        let present = book.isbn.as_deref().is_some_and(|s| !s.is_empty())
            || book.isbn13.as_deref().is_some_and(|s| !s.is_empty());
        if present != has_isbn {
            return false;
        }
    }

    if let Some(read_next) = filters.read_next {
        if book.read_next != read_next {
            return false;
        }
    }

    true
}

/// Compare with missing sort keys ordering last in both directions, so a
/// "rating desc" listing never leads with unrated books.
fn cmp_option<T: PartialOrd>(a: &Option<T>, b: &Option<T>, reverse: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ord = a.partial_cmp(b).unwrap_or(Ordering::Equal);
            if reverse {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(sort_by: SortOrder, a: &Book, b: &Book) -> Ordering {
    match sort_by {
        SortOrder::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortOrder::TitleDesc => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
        SortOrder::AuthorAsc => a.author.to_lowercase().cmp(&b.author.to_lowercase()),
        SortOrder::AuthorDesc => b.author.to_lowercase().cmp(&a.author.to_lowercase()),
        SortOrder::DateAddedAsc => cmp_option(&a.date_added, &b.date_added, false),
        SortOrder::DateAddedDesc => cmp_option(&a.date_added, &b.date_added, true),
        SortOrder::DateFinishedAsc => cmp_option(&a.date_finished, &b.date_finished, false),
        SortOrder::DateFinishedDesc => cmp_option(&a.date_finished, &b.date_finished, true),
        SortOrder::RatingAsc => cmp_option(&a.rating, &b.rating, false),
        SortOrder::RatingDesc => cmp_option(&a.rating, &b.rating, true),
        SortOrder::PageCountAsc => cmp_option(&a.page_count, &b.page_count, false),
        SortOrder::PageCountDesc => cmp_option(&a.page_count, &b.page_count, true),
        SortOrder::SeriesIndexAsc => cmp_option(&a.series_index, &b.series_index, false),
    }
}

/// Quick free-text search by title or author.
pub fn quick_search<S: DataStore>(store: &S, query: &str, limit: usize) -> Result<Vec<Book>> {
    let filters = SearchFilters {
        query: Some(query.to_string()),
        limit,
        ..Default::default()
    };
    Ok(search(store, &filters)?.books)
}

/// All books by an author, optionally restricted to one status.
pub fn search_by_author<S: DataStore>(
    store: &S,
    author: &str,
    status: Option<BookStatus>,
    limit: usize,
) -> Result<Vec<Book>> {
    let filters = SearchFilters {
        author: Some(author.to_string()),
        status,
        sort_by: SortOrder::TitleAsc,
        limit,
        ..Default::default()
    };
    Ok(search(store, &filters)?.books)
}

/// Books in a series, in series order; books without an index sort last.
pub fn search_by_series<S: DataStore>(store: &S, series: &str, limit: usize) -> Result<Vec<Book>> {
    let filters = SearchFilters {
        series: Some(series.to_string()),
        sort_by: SortOrder::SeriesIndexAsc,
        limit,
        ..Default::default()
    };
    Ok(search(store, &filters)?.books)
}

/// Books matching the given tags; `match_all` switches OR to AND semantics.
pub fn search_by_tags<S: DataStore>(
    store: &S,
    tags: &[String],
    match_all: bool,
    limit: usize,
) -> Result<Vec<Book>> {
    let filters = SearchFilters {
        tags: Some(tags.to_vec()),
        any_tag: !match_all,
        limit,
        ..Default::default()
    };
    Ok(search(store, &filters)?.books)
}

/// Books still waiting to be read (wishlist or on hold).
pub fn unread_books<S: DataStore>(
    store: &S,
    sort_by: SortOrder,
    limit: usize,
) -> Result<Vec<Book>> {
    let filters = SearchFilters {
        statuses: Some(vec![BookStatus::Wishlist, BookStatus::OnHold]),
        sort_by,
        limit,
        ..Default::default()
    };
    Ok(search(store, &filters)?.books)
}

/// Completed books rated at or above `min_rating`.
pub fn highly_rated<S: DataStore>(store: &S, min_rating: i32, limit: usize) -> Result<Vec<Book>> {
    let filters = SearchFilters {
        min_rating: Some(min_rating),
        status: Some(BookStatus::Completed),
        sort_by: SortOrder::RatingDesc,
        limit,
        ..Default::default()
    };
    Ok(search(store, &filters)?.books)
}

pub fn long_books<S: DataStore>(store: &S, min_pages: u32, limit: usize) -> Result<Vec<Book>> {
    let filters = SearchFilters {
        min_pages: Some(min_pages),
        sort_by: SortOrder::PageCountDesc,
        limit,
        ..Default::default()
    };
    Ok(search(store, &filters)?.books)
}

pub fn short_books<S: DataStore>(store: &S, max_pages: u32, limit: usize) -> Result<Vec<Book>> {
    let filters = SearchFilters {
        min_pages: Some(1), // exclude books with no page count
        max_pages: Some(max_pages),
        sort_by: SortOrder::PageCountAsc,
        limit,
        ..Default::default()
    };
    Ok(search(store, &filters)?.books)
}
