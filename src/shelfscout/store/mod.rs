//! Storage layer.
//!
//! The [`DataStore`] trait is the boundary to the persistent book store. The
//! discovery and integrity modules only ever read through it (plus the single
//! `update_book` write used by the repair path), so any backend that can hand
//! out `Book`/`ReadingLog` records works:
//!
//! - [`fs::FileStore`]: production storage, `books.json` + `logs.json` in a
//!   data directory
//! - [`memory::InMemoryStore`]: in-memory storage for tests
//!
//! Each logical operation (a search, a full integrity check, a recommendation
//! run) fetches its records in one or two calls and computes over that
//! snapshot; the store is never held open across independent operations.

use crate::error::Result;
use crate::model::{Book, ReadingLog};
use uuid::Uuid;

pub mod fs;
pub mod memory;

/// Abstract interface over the book store.
pub trait DataStore {
    /// Save a book (create or update).
    fn save_book(&mut self, book: &Book) -> Result<()>;

    /// Get a book by ID. `None` for an unknown ID; unknown IDs are expected
    /// input, not errors.
    fn get_book(&self, id: &Uuid) -> Result<Option<Book>>;

    /// List all books.
    fn list_books(&self) -> Result<Vec<Book>>;

    /// Update an existing book. Errors if the book does not exist. This is
    /// the only write the integrity repair path performs.
    fn update_book(&mut self, book: &Book) -> Result<()>;

    /// Delete a book permanently.
    fn delete_book(&mut self, id: &Uuid) -> Result<()>;

    /// Save a reading log entry.
    fn save_log(&mut self, log: &ReadingLog) -> Result<()>;

    /// List all reading logs.
    fn list_logs(&self) -> Result<Vec<ReadingLog>>;

    /// List reading logs for one book.
    fn logs_for_book(&self, book_id: &Uuid) -> Result<Vec<ReadingLog>> {
        Ok(self
            .list_logs()?
            .into_iter()
            .filter(|log| log.book_id == *book_id)
            .collect())
    }
}
