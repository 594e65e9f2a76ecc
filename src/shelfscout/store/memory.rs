use super::DataStore;
use crate::error::{Result, ShelfError};
use crate::model::{Book, ReadingLog};
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    books: HashMap<Uuid, Book>,
    logs: HashMap<Uuid, ReadingLog>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for InMemoryStore {
    fn save_book(&mut self, book: &Book) -> Result<()> {
        self.books.insert(book.id, book.clone());
        Ok(())
    }

    fn get_book(&self, id: &Uuid) -> Result<Option<Book>> {
        Ok(self.books.get(id).cloned())
    }

    fn list_books(&self) -> Result<Vec<Book>> {
        Ok(self.books.values().cloned().collect())
    }

    fn update_book(&mut self, book: &Book) -> Result<()> {
        if !self.books.contains_key(&book.id) {
            return Err(ShelfError::BookNotFound(book.id));
        }
        self.books.insert(book.id, book.clone());
        Ok(())
    }

    fn delete_book(&mut self, id: &Uuid) -> Result<()> {
        if self.books.remove(id).is_none() {
            return Err(ShelfError::BookNotFound(*id));
        }
        Ok(())
    }

    fn save_log(&mut self, log: &ReadingLog) -> Result<()> {
        self.logs.insert(log.id, log.clone());
        Ok(())
    }

    fn list_logs(&self) -> Result<Vec<ReadingLog>> {
        Ok(self.logs.values().cloned().collect())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::BookStatus;

    /// Build a book with the given status, ready for further field tweaks.
    pub fn book(title: &str, author: &str, status: BookStatus) -> Book {
        let mut book = Book::new(title, author);
        book.status = status.as_str().to_string();
        book
    }

    /// A completed, rated book.
    pub fn completed(title: &str, author: &str, rating: i32) -> Book {
        let mut book = book(title, author, BookStatus::Completed);
        book.rating = Some(rating);
        book.date_finished = Some("2024-03-01".to_string());
        book
    }

    /// A wishlist book.
    pub fn wishlist(title: &str, author: &str) -> Book {
        book(title, author, BookStatus::Wishlist)
    }

    /// Store seeded from a slice of books.
    pub fn store_with(books: &[Book]) -> InMemoryStore {
        let mut store = InMemoryStore::new();
        for book in books {
            store.save_book(book).unwrap();
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::model::BookStatus;

    #[test]
    fn save_and_get_round_trip() {
        let mut store = InMemoryStore::new();
        let book = wishlist("Dune", "Frank Herbert");
        store.save_book(&book).unwrap();

        let loaded = store.get_book(&book.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Dune");
    }

    #[test]
    fn get_unknown_book_is_none() {
        let store = InMemoryStore::new();
        assert!(store.get_book(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn update_unknown_book_errors() {
        let mut store = InMemoryStore::new();
        let book = wishlist("Dune", "Frank Herbert");
        assert!(matches!(
            store.update_book(&book),
            Err(ShelfError::BookNotFound(_))
        ));
    }

    #[test]
    fn logs_for_book_filters_by_id() {
        let mut store = InMemoryStore::new();
        let book = completed("Dune", "Frank Herbert", 5);
        let other = completed("Emma", "Jane Austen", 4);
        store.save_book(&book).unwrap();
        store.save_book(&other).unwrap();

        let mut log = ReadingLog::new(book.id);
        log.pages_read = Some(40);
        store.save_log(&log).unwrap();
        store.save_log(&ReadingLog::new(other.id)).unwrap();

        let logs = store.logs_for_book(&book.id).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].pages_read, Some(40));
    }

    #[test]
    fn fixture_statuses() {
        assert!(wishlist("A", "B").is_unread());
        assert!(completed("A", "B", 5).has_status(BookStatus::Completed));
    }
}
