use super::DataStore;
use crate::error::{Result, ShelfError};
use crate::model::{Book, ReadingLog};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const BOOKS_FILENAME: &str = "books.json";
const LOGS_FILENAME: &str = "logs.json";

/// File-based storage: the whole library as `books.json` and `logs.json` in
/// one data directory. Libraries are small (hundreds to low thousands of
/// records), so whole-file load/save per operation keeps the format trivially
/// inspectable and editable by hand.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(ShelfError::Io)?;
        }
        Ok(())
    }

    fn load_books(&self) -> Result<Vec<Book>> {
        let path = self.root.join(BOOKS_FILENAME);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).map_err(ShelfError::Io)?;
        let books: Vec<Book> = serde_json::from_str(&content).map_err(ShelfError::Serialization)?;
        Ok(books)
    }

    fn save_books(&self, books: &[Book]) -> Result<()> {
        self.ensure_dir()?;
        let path = self.root.join(BOOKS_FILENAME);
        let content = serde_json::to_string_pretty(books).map_err(ShelfError::Serialization)?;
        fs::write(path, content).map_err(ShelfError::Io)?;
        Ok(())
    }

    fn load_logs(&self) -> Result<Vec<ReadingLog>> {
        let path = self.root.join(LOGS_FILENAME);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).map_err(ShelfError::Io)?;
        let logs: Vec<ReadingLog> =
            serde_json::from_str(&content).map_err(ShelfError::Serialization)?;
        Ok(logs)
    }

    fn save_logs(&self, logs: &[ReadingLog]) -> Result<()> {
        self.ensure_dir()?;
        let path = self.root.join(LOGS_FILENAME);
        let content = serde_json::to_string_pretty(logs).map_err(ShelfError::Serialization)?;
        fs::write(path, content).map_err(ShelfError::Io)?;
        Ok(())
    }
}

impl DataStore for FileStore {
    fn save_book(&mut self, book: &Book) -> Result<()> {
        let mut books = self.load_books()?;
        match books.iter_mut().find(|b| b.id == book.id) {
            Some(existing) => *existing = book.clone(),
            None => books.push(book.clone()),
        }
        self.save_books(&books)
    }

    fn get_book(&self, id: &Uuid) -> Result<Option<Book>> {
        Ok(self.load_books()?.into_iter().find(|b| b.id == *id))
    }

    fn list_books(&self) -> Result<Vec<Book>> {
        self.load_books()
    }

    fn update_book(&mut self, book: &Book) -> Result<()> {
        let mut books = self.load_books()?;
        let existing = books
            .iter_mut()
            .find(|b| b.id == book.id)
            .ok_or(ShelfError::BookNotFound(book.id))?;
        *existing = book.clone();
        self.save_books(&books)
    }

    fn delete_book(&mut self, id: &Uuid) -> Result<()> {
        let mut books = self.load_books()?;
        let before = books.len();
        books.retain(|b| b.id != *id);
        if books.len() == before {
            return Err(ShelfError::BookNotFound(*id));
        }
        self.save_books(&books)
    }

    fn save_log(&mut self, log: &ReadingLog) -> Result<()> {
        let mut logs = self.load_logs()?;
        match logs.iter_mut().find(|l| l.id == log.id) {
            Some(existing) => *existing = log.clone(),
            None => logs.push(log.clone()),
        }
        self.save_logs(&logs)
    }

    fn list_logs(&self) -> Result<Vec<ReadingLog>> {
        self.load_logs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookStatus;

    #[test]
    fn empty_directory_lists_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());
        assert!(store.list_books().unwrap().is_empty());
        assert!(store.list_logs().unwrap().is_empty());
    }

    #[test]
    fn books_persist_across_store_instances() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path().to_path_buf());

        let mut book = Book::new("Dune", "Frank Herbert");
        book.status = BookStatus::Completed.as_str().to_string();
        book.rating = Some(5);
        store.save_book(&book).unwrap();

        let reopened = FileStore::new(temp_dir.path().to_path_buf());
        let loaded = reopened.get_book(&book.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Dune");
        assert_eq!(loaded.rating, Some(5));
    }

    #[test]
    fn update_replaces_in_place() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path().to_path_buf());

        let mut book = Book::new("Dune", "Frank Herbert");
        store.save_book(&book).unwrap();

        book.rating = Some(4);
        store.update_book(&book).unwrap();

        let books = store.list_books().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].rating, Some(4));
    }

    #[test]
    fn update_unknown_book_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path().to_path_buf());
        let book = Book::new("Dune", "Frank Herbert");
        assert!(matches!(
            store.update_book(&book),
            Err(ShelfError::BookNotFound(_))
        ));
    }

    #[test]
    fn logs_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path().to_path_buf());

        let book = Book::new("Dune", "Frank Herbert");
        store.save_book(&book).unwrap();

        let mut log = ReadingLog::new(book.id);
        log.pages_read = Some(25);
        log.date = Some("2024-05-10".to_string());
        store.save_log(&log).unwrap();

        let logs = store.logs_for_book(&book.id).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].pages_read, Some(25));
    }
}
