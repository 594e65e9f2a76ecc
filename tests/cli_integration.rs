use assert_cmd::Command;
use predicates::prelude::*;
use shelfscout::model::{Book, BookStatus};
use shelfscout::store::fs::FileStore;
use shelfscout::store::DataStore;
use std::path::Path;

fn seed_library(dir: &Path) -> Vec<Book> {
    let mut store = FileStore::new(dir.to_path_buf());

    let mut dune = Book::new("Dune", "Frank Herbert");
    dune.status = BookStatus::Completed.as_str().to_string();
    dune.rating = Some(5);
    dune.tags = Some(r#"["sci-fi", "classics"]"#.to_string());
    dune.date_added = Some("2022-01-10".to_string());
    dune.date_finished = Some("2022-02-01".to_string());

    let mut hobbit = Book::new("The Hobbit", "J.R.R. Tolkien");
    hobbit.status = BookStatus::Wishlist.as_str().to_string();
    hobbit.page_count = Some(310);
    hobbit.read_next = true;
    hobbit.date_added = Some("2023-05-01".to_string());

    store.save_book(&dune).unwrap();
    store.save_book(&hobbit).unwrap();
    vec![dune, hobbit]
}

fn scout(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("shelfscout").unwrap();
    cmd.arg("--data-dir").arg(dir);
    cmd
}

#[test]
fn search_lists_matching_books() {
    let temp_dir = tempfile::tempdir().unwrap();
    seed_library(temp_dir.path());

    scout(temp_dir.path())
        .arg("search")
        .arg("dune")
        .assert()
        .success()
        .stdout(predicates::str::contains("Dune"))
        .stdout(predicates::str::contains("1 matching"))
        .stdout(predicates::str::contains("The Hobbit").not());
}

#[test]
fn search_on_empty_library_reports_nothing_found() {
    let temp_dir = tempfile::tempdir().unwrap();

    scout(temp_dir.path())
        .arg("search")
        .arg("anything")
        .assert()
        .success()
        .stdout(predicates::str::contains("No books found."));
}

#[test]
fn next_surfaces_the_read_next_flag() {
    let temp_dir = tempfile::tempdir().unwrap();
    seed_library(temp_dir.path());

    scout(temp_dir.path())
        .arg("next")
        .assert()
        .success()
        .stdout(predicates::str::contains("The Hobbit"))
        .stdout(predicates::str::contains("read next"));
}

#[test]
fn check_reports_issues_and_verdict() {
    let temp_dir = tempfile::tempdir().unwrap();
    let books = seed_library(temp_dir.path());

    // Clean library passes.
    scout(temp_dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicates::str::contains("Integrity check passed."));

    // Break one record: inverted reading progress.
    let mut store = FileStore::new(temp_dir.path().to_path_buf());
    let mut dune = books[0].clone();
    dune.progress = Some("500/300".to_string());
    dune.status = "misfiled".to_string();
    store.update_book(&dune).unwrap();

    scout(temp_dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicates::str::contains("exceeds"))
        .stdout(predicates::str::contains("Invalid status"))
        .stdout(predicates::str::contains("Integrity check failed."));
}

#[test]
fn fix_is_a_dry_run_unless_applied() {
    let temp_dir = tempfile::tempdir().unwrap();
    let books = seed_library(temp_dir.path());

    let mut store = FileStore::new(temp_dir.path().to_path_buf());
    let mut dune = books[0].clone();
    dune.tags = Some("sci-fi, classics".to_string());
    store.update_book(&dune).unwrap();

    scout(temp_dir.path())
        .arg("fix")
        .assert()
        .success()
        .stdout(predicates::str::contains("Would fix"))
        .stdout(predicates::str::contains("Dry run"));

    let untouched = store.get_book(&dune.id).unwrap().unwrap();
    assert_eq!(untouched.tags.as_deref(), Some("sci-fi, classics"));

    scout(temp_dir.path())
        .arg("fix")
        .arg("--apply")
        .assert()
        .success()
        .stdout(predicates::str::contains("1 fixed"));

    let repaired = store.get_book(&dune.id).unwrap().unwrap();
    assert_eq!(repaired.tag_list(), vec!["sci-fi", "classics"]);
}
