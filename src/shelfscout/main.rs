use chrono::Local;
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use shelfscout::api::ShelfApi;
use shelfscout::config::ScoringConfig;
use shelfscout::error::{Result, ShelfError};
use shelfscout::integrity::{IntegrityReport, IssueSeverity};
use shelfscout::model::{parse_iso_date, Book, BookStatus};
use shelfscout::recommend::{Recommendation, RecommendationType};
use shelfscout::search::{SearchFilters, SortOrder};
use shelfscout::similar::SimilarityScore;
use shelfscout::store::fs::FileStore;
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;
use uuid::Uuid;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: ShelfApi<FileStore>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Commands::Search {
            query,
            author,
            status,
            tag,
            all_tags,
            min_rating,
            series,
            sort,
            limit,
            offset,
        } => handle_search(
            &ctx, query, author, status, tag, all_tags, min_rating, series, sort, limit, offset,
        ),
        Commands::Similar {
            id,
            limit,
            include_read,
        } => handle_similar(&ctx, id, limit, include_read),
        Commands::Favorites { limit } => handle_favorites(&ctx, limit),
        Commands::Recommend { kind, limit } => handle_recommend(&ctx, kind, limit),
        Commands::Next => handle_next(&ctx),
        Commands::Check { book } => handle_check(&ctx, book),
        Commands::Fix { apply } => handle_fix(&mut ctx, apply),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => {
            let proj_dirs = ProjectDirs::from("com", "shelfscout", "shelfscout")
                .ok_or_else(|| ShelfError::Store("Could not determine data dir".to_string()))?;
            proj_dirs.data_dir().to_path_buf()
        }
    };

    let config = ScoringConfig::load(&data_dir).unwrap_or_default();
    let store = FileStore::new(data_dir);
    Ok(AppContext {
        api: ShelfApi::new(store, config),
    })
}

#[allow(clippy::too_many_arguments)]
fn handle_search(
    ctx: &AppContext,
    query: Option<String>,
    author: Option<String>,
    status: Option<String>,
    tags: Vec<String>,
    all_tags: bool,
    min_rating: Option<i32>,
    series: Option<String>,
    sort: Option<String>,
    limit: usize,
    offset: usize,
) -> Result<()> {
    let status = match status {
        Some(raw) => Some(
            BookStatus::parse(&raw)
                .ok_or_else(|| ShelfError::InvalidInput(format!("Unknown status: {}", raw)))?,
        ),
        None => None,
    };
    let sort_by = match sort {
        Some(raw) => SortOrder::parse(&raw)
            .ok_or_else(|| ShelfError::InvalidInput(format!("Unknown sort order: {}", raw)))?,
        None => SortOrder::default(),
    };

    let filters = SearchFilters {
        query,
        author,
        status,
        tags: if tags.is_empty() { None } else { Some(tags) },
        any_tag: !all_tags,
        min_rating,
        series,
        sort_by,
        limit,
        offset,
        ..Default::default()
    };

    let result = ctx.api.search(&filters)?;
    print_books(&result.books, offset);

    if result.total_count > 0 {
        println!(
            "{}",
            format!(
                "Page {} of {} ({} matching)",
                result.page, result.total_pages, result.total_count
            )
            .dimmed()
        );
    }
    Ok(())
}

fn handle_similar(ctx: &AppContext, id: Uuid, limit: usize, include_read: bool) -> Result<()> {
    let scores = ctx.api.find_similar(&id, limit, include_read)?;
    if scores.is_empty() {
        println!("No similar books found.");
        return Ok(());
    }
    print_similarity(&scores);
    Ok(())
}

fn handle_favorites(ctx: &AppContext, limit: usize) -> Result<()> {
    let scores = ctx.api.find_similar_to_favorites(limit)?;
    if scores.is_empty() {
        println!("No favorites to match against yet.");
        return Ok(());
    }
    print_similarity(&scores);
    Ok(())
}

fn handle_recommend(ctx: &AppContext, kind: Option<String>, limit: usize) -> Result<()> {
    let recs = match kind {
        Some(raw) => {
            let kind = RecommendationType::parse(&raw).ok_or_else(|| {
                ShelfError::InvalidInput(format!("Unknown recommendation type: {}", raw))
            })?;
            ctx.api.get_recommendations_by_type(kind, limit)?
        }
        None => ctx.api.get_recommendations(limit)?,
    };

    if recs.is_empty() {
        println!("Nothing to recommend - add some unread books first.");
        return Ok(());
    }
    for (i, rec) in recs.iter().enumerate() {
        print_recommendation(i + 1, rec);
    }
    Ok(())
}

fn handle_next(ctx: &AppContext) -> Result<()> {
    match ctx.api.what_to_read_next()? {
        Some(rec) => print_recommendation(1, &rec),
        None => println!("Nothing to recommend - add some unread books first."),
    }
    Ok(())
}

fn handle_check(ctx: &AppContext, book: Option<Uuid>) -> Result<()> {
    let report = match book {
        Some(id) => ctx.api.check_book(&id)?,
        None => ctx.api.check_all()?,
    };
    print_report(&report);
    Ok(())
}

fn handle_fix(ctx: &mut AppContext, apply: bool) -> Result<()> {
    let report = ctx.api.check_all()?;
    let outcome = ctx.api.fix_issues(&report.issues, !apply)?;

    for detail in &outcome.details {
        println!("{}", detail.dimmed());
    }
    println!(
        "{} fixed, {} skipped, {} failed",
        outcome.fixed, outcome.skipped, outcome.failed
    );
    if !apply {
        println!("{}", "Dry run - pass --apply to write fixes.".yellow());
    }
    Ok(())
}

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;

fn print_books(books: &[Book], offset: usize) {
    if books.is_empty() {
        println!("No books found.");
        return;
    }

    for (i, book) in books.iter().enumerate() {
        let idx_str = format!("{}. ", offset + i + 1);
        let status = status_label(book);
        let time_ago = format_added_ago(book);

        let label = format!("{} — {}", book.title, book.author);
        let fixed_width = idx_str.width() + status.width() + 1 + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let label_display = truncate_to_width(&label, available);
        let padding = available.saturating_sub(label_display.width());

        println!(
            "{}{}{} {} {}",
            idx_str,
            label_display,
            " ".repeat(padding),
            colored_status(book, &status),
            time_ago.dimmed()
        );
    }
}

fn status_label(book: &Book) -> String {
    match book.parsed_status() {
        Some(status) => {
            if let Some(rating) = book.rating.filter(|r| (1..=5).contains(r)) {
                format!("[{} {}]", status.as_str(), "★".repeat(rating as usize))
            } else {
                format!("[{}]", status.as_str())
            }
        }
        None => format!("[{}?]", book.status),
    }
}

fn colored_status(book: &Book, label: &str) -> ColoredString {
    match book.parsed_status() {
        Some(BookStatus::Completed) => label.green(),
        Some(BookStatus::Reading) => label.cyan(),
        Some(BookStatus::OnHold) => label.yellow(),
        Some(BookStatus::Dnf) => label.red(),
        Some(BookStatus::Wishlist) => label.normal(),
        None => label.red(),
    }
}

fn print_similarity(scores: &[SimilarityScore]) {
    for score in scores {
        println!(
            "{:>3}%  {} — {}",
            (score.total_score * 100.0).round() as u32,
            score.book.title.bold(),
            score.book.author
        );
        if !score.match_reasons.is_empty() {
            println!("      {}", score.match_reasons.join("; ").dimmed());
        }
    }
}

fn print_recommendation(index: usize, rec: &Recommendation) {
    println!(
        "{}. {} — {} {}",
        index,
        rec.book.title.bold(),
        rec.book.author,
        format!("({})", rec.kind).dimmed()
    );
    println!("   {}", rec.reason.dimmed());
}

fn print_report(report: &IntegrityReport) {
    println!(
        "Checked {} book(s), {} reading log(s).",
        report.book_count, report.log_count
    );

    for issue in &report.issues {
        let severity = match issue.severity {
            IssueSeverity::Critical => "CRITICAL".red().bold(),
            IssueSeverity::Error => "ERROR".red(),
            IssueSeverity::Warning => "WARNING".yellow(),
            IssueSeverity::Info => "INFO".dimmed(),
        };
        let book_info = issue
            .book_title
            .as_deref()
            .map(|t| format!(" (Book: {})", t))
            .unwrap_or_default();
        println!(
            "  {} {}: {}{}",
            severity,
            issue.category.as_str(),
            issue.message,
            book_info
        );
        if let Some(suggestion) = &issue.suggestion {
            println!("           {}", suggestion.dimmed());
        }
    }

    println!(
        "{}",
        format!(
            "{} critical, {} error(s), {} warning(s), {} info",
            report.critical_count(),
            report.error_count(),
            report.warning_count(),
            report.info_count()
        )
        .dimmed()
    );
    if report.passed() {
        println!("{}", "Integrity check passed.".green());
    } else {
        println!("{}", "Integrity check failed.".red());
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_added_ago(book: &Book) -> String {
    let time_str = book
        .date_added
        .as_deref()
        .and_then(parse_iso_date)
        .map(|added| {
            let days = (Local::now().date_naive() - added).num_days().max(0) as u64;
            let formatter = timeago::Formatter::new();
            formatter.convert(std::time::Duration::from_secs(days * 24 * 60 * 60))
        })
        .unwrap_or_default();

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
