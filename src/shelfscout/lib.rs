//! # Shelfscout Architecture
//!
//! Shelfscout is a **UI-agnostic discovery library** for a personal book
//! collection—search, similarity, recommendations and integrity checking over
//! `Book`/`ReadingLog` records. It is not a CLI application that happens to
//! have some library code; it's a library that happens to ship a CLI client.
//!
//! ## The Three-Layer Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs + args.rs)                              │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over the discovery modules                   │
//! │  - Holds the scoring configuration                          │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Discovery Modules (search, similar, recommend, integrity)  │
//! │  - Pure business logic over Rust types                      │
//! │  - Free functions generic over the storage backend          │
//! │  - No I/O assumptions whatsoever                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract DataStore trait                                 │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Bad Data Is Reported, Not Raised
//!
//! Records keep their raw stored representation at the boundary (status as a
//! plain string, tags as JSON text, dates as ISO strings). The discovery
//! modules validate on read, and the integrity module exists precisely to
//! surface malformed records as structured issues. A book with an unknown
//! status or broken tag JSON must never prevent the library from loading.
//!
//! Unknown IDs are the same story: `find_similar` on a missing book returns
//! an empty list, `check_book` returns a failed report. "Not found" is
//! expected interactive input, not a programming error. Contract violations
//! (a zero search limit) do fail fast.
//!
//! ## Determinism
//!
//! Every ranked output (search pages, similarity lists, recommendations)
//! breaks score ties by book id, so repeated calls over unchanged data return
//! identical orderings.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade—entry point for all operations
//! - [`search`]: Multi-criteria filtering, sorting and pagination
//! - [`similar`]: Weighted multi-factor similarity scoring
//! - [`recommend`]: Strategy-based reading recommendations
//! - [`integrity`]: Consistency checking and auto-repair
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Book`, `ReadingLog`, `BookStatus`)
//! - [`config`]: Scoring weights and thresholds as data
//! - [`error`]: Error types

pub mod api;
pub mod config;
pub mod error;
pub mod integrity;
pub mod model;
pub mod recommend;
pub mod search;
pub mod similar;
pub mod store;
