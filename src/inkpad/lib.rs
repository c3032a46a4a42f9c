//! # Inkpad Architecture
//!
//! Inkpad is a **UI-agnostic blog-management library**. The CLI binary is
//! one client of it; an HTTP adapter would be another. That distinction
//! drives the layering:
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
//! │  - Thin facade over commands                                │
//! │  - Holds the store and the caller's Viewer                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic per content kind                          │
//! │  - Visibility, search, tree and tag rules live here         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract StorageBackend trait                            │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular arguments, returns regular
//! `Result` types, and never touches stdout, stderr, the process exit
//! code or a terminal. The same core could back a GraphQL server.
//!
//! ## Authentication
//!
//! There is exactly one author. Every operation takes a
//! [`model::Viewer`] saying whether the caller is that author; hidden
//! and soft-deleted content filters out for anonymous viewers, and all
//! writes (plus draft/template/hashtag/image reads) require the author.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade — entry point for all operations
//! - [`commands`]: Business logic per content kind
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Category`, `Post`, `Viewer`, ...)
//! - [`tree`]: Nested-set maintenance for the category forest
//! - [`visibility`]: Pure visibility predicates
//! - [`search`]: Keyword matching and highlight-interval merging
//! - [`pagination`]: Page slicing and target anchoring
//! - [`tags`]: Hashtag registry reconciliation
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod pagination;
pub mod search;
pub mod store;
pub mod tags;
pub mod tree;
pub mod visibility;
