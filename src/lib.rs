//! # QA Advisor
//!
//! A rule-based advisory service for QA and project management teams. It
//! scores free-text feature descriptions, questions and project briefs with
//! deterministic lexical heuristics, tracks per-session history and a defect
//! log in SQLite, and detects visual regressions between UI screenshots.
//!
//! ## Features
//!
//! - **Test strategy scoring**: complexity, risk and a categorized test plan
//! - **Domain Q&A**: intent classification and keyword-triggered advice
//! - **Delivery forecasting**: workload pressure and delivery probability
//! - **Defect dashboard**: readiness score and release gate per session
//! - **Visual diff**: screenshot comparison with automatic defect logging
//!
//! ## Architecture
//!
//! ```text
//! HTTP Client → axum Router → SessionAdvisor / Engines / VisualDiffDetector
//!                                   ↓
//!                             SQLite (Storage)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qa_advisor::{build_router, AppState, Config, SqliteStorage};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let storage = SqliteStorage::new(&config.database).await?;
//!     let addr = config.server.socket_addr()?;
//!     let router = build_router(Arc::new(AppState::new(config, Arc::new(storage))));
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

/// Session-tracked scoring paths backed by the store.
pub mod advisor;
/// Lexical analysis, risk classification and advisory rules.
pub mod analysis;
/// Configuration management for the service.
pub mod config;
/// Text extraction from uploaded documents.
pub mod documents;
/// Composed, store-free scoring engines.
pub mod engines;
/// Error types and result aliases for the application.
pub mod error;
/// HTTP router, shared state and handlers.
pub mod server;
/// Persistent storage layer using SQLite.
pub mod storage;
/// Screenshot comparison for visual regressions.
pub mod vision;

pub use advisor::SessionAdvisor;
pub use config::Config;
pub use error::{ApiError, AppError, AppResult, StorageError};
pub use server::{build_router, AppState, SharedState};
pub use storage::{SqliteStorage, Storage};
pub use vision::VisualDiffDetector;
