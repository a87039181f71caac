//! Emote Downloader Core Library
//!
//! This library provides the core functionality for the emote downloader,
//! which bulk-downloads the emotes of a 7TV account into a predictable
//! directory tree.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Emote sets, formats and sizes, plus the API client that fetches them
//! - [`download`] - Planner, bounded concurrent download engine and progress reporting

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod download;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogClient, CatalogError, Emote, EmoteSet, ImageFormat, ImageSize};
pub use download::{
    DownloadEngine, DownloadPlan, EngineError, FetchError, FetchOutcome, HttpClient,
    ProgressReporter, ProgressSnapshot, RunOutcome, Transport, default_concurrency, plan,
};
