//! trk - Personal Tracker Library
//!
//! This library provides the core functionality for the trk tracker:
//! per-user resource collections (tasks, habits, finance, planner, goals,
//! mood, workouts, study sessions) behind a small REST API, and the
//! optimistic sync client that keeps a session's in-memory state
//! consistent with the store.
//!
//! # Core Concepts
//!
//! - **User scope**: the advisory partitioning key every record belongs to
//! - **Resource kinds**: independently scoped collections sharing one
//!   CRUD contract
//! - **Optimistic sync**: mutations apply to memory first, then issue one
//!   remote attempt; failures roll the local change back
//! - **Interchangeable backends**: document store, workbook file, or
//!   in-memory, all behind the same trait
//! - **Local fallback**: the same collections persisted to namespaced
//!   local files when no remote store is configured
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `.trk.toml`
//! - `error`: error types and result aliases
//! - `http`: axum REST surface
//! - `identity`: user-scope resolution and the local user registry
//! - `local`: local fallback namespace
//! - `model`: resource kinds, validation, patch merging
//! - `remote`: HTTP transport for the sync client
//! - `stats`: derived aggregates, recomputed on every read
//! - `storage`: data-dir layout, atomic writes, file locking
//! - `store`: per-user CRUD trait and its backends
//! - `sync`: optimistic-update client

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod local;
pub mod model;
pub mod output;
pub mod remote;
pub mod stats;
pub mod storage;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
