// src/lib.rs

//! pdlog - a personal journal stored in a local SQLite file.
//!
//! `db::EntryStore` owns persistence, `query::search` turns a snapshot into the list to
//! show, `backup` moves the whole journal in and out of a JSON file, and `assets` keeps
//! an offline copy of the app's static files.

pub mod assets;
pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod query;

pub use db::EntryStore;
pub use error::{PdError, Result};
pub use models::Entry;
