// src/commands.rs

use crate::assets::{AssetCache, DirSource};
use crate::backup;
use crate::config::Config;
use crate::db::EntryStore;
use crate::error::{PdError, Result};
use crate::models::{new_entry_id, Entry};
use crate::query;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::env;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// 处理 'init' 命令
pub fn handle_init(config: &Config, db_path: &Path) -> Result<()> {
    let config_path = Config::config_path()?;
    if !config_path.exists() {
        config.save_to(&config_path)?;
        println!("✓ Default config written to: {}", config_path.display());
    }
    let store = EntryStore::open(db_path)?;
    println!(
        "✓ Journal ready at: {} ({} entries)",
        db_path.display(),
        store.count()?
    );
    Ok(())
}

/// 解析 --at 参数（本地时间），返回毫秒时间戳
fn parse_local_time(s: &str) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M").map_err(|_| {
        PdError::InvalidInput("Invalid time format. Use YYYY-MM-DD HH:MM.".to_string())
    })?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| PdError::InvalidInput(format!("{} is ambiguous in the local timezone", s)))
}

fn read_from_editor() -> Result<String> {
    let temp_file = tempfile::NamedTempFile::new()?;
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor).arg(temp_file.path()).status()?;

    if !status.success() {
        return Err(PdError::EditorError);
    }
    let mut buf = String::new();
    temp_file.reopen()?.read_to_string(&mut buf)?;
    Ok(buf)
}

/// 处理 'add' 命令
pub fn handle_add(
    db_path: &Path,
    message: Option<String>,
    tag: String,
    at: Option<String>,
) -> Result<()> {
    let ts = match at.as_deref() {
        Some(s) => parse_local_time(s)?,
        None => Utc::now().timestamp_millis(),
    };

    let text = match message {
        Some(msg) => msg,
        None => read_from_editor()?,
    };
    if text.trim().is_empty() {
        eprintln!("Empty entry, skipped.");
        return Ok(());
    }

    let entry = Entry::new(new_entry_id(), ts, tag.trim(), text.trim_end());
    let mut store = EntryStore::open(db_path)?;
    store.insert(&entry)?;

    println!("✓ Entry {} recorded.", entry.id);
    Ok(())
}

fn format_ts(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// 处理 'list' / 'search' 命令
pub fn handle_list(db_path: &Path, query_str: Option<String>) -> Result<()> {
    let store = EntryStore::open(db_path)?;
    let entries = query::search(store.get_all()?, query_str.as_deref().unwrap_or(""));

    if entries.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    for entry in entries {
        let tag_display = if entry.tag.is_empty() {
            String::new()
        } else {
            format!(" | Tag: {}", entry.tag)
        };
        println!("[{}] {}{}", entry.id, format_ts(entry.ts), tag_display);
        println!("{}", entry.text.trim_end());
        println!("{}", "─".repeat(40));
    }
    Ok(())
}

/// 处理 'del' 命令
pub fn handle_del(db_path: &Path, id: &str) -> Result<()> {
    let mut store = EntryStore::open(db_path)?;
    if store.delete(id)? {
        println!("✓ Entry {} deleted.", id);
    } else {
        println!("No entry with ID {}.", id);
    }
    Ok(())
}

/// 处理 'clear' 命令
pub fn handle_clear(db_path: &Path, yes: bool) -> Result<()> {
    let mut store = EntryStore::open(db_path)?;
    let count = store.count()?;
    if count == 0 {
        println!("The journal is already empty.");
        return Ok(());
    }

    if !yes {
        print!(
            "You are about to permanently delete all {} entries. Confirm? (y/N): ",
            count
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = store.clear_all()?;
    tracing::info!(removed, "journal cleared");
    println!("✓ Deleted {} entries.", removed);
    Ok(())
}

/// 处理 'export' 命令
pub fn handle_export(config: &Config, db_path: &Path, out: Option<PathBuf>) -> Result<()> {
    let dir = match out {
        Some(d) => d,
        None => config.export_dir()?,
    };
    let store = EntryStore::open(db_path)?;
    let path = backup::write_export(&store, &dir, Utc::now())?;
    println!("✓ Exported {} entries to {}", store.count()?, path.display());
    Ok(())
}

/// 处理 'import' 命令
pub fn handle_import(db_path: &Path, file: &Path) -> Result<()> {
    let mut store = EntryStore::open(db_path)?;
    let count = backup::import_file(&mut store, file)?;
    println!("✓ Imported {} entries from {}", count, file.display());
    Ok(())
}

/// 处理 'assets install' 命令
pub fn handle_assets_install(
    from: &Path,
    cache_root: &Path,
    name: &str,
    version: u32,
    manifest: Vec<String>,
) -> Result<()> {
    let cache = AssetCache::new(cache_root, name, version, manifest);
    let source = DirSource::new(from);
    let count = cache.install(&source)?;
    let removed = cache.activate()?;
    println!("✓ Cached {} assets as {}", count, cache.generation());
    for old in removed {
        println!("  └─ Removed old generation {}", old);
    }
    Ok(())
}
