// src/db.rs

use crate::error::{PdError, Result};
use crate::models::Entry;
use rusqlite::{ffi, params, Connection};
use std::path::{Path, PathBuf};
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS entries (
        id TEXT PRIMARY KEY NOT NULL,
        ts INTEGER NOT NULL,
        tag TEXT NOT NULL DEFAULT '',
        text TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_entries_ts ON entries(ts);
    CREATE INDEX IF NOT EXISTS idx_entries_tag ON entries(tag);
";

const UPSERT_SQL: &str = "INSERT INTO entries (id, ts, tag, text) VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT(id) DO UPDATE SET ts = excluded.ts, tag = excluded.tag, text = excluded.text";

/// Durable entry storage backed by a single SQLite file.
///
/// Every method is one SQLite statement or one explicit transaction, so each call either
/// applies fully or leaves the store as it was. Writers take `&mut self`.
pub struct EntryStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl EntryStore {
    /// 打开（必要时创建）数据库文件并初始化表结构
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "entry store opened");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// 打开内存数据库（测试用，随对象释放）
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, path: None })
    }

    /// 数据库文件路径，内存数据库返回 None
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 插入新条目，ID 已存在时返回 DuplicateKey
    pub fn insert(&mut self, entry: &Entry) -> Result<()> {
        let res = self.conn.execute(
            "INSERT INTO entries (id, ts, tag, text) VALUES (?1, ?2, ?3, ?4)",
            params![entry.id, entry.ts, entry.tag, entry.text],
        );
        match res {
            Ok(_) => {
                debug!(id = %entry.id, "entry inserted");
                Ok(())
            }
            Err(e) if is_primary_key_violation(&e) => Err(PdError::DuplicateKey(entry.id.clone())),
            Err(e) => Err(PdError::StorageUnavailable(e)),
        }
    }

    /// 按 ID 插入或整条替换（仅供导入使用）
    pub fn upsert(&mut self, entry: &Entry) -> Result<()> {
        self.conn.execute(
            UPSERT_SQL,
            params![entry.id, entry.ts, entry.tag, entry.text],
        )?;
        debug!(id = %entry.id, "entry upserted");
        Ok(())
    }

    /// 在单个事务中批量 upsert，失败时整体回滚
    pub fn upsert_all(&mut self, entries: &[Entry]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(UPSERT_SQL)?;
            for entry in entries {
                stmt.execute(params![entry.id, entry.ts, entry.tag, entry.text])?;
            }
        }
        tx.commit()?;
        debug!(count = entries.len(), "batch upsert committed");
        Ok(entries.len())
    }

    /// 根据ID删除条目，不存在时返回 false
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let count = self.conn.execute("DELETE FROM entries WHERE id = ?1", [id])?;
        debug!(id, removed = count, "entry delete");
        Ok(count > 0)
    }

    /// 清空所有条目
    pub fn clear_all(&mut self) -> Result<usize> {
        let count = self.conn.execute("DELETE FROM entries", [])?;
        debug!(removed = count, "entry store cleared");
        Ok(count)
    }

    /// 获取全部条目的快照（不保证顺序，排序由 query::search 负责）
    pub fn get_all(&self) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare("SELECT id, ts, tag, text FROM entries")?;
        let entries = stmt
            .query_map([], |row| {
                Ok(Entry {
                    id: row.get(0)?,
                    ts: row.get(1)?,
                    tag: row.get(2)?,
                    text: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut entries: Vec<Entry>) -> Vec<Entry> {
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }

    /// Makes any write touching `id = 'poison'` fail the way a broken medium would.
    fn poison(store: &EntryStore) {
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER poison_insert BEFORE INSERT ON entries
                 WHEN NEW.id = 'poison'
                 BEGIN SELECT RAISE(ABORT, 'medium failure'); END;
                 CREATE TRIGGER poison_delete BEFORE DELETE ON entries
                 WHEN OLD.id = 'poison'
                 BEGIN SELECT RAISE(ABORT, 'medium failure'); END;",
            )
            .unwrap();
    }

    #[test]
    fn test_insert_and_get_all() {
        let mut store = EntryStore::open_in_memory().unwrap();
        store.insert(&Entry::new("a", 100, "mood", "fine")).unwrap();
        store.insert(&Entry::new("b", 200, "", "great day")).unwrap();

        let all = sorted(store.get_all().unwrap());
        assert_eq!(
            all,
            vec![
                Entry::new("a", 100, "mood", "fine"),
                Entry::new("b", 200, "", "great day"),
            ]
        );
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_insert_duplicate_id_fails_and_keeps_original() {
        let mut store = EntryStore::open_in_memory().unwrap();
        store.insert(&Entry::new("a", 100, "mood", "fine")).unwrap();

        let err = store
            .insert(&Entry::new("a", 999, "other", "replaced?"))
            .unwrap_err();
        assert!(matches!(err, PdError::DuplicateKey(ref id) if id == "a"));
        assert_eq!(
            store.get_all().unwrap(),
            vec![Entry::new("a", 100, "mood", "fine")]
        );
    }

    #[test]
    fn test_upsert_replaces_every_field() {
        let mut store = EntryStore::open_in_memory().unwrap();
        store.insert(&Entry::new("a", 100, "mood", "fine")).unwrap();
        store.upsert(&Entry::new("a", 300, "", "rewritten")).unwrap();

        assert_eq!(
            store.get_all().unwrap(),
            vec![Entry::new("a", 300, "", "rewritten")]
        );
    }

    #[test]
    fn test_upsert_new_id_adds() {
        let mut store = EntryStore::open_in_memory().unwrap();
        store.upsert(&Entry::new("new", 5, "t", "x")).unwrap();
        assert_eq!(store.get_all().unwrap(), vec![Entry::new("new", 5, "t", "x")]);
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let mut store = EntryStore::open_in_memory().unwrap();
        store.insert(&Entry::new("a", 1, "", "x")).unwrap();
        assert!(!store.delete("nope").unwrap());
        assert!(store.delete("a").unwrap());
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_deleted_id_can_be_reused() {
        let mut store = EntryStore::open_in_memory().unwrap();
        store.insert(&Entry::new("a", 1, "old", "old text")).unwrap();
        store.delete("a").unwrap();
        store.insert(&Entry::new("a", 2, "new", "new text")).unwrap();
        assert_eq!(
            store.get_all().unwrap(),
            vec![Entry::new("a", 2, "new", "new text")]
        );
    }

    #[test]
    fn test_clear_all_empties_store() {
        let mut store = EntryStore::open_in_memory().unwrap();
        for i in 0..5 {
            store
                .insert(&Entry::new(format!("e{}", i), i, "", "x"))
                .unwrap();
        }
        assert_eq!(store.clear_all().unwrap(), 5);
        assert!(store.get_all().unwrap().is_empty());
        assert_eq!(store.clear_all().unwrap(), 0);
    }

    #[test]
    fn test_upsert_all_rolls_back_on_medium_failure() {
        let mut store = EntryStore::open_in_memory().unwrap();
        store.insert(&Entry::new("keep", 1, "", "pre-existing")).unwrap();
        poison(&store);

        let batch = vec![
            Entry::new("keep", 2, "", "overwritten"),
            Entry::new("fresh", 3, "", "added"),
            Entry::new("poison", 4, "", "fails"),
        ];
        let err = store.upsert_all(&batch).unwrap_err();
        assert!(matches!(err, PdError::StorageUnavailable(_)));
        assert_eq!(
            store.get_all().unwrap(),
            vec![Entry::new("keep", 1, "", "pre-existing")]
        );
    }

    #[test]
    fn test_failed_clear_all_leaves_every_entry() {
        let mut store = EntryStore::open_in_memory().unwrap();
        store.insert(&Entry::new("a", 1, "", "x")).unwrap();
        store.insert(&Entry::new("poison", 2, "", "y")).unwrap();
        store.insert(&Entry::new("z", 3, "", "z")).unwrap();
        poison(&store);

        let err = store.clear_all().unwrap_err();
        assert!(matches!(err, PdError::StorageUnavailable(_)));
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_open_creates_parent_dir_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/pdlog.db");
        {
            let mut store = EntryStore::open(&path).unwrap();
            store.insert(&Entry::new("a", 1, "t", "persisted")).unwrap();
            assert_eq!(store.path(), Some(path.as_path()));
        }
        let reopened = EntryStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_all().unwrap(),
            vec![Entry::new("a", 1, "t", "persisted")]
        );
    }
}
