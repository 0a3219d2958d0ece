//! Integration tests for pooled SQLite storage.

use std::sync::Arc;
use std::thread;

use octotriage_common::storage::{SqlitePool, SqlitePoolConfig};
use tempfile::TempDir;

#[test]
fn concurrent_writers_share_one_file() {
    let temp_dir = TempDir::new().expect("temp dir");
    let pool = Arc::new(
        SqlitePool::open(&temp_dir.path().join("shared.db"), SqlitePoolConfig::default())
            .expect("pool"),
    );

    pool.get()
        .expect("connection")
        .execute("CREATE TABLE items (id INTEGER PRIMARY KEY, value TEXT)", [])
        .expect("create");

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let conn = pool.get().expect("connection");
                conn.execute("INSERT INTO items (value) VALUES (?1)", [format!("writer_{i}")])
                    .expect("insert");
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread");
    }

    let count: i64 = pool
        .get()
        .expect("connection")
        .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
        .expect("count");
    assert_eq!(count, 5);
}

#[test]
fn reader_never_sees_uncommitted_transaction() {
    let temp_dir = TempDir::new().expect("temp dir");
    let pool = SqlitePool::open(&temp_dir.path().join("wal.db"), SqlitePoolConfig::default())
        .expect("pool");

    pool.get()
        .expect("connection")
        .execute_batch("CREATE TABLE items (id INTEGER PRIMARY KEY); INSERT INTO items VALUES (1);")
        .expect("seed");

    let mut writer = pool.get().expect("writer");
    let tx = writer.transaction().expect("begin");
    tx.execute("DELETE FROM items", []).expect("delete");
    tx.execute("INSERT INTO items VALUES (2)", []).expect("insert");

    let reader = pool.get().expect("reader");
    let visible: Vec<i64> = reader
        .prepare("SELECT id FROM items")
        .expect("prepare")
        .query_map([], |row| row.get(0))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("rows");
    assert_eq!(visible, vec![1]);

    tx.commit().expect("commit");
    let visible: i64 =
        reader.query_row("SELECT id FROM items", [], |row| row.get(0)).expect("after commit");
    assert_eq!(visible, 2);
}
