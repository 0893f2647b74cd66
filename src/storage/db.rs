use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Result, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::core::error::AppResult;
use crate::storage::codec::BackupDocument;

/// A registered exact-match phrase with its score.
///
/// Field order is load-bearing: it fixes the JSON field order of the backup
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slogan {
    pub text: String,
    pub score: i64,
}

/// A user's running score total within one chat. Unique per (user_id, chat_id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserScore {
    pub user_id: i64,
    pub chat_id: i64,
    pub score: i64,
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a pool with up to 10 connections and ensures the schema exists.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder().max_size(10).build(manager)?;

    let conn = pool.get()?;
    init_schema(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

fn init_schema(conn: &DbConnection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS slogans(
            text  TEXT PRIMARY KEY,
            score INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS user_scores(
            user_id INTEGER NOT NULL,
            chat_id INTEGER NOT NULL,
            score   INTEGER NOT NULL,
            PRIMARY KEY(user_id, chat_id)
        );",
    )
}

/// Inserts a slogan or silently overwrites the score of an existing one
/// (keyed upsert by text).
pub fn upsert_slogan(conn: &DbConnection, text: &str, score: i64) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO slogans (text, score) VALUES (?1, ?2)",
        params![text, score],
    )?;
    Ok(())
}

/// Deletes a slogan by exact text. Returns `false` when no such slogan
/// existed; that is not an error.
pub fn delete_slogan(conn: &DbConnection, text: &str) -> Result<bool> {
    let rows_affected = conn.execute("DELETE FROM slogans WHERE text = ?1", params![text])?;
    Ok(rows_affected > 0)
}

/// Looks up the score of a slogan by exact text.
pub fn get_slogan(conn: &DbConnection, text: &str) -> Result<Option<i64>> {
    conn.query_row("SELECT score FROM slogans WHERE text = ?1", params![text], |row| {
        row.get(0)
    })
    .optional()
}

/// Returns all slogans sorted by score descending.
pub fn list_slogans(conn: &DbConnection) -> Result<Vec<Slogan>> {
    let mut stmt = conn.prepare("SELECT text, score FROM slogans ORDER BY score DESC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Slogan {
            text: row.get(0)?,
            score: row.get(1)?,
        })
    })?;

    let mut slogans = Vec::new();
    for row in rows {
        slogans.push(row?);
    }
    Ok(slogans)
}

/// Returns the running total for a (user, chat) pair, or `None` if the user
/// has never matched a slogan in that chat.
pub fn get_user_score(conn: &DbConnection, user_id: i64, chat_id: i64) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT score FROM user_scores WHERE user_id = ?1 AND chat_id = ?2",
        params![user_id, chat_id],
        |row| row.get(0),
    )
    .optional()
}

/// Writes a (user, chat) total, replacing any previous row.
pub fn upsert_user_score(conn: &DbConnection, user_id: i64, chat_id: i64, score: i64) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO user_scores (user_id, chat_id, score) VALUES (?1, ?2, ?3)",
        params![user_id, chat_id, score],
    )?;
    Ok(())
}

/// Returns the top `limit` scores of one chat, sorted by score descending.
pub fn top_user_scores(conn: &DbConnection, chat_id: i64, limit: i64) -> Result<Vec<UserScore>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, chat_id, score FROM user_scores
         WHERE chat_id = ?1 ORDER BY score DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![chat_id, limit], |row| {
        Ok(UserScore {
            user_id: row.get(0)?,
            chat_id: row.get(1)?,
            score: row.get(2)?,
        })
    })?;

    let mut scores = Vec::new();
    for row in rows {
        scores.push(row?);
    }
    Ok(scores)
}

/// Adds `delta` to the (user, chat) running total and returns the new total.
///
/// The read-accumulate-write runs inside one IMMEDIATE transaction so the
/// total stays an exact sum even if the dispatcher ever runs handlers for the
/// same user concurrently.
pub fn apply_match(conn: &mut DbConnection, user_id: i64, chat_id: i64, delta: i64) -> Result<i64> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let current: Option<i64> = tx
        .query_row(
            "SELECT score FROM user_scores WHERE user_id = ?1 AND chat_id = ?2",
            params![user_id, chat_id],
            |row| row.get(0),
        )
        .optional()?;
    let total = current.unwrap_or(0) + delta;

    tx.execute(
        "INSERT OR REPLACE INTO user_scores (user_id, chat_id, score) VALUES (?1, ?2, ?3)",
        params![user_id, chat_id, total],
    )?;
    tx.commit()?;

    Ok(total)
}

/// Dumps the full store as a backup document. Rows are ordered by primary key
/// so repeated snapshots of the same state are byte-identical.
pub fn snapshot(conn: &DbConnection) -> Result<BackupDocument> {
    let mut stmt = conn.prepare("SELECT text, score FROM slogans ORDER BY text")?;
    let rows = stmt.query_map([], |row| {
        Ok(Slogan {
            text: row.get(0)?,
            score: row.get(1)?,
        })
    })?;
    let mut slogans = Vec::new();
    for row in rows {
        slogans.push(row?);
    }

    let mut stmt = conn.prepare("SELECT user_id, chat_id, score FROM user_scores ORDER BY user_id, chat_id")?;
    let rows = stmt.query_map([], |row| {
        Ok(UserScore {
            user_id: row.get(0)?,
            chat_id: row.get(1)?,
            score: row.get(2)?,
        })
    })?;
    let mut user_scores = Vec::new();
    for row in rows {
        user_scores.push(row?);
    }

    Ok(BackupDocument { slogans, user_scores })
}

/// Replaces the entire store with the contents of a backup document.
///
/// Wipe and bulk load run in a single transaction: either the whole document
/// lands or the existing store is left untouched.
pub fn replace_all(conn: &mut DbConnection, document: &BackupDocument) -> Result<()> {
    let tx = conn.transaction()?;
    wipe_all(&tx)?;
    bulk_load(&tx, document)?;
    tx.commit()
}

fn wipe_all(tx: &rusqlite::Transaction<'_>) -> Result<()> {
    tx.execute("DELETE FROM slogans", [])?;
    tx.execute("DELETE FROM user_scores", [])?;
    Ok(())
}

fn bulk_load(tx: &rusqlite::Transaction<'_>, document: &BackupDocument) -> Result<()> {
    let mut stmt = tx.prepare("INSERT INTO slogans (text, score) VALUES (?1, ?2)")?;
    for slogan in &document.slogans {
        stmt.execute(params![slogan.text, slogan.score])?;
    }

    let mut stmt = tx.prepare("INSERT INTO user_scores (user_id, chat_id, score) VALUES (?1, ?2, ?3)")?;
    for user_score in &document.user_scores {
        stmt.execute(params![user_score.user_id, user_score.chat_id, user_score.score])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::NamedTempFile;

    fn test_pool() -> (NamedTempFile, DbPool) {
        let file = NamedTempFile::new().unwrap();
        let pool = create_pool(file.path().to_str().unwrap()).unwrap();
        (file, pool)
    }

    #[test]
    fn test_upsert_slogan_is_idempotent() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        upsert_slogan(&conn, "خوب", 5).unwrap();
        upsert_slogan(&conn, "خوب", 5).unwrap();

        assert_eq!(get_slogan(&conn, "خوب").unwrap(), Some(5));
        assert_eq!(list_slogans(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_slogan_overwrites_score() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        upsert_slogan(&conn, "خوب", 5).unwrap();
        upsert_slogan(&conn, "خوب", -3).unwrap();

        assert_eq!(get_slogan(&conn, "خوب").unwrap(), Some(-3));
    }

    #[test]
    fn test_delete_slogan_absent_is_noop() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        assert!(!delete_slogan(&conn, "nothing").unwrap());

        upsert_slogan(&conn, "خوب", 5).unwrap();
        assert!(delete_slogan(&conn, "خوب").unwrap());
        assert_eq!(get_slogan(&conn, "خوب").unwrap(), None);
    }

    #[test]
    fn test_get_slogan_is_exact_match() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        upsert_slogan(&conn, "خوب", 5).unwrap();

        assert_eq!(get_slogan(&conn, "خوب ").unwrap(), None);
        assert_eq!(get_slogan(&conn, "خو").unwrap(), None);
    }

    #[test]
    fn test_list_slogans_sorted_by_score_desc() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        upsert_slogan(&conn, "a", 1).unwrap();
        upsert_slogan(&conn, "b", 10).unwrap();
        upsert_slogan(&conn, "c", -4).unwrap();

        let scores: Vec<i64> = list_slogans(&conn).unwrap().iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![10, 1, -4]);
    }

    #[test]
    fn test_apply_match_accumulates() {
        let (_file, pool) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        for i in 1..=4 {
            let total = apply_match(&mut conn, 1, 100, 5).unwrap();
            assert_eq!(total, 5 * i);
        }
        assert_eq!(get_user_score(&conn, 1, 100).unwrap(), Some(20));
    }

    #[test]
    fn test_apply_match_may_go_negative() {
        let (_file, pool) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        assert_eq!(apply_match(&mut conn, 1, 100, -7).unwrap(), -7);
        assert_eq!(apply_match(&mut conn, 1, 100, 3).unwrap(), -4);
    }

    #[test]
    fn test_user_scores_are_independent_per_user_and_chat() {
        let (_file, pool) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        apply_match(&mut conn, 1, 100, 5).unwrap();
        apply_match(&mut conn, 2, 100, 7).unwrap();
        apply_match(&mut conn, 1, 200, 11).unwrap();

        assert_eq!(get_user_score(&conn, 1, 100).unwrap(), Some(5));
        assert_eq!(get_user_score(&conn, 2, 100).unwrap(), Some(7));
        assert_eq!(get_user_score(&conn, 1, 200).unwrap(), Some(11));
        assert_eq!(get_user_score(&conn, 2, 200).unwrap(), None);
    }

    #[test]
    fn test_top_user_scores_scoped_to_chat() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        upsert_user_score(&conn, 1, 100, 5).unwrap();
        upsert_user_score(&conn, 2, 100, 9).unwrap();
        upsert_user_score(&conn, 3, 200, 99).unwrap();

        let top = top_user_scores(&conn, 100, 20).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user_id, 2);
        assert_eq!(top[1].user_id, 1);
    }

    #[test]
    fn test_replace_all_with_empty_document_wipes_store() {
        let (_file, pool) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        upsert_slogan(&conn, "خوب", 5).unwrap();
        upsert_user_score(&conn, 1, 100, 5).unwrap();

        let empty = BackupDocument {
            slogans: Vec::new(),
            user_scores: Vec::new(),
        };
        replace_all(&mut conn, &empty).unwrap();

        assert!(list_slogans(&conn).unwrap().is_empty());
        assert!(top_user_scores(&conn, 100, 20).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_then_replace_all_round_trips() {
        let (_file, pool) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        upsert_slogan(&conn, "خوب", 5).unwrap();
        upsert_slogan(&conn, "بد", -5).unwrap();
        upsert_user_score(&conn, 1, 100, 15).unwrap();

        let document = snapshot(&conn).unwrap();

        replace_all(&mut conn, &BackupDocument { slogans: Vec::new(), user_scores: Vec::new() }).unwrap();
        replace_all(&mut conn, &document).unwrap();

        assert_eq!(snapshot(&conn).unwrap(), document);
    }
}
