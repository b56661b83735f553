//! Challenge repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Completion is one-way; no write path clears `completed`.

use super::support::{bool_to_int, ensure_connection_ready, parse_flag, parse_uuid};
use super::{EntityKind, RepoError, RepoResult};
use crate::model::challenge::{Challenge, ChallengeId};
use rusqlite::{params, Connection, Row};

const CHALLENGE_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    completed
FROM challenges";

/// Repository interface for challenge operations.
pub trait ChallengeRepository {
    fn create_challenge(&self, challenge: &Challenge) -> RepoResult<()>;
    fn get_challenge(&self, id: ChallengeId) -> RepoResult<Option<Challenge>>;
    fn list_challenges(&self) -> RepoResult<Vec<Challenge>>;
    /// Marks one challenge completed. Already completed rows stay untouched.
    fn mark_completed(&self, id: ChallengeId) -> RepoResult<()>;
    /// Returns whether a row was removed.
    fn delete_challenge(&self, id: ChallengeId) -> RepoResult<bool>;
}

/// SQLite-backed challenge repository.
pub struct SqliteChallengeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChallengeRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["challenges"])?;
        Ok(Self { conn })
    }
}

impl ChallengeRepository for SqliteChallengeRepository<'_> {
    fn create_challenge(&self, challenge: &Challenge) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO challenges (id, title, description, completed)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                challenge.id.to_string(),
                challenge.title.as_str(),
                challenge.description.as_str(),
                bool_to_int(challenge.completed),
            ],
        )?;
        Ok(())
    }

    fn get_challenge(&self, id: ChallengeId) -> RepoResult<Option<Challenge>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHALLENGE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_challenge_row(row)?));
        }
        Ok(None)
    }

    fn list_challenges(&self) -> RepoResult<Vec<Challenge>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHALLENGE_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut challenges = Vec::new();
        while let Some(row) = rows.next()? {
            challenges.push(parse_challenge_row(row)?);
        }
        Ok(challenges)
    }

    fn mark_completed(&self, id: ChallengeId) -> RepoResult<()> {
        // Matching rows count as changed even when already completed.
        let changed = self.conn.execute(
            "UPDATE challenges SET completed = 1 WHERE id = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Challenge,
                id,
            });
        }
        Ok(())
    }

    fn delete_challenge(&self, id: ChallengeId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM challenges WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn parse_challenge_row(row: &Row<'_>) -> RepoResult<Challenge> {
    let id_text: String = row.get("id")?;
    Ok(Challenge {
        id: parse_uuid(&id_text, "challenges.id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        completed: parse_flag(row.get("completed")?, "challenges.completed")?,
    })
}
