//! Habit repository contracts and SQLite implementation.

use super::support::{bool_to_int, ensure_connection_ready, parse_flag, parse_uuid};
use super::{EntityKind, RepoError, RepoResult};
use crate::model::habit::{Habit, HabitId};
use rusqlite::{params, Connection, Row};

const HABIT_SELECT_SQL: &str = "SELECT
    id,
    title,
    streak,
    completed
FROM habits";

/// Repository interface for habit CRUD operations.
pub trait HabitRepository {
    fn create_habit(&self, habit: &Habit) -> RepoResult<()>;
    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    fn list_habits(&self) -> RepoResult<Vec<Habit>>;
    /// Overwrites title, streak and completion of an existing habit.
    fn update_habit(&self, habit: &Habit) -> RepoResult<()>;
    /// Returns whether a row was removed.
    fn delete_habit(&self, id: HabitId) -> RepoResult<bool>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["habits"])?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, habit: &Habit) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO habits (id, title, streak, completed)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                habit.id.to_string(),
                habit.title.as_str(),
                habit.streak,
                bool_to_int(habit.completed),
            ],
        )?;
        Ok(())
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_habit_row(row)?));
        }
        Ok(None)
    }

    fn list_habits(&self) -> RepoResult<Vec<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut habits = Vec::new();
        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(row)?);
        }
        Ok(habits)
    }

    fn update_habit(&self, habit: &Habit) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE habits
             SET title = ?2,
                 streak = ?3,
                 completed = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                habit.id.to_string(),
                habit.title.as_str(),
                habit.streak,
                bool_to_int(habit.completed),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Habit,
                id: habit.id,
            });
        }
        Ok(())
    }

    fn delete_habit(&self, id: HabitId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let id_text: String = row.get("id")?;
    let streak: i64 = row.get("streak")?;
    let streak = u32::try_from(streak).map_err(|_| {
        RepoError::InvalidData(format!("invalid streak `{streak}` in habits.streak"))
    })?;

    Ok(Habit {
        id: parse_uuid(&id_text, "habits.id")?,
        title: row.get("title")?,
        streak,
        completed: parse_flag(row.get("completed")?, "habits.completed")?,
    })
}
