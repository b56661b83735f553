//! Goal/task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist flat goal and task rows; hierarchy is carried by `parent_id`.
//! - Provide recursive subtree lookup and atomic subtree removal.
//!
//! # Invariants
//! - Goal and task listing is deterministic: insertion order.
//! - Subtree removal deletes tasks before goals inside one transaction, so a
//!   failure leaves the store untouched.
//! - `atomically` must not wrap `delete_goal_subtree`; SQLite has no nested
//!   `BEGIN`.
//! - Foreign keys keep every task attached to an existing goal.

use super::support::{bool_to_int, ensure_connection_ready, parse_flag, parse_uuid};
use super::{EntityKind, RepoError, RepoResult};
use crate::model::goal::{Goal, GoalId, Task, TaskId};
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    title,
    progress,
    parent_id
FROM goals";

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    completed,
    goal_id
FROM tasks";

const SUBTREE_CTE: &str = "WITH RECURSIVE subtree(id) AS (
    SELECT id
    FROM goals
    WHERE id = ?1
    UNION
    SELECT child.id
    FROM goals child
    INNER JOIN subtree parent ON child.parent_id = parent.id
)";

/// Row counts removed by one subtree deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoalRemoval {
    /// Target goal plus every descendant goal.
    pub goals: usize,
    /// Tasks attached to any removed goal.
    pub tasks: usize,
}

impl GoalRemoval {
    pub fn is_empty(&self) -> bool {
        self.goals == 0
    }
}

/// Task completion counts for one goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskTally {
    pub completed: usize,
    pub total: usize,
}

/// Repository interface for goal and task operations.
pub trait GoalRepository {
    fn create_goal(&self, goal: &Goal) -> RepoResult<()>;
    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>>;
    fn list_goals(&self) -> RepoResult<Vec<Goal>>;
    /// Rewrites the parent link of one goal. Cycle checks belong to callers.
    fn set_goal_parent(&self, id: GoalId, parent_id: Option<GoalId>) -> RepoResult<()>;
    /// Stores a derived progress value.
    fn set_goal_progress(&self, id: GoalId, progress: u8) -> RepoResult<()>;
    /// Returns `id` followed by every transitive descendant id.
    ///
    /// Empty when `id` does not exist.
    fn subtree_goal_ids(&self, id: GoalId) -> RepoResult<Vec<GoalId>>;
    /// Removes a goal, all descendant goals, and all their tasks.
    fn delete_goal_subtree(&self, id: GoalId) -> RepoResult<GoalRemoval>;

    fn create_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn set_task_completed(&self, id: TaskId, completed: bool) -> RepoResult<()>;
    /// Returns whether a row was removed.
    fn delete_task(&self, id: TaskId) -> RepoResult<bool>;
    fn task_tally(&self, goal_id: GoalId) -> RepoResult<TaskTally>;

    /// Runs `work` as one unit: every write it makes through this repository
    /// is kept when it returns `Ok` and discarded when it returns `Err`.
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce() -> Result<T, E>;
}

/// SQLite-backed goal/task repository.
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["goals", "tasks"])?;
        Ok(Self { conn })
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, goal: &Goal) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO goals (id, title, progress, parent_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                goal.id.to_string(),
                goal.title.as_str(),
                goal.progress,
                goal.parent_id.map(|value| value.to_string()),
            ],
        )?;
        Ok(())
    }

    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_goal_row(row)?));
        }
        Ok(None)
    }

    fn list_goals(&self) -> RepoResult<Vec<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn set_goal_parent(&self, id: GoalId, parent_id: Option<GoalId>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE goals
             SET parent_id = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), parent_id.map(|value| value.to_string())],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Goal,
                id,
            });
        }
        Ok(())
    }

    fn set_goal_progress(&self, id: GoalId, progress: u8) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE goals
             SET progress = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), progress],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Goal,
                id,
            });
        }
        Ok(())
    }

    fn subtree_goal_ids(&self, id: GoalId) -> RepoResult<Vec<GoalId>> {
        collect_subtree_ids(self.conn, id)
    }

    fn delete_goal_subtree(&self, id: GoalId) -> RepoResult<GoalRemoval> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let ids = collect_subtree_ids(&tx, id)?;
        if ids.is_empty() {
            return Ok(GoalRemoval::default());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let bind_values = ids.iter().map(ToString::to_string).collect::<Vec<_>>();
        let tasks = tx.execute(
            &format!("DELETE FROM tasks WHERE goal_id IN ({placeholders});"),
            params_from_iter(bind_values.iter()),
        )?;
        let goals = tx.execute(
            &format!("DELETE FROM goals WHERE id IN ({placeholders});"),
            params_from_iter(bind_values.iter()),
        )?;

        tx.commit()?;
        Ok(GoalRemoval { goals, tasks })
    }

    fn create_task(&self, task: &Task) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO tasks (id, title, completed, goal_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                bool_to_int(task.completed),
                task.goal_id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn set_task_completed(&self, id: TaskId, completed: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET completed = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), bool_to_int(completed)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Task,
                id,
            });
        }
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn task_tally(&self, goal_id: GoalId) -> RepoResult<TaskTally> {
        let (completed, total): (i64, i64) = self.conn.query_row(
            "SELECT COALESCE(SUM(completed), 0), COUNT(*)
             FROM tasks
             WHERE goal_id = ?1;",
            [goal_id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(TaskTally {
            completed: usize::try_from(completed).unwrap_or(0),
            total: usize::try_from(total).unwrap_or(0),
        })
    }

    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce() -> Result<T, E>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(|err| E::from(RepoError::from(err)))?;
        let value = work()?;
        tx.commit().map_err(|err| E::from(RepoError::from(err)))?;
        Ok(value)
    }
}

fn collect_subtree_ids(conn: &Connection, id: GoalId) -> RepoResult<Vec<GoalId>> {
    let mut stmt = conn.prepare(&format!("{SUBTREE_CTE} SELECT id FROM subtree;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "goals.id")?);
    }
    Ok(ids)
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let id_text: String = row.get("id")?;
    let parent_id = row
        .get::<_, Option<String>>("parent_id")?
        .map(|value| parse_uuid(&value, "goals.parent_id"))
        .transpose()?;
    let progress: i64 = row.get("progress")?;
    let progress = u8::try_from(progress)
        .ok()
        .filter(|value| *value <= 100)
        .ok_or_else(|| {
            RepoError::InvalidData(format!("invalid progress `{progress}` in goals.progress"))
        })?;

    Ok(Goal {
        id: parse_uuid(&id_text, "goals.id")?,
        title: row.get("title")?,
        progress,
        parent_id,
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let goal_id_text: String = row.get("goal_id")?;
    Ok(Task {
        id: parse_uuid(&id_text, "tasks.id")?,
        title: row.get("title")?,
        completed: parse_flag(row.get("completed")?, "tasks.completed")?,
        goal_id: parse_uuid(&goal_id_text, "tasks.goal_id")?,
    })
}
