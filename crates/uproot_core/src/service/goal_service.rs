//! Goal and task use-case service.
//!
//! # Responsibility
//! - Validate hierarchy invariants above the repository layer.
//! - Keep every goal's stored progress equal to its task completion ratio.
//! - Rebuild the nested goal forest from flat storage on every read.
//!
//! # Invariants
//! - Parent goal must exist when provided.
//! - Move operations must not create parent-child cycles.
//! - Deleting a goal removes its whole subtree and every attached task.
//! - Progress is recomputed after each task add/complete/delete, in the same
//!   transaction as the task write.

use crate::model::goal::{
    build_goal_forest, build_goal_subtree, progress_percent, Goal, GoalId, GoalNode, Task, TaskId,
};
use crate::repo::goal_repo::{GoalRemoval, GoalRepository};
use crate::repo::{EntityKind, RepoError};
use crate::service::title::normalize_title;
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from goal service operations.
#[derive(Debug)]
pub enum GoalServiceError {
    /// Title is blank after normalization.
    InvalidTitle,
    /// Target goal does not exist.
    GoalNotFound(GoalId),
    /// Parent goal does not exist.
    ParentNotFound(GoalId),
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Move operation would create a cycle.
    CycleDetected { goal_id: GoalId, parent_id: GoalId },
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for GoalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "title must not be blank"),
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent goal not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::CycleDetected { goal_id, parent_id } => write!(
                f,
                "move would create cycle: goal {goal_id} under parent {parent_id}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GoalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GoalServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                kind: EntityKind::Goal,
                id,
            } => Self::GoalNotFound(id),
            RepoError::NotFound {
                kind: EntityKind::Task,
                id,
            } => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Goal/task service facade.
pub struct GoalService<R: GoalRepository> {
    repo: R,
}

impl<R: GoalRepository> GoalService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all goals flat, in creation order.
    pub fn list_goals(&self) -> Result<Vec<Goal>, GoalServiceError> {
        self.repo.list_goals().map_err(Into::into)
    }

    /// Lists all tasks flat, in creation order.
    pub fn list_tasks(&self) -> Result<Vec<Task>, GoalServiceError> {
        self.repo.list_tasks().map_err(Into::into)
    }

    /// Returns root goals with nested subgoals and tasks.
    pub fn goal_forest(&self) -> Result<Vec<GoalNode>, GoalServiceError> {
        let goals = self.repo.list_goals()?;
        let tasks = self.repo.list_tasks()?;
        Ok(build_goal_forest(&goals, &tasks))
    }

    /// Returns one goal with its subtree, if present.
    pub fn get_goal(&self, id: GoalId) -> Result<Option<GoalNode>, GoalServiceError> {
        let goals = self.repo.list_goals()?;
        let tasks = self.repo.list_tasks()?;
        Ok(build_goal_subtree(id, &goals, &tasks))
    }

    /// Returns `id` followed by every transitive descendant goal id.
    ///
    /// Empty when the goal does not exist. These are exactly the goals
    /// [`Self::delete_goal`] removes.
    pub fn subtree_ids(&self, id: GoalId) -> Result<Vec<GoalId>, GoalServiceError> {
        self.repo.subtree_goal_ids(id).map_err(Into::into)
    }

    /// Creates a goal under an optional parent with zero progress.
    pub fn add_goal(
        &self,
        title: &str,
        parent_id: Option<GoalId>,
    ) -> Result<Goal, GoalServiceError> {
        let title = normalize_title(title).ok_or(GoalServiceError::InvalidTitle)?;
        if let Some(parent_id) = parent_id {
            self.ensure_parent_exists(parent_id)?;
        }

        let goal = Goal::new(title, parent_id);
        self.repo.create_goal(&goal)?;
        info!(
            "event=goal_add module=goal status=ok goal_id={} has_parent={}",
            goal.id,
            parent_id.is_some()
        );
        Ok(goal)
    }

    /// Reparents a goal; `None` promotes it to a root goal.
    pub fn move_goal(
        &self,
        id: GoalId,
        new_parent_id: Option<GoalId>,
    ) -> Result<(), GoalServiceError> {
        self.repo
            .get_goal(id)?
            .ok_or(GoalServiceError::GoalNotFound(id))?;

        if let Some(parent_id) = new_parent_id {
            if parent_id == id {
                return Err(GoalServiceError::CycleDetected {
                    goal_id: id,
                    parent_id,
                });
            }

            self.ensure_parent_exists(parent_id)?;
            if self.would_create_cycle(id, parent_id)? {
                return Err(GoalServiceError::CycleDetected {
                    goal_id: id,
                    parent_id,
                });
            }
        }

        self.repo.set_goal_parent(id, new_parent_id)?;
        info!(
            "event=goal_move module=goal status=ok goal_id={} to_root={}",
            id,
            new_parent_id.is_none()
        );
        Ok(())
    }

    /// Deletes a goal with every descendant goal and all their tasks.
    ///
    /// Returns `false` when the goal did not exist.
    pub fn delete_goal(&self, id: GoalId) -> Result<bool, GoalServiceError> {
        let removal: GoalRemoval = self.repo.delete_goal_subtree(id)?;
        if removal.is_empty() {
            warn!("event=goal_delete module=goal status=miss goal_id={}", id);
            return Ok(false);
        }
        info!(
            "event=goal_delete module=goal status=ok goal_id={} removed_goals={} removed_tasks={}",
            id, removal.goals, removal.tasks
        );
        Ok(true)
    }

    /// Attaches a new task to a goal and recomputes the goal's progress.
    pub fn add_task(&self, title: &str, goal_id: GoalId) -> Result<Task, GoalServiceError> {
        let title = normalize_title(title).ok_or(GoalServiceError::InvalidTitle)?;
        self.repo
            .get_goal(goal_id)?
            .ok_or(GoalServiceError::GoalNotFound(goal_id))?;

        let task = Task::new(title, goal_id);
        let progress = self.repo.atomically(|| {
            self.repo.create_task(&task)?;
            self.refresh_progress(goal_id)
        })?;
        info!(
            "event=task_add module=goal status=ok task_id={} goal_id={} progress={}",
            task.id, goal_id, progress
        );
        Ok(task)
    }

    /// Toggles task completion and recomputes the owning goal's progress.
    pub fn complete_task(&self, id: TaskId) -> Result<Task, GoalServiceError> {
        let mut task = self
            .repo
            .get_task(id)?
            .ok_or(GoalServiceError::TaskNotFound(id))?;
        task.completed = !task.completed;
        let progress = self.repo.atomically(|| {
            self.repo.set_task_completed(id, task.completed)?;
            self.refresh_progress(task.goal_id)
        })?;
        info!(
            "event=task_toggle module=goal status=ok task_id={} completed={} progress={}",
            id, task.completed, progress
        );
        Ok(task)
    }

    /// Deletes a task and recomputes the owning goal's progress.
    ///
    /// Returns `false` when the task did not exist.
    pub fn delete_task(&self, id: TaskId) -> Result<bool, GoalServiceError> {
        let Some(task) = self.repo.get_task(id)? else {
            warn!("event=task_delete module=goal status=miss task_id={}", id);
            return Ok(false);
        };

        let (removed, progress) = self.repo.atomically(|| {
            let removed = self.repo.delete_task(id)?;
            Ok::<_, GoalServiceError>((removed, self.refresh_progress(task.goal_id)?))
        })?;
        info!(
            "event=task_delete module=goal status=ok task_id={} progress={}",
            id, progress
        );
        Ok(removed)
    }

    fn refresh_progress(&self, goal_id: GoalId) -> Result<u8, GoalServiceError> {
        let tally = self.repo.task_tally(goal_id)?;
        let progress = progress_percent(tally.completed, tally.total);
        self.repo.set_goal_progress(goal_id, progress)?;
        Ok(progress)
    }

    fn ensure_parent_exists(&self, parent_id: GoalId) -> Result<(), GoalServiceError> {
        self.repo
            .get_goal(parent_id)?
            .ok_or(GoalServiceError::ParentNotFound(parent_id))?;
        Ok(())
    }

    fn would_create_cycle(
        &self,
        goal_id: GoalId,
        candidate_parent_id: GoalId,
    ) -> Result<bool, GoalServiceError> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent_id);
        while let Some(current) = cursor {
            if current == goal_id {
                return Ok(true);
            }
            if !visited.insert(current) {
                return Ok(true);
            }

            let goal = self
                .repo
                .get_goal(current)?
                .ok_or(GoalServiceError::ParentNotFound(current))?;
            cursor = goal.parent_id;
        }
        Ok(false)
    }
}
