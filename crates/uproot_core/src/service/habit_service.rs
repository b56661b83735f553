//! Habit use-case service.
//!
//! # Responsibility
//! - Provide list/add/complete/delete entry points for habits.
//! - Apply the streak rule on completion toggles.
//!
//! # Invariants
//! - Titles are normalized before persistence.
//! - Streak never drops below zero.

use crate::model::habit::{Habit, HabitId};
use crate::repo::habit_repo::HabitRepository;
use crate::repo::{EntityKind, RepoError};
use crate::service::title::normalize_title;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from habit service operations.
#[derive(Debug)]
pub enum HabitServiceError {
    /// Title is blank after normalization.
    InvalidTitle,
    /// Target habit does not exist.
    HabitNotFound(HabitId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for HabitServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "habit title must not be blank"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HabitServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for HabitServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                kind: EntityKind::Habit,
                id,
            } => Self::HabitNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Habit service facade.
pub struct HabitService<R: HabitRepository> {
    repo: R,
}

impl<R: HabitRepository> HabitService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists habits in creation order.
    pub fn list_habits(&self) -> Result<Vec<Habit>, HabitServiceError> {
        self.repo.list_habits().map_err(Into::into)
    }

    /// Creates a habit with zero streak.
    pub fn add_habit(&self, title: &str) -> Result<Habit, HabitServiceError> {
        let title = normalize_title(title).ok_or(HabitServiceError::InvalidTitle)?;
        let habit = Habit::new(title);
        self.repo.create_habit(&habit)?;
        info!("event=habit_add module=habit status=ok habit_id={}", habit.id);
        Ok(habit)
    }

    /// Toggles completion and returns the updated habit.
    pub fn complete_habit(&self, id: HabitId) -> Result<Habit, HabitServiceError> {
        let mut habit = self
            .repo
            .get_habit(id)?
            .ok_or(HabitServiceError::HabitNotFound(id))?;
        habit.toggle();
        self.repo.update_habit(&habit)?;
        info!(
            "event=habit_toggle module=habit status=ok habit_id={} completed={} streak={}",
            habit.id, habit.completed, habit.streak
        );
        Ok(habit)
    }

    /// Deletes a habit. Returns `false` when nothing matched.
    pub fn delete_habit(&self, id: HabitId) -> Result<bool, HabitServiceError> {
        let removed = self.repo.delete_habit(id)?;
        info!(
            "event=habit_delete module=habit status=ok habit_id={} removed={}",
            id, removed
        );
        Ok(removed)
    }
}
