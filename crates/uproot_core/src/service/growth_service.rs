//! Whole-tree read use-case.
//!
//! # Responsibility
//! - Gather habits, the goal forest and challenges in one read.
//! - Feed that snapshot through the tree layout.

use crate::layout::tree::{compute_tree_layout, TreeLayout};
use crate::model::challenge::Challenge;
use crate::model::goal::{build_goal_forest, GoalNode};
use crate::model::habit::Habit;
use crate::repo::challenge_repo::{ChallengeRepository, SqliteChallengeRepository};
use crate::repo::goal_repo::{GoalRepository, SqliteGoalRepository};
use crate::repo::habit_repo::{HabitRepository, SqliteHabitRepository};
use crate::repo::RepoResult;
use log::debug;
use rusqlite::Connection;
use serde::Serialize;

/// Everything the tree view renders, read at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrowthSnapshot {
    pub habits: Vec<Habit>,
    /// Root goals with nested subgoals and tasks.
    pub goals: Vec<GoalNode>,
    pub challenges: Vec<Challenge>,
}

impl GrowthSnapshot {
    pub fn layout(&self) -> TreeLayout {
        compute_tree_layout(&self.habits, &self.goals, &self.challenges)
    }
}

/// Read-only facade across all entity repositories.
pub struct GrowthService<H, G, C> {
    habits: H,
    goals: G,
    challenges: C,
}

impl<'conn>
    GrowthService<
        SqliteHabitRepository<'conn>,
        SqliteGoalRepository<'conn>,
        SqliteChallengeRepository<'conn>,
    >
{
    /// Builds the service over SQLite repositories sharing one connection.
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteHabitRepository::try_new(conn)?,
            SqliteGoalRepository::try_new(conn)?,
            SqliteChallengeRepository::try_new(conn)?,
        ))
    }
}

impl<H, G, C> GrowthService<H, G, C>
where
    H: HabitRepository,
    G: GoalRepository,
    C: ChallengeRepository,
{
    pub fn new(habits: H, goals: G, challenges: C) -> Self {
        Self {
            habits,
            goals,
            challenges,
        }
    }

    pub fn snapshot(&self) -> RepoResult<GrowthSnapshot> {
        let habits = self.habits.list_habits()?;
        let goals = self.goals.list_goals()?;
        let tasks = self.goals.list_tasks()?;
        let challenges = self.challenges.list_challenges()?;
        debug!(
            "event=growth_snapshot module=growth status=ok habits={} goals={} tasks={} challenges={}",
            habits.len(),
            goals.len(),
            tasks.len(),
            challenges.len()
        );
        Ok(GrowthSnapshot {
            habits,
            goals: build_goal_forest(&goals, &tasks),
            challenges,
        })
    }

    pub fn layout(&self) -> RepoResult<TreeLayout> {
        Ok(self.snapshot()?.layout())
    }
}
