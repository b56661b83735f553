//! Core domain logic for Uproot, a growth tree of habits, goals and challenges.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod layout;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use layout::tree::{
    compute_tree_layout, BranchLayout, LeafLayout, RootLayout, Side, TreeLayout, TrunkLayout,
    MAX_BRANCH_LEVEL,
};
pub use logging::{
    default_log_level, init_logging, logging_status, LogLevel, LogSettings, LoggingError,
};
pub use model::challenge::{Challenge, ChallengeId, DAILY_CHALLENGE_IDEAS};
pub use model::goal::{progress_percent, Goal, GoalId, GoalNode, Task, TaskId};
pub use model::habit::{Habit, HabitId};
pub use repo::challenge_repo::{ChallengeRepository, SqliteChallengeRepository};
pub use repo::goal_repo::{GoalRemoval, GoalRepository, SqliteGoalRepository, TaskTally};
pub use repo::habit_repo::{HabitRepository, SqliteHabitRepository};
pub use repo::{EntityKind, RepoError, RepoResult};
pub use seed::{seed_demo_data, SeedSummary};
pub use service::challenge_service::{ChallengeService, ChallengeServiceError};
pub use service::goal_service::{GoalService, GoalServiceError};
pub use service::growth_service::{GrowthService, GrowthSnapshot};
pub use service::habit_service::{HabitService, HabitServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
