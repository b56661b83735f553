//! Demo data for a fresh store.
//!
//! # Invariants
//! - Seeding is atomic: either every record lands or none does.
//! - Goal progress is derived from the seeded tasks, never hardcoded.

use crate::model::challenge::Challenge;
use crate::model::goal::{progress_for, Goal, Task};
use crate::model::habit::Habit;
use crate::repo::challenge_repo::{ChallengeRepository, SqliteChallengeRepository};
use crate::repo::goal_repo::{GoalRepository, SqliteGoalRepository};
use crate::repo::habit_repo::{HabitRepository, SqliteHabitRepository};
use crate::repo::RepoResult;
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};

const DEMO_HABITS: &[(&str, u32, bool)] = &[
    ("Morning Meditation", 5, true),
    ("Daily Reading", 3, false),
    ("Exercise", 7, true),
    ("Gratitude Journaling", 1, false),
];

/// `(title, index of parent in this list)`.
const DEMO_GOALS: &[(&str, Option<usize>)] = &[
    ("Write a Book", None),
    ("Get Fit", None),
    ("Learn Spanish", None),
    ("Plan Dream Vacation", None),
    ("Read 24 Books This Year", Some(0)),
];

/// `(title, completed, index of goal in DEMO_GOALS)`.
const DEMO_TASKS: &[(&str, bool, usize)] = &[
    ("Research topic", true, 0),
    ("Create outline", false, 0),
    ("Write first draft", false, 0),
    ("Research gym options", true, 1),
    ("Buy workout clothes", true, 1),
    ("Schedule first session", false, 1),
    ("Download learning app", true, 2),
    ("Complete first lesson", true, 2),
    ("Practice daily", false, 2),
    ("Research destinations", true, 3),
    ("Set budget", false, 3),
    ("Book flights", false, 3),
    ("Create reading list", true, 4),
    ("Join book club", false, 4),
];

const DEMO_CHALLENGES: &[(&str, &str, bool)] = &[
    (
        "Morning Gratitude",
        "Write down three things you are grateful for this morning.",
        true,
    ),
    (
        "Mindful Breathing",
        "Take 5 minutes to focus only on your breath, counting each inhale and exhale.",
        false,
    ),
    (
        "Digital Detox Hour",
        "Spend one hour today completely disconnected from all digital devices.",
        true,
    ),
    (
        "Self-Compassion Practice",
        "Write down three positive things about yourself that you appreciate.",
        false,
    ),
    (
        "Nature Connection",
        "Spend at least 15 minutes outside connecting with nature, observing details you normally miss.",
        true,
    ),
];

/// Number of records inserted by [`seed_demo_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub habits: usize,
    pub goals: usize,
    pub tasks: usize,
    pub challenges: usize,
}

/// Inserts the demo habits, goals, tasks and challenges.
pub fn seed_demo_data(conn: &Connection) -> RepoResult<SeedSummary> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let habit_repo = SqliteHabitRepository::try_new(&tx)?;
    for &(title, streak, completed) in DEMO_HABITS {
        let mut habit = Habit::new(title);
        habit.streak = streak;
        habit.completed = completed;
        habit_repo.create_habit(&habit)?;
    }

    let mut goals: Vec<Goal> = Vec::with_capacity(DEMO_GOALS.len());
    for &(title, parent) in DEMO_GOALS {
        let parent_id = parent.and_then(|index| goals.get(index)).map(|goal| goal.id);
        goals.push(Goal::new(title, parent_id));
    }

    let tasks: Vec<Task> = DEMO_TASKS
        .iter()
        .filter_map(|&(title, completed, goal_index)| {
            goals.get(goal_index).map(|goal| {
                let mut task = Task::new(title, goal.id);
                task.completed = completed;
                task
            })
        })
        .collect();

    let goal_repo = SqliteGoalRepository::try_new(&tx)?;
    for goal in &mut goals {
        goal.progress = progress_for(goal.id, &tasks);
        goal_repo.create_goal(goal)?;
    }
    for task in &tasks {
        goal_repo.create_task(task)?;
    }

    let challenge_repo = SqliteChallengeRepository::try_new(&tx)?;
    for &(title, description, completed) in DEMO_CHALLENGES {
        let mut challenge = Challenge::new(title, description);
        challenge.completed = completed;
        challenge_repo.create_challenge(&challenge)?;
    }

    tx.commit()?;

    let summary = SeedSummary {
        habits: DEMO_HABITS.len(),
        goals: goals.len(),
        tasks: tasks.len(),
        challenges: DEMO_CHALLENGES.len(),
    };
    info!(
        "event=seed_demo module=seed status=ok habits={} goals={} tasks={} challenges={}",
        summary.habits, summary.goals, summary.tasks, summary.challenges
    );
    Ok(summary)
}
