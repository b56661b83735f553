//! Habit domain model.
//!
//! # Invariants
//! - `streak` never goes below zero.
//! - Toggling completion moves `streak` by exactly one step.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable habit identifier.
pub type HabitId = Uuid;

/// Recurring daily action tracked with a streak counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub title: String,
    /// Consecutive completions. Thickens the trunk in the tree layout.
    pub streak: u32,
    /// Whether the habit is marked done for the current day.
    pub completed: bool,
}

impl Habit {
    /// Creates a fresh, uncompleted habit with zero streak.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            streak: 0,
            completed: false,
        }
    }

    /// Flips completion and adjusts the streak.
    ///
    /// Completing increments the streak; un-completing decrements it,
    /// saturating at zero.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
        if self.completed {
            self.streak = self.streak.saturating_add(1);
        } else {
            self.streak = self.streak.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Habit;

    #[test]
    fn toggle_moves_streak_and_saturates_at_zero() {
        let mut habit = Habit::new("Exercise");
        habit.toggle();
        assert!(habit.completed);
        assert_eq!(habit.streak, 1);

        habit.toggle();
        assert!(!habit.completed);
        assert_eq!(habit.streak, 0);

        habit.completed = true;
        habit.toggle();
        assert_eq!(habit.streak, 0);
    }
}
