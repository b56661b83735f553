//! Goal and task domain model.
//!
//! # Responsibility
//! - Define flat goal/task records as stored.
//! - Rebuild the nested goal tree (`GoalNode`) from flat records on read.
//! - Compute derived goal progress from task completion.
//!
//! # Invariants
//! - `Goal::progress` is always in `0..=100`.
//! - A goal's progress only reflects its directly-attached tasks.
//! - Children keep the order of the flat input slices.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Stable goal identifier.
pub type GoalId = Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Actionable step attached to exactly one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    pub goal_id: GoalId,
}

impl Task {
    pub fn new(title: impl Into<String>, goal_id: GoalId) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed: false,
            goal_id,
        }
    }
}

/// Flat goal record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    /// Percentage of directly-attached tasks that are completed.
    pub progress: u8,
    /// `None` means a root goal (a branch growing from the trunk).
    pub parent_id: Option<GoalId>,
}

impl Goal {
    pub fn new(title: impl Into<String>, parent_id: Option<GoalId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            progress: 0,
            parent_id,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Goal read model with derived children.
///
/// Never stored; rebuilt from flat goals and tasks by [`build_goal_forest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalNode {
    #[serde(flatten)]
    pub goal: Goal,
    pub subgoals: Vec<GoalNode>,
    pub tasks: Vec<Task>,
}

impl GoalNode {
    /// Counts this node and every descendant goal.
    pub fn goal_count(&self) -> usize {
        1 + self.subgoals.iter().map(GoalNode::goal_count).sum::<usize>()
    }

    /// Depth of the deepest subgoal; a leaf goal has depth 0.
    pub fn depth(&self) -> usize {
        self.subgoals
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Returns completed/total as a rounded percentage, `0` for no tasks.
///
/// Rounds half up, so 1 of 8 completed yields 13.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((completed * 200 + total) / (2 * total)) as u8
}

/// Computes progress for `goal_id` from a flat task list.
pub fn progress_for(goal_id: GoalId, tasks: &[Task]) -> u8 {
    let (completed, total) = tasks
        .iter()
        .filter(|task| task.goal_id == goal_id)
        .fold((0, 0), |(completed, total), task| {
            (completed + usize::from(task.completed), total + 1)
        });
    progress_percent(completed, total)
}

/// Rebuilds the root-level goal forest from flat records.
///
/// Goals whose parent is missing from `goals` are unreachable and dropped.
pub fn build_goal_forest(goals: &[Goal], tasks: &[Task]) -> Vec<GoalNode> {
    let index = ForestIndex::new(goals, tasks);
    goals
        .iter()
        .filter(|goal| goal.is_root())
        .map(|goal| index.build(goal))
        .collect()
}

/// Rebuilds the subtree rooted at `goal_id`, if that goal exists.
pub fn build_goal_subtree(goal_id: GoalId, goals: &[Goal], tasks: &[Task]) -> Option<GoalNode> {
    let index = ForestIndex::new(goals, tasks);
    goals
        .iter()
        .find(|goal| goal.id == goal_id)
        .map(|goal| index.build(goal))
}

struct ForestIndex<'a> {
    children: HashMap<GoalId, Vec<&'a Goal>>,
    tasks: HashMap<GoalId, Vec<&'a Task>>,
}

impl<'a> ForestIndex<'a> {
    fn new(goals: &'a [Goal], tasks: &'a [Task]) -> Self {
        let mut children: HashMap<GoalId, Vec<&Goal>> = HashMap::new();
        for goal in goals {
            if let Some(parent_id) = goal.parent_id {
                children.entry(parent_id).or_default().push(goal);
            }
        }
        let mut by_goal: HashMap<GoalId, Vec<&Task>> = HashMap::new();
        for task in tasks {
            by_goal.entry(task.goal_id).or_default().push(task);
        }
        Self {
            children,
            tasks: by_goal,
        }
    }

    fn build(&self, goal: &Goal) -> GoalNode {
        let subgoals = self
            .children
            .get(&goal.id)
            .map(|children| children.iter().map(|child| self.build(child)).collect())
            .unwrap_or_default();
        let tasks = self
            .tasks
            .get(&goal.id)
            .map(|tasks| tasks.iter().map(|task| (*task).clone()).collect())
            .unwrap_or_default();
        GoalNode {
            goal: goal.clone(),
            subgoals,
            tasks,
        }
    }
}
