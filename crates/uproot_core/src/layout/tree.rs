//! Recursive growth-tree layout.
//!
//! Habits size the trunk, goals become branches (subgoals recurse by depth
//! level, alternating sides at the root), tasks become leaves and challenges
//! become roots.
//!
//! # Invariants
//! - The first `ceil(n / 2)` root goals go left, the rest right.
//! - Subgoals inherit their parent's side.
//! - Branches are laid out down to depth `MAX_BRANCH_LEVEL`; deeper subgoals
//!   are only counted in `hidden_subgoals`.

use crate::model::challenge::{Challenge, ChallengeId};
use crate::model::goal::{GoalId, GoalNode, TaskId};
use crate::model::habit::Habit;
use serde::Serialize;

const TRUNK_BASE_WIDTH: f64 = 20.0;
const TRUNK_MAX_WIDTH: f64 = 120.0;
const TRUNK_WIDTH_PER_STREAK: f64 = 3.0;
const TRUNK_WIDTH_PER_COMPLETED_HABIT: f64 = 8.0;
const TRUNK_MIN_HEIGHT: f64 = 150.0;
const TRUNK_HEIGHT_PER_BRANCH: f64 = 30.0;
const TRUNK_HEIGHT_PER_COMPLETED_HABIT: f64 = 15.0;

const BRANCH_FIRST_TOP: f64 = 40.0;
const BRANCH_TOP_SPACING: f64 = 60.0;
const BRANCH_MIN_LENGTH: f64 = 50.0;
const BRANCH_MAX_LENGTH: f64 = 140.0;
const BRANCH_LENGTH_TAPER_PER_LEVEL: f64 = 25.0;
const BRANCH_BASE_ANGLE: f64 = 25.0;
const BRANCH_ANGLE_PER_LEVEL: f64 = 5.0;
const BRANCH_ANGLE_JITTER: f64 = 5.0;
const BRANCH_ANGLE_SPREAD: f64 = 10.0;
const BRANCH_BASE_THICKNESS: f64 = 10.0;
const BRANCH_THICKNESS_TAPER_PER_LEVEL: f64 = 2.0;

const SUBGOAL_TOP_LEFT: f64 = -15.0;
const SUBGOAL_TOP_RIGHT: f64 = 10.0;
const SUBGOAL_SPACING: f64 = 20.0;

const LEAF_FIRST_OFFSET: f64 = 20.0;
const LEAF_SPACING: f64 = 25.0;
const LEAF_BASE_RISE: f64 = 10.0;
const LEAF_STAGGER: f64 = 5.0;

const ROOT_ANGLE_STEP: f64 = -15.0;
const ROOT_GROWN_LENGTH: f64 = 48.0;
const ROOT_DORMANT_LENGTH: f64 = 12.0;

/// Deepest level that still gets a branch; root goals are level 0.
pub const MAX_BRANCH_LEVEL: u32 = 3;

/// Which side of the trunk a branch grows on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn sign(self) -> f64 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrunkLayout {
    pub width: f64,
    pub height: f64,
}

/// One task rendered on its goal's branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafLayout {
    pub task_id: TaskId,
    /// Distance from the branch's outer edge along the branch.
    pub offset: f64,
    /// Vertical offset from the branch; negative sits above it.
    pub rise: f64,
    /// Completed tasks grow full leaves.
    pub grown: bool,
}

/// One goal rendered as a branch, with its subgoal branches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchLayout {
    pub goal_id: GoalId,
    pub side: Side,
    pub level: u32,
    /// Position among siblings on the same side.
    pub index: usize,
    /// Distance of the branch anchor from the top of its container.
    pub top: f64,
    pub length: f64,
    /// Rotation in degrees.
    pub angle: f64,
    pub thickness: f64,
    pub leaves: Vec<LeafLayout>,
    pub subgoals: Vec<BranchLayout>,
    /// Subgoals past `MAX_BRANCH_LEVEL`, not laid out.
    pub hidden_subgoals: usize,
}

impl BranchLayout {
    /// Counts this branch and every laid-out descendant branch.
    pub fn branch_count(&self) -> usize {
        1 + self
            .subgoals
            .iter()
            .map(BranchLayout::branch_count)
            .sum::<usize>()
    }
}

/// One challenge rendered as a root under the soil.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootLayout {
    pub challenge_id: ChallengeId,
    /// Rotation in degrees, fanning outward from the trunk.
    pub rotation: f64,
    pub length: f64,
    /// Completed challenges grow roots.
    pub grown: bool,
}

/// Full growth-tree geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeLayout {
    pub trunk: TrunkLayout,
    pub branches: Vec<BranchLayout>,
    pub roots: Vec<RootLayout>,
}

impl TreeLayout {
    pub fn branch_count(&self) -> usize {
        self.branches.iter().map(BranchLayout::branch_count).sum()
    }
}

/// Computes the tree layout.
///
/// `goal_forest` is expected to hold root goals only, as returned by
/// `build_goal_forest`; nested goals are reached through `subgoals`.
pub fn compute_tree_layout(
    habits: &[Habit],
    goal_forest: &[GoalNode],
    challenges: &[Challenge],
) -> TreeLayout {
    let left_count = goal_forest.len().div_ceil(2);
    let right_count = goal_forest.len() - left_count;

    let branches = goal_forest
        .iter()
        .enumerate()
        .map(|(position, node)| {
            let (side, index, total_on_side) = if position < left_count {
                (Side::Left, position, left_count)
            } else {
                (Side::Right, position - left_count, right_count)
            };
            let top = BRANCH_FIRST_TOP + index as f64 * BRANCH_TOP_SPACING;
            layout_branch(node, side, 0, index, total_on_side, top)
        })
        .collect();

    TreeLayout {
        trunk: trunk_layout(habits, goal_forest.len()),
        branches,
        roots: root_layouts(challenges),
    }
}

fn trunk_layout(habits: &[Habit], root_goal_count: usize) -> TrunkLayout {
    let total_streak: u64 = habits.iter().map(|habit| u64::from(habit.streak)).sum();
    let completed = habits.iter().filter(|habit| habit.completed).count() as f64;

    let streak_width =
        (TRUNK_BASE_WIDTH + total_streak as f64 * TRUNK_WIDTH_PER_STREAK).min(TRUNK_MAX_WIDTH);
    let width = (streak_width + completed * TRUNK_WIDTH_PER_COMPLETED_HABIT).min(TRUNK_MAX_WIDTH);
    let height = TRUNK_MIN_HEIGHT
        + root_goal_count as f64 * TRUNK_HEIGHT_PER_BRANCH
        + completed * TRUNK_HEIGHT_PER_COMPLETED_HABIT;

    TrunkLayout { width, height }
}

fn layout_branch(
    node: &GoalNode,
    side: Side,
    level: u32,
    index: usize,
    total_on_side: usize,
    top: f64,
) -> BranchLayout {
    let thickness = branch_thickness(level);
    let leaves = node
        .tasks
        .iter()
        .enumerate()
        .map(|(idx, task)| LeafLayout {
            task_id: task.id,
            offset: LEAF_FIRST_OFFSET + idx as f64 * LEAF_SPACING,
            rise: match side {
                Side::Left => -(LEAF_BASE_RISE + (idx % 2) as f64 * LEAF_STAGGER),
                Side::Right => thickness,
            },
            grown: task.completed,
        })
        .collect();

    let (subgoals, hidden_subgoals) = if level < MAX_BRANCH_LEVEL {
        let siblings = node.subgoals.len();
        let container_top = match side {
            Side::Left => SUBGOAL_TOP_LEFT,
            Side::Right => SUBGOAL_TOP_RIGHT,
        };
        let subgoals = node
            .subgoals
            .iter()
            .enumerate()
            .map(|(idx, child)| {
                let top = container_top + idx as f64 * SUBGOAL_SPACING;
                layout_branch(child, side, level + 1, idx, siblings, top)
            })
            .collect();
        (subgoals, 0)
    } else {
        (Vec::new(), node.subgoals.len())
    };

    BranchLayout {
        goal_id: node.goal.id,
        side,
        level,
        index,
        top,
        length: branch_length(level, node.goal.progress),
        angle: branch_angle(side, level, index, total_on_side),
        thickness,
        leaves,
        subgoals,
        hidden_subgoals,
    }
}

fn branch_length(level: u32, progress: u8) -> f64 {
    let max_length = BRANCH_MAX_LENGTH - f64::from(level) * BRANCH_LENGTH_TAPER_PER_LEVEL;
    BRANCH_MIN_LENGTH + (max_length - BRANCH_MIN_LENGTH) * (f64::from(progress) / 100.0)
}

fn branch_angle(side: Side, level: u32, index: usize, total_on_side: usize) -> f64 {
    let sign = side.sign();
    let spread = (index as f64 / total_on_side.max(1) as f64 - 0.5) * BRANCH_ANGLE_SPREAD;
    let jitter = ((index % 3) as f64 - 1.0) * BRANCH_ANGLE_JITTER;
    sign * BRANCH_BASE_ANGLE + spread + sign * f64::from(level) * BRANCH_ANGLE_PER_LEVEL + jitter
}

fn branch_thickness(level: u32) -> f64 {
    BRANCH_BASE_THICKNESS - f64::from(level) * BRANCH_THICKNESS_TAPER_PER_LEVEL
}

fn root_layouts(challenges: &[Challenge]) -> Vec<RootLayout> {
    let center = challenges.len() as f64 / 2.0;
    challenges
        .iter()
        .enumerate()
        .map(|(index, challenge)| RootLayout {
            challenge_id: challenge.id,
            rotation: (index as f64 - center + 0.5) * ROOT_ANGLE_STEP,
            length: if challenge.completed {
                ROOT_GROWN_LENGTH
            } else {
                ROOT_DORMANT_LENGTH
            },
            grown: challenge.completed,
        })
        .collect()
}
