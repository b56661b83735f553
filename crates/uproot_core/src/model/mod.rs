//! Domain model for habits, goals, tasks and challenges.
//!
//! # Responsibility
//! - Define canonical records shared by services, layout and callers.
//! - Keep derived values (goal progress, subgoal/task trees) computable from
//!   flat records alone.
//!
//! # Invariants
//! - Every record is identified by a stable UUID v4.
//! - Goal progress is derived from directly-attached tasks, never set by hand.

pub mod challenge;
pub mod goal;
pub mod habit;
