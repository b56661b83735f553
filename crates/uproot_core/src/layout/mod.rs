//! Visual layout of the growth tree.
//!
//! # Responsibility
//! - Turn habits, the goal forest and challenges into trunk, branch, leaf and
//!   root geometry.
//!
//! # Invariants
//! - Layout is a pure function of its inputs; equal inputs yield equal output.
//! - Units are CSS-like pixels and degrees.

pub mod tree;
