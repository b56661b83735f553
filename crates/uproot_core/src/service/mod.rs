//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod challenge_service;
pub mod goal_service;
pub mod growth_service;
pub mod habit_service;
pub mod title;
