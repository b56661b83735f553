//! Challenge domain model.
//!
//! # Invariants
//! - `completed` is one-way: once true it never returns to false.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable challenge identifier.
pub type ChallengeId = Uuid;

/// One-time wellness activity, completable once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

impl Challenge {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            completed: false,
        }
    }
}

/// Built-in idea used by daily challenge generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeIdea {
    pub title: &'static str,
    pub description: &'static str,
}

/// Pool the daily challenge generator draws from.
pub const DAILY_CHALLENGE_IDEAS: &[ChallengeIdea] = &[
    ChallengeIdea {
        title: "Mindful Breathing",
        description:
            "Take 5 minutes to focus only on your breath, counting each inhale and exhale.",
    },
    ChallengeIdea {
        title: "Gratitude Reflection",
        description: "Write down three things you are grateful for today.",
    },
    ChallengeIdea {
        title: "Digital Detox",
        description: "Spend one hour completely disconnected from all digital devices.",
    },
    ChallengeIdea {
        title: "Self-Compassion",
        description: "Write down three positive things about yourself that you appreciate.",
    },
    ChallengeIdea {
        title: "Nature Connection",
        description: "Spend at least 15 minutes outside connecting with nature, observing details you normally miss.",
    },
];
