//! Challenge use-case service.
//!
//! # Responsibility
//! - Provide list/complete/delete entry points for challenges.
//! - Generate daily challenges from the built-in idea pool.
//!
//! # Invariants
//! - Completion is one-way; completing twice is a successful no-op.

use crate::model::challenge::{Challenge, ChallengeId, DAILY_CHALLENGE_IDEAS};
use crate::repo::challenge_repo::ChallengeRepository;
use crate::repo::{EntityKind, RepoError};
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from challenge service operations.
#[derive(Debug)]
pub enum ChallengeServiceError {
    /// Target challenge does not exist.
    ChallengeNotFound(ChallengeId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for ChallengeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChallengeNotFound(id) => write!(f, "challenge not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ChallengeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::ChallengeNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ChallengeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                kind: EntityKind::Challenge,
                id,
            } => Self::ChallengeNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Challenge service facade.
pub struct ChallengeService<R: ChallengeRepository> {
    repo: R,
}

impl<R: ChallengeRepository> ChallengeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_challenges(&self) -> Result<Vec<Challenge>, ChallengeServiceError> {
        self.repo.list_challenges().map_err(Into::into)
    }

    /// Marks a challenge completed and returns it.
    pub fn complete_challenge(&self, id: ChallengeId) -> Result<Challenge, ChallengeServiceError> {
        self.repo.mark_completed(id)?;
        let challenge = self
            .repo
            .get_challenge(id)?
            .ok_or(ChallengeServiceError::ChallengeNotFound(id))?;
        info!(
            "event=challenge_complete module=challenge status=ok challenge_id={}",
            id
        );
        Ok(challenge)
    }

    /// Deletes a challenge. Returns `false` when nothing matched.
    pub fn delete_challenge(&self, id: ChallengeId) -> Result<bool, ChallengeServiceError> {
        let removed = self.repo.delete_challenge(id)?;
        info!(
            "event=challenge_delete module=challenge status=ok challenge_id={} removed={}",
            id, removed
        );
        Ok(removed)
    }

    /// Stores a new uncompleted challenge drawn from the idea pool.
    pub fn generate_daily_challenge(&self) -> Result<Challenge, ChallengeServiceError> {
        self.generate_daily_challenge_with(&mut rand::thread_rng())
    }

    /// Same as [`Self::generate_daily_challenge`] with a caller-provided RNG.
    pub fn generate_daily_challenge_with<G: Rng + ?Sized>(
        &self,
        rng: &mut G,
    ) -> Result<Challenge, ChallengeServiceError> {
        let challenge = DAILY_CHALLENGE_IDEAS
            .choose(rng)
            .map(|idea| Challenge::new(idea.title, idea.description))
            .ok_or_else(|| {
                ChallengeServiceError::Repo(RepoError::InvalidData(
                    "daily challenge idea pool is empty".to_string(),
                ))
            })?;
        self.repo.create_challenge(&challenge)?;
        info!(
            "event=challenge_generate module=challenge status=ok challenge_id={}",
            challenge.id
        );
        Ok(challenge)
    }
}
