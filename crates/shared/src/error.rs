use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MovieId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    CredentialInvalid,
    EmptyCredential,
    NoCandidateMovies,
    NoUsableImages,
    Network,
    RoundUnavailable,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("the movie database rejected the API key")]
    CredentialInvalid,
    #[error("please enter an API key")]
    EmptyCredential,
    #[error("no candidate movies on page {page}")]
    NoCandidateMovies { page: u32 },
    #[error("movie {movie_id} has no usable backdrops")]
    NoUsableImages { movie_id: MovieId },
    #[error("network failure: {0}")]
    Network(String),
    #[error("unable to load a movie after {attempts} attempts")]
    RoundUnavailable { attempts: u32 },
}

impl GameError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::CredentialInvalid => ErrorCode::CredentialInvalid,
            Self::EmptyCredential => ErrorCode::EmptyCredential,
            Self::NoCandidateMovies { .. } => ErrorCode::NoCandidateMovies,
            Self::NoUsableImages { .. } => ErrorCode::NoUsableImages,
            Self::Network(_) => ErrorCode::Network,
            Self::RoundUnavailable { .. } => ErrorCode::RoundUnavailable,
        }
    }

    /// Empty provider results are retried automatically with a fresh random pick.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NoCandidateMovies { .. } | Self::NoUsableImages { .. }
        )
    }

    /// Fatal errors leave the session unable to continue without user intervention
    /// outside the game (a new key, a different filter, a restart).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CredentialInvalid | Self::RoundUnavailable { .. })
    }
}

pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_results_are_retryable_but_not_fatal() {
        let err = GameError::NoUsableImages {
            movie_id: MovieId(7),
        };
        assert!(err.is_retryable());
        assert!(!err.is_fatal());
        assert_eq!(err.code(), ErrorCode::NoUsableImages);
    }

    #[test]
    fn network_failures_are_recoverable() {
        let err = GameError::network("connection refused");
        assert!(!err.is_retryable());
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "network failure: connection refused");
    }

    #[test]
    fn exhausted_budget_is_fatal() {
        let err = GameError::RoundUnavailable { attempts: 5 };
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "unable to load a movie after 5 attempts");
    }
}
