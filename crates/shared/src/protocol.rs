use serde::{Deserialize, Serialize};

use crate::{
    domain::{Genre, GenreId, ImageRef, RoundLimit, RoundOutcome, Suggestion},
    error::ErrorCode,
};

/// Input raised by the view layer into the session controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ViewEvent {
    SubmitGuess {
        text: String,
    },
    RequestHint,
    SkipRound,
    AcknowledgeResult,
    ChangeSettings {
        max_rounds: RoundLimit,
        #[serde(default)]
        category: Option<GenreId>,
    },
    Retry,
}

impl ViewEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitGuess { .. } => "submit_guess",
            Self::RequestHint => "request_hint",
            Self::SkipRound => "skip_round",
            Self::AcknowledgeResult => "acknowledge_result",
            Self::ChangeSettings { .. } => "change_settings",
            Self::Retry => "retry",
        }
    }
}

/// Instruction emitted by the session controller for the view layer to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RenderCommand {
    ShowLoading,
    ShowImage {
        image: ImageRef,
        revealed: usize,
        hints_remaining: usize,
    },
    ShowIncorrectGuess {
        guess: String,
    },
    ShowScore {
        score: u32,
        round: u32,
        max_rounds: RoundLimit,
    },
    ShowRoundResult {
        outcome: RoundOutcome,
        points_delta: u32,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        poster: Option<ImageRef>,
        revealed: usize,
    },
    ShowSessionFinished {
        final_score: u32,
        rounds_played: u32,
    },
    ShowSuggestions {
        suggestions: Vec<Suggestion>,
    },
    ShowGenres {
        genres: Vec<Genre>,
    },
    ShowError {
        code: ErrorCode,
        message: String,
        fatal: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_events_use_tagged_wire_shape() {
        let event = ViewEvent::SubmitGuess {
            text: "Amélie".into(),
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "submit_guess");
        assert_eq!(json["payload"]["text"], "Amélie");

        let decoded: ViewEvent =
            serde_json::from_str(r#"{"type":"request_hint"}"#).expect("deserialize");
        assert_eq!(decoded, ViewEvent::RequestHint);
    }

    #[test]
    fn change_settings_defaults_to_no_category() {
        let decoded: ViewEvent = serde_json::from_str(
            r#"{"type":"change_settings","payload":{"max_rounds":{"kind":"limited","rounds":3}}}"#,
        )
        .expect("deserialize");
        assert_eq!(
            decoded,
            ViewEvent::ChangeSettings {
                max_rounds: RoundLimit::Limited(3),
                category: None,
            }
        );
    }
}
