use shared::domain::{Genre, GenreId, ImageRef, RoundLimit};

use super::*;

fn hosts() -> ImageHosts {
    ImageHosts {
        backdrop_base: "https://image.tmdb.org/t/p/original".into(),
        poster_base: "https://image.tmdb.org/t/p/w500".into(),
    }
}

fn render_all(commands: Vec<RenderCommand>) -> String {
    let mut renderer = TerminalRenderer::new(Vec::new(), hosts());
    for command in commands {
        renderer.render(command);
    }
    String::from_utf8(renderer.into_inner()).expect("utf8")
}

#[test]
fn images_render_as_full_urls() {
    let out = render_all(vec![
        RenderCommand::ShowImage {
            image: ImageRef::new("/a.jpg"),
            revealed: 1,
            hints_remaining: 2,
        },
        RenderCommand::ShowImage {
            image: ImageRef::new("/c.jpg"),
            revealed: 3,
            hints_remaining: 0,
        },
    ]);
    assert!(out.contains("[image 1/3] https://image.tmdb.org/t/p/original/a.jpg"));
    assert!(out.contains("[image 3/3, last one] https://image.tmdb.org/t/p/original/c.jpg"));
}

#[test]
fn win_shows_points_and_poster() {
    let out = render_all(vec![RenderCommand::ShowRoundResult {
        outcome: RoundOutcome::Won,
        points_delta: 2,
        title: "Amélie".into(),
        poster: Some(ImageRef::new("/poster.jpg")),
        revealed: 2,
    }]);
    assert!(out.contains("Bravo! It was Amélie. Found with 2 image(s): +2 points."));
    assert!(out.contains("Poster: https://image.tmdb.org/t/p/w500/poster.jpg"));
    assert!(out.contains("/next"));
}

#[test]
fn skip_without_poster_omits_poster_line() {
    let out = render_all(vec![RenderCommand::ShowRoundResult {
        outcome: RoundOutcome::Skipped,
        points_delta: 0,
        title: "Heat".into(),
        poster: None,
        revealed: 1,
    }]);
    assert!(out.contains("Skipped. The answer was Heat."));
    assert!(!out.contains("Poster:"));
}

#[test]
fn score_line_shows_round_limit() {
    let out = render_all(vec![
        RenderCommand::ShowScore {
            score: 4,
            round: 2,
            max_rounds: RoundLimit::Limited(5),
        },
        RenderCommand::ShowScore {
            score: 0,
            round: 1,
            max_rounds: RoundLimit::Unbounded,
        },
    ]);
    assert!(out.contains("Score: 4 | Round 2/5"));
    assert!(out.contains("Score: 0 | Round 1/∞"));
}

#[test]
fn suggestions_are_numbered_and_empty_list_prints_nothing() {
    let out = render_all(vec![
        RenderCommand::ShowSuggestions {
            suggestions: vec![
                Suggestion::from_release_date("Matrix", Some("1999-03-31")),
                Suggestion::from_release_date("Matrix Resurrections", None),
            ],
        },
        RenderCommand::ShowSuggestions {
            suggestions: Vec::new(),
        },
    ]);
    assert!(out.contains("  1. Matrix (1999)"));
    assert!(out.contains("  2. Matrix Resurrections\n"));
    assert_eq!(out.matches("Suggestions:").count(), 1);
}

#[test]
fn genres_list_ids_and_names() {
    let out = render_all(vec![RenderCommand::ShowGenres {
        genres: vec![Genre {
            id: GenreId(28),
            name: "Action".into(),
        }],
    }]);
    assert!(out.contains("      28  Action"));
}

#[test]
fn errors_explain_next_step() {
    let out = render_all(vec![
        RenderCommand::ShowError {
            code: ErrorCode::Network,
            message: "network failure: timed out".into(),
            fatal: false,
        },
        RenderCommand::ShowError {
            code: ErrorCode::RoundUnavailable,
            message: "unable to load a movie after 5 attempts".into(),
            fatal: true,
        },
        RenderCommand::ShowError {
            code: ErrorCode::CredentialInvalid,
            message: "rejected".into(),
            fatal: true,
        },
    ]);
    assert!(out.contains("/retry"));
    assert!(out.contains("Try other /settings"));
    assert!(out.contains("/reset-key"));
}
