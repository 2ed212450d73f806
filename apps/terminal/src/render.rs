use std::{fmt::Display, io::Write};

use client_core::Renderer;
use shared::{
    domain::{RoundOutcome, Suggestion},
    error::ErrorCode,
    protocol::RenderCommand,
};

use crate::input::HELP;

/// Image host prefixes used to turn provider paths into links.
#[derive(Debug, Clone)]
pub struct ImageHosts {
    pub backdrop_base: String,
    pub poster_base: String,
}

pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    hosts: ImageHosts,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W, hosts: ImageHosts) -> Self {
        Self { out, hosts }
    }

    pub fn notice(&mut self, message: impl Display) {
        self.line(message);
    }

    pub fn help(&mut self) {
        self.line(HELP);
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: impl Display) {
        if let Err(err) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::debug!(error = %err, "failed to write to terminal");
        }
    }

    fn suggestions(&mut self, suggestions: &[Suggestion]) {
        if suggestions.is_empty() {
            return;
        }
        self.line("Suggestions:");
        for (idx, suggestion) in suggestions.iter().enumerate() {
            match &suggestion.release_year {
                Some(year) => self.line(format_args!("  {}. {} ({year})", idx + 1, suggestion.title)),
                None => self.line(format_args!("  {}. {}", idx + 1, suggestion.title)),
            }
        }
        self.line("Use /pick <n> to guess one of them.");
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::ShowLoading => self.line("Loading a new movie..."),
            RenderCommand::ShowImage {
                image,
                revealed,
                hints_remaining,
            } => {
                let url = image.url(&self.hosts.backdrop_base);
                let total = revealed + hints_remaining;
                if hints_remaining == 0 {
                    self.line(format_args!("[image {revealed}/{total}, last one] {url}"));
                } else {
                    self.line(format_args!("[image {revealed}/{total}] {url}"));
                }
            }
            RenderCommand::ShowIncorrectGuess { guess } => {
                self.line(format_args!("\"{guess}\" is not it."));
            }
            RenderCommand::ShowScore {
                score,
                round,
                max_rounds,
            } => self.line(format_args!("Score: {score} | Round {round}/{max_rounds}")),
            RenderCommand::ShowRoundResult {
                outcome,
                points_delta,
                title,
                poster,
                revealed,
            } => {
                match outcome {
                    RoundOutcome::Won => self.line(format_args!(
                        "Bravo! It was {title}. Found with {revealed} image(s): +{points_delta} points."
                    )),
                    RoundOutcome::Lost => {
                        self.line(format_args!("Too bad! The answer was {title}."))
                    }
                    RoundOutcome::Skipped => {
                        self.line(format_args!("Skipped. The answer was {title}."))
                    }
                }
                if let Some(poster) = poster {
                    let url = poster.url(&self.hosts.poster_base);
                    self.line(format_args!("Poster: {url}"));
                }
                self.line("Type /next to continue.");
            }
            RenderCommand::ShowSessionFinished {
                final_score,
                rounds_played,
            } => {
                self.line(format_args!(
                    "Session over after {rounds_played} round(s). Final score: {final_score}."
                ));
                self.line("Change /settings to play again, or /quit.");
            }
            RenderCommand::ShowSuggestions { suggestions } => self.suggestions(&suggestions),
            RenderCommand::ShowGenres { genres } => {
                self.line("Categories:");
                for genre in genres {
                    self.line(format_args!("  {:>6}  {}", genre.id.0, genre.name));
                }
            }
            RenderCommand::ShowError {
                code,
                message,
                fatal,
            } => match (code, fatal) {
                (ErrorCode::CredentialInvalid, _) => self.line(
                    "The API key was rejected. Use /reset-key, then restart with a valid key.",
                ),
                (_, true) => self.line(format_args!(
                    "Unable to load a movie: {message}. Try other /settings or restart."
                )),
                (ErrorCode::Network, false) => self.line(format_args!(
                    "Could not reach the movie database ({message}). Type /retry to try again."
                )),
                (_, false) => self.line(format_args!("Error: {message}")),
            },
        }
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
