//! Session controller: round lifecycle, scoring and render orchestration.

use std::sync::Arc;

use rand::{
    rngs::StdRng,
    seq::{IndexedRandom, SliceRandom},
    Rng, SeedableRng,
};
use shared::{
    domain::{
        points_for_reveal, Genre, GenreId, ImageRef, Movie, RoundLimit, RoundOutcome,
        SessionConfig, MAX_REVEALS,
    },
    error::{GameError, GameResult},
    protocol::{RenderCommand, ViewEvent},
};
use tracing::{debug, info, warn};

use crate::{guess, provider::MovieProvider};

pub const DEFAULT_MAX_CANDIDATE_PAGE: u32 = 50;
pub const DEFAULT_ROUND_RETRY_BUDGET: u32 = 5;

/// Receives render instructions from the controller.
pub trait Renderer: Send {
    fn render(&mut self, command: RenderCommand);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Active,
    RoundOver(RoundOutcome),
    Finished,
    Failed { fatal: bool },
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Candidate pages are drawn uniformly from `1..=max_candidate_page`.
    pub max_candidate_page: u32,
    /// Attempts allowed to find a movie with candidates and backdrops.
    pub round_retry_budget: u32,
    pub seed: Option<u64>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            max_candidate_page: DEFAULT_MAX_CANDIDATE_PAGE,
            round_retry_budget: DEFAULT_ROUND_RETRY_BUDGET,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub score: u32,
    pub current_round: u32,
    pub config: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub target: Movie,
    pub reveal_sequence: Vec<ImageRef>,
    pub revealed_count: usize,
}

impl Round {
    pub fn hints_remaining(&self) -> usize {
        self.reveal_sequence.len().saturating_sub(self.revealed_count)
    }

    pub fn current_image(&self) -> Option<&ImageRef> {
        self.revealed_count
            .checked_sub(1)
            .and_then(|idx| self.reveal_sequence.get(idx))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessVerdict {
    Ignored,
    Correct { points: u32 },
    Incorrect { revealed: usize },
    OutOfHints,
}

/// Uniform random sample of at most [`MAX_REVEALS`] images.
pub fn select_reveal_sequence<R: Rng + ?Sized>(
    mut images: Vec<ImageRef>,
    rng: &mut R,
) -> Vec<ImageRef> {
    images.shuffle(rng);
    images.truncate(MAX_REVEALS);
    images
}

pub struct GameController<R: Renderer> {
    provider: Arc<dyn MovieProvider>,
    renderer: R,
    options: ControllerOptions,
    rng: StdRng,
    session: Session,
    round: Option<Round>,
    phase: Phase,
}

impl<R: Renderer> GameController<R> {
    pub fn new(provider: Arc<dyn MovieProvider>, renderer: R, options: ControllerOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            provider,
            renderer,
            options,
            rng,
            session: Session::default(),
            round: None,
            phase: Phase::Idle,
        }
    }

    pub fn provider(&self) -> Arc<dyn MovieProvider> {
        Arc::clone(&self.provider)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Dispatches a view event. Events arriving while a round loads, or that do not
    /// apply to the current phase, are dropped.
    pub async fn handle_event(&mut self, event: ViewEvent) -> GameResult<()> {
        if self.phase == Phase::Loading {
            debug!(event = event.name(), "ignoring input while a round is loading");
            return Ok(());
        }

        match event {
            ViewEvent::SubmitGuess { text } => {
                self.submit_guess(&text);
                Ok(())
            }
            ViewEvent::RequestHint => {
                self.request_hint();
                Ok(())
            }
            ViewEvent::SkipRound => {
                self.skip_round();
                Ok(())
            }
            ViewEvent::AcknowledgeResult => self.advance().await,
            ViewEvent::ChangeSettings {
                max_rounds,
                category,
            } => self.change_settings(max_rounds, category).await,
            ViewEvent::Retry => self.retry().await,
        }
    }

    pub async fn start_session(&mut self, config: SessionConfig) -> GameResult<()> {
        info!(max_rounds = %config.max_rounds, category = ?config.category, "starting session");
        self.session = Session {
            score: 0,
            current_round: 0,
            config,
        };
        self.round = None;
        self.start_round().await
    }

    pub async fn change_settings(
        &mut self,
        max_rounds: RoundLimit,
        category: Option<GenreId>,
    ) -> GameResult<()> {
        self.start_session(SessionConfig {
            max_rounds,
            category,
        })
        .await
    }

    /// Loads the next round, retrying empty provider results up to the retry budget.
    pub async fn start_round(&mut self) -> GameResult<()> {
        self.phase = Phase::Loading;
        self.round = None;
        self.renderer.render(RenderCommand::ShowLoading);

        let budget = self.options.round_retry_budget.max(1);
        for attempt in 1..=budget {
            match self.load_round().await {
                Ok(round) => {
                    self.session.current_round += 1;
                    info!(
                        round = self.session.current_round,
                        movie_id = %round.target.id,
                        images = round.reveal_sequence.len(),
                        attempt,
                        "round started"
                    );
                    self.round = Some(round);
                    self.phase = Phase::Active;
                    self.render_score();
                    self.render_current_image();
                    return Ok(());
                }
                Err(err) if err.is_retryable() => {
                    warn!(attempt, budget, error = %err, "round start came back empty, retrying");
                }
                Err(err) => return Err(self.fail(err)),
            }
        }

        Err(self.fail(GameError::RoundUnavailable { attempts: budget }))
    }

    async fn load_round(&mut self) -> GameResult<Round> {
        let page = self
            .rng
            .random_range(1..=self.options.max_candidate_page.max(1));
        let candidates = self
            .provider
            .list_candidates(page, self.session.config.category)
            .await?;
        let target = candidates
            .choose(&mut self.rng)
            .cloned()
            .ok_or(GameError::NoCandidateMovies { page })?;

        let backdrops = self.provider.fetch_backdrops(target.id).await?;
        if backdrops.is_empty() {
            return Err(GameError::NoUsableImages {
                movie_id: target.id,
            });
        }

        Ok(Round {
            target,
            reveal_sequence: select_reveal_sequence(backdrops, &mut self.rng),
            revealed_count: 1,
        })
    }

    pub fn submit_guess(&mut self, text: &str) -> GuessVerdict {
        if self.phase != Phase::Active || text.trim().is_empty() {
            return GuessVerdict::Ignored;
        }
        let Some(round) = self.round.as_mut() else {
            return GuessVerdict::Ignored;
        };

        if guess::is_match(text, &round.target.title) {
            let points = points_for_reveal(round.revealed_count);
            self.finish_round(RoundOutcome::Won);
            return GuessVerdict::Correct { points };
        }

        if round.hints_remaining() > 0 {
            round.revealed_count += 1;
            let revealed = round.revealed_count;
            debug!(revealed, "incorrect guess, revealing next image");
            self.renderer.render(RenderCommand::ShowIncorrectGuess {
                guess: text.trim().to_string(),
            });
            self.render_current_image();
            return GuessVerdict::Incorrect { revealed };
        }

        self.finish_round(RoundOutcome::Lost);
        GuessVerdict::OutOfHints
    }

    /// Reveals the next image. Returns `false` when nothing was left to reveal.
    pub fn request_hint(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        let Some(round) = self.round.as_mut() else {
            return false;
        };
        if round.hints_remaining() == 0 {
            debug!("hint requested with every image already shown");
            return false;
        }
        round.revealed_count += 1;
        self.render_current_image();
        true
    }

    pub fn skip_round(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        self.finish_round(RoundOutcome::Skipped);
        true
    }

    /// Moves past an acknowledged round result: either the next round or the end
    /// of the session.
    pub async fn advance(&mut self) -> GameResult<()> {
        if !matches!(self.phase, Phase::RoundOver(_)) {
            return Ok(());
        }

        if self
            .session
            .config
            .max_rounds
            .allows_another(self.session.current_round)
        {
            return self.start_round().await;
        }

        self.phase = Phase::Finished;
        self.round = None;
        info!(
            final_score = self.session.score,
            rounds = self.session.current_round,
            "session finished"
        );
        self.renderer.render(RenderCommand::ShowSessionFinished {
            final_score: self.session.score,
            rounds_played: self.session.current_round,
        });
        Ok(())
    }

    /// Re-runs round start after a recoverable failure.
    pub async fn retry(&mut self) -> GameResult<()> {
        match self.phase {
            Phase::Failed { fatal: false } => self.start_round().await,
            _ => Ok(()),
        }
    }

    pub async fn list_genres(&mut self) -> GameResult<Vec<Genre>> {
        match self.provider.list_genres().await {
            Ok(genres) => {
                self.renderer.render(RenderCommand::ShowGenres {
                    genres: genres.clone(),
                });
                Ok(genres)
            }
            Err(err) => {
                warn!(error = %err, "failed to list genres");
                self.renderer.render(RenderCommand::ShowError {
                    code: err.code(),
                    message: err.to_string(),
                    fatal: false,
                });
                Err(err)
            }
        }
    }

    fn finish_round(&mut self, outcome: RoundOutcome) {
        let Some(round) = self.round.as_ref() else {
            return;
        };
        let points_delta = if outcome.is_win() {
            points_for_reveal(round.revealed_count)
        } else {
            0
        };
        self.session.score += points_delta;
        self.phase = Phase::RoundOver(outcome);

        info!(
            round = self.session.current_round,
            ?outcome,
            points_delta,
            score = self.session.score,
            "round finished"
        );
        let command = RenderCommand::ShowRoundResult {
            outcome,
            points_delta,
            title: round.target.title.clone(),
            poster: round.target.poster.clone(),
            revealed: round.revealed_count,
        };
        self.renderer.render(command);
        self.render_score();
    }

    fn fail(&mut self, err: GameError) -> GameError {
        let fatal = err.is_fatal();
        warn!(error = %err, fatal, "round start failed");
        self.phase = Phase::Failed { fatal };
        self.renderer.render(RenderCommand::ShowError {
            code: err.code(),
            message: err.to_string(),
            fatal,
        });
        err
    }

    fn render_score(&mut self) {
        self.renderer.render(RenderCommand::ShowScore {
            score: self.session.score,
            round: self.session.current_round,
            max_rounds: self.session.config.max_rounds,
        });
    }

    fn render_current_image(&mut self) {
        let Some(round) = self.round.as_ref() else {
            return;
        };
        let Some(image) = round.current_image().cloned() else {
            return;
        };
        let command = RenderCommand::ShowImage {
            image,
            revealed: round.revealed_count,
            hints_remaining: round.hints_remaining(),
        };
        self.renderer.render(command);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
