mod config;
mod input;
mod render;

use std::{io::Stdout, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    guess, run_search, ControllerOptions, CredentialGate, GameController, Phase, Renderer,
    RestoreOutcome, SearchRequest, SearchTicket, SuggestionTracker, TmdbClient,
};
use shared::{
    domain::{Genre, GenreId, RoundLimit, SessionConfig, Suggestion},
    error::{GameError, GameResult},
    protocol::{RenderCommand, ViewEvent},
};
use storage::SqliteCredentialStore;
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::mpsc,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::Settings,
    input::{parse_command, Command, GenreChoice},
    render::{ImageHosts, TerminalRenderer},
};

type StdinLines = Lines<BufReader<Stdin>>;
type SearchOutcome = (SearchTicket, GameResult<Vec<Suggestion>>);

#[derive(Parser, Debug)]
#[command(about = "Guess the movie from its backdrops")]
struct Args {
    /// TOML settings file; defaults to ./backdrop_quiz.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// API key to validate and store instead of prompting.
    #[arg(long)]
    api_key: Option<String>,
    /// Rounds per session, 0 for unbounded.
    #[arg(long)]
    rounds: Option<u32>,
    /// Restrict movies to a genre id.
    #[arg(long)]
    genre: Option<i64>,
    /// Forget the stored API key and exit.
    #[arg(long)]
    reset_key: bool,
    /// Seed for reproducible movie and image picks.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = config::load_settings(args.config.as_deref())?;
    let database_url = storage::prepare_database_url(&settings.database_url)?;
    let store = Arc::new(SqliteCredentialStore::new(&database_url).await?);
    store.health_check().await?;

    let probe = Arc::new(TmdbClient::new(&settings.tmdb_base_url, settings.language.clone())?);
    info!(%database_url, tmdb = probe.base_url(), "starting backdrop quiz");
    let gate = CredentialGate::new(store, probe);

    if args.reset_key {
        gate.reset().await?;
        println!("Stored API key removed.");
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let Some(api_key) = obtain_api_key(&gate, args.api_key.as_deref(), &mut lines).await? else {
        return Ok(());
    };

    let provider = Arc::new(
        TmdbClient::new(&settings.tmdb_base_url, settings.language.clone())?.with_api_key(api_key),
    );
    let renderer = TerminalRenderer::new(
        std::io::stdout(),
        ImageHosts {
            backdrop_base: settings.backdrop_base(),
            poster_base: settings.poster_base(),
        },
    );
    let options = ControllerOptions {
        max_candidate_page: settings.max_candidate_page,
        round_retry_budget: settings.round_retry_budget,
        seed: args.seed,
    };
    let config = SessionConfig {
        max_rounds: RoundLimit::from_count(args.rounds.unwrap_or(settings.default_rounds)),
        category: args.genre.map(GenreId),
    };

    let mut app = App::new(GameController::new(provider, renderer, options), gate, &settings);
    app.controller.renderer_mut().help();
    if let Err(err) = app.controller.start_session(config).await {
        debug!(error = %err, "first round failed to start");
    }
    app.run(&mut lines).await
}

/// Resolves the API key: command line first, then the stored key, then a prompt.
///
/// Returns `None` when stdin closes before a key is accepted.
async fn obtain_api_key(
    gate: &CredentialGate,
    from_args: Option<&str>,
    lines: &mut StdinLines,
) -> Result<Option<String>> {
    if let Some(raw) = from_args {
        match gate.submit(raw).await {
            Ok(key) => return Ok(Some(key)),
            Err(err) => println!("{}", describe_credential_error(err)?),
        }
    } else {
        match gate.restore().await {
            Ok(RestoreOutcome::Valid(key)) => return Ok(Some(key)),
            Ok(RestoreOutcome::Revoked) => {
                println!("The stored API key is no longer accepted.");
            }
            Ok(RestoreOutcome::Missing) => {}
            Err(err) => {
                warn!(error = %err, "could not revalidate stored API key");
                println!("Could not check the stored API key ({err}).");
            }
        }
    }

    loop {
        println!("Enter your TMDB API key (v3):");
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            return Ok(None);
        };
        match gate.submit(&line).await {
            Ok(key) => {
                println!("Key accepted.");
                return Ok(Some(key));
            }
            Err(err) => println!("{}", describe_credential_error(err)?),
        }
    }
}

/// Turns a rejected submission into a message for the prompt. Storage failures
/// are not something the player can fix by typing, so they propagate.
fn describe_credential_error(err: anyhow::Error) -> Result<String> {
    match err.downcast_ref::<GameError>() {
        Some(GameError::EmptyCredential) => Ok("Please enter an API key.".into()),
        Some(GameError::CredentialInvalid) => {
            Ok("That key was rejected by the movie database.".into())
        }
        Some(GameError::Network(message)) => {
            Ok(format!("Could not reach the movie database: {message}"))
        }
        _ => Err(err),
    }
}

struct App {
    controller: GameController<TerminalRenderer<Stdout>>,
    gate: CredentialGate,
    tracker: SuggestionTracker,
    suggestions: Vec<Suggestion>,
    genres: Option<Vec<Genre>>,
    search_tx: mpsc::UnboundedSender<SearchOutcome>,
    search_rx: mpsc::UnboundedReceiver<SearchOutcome>,
}

impl App {
    fn new(
        controller: GameController<TerminalRenderer<Stdout>>,
        gate: CredentialGate,
        settings: &Settings,
    ) -> Self {
        let (search_tx, search_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            gate,
            tracker: SuggestionTracker::new(settings.min_query_chars, settings.max_suggestions),
            suggestions: Vec::new(),
            genres: None,
            search_tx,
            search_rx,
        }
    }

    async fn run(&mut self, lines: &mut StdinLines) -> Result<()> {
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("failed to read stdin")? else {
                        break;
                    };
                    if !self.dispatch(&line).await? {
                        break;
                    }
                }
                Some((ticket, result)) = self.search_rx.recv() => {
                    if let Some(suggestions) = self.tracker.complete(&ticket, result) {
                        self.suggestions = suggestions.clone();
                        self.controller
                            .renderer_mut()
                            .render(RenderCommand::ShowSuggestions { suggestions });
                    }
                }
            }
        }
        info!(score = self.controller.session().score, "bye");
        Ok(())
    }

    /// Handles one input line. Returns `false` when the player wants to leave.
    async fn dispatch(&mut self, line: &str) -> Result<bool> {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(err) => {
                self.controller.renderer_mut().notice(err);
                return Ok(true);
            }
        };

        let event = match command {
            Command::Empty => return Ok(true),
            Command::Quit => return Ok(false),
            Command::Help => {
                self.controller.renderer_mut().help();
                return Ok(true);
            }
            Command::ResetKey => {
                self.gate.reset().await?;
                self.controller
                    .renderer_mut()
                    .notice("Stored API key removed. Restart to enter a new one.");
                return Ok(false);
            }
            Command::Search(query) => {
                self.search(&query);
                return Ok(true);
            }
            Command::Genres => {
                if let Ok(genres) = self.controller.list_genres().await {
                    self.genres = Some(genres);
                }
                return Ok(true);
            }
            Command::Pick(n) => match self.suggestions.get(n - 1) {
                Some(suggestion) => ViewEvent::SubmitGuess {
                    text: suggestion.title.clone(),
                },
                None => {
                    self.controller
                        .renderer_mut()
                        .notice(format_args!("No suggestion number {n}."));
                    return Ok(true);
                }
            },
            Command::Guess(text) => ViewEvent::SubmitGuess { text },
            Command::Hint => ViewEvent::RequestHint,
            Command::Skip => ViewEvent::SkipRound,
            Command::Next => ViewEvent::AcknowledgeResult,
            Command::Retry => ViewEvent::Retry,
            Command::Settings { rounds, genre } => {
                let current = self.controller.session().config;
                let category = match genre {
                    None => current.category,
                    Some(choice) => match self.resolve_genre(choice).await {
                        Some(category) => category,
                        None => return Ok(true),
                    },
                };
                ViewEvent::ChangeSettings {
                    max_rounds: rounds.unwrap_or(current.max_rounds),
                    category,
                }
            }
        };

        if matches!(event, ViewEvent::SubmitGuess { .. }) {
            self.tracker.begin("");
            self.suggestions.clear();
        }
        self.explain_ignored(&event);
        if let Err(err) = self.controller.handle_event(event).await {
            debug!(error = %err, "controller reported an error");
        }
        Ok(true)
    }

    fn search(&mut self, query: &str) {
        match self.tracker.begin(query) {
            SearchRequest::Clear => {
                self.suggestions.clear();
                self.controller
                    .renderer_mut()
                    .notice("Type at least a couple of letters to search.");
            }
            SearchRequest::Search(ticket) => {
                let provider = self.controller.provider();
                let tx = self.search_tx.clone();
                tokio::spawn(async move {
                    let outcome = run_search(provider, ticket).await;
                    let _ = tx.send(outcome);
                });
            }
        }
    }

    /// Maps a genre choice to a category. `Some(None)` means any genre; `None`
    /// means the choice could not be resolved and was reported.
    async fn resolve_genre(&mut self, choice: GenreChoice) -> Option<Option<GenreId>> {
        let name = match choice {
            GenreChoice::Any => return Some(None),
            GenreChoice::Id(id) => return Some(Some(id)),
            GenreChoice::Name(name) => name,
        };

        if self.genres.is_none() {
            match self.controller.provider().list_genres().await {
                Ok(genres) => self.genres = Some(genres),
                Err(err) => {
                    self.controller
                        .renderer_mut()
                        .notice(format_args!("Could not load categories: {err}"));
                    return None;
                }
            }
        }

        let wanted = guess::normalize(&name);
        let found = self
            .genres
            .iter()
            .flatten()
            .find(|genre| guess::normalize(&genre.name) == wanted)
            .map(|genre| genre.id);
        if found.is_none() {
            self.controller
                .renderer_mut()
                .notice(format_args!("Unknown category '{name}', see /genres."));
            return None;
        }
        Some(found)
    }

    /// The controller silently drops events that do not fit its phase; tell the
    /// player what it is waiting for instead.
    fn explain_ignored(&mut self, event: &ViewEvent) {
        let phase = self.controller.phase();
        let hint = match (phase, event) {
            (Phase::Active, _) | (Phase::Loading, _) => return,
            (_, ViewEvent::ChangeSettings { .. }) => return,
            (Phase::RoundOver(_), ViewEvent::AcknowledgeResult) => return,
            (Phase::Failed { fatal: false }, ViewEvent::Retry) => return,
            (Phase::RoundOver(_), _) => "Type /next to continue.",
            (Phase::Finished, _) => "The session is over. Change /settings to play again.",
            (Phase::Failed { fatal: false }, _) => "Type /retry to load a movie.",
            (Phase::Failed { fatal: true }, _) | (Phase::Idle, _) => {
                "No round in progress. Try other /settings or restart."
            }
        };
        self.controller.renderer_mut().notice(hint);
    }
}
