//! Game core: provider access, guess evaluation, the session controller and the
//! pieces of entry-screen and autocomplete logic the view layer drives.

pub mod credentials;
pub mod guess;
pub mod provider;
pub mod session;
pub mod suggest;
pub mod tmdb;

pub use credentials::{CredentialGate, RestoreOutcome};
pub use provider::{MissingMovieProvider, MovieProvider};
pub use session::{
    ControllerOptions, GameController, GuessVerdict, Phase, Renderer, Round, Session,
};
pub use suggest::{run_search, SearchRequest, SearchTicket, SuggestionTracker};
pub use tmdb::TmdbClient;
