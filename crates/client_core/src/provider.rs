use async_trait::async_trait;
use shared::{
    domain::{Genre, GenreId, ImageRef, Movie, MovieId, Suggestion},
    error::{GameError, GameResult},
};

/// Read-only view of the movie database the game is played against.
#[async_trait]
pub trait MovieProvider: Send + Sync {
    /// Checks a candidate API key without storing it anywhere.
    async fn authenticate(&self, api_key: &str) -> GameResult<bool>;
    async fn list_candidates(&self, page: u32, genre: Option<GenreId>) -> GameResult<Vec<Movie>>;
    async fn list_genres(&self) -> GameResult<Vec<Genre>>;
    /// Usable backdrops only; entries without a file path are dropped.
    async fn fetch_backdrops(&self, movie_id: MovieId) -> GameResult<Vec<ImageRef>>;
    async fn search(&self, query: &str) -> GameResult<Vec<Suggestion>>;
}

pub struct MissingMovieProvider;

#[async_trait]
impl MovieProvider for MissingMovieProvider {
    async fn authenticate(&self, _api_key: &str) -> GameResult<bool> {
        Err(GameError::network("movie provider is unavailable"))
    }

    async fn list_candidates(
        &self,
        _page: u32,
        _genre: Option<GenreId>,
    ) -> GameResult<Vec<Movie>> {
        Err(GameError::network("movie provider is unavailable"))
    }

    async fn list_genres(&self) -> GameResult<Vec<Genre>> {
        Err(GameError::network("movie provider is unavailable"))
    }

    async fn fetch_backdrops(&self, _movie_id: MovieId) -> GameResult<Vec<ImageRef>> {
        Err(GameError::network("movie provider is unavailable"))
    }

    async fn search(&self, _query: &str) -> GameResult<Vec<Suggestion>> {
        Err(GameError::network("movie provider is unavailable"))
    }
}
