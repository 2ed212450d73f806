//! HTTP client for The Movie Database v3 API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use shared::{
    domain::{Genre, GenreId, ImageRef, Movie, MovieId, Suggestion},
    error::{GameError, GameResult},
};
use tracing::{debug, warn};
use url::Url;

use crate::provider::MovieProvider;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "fr-FR";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const BACKDROP_IMAGE_LANGUAGES: &str = "en,null";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct MovieListResponse {
    #[serde(default)]
    results: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
struct MovieSummary {
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<GenreEntry>,
}

#[derive(Debug, Deserialize)]
struct GenreEntry {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    backdrops: Vec<ImageEntry>,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    #[serde(default)]
    file_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    release_date: Option<String>,
}

pub struct TmdbClient {
    http: Client,
    base_url: String,
    language: String,
    api_key: Option<String>,
}

impl TmdbClient {
    pub fn new(base_url: &str, language: impl Into<String>) -> GameResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|err| GameError::network(format!("invalid base url '{base_url}': {err}")))?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport_error)?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            language: language.into(),
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn api_key(&self) -> GameResult<&str> {
        self.api_key
            .as_deref()
            .ok_or(GameError::CredentialInvalid)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> GameResult<T> {
        let api_key = self.api_key()?;
        let res = self
            .http
            .get(self.endpoint(path))
            .query(&[("api_key", api_key)])
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(GameError::CredentialInvalid);
        }
        if !status.is_success() {
            warn!(path, %status, "movie database returned an error status");
            return Err(GameError::network(format!(
                "GET {path} returned status {status}"
            )));
        }

        res.json::<T>()
            .await
            .map_err(|err| GameError::network(format!("malformed response from {path}: {err}")))
    }
}

fn transport_error(err: reqwest::Error) -> GameError {
    GameError::network(err.to_string())
}

#[async_trait]
impl MovieProvider for TmdbClient {
    async fn authenticate(&self, api_key: &str) -> GameResult<bool> {
        let res = self
            .http
            .get(self.endpoint("authentication/token/new"))
            .query(&[("api_key", api_key)])
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(GameError::network(format!(
                "authentication check returned status {status}"
            )));
        }

        let body: TokenResponse = res
            .json()
            .await
            .map_err(|err| GameError::network(format!("malformed token response: {err}")))?;
        Ok(body.success)
    }

    async fn list_candidates(&self, page: u32, genre: Option<GenreId>) -> GameResult<Vec<Movie>> {
        let mut query = vec![
            ("language", self.language.clone()),
            ("page", page.to_string()),
        ];
        let path = match genre {
            Some(genre) => {
                query.push(("with_genres", genre.to_string()));
                query.push(("sort_by", "popularity.desc".to_string()));
                "discover/movie"
            }
            None => "movie/popular",
        };

        let body: MovieListResponse = self.get_json(path, &query).await?;
        let movies: Vec<Movie> = body
            .results
            .into_iter()
            .filter(|movie| !movie.title.trim().is_empty())
            .map(|movie| Movie {
                id: MovieId(movie.id),
                title: movie.title,
                poster: movie
                    .poster_path
                    .filter(|path| !path.is_empty())
                    .map(ImageRef::new),
            })
            .collect();
        debug!(page, ?genre, count = movies.len(), "listed candidate movies");
        Ok(movies)
    }

    async fn list_genres(&self) -> GameResult<Vec<Genre>> {
        let body: GenreListResponse = self
            .get_json("genre/movie/list", &[("language", self.language.clone())])
            .await?;
        Ok(body
            .genres
            .into_iter()
            .map(|genre| Genre {
                id: GenreId(genre.id),
                name: genre.name,
            })
            .collect())
    }

    async fn fetch_backdrops(&self, movie_id: MovieId) -> GameResult<Vec<ImageRef>> {
        let body: ImagesResponse = self
            .get_json(
                &format!("movie/{movie_id}/images"),
                &[(
                    "include_image_language",
                    BACKDROP_IMAGE_LANGUAGES.to_string(),
                )],
            )
            .await?;
        let backdrops: Vec<ImageRef> = body
            .backdrops
            .into_iter()
            .filter_map(|image| image.file_path)
            .filter(|path| !path.trim().is_empty())
            .map(ImageRef::new)
            .collect();
        debug!(%movie_id, count = backdrops.len(), "fetched backdrops");
        Ok(backdrops)
    }

    async fn search(&self, query: &str) -> GameResult<Vec<Suggestion>> {
        let body: SearchResponse = self
            .get_json(
                "search/movie",
                &[
                    ("query", query.to_string()),
                    ("language", self.language.clone()),
                    ("page", "1".to_string()),
                    ("include_adult", "false".to_string()),
                ],
            )
            .await?;
        Ok(body
            .results
            .into_iter()
            .filter(|result| !result.title.trim().is_empty())
            .map(|result| Suggestion::from_release_date(result.title, result.release_date.as_deref()))
            .collect())
    }
}

#[cfg(test)]
#[path = "tests/tmdb_tests.rs"]
mod tests;
