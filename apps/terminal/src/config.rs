use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use client_core::{session, suggest, tmdb};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "backdrop_quiz.toml";
/// TMDB refuses list pages past 500.
const MAX_PROVIDER_PAGE: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tmdb_base_url: String,
    pub image_base_url: String,
    pub backdrop_size: String,
    pub poster_size: String,
    pub language: String,
    pub database_url: String,
    pub max_candidate_page: u32,
    pub round_retry_budget: u32,
    /// Rounds per session; 0 plays until the player quits.
    pub default_rounds: u32,
    pub min_query_chars: usize,
    pub max_suggestions: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tmdb_base_url: tmdb::DEFAULT_TMDB_BASE_URL.into(),
            image_base_url: "https://image.tmdb.org/t/p".into(),
            backdrop_size: "original".into(),
            poster_size: "w500".into(),
            language: tmdb::DEFAULT_LANGUAGE.into(),
            database_url: storage::DEFAULT_DATABASE_URL.into(),
            max_candidate_page: session::DEFAULT_MAX_CANDIDATE_PAGE,
            round_retry_budget: session::DEFAULT_ROUND_RETRY_BUDGET,
            default_rounds: 0,
            min_query_chars: suggest::MIN_QUERY_CHARS,
            max_suggestions: suggest::MAX_SUGGESTIONS,
        }
    }
}

impl Settings {
    pub fn backdrop_base(&self) -> String {
        format!(
            "{}/{}",
            self.image_base_url.trim_end_matches('/'),
            self.backdrop_size
        )
    }

    pub fn poster_base(&self) -> String {
        format!(
            "{}/{}",
            self.image_base_url.trim_end_matches('/'),
            self.poster_size
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    tmdb_base_url: Option<String>,
    image_base_url: Option<String>,
    backdrop_size: Option<String>,
    poster_size: Option<String>,
    language: Option<String>,
    database_url: Option<String>,
    max_candidate_page: Option<u32>,
    round_retry_budget: Option<u32>,
    default_rounds: Option<u32>,
    min_query_chars: Option<usize>,
    max_suggestions: Option<usize>,
}

/// Defaults, then the config file, then environment overrides.
///
/// An explicitly requested config file must exist; the default one is optional.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg = parse_file_settings(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            apply_file_settings(&mut settings, file_cfg);
        }
        Err(err) if required => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;
    validate(&mut settings)?;
    Ok(settings)
}

fn parse_file_settings(raw: &str) -> Result<FileSettings> {
    Ok(toml::from_str::<FileSettings>(raw)?)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.tmdb_base_url {
        settings.tmdb_base_url = v;
    }
    if let Some(v) = file_cfg.image_base_url {
        settings.image_base_url = v;
    }
    if let Some(v) = file_cfg.backdrop_size {
        settings.backdrop_size = v;
    }
    if let Some(v) = file_cfg.poster_size {
        settings.poster_size = v;
    }
    if let Some(v) = file_cfg.language {
        settings.language = v;
    }
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.max_candidate_page {
        settings.max_candidate_page = v;
    }
    if let Some(v) = file_cfg.round_retry_budget {
        settings.round_retry_budget = v;
    }
    if let Some(v) = file_cfg.default_rounds {
        settings.default_rounds = v;
    }
    if let Some(v) = file_cfg.min_query_chars {
        settings.min_query_chars = v;
    }
    if let Some(v) = file_cfg.max_suggestions {
        settings.max_suggestions = v;
    }
}

fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(v) = lookup("TMDB_BASE_URL") {
        settings.tmdb_base_url = v;
    }
    if let Some(v) = lookup("APP__TMDB_BASE_URL") {
        settings.tmdb_base_url = v;
    }
    if let Some(v) = lookup("APP__IMAGE_BASE_URL") {
        settings.image_base_url = v;
    }
    if let Some(v) = lookup("APP__LANGUAGE") {
        settings.language = v;
    }

    if let Some(v) = lookup("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = lookup("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = lookup("APP__MAX_CANDIDATE_PAGE") {
        settings.max_candidate_page = parse_number("APP__MAX_CANDIDATE_PAGE", &v)?;
    }
    if let Some(v) = lookup("APP__ROUND_RETRY_BUDGET") {
        settings.round_retry_budget = parse_number("APP__ROUND_RETRY_BUDGET", &v)?;
    }
    if let Some(v) = lookup("APP__DEFAULT_ROUNDS") {
        settings.default_rounds = parse_number("APP__DEFAULT_ROUNDS", &v)?;
    }

    Ok(())
}

fn parse_number<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{name} must be a non-negative integer, got '{raw}'"))
}

fn validate(settings: &mut Settings) -> Result<()> {
    for (name, value) in [
        ("tmdb_base_url", &settings.tmdb_base_url),
        ("image_base_url", &settings.image_base_url),
    ] {
        let parsed = Url::parse(value).with_context(|| format!("{name} '{value}' is not a url"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("{name} must use http or https, got '{value}'");
        }
    }

    if settings.round_retry_budget == 0 {
        bail!("round_retry_budget must be at least 1");
    }
    settings.max_candidate_page = settings.max_candidate_page.clamp(1, MAX_PROVIDER_PAGE);
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
