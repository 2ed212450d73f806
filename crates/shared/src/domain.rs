use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MovieId);
id_newtype!(GenreId);

/// Most images a single round will ever reveal.
pub const MAX_REVEALS: usize = 3;

/// Provider-relative image path such as `/kXfqcdQKsToO0OUXHcrrNCHDBzO.jpg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins the path onto an image host prefix such as
    /// `https://image.tmdb.org/t/p/original`.
    pub fn url(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        if self.0.starts_with('/') {
            format!("{base}{}", self.0)
        } else {
            format!("{base}/{}", self.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<ImageRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<String>,
}

impl Suggestion {
    /// Builds a suggestion from a `YYYY-MM-DD` release date, keeping only the year.
    pub fn from_release_date(title: impl Into<String>, release_date: Option<&str>) -> Self {
        let release_year = release_date
            .and_then(|date| date.split('-').next())
            .map(str::trim)
            .filter(|year| !year.is_empty())
            .map(str::to_string);
        Self {
            title: title.into(),
            release_year,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "rounds", rename_all = "snake_case")]
pub enum RoundLimit {
    #[default]
    Unbounded,
    Limited(u32),
}

impl RoundLimit {
    /// A limit of zero rounds would end the session before it starts; treat it as unbounded.
    pub fn from_count(rounds: u32) -> Self {
        if rounds == 0 {
            Self::Unbounded
        } else {
            Self::Limited(rounds)
        }
    }

    pub fn allows_another(&self, rounds_played: u32) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limited(max) => rounds_played < *max,
        }
    }
}

impl fmt::Display for RoundLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("∞"),
            Self::Limited(max) => write!(f, "{max}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    pub max_rounds: RoundLimit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<GenreId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Won,
    Lost,
    Skipped,
}

impl RoundOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Self::Won)
    }
}

/// Points for a correct guess made with `revealed` images on screen.
///
/// One image pays 3, two pay 2, three pay 1. Anything outside `1..=3` pays nothing.
pub fn points_for_reveal(revealed: usize) -> u32 {
    match revealed {
        1..=MAX_REVEALS => (MAX_REVEALS + 1 - revealed) as u32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_shrink_with_reveal_depth() {
        assert_eq!(points_for_reveal(1), 3);
        assert_eq!(points_for_reveal(2), 2);
        assert_eq!(points_for_reveal(3), 1);
        assert_eq!(points_for_reveal(0), 0);
        assert_eq!(points_for_reveal(4), 0);
    }

    #[test]
    fn image_url_joins_with_single_slash() {
        let image = ImageRef::new("/abc.jpg");
        assert_eq!(
            image.url("https://image.tmdb.org/t/p/original/"),
            "https://image.tmdb.org/t/p/original/abc.jpg"
        );
        assert_eq!(
            ImageRef::new("abc.jpg").url("https://image.tmdb.org/t/p/w500"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn suggestion_keeps_only_release_year() {
        let s = Suggestion::from_release_date("Amélie", Some("2001-04-25"));
        assert_eq!(s.release_year.as_deref(), Some("2001"));

        let s = Suggestion::from_release_date("Unreleased", Some(""));
        assert_eq!(s.release_year, None);

        let s = Suggestion::from_release_date("Unknown", None);
        assert_eq!(s.release_year, None);
    }

    #[test]
    fn round_limit_zero_means_unbounded() {
        assert_eq!(RoundLimit::from_count(0), RoundLimit::Unbounded);
        assert!(RoundLimit::Limited(2).allows_another(1));
        assert!(!RoundLimit::Limited(2).allows_another(2));
        assert!(RoundLimit::Unbounded.allows_another(u32::MAX));
    }

    #[test]
    fn session_config_serializes_tagged_limit() {
        let config = SessionConfig {
            max_rounds: RoundLimit::Limited(5),
            category: Some(GenreId(28)),
        };
        let json = serde_json::to_value(config).expect("serialize");
        assert_eq!(json["max_rounds"]["kind"], "limited");
        assert_eq!(json["max_rounds"]["rounds"], 5);
        assert_eq!(json["category"], 28);
    }
}
