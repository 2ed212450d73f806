//! Line-oriented command parsing for the terminal front-end.

use shared::domain::{GenreId, RoundLimit};
use thiserror::Error;

pub const HELP: &str = "\
Type a title to guess, or one of:
  /hint                  reveal the next image
  /skip                  give up on this movie
  /next                  continue after a result
  /retry                 reload after a network problem
  ?<text>                search titles (e.g. ?matr)
  /pick <n>              guess suggestion number n
  /genres                list categories
  /settings rounds=<n|unbounded> genre=<id|name|any>
  /reset-key             forget the stored API key and exit
  /help, /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreChoice {
    Any,
    Id(GenreId),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Guess(String),
    Hint,
    Skip,
    Next,
    Retry,
    Search(String),
    Pick(usize),
    Genres,
    Settings {
        rounds: Option<RoundLimit>,
        genre: Option<GenreChoice>,
    },
    ResetKey,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command '/{0}', type /help")]
    UnknownCommand(String),
    #[error("/pick needs a suggestion number starting at 1")]
    InvalidPick,
    #[error("unrecognized setting '{0}', expected rounds=<n|unbounded> or genre=<id|name|any>")]
    InvalidSetting(String),
    #[error("/settings needs at least one of rounds=... or genre=...")]
    EmptySettings,
}

pub fn parse_command(line: &str) -> Result<Command, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }
    if let Some(query) = line.strip_prefix('?') {
        return Ok(Command::Search(query.trim().to_string()));
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Guess(line.to_string()));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    match name.to_ascii_lowercase().as_str() {
        "hint" => Ok(Command::Hint),
        "skip" => Ok(Command::Skip),
        "next" => Ok(Command::Next),
        "retry" => Ok(Command::Retry),
        "genres" => Ok(Command::Genres),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "reset-key" => Ok(Command::ResetKey),
        "pick" => match args.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(Command::Pick(n)),
            _ => Err(InputError::InvalidPick),
        },
        "settings" => parse_settings(args),
        other => Err(InputError::UnknownCommand(other.to_string())),
    }
}

fn parse_settings(args: &str) -> Result<Command, InputError> {
    let mut rounds = None;
    let mut genre = None;

    for token in args.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            return Err(InputError::InvalidSetting(token.to_string()));
        };
        match key.to_ascii_lowercase().as_str() {
            "rounds" => {
                rounds = Some(match value.to_ascii_lowercase().as_str() {
                    "unbounded" | "unlimited" | "0" => RoundLimit::Unbounded,
                    n => n
                        .parse::<u32>()
                        .map(RoundLimit::from_count)
                        .map_err(|_| InputError::InvalidSetting(token.to_string()))?,
                });
            }
            "genre" => {
                genre = Some(if value.eq_ignore_ascii_case("any") {
                    GenreChoice::Any
                } else if let Ok(id) = value.parse::<i64>() {
                    GenreChoice::Id(GenreId(id))
                } else if value.is_empty() {
                    return Err(InputError::InvalidSetting(token.to_string()));
                } else {
                    GenreChoice::Name(value.replace('_', " "))
                });
            }
            _ => return Err(InputError::InvalidSetting(token.to_string())),
        }
    }

    if rounds.is_none() && genre.is_none() {
        return Err(InputError::EmptySettings);
    }
    Ok(Command::Settings { rounds, genre })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_guess() {
        assert_eq!(
            parse_command("  Le Fabuleux Destin d'Amélie Poulain \n"),
            Ok(Command::Guess("Le Fabuleux Destin d'Amélie Poulain".into()))
        );
        assert_eq!(parse_command("   "), Ok(Command::Empty));
    }

    #[test]
    fn slash_commands_are_case_insensitive() {
        assert_eq!(parse_command("/HINT"), Ok(Command::Hint));
        assert_eq!(parse_command("/skip"), Ok(Command::Skip));
        assert_eq!(parse_command("/Next"), Ok(Command::Next));
        assert_eq!(parse_command("/exit"), Ok(Command::Quit));
        assert_eq!(parse_command("/reset-key"), Ok(Command::ResetKey));
        assert_eq!(
            parse_command("/dance"),
            Err(InputError::UnknownCommand("dance".into()))
        );
    }

    #[test]
    fn question_mark_starts_a_search() {
        assert_eq!(
            parse_command("? matr"),
            Ok(Command::Search("matr".into()))
        );
    }

    #[test]
    fn pick_requires_positive_number() {
        assert_eq!(parse_command("/pick 2"), Ok(Command::Pick(2)));
        assert_eq!(parse_command("/pick 0"), Err(InputError::InvalidPick));
        assert_eq!(parse_command("/pick"), Err(InputError::InvalidPick));
    }

    #[test]
    fn settings_parse_rounds_and_genre() {
        assert_eq!(
            parse_command("/settings rounds=5 genre=28"),
            Ok(Command::Settings {
                rounds: Some(RoundLimit::Limited(5)),
                genre: Some(GenreChoice::Id(GenreId(28))),
            })
        );
        assert_eq!(
            parse_command("/settings rounds=unbounded"),
            Ok(Command::Settings {
                rounds: Some(RoundLimit::Unbounded),
                genre: None,
            })
        );
        assert_eq!(
            parse_command("/settings genre=science_fiction"),
            Ok(Command::Settings {
                rounds: None,
                genre: Some(GenreChoice::Name("science fiction".into())),
            })
        );
        assert_eq!(
            parse_command("/settings genre=ANY"),
            Ok(Command::Settings {
                rounds: None,
                genre: Some(GenreChoice::Any),
            })
        );
    }

    #[test]
    fn settings_reject_garbage() {
        assert_eq!(parse_command("/settings"), Err(InputError::EmptySettings));
        assert_eq!(
            parse_command("/settings rounds=lots"),
            Err(InputError::InvalidSetting("rounds=lots".into()))
        );
        assert_eq!(
            parse_command("/settings speed=fast"),
            Err(InputError::InvalidSetting("speed=fast".into()))
        );
    }
}
