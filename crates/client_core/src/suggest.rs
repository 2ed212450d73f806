//! Autocomplete with a "latest request wins" guard.
//!
//! Every keystroke-level query gets a ticket with a fresh sequence number. Searches
//! may finish in any order; only the response for the newest ticket reaches the view.

use std::sync::Arc;

use shared::{domain::Suggestion, error::GameResult};
use tracing::{debug, warn};

use crate::provider::MovieProvider;

pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    query: String,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    /// Query too short; hide whatever is on screen.
    Clear,
    Search(SearchTicket),
}

#[derive(Debug)]
pub struct SuggestionTracker {
    latest: u64,
    min_query_chars: usize,
    limit: usize,
}

impl Default for SuggestionTracker {
    fn default() -> Self {
        Self::new(MIN_QUERY_CHARS, MAX_SUGGESTIONS)
    }
}

impl SuggestionTracker {
    pub fn new(min_query_chars: usize, limit: usize) -> Self {
        Self {
            latest: 0,
            min_query_chars,
            limit,
        }
    }

    /// Registers a new query. Any search still in flight becomes stale.
    pub fn begin(&mut self, raw_query: &str) -> SearchRequest {
        self.latest += 1;
        let query = raw_query.trim();
        if query.chars().count() < self.min_query_chars {
            return SearchRequest::Clear;
        }
        SearchRequest::Search(SearchTicket {
            seq: self.latest,
            query: query.to_string(),
        })
    }

    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        ticket.seq == self.latest
    }

    /// Returns the suggestions to display, or `None` if the response is stale.
    ///
    /// Search failures are not worth interrupting the player for; they show as an
    /// empty list.
    pub fn complete(
        &self,
        ticket: &SearchTicket,
        result: GameResult<Vec<Suggestion>>,
    ) -> Option<Vec<Suggestion>> {
        if !self.is_current(ticket) {
            debug!(
                seq = ticket.seq,
                latest = self.latest,
                "discarding stale search response"
            );
            return None;
        }

        match result {
            Ok(mut suggestions) => {
                suggestions.truncate(self.limit);
                Some(suggestions)
            }
            Err(err) => {
                warn!(query = %ticket.query, error = %err, "search failed");
                Some(Vec::new())
            }
        }
    }
}

/// Runs one search and hands the ticket back with the outcome.
pub async fn run_search(
    provider: Arc<dyn MovieProvider>,
    ticket: SearchTicket,
) -> (SearchTicket, GameResult<Vec<Suggestion>>) {
    let result = provider.search(&ticket.query).await;
    (ticket, result)
}

#[cfg(test)]
#[path = "tests/suggest_tests.rs"]
mod tests;
