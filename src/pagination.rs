//! Query state and the infinite-scroll controller.
//!
//! Every issued request gets a monotonically increasing token. Only the
//! response carrying the latest token is applied; anything older is stale and
//! dropped on arrival. While a request is in flight, sentinel triggers are
//! ignored, so a query never has more than one page request outstanding.

use tracing::{debug, info};

use crate::api::{DEFAULT_QUERY, NewsQuery};

/// Handle for one issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub token: u64,
    pub query: NewsQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    Idle,
    Loading { token: u64 },
}

/// What [`Pager::complete`] decided about an arriving response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response belongs to the latest request and should be applied.
    Current,
    /// A newer request was issued since; drop the response.
    Stale,
}

/// Current page, last query and in-flight bookkeeping. Not persisted.
#[derive(Debug)]
pub struct Pager {
    page: u32,
    last_query: String,
    language: String,
    next_token: u64,
    state: PagerState,
}

impl Pager {
    pub fn new(language: &str) -> Self {
        Self {
            page: 1,
            last_query: DEFAULT_QUERY.to_string(),
            language: language.to_string(),
            next_token: 0,
            state: PagerState::Idle,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: &str) {
        self.language = language.to_string();
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PagerState::Loading { .. })
    }

    /// Start a fresh request for `query` at `page`. Supersedes anything in flight.
    pub fn begin(&mut self, query: &str, page: u32) -> Ticket {
        let query = NewsQuery::new(query, &self.language, page);
        self.last_query = query.query.clone();
        self.page = query.page;
        self.next_token += 1;
        let token = self.next_token;
        if let PagerState::Loading { token: superseded } = self.state {
            debug!(superseded, token, "New request supersedes in-flight one");
        }
        self.state = PagerState::Loading { token };
        debug!(token, query = %query.query, page = query.page, "Issued request");
        Ticket { token, query }
    }

    /// The sentinel came into view: request the next page of the last query.
    ///
    /// Returns `None` while a request is still outstanding.
    pub fn next_page(&mut self) -> Option<Ticket> {
        if let PagerState::Loading { token } = self.state {
            info!(token, "Sentinel triggered while loading; ignoring");
            return None;
        }
        let query = self.last_query.clone();
        Some(self.begin(&query, self.page + 1))
    }

    /// Record that the response for `ticket` arrived.
    pub fn complete(&mut self, ticket: &Ticket) -> Completion {
        match self.state {
            PagerState::Loading { token } if token == ticket.token => {
                self.state = PagerState::Idle;
                Completion::Current
            }
            _ => {
                debug!(token = ticket.token, "Discarding stale response");
                Completion::Stale
            }
        }
    }
}
