//! Search flow: query text in, rendered result images out.
//!
//! Each call issues a single `GET /search` and renders the outcome into a [`SearchView`].
//! Calls are tagged with a sequence number; when several searches overlap on the same
//! [`SearchFlow`], only the most recently started one may touch the view.

use crate::api::PhotoApi;
use crate::models::SearchQuery;
use crate::view::{ImageElement, SearchView};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub const NOT_FOUND_MESSAGE: &str = "Sorry could not find the image. Try again!";
pub const RESULTS_MESSAGE: &str = "Images returned are:";
pub const SEARCH_ERROR_MESSAGE: &str = "An error occurred. Please try again later.";

/// What a search did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results replaced the previously rendered images
    Found { count: usize },
    /// The search succeeded with no results
    NotFound,
    /// The request failed; the generic error message is shown
    Failed,
    /// A newer search started before this one resolved; the view was left alone
    Stale,
}

pub struct SearchFlow<A> {
    api: Arc<A>,
    storage_base: String,
    sequence: AtomicU64,
}

impl<A: PhotoApi> SearchFlow<A> {
    pub fn new(api: Arc<A>, storage_base: impl Into<String>) -> Self {
        Self {
            api,
            storage_base: storage_base.into(),
            sequence: AtomicU64::new(0),
        }
    }

    #[tracing::instrument(skip(self, view), fields(ticket = tracing::field::Empty))]
    pub async fn run<V: SearchView + ?Sized>(&self, view: &V, query: &str) -> SearchOutcome {
        let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::Span::current().record("ticket", ticket);

        let result = self.api.search_get(&SearchQuery::new(query)).await;

        if self.sequence.load(Ordering::SeqCst) != ticket {
            tracing::debug!(ticket, "Discarding stale search response");
            return SearchOutcome::Stale;
        }

        let outcome = match result {
            Ok(response) if response.data.is_empty() => {
                view.show_message(NOT_FOUND_MESSAGE);
                SearchOutcome::NotFound
            }
            Ok(response) => {
                view.clear_images();
                view.show_message(RESULTS_MESSAGE);
                for key in &response.data.keys {
                    view.append_image(ImageElement::for_key(&self.storage_base, key));
                }
                SearchOutcome::Found {
                    count: response.data.len(),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Search failed");
                view.show_message(SEARCH_ERROR_MESSAGE);
                SearchOutcome::Failed
            }
        };

        view.clear_query();
        outcome
    }
}
