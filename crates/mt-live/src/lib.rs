//! Athletic Live heat data client.
//!
//! Heat-level timing data lives in per-event JSON documents on a public
//! blob store, one document per event, keyed by event ID and category:
//! `{base}/ind_heat_list/_doc/{id}` for individual events and
//! `{base}/rel_heat_list/_doc/{id}` for relays. Each document carries an
//! Elasticsearch-style `_source` object whose `it` (individual) or `rtn`
//! (relay) array holds one entry per swimmer or team, with `hn` (heat
//! number) and `s` (entry time string) fields.
//!
//! A fetch failure means the event has no heat data at all and is omitted
//! from any estimate; a document that decodes but has no usable entries
//! yields an empty heat sheet, which still schedules the event. Callers
//! rely on that distinction.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Semaphore;

use mt_core::{Event, EventCategory, EventId, HeatSheet};

/// Default request timeout for blob store calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Heat data client errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The configured base URL was unusable.
    #[error("invalid base URL: {reason}")]
    InvalidBaseUrl { reason: &'static str },

    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// HTTP request failed in transit.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The blob store answered with a non-success status.
    #[error("heat document request returned status {status}")]
    Status { status: reqwest::StatusCode },

    /// The response body was not a decodable heat document.
    #[error("invalid heat document: {0}")]
    InvalidDocument(String),

    /// The fetch task was cancelled or panicked before producing a result.
    #[error("heat fetch task failed to complete")]
    TaskFailed,
}

/// A fetched event's heat data.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatData {
    /// Usable times grouped by heat.
    pub sheet: HeatSheet,

    /// Entries dropped from the document (missing fields, unparseable
    /// times).
    pub skipped_times: usize,
}

/// Outcome of one event's heat fetch within a batch.
///
/// A document that decoded to zero entries is a success with an empty
/// sheet; only transport/decoding problems land in the error arm.
#[derive(Debug)]
pub struct FetchOutcome {
    pub event: Event,
    pub result: Result<HeatData, FetchError>,
}

/// Blob store client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across tasks. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client for the given blob store base URL.
    ///
    /// A trailing slash on the base URL is tolerated and stripped.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or not HTTP(S), or if
    /// the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();

        if base_url.is_empty() {
            return Err(FetchError::InvalidBaseUrl {
                reason: "base URL cannot be empty",
            });
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(FetchError::InvalidBaseUrl {
                reason: "base URL must start with http:// or https://",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self { http, base_url })
    }

    /// Fetches and decodes one event's heat document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the blob store answers with
    /// a non-success status, or the body is not a heat document. Callers
    /// must exclude the event from any estimate on error.
    pub async fn heat_data(
        &self,
        id: &EventId,
        category: EventCategory,
    ) -> Result<HeatData, FetchError> {
        let url = document_url(&self.base_url, id, category);
        tracing::debug!(%url, "fetching heat document");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let body = response.text().await?;
        let document: HeatDocument = serde_json::from_str(&body)
            .map_err(|err| FetchError::InvalidDocument(err.to_string()))?;

        Ok(sheet_from_document(&document, category))
    }

    /// Fetches heat data for every event in the list, with at most
    /// `max_concurrency` requests in flight at once.
    ///
    /// Returns exactly one outcome per input event, in input order, so
    /// callers can line results up with their own bookkeeping. Per-event
    /// failures are logged; they never abort the batch.
    pub async fn fetch_all(&self, events: Vec<Event>, max_concurrency: usize) -> Vec<FetchOutcome> {
        let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));

        let mut handles = Vec::with_capacity(events.len());
        for event in events {
            let client = self.clone();
            let semaphore = Arc::clone(&semaphore);
            // Kept outside the task so a lost task still yields an outcome
            let fallback = event.clone();
            handles.push((
                fallback,
                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .expect("semaphore is never closed");
                    let result = client.heat_data(&event.id, event.category).await;
                    (event, result)
                }),
            ));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (fallback, handle) in handles {
            let outcome = match handle.await {
                Ok((event, result)) => FetchOutcome { event, result },
                Err(join_error) => {
                    tracing::error!(%join_error, event = %fallback.id, "heat fetch task failed");
                    FetchOutcome {
                        event: fallback,
                        result: Err(FetchError::TaskFailed),
                    }
                }
            };
            if let Err(error) = &outcome.result {
                tracing::warn!(event = %outcome.event.id, %error, "no heat data; event excluded");
            }
            outcomes.push(outcome);
        }
        outcomes
    }
}

/// Path segment of the heat list for an event category.
const fn list_segment(category: EventCategory) -> &'static str {
    match category {
        EventCategory::Individual => "ind",
        EventCategory::Relay => "rel",
    }
}

fn document_url(base_url: &str, id: &EventId, category: EventCategory) -> String {
    format!("{base_url}/{}_heat_list/_doc/{id}", list_segment(category))
}

#[derive(Debug, Deserialize)]
struct HeatDocument {
    #[serde(rename = "_source", default)]
    source: Option<HeatSource>,
}

#[derive(Debug, Default, Deserialize)]
struct HeatSource {
    /// Individual entries.
    #[serde(default)]
    it: Vec<HeatEntry>,

    /// Relay team entries.
    #[serde(default)]
    rtn: Vec<HeatEntry>,
}

#[derive(Debug, Deserialize)]
struct HeatEntry {
    /// Heat number.
    #[serde(default)]
    hn: Option<u32>,

    /// Entry time string, e.g. `"1:02.34"`.
    #[serde(default)]
    s: Option<String>,
}

/// Builds a heat sheet from a decoded document, counting dropped entries.
fn sheet_from_document(document: &HeatDocument, category: EventCategory) -> HeatData {
    let Some(source) = &document.source else {
        return HeatData {
            sheet: HeatSheet::new(),
            skipped_times: 0,
        };
    };

    let entries = match category {
        EventCategory::Individual => &source.it,
        EventCategory::Relay => &source.rtn,
    };

    let mut sheet = HeatSheet::new();
    let mut skipped_times = 0;
    for entry in entries {
        match (entry.hn, entry.s.as_deref()) {
            (Some(number), Some(text)) => {
                if !sheet.push_raw(number, text) {
                    skipped_times += 1;
                }
            }
            _ => {
                tracing::debug!(?entry, "skipping entry with missing fields");
                skipped_times += 1;
            }
        }
    }

    HeatData {
        sheet,
        skipped_times,
    }
}
