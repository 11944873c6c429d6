//! Leaderboard client
//!
//! The simulations never wait on the network. Requests run as spawned tasks
//! and report back over a channel; the host drains replies between ticks.
//! Any failure, including a rejection by the service, only changes the status
//! line. Previously fetched entries stay in place.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

pub const STATUS_UNAVAILABLE: &str = "Leaderboard unavailable.";
pub const STATUS_SUBMITTED: &str = "Score submitted!";
pub const STATUS_SUBMIT_FAILED: &str = "Could not submit score right now.";

/// One row of the board, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("leaderboard rejected request: HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("leaderboard request ended without a reply")]
    Aborted,
}

/// Remote score board operations
#[async_trait]
pub trait LeaderboardApi: Send + Sync {
    async fn fetch_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;

    /// Submit a score; the service answers with the refreshed board
    async fn submit_score(&self, value: f64) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
}

#[derive(Debug, Default, Deserialize)]
struct EntriesBody {
    #[serde(default)]
    entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct ScoreBody {
    score: f64,
}

/// JSON-over-HTTP board: `GET url` reads, `POST url {"score": n}` submits
#[derive(Debug, Clone)]
pub struct HttpLeaderboard {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpLeaderboard {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), url, timeout)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LeaderboardApi for HttpLeaderboard {
    async fn fetch_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let resp = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await?;
        let mut entries = read_entries(resp).await?;
        entries.truncate(n);
        Ok(entries)
    }

    async fn submit_score(&self, value: f64) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&ScoreBody { score: value })
            .timeout(self.timeout)
            .send()
            .await?;
        read_entries(resp).await
    }
}

async fn read_entries(resp: reqwest::Response) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(LeaderboardError::Rejected {
            status: status.as_u16(),
            message: rejection_message(&body, status.canonical_reason()),
        });
    }
    let body: EntriesBody = resp.json().await?;
    Ok(body.entries)
}

/// `{"error": "..."}` if the body has one, else the status reason
fn rejection_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| reason.unwrap_or("unknown error").to_string())
}

/// Which call a reply belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Fetch,
    Submit,
}

/// Outcome of a finished request, as seen by the host
#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardEvent {
    Refreshed { count: usize },
    Submitted { count: usize },
    Failed { request: Request, status: &'static str },
}

struct Reply {
    request: Request,
    result: Result<Vec<LeaderboardEntry>, LeaderboardError>,
}

/// Owned by a request task. If the task panics or is dropped before it
/// answers, the slot reports `Aborted` so the in-flight count still settles.
struct ReplySlot {
    request: Request,
    tx: Option<mpsc::UnboundedSender<Reply>>,
}

impl ReplySlot {
    fn new(request: Request, tx: mpsc::UnboundedSender<Reply>) -> Self {
        Self {
            request,
            tx: Some(tx),
        }
    }

    fn send(mut self, result: Result<Vec<LeaderboardEntry>, LeaderboardError>) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Reply {
                request: self.request,
                result,
            });
        }
    }
}

impl Drop for ReplySlot {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Reply {
                request: self.request,
                result: Err(LeaderboardError::Aborted),
            });
        }
    }
}

/// Fire-and-forget front end over a `LeaderboardApi`.
///
/// Requests spawn onto the current tokio runtime, so they must be issued from
/// within one.
pub struct Leaderboard<A: LeaderboardApi + 'static> {
    api: Arc<A>,
    top_n: usize,
    tx: mpsc::UnboundedSender<Reply>,
    rx: mpsc::UnboundedReceiver<Reply>,
    entries: Vec<LeaderboardEntry>,
    status: Option<&'static str>,
    in_flight: usize,
    submitting: bool,
}

impl Leaderboard<HttpLeaderboard> {
    pub fn http(url: impl Into<String>, top_n: usize, timeout: Duration) -> Self {
        Self::new(HttpLeaderboard::new(url, timeout), top_n)
    }
}

impl<A: LeaderboardApi + 'static> Leaderboard<A> {
    pub fn new(api: A, top_n: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api: Arc::new(api),
            top_n,
            tx,
            rx,
            entries: Vec::new(),
            status: None,
            in_flight: 0,
            submitting: false,
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn status(&self) -> Option<&'static str> {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn request_top(&mut self) {
        let api = Arc::clone(&self.api);
        let slot = ReplySlot::new(Request::Fetch, self.tx.clone());
        let n = self.top_n;
        self.in_flight += 1;
        tokio::spawn(async move {
            slot.send(api.fetch_top(n).await);
        });
    }

    /// Returns false (and sends nothing) while another submission is pending
    pub fn request_submit(&mut self, value: f64) -> bool {
        if self.submitting {
            return false;
        }
        let api = Arc::clone(&self.api);
        let slot = ReplySlot::new(Request::Submit, self.tx.clone());
        self.submitting = true;
        self.in_flight += 1;
        tokio::spawn(async move {
            slot.send(api.submit_score(value).await);
        });
        true
    }

    /// Apply every reply that has already arrived, without waiting
    pub fn poll(&mut self) -> Vec<LeaderboardEvent> {
        let mut events = Vec::new();
        while let Ok(reply) = self.rx.try_recv() {
            events.push(self.apply(reply));
        }
        events
    }

    /// Wait for the next reply; None when nothing is in flight
    pub async fn next_event(&mut self) -> Option<LeaderboardEvent> {
        if self.in_flight == 0 {
            return None;
        }
        let reply = self.rx.recv().await?;
        Some(self.apply(reply))
    }

    fn apply(&mut self, reply: Reply) -> LeaderboardEvent {
        self.in_flight = self.in_flight.saturating_sub(1);
        if reply.request == Request::Submit {
            self.submitting = false;
        }

        match (reply.request, reply.result) {
            (Request::Fetch, Ok(entries)) => {
                self.entries = entries;
                LeaderboardEvent::Refreshed {
                    count: self.entries.len(),
                }
            }
            (Request::Submit, Ok(entries)) => {
                self.entries = entries;
                self.status = Some(STATUS_SUBMITTED);
                LeaderboardEvent::Submitted {
                    count: self.entries.len(),
                }
            }
            (request, Err(err)) => {
                log::warn!("Leaderboard {:?} failed: {}", request, err);
                let status = match request {
                    Request::Fetch => STATUS_UNAVAILABLE,
                    Request::Submit => STATUS_SUBMIT_FAILED,
                };
                self.status = Some(status);
                LeaderboardEvent::Failed { request, status }
            }
        }
    }
}
