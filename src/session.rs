//! Conversation state machine.
//!
//! [`Conversation`] owns the message log, the displayed token view and the
//! submission state. It performs no I/O: [`Conversation::submit`] hands out a
//! [`Submission`] ticket, a [`Workflow`] turns the ticket into an
//! [`Outcome`], and [`Conversation::complete`] applies it. Only one
//! submission may be in flight; the state machine itself rejects overlaps.
//!
//! ```text
//! Idle -> Validating -> FetchingToken -> FetchingChart -> Summarizing -> Displaying -> Idle
//!                  \--(free text)--------------------------> Summarizing -> Displaying -> Idle
//! any step --error--> Failed -> Idle
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::BlyvError;
use crate::address;
use crate::market::MarketData;
use crate::models::candle::Candle;
use crate::models::token::TokenSnapshot;
use crate::narration::Narrator;

/// First system message of every session.
pub const WELCOME_MESSAGE: &str = "Welcome to BLYV Terminal!\n\
Paste a Solana token address to see live market data, a price chart and an AI summary, \
or ask any question about tokens and the Solana ecosystem.";

/// Appended when a lookup finds nothing.
pub const NOT_FOUND_MESSAGE: &str = "No results found! Check the token and try again...";

/// Appended when a service could not be reached.
pub const NETWORK_ERROR_MESSAGE: &str = "Something went wrong! Please try again...";

/// Number of prior messages forwarded to the narrator as chat history.
const HISTORY_WINDOW: usize = 6;

/// Author of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    System,
}

/// One immutable entry of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub text: String,
}

/// Where the current submission is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    FetchingToken,
    FetchingChart,
    Summarizing,
    Displaying,
    Failed,
}

impl SubmissionState {
    /// Short label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "Ready",
            SubmissionState::Validating => "Validating...",
            SubmissionState::FetchingToken => "Fetching token...",
            SubmissionState::FetchingChart => "Fetching chart...",
            SubmissionState::Summarizing => "Summarizing...",
            SubmissionState::Displaying => "Displaying",
            SubmissionState::Failed => "Failed",
        }
    }

    /// Whether the state belongs to a running submission.
    pub fn is_busy(&self) -> bool {
        !matches!(
            self,
            SubmissionState::Idle | SubmissionState::Displaying | SubmissionState::Failed
        )
    }
}

/// Token data and its chart; always replaced as one value.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenView {
    pub snapshot: TokenSnapshot,
    pub candles: Vec<Candle>,
}

/// Ticket for an accepted submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: u64,
    /// Trimmed user input.
    pub query: String,
    /// Token on screen when the submission was made.
    pub context: Option<TokenSnapshot>,
    /// Recent messages, oldest first, excluding this submission's own.
    pub history: Vec<Message>,
}

/// Why a submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Network,
}

impl FailureKind {
    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::NotFound => NOT_FOUND_MESSAGE,
            FailureKind::Network => NETWORK_ERROR_MESSAGE,
        }
    }
}

impl From<&BlyvError> for FailureKind {
    fn from(err: &BlyvError) -> Self {
        match err {
            BlyvError::NotFound(_) | BlyvError::MalformedResponse(_) | BlyvError::Json(_) => {
                FailureKind::NotFound
            }
            BlyvError::Network(_) | BlyvError::Config(_) | BlyvError::Io(_) => {
                FailureKind::Network
            }
        }
    }
}

/// Result of driving a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Token path succeeded.
    Token { reply: String, view: TokenView },
    /// Free-text path answered.
    Answer { reply: String },
    Failed(FailureKind),
}

/// Session state: message log, displayed token view, submission state.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
    state: SubmissionState,
    in_flight: Option<u64>,
    view: Option<TokenView>,
    last_exit: Option<SubmissionState>,
}

impl Conversation {
    /// Creates a session holding only the welcome message.
    pub fn new() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            next_id: 1,
            state: SubmissionState::Idle,
            in_flight: None,
            view: None,
            last_exit: None,
        };
        conversation.push(Role::System, WELCOME_MESSAGE.to_string());
        conversation
    }

    fn push(&mut self, role: Role, text: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message { id, role, text });
        id
    }

    /// Accepts a submission.
    ///
    /// Returns `None` without touching any state when `input` is blank or
    /// another submission is still in flight. Otherwise appends the user
    /// message, enters [`SubmissionState::Validating`] and returns the ticket
    /// to hand to [`Workflow::execute`].
    pub fn submit(&mut self, input: &str) -> Option<Submission> {
        let query = input.trim();
        if query.is_empty() {
            return None;
        }
        if self.in_flight.is_some() {
            warn!(state = ?self.state, "submission ignored while another is in flight");
            return None;
        }

        let start = self.messages.len().saturating_sub(HISTORY_WINDOW);
        let history = self.messages[start..]
            .iter()
            .filter(|m| m.text != WELCOME_MESSAGE)
            .cloned()
            .collect();

        let id = self.push(Role::User, query.to_string());
        self.in_flight = Some(id);
        self.state = SubmissionState::Validating;
        debug!(id, "submission accepted");

        Some(Submission {
            id,
            query: query.to_string(),
            context: self.view.as_ref().map(|v| v.snapshot.clone()),
            history,
        })
    }

    /// Records progress of the in-flight submission; stale ids are ignored.
    pub fn advance(&mut self, id: u64, state: SubmissionState) {
        if self.in_flight == Some(id) && state.is_busy() {
            debug!(id, ?state, "submission advanced");
            self.state = state;
        }
    }

    /// Applies the outcome of the in-flight submission.
    ///
    /// Appends exactly one system message. On the token path the snapshot and
    /// candles are replaced together. Always returns to
    /// [`SubmissionState::Idle`]. Outcomes for stale ids are dropped.
    pub fn complete(&mut self, id: u64, outcome: Outcome) {
        if self.in_flight != Some(id) {
            warn!(id, "dropping outcome of a stale submission");
            return;
        }

        let (exit, reply) = match outcome {
            Outcome::Token { reply, view } => {
                info!(
                    id,
                    symbol = %view.snapshot.symbol,
                    candles = view.candles.len(),
                    "token view replaced"
                );
                self.view = Some(view);
                (SubmissionState::Displaying, reply)
            }
            Outcome::Answer { reply } => (SubmissionState::Displaying, reply),
            Outcome::Failed(kind) => {
                info!(id, ?kind, "submission failed");
                (SubmissionState::Failed, kind.message().to_string())
            }
        };

        self.state = exit;
        self.push(Role::System, reply);
        self.last_exit = Some(exit);
        self.in_flight = None;
        self.state = SubmissionState::Idle;
    }

    /// Submits `input`, drives it through `workflow` and applies the outcome.
    ///
    /// Returns `false` when the submission was rejected.
    pub async fn run(&mut self, input: &str, workflow: &Workflow) -> bool {
        let Some(submission) = self.submit(input) else {
            return false;
        };
        let mut trail = Vec::new();
        let outcome = workflow
            .execute(&submission, |state| trail.push(state))
            .await;
        for state in trail {
            self.advance(submission.id, state);
        }
        self.complete(submission.id, outcome);
        true
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Whether a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn view(&self) -> Option<&TokenView> {
        self.view.as_ref()
    }

    pub fn snapshot(&self) -> Option<&TokenSnapshot> {
        self.view.as_ref().map(|v| &v.snapshot)
    }

    pub fn candles(&self) -> &[Candle] {
        self.view.as_ref().map_or(&[], |v| v.candles.as_slice())
    }

    /// How the last finished submission ended (`Displaying` or `Failed`).
    pub fn last_exit(&self) -> Option<SubmissionState> {
        self.last_exit
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a submission through classification, lookups and narration.
#[derive(Clone)]
pub struct Workflow {
    market: Arc<dyn MarketData>,
    narrator: Arc<dyn Narrator>,
    chart_delay: Duration,
}

impl Workflow {
    pub fn new(
        market: Arc<dyn MarketData>,
        narrator: Arc<dyn Narrator>,
        chart_delay: Duration,
    ) -> Self {
        Self {
            market,
            narrator,
            chart_delay,
        }
    }

    /// Runs the submission to an [`Outcome`], reporting each state entered.
    ///
    /// Never fails: lookup errors become [`Outcome::Failed`], narration
    /// errors are absorbed by the narrator.
    pub async fn execute<F>(&self, submission: &Submission, mut progress: F) -> Outcome
    where
        F: FnMut(SubmissionState) + Send,
    {
        let query = submission.query.as_str();

        if !address::classify(query).is_address {
            debug!(id = submission.id, "free-text submission");
            progress(SubmissionState::Summarizing);
            let reply = self
                .narrator
                .answer_free_text(query, submission.context.as_ref(), &submission.history)
                .await;
            return Outcome::Answer { reply };
        }

        progress(SubmissionState::FetchingToken);
        let snapshot = match self.market.fetch_token(query).await {
            Ok(snapshot) => snapshot,
            Err(e) => return self.failed(submission.id, "token", &e),
        };

        if !self.chart_delay.is_zero() {
            tokio::time::sleep(self.chart_delay).await;
        }

        progress(SubmissionState::FetchingChart);
        let candles = match self.market.fetch_candles(query).await {
            Ok(candles) => candles,
            Err(e) => return self.failed(submission.id, "chart", &e),
        };

        progress(SubmissionState::Summarizing);
        let reply = self.narrator.summarize_token(&snapshot).await;

        Outcome::Token {
            reply,
            view: TokenView { snapshot, candles },
        }
    }

    fn failed(&self, id: u64, step: &str, err: &BlyvError) -> Outcome {
        warn!(id, step, error = %err, "lookup failed");
        Outcome::Failed(FailureKind::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(symbol: &str) -> TokenView {
        TokenView {
            snapshot: TokenSnapshot {
                address: format!("{symbol}Mint"),
                name: symbol.to_string(),
                symbol: symbol.to_string(),
                decimals: 6,
                image_url: None,
                price_usd: None,
                market_cap_usd: None,
                volume_24h_usd: None,
                liquidity_usd: None,
                price_change_24h_pct: None,
                transactions: None,
                creator_address: None,
                risk: Default::default(),
                holder_count: None,
                social_links: Default::default(),
            },
            candles: vec![],
        }
    }

    #[test]
    fn starts_idle_with_welcome() {
        let conversation = Conversation::new();
        assert_eq!(conversation.state(), SubmissionState::Idle);
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].role, Role::System);
        assert!(conversation.view().is_none());
        assert!(conversation.candles().is_empty());
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut conversation = Conversation::new();
        for input in ["", "   ", "\t\n"] {
            assert!(conversation.submit(input).is_none());
        }
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.state(), SubmissionState::Idle);
    }

    #[test]
    fn submit_appends_trimmed_user_message() {
        let mut conversation = Conversation::new();
        let submission = conversation.submit("  gm  ").unwrap();
        assert_eq!(submission.query, "gm");
        assert_eq!(conversation.state(), SubmissionState::Validating);
        let last = conversation.messages().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.text, "gm");
        assert_eq!(last.id, submission.id);
        assert!(submission.history.is_empty());
    }

    #[test]
    fn overlapping_submission_is_rejected() {
        let mut conversation = Conversation::new();
        let first = conversation.submit("first").unwrap();
        assert!(conversation.submit("second").is_none());
        assert_eq!(conversation.messages().len(), 2);

        conversation.complete(first.id, Outcome::Answer { reply: "ok".into() });
        assert!(conversation.submit("third").is_some());
    }

    #[test]
    fn ids_are_monotonic() {
        let mut conversation = Conversation::new();
        let a = conversation.submit("a").unwrap();
        conversation.complete(a.id, Outcome::Answer { reply: "1".into() });
        let b = conversation.submit("b").unwrap();
        conversation.complete(b.id, Outcome::Answer { reply: "2".into() });
        let ids: Vec<u64> = conversation.messages().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn advance_ignores_stale_ids_and_terminal_states() {
        let mut conversation = Conversation::new();
        let submission = conversation.submit("x").unwrap();
        conversation.advance(submission.id + 100, SubmissionState::FetchingChart);
        assert_eq!(conversation.state(), SubmissionState::Validating);
        conversation.advance(submission.id, SubmissionState::Displaying);
        assert_eq!(conversation.state(), SubmissionState::Validating);
        conversation.advance(submission.id, SubmissionState::FetchingToken);
        assert_eq!(conversation.state(), SubmissionState::FetchingToken);
    }

    #[test]
    fn token_outcome_replaces_view_and_returns_idle() {
        let mut conversation = Conversation::new();
        let submission = conversation.submit("addr").unwrap();
        conversation.complete(
            submission.id,
            Outcome::Token {
                reply: "summary".into(),
                view: view("FOO"),
            },
        );
        assert_eq!(conversation.snapshot().unwrap().symbol, "FOO");
        assert_eq!(conversation.state(), SubmissionState::Idle);
        assert_eq!(conversation.last_exit(), Some(SubmissionState::Displaying));
        assert!(!conversation.is_busy());
        assert_eq!(conversation.messages().last().unwrap().text, "summary");
    }

    #[test]
    fn failure_keeps_previous_view() {
        let mut conversation = Conversation::new();
        let first = conversation.submit("a").unwrap();
        conversation.complete(
            first.id,
            Outcome::Token {
                reply: "ok".into(),
                view: view("FOO"),
            },
        );
        let before = conversation.view().cloned();

        let second = conversation.submit("b").unwrap();
        assert_eq!(second.context.as_ref().unwrap().symbol, "FOO");
        let count = conversation.messages().len();
        conversation.complete(second.id, Outcome::Failed(FailureKind::NotFound));

        assert_eq!(conversation.messages().len(), count + 1);
        assert_eq!(conversation.messages().last().unwrap().text, NOT_FOUND_MESSAGE);
        assert_eq!(conversation.view().cloned(), before);
        assert_eq!(conversation.last_exit(), Some(SubmissionState::Failed));
        assert_eq!(conversation.state(), SubmissionState::Idle);
    }

    #[test]
    fn stale_outcome_is_dropped() {
        let mut conversation = Conversation::new();
        let submission = conversation.submit("a").unwrap();
        conversation.complete(submission.id + 1, Outcome::Answer { reply: "late".into() });
        assert!(conversation.is_busy());
        assert_eq!(conversation.messages().len(), 2);
    }

    #[test]
    fn history_is_bounded_and_skips_welcome() {
        let mut conversation = Conversation::new();
        for i in 0..5 {
            let s = conversation.submit(&format!("q{i}")).unwrap();
            conversation.complete(s.id, Outcome::Answer { reply: format!("a{i}") });
        }
        let submission = conversation.submit("last").unwrap();
        assert_eq!(submission.history.len(), HISTORY_WINDOW);
        assert_eq!(submission.history.last().unwrap().text, "a4");
        assert!(submission.history.iter().all(|m| m.text != WELCOME_MESSAGE));
    }

    #[test]
    fn failure_kind_from_errors() {
        assert_eq!(
            FailureKind::from(&BlyvError::NotFound("x".into())),
            FailureKind::NotFound
        );
        assert_eq!(
            FailureKind::from(&BlyvError::MalformedResponse("x".into())),
            FailureKind::NotFound
        );
        assert_eq!(
            FailureKind::from(&BlyvError::Network("x".into())),
            FailureKind::Network
        );
        assert_eq!(FailureKind::Network.message(), NETWORK_ERROR_MESSAGE);
    }
}
