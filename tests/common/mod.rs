//! Shared fixtures and in-memory fakes.
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use blyv::market::MarketData;
use blyv::models::candle::{Candle, ChartResponse};
use blyv::models::token::{TokenResponse, TokenSnapshot};
use blyv::narration::Narrator;
use blyv::session::{FailureKind, Message};
use blyv::{BlyvError, Result};

pub const TOKEN_JSON: &str = include_str!("../fixtures/token.json");
pub const CHART_JSON: &str = include_str!("../fixtures/chart.json");

/// Mint of the token in `token.json`.
pub const FIXTURE_MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

/// Wrapped SOL mint.
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

pub fn fixture_snapshot() -> TokenSnapshot {
    let response: TokenResponse =
        serde_json::from_str(TOKEN_JSON).expect("token fixture should parse");
    TokenSnapshot::from_response(FIXTURE_MINT, response).expect("token fixture has metadata")
}

pub fn fixture_candles() -> Vec<Candle> {
    let response: ChartResponse =
        serde_json::from_str(CHART_JSON).expect("chart fixture should parse");
    response.into_candles().expect("chart fixture has candles")
}

fn error_for(kind: FailureKind) -> BlyvError {
    match kind {
        FailureKind::NotFound => BlyvError::NotFound("scripted".to_string()),
        FailureKind::Network => BlyvError::Network("scripted".to_string()),
    }
}

/// Market data source that serves canned data and counts calls.
pub struct FakeMarket {
    data: Mutex<(TokenSnapshot, Vec<Candle>)>,
    token_failure: Mutex<Option<FailureKind>>,
    chart_failure: Mutex<Option<FailureKind>>,
    pub token_calls: AtomicUsize,
    pub chart_calls: AtomicUsize,
}

impl FakeMarket {
    pub fn new(snapshot: TokenSnapshot, candles: Vec<Candle>) -> Self {
        Self {
            data: Mutex::new((snapshot, candles)),
            token_failure: Mutex::new(None),
            chart_failure: Mutex::new(None),
            token_calls: AtomicUsize::new(0),
            chart_calls: AtomicUsize::new(0),
        }
    }

    pub fn from_fixtures() -> Self {
        Self::new(fixture_snapshot(), fixture_candles())
    }

    pub fn serve(&self, snapshot: TokenSnapshot, candles: Vec<Candle>) {
        *self.data.lock().unwrap() = (snapshot, candles);
    }

    pub fn fail_token(&self, kind: Option<FailureKind>) {
        *self.token_failure.lock().unwrap() = kind;
    }

    pub fn fail_chart(&self, kind: Option<FailureKind>) {
        *self.chart_failure.lock().unwrap() = kind;
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn chart_calls(&self) -> usize {
        self.chart_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketData for FakeMarket {
    async fn fetch_token(&self, _address: &str) -> Result<TokenSnapshot> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = *self.token_failure.lock().unwrap() {
            return Err(error_for(kind));
        }
        Ok(self.data.lock().unwrap().0.clone())
    }

    async fn fetch_candles(&self, _address: &str) -> Result<Vec<Candle>> {
        self.chart_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = *self.chart_failure.lock().unwrap() {
            return Err(error_for(kind));
        }
        Ok(self.data.lock().unwrap().1.clone())
    }
}

/// What a free-text call received.
#[derive(Debug, Clone)]
pub struct QuestionCall {
    pub question: String,
    pub context_symbol: Option<String>,
    pub history_len: usize,
}

/// Narrator that answers with fixed text and records its inputs.
#[derive(Default)]
pub struct FakeNarrator {
    pub summaries: AtomicUsize,
    pub questions: Mutex<Vec<QuestionCall>>,
}

pub const FAKE_SUMMARY: &str = "Narrated summary.";
pub const FAKE_ANSWER: &str = "Narrated answer.";

impl FakeNarrator {
    pub fn summaries(&self) -> usize {
        self.summaries.load(Ordering::SeqCst)
    }

    pub fn questions(&self) -> Vec<QuestionCall> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Narrator for FakeNarrator {
    async fn summarize_token(&self, _snapshot: &TokenSnapshot) -> String {
        self.summaries.fetch_add(1, Ordering::SeqCst);
        FAKE_SUMMARY.to_string()
    }

    async fn answer_free_text(
        &self,
        question: &str,
        context: Option<&TokenSnapshot>,
        history: &[Message],
    ) -> String {
        self.questions.lock().unwrap().push(QuestionCall {
            question: question.to_string(),
            context_symbol: context.map(|s| s.symbol.clone()),
            history_len: history.len(),
        });
        FAKE_ANSWER.to_string()
    }
}

/// Answers every connection on a local port with the same HTTP response and
/// returns the base URL, e.g. `http://127.0.0.1:41234`.
pub async fn serve_canned(status: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local listener");
    let addr = listener.local_addr().expect("listener address");
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            read_request(&mut stream).await;
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    format!("http://{addr}")
}

/// Reads headers and any `Content-Length` body so the client sees a full exchange.
async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + length {
            return;
        }
    }
}

/// HTTP client that ignores proxy settings, so requests reach the local server.
pub fn local_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("build test client")
}
