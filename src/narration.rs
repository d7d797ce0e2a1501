//! Natural-language narration of token data and free-text answers.
//!
//! Interpretive labels (risk level, sniper/insider warning, holder spread,
//! risk factors, socials) are derived here and handed to the model as
//! context; the model only phrases them. Narration never fails from the
//! caller's point of view: any upstream problem yields [`FALLBACK_REPLY`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::format::{format_currency, format_percent};
use crate::models::chat::{ChatMessage, ChatRequest, ChatResponse, ChatRole};
use crate::models::token::TokenSnapshot;
use crate::session::{Message, Role};
use crate::{BlyvError, Result};

/// Shown whenever the language model cannot produce an answer.
pub const FALLBACK_REPLY: &str = "Sorry, I failed to get a response. Please try again...";

/// Fixed instruction that keeps the assistant on topic.
pub const SYSTEM_PROMPT: &str = "You are BLYV, the assistant of a Solana token terminal. \
Only discuss cryptocurrency, blockchain and the Solana ecosystem; politely decline anything else. \
Be concise and plain-spoken, use short paragraphs, and never give financial advice: remind the \
user to do their own research. When token data is provided, rely on it and on the supplied \
labels instead of guessing.";

/// Reply of the template narrator to free-text questions.
pub const TEMPLATE_FREE_TEXT_REPLY: &str = "Narration is not configured (set LLM_API_KEY). \
Paste a Solana token address to look it up.";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 600;

/// Produces the system replies of the terminal.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Narrates a freshly fetched token snapshot.
    async fn summarize_token(&self, snapshot: &TokenSnapshot) -> String;

    /// Answers a free-text question, optionally about the token on screen.
    async fn answer_free_text(
        &self,
        question: &str,
        context: Option<&TokenSnapshot>,
        history: &[Message],
    ) -> String;
}

// ---------------------------------------------------------------------------
// Derived labels
// ---------------------------------------------------------------------------

/// Maps a provider risk score (0-10) to a word.
pub fn risk_label(score: Option<Decimal>) -> &'static str {
    match score {
        None => "unknown",
        Some(s) if s <= Decimal::from(3) => "low",
        Some(s) if s <= Decimal::from(6) => "moderate",
        Some(_) => "high",
    }
}

/// Phrase describing sniper and insider activity.
pub fn sniper_label(snipers: Option<u64>, insiders: Option<u64>) -> &'static str {
    if snipers.unwrap_or(0) == 0 && insiders.unwrap_or(0) == 0 {
        "no snipers or insiders were detected, which is reassuring"
    } else {
        "snipers or insiders were detected, so be cautious"
    }
}

/// Phrase describing how widely the supply is held.
pub fn holder_label(holders: Option<u64>) -> &'static str {
    match holders {
        Some(h) if h > 50 => "fairly well distributed",
        _ => "not widely distributed",
    }
}

/// Sentence listing the provider's risk findings.
pub fn risk_factors_sentence(risks: &[String]) -> String {
    if risks.is_empty() {
        "No major risks were flagged.".to_string()
    } else {
        format!("Flagged risks: {}.", risks.join("; "))
    }
}

/// Sentence listing social links as `platform: url`.
pub fn socials_sentence<'a>(links: impl IntoIterator<Item = (&'a String, &'a String)>) -> String {
    let pairs: Vec<String> = links
        .into_iter()
        .map(|(platform, url)| format!("{platform}: {url}"))
        .collect();
    if pairs.is_empty() {
        "No social links are listed.".to_string()
    } else {
        format!("Socials: {}.", pairs.join(", "))
    }
}

/// Labels handed to the narrator alongside the raw snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenLabels {
    pub risk_level: &'static str,
    pub sniper_insider: &'static str,
    pub holder_distribution: &'static str,
    pub risk_factors: String,
    pub socials: String,
}

impl TokenLabels {
    pub fn derive(snapshot: &TokenSnapshot) -> Self {
        Self {
            risk_level: risk_label(snapshot.risk.score),
            sniper_insider: sniper_label(snapshot.risk.snipers, snapshot.risk.insiders),
            holder_distribution: holder_label(snapshot.holder_count),
            risk_factors: risk_factors_sentence(&snapshot.risk.risks),
            socials: socials_sentence(&snapshot.social_links),
        }
    }
}

/// Builds the user turn that asks the model to summarize a token.
pub fn summary_prompt(snapshot: &TokenSnapshot) -> Result<String> {
    let labels = TokenLabels::derive(snapshot);
    let data = serde_json::to_string_pretty(snapshot)?;
    Ok(format!(
        "Summarize this Solana token for a trader in a few short paragraphs.\n\
         Token data (JSON):\n{data}\n\n\
         Interpretation (use these, do not recompute them):\n\
         - Risk level: {}\n\
         - Snipers/insiders: {}\n\
         - Holders: {}\n\
         - {}\n\
         - {}",
        labels.risk_level,
        labels.sniper_insider,
        labels.holder_distribution,
        labels.risk_factors,
        labels.socials,
    ))
}

/// Builds the user turn for a free-text question.
pub fn question_prompt(question: &str, context: Option<&TokenSnapshot>) -> Result<String> {
    match context {
        None => Ok(question.trim().to_string()),
        Some(snapshot) => Ok(format!(
            "Token currently on screen (JSON):\n{}\n\nQuestion: {}",
            serde_json::to_string(snapshot)?,
            question.trim()
        )),
    }
}

// ---------------------------------------------------------------------------
// Language model narrator
// ---------------------------------------------------------------------------

/// Narrator backed by an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatNarrator {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl ChatNarrator {
    /// Creates a narrator; the key must be non-blank.
    pub fn new(client: Client, config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| BlyvError::Config("LLM API key cannot be empty".to_string()))?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Assembles the chat request: system rules, prior turns, then `prompt`.
    pub fn build_request(&self, history: &[Message], prompt: String) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::new(ChatRole::System, SYSTEM_PROMPT));
        messages.extend(history.iter().map(|m| {
            let role = match m.role {
                Role::User => ChatRole::User,
                Role::System => ChatRole::Assistant,
            };
            ChatMessage::new(role, m.text.clone())
        }));
        messages.push(ChatMessage::new(ChatRole::User, prompt));

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
        }
    }

    async fn complete(&self, request: ChatRequest) -> Result<String> {
        debug!(model = %request.model, turns = request.messages.len(), "chat completion");
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BlyvError::from_transport("chat", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlyvError::Network(format!(
                "chat: HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| BlyvError::MalformedResponse(format!("chat: {e}")))?;
        body.first_text()
            .map(String::from)
            .ok_or_else(|| BlyvError::MalformedResponse("chat: no choices".to_string()))
    }

    async fn complete_or_fallback(&self, history: &[Message], prompt: Result<String>) -> String {
        let result = match prompt {
            Ok(prompt) => self.complete(self.build_request(history, prompt)).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            warn!(error = %e, "narration failed, using fallback");
            FALLBACK_REPLY.to_string()
        })
    }
}

#[async_trait]
impl Narrator for ChatNarrator {
    async fn summarize_token(&self, snapshot: &TokenSnapshot) -> String {
        self.complete_or_fallback(&[], summary_prompt(snapshot)).await
    }

    async fn answer_free_text(
        &self,
        question: &str,
        context: Option<&TokenSnapshot>,
        history: &[Message],
    ) -> String {
        self.complete_or_fallback(history, question_prompt(question, context))
            .await
    }
}

// ---------------------------------------------------------------------------
// Template narrator
// ---------------------------------------------------------------------------

/// Narrator used when no language model is configured.
///
/// Summaries are assembled from the same labels the model would receive.
#[derive(Debug, Clone, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    pub fn summary(snapshot: &TokenSnapshot) -> String {
        let labels = TokenLabels::derive(snapshot);
        format!(
            "Alright, let's look at {address}. This is {name} ({symbol}).\n\
             Here's the lowdown:\n\
             Price: {price}\n\
             Market Cap: {market_cap}\n\
             24h Volume: {volume}\n\
             24h Change: {change}\n\
             Risk looks {risk}; {snipers}. Holders are {holders}.\n\
             {risks}\n\
             {socials}\n\
             Do your own research, don't just ape in.",
            address = snapshot.address,
            name = snapshot.name,
            symbol = snapshot.symbol,
            price = format_currency(snapshot.price_usd, 8),
            market_cap = format_currency(snapshot.market_cap_usd, 2),
            volume = format_currency(snapshot.volume_24h_usd, 2),
            change = format_percent(snapshot.price_change_24h_pct),
            risk = labels.risk_level,
            snipers = labels.sniper_insider,
            holders = labels.holder_distribution,
            risks = labels.risk_factors,
            socials = labels.socials,
        )
    }
}

#[async_trait]
impl Narrator for TemplateNarrator {
    async fn summarize_token(&self, snapshot: &TokenSnapshot) -> String {
        Self::summary(snapshot)
    }

    async fn answer_free_text(
        &self,
        _question: &str,
        _context: Option<&TokenSnapshot>,
        _history: &[Message],
    ) -> String {
        TEMPLATE_FREE_TEXT_REPLY.to_string()
    }
}

/// Builds the narrator for `config`: the chat model when a key is present,
/// otherwise the template.
pub fn narrator_from_config(
    config: &LlmConfig,
    timeout: Duration,
) -> Result<std::sync::Arc<dyn Narrator>> {
    match config.api_key {
        Some(_) => {
            let client = crate::market::build_http_client(timeout)?;
            Ok(std::sync::Arc::new(ChatNarrator::new(client, config)?))
        }
        None => {
            warn!("LLM_API_KEY not set, narrating with the built-in template");
            Ok(std::sync::Arc::new(TemplateNarrator))
        }
    }
}
