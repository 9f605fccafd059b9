//! AI legal assistant.
//!
//! [`Assistant`] keeps the chat transcript and builds the prompt; the model
//! call itself goes through the [`Advisor`] trait. Provider failures never
//! reach the operator: they become a fixed fallback reply.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::AssistantConfig;
use crate::error::{Error, Result};
use crate::record::ViolationRecord;
use crate::stats::per_category;

/// Opening message of every transcript.
pub const GREETING: &str = "Siap! Saya adalah AI Asisten Hukum Brigif 4/DR. Ada yang bisa saya \
bantu terkait analisis data pelanggaran atau konsultasi aturan militer?";

/// Reply used when the provider answers with no text.
pub const EMPTY_REPLY_FALLBACK: &str =
    "Mohon maaf, terjadi gangguan pada sistem analisis AI saya.";

/// Reply used when the provider cannot be reached.
pub const CONNECTION_FALLBACK: &str =
    "Gagal menghubungkan ke server pusat AI. Pastikan koneksi internet stabil.";

const PREAMBLE: &str = "Anda adalah AI Asisten Hukum untuk Brigade Infanteri 4/Dewa Ratna \
(Brigif 4/DR) Kodam IV/Diponegoro.
Tugas Anda:
1. Menganalisis data pelanggaran hukum di satuan.
2. Memberikan saran berdasarkan KUHP Militer (KUHPM) atau Peraturan Disiplin Militer (PDM).
3. Menjawab pertanyaan seputar prosedur hukum di lingkungan TNI AD.";

const STYLE_INSTRUCTION: &str = "Berikan jawaban yang profesional, tegas (ala militer), namun \
tetap membantu dan edukatif. Jika berkaitan dengan hukuman, tekankan pada upaya pembinaan dan \
pencegahan.";

/// A text-generation provider.
#[async_trait]
pub trait Advisor: Send + Sync + std::fmt::Debug {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Generate a reply for `prompt`. `Ok(None)` means the provider answered
    /// without text.
    async fn generate(&self, prompt: &str) -> Result<Option<String>>;
}

/// Who wrote a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The operator.
    User,
    /// The assistant.
    Ai,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Author of the message.
    pub speaker: Speaker,
    /// Message text.
    pub text: String,
}

impl ChatMessage {
    fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// One-line description of the register for the prompt.
#[must_use]
pub fn data_summary(records: &[ViolationRecord]) -> String {
    if records.is_empty() {
        return "Saat ini database masih kosong.".to_string();
    }
    let categories: Vec<String> = per_category(records)
        .into_iter()
        .map(|c| c.category)
        .collect();
    format!(
        "Berikut adalah ringkasan data pelanggaran saat ini: {} kasus total, dengan rincian \
         perkara: {}.",
        records.len(),
        categories.join(", ")
    )
}

/// Build the full prompt for `question`.
#[must_use]
pub fn build_prompt(question: &str, records: &[ViolationRecord]) -> String {
    format!(
        "{PREAMBLE}\n\nKonteks Satuan: {}\nPertanyaan User: {question}\n\n{STYLE_INSTRUCTION}",
        data_summary(records)
    )
}

/// Resets the in-flight flag when a request finishes, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Chat front end over an [`Advisor`].
#[derive(Debug)]
pub struct Assistant {
    advisor: Box<dyn Advisor>,
    transcript: Mutex<Vec<ChatMessage>>,
    pending: AtomicBool,
}

impl Assistant {
    /// Start a conversation with the greeting message.
    #[must_use]
    pub fn new(advisor: Box<dyn Advisor>) -> Self {
        Self {
            advisor,
            transcript: Mutex::new(vec![ChatMessage::new(Speaker::Ai, GREETING)]),
            pending: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// A copy of the transcript so far.
    #[must_use]
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    fn push(&self, message: ChatMessage) {
        if let Ok(mut messages) = self.transcript.lock() {
            messages.push(message);
        }
    }

    /// Ask a question about `records`.
    ///
    /// Returns `None` without doing anything when the question is blank or
    /// another question is still pending. Otherwise returns the reply, which
    /// is a fallback message if the provider failed.
    pub async fn ask(&self, question: &str, records: &[ViolationRecord]) -> Option<String> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Ignoring question while a reply is pending");
            return None;
        }
        let _in_flight = InFlight(&self.pending);

        self.push(ChatMessage::new(Speaker::User, question));
        let prompt = build_prompt(question, records);

        let reply = match self.advisor.generate(&prompt).await {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => EMPTY_REPLY_FALLBACK.to_string(),
            Err(err) => {
                error!("Assistant provider {} failed: {}", self.advisor.name(), err);
                CONNECTION_FALLBACK.to_string()
            }
        };

        self.push(ChatMessage::new(Speaker::Ai, reply.clone()));
        Some(reply)
    }
}

/// Request body of `generateContent`.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response body of `generateContent`, reduced to the text parts.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, or `None` if it has none.
    fn text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// [`Advisor`] backed by the Generative Language API.
#[derive(Debug)]
pub struct GeminiAdvisor {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiAdvisor {
    /// Provider name used in logs and errors.
    pub const NAME: &'static str = "gemini";

    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &AssistantConfig,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::advisor(Self::NAME, format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl Advisor for GeminiAdvisor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn generate(&self, prompt: &str) -> Result<Option<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::advisor(Self::NAME, "no API key configured"))?;

        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        info!("Sending question to {} model {}", Self::NAME, self.model);
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::advisor(Self::NAME, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::advisor(
                Self::NAME,
                format!("request failed status={status}"),
            ));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::advisor(Self::NAME, format!("unreadable response: {e}")))?;
        Ok(parsed.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::record;
    use crate::record::CaseStatus;

    #[derive(Debug, Default)]
    struct EchoAdvisor {
        prompts: std::sync::Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Advisor for EchoAdvisor {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn generate(&self, prompt: &str) -> Result<Option<String>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(Some("Siap, laksanakan.".to_string()))
        }
    }

    #[derive(Debug)]
    struct FixedAdvisor(Option<&'static str>);

    #[async_trait]
    impl Advisor for FixedAdvisor {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn generate(&self, _prompt: &str) -> Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    #[derive(Debug)]
    struct FailingAdvisor;

    #[async_trait]
    impl Advisor for FailingAdvisor {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn generate(&self, _prompt: &str) -> Result<Option<String>> {
            Err(Error::advisor("failing", "connection refused"))
        }
    }

    #[derive(Debug)]
    struct SlowAdvisor;

    #[async_trait]
    impl Advisor for SlowAdvisor {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn generate(&self, _prompt: &str) -> Result<Option<String>> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Some("selesai".to_string()))
        }
    }

    #[test]
    fn test_transcript_starts_with_greeting() {
        let assistant = Assistant::new(Box::new(FailingAdvisor));
        let transcript = assistant.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].speaker, Speaker::Ai);
        assert_eq!(transcript[0].text, GREETING);
    }

    #[test]
    fn test_summary_of_empty_register() {
        assert_eq!(data_summary(&[]), "Saat ini database masih kosong.");
    }

    #[test]
    fn test_summary_lists_distinct_categories() {
        let mut a = record("1", "A", CaseStatus::ProsesHukum);
        a.perkara = "Narkoba".to_string();
        let b = record("2", "A", CaseStatus::Selesai);
        let mut c = record("3", "A", CaseStatus::Selesai);
        c.perkara = "Narkoba".to_string();

        let summary = data_summary(&[a, b, c]);
        assert!(summary.contains("3 kasus total"));
        assert!(summary.ends_with("perkara: Narkoba, Desersi."));
    }

    #[test]
    fn test_prompt_contents() {
        let prompt = build_prompt("Apa sanksi desersi?", &[]);
        assert!(prompt.starts_with("Anda adalah AI Asisten Hukum"));
        assert!(prompt.contains("KUHPM"));
        assert!(prompt.contains("Konteks Satuan: Saat ini database masih kosong."));
        assert!(prompt.contains("Pertanyaan User: Apa sanksi desersi?"));
        assert!(prompt.ends_with("pencegahan."));
    }

    #[tokio::test]
    async fn test_ask_appends_both_messages() {
        let assistant = Assistant::new(Box::new(EchoAdvisor::default()));
        let reply = assistant.ask("  Bagaimana prosedur sidang?  ", &[]).await;

        assert_eq!(reply.as_deref(), Some("Siap, laksanakan."));
        let transcript = assistant.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].speaker, Speaker::User);
        assert_eq!(transcript[1].text, "Bagaimana prosedur sidang?");
        assert_eq!(transcript[2].speaker, Speaker::Ai);
        assert!(!assistant.is_pending());
    }

    #[tokio::test]
    async fn test_prompt_sent_to_advisor() {
        let advisor = EchoAdvisor::default();
        let prompts = advisor.prompts.clone();
        let records = vec![record("1", "A", CaseStatus::ProsesHukum)];
        let assistant = Assistant::new(Box::new(advisor));
        assistant.ask("Ringkas data", &records).await;

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("1 kasus total"));
        assert!(prompts[0].contains("Pertanyaan User: Ringkas data"));
    }

    #[tokio::test]
    async fn test_blank_question_ignored() {
        let assistant = Assistant::new(Box::new(EchoAdvisor::default()));
        assert_eq!(assistant.ask("   ", &[]).await, None);
        assert_eq!(assistant.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_error_becomes_fallback() {
        let assistant = Assistant::new(Box::new(FailingAdvisor));
        let reply = assistant.ask("Halo", &[]).await;
        assert_eq!(reply.as_deref(), Some(CONNECTION_FALLBACK));
        assert_eq!(assistant.transcript()[2].text, CONNECTION_FALLBACK);
        assert!(!assistant.is_pending());
    }

    #[tokio::test]
    async fn test_empty_answer_becomes_fallback() {
        for advisor in [FixedAdvisor(None), FixedAdvisor(Some("  "))] {
            let assistant = Assistant::new(Box::new(advisor));
            let reply = assistant.ask("Halo", &[]).await;
            assert_eq!(reply.as_deref(), Some(EMPTY_REPLY_FALLBACK));
        }
    }

    #[tokio::test]
    async fn test_single_request_in_flight() {
        let assistant = Assistant::new(Box::new(SlowAdvisor));
        let (first, second) = tokio::join!(
            assistant.ask("pertama", &[]),
            assistant.ask("kedua", &[])
        );

        assert_eq!(first.as_deref(), Some("selesai"));
        assert_eq!(second, None);
        assert_eq!(assistant.transcript().len(), 3);

        let third = assistant.ask("ketiga", &[]).await;
        assert_eq!(third.as_deref(), Some("selesai"));
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Siap"},{"text":"!"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("Siap!"));

        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(parsed.text(), None);

        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.text(), None);
    }

    #[test]
    fn test_gemini_url() {
        let config = AssistantConfig {
            endpoint: "https://example.test/v1beta/".to_string(),
            model: "gemini-test".to_string(),
            ..AssistantConfig::default()
        };
        let advisor = GeminiAdvisor::new(&config, None, None).unwrap();
        assert_eq!(
            advisor.url(),
            "https://example.test/v1beta/models/gemini-test:generateContent"
        );
    }

    #[tokio::test]
    async fn test_gemini_without_key_fails_fast() {
        let advisor = GeminiAdvisor::new(&AssistantConfig::default(), None, None).unwrap();
        let err = advisor.generate("Halo").await.unwrap_err();
        assert!(matches!(err, Error::Advisor { provider: "gemini", .. }));
    }
}
