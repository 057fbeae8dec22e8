//! Bridge to the external text-generation service
//!
//! One request, one response; no retries and no streaming. The model
//! behind the endpoint is someone else's problem.

use tally_config::config;
use tally_result::Result;

/// Something that can turn expense notes into a short summary
#[async_trait]
pub trait Summarizer: Sync + Send {
    async fn summarize(&self, event_name: &str, expense_notes: &str) -> Result<String>;
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    event_name: &'a str,
    expense_notes: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary: String,
}

/// Production implementation backed by an HTTP endpoint
#[derive(Default)]
pub struct HttpSummarizer {
    client: reqwest::Client,
}

impl HttpSummarizer {
    pub fn new() -> HttpSummarizer {
        Default::default()
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize(&self, event_name: &str, expense_notes: &str) -> Result<String> {
        let config = config().await;
        if config.api.summarization.endpoint.is_empty() {
            return Err(create_error!(SummarizationFailed));
        }

        let response = self
            .client
            .post(&config.api.summarization.endpoint)
            .bearer_auth(&config.api.summarization.api_key)
            .json(&SummarizeRequest {
                event_name,
                expense_notes,
            })
            .send()
            .await
            .map_err(|err| {
                error!("Failed to reach summarization endpoint: {err:?}");
                create_error!(SummarizationFailed)
            })?
            .error_for_status()
            .map_err(|err| {
                error!("Summarization endpoint returned an error: {err:?}");
                create_error!(SummarizationFailed)
            })?;

        let body: SummarizeResponse = response.json().await.map_err(|err| {
            error!("Failed to decode summarization response: {err:?}");
            create_error!(SummarizationFailed)
        })?;

        Ok(body.summary)
    }
}
