//! Recall.ai meeting-bot API client.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::error::NotetakerError;

pub struct RecallClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// Request to create a meeting bot.
#[derive(Debug, Clone)]
pub struct CreateBotRequest {
    pub meeting_url: String,
    pub join_at: DateTime<Utc>,
    pub bot_name: String,
    pub event_id: String,
    pub user_id: String,
}

/// Bot state as reported by the API.
#[derive(Debug, Clone)]
pub struct BotState {
    pub id: String,
    pub status: String,
    /// Download URL for the transcript, present once the bot is done.
    pub transcript_url: Option<String>,
}

impl BotState {
    pub fn is_done(&self) -> bool {
        self.status == "done"
    }
}

#[derive(Debug, Deserialize)]
struct ApiBot {
    id: String,
    status: Option<String>,
    #[serde(default)]
    recordings: Vec<ApiRecording>,
}

#[derive(Debug, Deserialize)]
struct ApiRecording {
    media_shortcuts: Option<ApiMediaShortcuts>,
}

#[derive(Debug, Deserialize)]
struct ApiMediaShortcuts {
    transcript: Option<ApiTranscriptShortcut>,
}

#[derive(Debug, Deserialize)]
struct ApiTranscriptShortcut {
    data: Option<ApiTranscriptData>,
}

#[derive(Debug, Deserialize)]
struct ApiTranscriptData {
    download_url: Option<String>,
}

impl From<ApiBot> for BotState {
    fn from(api: ApiBot) -> Self {
        let transcript_url = api
            .recordings
            .into_iter()
            .next()
            .and_then(|r| r.media_shortcuts)
            .and_then(|m| m.transcript)
            .and_then(|t| t.data)
            .and_then(|d| d.download_url);

        Self {
            id: api.id,
            status: api.status.unwrap_or_default(),
            transcript_url,
        }
    }
}

impl RecallClient {
    /// Create a client for the given Recall region (e.g. us-west-2).
    pub fn new(region: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: format!("https://{}.recall.ai/api/v1", region),
        }
    }

    #[cfg(test)]
    pub fn new_with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.api_key)
    }

    /// Create a bot scheduled to join a meeting at the planned instant.
    ///
    /// The transcript is produced from meeting captions, so no separate
    /// transcription provider is involved.
    #[instrument(skip(self, req), fields(event_id = %req.event_id), level = "info")]
    pub async fn create_bot(&self, req: &CreateBotRequest) -> Result<BotState, NotetakerError> {
        let url = format!("{}/bot", self.base_url);

        let body = serde_json::json!({
            "meeting_url": req.meeting_url,
            "join_at": req.join_at.to_rfc3339(),
            "metadata": { "eventId": req.event_id, "userId": req.user_id },
            "bot_name": req.bot_name,
            "recording_config": {
                "transcript": { "provider": { "meeting_captions": {} } },
            },
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await?;

        let api_bot: ApiBot = self.handle_response(response).await?;
        Ok(api_bot.into())
    }

    /// Fetch the current state of a bot.
    #[instrument(skip(self), level = "info")]
    pub async fn get_bot(&self, bot_id: &str) -> Result<BotState, NotetakerError> {
        let url = format!("{}/bot/{}", self.base_url, bot_id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let api_bot: ApiBot = self.handle_response(response).await?;
        Ok(api_bot.into())
    }

    /// Download a finished bot's raw transcript text.
    #[instrument(skip(self, url), level = "info")]
    pub async fn fetch_transcript(&self, url: &str) -> Result<String, NotetakerError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(NotetakerError::BotApi(format!("{}: {}", status, text)));
        }

        Ok(response.text().await?)
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, NotetakerError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| NotetakerError::BotApi(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            Err(NotetakerError::Unauthorized)
        } else if status.as_u16() == 404 {
            let text = response.text().await.unwrap_or_default();
            Err(NotetakerError::BotNotFound(text))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(NotetakerError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(NotetakerError::BotApi(format!("{}: {}", status, text)))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::TimeZone;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_bot_sends_join_at() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot"))
            .and(header("Authorization", "Token test_key"))
            .and(body_partial_json(serde_json::json!({
                "meeting_url": "https://zoom.us/j/123",
                "join_at": "2025-01-01T12:45:00+00:00",
                "bot_name": "MeetingPost Notetaker",
                "metadata": { "eventId": "evt1", "userId": "user1" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "bot-abc",
                "status": "scheduled"
            })))
            .mount(&mock_server)
            .await;

        let client = RecallClient::new_with_base_url("test_key", &mock_server.uri());
        let bot = client
            .create_bot(&CreateBotRequest {
                meeting_url: "https://zoom.us/j/123".to_string(),
                join_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 45, 0).unwrap(),
                bot_name: "MeetingPost Notetaker".to_string(),
                event_id: "evt1".to_string(),
                user_id: "user1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(bot.id, "bot-abc");
        assert_eq!(bot.status, "scheduled");
        assert!(!bot.is_done());
    }

    #[tokio::test]
    async fn test_get_bot_in_progress_has_no_transcript() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/bot/bot-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "bot-abc",
                "status": "in_call_recording"
            })))
            .mount(&mock_server)
            .await;

        let client = RecallClient::new_with_base_url("test_key", &mock_server.uri());
        let bot = client.get_bot("bot-abc").await.unwrap();

        assert!(!bot.is_done());
        assert!(bot.transcript_url.is_none());
    }

    #[tokio::test]
    async fn test_get_bot_done_exposes_transcript_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/bot/bot-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "bot-abc",
                "status": "done",
                "recordings": [
                    {
                        "media_shortcuts": {
                            "transcript": {
                                "data": { "download_url": "https://recall.example/t/1" }
                            }
                        }
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = RecallClient::new_with_base_url("test_key", &mock_server.uri());
        let bot = client.get_bot("bot-abc").await.unwrap();

        assert!(bot.is_done());
        assert_eq!(
            bot.transcript_url.as_deref(),
            Some("https://recall.example/t/1")
        );
    }

    #[tokio::test]
    async fn test_fetch_transcript() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/t/1"))
            .and(header("Authorization", "Token test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello from the meeting"))
            .mount(&mock_server)
            .await;

        let client = RecallClient::new_with_base_url("test_key", &mock_server.uri());
        let text = client
            .fetch_transcript(&format!("{}/t/1", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(text, "hello from the meeting");
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = RecallClient::new_with_base_url("bad_key", &mock_server.uri());
        let result = client
            .create_bot(&CreateBotRequest {
                meeting_url: "https://zoom.us/j/123".to_string(),
                join_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 45, 0).unwrap(),
                bot_name: "MeetingPost Notetaker".to_string(),
                event_id: "evt1".to_string(),
                user_id: "user1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(NotetakerError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_bot_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/bot/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = RecallClient::new_with_base_url("test_key", &mock_server.uri());
        let result = client.get_bot("missing").await;

        assert!(matches!(result, Err(NotetakerError::BotNotFound(_))));
    }
}
