//! End-to-end scheduling of a notetaker bot for a calendar event.

use chrono::{DateTime, Utc};
use tracing::instrument;

use meetingpost_calendar::{detect_platform, extract_join_url, Event};
use meetingpost_core::config::{Config, NotetakerConfig};

use crate::error::NotetakerError;
use crate::plan::{plan_join, JoinPlan};
use crate::recall::{CreateBotRequest, RecallClient};
use crate::store::{BotRecord, BotStore};

/// Result of scheduling a bot for one event.
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    pub bot_id: String,
    pub plan: JoinPlan,
    /// True if an already-scheduled bot was found for the event and no new
    /// bot was created.
    pub reused: bool,
}

pub struct NotetakerService {
    recall: RecallClient,
    store: BotStore,
    lead_minutes: f64,
    bot_name: String,
}

impl NotetakerService {
    pub fn new(recall: RecallClient, store: BotStore, notetaker: &NotetakerConfig) -> Self {
        Self {
            recall,
            store,
            lead_minutes: notetaker.lead_minutes,
            bot_name: notetaker.bot_name.clone(),
        }
    }

    /// Build a service from validated application config.
    pub fn from_config(config: &Config) -> Result<Self, NotetakerError> {
        let api_key = config
            .recall
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(NotetakerError::MissingApiKey)?;

        let recall = RecallClient::new(&config.recall.region, api_key);
        let store = BotStore::new(config.config_dir.join("bots.db"))?;

        Ok(Self::new(recall, store, &config.notetaker))
    }

    /// Schedule a bot for an event, reusing any bot already booked for it.
    ///
    /// `now` is the evaluation instant for the join plan; it is passed in so
    /// the decision is reproducible and testable.
    #[instrument(skip(self, event), fields(event_id = %event.id), level = "info")]
    pub async fn schedule_for_event(
        &self,
        event: &Event,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, NotetakerError> {
        if let Some(existing) = self.store.find_by_event(&event.id)? {
            tracing::info!(bot_id = %existing.bot_id, "reusing bot already scheduled for event");
            return Ok(ScheduleOutcome {
                bot_id: existing.bot_id.clone(),
                plan: existing.plan(),
                reused: true,
            });
        }

        let join_url =
            extract_join_url(event).ok_or_else(|| NotetakerError::NoJoinUrl(event.id.clone()))?;

        let start_at = event.start.as_datetime();
        let plan = plan_join(start_at, self.lead_minutes, now);

        if plan.is_late {
            tracing::warn!(
                mode = %plan.mode,
                join_at = %plan.actual_join_at,
                "join can only happen after the meeting starts"
            );
        }

        let bot = self
            .recall
            .create_bot(&CreateBotRequest {
                meeting_url: join_url.clone(),
                join_at: plan.actual_join_at,
                bot_name: self.bot_name.clone(),
                event_id: event.id.clone(),
                user_id: user_id.to_string(),
            })
            .await?;

        let record = BotRecord {
            bot_id: bot.id.clone(),
            event_id: event.id.clone(),
            user_id: user_id.to_string(),
            platform: detect_platform(Some(join_url.as_str())),
            join_url,
            title: (!event.summary.is_empty()).then(|| event.summary.clone()),
            attendees: event.attendee_emails(),
            start_at,
            desired_at: plan.desired_at,
            actual_join_at: plan.actual_join_at,
            mode: plan.mode,
            lead_minutes: self.lead_minutes,
            is_late: plan.is_late,
            transcript_ready: false,
            processed: false,
            created_at: now,
        };
        self.store.record_bot(&record)?;

        Ok(ScheduleOutcome {
            bot_id: bot.id,
            plan,
            reused: false,
        })
    }

    /// Poll a bot and download its transcript once finished.
    ///
    /// Returns `None` while the bot is still running or the transcript is
    /// not yet available.
    #[instrument(skip(self), level = "info")]
    pub async fn check_transcript(&self, bot_id: &str) -> Result<Option<String>, NotetakerError> {
        let state = self.recall.get_bot(bot_id).await?;

        if !state.is_done() {
            return Ok(None);
        }

        let Some(url) = state.transcript_url else {
            tracing::warn!("bot finished without a transcript recording");
            return Ok(None);
        };

        let text = self.recall.fetch_transcript(&url).await?;
        self.store.mark_transcript_ready(bot_id)?;

        Ok(Some(text))
    }

    /// Bots whose transcript still needs downstream processing.
    pub fn pending_bots(&self) -> Result<Vec<BotRecord>, NotetakerError> {
        Ok(self.store.list_pending()?)
    }
}
