//! Notetaker scheduling for MeetingPost.
//!
//! Decides when a meeting bot should join (the join planner), creates bots
//! via the Recall.ai API, and keeps a local record of what was scheduled.

pub mod error;
pub mod plan;
pub mod recall;
pub mod service;
pub mod store;

pub use error::NotetakerError;
pub use plan::{plan_join, JoinMode, JoinPlan};
pub use recall::{BotState, CreateBotRequest, RecallClient};
pub use service::{NotetakerService, ScheduleOutcome};
pub use store::{BotRecord, BotStore};
