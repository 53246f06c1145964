//! Google Calendar integration for MeetingPost.
//!
//! Provides the Calendar API client and meeting-link extraction.

pub mod client;
pub mod error;
pub mod links;
pub mod types;

pub use client::CalendarClient;
pub use error::CalendarError;
pub use links::{classify_provider, detect_platform, extract_join_url, Platform};
pub use types::{Attendee, Event, EventStatus, EventTime, ResponseStatus};
