//! Calendar API types and data structures.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Calendar event as used by the scheduling pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub calendar_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub all_day: bool,
    pub attendees: Vec<Attendee>,
    pub organizer: Option<String>,
    pub status: EventStatus,
    /// Legacy Hangouts/Meet link, still populated by Google for Meet events.
    pub hangout_link: Option<String>,
    /// Conference entry point URIs (video/phone/sip), in API order.
    pub conference_uris: Vec<String>,
    pub html_link: Option<String>,
}

/// Event time - can be a specific datetime or an all-day date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    pub fn as_datetime(&self) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc(),
        }
    }
}

/// Event status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl Default for EventStatus {
    fn default() -> Self {
        Self::Confirmed
    }
}

/// Event attendee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    pub display_name: Option<String>,
    pub response_status: ResponseStatus,
    pub is_organizer: bool,
}

/// Attendee response status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ResponseStatus {
    NeedsAction,
    Declined,
    Tentative,
    Accepted,
}

impl Default for ResponseStatus {
    fn default() -> Self {
        Self::NeedsAction
    }
}

// API Response Types

/// Google Calendar API event response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    #[serde(default)]
    pub attendees: Vec<ApiAttendee>,
    pub organizer: Option<ApiOrganizer>,
    pub status: Option<String>,
    pub hangout_link: Option<String>,
    pub conference_data: Option<ApiConferenceData>,
    pub html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAttendee {
    pub email: String,
    pub display_name: Option<String>,
    pub response_status: Option<String>,
    #[serde(default)]
    pub organizer: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApiOrganizer {
    pub email: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

/// Conference data attached to an event (Meet, Zoom add-ons, etc).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConferenceData {
    #[serde(default)]
    pub entry_points: Vec<ApiEntryPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEntryPoint {
    pub uri: Option<String>,
    pub entry_point_type: Option<String>,
    pub label: Option<String>,
}

/// API response for event list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
    pub next_sync_token: Option<String>,
}

impl Event {
    /// Convert API response to local Event.
    pub fn from_api(api: ApiEvent, calendar_id: &str) -> Self {
        let (start, all_day) = api
            .start
            .map(|t| parse_event_time(&t))
            .unwrap_or((EventTime::DateTime(DateTime::<Utc>::MIN_UTC), false));

        let end = api
            .end
            .map(|t| parse_event_time(&t).0)
            .unwrap_or_else(|| start.clone());

        let status = match api.status.as_deref() {
            Some("confirmed") => EventStatus::Confirmed,
            Some("tentative") => EventStatus::Tentative,
            Some("cancelled") => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        };

        let attendees = api
            .attendees
            .into_iter()
            .map(|a| {
                let response_status = match a.response_status.as_deref() {
                    Some("accepted") => ResponseStatus::Accepted,
                    Some("declined") => ResponseStatus::Declined,
                    Some("tentative") => ResponseStatus::Tentative,
                    _ => ResponseStatus::NeedsAction,
                };
                Attendee {
                    email: a.email,
                    display_name: a.display_name,
                    response_status,
                    is_organizer: a.organizer,
                }
            })
            .collect();

        let conference_uris = api
            .conference_data
            .map(|cd| cd.entry_points.into_iter().filter_map(|ep| ep.uri).collect())
            .unwrap_or_default();

        Self {
            id: api.id,
            calendar_id: calendar_id.to_string(),
            summary: api.summary.unwrap_or_default(),
            description: api.description,
            location: api.location,
            start,
            end,
            all_day,
            attendees,
            organizer: api.organizer.and_then(|o| o.email),
            status,
            hangout_link: api.hangout_link,
            conference_uris,
            html_link: api.html_link,
        }
    }

    /// Emails of every attendee, used when recording a scheduled bot.
    pub fn attendee_emails(&self) -> Vec<String> {
        self.attendees.iter().map(|a| a.email.clone()).collect()
    }
}

fn parse_event_time(api: &ApiEventTime) -> (EventTime, bool) {
    if let Some(dt_str) = &api.date_time {
        // Try parsing as RFC3339
        if let Ok(dt) = DateTime::parse_from_rfc3339(dt_str) {
            return (EventTime::DateTime(dt.with_timezone(&Utc)), false);
        }
    }
    if let Some(date_str) = &api.date {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
            return (EventTime::Date(date), true);
        }
    }
    (EventTime::DateTime(DateTime::<Utc>::MIN_UTC), false)
}
