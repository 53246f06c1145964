//! Meeting-link extraction from calendar events.
//!
//! Events carry join links in several places depending on how they were
//! created: structured conference entry points, the free-text description,
//! the location field, or the legacy hangout link. Extraction checks them in
//! that order and falls back to scanning every text field at once.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::Event;

/// Video-conferencing platform behind a join link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Zoom,
    Meet,
    Teams,
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Zoom => "zoom",
            Platform::Meet => "meet",
            Platform::Teams => "teams",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip trailing punctuation that calendar text tends to glue onto URLs.
pub fn normalize_url(raw: &str) -> String {
    raw.trim_end_matches([')', '>', '.', ',', ']']).to_string()
}

/// Characters that terminate a URL inside free text.
const URL_STOP: &[char] = &['<', '>', '(', ')', '"', '\'', '`'];

/// Extract every http(s) URL from a block of free text.
pub fn extract_all_urls(text: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut skip_until = 0;

    for (i, c) in text.char_indices() {
        if i < skip_until || (c != 'h' && c != 'H') {
            continue;
        }
        let rest = &text[i..];
        let is_url = rest
            .get(..8)
            .is_some_and(|p| p.eq_ignore_ascii_case("https://"))
            || rest
                .get(..7)
                .is_some_and(|p| p.eq_ignore_ascii_case("http://"));
        if !is_url {
            continue;
        }

        let end = rest
            .find(|ch: char| ch.is_whitespace() || URL_STOP.contains(&ch))
            .unwrap_or(rest.len());
        urls.push(normalize_url(&rest[..end]));
        skip_until = i + end;
    }

    urls
}

/// Classify which platform a URL belongs to, by host.
pub fn classify_provider(raw: &str) -> Platform {
    let Ok(url) = Url::parse(&raw.to_lowercase()) else {
        return Platform::Unknown;
    };
    let Some(host) = url.host_str() else {
        return Platform::Unknown;
    };

    if host.contains("zoom.us") {
        Platform::Zoom
    } else if host.contains("meet.google.com") {
        Platform::Meet
    } else if host.contains("teams.microsoft.com") {
        Platform::Teams
    } else {
        Platform::Unknown
    }
}

/// Find the join URL for an event, if it has one.
///
/// Precedence: conference entry points, then description, then location,
/// then the hangout link, then a last-resort scan over all text fields.
pub fn extract_join_url(event: &Event) -> Option<String> {
    for uri in &event.conference_uris {
        if classify_provider(uri) != Platform::Unknown {
            return Some(uri.clone());
        }
    }

    if let Some(description) = &event.description {
        if let Some(hit) = first_meeting_url(description) {
            return Some(hit);
        }
    }

    if let Some(location) = &event.location {
        if let Some(hit) = first_meeting_url(location) {
            return Some(hit);
        }
    }

    if let Some(hangout) = &event.hangout_link {
        if classify_provider(hangout) != Platform::Unknown {
            return Some(normalize_url(hangout));
        }
    }

    let haystack = [
        Some(event.summary.as_str()),
        event.description.as_deref(),
        event.location.as_deref(),
        event.hangout_link.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n");

    first_meeting_url(&haystack)
}

/// Classify a possibly-absent join URL.
pub fn detect_platform(url: Option<&str>) -> Platform {
    match url {
        Some(u) => classify_provider(u),
        None => Platform::Unknown,
    }
}

fn first_meeting_url(text: &str) -> Option<String> {
    extract_all_urls(text)
        .into_iter()
        .find(|u| classify_provider(u) != Platform::Unknown)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::{EventStatus, EventTime};
    use chrono::{TimeZone, Utc};

    fn bare_event() -> Event {
        Event {
            id: "evt1".to_string(),
            calendar_id: "primary".to_string(),
            summary: "Sync".to_string(),
            description: None,
            location: None,
            start: EventTime::DateTime(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()),
            end: EventTime::DateTime(Utc.with_ymd_and_hms(2025, 1, 1, 13, 0, 0).unwrap()),
            all_day: false,
            attendees: vec![],
            organizer: None,
            status: EventStatus::Confirmed,
            hangout_link: None,
            conference_uris: vec![],
            html_link: None,
        }
    }

    #[test]
    fn test_normalize_strips_trailing_punctuation() {
        assert_eq!(
            normalize_url("https://zoom.us/j/123)."),
            "https://zoom.us/j/123"
        );
        assert_eq!(
            normalize_url("https://meet.google.com/abc],"),
            "https://meet.google.com/abc"
        );
        assert_eq!(normalize_url("https://zoom.us/j/123"), "https://zoom.us/j/123");
    }

    #[test]
    fn test_extract_all_urls() {
        let text = "Join here: https://zoom.us/j/99 (backup http://example.com/x) done";
        let urls = extract_all_urls(text);
        assert_eq!(urls, vec!["https://zoom.us/j/99", "http://example.com/x"]);
    }

    #[test]
    fn test_extract_all_urls_case_insensitive_scheme() {
        let urls = extract_all_urls("HTTPS://ZOOM.US/j/1");
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn test_extract_all_urls_empty_text() {
        assert!(extract_all_urls("").is_empty());
        assert!(extract_all_urls("no links here").is_empty());
    }

    #[test]
    fn test_classify_provider() {
        assert_eq!(classify_provider("https://us02web.zoom.us/j/1"), Platform::Zoom);
        assert_eq!(
            classify_provider("https://meet.google.com/abc-defg-hij"),
            Platform::Meet
        );
        assert_eq!(
            classify_provider("https://teams.microsoft.com/l/meetup-join/xyz"),
            Platform::Teams
        );
        assert_eq!(classify_provider("https://example.com/room"), Platform::Unknown);
        assert_eq!(classify_provider("not a url"), Platform::Unknown);
    }

    #[test]
    fn test_conference_uri_takes_precedence() {
        let mut event = bare_event();
        event.conference_uris = vec!["https://zoom.us/j/111".to_string()];
        event.description = Some("also https://meet.google.com/xxx-yyyy-zzz".to_string());

        assert_eq!(
            extract_join_url(&event).as_deref(),
            Some("https://zoom.us/j/111")
        );
    }

    #[test]
    fn test_phone_entry_point_is_skipped() {
        let mut event = bare_event();
        event.conference_uris = vec![
            "tel:+1-555-0100".to_string(),
            "https://teams.microsoft.com/l/meetup-join/abc".to_string(),
        ];

        assert_eq!(
            extract_join_url(&event).as_deref(),
            Some("https://teams.microsoft.com/l/meetup-join/abc")
        );
    }

    #[test]
    fn test_description_before_location() {
        let mut event = bare_event();
        event.description = Some("link: https://zoom.us/j/222.".to_string());
        event.location = Some("https://meet.google.com/aaa-bbbb-ccc".to_string());

        assert_eq!(extract_join_url(&event).as_deref(), Some("https://zoom.us/j/222"));
    }

    #[test]
    fn test_hangout_link_fallback() {
        let mut event = bare_event();
        event.hangout_link = Some("https://meet.google.com/abc-defg-hij".to_string());

        assert_eq!(
            extract_join_url(&event).as_deref(),
            Some("https://meet.google.com/abc-defg-hij")
        );
    }

    #[test]
    fn test_unknown_urls_yield_none() {
        let mut event = bare_event();
        event.description = Some("notes at https://example.com/doc".to_string());

        assert_eq!(extract_join_url(&event), None);
    }

    #[test]
    fn test_detect_platform() {
        assert_eq!(detect_platform(Some("https://zoom.us/j/1")), Platform::Zoom);
        assert_eq!(detect_platform(None), Platform::Unknown);
    }

    #[test]
    fn test_platform_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Platform::Zoom).unwrap(), "\"zoom\"");
        assert_eq!(
            serde_json::to_string(&Platform::Unknown).unwrap(),
            "\"unknown\""
        );
    }
}
