use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;

use crate::calendar::{CalendarEvent, EventSource, TimeWindow};
use crate::config::CalendarConfig;
use crate::utils::{format_short_date, DateParseError};

/// Name shown when an event has no summary
pub const UNKNOWN_NAME: &str = "Unknown";

/// A birthday ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthdayEntry {
    pub name: String,
    /// Short display date, e.g. "Jan 05"
    pub date: String,
}

impl BirthdayEntry {
    /// Normalize one calendar event.
    ///
    /// Returns `Ok(None)` when the event carries no usable start value.
    pub fn from_event(event: &CalendarEvent) -> Result<Option<Self>, DateParseError> {
        let name = event.summary.as_deref().unwrap_or(UNKNOWN_NAME);

        // All-day date takes precedence over a timestamp
        let start = event
            .start
            .as_ref()
            .and_then(|s| s.date.as_deref().or(s.date_time.as_deref()))
            .filter(|s| !s.is_empty());

        let Some(start) = start else {
            return Ok(None);
        };

        Ok(Some(Self {
            name: name.to_string(),
            date: format_short_date(start)?,
        }))
    }
}

/// Convert events into entries, preserving their order
pub fn entries_from_events(events: &[CalendarEvent]) -> Result<Vec<BirthdayEntry>> {
    let mut birthdays = Vec::with_capacity(events.len());

    for event in events {
        debug!(
            "Processing event: {}",
            event.summary.as_deref().unwrap_or(UNKNOWN_NAME)
        );

        match BirthdayEntry::from_event(event)
            .with_context(|| format!("Failed to read start of event {:?}", event.summary))?
        {
            Some(entry) => birthdays.push(entry),
            None => warn!("Skipping event without start: {:?}", event.summary),
        }
    }

    Ok(birthdays)
}

/// Fetch the upcoming birthdays from `source`
pub async fn fetch_birthdays<S>(
    source: &S,
    config: &CalendarConfig,
    now: DateTime<Utc>,
) -> Result<Vec<BirthdayEntry>>
where
    S: EventSource + ?Sized,
{
    config.validate()?;
    let window = TimeWindow::forward(now, config.window_days);
    debug!(
        "Time range: {} to {}",
        window.start.to_rfc3339(),
        window.end.to_rfc3339()
    );

    let events = source
        .list_events(&window, config.max_results)
        .await
        .context("Failed to list calendar events")?;

    entries_from_events(&events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{EventTime, MockEventSource};
    use chrono::TimeZone;

    fn all_day(summary: Option<&str>, date: &str) -> CalendarEvent {
        CalendarEvent {
            summary: summary.map(str::to_string),
            start: Some(EventTime {
                date: Some(date.to_string()),
                date_time: None,
            }),
        }
    }

    fn timed(summary: &str, date_time: &str) -> CalendarEvent {
        CalendarEvent {
            summary: Some(summary.to_string()),
            start: Some(EventTime {
                date: None,
                date_time: Some(date_time.to_string()),
            }),
        }
    }

    fn entry(name: &str, date: &str) -> BirthdayEntry {
        BirthdayEntry {
            name: name.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn alice_and_bob_keep_their_order() {
        let events = vec![
            all_day(Some("Alice"), "2025-03-02"),
            timed("Bob", "2025-04-15T09:00:00Z"),
        ];

        let entries = entries_from_events(&events).unwrap();

        assert_eq!(entries, vec![entry("Alice", "Mar 02"), entry("Bob", "Apr 15")]);
    }

    #[test]
    fn missing_summary_is_unknown() {
        let entries = entries_from_events(&[all_day(None, "2025-06-10")]).unwrap();
        assert_eq!(entries, vec![entry("Unknown", "Jun 10")]);
    }

    #[test]
    fn events_without_start_are_skipped() {
        let events = vec![
            CalendarEvent {
                summary: Some("No start".to_string()),
                start: None,
            },
            CalendarEvent {
                summary: Some("Empty start".to_string()),
                start: Some(EventTime::default()),
            },
            all_day(Some("Carol"), "2025-08-20"),
            CalendarEvent {
                summary: Some("Blank date".to_string()),
                start: Some(EventTime {
                    date: Some(String::new()),
                    date_time: None,
                }),
            },
        ];

        let entries = entries_from_events(&events).unwrap();

        assert_eq!(entries, vec![entry("Carol", "Aug 20")]);
    }

    #[test]
    fn date_wins_over_date_time() {
        let event = CalendarEvent {
            summary: Some("Dana".to_string()),
            start: Some(EventTime {
                date: Some("2025-09-01".to_string()),
                date_time: Some("2025-10-01T00:00:00Z".to_string()),
            }),
        };

        let entry = BirthdayEntry::from_event(&event).unwrap().unwrap();
        assert_eq!(entry.date, "Sep 01");
    }

    #[test]
    fn malformed_start_fails() {
        let events = vec![
            all_day(Some("Alice"), "2025-03-02"),
            all_day(Some("Broken"), "March 2nd"),
        ];

        let err = entries_from_events(&events).unwrap_err();
        assert!(err.downcast_ref::<DateParseError>().is_some());
    }

    #[tokio::test]
    async fn fetch_queries_a_year_ahead_with_limit() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let expected = TimeWindow::forward(now, 365);

        let mut source = MockEventSource::new();
        source
            .expect_list_events()
            .withf(move |window, limit| *window == expected && *limit == 8)
            .times(1)
            .returning(|_, _| Ok(vec![timed("Bob", "2025-04-15T09:00:00Z")]));

        let entries = fetch_birthdays(&source, &CalendarConfig::default(), now)
            .await
            .unwrap();

        assert_eq!(entries, vec![entry("Bob", "Apr 15")]);
    }

    #[tokio::test]
    async fn fetch_uses_configured_window_and_limit() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let config = CalendarConfig {
            window_days: 30,
            max_results: 3,
            ..CalendarConfig::default()
        };

        let mut source = MockEventSource::new();
        source
            .expect_list_events()
            .withf(move |window, limit| {
                window.end - window.start == chrono::Duration::days(30) && *limit == 3
            })
            .returning(|_, _| Ok(Vec::new()));

        let entries = fetch_birthdays(&source, &config, now).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn oversized_window_is_refused_before_querying() {
        let config = CalendarConfig {
            window_days: i64::MAX,
            ..CalendarConfig::default()
        };

        let mut source = MockEventSource::new();
        source.expect_list_events().times(0);

        let err = fetch_birthdays(&source, &config, Utc::now()).await.unwrap_err();
        assert!(format!("{err:#}").contains("window_days"));
    }

    #[tokio::test]
    async fn remote_errors_propagate() {
        let mut source = MockEventSource::new();
        source
            .expect_list_events()
            .returning(|_, _| Err(anyhow::anyhow!("401 Unauthorized")));

        let err = fetch_birthdays(&source, &CalendarConfig::default(), Utc::now())
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("401 Unauthorized"));
    }
}
