//! Google Calendar access.
//!
//! [`EventSource`] is the narrow seam the rest of the crate depends on;
//! [`GoogleCalendarClient`] implements it against the Calendar v3 REST API
//! using a service-account bearer token.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info};
use serde::Deserialize;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

use crate::credentials::CALENDAR_READONLY_SCOPE;

const EVENTS_ENDPOINT: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// Half-open query window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// `[now, now + days)`
    pub fn forward(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now,
            end: now + Duration::days(days),
        }
    }
}

/// Event start, either all-day (`date`) or timed (`dateTime`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventTime {
    pub date: Option<String>,
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
}

/// The parts of a calendar event this crate reads
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CalendarEvent {
    pub summary: Option<String>,
    pub start: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

/// Lists events ordered by start time
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSource {
    async fn list_events(&self, window: &TimeWindow, limit: usize) -> Result<Vec<CalendarEvent>>;
}

pub struct GoogleCalendarClient {
    client: reqwest::Client,
    token: String,
    calendar_id: String,
}

impl GoogleCalendarClient {
    /// Exchange the service-account key for a read-only access token
    pub async fn authorize(key: ServiceAccountKey, calendar_id: impl Into<String>) -> Result<Self> {
        let calendar_id = calendar_id.into();
        debug!("Authorizing {} for calendar {}", key.client_email, calendar_id);

        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .context("Failed to create service account authenticator")?;

        let token = auth
            .token(&[CALENDAR_READONLY_SCOPE])
            .await
            .context("Failed to obtain access token")?;

        let token = token
            .token()
            .ok_or_else(|| anyhow!("Token response did not contain an access token"))?
            .to_string();

        debug!("Access token obtained, length: {}", token.len());

        Ok(Self {
            client: reqwest::Client::new(),
            token,
            calendar_id,
        })
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }
}

#[async_trait]
impl EventSource for GoogleCalendarClient {
    async fn list_events(&self, window: &TimeWindow, limit: usize) -> Result<Vec<CalendarEvent>> {
        let url = events_url(&self.calendar_id, window, limit)?;
        debug!("Calendar API URL: {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Failed to send request to Google Calendar API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = match response.text().await {
                Ok(text) => text,
                Err(_) => "Failed to read error response".to_string(),
            };
            error!("Calendar API request failed: {} - {}", status, error_text);
            return Err(anyhow!(
                "Calendar API request for {} failed with status {}: {}",
                self.calendar_id,
                status,
                error_text
            ));
        }

        let response_text = response.text().await.context("Failed to get response text")?;
        debug!("Response length: {} bytes", response_text.len());

        let events = parse_events(&response_text)?;
        info!("Retrieved {} events from calendar {}", events.len(), self.calendar_id);

        Ok(events)
    }
}

/// Build the `events.list` request URL
fn events_url(calendar_id: &str, window: &TimeWindow, limit: usize) -> Result<url::Url> {
    let endpoint = format!("{}/{}/events", EVENTS_ENDPOINT, urlencoding::encode(calendar_id));

    let mut url = url::Url::parse(&endpoint).context("Invalid calendar endpoint")?;
    url.query_pairs_mut()
        .append_pair("timeMin", &window.start.to_rfc3339())
        .append_pair("timeMax", &window.end.to_rfc3339())
        .append_pair("singleEvents", "true")
        .append_pair("orderBy", "startTime")
        .append_pair("maxResults", &limit.to_string());

    Ok(url)
}

fn parse_events(body: &str) -> Result<Vec<CalendarEvent>> {
    let response: EventsResponse =
        serde_json::from_str(body).context("Failed to parse calendar response")?;
    Ok(response.items)
}
