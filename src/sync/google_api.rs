use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::calendar::attendees::MAX_ATTENDEES;
use crate::calendar::event::EVENT_TIME_ZONE;
use crate::calendar::{
    Attendee, CalendarEvent, EventDraft, EventStatus, EventTime, ListQuery, Organizer, Reminders,
    When,
};
use crate::sync::gateway::{CalendarGateway, GatewayError};

const ICAL_UID: &str = "iCalUID";

#[derive(Debug, Serialize, Deserialize)]
struct GoogleEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "iCalUID", skip_serializing_if = "Option::is_none")]
    ical_uid: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    start: GoogleDateTime,
    end: GoogleDateTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attendees: Vec<Attendee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organizer: Option<Organizer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reminders: Option<Reminders>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GoogleDateTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventListResponse {
    items: Option<Vec<GoogleEvent>>,
}

impl GoogleDateTime {
    fn at(date_time: String, time_zone: Option<&str>) -> Self {
        Self {
            date_time: Some(date_time),
            date: None,
            time_zone: time_zone.map(str::to_string),
        }
    }
}

impl From<&EventTime> for GoogleDateTime {
    fn from(time: &EventTime) -> Self {
        let (date_time, date) = match time.when {
            When::At(at) => (Some(at.to_rfc3339()), None),
            When::AllDay(day) => (None, Some(day.format("%Y-%m-%d").to_string())),
        };
        Self {
            date_time,
            date,
            time_zone: time.time_zone.clone(),
        }
    }
}

fn status_name(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Confirmed => "confirmed",
        EventStatus::Tentative => "tentative",
        EventStatus::Cancelled => "cancelled",
    }
}

fn parse_time(field: &str, gdt: GoogleDateTime) -> Result<EventTime, GatewayError> {
    let when = match (gdt.date_time, gdt.date) {
        (Some(raw), _) => DateTime::parse_from_rfc3339(&raw)
            .map(When::At)
            .map_err(|e| GatewayError::ParseError(format!("Invalid {} time: {}", field, e)))?,
        (None, Some(raw)) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(When::AllDay)
            .map_err(|e| GatewayError::ParseError(format!("Invalid {} date: {}", field, e)))?,
        (None, None) => {
            return Err(GatewayError::ParseError(format!(
                "Missing {} dateTime or date",
                field
            )));
        }
    };

    Ok(EventTime {
        when,
        time_zone: gdt.time_zone,
    })
}

fn convert_from_google_event(ge: GoogleEvent) -> Result<CalendarEvent, GatewayError> {
    let status = match ge.status.as_deref() {
        Some("cancelled") => EventStatus::Cancelled,
        Some("tentative") => EventStatus::Tentative,
        _ => EventStatus::Confirmed,
    };

    let mut extra = ge.extra;
    if let Some(uid) = ge.ical_uid {
        extra.insert(ICAL_UID.to_string(), Value::String(uid));
    }

    Ok(CalendarEvent {
        id: ge
            .id
            .ok_or_else(|| GatewayError::ParseError("Missing event id".to_string()))?,
        summary: ge.summary.unwrap_or_default(),
        location: ge.location.unwrap_or_default(),
        start: parse_time("start", ge.start)?,
        end: parse_time("end", ge.end)?,
        attendees: ge.attendees,
        organizer: ge.organizer,
        status,
        reminders: ge.reminders.unwrap_or_default(),
        extra,
    })
}

fn google_event_from_draft(draft: &EventDraft) -> GoogleEvent {
    GoogleEvent {
        id: None,
        ical_uid: None,
        summary: Some(draft.name().to_string()),
        location: Some(draft.location().to_string()),
        start: GoogleDateTime::at(draft.start_timestamp(), Some(EVENT_TIME_ZONE)),
        end: GoogleDateTime::at(draft.end_timestamp(), Some(EVENT_TIME_ZONE)),
        attendees: draft.attendees().to_vec(),
        organizer: None,
        status: None,
        reminders: Some(Reminders::for_new_event()),
        extra: Map::new(),
    }
}

// Full-replacement body: every key the event arrived with goes back unchanged.
fn google_event_from_snapshot(event: &CalendarEvent) -> GoogleEvent {
    GoogleEvent {
        id: Some(event.id.clone()),
        ical_uid: None,
        summary: Some(event.summary.clone()),
        location: Some(event.location.clone()),
        start: GoogleDateTime::from(&event.start),
        end: GoogleDateTime::from(&event.end),
        attendees: event.attendees.clone(),
        organizer: event.organizer.clone(),
        status: Some(status_name(event.status).to_string()),
        reminders: Some(event.reminders.clone()),
        extra: event.extra.clone(),
    }
}

// Imported copies keep the source id as their iCalendar UID and fall back to
// the calendar's default reminders.
fn google_event_for_import(event: &CalendarEvent) -> GoogleEvent {
    let mut extra = event.extra.clone();
    extra.remove(ICAL_UID);

    GoogleEvent {
        id: None,
        ical_uid: Some(event.id.clone()),
        reminders: Some(Reminders::default()),
        status: None,
        extra,
        ..google_event_from_snapshot(event)
    }
}

pub struct GoogleCalendarClient {
    base_url: String,
    calendar_id: String,
    access_token: String,
    client: reqwest::Client,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String) -> Self {
        Self {
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            calendar_id: "primary".to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_calendar_id(mut self, calendar_id: String) -> Self {
        self.calendar_id = calendar_id;
        self
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), urlencoding::encode(event_id))
    }

    async fn check_status(
        response: reqwest::Response,
        action: &str,
        subject: &str,
    ) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        tracing::info!("{} response status: {}", action, status);

        if status == 401 {
            tracing::error!("Authentication failed when trying to {}", action);
            return Err(GatewayError::AuthenticationFailed);
        }

        if status == 404 {
            tracing::error!("Not found: {}", subject);
            return Err(GatewayError::NotFound(subject.to_string()));
        }

        if status == 429 {
            tracing::warn!("Rate limit exceeded");
            return Err(GatewayError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Failed to {}. Status: {}, Body: {}", action, status, body);
            return Err(GatewayError::RequestError(format!("Status {}: {}", status, body)));
        }

        Ok(response)
    }

    async fn read_event(response: reqwest::Response) -> Result<CalendarEvent, GatewayError> {
        let google_event: GoogleEvent = response
            .json()
            .await
            .map_err(|e| GatewayError::ParseError(e.to_string()))?;
        convert_from_google_event(google_event)
    }
}

#[async_trait]
impl CalendarGateway for GoogleCalendarClient {
    async fn list(&self, query: &ListQuery) -> Result<Vec<CalendarEvent>, GatewayError> {
        let url = self.events_url();
        tracing::info!(
            "Fetching events from {} to {:?}",
            query.window.time_min,
            query.window.time_max
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&query.to_params())
            .send()
            .await?;
        let response = Self::check_status(response, "list events", &self.calendar_id).await?;

        let event_list: EventListResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::ParseError(e.to_string()))?;

        let events = event_list
            .items
            .unwrap_or_default()
            .into_iter()
            .map(convert_from_google_event)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| tracing::error!("Malformed event in listing: {}", e))?;

        tracing::info!("Fetched {} events successfully", events.len());
        Ok(events)
    }

    async fn insert(&self, draft: &EventDraft) -> Result<CalendarEvent, GatewayError> {
        let url = self.events_url();
        let google_event = google_event_from_draft(draft);

        tracing::info!("Creating event: {} on {}", draft.name(), draft.start_timestamp());
        tracing::debug!("POST {} with payload: {:?}", url, google_event);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("maxAttendees", MAX_ATTENDEES.to_string())])
            .json(&google_event)
            .send()
            .await?;
        let response = Self::check_status(response, "create event", &self.calendar_id).await?;

        let created = Self::read_event(response).await?;
        tracing::info!("Event created successfully with ID: {}", created.id);
        Ok(created)
    }

    async fn update(&self, id: &str, event: &CalendarEvent) -> Result<CalendarEvent, GatewayError> {
        let url = self.event_url(id);
        let google_event = google_event_from_snapshot(event);

        tracing::info!("Updating event {}: {}", id, event.summary);
        tracing::debug!("PUT {} with payload: {:?}", url, google_event);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(&google_event)
            .send()
            .await?;
        let response = Self::check_status(response, "update event", id).await?;

        Self::read_event(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        let url = self.event_url(id);
        tracing::info!("Deleting event {}", id);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::check_status(response, "delete event", id).await?;

        Ok(())
    }

    async fn move_event(&self, id: &str, destination: &str) -> Result<CalendarEvent, GatewayError> {
        let url = format!("{}/move", self.event_url(id));
        tracing::info!("Moving event {} to {}", id, destination);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("destination", destination)])
            .send()
            .await?;
        let response = Self::check_status(response, "move event", id).await?;

        Self::read_event(response).await
    }

    async fn import(&self, event: &CalendarEvent) -> Result<CalendarEvent, GatewayError> {
        let url = format!("{}/import", self.events_url());
        let google_event = google_event_for_import(event);

        tracing::info!("Importing event {}: {}", event.id, event.summary);
        tracing::debug!("POST {} with payload: {:?}", url, google_event);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&google_event)
            .send()
            .await?;
        let response = Self::check_status(response, "import event", &event.id).await?;

        Self::read_event(response).await
    }
}
