use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::calendar::datetime::fixed_offset;

pub const EVENT_TIME_ZONE: &str = "Australia/Melbourne";

// Serialized form is the remote's own JSON shape and doubles as the export file
// format. Keys this model does not name ride along in `extra` so a write-back
// leaves them as they were.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub location: String,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Organizer>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub reminders: Reminders,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    At(DateTime<FixedOffset>),
    AllDay(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireTime", into = "WireTime")]
pub struct EventTime {
    pub when: When,
    pub time_zone: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_time: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

impl TryFrom<WireTime> for EventTime {
    type Error = String;

    fn try_from(wire: WireTime) -> Result<Self, Self::Error> {
        let when = match (wire.date_time, wire.date) {
            (Some(at), _) => When::At(at),
            (None, Some(day)) => When::AllDay(day),
            (None, None) => return Err("event time needs a dateTime or a date".to_string()),
        };
        Ok(Self {
            when,
            time_zone: wire.time_zone,
        })
    }
}

impl From<EventTime> for WireTime {
    fn from(time: EventTime) -> Self {
        let (date_time, date) = match time.when {
            When::At(at) => (Some(at), None),
            When::AllDay(day) => (None, Some(day)),
        };
        Self {
            date_time,
            date,
            time_zone: time.time_zone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<Reminder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    pub minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Popup,
}

impl Default for Reminders {
    fn default() -> Self {
        Self {
            use_default: true,
            overrides: vec![],
        }
    }
}

impl Reminders {
    pub fn for_new_event() -> Self {
        Self {
            use_default: false,
            overrides: vec![
                Reminder {
                    method: ReminderMethod::Email,
                    minutes: 24 * 60,
                },
                Reminder {
                    method: ReminderMethod::Popup,
                    minutes: 10,
                },
            ],
        }
    }
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }
}

impl Organizer {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }
}

impl EventTime {
    pub fn new(date_time: DateTime<FixedOffset>) -> Self {
        Self {
            when: When::At(date_time),
            time_zone: None,
        }
    }

    pub fn all_day(date: NaiveDate) -> Self {
        Self {
            when: When::AllDay(date),
            time_zone: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self.when {
            When::At(at) => at.date_naive(),
            When::AllDay(day) => day,
        }
    }

    // All-day entries begin at local midnight in the fixed offset.
    pub fn instant(&self) -> DateTime<FixedOffset> {
        match self.when {
            When::At(at) => at,
            When::AllDay(day) => {
                let offset = fixed_offset();
                let midnight = day.and_time(NaiveTime::MIN);
                midnight
                    .checked_sub_offset(offset)
                    .map(|utc| DateTime::from_naive_utc_and_offset(utc, offset))
                    .unwrap_or_else(|| midnight.and_utc().with_timezone(&offset))
            }
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self.when, When::AllDay(_))
    }
}

impl CalendarEvent {
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end.instant() - self.start.instant()).num_minutes()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }

    pub fn organizer_email(&self) -> Option<&str> {
        self.organizer.as_ref().map(|o| o.email.as_str())
    }
}
