use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use thiserror::Error;

use crate::calendar::attendees::{AttendeeList, AttendeeSignal, AttendeeValidator};
use crate::calendar::datetime::{self, DateSpec, TimeSpec};
use crate::calendar::Attendee;

pub const MAX_YEAR: i32 = 2050;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid date '{0}'. Use YYYY-MM-DD or DD-MON-YY.")]
    InvalidDate(String),
    #[error("Unable to create events beyond the year {0}.")]
    BeyondMaxYear(i32),
    #[error("Unable to create events in the past.")]
    InPast,
    #[error("The ending date must be on or after the starting date.")]
    EndDateBeforeStart,
    #[error("Please enter the time in 24-hour format as prompted.")]
    TimeFormat,
    #[error("Invalid input.")]
    InvalidTime,
    #[error("The ending time must be after starting time.")]
    EndNotAfterStart,
    #[error("Attendee does not belong your native domain.")]
    AttendeeDomain(String),
    #[error("Event details are incomplete.")]
    Incomplete,
}

pub fn validate_start_date(
    token: &str,
    today: NaiveDate,
    max_year: i32,
) -> Result<DateSpec, ValidationError> {
    let date = datetime::parse_date(token)?;
    if date.date().year() > max_year {
        return Err(ValidationError::BeyondMaxYear(max_year));
    }
    if date.date() < today {
        return Err(ValidationError::InPast);
    }
    Ok(date)
}

pub fn validate_end_date(token: &str, start: DateSpec) -> Result<DateSpec, ValidationError> {
    let date = datetime::parse_date(token)?;
    if date < start {
        return Err(ValidationError::EndDateBeforeStart);
    }
    Ok(date)
}

pub fn validate_end_time(
    token: &str,
    start_date: DateSpec,
    start_time: TimeSpec,
    end_date: DateSpec,
) -> Result<TimeSpec, ValidationError> {
    let end_time = datetime::parse_time(token)?;
    if datetime::timestamp(end_date, end_time) <= datetime::timestamp(start_date, start_time) {
        return Err(ValidationError::EndNotAfterStart);
    }
    Ok(end_time)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    name: String,
    location: String,
    attendees: Vec<Attendee>,
    start_date: DateSpec,
    start_time: TimeSpec,
    end_date: DateSpec,
    end_time: TimeSpec,
}

impl EventDraft {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn attendees(&self) -> &[Attendee] {
        &self.attendees
    }

    pub fn start_date(&self) -> DateSpec {
        self.start_date
    }

    pub fn start_time(&self) -> TimeSpec {
        self.start_time
    }

    pub fn end_date(&self) -> DateSpec {
        self.end_date
    }

    pub fn end_time(&self) -> TimeSpec {
        self.end_time
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        datetime::timestamp(self.start_date, self.start_time)
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        datetime::timestamp(self.end_date, self.end_time)
    }

    pub fn start_timestamp(&self) -> String {
        datetime::format_timestamp(self.start_date, self.start_time)
    }

    pub fn end_timestamp(&self) -> String {
        datetime::format_timestamp(self.end_date, self.end_time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Location,
    Attendees,
    StartDate,
    StartTime,
    EndDate,
    EndTime,
    Done,
}

impl DraftField {
    pub fn prompt(self) -> &'static str {
        match self {
            DraftField::Name => "Please provide a name for your event: ",
            DraftField::Location => "Please enter the location for your event: ",
            DraftField::Attendees => {
                "Please the email address of an attendee (press enter if you are finished): "
            }
            DraftField::StartDate => {
                "Please enter the starting date of your event (YYYY-MM-DD/DD-MON-YY): "
            }
            DraftField::StartTime => {
                "Please enter the starting time for your event in 24-hour format (23:59): "
            }
            DraftField::EndDate => {
                "Please enter the ending date of your event (YYYY-MM-DD/DD-MON-YY): "
            }
            DraftField::EndTime => {
                "Please enter the ending time for your event in 24-hour format (i.e. 23:59): "
            }
            DraftField::Done => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next(DraftField),
    AttendeeCapReached(DraftField),
}

// Walks the event fields in a fixed order. A rejected submission keeps the
// current field so the caller can ask again.
#[derive(Debug, Clone)]
pub struct DraftBuilder {
    today: NaiveDate,
    max_year: i32,
    field: DraftField,
    name: String,
    location: String,
    attendees: AttendeeList,
    start_date: Option<DateSpec>,
    start_time: Option<TimeSpec>,
    end_date: Option<DateSpec>,
    end_time: Option<TimeSpec>,
}

impl DraftBuilder {
    pub fn new(validator: AttendeeValidator, today: NaiveDate, max_year: i32) -> Self {
        Self {
            today,
            max_year,
            field: DraftField::Name,
            name: String::new(),
            location: String::new(),
            attendees: AttendeeList::new(validator),
            start_date: None,
            start_time: None,
            end_date: None,
            end_time: None,
        }
    }

    pub fn field(&self) -> DraftField {
        self.field
    }

    pub fn prompt(&self) -> &'static str {
        self.field.prompt()
    }

    pub fn is_complete(&self) -> bool {
        self.field == DraftField::Done
    }

    pub fn submit(&mut self, input: &str) -> Result<Step, ValidationError> {
        let next = match self.field {
            DraftField::Name => {
                self.name = input.to_string();
                DraftField::Location
            }
            DraftField::Location => {
                self.location = input.to_string();
                if self.attendees.is_full() {
                    DraftField::StartDate
                } else {
                    DraftField::Attendees
                }
            }
            DraftField::Attendees => match self.attendees.offer(input)? {
                AttendeeSignal::Accepted => DraftField::Attendees,
                AttendeeSignal::Finished => DraftField::StartDate,
                AttendeeSignal::CapReached => {
                    self.field = DraftField::StartDate;
                    return Ok(Step::AttendeeCapReached(self.field));
                }
            },
            DraftField::StartDate => {
                self.start_date = Some(validate_start_date(input, self.today, self.max_year)?);
                DraftField::StartTime
            }
            DraftField::StartTime => {
                self.start_time = Some(datetime::parse_time(input)?);
                DraftField::EndDate
            }
            DraftField::EndDate => {
                let start = self.start_date.ok_or(ValidationError::Incomplete)?;
                self.end_date = Some(validate_end_date(input, start)?);
                DraftField::EndTime
            }
            DraftField::EndTime => {
                let (start_date, start_time, end_date) =
                    match (self.start_date, self.start_time, self.end_date) {
                        (Some(sd), Some(st), Some(ed)) => (sd, st, ed),
                        _ => return Err(ValidationError::Incomplete),
                    };
                self.end_time = Some(validate_end_time(input, start_date, start_time, end_date)?);
                DraftField::Done
            }
            DraftField::Done => DraftField::Done,
        };

        self.field = next;
        Ok(Step::Next(next))
    }

    pub fn finish(self) -> Result<EventDraft, ValidationError> {
        match (self.start_date, self.start_time, self.end_date, self.end_time) {
            (Some(start_date), Some(start_time), Some(end_date), Some(end_time))
                if self.field == DraftField::Done =>
            {
                Ok(EventDraft {
                    name: self.name,
                    location: self.location,
                    attendees: self.attendees.into_attendees(),
                    start_date,
                    start_time,
                    end_date,
                    end_time,
                })
            }
            _ => Err(ValidationError::Incomplete),
        }
    }
}
