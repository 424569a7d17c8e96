pub mod attendees;
pub mod datetime;
pub mod draft;
pub mod event;
pub mod lifecycle;
pub mod query;

pub use attendees::{AttendeeList, AttendeeSignal, AttendeeValidator};
pub use datetime::{DateSpec, TimeSpec};
pub use draft::{DraftBuilder, DraftField, EventDraft, Step, ValidationError};
pub use event::{
    Attendee, CalendarEvent, EventStatus, EventTime, Organizer, Reminder, ReminderMethod, Reminders,
    When,
};
pub use lifecycle::{DeleteOutcome, EventLifecycle, LifecycleError};
pub use query::{ListQuery, OrderBy, QueryWindow};
