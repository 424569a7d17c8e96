pub mod calendar;
pub mod storage;
pub mod sync;

pub use calendar::{CalendarEvent, DraftBuilder, EventDraft, EventStatus, ValidationError};
pub use sync::{CalendarGateway, EventManager, GoogleCalendarClient};
