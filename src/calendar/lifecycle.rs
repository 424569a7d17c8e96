use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar::{datetime, CalendarEvent, EventStatus};
use crate::sync::gateway::{CalendarGateway, GatewayError};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Event `{0}` is already cancelled")]
    AlreadyCancelled(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { id: String, summary: String },
    NoEvents,
    NotInPast,
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteOutcome::Deleted { summary, .. } => {
                write!(f, "Event: {} - Successfully Deleted", summary)
            }
            DeleteOutcome::NoEvents => write!(f, "There are no events to delete."),
            DeleteOutcome::NotInPast => write!(f, "Cannot delete a present or future event."),
        }
    }
}

// Deletion is only allowed once the event's start date lies strictly before
// `today`. Same-day events are refused whatever the clock time.
pub fn deletion_allowed(event: &CalendarEvent, today: NaiveDate) -> bool {
    (today - event.start_date()).num_days() > 0
}

pub struct EventLifecycle<'g> {
    gateway: &'g dyn CalendarGateway,
}

impl<'g> EventLifecycle<'g> {
    pub fn new(gateway: &'g dyn CalendarGateway) -> Self {
        Self { gateway }
    }

    pub async fn cancel(&self, mut event: CalendarEvent) -> Result<CalendarEvent, LifecycleError> {
        if event.is_cancelled() {
            tracing::warn!("Refusing to cancel {}: already cancelled", event.id);
            return Err(LifecycleError::AlreadyCancelled(event.id));
        }

        event.status = EventStatus::Cancelled;
        tracing::info!("Cancelling event {}: {}", event.id, event.summary);
        let updated = self.gateway.update(&event.id, &event).await?;
        Ok(updated)
    }

    pub async fn restore(&self, mut event: CalendarEvent) -> Result<CalendarEvent, LifecycleError> {
        event.status = EventStatus::Confirmed;
        tracing::info!("Restoring event {}: {}", event.id, event.summary);
        let updated = self.gateway.update(&event.id, &event).await?;
        Ok(updated)
    }

    pub async fn delete(&self, event: Option<&CalendarEvent>) -> Result<DeleteOutcome, LifecycleError> {
        self.delete_as_of(event, datetime::today()).await
    }

    pub async fn delete_as_of(
        &self,
        event: Option<&CalendarEvent>,
        today: NaiveDate,
    ) -> Result<DeleteOutcome, LifecycleError> {
        let Some(event) = event else {
            return Ok(DeleteOutcome::NoEvents);
        };

        if !deletion_allowed(event, today) {
            tracing::warn!("Refusing to delete {}: starts {}", event.id, event.start_date());
            return Ok(DeleteOutcome::NotInPast);
        }

        tracing::info!("Deleting event {}: {}", event.id, event.summary);
        self.gateway.delete(&event.id).await?;

        Ok(DeleteOutcome::Deleted {
            id: event.id.clone(),
            summary: event.summary.clone(),
        })
    }

    pub async fn reassign_organizer(
        &self,
        event: &CalendarEvent,
        new_owner: &str,
    ) -> Result<CalendarEvent, LifecycleError> {
        tracing::info!("Moving event {} to {}", event.id, new_owner);
        let moved = self.gateway.move_event(&event.id, new_owner).await?;
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::event::tests::sample_event;
    use crate::sync::gateway::MockCalendarGateway;
    use chrono::{DateTime, Duration, FixedOffset};

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn day(year: i32, month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, d).unwrap()
    }

    #[test]
    fn yesterday_is_deletable_today_is_not() {
        let today = day(2030, 6, 15);

        let yesterday = sample_event("a", "Old", at("2030-06-14T23:59:00+10:00"));
        let this_morning = sample_event("b", "Now", at("2030-06-15T00:01:00+10:00"));
        let tomorrow = sample_event("c", "Soon", at("2030-06-16T09:00:00+10:00"));

        assert!(deletion_allowed(&yesterday, today));
        assert!(!deletion_allowed(&this_morning, today));
        assert!(!deletion_allowed(&tomorrow, today));
    }

    #[tokio::test]
    async fn delete_without_event_reports_nothing_to_delete() {
        let gateway = MockCalendarGateway::new();
        let lifecycle = EventLifecycle::new(&gateway);

        let outcome = lifecycle.delete(None).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::NoEvents);
        assert_eq!(outcome.to_string(), "There are no events to delete.");
    }

    #[tokio::test]
    async fn delete_of_future_event_is_refused_without_remote_call() {
        let mut gateway = MockCalendarGateway::new();
        gateway.expect_delete().never();
        let lifecycle = EventLifecycle::new(&gateway);
        let event = sample_event("future", "Later", datetime::now() + Duration::days(1));

        let outcome = lifecycle.delete(Some(&event)).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::NotInPast);
        assert_eq!(outcome.to_string(), "Cannot delete a present or future event.");
    }

    #[tokio::test]
    async fn delete_of_event_starting_now_is_refused() {
        let mut gateway = MockCalendarGateway::new();
        gateway.expect_delete().never();
        let lifecycle = EventLifecycle::new(&gateway);
        let event = sample_event("now", "Now", datetime::now());

        let outcome = lifecycle.delete(Some(&event)).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::NotInPast);
    }

    #[tokio::test]
    async fn delete_of_yesterdays_event_calls_remote_once() {
        let mut gateway = MockCalendarGateway::new();
        gateway
            .expect_delete()
            .withf(|id| id == "past")
            .times(1)
            .returning(|_| Ok(()));
        let lifecycle = EventLifecycle::new(&gateway);
        let event = sample_event("past", "Done", datetime::now() - Duration::days(1));

        let outcome = lifecycle.delete(Some(&event)).await.unwrap();

        assert_eq!(
            outcome,
            DeleteOutcome::Deleted {
                id: "past".to_string(),
                summary: "Done".to_string()
            }
        );
    }

    #[tokio::test]
    async fn delete_propagates_remote_failure() {
        let mut gateway = MockCalendarGateway::new();
        gateway
            .expect_delete()
            .times(1)
            .returning(|_| Err(GatewayError::AuthenticationFailed));
        let lifecycle = EventLifecycle::new(&gateway);
        let event = sample_event("past", "Done", at("2020-01-01T10:00:00+10:00"));

        let result = lifecycle.delete_as_of(Some(&event), day(2030, 1, 1)).await;

        assert!(matches!(
            result,
            Err(LifecycleError::Gateway(GatewayError::AuthenticationFailed))
        ));
    }

    #[tokio::test]
    async fn cancel_then_restore_updates_twice() {
        let mut gateway = MockCalendarGateway::new();
        gateway
            .expect_update()
            .times(2)
            .returning(|_, event| Ok(event.clone()));
        let lifecycle = EventLifecycle::new(&gateway);
        let event = sample_event("e1", "Lecture", at("2030-03-01T10:00:00+10:00"));

        let cancelled = lifecycle.cancel(event).await.unwrap();
        assert_eq!(cancelled.status, EventStatus::Cancelled);

        let restored = lifecycle.restore(cancelled).await.unwrap();
        assert_eq!(restored.status, EventStatus::Confirmed);
    }

    #[tokio::test]
    async fn cancel_sends_cancelled_status_to_remote() {
        let mut gateway = MockCalendarGateway::new();
        gateway
            .expect_update()
            .withf(|id, event| id == "e1" && event.status == EventStatus::Cancelled)
            .times(1)
            .returning(|_, event| Ok(event.clone()));
        let lifecycle = EventLifecycle::new(&gateway);

        let event = sample_event("e1", "Lecture", at("2030-03-01T10:00:00+10:00"));
        lifecycle.cancel(event).await.unwrap();
    }

    #[tokio::test]
    async fn cancelling_cancelled_event_is_refused() {
        let mut gateway = MockCalendarGateway::new();
        gateway.expect_update().never();
        let lifecycle = EventLifecycle::new(&gateway);
        let mut event = sample_event("e1", "Lecture", at("2030-03-01T10:00:00+10:00"));
        event.status = EventStatus::Cancelled;

        let result = lifecycle.cancel(event).await;

        assert!(matches!(result, Err(LifecycleError::AlreadyCancelled(id)) if id == "e1"));
    }

    #[tokio::test]
    async fn reassign_moves_event_to_new_owner() {
        let mut gateway = MockCalendarGateway::new();
        gateway
            .expect_move_event()
            .withf(|id, dest| id == "e1" && dest == "new@student.monash.edu")
            .times(1)
            .returning(|id, dest| {
                let mut moved = sample_event(id, "Lecture", at("2030-03-01T10:00:00+10:00"));
                moved.organizer = Some(crate::calendar::Organizer::new(dest));
                Ok(moved)
            });
        let lifecycle = EventLifecycle::new(&gateway);
        let event = sample_event("e1", "Lecture", at("2030-03-01T10:00:00+10:00"));

        let moved = lifecycle
            .reassign_organizer(&event, "new@student.monash.edu")
            .await
            .unwrap();

        assert_eq!(moved.organizer_email(), Some("new@student.monash.edu"));
    }
}
