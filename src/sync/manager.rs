use std::path::Path;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::calendar::{
    datetime, CalendarEvent, DeleteOutcome, EventDraft, EventLifecycle, LifecycleError, ListQuery,
    QueryWindow,
};
use crate::storage::config::QueryConfig;
use crate::storage::transfer::{self, SchemaError};
use crate::sync::gateway::{CalendarGateway, GatewayError};

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Number of events must be at least 1.")]
    InvalidEventCount,
    #[error("Invalid year: {0}")]
    InvalidYear(i32),
    #[error("Remote calendar error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Import/export error: {0}")]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

pub struct EventManager<G: CalendarGateway> {
    gateway: G,
    window_years: u32,
}

impl<G: CalendarGateway> EventManager<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            window_years: crate::calendar::query::DEFAULT_WINDOW_YEARS,
        }
    }

    pub fn with_query_config(mut self, config: &QueryConfig) -> Self {
        self.window_years = config.window_years;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn lifecycle(&self) -> EventLifecycle<'_> {
        EventLifecycle::new(&self.gateway)
    }

    pub async fn upcoming_events(
        &self,
        starting_at: DateTime<FixedOffset>,
        count: u32,
    ) -> Result<Vec<CalendarEvent>, ManagerError> {
        if count == 0 {
            return Err(ManagerError::InvalidEventCount);
        }

        let query = ListQuery::new(QueryWindow::starting_at(starting_at)).with_max_results(count);
        Ok(self.gateway.list(&query).await?)
    }

    pub async fn events_in_year(&self, year: i32) -> Result<Vec<CalendarEvent>, ManagerError> {
        let window = QueryWindow::year(year).ok_or(ManagerError::InvalidYear(year))?;
        Ok(self.gateway.list(&ListQuery::new(window)).await?)
    }

    pub async fn past_events(&self) -> Result<Vec<CalendarEvent>, ManagerError> {
        let window = QueryWindow::past(datetime::now(), self.window_years);
        Ok(self.gateway.list(&ListQuery::new(window)).await?)
    }

    pub async fn cancelled_past_events(&self) -> Result<Vec<CalendarEvent>, ManagerError> {
        let window = QueryWindow::past(datetime::now(), self.window_years);
        let query = ListQuery::new(window).with_deleted();
        Ok(self.gateway.list(&query).await?)
    }

    pub async fn future_events(&self) -> Result<Vec<CalendarEvent>, ManagerError> {
        let window = QueryWindow::future(datetime::now(), self.window_years);
        Ok(self.gateway.list(&ListQuery::new(window)).await?)
    }

    // Past matches first, then future ones. Matching is case-sensitive.
    pub async fn search(&self, keyword: &str) -> Result<Vec<CalendarEvent>, ManagerError> {
        let past = self.past_events().await?;
        let future = self.future_events().await?;

        let matches: Vec<CalendarEvent> = past
            .into_iter()
            .chain(future)
            .filter(|event| event.summary.contains(keyword))
            .collect();

        tracing::info!("Search for {:?} matched {} events", keyword, matches.len());
        Ok(matches)
    }

    pub async fn create_event(&self, draft: &EventDraft) -> Result<CalendarEvent, ManagerError> {
        let created = self.gateway.insert(draft).await?;
        tracing::info!("Event created: {}", created.summary);
        Ok(created)
    }

    pub async fn cancel_event(&self, event: CalendarEvent) -> Result<CalendarEvent, ManagerError> {
        Ok(self.lifecycle().cancel(event).await?)
    }

    pub async fn restore_event(&self, event: CalendarEvent) -> Result<CalendarEvent, ManagerError> {
        Ok(self.lifecycle().restore(event).await?)
    }

    pub async fn delete_event(
        &self,
        event: Option<&CalendarEvent>,
    ) -> Result<DeleteOutcome, ManagerError> {
        Ok(self.lifecycle().delete(event).await?)
    }

    pub async fn reassign_organizer(
        &self,
        event: &CalendarEvent,
        new_owner: &str,
    ) -> Result<CalendarEvent, ManagerError> {
        Ok(self.lifecycle().reassign_organizer(event, new_owner).await?)
    }

    pub async fn import_event(&self, path: &Path) -> Result<CalendarEvent, ManagerError> {
        let event = transfer::read_event(path)?;
        let imported = self.gateway.import(&event).await?;
        tracing::info!("Successfully imported event `{}`", imported.summary);
        Ok(imported)
    }

    pub fn export_event(&self, event: &CalendarEvent, path: &Path) -> Result<(), ManagerError> {
        transfer::write_event(path, event)?;
        Ok(())
    }
}

pub fn select(events: &[CalendarEvent], position: usize) -> Option<&CalendarEvent> {
    position.checked_sub(1).and_then(|index| events.get(index))
}

pub fn cancelled_only(events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    events.into_iter().filter(CalendarEvent::is_cancelled).collect()
}
