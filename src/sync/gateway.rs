use async_trait::async_trait;
use thiserror::Error;

use crate::calendar::{CalendarEvent, EventDraft, ListQuery};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Vec<CalendarEvent>, GatewayError>;

    async fn insert(&self, draft: &EventDraft) -> Result<CalendarEvent, GatewayError>;

    async fn update(&self, id: &str, event: &CalendarEvent) -> Result<CalendarEvent, GatewayError>;

    async fn delete(&self, id: &str) -> Result<(), GatewayError>;

    async fn move_event(&self, id: &str, destination: &str) -> Result<CalendarEvent, GatewayError>;

    async fn import(&self, event: &CalendarEvent) -> Result<CalendarEvent, GatewayError>;
}
