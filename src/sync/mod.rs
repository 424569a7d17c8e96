pub mod gateway;
pub mod google_api;
pub mod manager;

pub use gateway::{CalendarGateway, GatewayError};
pub use google_api::GoogleCalendarClient;
pub use manager::{EventManager, ManagerError};
