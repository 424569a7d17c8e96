use chrono::{DateTime, FixedOffset, Months, NaiveDate, NaiveDateTime, SecondsFormat};

use crate::calendar::datetime::{self, fixed_offset};

pub const DEFAULT_WINDOW_YEARS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub time_min: DateTime<FixedOffset>,
    pub time_max: Option<DateTime<FixedOffset>>,
}

impl QueryWindow {
    pub fn past(now: DateTime<FixedOffset>, years: u32) -> Self {
        let from = span(years)
            .and_then(|months| now.checked_sub_months(months))
            .unwrap_or(now);
        Self {
            time_min: from,
            time_max: Some(now),
        }
    }

    pub fn future(now: DateTime<FixedOffset>, years: u32) -> Self {
        let to = span(years)
            .and_then(|months| now.checked_add_months(months))
            .unwrap_or(now);
        Self {
            time_min: now,
            time_max: Some(to),
        }
    }

    // January 1st 00:00:00 through December 31st 23:59:59 at the fixed offset.
    pub fn year(year: i32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
        let last = NaiveDate::from_ymd_opt(year, 12, 31)?.and_hms_opt(23, 59, 59)?;

        Some(Self {
            time_min: at_fixed_offset(first)?,
            time_max: Some(at_fixed_offset(last)?),
        })
    }

    pub fn starting_at(start: DateTime<FixedOffset>) -> Self {
        Self {
            time_min: start,
            time_max: None,
        }
    }

    pub fn time_min_rfc3339(&self) -> String {
        render(self.time_min)
    }

    pub fn time_max_rfc3339(&self) -> Option<String> {
        self.time_max.map(render)
    }
}

fn span(years: u32) -> Option<Months> {
    years.checked_mul(12).map(Months::new)
}

fn at_fixed_offset(local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    let offset = fixed_offset();
    local
        .checked_sub_offset(offset)
        .map(|utc| DateTime::from_naive_utc_and_offset(utc, offset))
}

fn render(ts: DateTime<FixedOffset>) -> String {
    ts.with_timezone(&datetime::fixed_offset())
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    StartTime,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::StartTime => "startTime",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub window: QueryWindow,
    pub max_results: Option<u32>,
    pub single_events: bool,
    pub order_by: OrderBy,
    pub show_deleted: bool,
}

impl ListQuery {
    pub fn new(window: QueryWindow) -> Self {
        Self {
            window,
            max_results: None,
            single_events: true,
            order_by: OrderBy::StartTime,
            show_deleted: false,
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_deleted(mut self) -> Self {
        self.show_deleted = true;
        self
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("timeMin", self.window.time_min_rfc3339())];
        if let Some(max) = self.window.time_max_rfc3339() {
            params.push(("timeMax", max));
        }
        if let Some(n) = self.max_results {
            params.push(("maxResults", n.to_string()));
        }
        params.push(("singleEvents", self.single_events.to_string()));
        params.push(("orderBy", self.order_by.as_str().to_string()));
        if self.show_deleted {
            params.push(("showDeleted", "true".to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn year_view_spans_whole_year_at_fixed_offset() {
        let window = QueryWindow::year(2022).unwrap();

        assert_eq!(window.time_min_rfc3339(), "2022-01-01T00:00:00+10:00");
        assert_eq!(window.time_max_rfc3339().unwrap(), "2022-12-31T23:59:59+10:00");
    }

    #[test]
    fn past_window_reaches_back_five_years() {
        let now = at("2026-10-16T09:15:00+10:00");
        let window = QueryWindow::past(now, DEFAULT_WINDOW_YEARS);

        assert_eq!(window.time_min_rfc3339(), "2021-10-16T09:15:00+10:00");
        assert_eq!(window.time_max, Some(now));
    }

    #[test]
    fn future_window_reaches_forward_five_years() {
        let now = at("2026-10-16T09:15:00+10:00");
        let window = QueryWindow::future(now, DEFAULT_WINDOW_YEARS);

        assert_eq!(window.time_min, now);
        assert_eq!(window.time_max_rfc3339().unwrap(), "2031-10-16T09:15:00+10:00");
    }

    #[test]
    fn leap_day_window_clamps_to_month_end() {
        let now = at("2028-02-29T12:00:00+10:00");
        let window = QueryWindow::past(now, 5);

        assert_eq!(window.time_min.year(), 2023);
        assert_eq!(window.time_min.day(), 28);
    }

    #[test]
    fn year_at_the_edge_of_the_calendar_is_rejected() {
        assert_eq!(QueryWindow::year(NaiveDate::MIN.year()), None);
        assert_eq!(QueryWindow::year(-262144), None);
        assert_eq!(QueryWindow::year(i32::MAX), None);
    }

    #[test]
    fn oversized_window_stays_at_now() {
        let now = at("2026-10-16T09:15:00+10:00");

        assert_eq!(QueryWindow::past(now, u32::MAX).time_min, now);
        assert_eq!(QueryWindow::future(now, 400_000_000).time_max, Some(now));
    }

    #[test]
    fn utc_timestamps_render_in_fixed_offset() {
        let window = QueryWindow::starting_at(at("2030-01-01T00:00:00Z"));

        assert_eq!(window.time_min_rfc3339(), "2030-01-01T10:00:00+10:00");
        assert_eq!(window.time_max_rfc3339(), None);
    }

    #[test]
    fn list_params_carry_ordering_and_expansion() {
        let query = ListQuery::new(QueryWindow::year(2030).unwrap())
            .with_max_results(10)
            .with_deleted();

        let params = query.to_params();

        assert!(params.contains(&("singleEvents", "true".to_string())));
        assert!(params.contains(&("orderBy", "startTime".to_string())));
        assert!(params.contains(&("maxResults", "10".to_string())));
        assert!(params.contains(&("showDeleted", "true".to_string())));
    }

    #[test]
    fn deleted_events_hidden_by_default() {
        let query = ListQuery::new(QueryWindow::year(2030).unwrap());

        assert!(!query.to_params().iter().any(|(k, _)| *k == "showDeleted"));
    }
}
