use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use regex::Regex;

use crate::calendar::ValidationError;

pub const UTC_OFFSET: &str = "+10:00";
pub const UTC_OFFSET_SECONDS: i32 = 10 * 3600;

static TIME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:]{2}):([^:]{2})$").expect("valid time pattern"));

pub fn fixed_offset() -> FixedOffset {
    FixedOffset::east_opt(UTC_OFFSET_SECONDS).expect("offset within a day")
}

pub fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&fixed_offset())
}

pub fn today() -> NaiveDate {
    now().date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn abbreviation(self) -> &'static str {
        match self {
            Month::Jan => "JAN",
            Month::Feb => "FEB",
            Month::Mar => "MAR",
            Month::Apr => "APR",
            Month::May => "MAY",
            Month::Jun => "JUN",
            Month::Jul => "JUL",
            Month::Aug => "AUG",
            Month::Sep => "SEP",
            Month::Oct => "OCT",
            Month::Nov => "NOV",
            Month::Dec => "DEC",
        }
    }

    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_abbreviation(abbr: &str) -> Option<Month> {
        Self::ALL.into_iter().find(|m| m.abbreviation() == abbr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateSpec(NaiveDate);

impl DateSpec {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSpec(NaiveTime);

impl TimeSpec {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

pub fn normalize_date(token: &str) -> Result<String, ValidationError> {
    if token.len() != 9 || !token.is_ascii() {
        return Ok(token.to_string());
    }

    let month = Month::from_abbreviation(&token[3..6])
        .ok_or_else(|| ValidationError::InvalidDate(token.to_string()))?;

    Ok(format!("20{}-{:02}-{}", &token[7..9], month.number(), &token[..2]))
}

pub fn parse_date(token: &str) -> Result<DateSpec, ValidationError> {
    let normalized = normalize_date(token.trim())?;
    if normalized.len() != 10 {
        return Err(ValidationError::InvalidDate(token.to_string()));
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .map(DateSpec)
        .map_err(|_| ValidationError::InvalidDate(token.to_string()))
}

pub fn parse_time(token: &str) -> Result<TimeSpec, ValidationError> {
    let caps = TIME_TOKEN
        .captures(token.trim())
        .ok_or(ValidationError::TimeFormat)?;

    let digits = |s: &str| -> Result<u32, ValidationError> {
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidTime);
        }
        s.parse().map_err(|_| ValidationError::InvalidTime)
    };

    let hour = digits(&caps[1])?;
    let minute = digits(&caps[2])?;

    TimeSpec::from_hm(hour, minute).ok_or(ValidationError::InvalidTime)
}

pub fn format_timestamp(date: DateSpec, time: TimeSpec) -> String {
    format!("{}T{}:00{}", date, time, UTC_OFFSET)
}

pub fn timestamp(date: DateSpec, time: TimeSpec) -> DateTime<FixedOffset> {
    let offset = fixed_offset();
    let local = date.date().and_time(time.time());
    DateTime::from_naive_utc_and_offset(local - offset, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(year: i32, month: u32, day: u32) -> DateSpec {
        DateSpec::new(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    #[test]
    fn compact_date_is_converted_to_iso() {
        assert_eq!(normalize_date("01-DEC-22").unwrap(), "2022-12-01");
    }

    #[test]
    fn iso_date_passes_through_unchanged() {
        assert_eq!(normalize_date("2024-03-15").unwrap(), "2024-03-15");
    }

    #[test]
    fn other_lengths_pass_through_unchanged() {
        assert_eq!(normalize_date("2024-3-15").unwrap(), "2024-3-15");
    }

    #[test]
    fn unknown_month_abbreviation_is_rejected() {
        assert!(matches!(
            normalize_date("01-XYZ-22"),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn lowercase_month_abbreviation_is_rejected() {
        assert!(normalize_date("01-dec-22").is_err());
    }

    #[test]
    fn parse_date_accepts_both_shapes() {
        assert_eq!(parse_date("2030-06-09").unwrap(), date(2030, 6, 9));
        assert_eq!(parse_date("09-JUN-30").unwrap(), date(2030, 6, 9));
    }

    #[test]
    fn parse_date_rejects_impossible_day() {
        assert!(parse_date("2030-02-30").is_err());
        assert!(parse_date("31-APR-30").is_err());
    }

    #[test]
    fn parse_date_rejects_month_out_of_range() {
        assert!(parse_date("2030-13-01").is_err());
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("tomorrow").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn parse_time_accepts_24_hour_clock() {
        let time = parse_time("23:59").unwrap();
        assert_eq!(time.to_string(), "23:59");
    }

    #[test]
    fn parse_time_rejects_single_digit_groups() {
        assert_eq!(parse_time("9:30"), Err(ValidationError::TimeFormat));
        assert_eq!(parse_time("09:3"), Err(ValidationError::TimeFormat));
    }

    #[test]
    fn parse_time_rejects_missing_separator() {
        assert_eq!(parse_time("0930"), Err(ValidationError::TimeFormat));
    }

    #[test]
    fn parse_time_rejects_non_numeric_groups() {
        assert_eq!(parse_time("ab:cd"), Err(ValidationError::InvalidTime));
    }

    #[test]
    fn parse_time_rejects_out_of_range_values() {
        assert_eq!(parse_time("24:00"), Err(ValidationError::InvalidTime));
        assert_eq!(parse_time("12:60"), Err(ValidationError::InvalidTime));
    }

    #[test]
    fn format_timestamp_uses_fixed_offset() {
        let time = TimeSpec::from_hm(16, 30).unwrap();
        assert_eq!(
            format_timestamp(date(2050, 12, 31), time),
            "2050-12-31T16:30:00+10:00"
        );
    }

    #[test]
    fn timestamp_matches_formatted_string() {
        let d = date(2031, 1, 2);
        let t = TimeSpec::from_hm(8, 5).unwrap();
        let parsed = DateTime::parse_from_rfc3339(&format_timestamp(d, t)).unwrap();

        assert_eq!(timestamp(d, t), parsed);
    }

    #[test]
    fn month_table_is_ordered() {
        assert_eq!(Month::Jan.number(), 1);
        assert_eq!(Month::Dec.number(), 12);
        assert_eq!(Month::from_abbreviation("SEP"), Some(Month::Sep));
    }

    proptest! {
        #[test]
        fn compact_dates_normalize_to_equivalent_iso(
            day in 1u32..=28,
            month_index in 0usize..12,
            year in 0u32..=99,
        ) {
            let month = Month::ALL[month_index];
            let token = format!("{:02}-{}-{:02}", day, month.abbreviation(), year);
            let expected = format!("20{:02}-{:02}-{:02}", year, month.number(), day);

            prop_assert_eq!(normalize_date(&token).unwrap(), expected);
            let parsed = parse_date(&token).unwrap();
            prop_assert_eq!(parsed, date(2000 + year as i32, month.number(), day));
        }
    }
}
