//! Conversion of raw schedule fields into report-ready values.
//!
//! Start times look like `"Wednesday, Nov 28, 5:30 PM"` and carry no year;
//! end times look like `"6:30 PM"` and carry no date at all.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use tracing::warn;

use super::errors::ScheduleError;
use super::wire::ScheduleFields;

/// `"Nov 28, 5:30 PM 2018"`: the start time minus its weekday, plus the year.
const START_INPUT_FORMAT: &str = "%b %d, %I:%M %p %Y";
const END_INPUT_FORMAT: &str = "%I:%M %p";

const START_OUTPUT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const END_OUTPUT_FORMAT: &str = "%H:%M:%S";

/// Normalized timing and location for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleInfo {
    pub start: NaiveDateTime,
    /// Time of day only. Not guaranteed to fall on the start date.
    pub end: NaiveTime,
    pub room: Option<String>,
    /// Weekday label exactly as the catalog printed it.
    pub weekday: String,
}

impl ScheduleInfo {
    /// Normalize decoded fields, anchoring the start date to `year`.
    pub fn from_fields(fields: &ScheduleFields, year: i32) -> Result<Self, ScheduleError> {
        let start_raw = fields
            .start_time
            .as_deref()
            .ok_or(ScheduleError::Missing { field: "startTime" })?;
        let end_raw = fields
            .end_time
            .as_deref()
            .ok_or(ScheduleError::Missing { field: "endTime" })?;

        let start = parse_start(start_raw, year)?;
        let weekday = weekday_label(start_raw).to_string();

        if let Ok(labelled) = weekday.trim().parse::<Weekday>()
            && labelled != start.weekday()
        {
            warn!(
                start_time = start_raw,
                year,
                computed = %start.weekday(),
                "weekday label disagrees with the configured event year"
            );
        }

        Ok(Self {
            start,
            end: parse_end(end_raw)?,
            room: fields.room.clone(),
            weekday,
        })
    }

    /// Start as `28/11/2018 17:30:00`.
    pub fn start_display(&self) -> String {
        self.start.format(START_OUTPUT_FORMAT).to_string()
    }

    /// End as `18:30:00`.
    pub fn end_display(&self) -> String {
        self.end.format(END_OUTPUT_FORMAT).to_string()
    }
}

/// Text before the first comma: `"Wednesday, Nov 28, 5:30 PM"` → `"Wednesday"`.
pub fn weekday_label(start: &str) -> &str {
    start.split_once(',').map_or(start, |(day, _)| day)
}

/// Parse `"<Weekday>, <Mon> <day>, <h>:<mm> <AM|PM>"` in the given year.
///
/// The label must name a weekday, but the date comes from the month and day
/// alone, so a year that does not match the label still yields the calendar
/// date the label sits beside.
pub fn parse_start(value: &str, year: i32) -> Result<NaiveDateTime, ScheduleError> {
    let (label, date_part) = value.split_once(',').unwrap_or(("", value));
    label
        .trim()
        .parse::<Weekday>()
        .map_err(|source| ScheduleError::UnknownWeekday {
            value: value.to_string(),
            source,
        })?;

    NaiveDateTime::parse_from_str(&format!("{} {year}", date_part.trim()), START_INPUT_FORMAT)
        .map_err(|source| ScheduleError::MalformedTime {
            field: "startTime",
            value: value.to_string(),
            source,
        })
}

/// Parse `"<h>:<mm> <AM|PM>"`.
pub fn parse_end(value: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(value.trim(), END_INPUT_FORMAT).map_err(|source| {
        ScheduleError::MalformedTime {
            field: "endTime",
            value: value.to_string(),
            source,
        }
    })
}
