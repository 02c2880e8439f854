use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::error::ArchiverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn ordinal(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_ordinal(ordinal: u32) -> Option<Month> {
        ordinal
            .checked_sub(1)
            .and_then(|index| Month::ALL.get(index as usize))
            .copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Month {
    type Err = ArchiverError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Month::ALL
            .into_iter()
            .find(|month| month.name().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| ArchiverError::InvalidMonthLabel(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportingMonth {
    pub month: Month,
    pub year: i32,
}

impl ReportingMonth {
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    pub fn from_timestamp(epoch_seconds: i64) -> Result<Self, ArchiverError> {
        let start = Utc.timestamp_opt(epoch_seconds, 0).single().ok_or_else(|| {
            ArchiverError::MalformedResponse(format!("invalid start time {epoch_seconds}"))
        })?;
        Ok(Self::from_datetime(start))
    }

    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        let month = Month::from_ordinal(value.month()).unwrap_or(Month::January);
        Self {
            month,
            year: value.year(),
        }
    }

    pub fn tab_title(&self) -> String {
        self.year.to_string()
    }

    pub fn header_label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

impl fmt::Display for ReportingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportPeriod {
    #[default]
    LastMonth,
    ThisMonth,
    Month(ReportingMonth),
}

impl ReportPeriod {
    pub fn window(&self, now: DateTime<Utc>) -> Result<UptimeWindow, ArchiverError> {
        let this_month = month_start(now.year(), now.month())?;
        match self {
            ReportPeriod::LastMonth => {
                let start = shift_months(this_month, -1)?;
                Ok(UptimeWindow {
                    start,
                    end: this_month,
                })
            }
            ReportPeriod::ThisMonth => Ok(UptimeWindow {
                start: this_month,
                end: now,
            }),
            ReportPeriod::Month(target) => {
                let start = month_start(target.year, target.month.ordinal())?;
                let end = shift_months(start, 1)?;
                Ok(UptimeWindow { start, end })
            }
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportPeriod::LastMonth => write!(f, "LastMonth"),
            ReportPeriod::ThisMonth => write!(f, "ThisMonth"),
            ReportPeriod::Month(target) => {
                write!(f, "{:04}-{:02}", target.year, target.month.ordinal())
            }
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = ArchiverError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("lastmonth") {
            return Ok(ReportPeriod::LastMonth);
        }
        if trimmed.eq_ignore_ascii_case("thismonth") {
            return Ok(ReportPeriod::ThisMonth);
        }
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| ArchiverError::InvalidPeriod(value.to_string()))?;
        let year = year
            .parse::<i32>()
            .ok()
            .filter(|_| year.len() == 4)
            .ok_or_else(|| ArchiverError::InvalidPeriod(value.to_string()))?;
        let month = month
            .parse::<u32>()
            .ok()
            .and_then(Month::from_ordinal)
            .ok_or_else(|| ArchiverError::InvalidPeriod(value.to_string()))?;
        Ok(ReportPeriod::Month(ReportingMonth::new(month, year)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub check: String,
    pub uptime: f64,
}

impl MetricSample {
    pub fn new(check: impl Into<String>, uptime: f64) -> Self {
        Self {
            check: check.into(),
            uptime,
        }
    }

    pub fn cell_value(&self) -> String {
        format!("{:.3}", self.uptime)
    }
}

fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>, ArchiverError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ArchiverError::InvalidPeriod(format!("{year:04}-{month:02}")))
}

fn shift_months(value: DateTime<Utc>, delta: i32) -> Result<DateTime<Utc>, ArchiverError> {
    let shifted = if delta >= 0 {
        value.checked_add_months(Months::new(delta as u32))
    } else {
        value.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.ok_or_else(|| ArchiverError::InvalidPeriod(format!("{value} shifted by {delta}")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_month_names() {
        assert_eq!("march".parse::<Month>().unwrap(), Month::March);
        assert_eq!(" DECEMBER ".parse::<Month>().unwrap(), Month::December);
        assert_matches!(
            "Smarch".parse::<Month>(),
            Err(ArchiverError::InvalidMonthLabel(_))
        );
    }

    #[test]
    fn last_month_crosses_year_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap();
        let window = ReportPeriod::LastMonth.window(now).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let target = ReportingMonth::from_datetime(window.start);
        assert_eq!(target.tab_title(), "2023");
        assert_eq!(target.header_label(), "December 2023");
    }

    #[test]
    fn parse_explicit_period() {
        let period: ReportPeriod = "2024-02".parse().unwrap();
        assert_eq!(
            period,
            ReportPeriod::Month(ReportingMonth::new(Month::February, 2024))
        );
        assert_eq!(period.to_string(), "2024-02");
        assert_matches!(
            "2024-13".parse::<ReportPeriod>(),
            Err(ArchiverError::InvalidPeriod(_))
        );
    }
}
