use std::cmp::Ordering;

use crate::domain::Month;
use crate::error::ArchiverError;

pub fn month_ordinal(label: &str) -> Result<u32, ArchiverError> {
    let leading = label.split_whitespace().next().unwrap_or("");
    leading
        .parse::<Month>()
        .map(Month::ordinal)
        .map_err(|_| ArchiverError::InvalidMonthLabel(label.to_string()))
}

pub fn compare_check_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}

pub fn same_check(left: &str, right: &str) -> bool {
    compare_check_names(left, right) == Ordering::Equal
}
