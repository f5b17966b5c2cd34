//! Date range bounds.

use chrono::{NaiveDate, NaiveTime};

use crate::config::DateResolution;

/// Accepted input formats, tried in order.
const INPUT_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// Renders a date bound as `yyyyMMddHHmmssSSS` truncated to `resolution`.
///
/// Returns `None` when `text` is not a date, in which case the bound is used verbatim.
/// `end_of_day` moves the time to the last millisecond of the day, used for inclusive upper
/// bounds so the whole day matches.
pub fn to_resolution(
    text: &str,
    resolution: DateResolution,
    end_of_day: bool,
) -> Option<String> {
    let date = INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text.trim(), format).ok())?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)?
    };
    let stamp = date.and_time(time).format("%Y%m%d%H%M%S%3f").to_string();
    stamp.get(..width(resolution)).map(String::from)
}

/// Number of leading characters kept for a resolution.
fn width(resolution: DateResolution) -> usize {
    match resolution {
        DateResolution::Year => 4,
        DateResolution::Month => 6,
        DateResolution::Day => 8,
        DateResolution::Hour => 10,
        DateResolution::Minute => 12,
        DateResolution::Second => 14,
        DateResolution::Millisecond => 17,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_resolution() {
        assert_eq!(
            to_resolution("2020-03-15", DateResolution::Year, false).as_deref(),
            Some("2020")
        );
        assert_eq!(
            to_resolution("2020-03-15", DateResolution::Day, false).as_deref(),
            Some("20200315")
        );
        assert_eq!(
            to_resolution("2020-03-15", DateResolution::Millisecond, false).as_deref(),
            Some("20200315000000000")
        );
    }

    #[test]
    fn us_style_dates() {
        assert_eq!(
            to_resolution("03/15/2020", DateResolution::Month, false).as_deref(),
            Some("202003")
        );
    }

    #[test]
    fn end_of_day_for_inclusive_upper_bound() {
        assert_eq!(
            to_resolution("2020-03-15", DateResolution::Second, true).as_deref(),
            Some("20200315235959")
        );
    }

    #[test]
    fn non_dates_are_rejected() {
        assert_eq!(to_resolution("abc", DateResolution::Day, false), None);
        assert_eq!(to_resolution("2020-13-01", DateResolution::Day, false), None);
    }
}
