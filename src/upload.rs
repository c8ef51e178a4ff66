//! Uploaded text files: id lists and semicolon-delimited task sheets.

use std::sync::LazyLock;

use jiff::{Timestamp, civil::Date, tz::TimeZone};
use regex::Regex;
use tracing::{debug, warn};

use crate::model::TaskRecord;

static DOTTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})\.(\d{2})\.(\d{4})$").expect("dotted date pattern is valid")
});

static SLASHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("slashed date pattern is valid")
});

/// Formats tried when a date is neither `DD.MM.YYYY` nor `M/D/YYYY`.
const FALLBACK_FORMATS: [&str; 5] = ["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y", "%Y/%m/%d"];

/// Split an id upload into one trimmed id per non-blank line.
pub fn parse_id_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a task sheet: `title;description;due date`, one task per line.
///
/// Lines with fewer than three fields are dropped. A due date that cannot be
/// read leaves the task without one.
pub fn parse_tasks(text: &str) -> Vec<TaskRecord> {
    let tasks: Vec<TaskRecord> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_task_line)
        .collect();
    debug!(count = tasks.len(), "parsed task sheet");
    tasks
}

fn parse_task_line(line: &str) -> Option<TaskRecord> {
    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    if fields.len() < 3 {
        debug!(line, "dropping task line with fewer than three fields");
        return None;
    }

    let title = fields[0].to_string();
    let due_on = if fields[2].is_empty() {
        None
    } else {
        let parsed = parse_due_day(fields[2]);
        if parsed.is_none() {
            warn!(date = fields[2], title = %title, "could not parse due date");
        }
        parsed
    };

    Some(TaskRecord {
        title,
        description: Some(fields[1].to_string()).filter(|d| !d.is_empty()),
        due_on,
    })
}

/// Read a due date as a calendar day.
///
/// `DD.MM.YYYY` is tried first, then the North American `M/D/YYYY`, then a
/// handful of general formats.
pub fn parse_due_day(text: &str) -> Option<Date> {
    if let Some(caps) = DOTTED.captures(text) {
        return civil_date(&caps[3], &caps[2], &caps[1]);
    }
    if let Some(caps) = SLASHED.captures(text) {
        return civil_date(&caps[3], &caps[1], &caps[2]);
    }
    parse_general(text)
}

fn civil_date(year: &str, month: &str, day: &str) -> Option<Date> {
    Date::new(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?).ok()
}

fn parse_general(text: &str) -> Option<Date> {
    if let Ok(date) = text.parse::<Date>() {
        return Some(date);
    }
    if let Ok(ts) = text.parse::<Timestamp>() {
        return Some(ts.to_zoned(TimeZone::UTC).date());
    }
    if let Ok(datetime) = text.parse::<jiff::civil::DateTime>() {
        return Some(datetime.date());
    }
    FALLBACK_FORMATS
        .iter()
        .find_map(|format| Date::strptime(format, text).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    #[test]
    fn id_list_skips_blank_lines_and_trims() {
        let ids = parse_id_list("1001\r\n\n  1002  \n\t\n1003");
        assert_eq!(ids, vec!["1001", "1002", "1003"]);
    }

    #[test]
    fn id_list_of_whitespace_is_empty() {
        assert!(parse_id_list(" \n\r\n ").is_empty());
    }

    #[test]
    fn dotted_date_is_day_month_year() {
        let tasks = parse_tasks("Fix shelf;Shelf broken;25.12.2024");
        assert_eq!(
            tasks,
            vec![TaskRecord {
                title: "Fix shelf".into(),
                description: Some("Shelf broken".into()),
                due_on: Some(date(2024, 12, 25)),
            }]
        );
        assert_eq!(tasks[0].due_date().as_deref(), Some("2024-12-25T23:59:59Z"));
    }

    #[test]
    fn slashed_date_is_month_day_year() {
        let tasks = parse_tasks("Fix shelf;Shelf broken;12/25/2024");
        assert_eq!(tasks[0].due_date().as_deref(), Some("2024-12-25T23:59:59Z"));

        let tasks = parse_tasks("Fix shelf;Shelf broken;3/7/2025");
        assert_eq!(tasks[0].due_on, Some(date(2025, 3, 7)));
    }

    #[test]
    fn iso_dates_fall_through_to_general_parsing() {
        assert_eq!(parse_due_day("2024-12-25"), Some(date(2024, 12, 25)));
        assert_eq!(
            parse_due_day("2024-12-25T10:00:00Z"),
            Some(date(2024, 12, 25))
        );
    }

    #[test]
    fn unreadable_date_keeps_the_task() {
        let tasks = parse_tasks("Fix shelf;Shelf broken;someday");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].due_on, None);
    }

    #[test]
    fn impossible_calendar_day_has_no_due_date() {
        assert_eq!(parse_due_day("31.02.2024"), None);
    }

    #[test]
    fn short_lines_are_dropped() {
        let tasks = parse_tasks("Fix shelf;Shelf broken\nMop floor;Aisle 3;01.02.2025");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Mop floor");
    }

    #[test]
    fn fields_are_trimmed_and_blank_lines_dropped() {
        let tasks = parse_tasks("\n  Fix shelf ;  Shelf broken ; 25.12.2024 \r\n\r\n");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Fix shelf");
        assert_eq!(tasks[0].description.as_deref(), Some("Shelf broken"));
    }

    #[test]
    fn empty_description_and_date_are_absent() {
        let tasks = parse_tasks("Fix shelf;;");
        assert_eq!(tasks[0].description, None);
        assert_eq!(tasks[0].due_on, None);
    }
}
