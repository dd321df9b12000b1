use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Parse the wire due-date string. The backend emits RFC 3339; a bare
/// `YYYY-MM-DDTHH:MM` from a datetime-local input is accepted too.
pub fn parse_due(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// A task is overdue when it has a due date in the past and is not done.
pub fn is_overdue(due_date: Option<&str>, completed: bool, now: DateTime<Utc>) -> bool {
    if completed {
        return false;
    }
    match due_date.and_then(parse_due) {
        Some(due) => due < now,
        None => false,
    }
}

pub fn is_due_today(due_date: Option<&str>, now: DateTime<Utc>) -> bool {
    match due_date.and_then(parse_due) {
        Some(due) => {
            due.with_timezone(&Local).date_naive() == now.with_timezone(&Local).date_naive()
        }
        None => false,
    }
}

/// Short badge label for the list row.
pub fn due_label(raw: &str) -> String {
    match parse_due(raw) {
        Some(due) => due
            .with_timezone(&Local)
            .format("%b %-d, %H:%M")
            .to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod due_tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).single().expect("fixed now")
    }

    #[test]
    fn past_due_dates_are_overdue_unless_completed() {
        let due = Some("2024-05-19T09:00:00Z");
        assert!(is_overdue(due, false, now()));
        assert!(!is_overdue(due, true, now()));
    }

    #[test]
    fn future_or_missing_due_dates_are_not_overdue() {
        assert!(!is_overdue(Some("2024-05-21T09:00:00Z"), false, now()));
        assert!(!is_overdue(None, false, now()));
        assert!(!is_overdue(Some("not a date"), false, now()));
    }

    #[test]
    fn rfc3339_and_datetime_local_both_parse() {
        assert!(parse_due("2024-05-20T08:30:00Z").is_some());
        assert!(parse_due("2024-05-20T08:30:00+02:00").is_some());
        assert!(parse_due("2024-05-20T08:30").is_some());
        assert!(parse_due("tomorrow").is_none());
    }

    #[test]
    fn unparsable_labels_pass_through() {
        assert_eq!(due_label("someday"), "someday");
    }
}
