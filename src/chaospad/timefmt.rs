use chrono::{DateTime, Utc};
use timeago::Formatter;

/// "3 hours ago", "in 2 days", "now".
pub fn relative_time(timestamp: &DateTime<Utc>) -> String {
    relative_time_at(timestamp, Utc::now())
}

pub fn relative_time_at(timestamp: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let formatter = Formatter::new();
    let elapsed = now.signed_duration_since(*timestamp);
    if elapsed >= chrono::Duration::zero() {
        return formatter.convert(elapsed.to_std().unwrap_or_default());
    }

    let ahead = formatter.convert((-elapsed).to_std().unwrap_or_default());
    match ahead.strip_suffix(" ago") {
        Some(span) => format!("in {span}"),
        None => ahead,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn past_timestamps() {
        let now = noon();
        assert_eq!(relative_time_at(&(now - Duration::hours(3)), now), "3 hours ago");
        assert_eq!(relative_time_at(&(now - Duration::days(1)), now), "1 day ago");
    }

    #[test]
    fn future_timestamps() {
        let now = noon();
        assert_eq!(relative_time_at(&(now + Duration::days(2)), now), "in 2 days");
    }

    #[test]
    fn same_instant_is_now() {
        let now = noon();
        assert_eq!(relative_time_at(&now, now), "now");
    }
}
