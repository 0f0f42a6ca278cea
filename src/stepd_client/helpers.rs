use chrono::{DateTime, Utc};

pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub fn format_relative_time(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(when);
    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{} min ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{} h ago", duration.num_hours())
    } else {
        format!("{} d ago", duration.num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(
            join_url("http://octopi.local/api/", "/plugin/stepd"),
            "http://octopi.local/api/plugin/stepd"
        );
        assert_eq!(
            join_url("http://octopi.local/api", "plugin/stepd"),
            "http://octopi.local/api/plugin/stepd"
        );
    }

    #[test]
    fn test_format_relative_time() {
        let now = Utc::now();
        assert_eq!(format_relative_time(now - Duration::seconds(5), now), "just now");
        assert_eq!(format_relative_time(now - Duration::minutes(3), now), "3 min ago");
        assert_eq!(format_relative_time(now - Duration::hours(2), now), "2 h ago");
        assert_eq!(format_relative_time(now - Duration::days(4), now), "4 d ago");
    }
}
