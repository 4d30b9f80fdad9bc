use chrono::NaiveTime;

/// Whether a scheduled time looks like `HH:MM`
pub fn is_schedule_time(time: &str) -> bool {
    time.len() == 5 && NaiveTime::parse_from_str(time, "%H:%M").is_ok()
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_schedule_time() {
        assert!(super::is_schedule_time("08:15"));
        assert!(super::is_schedule_time("23:59"));
        assert!(!super::is_schedule_time("8h15"));
        assert!(!super::is_schedule_time("24:00"));
        assert!(!super::is_schedule_time(""));
    }
}
