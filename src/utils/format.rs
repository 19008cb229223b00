//! Human-readable time formatting

/// Format seconds as zero-padded `MM:SS`
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(1500), "25:00");
    }

    #[test]
    fn long_intervals_keep_counting_minutes() {
        assert_eq!(format_time(120 * 60 + 9), "120:09");
    }
}
