//! Elapsed recording time formatting

/// Format a duration in milliseconds as `HH:MM:SS.d` (d = tenths of a second).
///
/// Hours are not wrapped, so long sessions keep counting past 99.
pub fn format_elapsed(elapsed_ms: u64) -> String {
    let tenths = (elapsed_ms % 1000) / 100;
    let total_secs = elapsed_ms / 1000;
    let seconds = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    format!("{:02}:{:02}:{:02}.{}", hours, minutes, seconds, tenths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero() {
        assert_eq!(format_elapsed(0), "00:00:00.0");
    }

    #[test]
    fn tenths_truncate() {
        assert_eq!(format_elapsed(199), "00:00:00.1");
        assert_eq!(format_elapsed(999), "00:00:00.9");
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(format_elapsed(61_500), "00:01:01.5");
        assert_eq!(format_elapsed(3_599_900), "00:59:59.9");
    }

    #[test]
    fn hours() {
        assert_eq!(format_elapsed(3_600_000), "01:00:00.0");
        assert_eq!(format_elapsed(100 * 3_600_000), "100:00:00.0");
    }
}
