//! Elapsed-time formatting.

const SECONDS_PER_DAY: u64 = 86_400;

/// Formats seconds as `H:MM:SS`, prefixed with `N day(s), ` past one day.
///
/// ```text
/// 3661   -> 1:01:01
/// 90061  -> 1 day, 1:01:01
/// 172800 -> 2 days, 0:00:00
/// ```
#[must_use]
pub fn format_timedelta(seconds: u64) -> String {
    let days = seconds / SECONDS_PER_DAY;
    let rest = seconds % SECONDS_PER_DAY;
    let clock = format!("{}:{:02}:{:02}", rest / 3600, (rest % 3600) / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        _ => format!("{days} days, {clock}"),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, "0:00:00")]
    #[case(59, "0:00:59")]
    #[case(3661, "1:01:01")]
    #[case(86_399, "23:59:59")]
    #[case(90_061, "1 day, 1:01:01")]
    #[case(172_800, "2 days, 0:00:00")]
    fn formats_like_timedelta(#[case] seconds: u64, #[case] expected: &str) {
        assert_eq!(format_timedelta(seconds), expected);
    }
}
