//! Millisecond helpers shared by the timer, course and recovery code.

/// Current wall-clock time as epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub const fn minutes(n: u64) -> u64 {
    n.saturating_mul(60_000)
}

/// Render a duration as `MM:SS`, truncating sub-second remainders.
///
/// Minutes are not wrapped into hours, so 90 minutes renders as `90:00`.
pub fn format_mmss(total_ms: u64) -> String {
    let secs = total_ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
