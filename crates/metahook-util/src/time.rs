//! Timestamps for invocation records
//!
//! Records use `date +"%F %T.%N"` layout: local date, time, and a nine-digit
//! nanosecond fraction.

use chrono::{DateTime, Local, TimeZone};

/// strftime layout for invocation records
pub const INVOCATION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

/// Format a timestamp for an invocation record
pub fn format_invocation_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(INVOCATION_TIMESTAMP_FORMAT).to_string()
}

/// Build one invocation record line (without trailing newline).
///
/// Arguments are joined with single spaces, so empty arguments leave
/// trailing or doubled spaces exactly as a shell `$@` expansion would.
pub fn format_invocation_line<Tz: TimeZone>(at: &DateTime<Tz>, args: &[String]) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{} {}", format_invocation_timestamp(at), args.join(" "))
}

/// Current local time
pub fn now() -> DateTime<Local> {
    Local::now()
}
