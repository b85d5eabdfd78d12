use chrono::{DateTime, Utc};

/// Wall clock in milliseconds, stamped on scheduler events.
pub fn time_millis() -> i64 {
    let time: DateTime<Utc> = Utc::now();
    time.timestamp_millis()
}
