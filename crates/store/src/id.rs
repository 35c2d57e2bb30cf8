use chrono::Utc;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A fresh identifier: the current milliseconds in lower-case hex followed by eight
/// random hex digits.
pub fn generate_id() -> String {
    format!("{:x}{:08x}", now_millis(), rand::random::<u32>())
}
