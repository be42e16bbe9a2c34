//! Human-readable formatting shared by plugins

use std::time::Duration;

const UNITS: [(&str, u128); 5] = [
    ("d", 86_400_000),
    ("h", 3_600_000),
    ("m", 60_000),
    ("s", 1_000),
    ("ms", 1),
];

/// Format a duration using its two largest non-zero units, e.g. `1h 5m`.
/// Sub-millisecond durations are shown in microseconds.
pub fn format_duration_short(duration: Duration) -> String {
    let mut remaining = duration.as_millis();

    if remaining == 0 {
        let micros = duration.as_micros();
        return if micros == 0 {
            "0s".to_string()
        } else {
            format!("{}µs", micros)
        };
    }

    let mut parts = Vec::with_capacity(2);
    for (label, size) in UNITS.iter() {
        let value = remaining / size;
        remaining %= size;

        if value > 0 {
            parts.push(format!("{}{}", value, label));
        }
        if parts.len() == 2 || (!parts.is_empty() && value == 0) {
            break;
        }
    }

    parts.join(" ")
}

/// Join items as `a, b and c` with custom separators.
pub fn join_with_and<S: AsRef<str>>(items: &[S], separator: &str, last_separator: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
            format!("{}{}{}", head.join(separator), last_separator, last.as_ref())
        }
    }
}

/// Singular or plural label for a count
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        plural.to_string()
    }
}
