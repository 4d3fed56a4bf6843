use chrono::Utc;
use tokio::time::Instant;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

/// Parse an `expiry` header as epoch seconds, falling back to `now + default_ttl_seconds`.
/// Leading whitespace and a sign are accepted and anything after the leading digits is
/// ignored, so `"1700000000.0"` reads as `1700000000`.
/// The flag is `true` when the fallback was used.
pub fn expiry_or_default(expiry: &str, now: i64, default_ttl_seconds: u64) -> (i64, bool) {
    match leading_integer(expiry) {
        Some(expires_at) => (expires_at, false),
        None => (
            now.saturating_add(i64::try_from(default_ttl_seconds).unwrap_or(i64::MAX)),
            true,
        ),
    }
}

fn leading_integer(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let sign_len = usize::from(value.starts_with(['+', '-']));
    let digits_len = value[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    value[..sign_len + digits_len].parse().ok()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

#[cfg(test)]
mod tests {
    use super::expiry_or_default;

    #[test]
    fn parses_epoch_seconds() {
        assert_eq!(expiry_or_default("1700000000", 5, 3600), (1_700_000_000, false));
        assert_eq!(expiry_or_default(" 42 ", 5, 3600), (42, false));
        assert_eq!(expiry_or_default("1700000000 ", 5, 3600), (1_700_000_000, false));
        assert_eq!(expiry_or_default("4102444800.0", 5, 3600), (4_102_444_800, false));
        assert_eq!(expiry_or_default("123abc", 5, 3600), (123, false));
        assert_eq!(expiry_or_default("-7", 5, 3600), (-7, false));
    }

    #[test]
    fn malformed_expiry_falls_back() {
        assert_eq!(expiry_or_default("not-a-number", 1_000, 3600), (4_600, true));
        assert_eq!(expiry_or_default("", 1_000, 3600), (4_600, true));
        assert_eq!(expiry_or_default("abc123", 1_000, 60), (1_060, true));
        assert_eq!(expiry_or_default("-", 1_000, 60), (1_060, true));
        assert_eq!(expiry_or_default("99999999999999999999", 1_000, 60), (1_060, true));
    }
}
