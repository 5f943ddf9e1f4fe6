/// Parse a human-readable duration string into seconds.
///
/// Recognized suffixes: `s`, `m`, `h`, `d`. A bare number is taken as
/// seconds. An unrecognized suffix also falls through to the bare numeric
/// value, so `"7x"` parses as 7 seconds; this quirk is long-standing
/// upstream behavior and callers rely on config validation to catch
/// nonsensical values.
pub fn parse_duration_seconds(s: &str) -> i64 {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (digits, suffix) = s.split_at(split);
    let value: i64 = digits.parse().unwrap_or(0);

    match suffix {
        "s" | "" => value,
        "m" => value * 60,
        "h" => value * 3600,
        "d" => value * 86400,
        _ => value,
    }
}
