//! Human-readable duration strings: `30m`, `2.5h`, `4d12h`.

/// Parses a duration string into milliseconds.
///
/// Accepts one or more `<number><unit>` segments, optionally separated by
/// whitespace. Fractional values are fine (`2.5h`), and a bare number is
/// taken as milliseconds. Returns `None` for empty input, non-numeric
/// tokens, or unknown unit suffixes.
pub fn parse_duration_ms(raw: &str) -> Option<u64> {
    let input = raw.trim();
    if input.is_empty() {
        return None;
    }

    let mut total_ms = 0.0_f64;
    let mut rest = input;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number_raw, after_number) = rest.split_at(number_end);
        let value = number_raw.parse::<f64>().ok()?;

        let after_number = after_number.trim_start();
        let unit_end = after_number
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(after_number.len());
        let (unit_raw, next) = after_number.split_at(unit_end);

        total_ms += value * unit_multiplier_ms(unit_raw)?;
        rest = next.trim_start();
    }

    if !total_ms.is_finite() || total_ms < 0.0 {
        return None;
    }

    Some(total_ms.round() as u64)
}

fn unit_multiplier_ms(unit: &str) -> Option<f64> {
    let multiplier = match unit.to_ascii_lowercase().as_str() {
        "" | "ms" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000.0,
        "d" | "day" | "days" => 86_400_000.0,
        _ => return None,
    };

    Some(multiplier)
}
