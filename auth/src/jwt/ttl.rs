use chrono::Duration;

use super::errors::TtlError;

/// Parse a token lifetime such as `24h`, `90m`, `1h30m`, `45s` or `500ms`.
///
/// Components are summed, so `1h30m` is ninety minutes. A bare number without
/// a unit is rejected to avoid guessing between seconds and hours.
///
/// # Errors
/// * `Empty` - Input is blank
/// * `InvalidNumber` - A component has no digits or overflows
/// * `UnknownUnit` - A unit other than `ms`, `s`, `m` or `h`
/// * `NotPositive` - The total is zero
pub fn parse_ttl(input: &str) -> Result<Duration, TtlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TtlError::Empty);
    }

    let mut total_millis: i64 = 0;
    let mut rest = input;

    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, tail) = rest.split_at(digits_end);
        if digits.is_empty() {
            return Err(TtlError::InvalidNumber(input.to_string()));
        }

        let unit_end = tail.find(|c: char| c.is_ascii_digit()).unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);

        let multiplier: i64 = match unit {
            "ms" => 1,
            "s" => 1_000,
            "m" => 60 * 1_000,
            "h" => 60 * 60 * 1_000,
            "" => return Err(TtlError::UnknownUnit(format!("missing unit in '{}'", input))),
            other => return Err(TtlError::UnknownUnit(other.to_string())),
        };

        let value: i64 = digits
            .parse()
            .map_err(|_| TtlError::InvalidNumber(digits.to_string()))?;

        total_millis = value
            .checked_mul(multiplier)
            .and_then(|millis| total_millis.checked_add(millis))
            .ok_or_else(|| TtlError::InvalidNumber(input.to_string()))?;

        rest = tail;
    }

    if total_millis == 0 {
        return Err(TtlError::NotPositive);
    }

    Ok(Duration::milliseconds(total_millis))
}
