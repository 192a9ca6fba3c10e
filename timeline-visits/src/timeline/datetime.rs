use chrono::NaiveDateTime;

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses an export timestamp into a naive instant for ordering.
///
/// A trailing `Z` and any fractional seconds are stripped, never converted;
/// timestamps with mixed offsets keep their wall-clock order.
pub fn parse_instant(timestamp: &str) -> chrono::format::ParseResult<NaiveDateTime> {
    let trimmed = timestamp.trim_end_matches('Z');
    let trimmed = trimmed.split_once('.').map_or(trimmed, |(head, _)| head);
    NaiveDateTime::parse_from_str(trimmed, FORMAT)
}
