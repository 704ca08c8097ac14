use crate::aggregate::{new_map, Aggregate, AggregateMap};

pub const DELIMITER: char = ':';

/// Splits one raw record into `(key, value)`.
///
/// Returns `None` for blank lines, lines without exactly one delimiter and
/// values that are not finite decimal numbers. `inf` and `NaN` parse as
/// floats but are rejected on purpose, so `min <= v <= max` always holds.
#[inline]
pub fn parse_line(line: &str) -> Option<(&str, f64)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let mut fields = line.split(DELIMITER);
    let key = fields.next()?;
    let value = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    let value = fast_float::parse::<f64, _>(value.trim()).ok()?;
    if !value.is_finite() {
        return None;
    }
    Some((key.trim(), value))
}

/// Aggregates one chunk into a fresh partial map. Malformed lines are skipped.
pub fn process_chunk<S: AsRef<str>>(chunk: &[S]) -> AggregateMap {
    let mut result = new_map();
    for line in chunk {
        let Some((key, value)) = parse_line(line.as_ref()) else {
            continue;
        };
        match result.get_mut(key) {
            Some(entry) => entry.observe(value),
            None => {
                result.insert(key.to_owned(), Aggregate::new(value));
            }
        }
    }
    result
}
