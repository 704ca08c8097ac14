use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

use serde::Serialize;

use crate::aggregate::AggregateMap;

/// Rounds to 2 decimal places, halves away from zero.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Final, rounded result ordered by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub result: BTreeMap<String, Stats>,
    pub elapsed_secs: f64,
}

impl Report {
    pub fn new(aggregates: AggregateMap, elapsed: Duration) -> Self {
        let result = aggregates
            .into_iter()
            .map(|(key, agg)| {
                let stats = Stats {
                    min: round2(agg.min),
                    max: round2(agg.max),
                    avg: round2(agg.avg),
                };
                (key, stats)
            })
            .collect();
        Report {
            result,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.result.len() * 48 + 64);
        out.push_str("Final aggregated data:\n");
        for (key, stats) in &self.result {
            let _ = writeln!(
                out,
                "{}: min: {:.2}, max: {:.2}, avg: {:.2}",
                key, stats.min, stats.max, stats.avg
            );
        }
        let _ = writeln!(out, "Processed in: {:.2} seconds", self.elapsed_secs);
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{new_map, Aggregate};

    fn sample() -> Report {
        let mut map = new_map();
        let mut paris = Aggregate::new(10.0);
        paris.observe(20.0);
        paris.observe(30.0);
        map.insert("Paris".to_string(), paris);
        map.insert("London".to_string(), Aggregate::new(5.5));
        Report::new(map, Duration::from_millis(1234))
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round2(1.125), 1.13);
        assert_eq!(round2(-1.125), -1.13);
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(33.3333333), 33.33);
        assert_eq!(round2(-0.004), -0.0);
    }

    #[test]
    fn text_is_sorted_by_key() {
        let text = sample().to_text();
        assert_eq!(
            text,
            "Final aggregated data:\n\
             London: min: 5.50, max: 5.50, avg: 5.50\n\
             Paris: min: 10.00, max: 30.00, avg: 20.00\n\
             Processed in: 1.23 seconds\n"
        );
    }

    #[test]
    fn json_carries_rounded_stats() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["result"]["Paris"]["avg"], 20.0);
        assert_eq!(json["result"]["London"]["min"], 5.5);
        assert!(json["result"]["Paris"].get("count").is_none());
        assert!((json["elapsed_secs"].as_f64().unwrap() - 1.234).abs() < 1e-9);
    }
}
