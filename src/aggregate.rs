use hashbrown::HashMap;

/// Running statistics for a single key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub count: u64,
}

/// Aggregates keyed by the trimmed record key.
///
/// The same map type serves as the chunk-local partial map produced by a
/// worker and as the final map owned by the merger.
pub type AggregateMap = HashMap<String, Aggregate, ahash::RandomState>;

impl Aggregate {
    #[inline]
    pub fn new(value: f64) -> Self {
        Aggregate {
            min: value,
            max: value,
            avg: value,
            count: 1,
        }
    }

    /// Folds one more observation into the aggregate, keeping `avg` the exact
    /// running mean.
    #[inline]
    pub fn observe(&mut self, value: f64) {
        let count = self.count + 1;
        self.avg = (self.avg * self.count as f64 + value) / count as f64;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count = count;
    }

    /// Combines two aggregates for the same key.
    #[inline]
    pub fn merge(&mut self, other: &Aggregate) {
        let total = self.count + other.count;
        self.avg = (self.avg * self.count as f64 + other.avg * other.count as f64) / total as f64;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = total;
    }
}

pub fn new_map() -> AggregateMap {
    AggregateMap::default()
}

/// Merges `partial` into `acc`, consuming it. Keys missing from `acc` are
/// moved over unchanged.
pub fn merge_into(acc: &mut AggregateMap, partial: AggregateMap) {
    for (key, value) in partial {
        acc.entry(key)
            .and_modify(|e| e.merge(&value))
            .or_insert(value);
    }
}
