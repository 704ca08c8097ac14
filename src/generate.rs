use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

pub const CITIES: [&str; 20] = [
    "New York",
    "London",
    "Tokyo",
    "Paris",
    "Berlin",
    "Moscow",
    "Sydney",
    "Los Angeles",
    "Chicago",
    "Toronto",
    "Seoul",
    "Mumbai",
    "Mexico City",
    "Sao Paulo",
    "Cairo",
    "Istanbul",
    "Beijing",
    "Shanghai",
    "Jakarta",
    "Delhi",
];

pub const MIN_VALUE: f64 = -14.5;
pub const MAX_VALUE: f64 = 120.0;

/// Writes `rows` random `"<city> : <value> "` records to `out`.
pub fn write_rows<W: Write, R: Rng>(out: &mut W, rows: u64, rng: &mut R) -> std::io::Result<()> {
    for _ in 0..rows {
        let city = CITIES.choose(rng).copied().unwrap_or(CITIES[0]);
        let value = crate::report::round2(rng.random_range(MIN_VALUE..=MAX_VALUE));
        writeln!(out, "{city} : {value} ")?;
    }
    Ok(())
}

/// Creates (or truncates) `path` and fills it with `rows` generated records.
/// The same `seed` always produces the same file.
pub fn generate(path: &Path, rows: u64, seed: Option<u64>) -> Result<()> {
    let wrap = |source: std::io::Error| Error::Generate {
        path: path.to_path_buf(),
        source,
    };
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let file = File::create(path).map_err(wrap)?;
    let mut out = BufWriter::with_capacity(1 << 21, file);
    write_rows(&mut out, rows, &mut rng).map_err(wrap)?;
    out.flush().map_err(wrap)?;
    tracing::info!(rows, path = %path.display(), "generated input");
    Ok(())
}
