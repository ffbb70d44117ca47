// src/output.rs
use crate::mc::estimate::Estimate;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One row per sample: `index,t,value`
pub fn write_samples_to_csv<P: AsRef<Path>>(path: P, samples: &[(f64, f64)]) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "index,t,value")?;
    for (i, (t, value)) in samples.iter().enumerate() {
        writeln!(file, "{},{},{}", i, t, value)?;
    }
    file.flush()
}

pub fn write_estimates_to_csv<P: AsRef<Path>>(
    path: P,
    estimates: &[(&str, Estimate)],
) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "label,value,lower,upper,confidence_level")?;
    for (label, e) in estimates {
        writeln!(
            file,
            "{},{},{},{},{}",
            label,
            e.value,
            e.lower(),
            e.upper(),
            e.confidence_level
        )?;
    }
    file.flush()
}
