use crate::registration::Registration;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Write registrations as CSV with a `name,email,club,date` header
pub fn write_csv<W: Write>(registrations: &[Registration], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for registration in registrations {
        wtr.serialize(registration)
            .context("Failed to serialize registration")?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn export_csv(registrations: &[Registration], csv_path: &Path) -> Result<()> {
    let file = std::fs::File::create(csv_path)
        .with_context(|| format!("Failed to create CSV file: {:?}", csv_path))?;
    write_csv(registrations, file)
}
