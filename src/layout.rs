use crate::assign::{barcodes_for_location, indices_for_location};
use crate::occupancy::Occupant;
use crate::pool::{p7_source_well, POOL_SIZE};
use crate::well::{all_wells, WellPosition};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Barcodes assigned to one well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarcodeRow {
    pub well: WellPosition,
    pub p5: &'static str,
    pub p7: &'static str,
    /// For right-half wells, the well holding the p7 reagent to pipette from.
    pub p7_source: Option<WellPosition>,
}

/// Index numbers assigned to one well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRow {
    pub well: WellPosition,
    pub i5: u32,
    pub i7: u32,
}

/// Assigns p5/p7 pool labels to every well of a plate.
pub fn barcode_layout(p7_offset: i32) -> Result<Vec<BarcodeRow>> {
    all_wells()
        .map(|well| -> Result<BarcodeRow> {
            let (p5, p7) = barcodes_for_location(well.index(), p7_offset)?;
            let p7_source = if well.index() >= POOL_SIZE {
                Some(p7_source_well(p7)?)
            } else {
                None
            };
            Ok(BarcodeRow {
                well,
                p5,
                p7,
                p7_source,
            })
        })
        .collect()
}

/// Assigns double-stranded library index numbers to every well of a plate.
pub fn index_layout(p5_start: u32) -> Result<Vec<IndexRow>> {
    all_wells()
        .map(|well| -> Result<IndexRow> {
            let (i5, i7) = indices_for_location(well.index(), p5_start)?;
            Ok(IndexRow { well, i5, i7 })
        })
        .collect()
}

/// Writes rows as a tab-separated table with a header.
pub fn write_tsv<T: Serialize>(writer: impl Write, rows: &[T]) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(b'\t').from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads a plate layout file: a tab-separated table with `id`, `position` and an
/// optional `control` column.
pub fn read_occupants(path: impl AsRef<Path>) -> Result<Vec<Occupant>> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Unable to open layout {}", path.display()))?;

    let occupants = rdr
        .deserialize()
        .collect::<Result<Vec<Occupant>, _>>()
        .with_context(|| format!("Invalid layout row in {}", path.display()))?;

    info!("Read {} occupants from {}", occupants.len(), path.display());
    Ok(occupants)
}

pub fn write_occupants(writer: impl Write, occupants: &[Occupant]) -> Result<()> {
    write_tsv(writer, occupants)
}
