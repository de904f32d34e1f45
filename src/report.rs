use crate::resolve::{Resolution, Resolve};
use crate::sheet::Udg;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{prelude::*, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The discovered key is declared verbatim in the sheet.
    Exact,
    /// One member combination of the discovered key is declared in the sheet.
    Expanded,
    Ambiguous,
    Unresolved,
}

/// One line of a resolution report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub discovered: String,
    pub resolved_key: String,
    pub status: Status,
    pub library_id: String,
    pub plate_id: String,
    pub experiment: String,
    pub udg: Option<Udg>,
    pub do_not_use: Option<String>,
    pub notes: Option<String>,
}

/// Written as a `#`-prefixed JSON line at the top of a report.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct ReportMetadata {
    pub platekey_version: String,
    pub report_date: String,
    pub sheet_path: String,
    pub sheet_entries: usize,
    pub keys: usize,
    pub resolved: usize,
    pub ambiguous: usize,
    pub unresolved: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    pub rows: Vec<ReportRow>,
    /// Discovered keys matching several libraries, for manual review.
    pub ambiguous: Vec<String>,
    /// Discovered keys matching nothing.
    pub unresolved: Vec<String>,
    pub metadata: ReportMetadata,
}

fn report_row(discovered: &str, resolution: &Resolution) -> ReportRow {
    let status = match resolution {
        Resolution::Found { key, .. } if key == discovered => Status::Exact,
        Resolution::Found { .. } => Status::Expanded,
        Resolution::Ambiguous { .. } => Status::Ambiguous,
        Resolution::Unresolved => Status::Unresolved,
    };
    let entry = resolution.entry_or_sentinel();

    ReportRow {
        discovered: discovered.to_string(),
        resolved_key: resolution.resolved_key().to_string(),
        status,
        library_id: entry.library_id,
        plate_id: entry.plate_id,
        experiment: entry.experiment,
        udg: entry.udg,
        do_not_use: entry.do_not_use,
        notes: entry.notes,
    }
}

/// Resolves every discovered key. A key that cannot be resolved never stops the run; it
/// is collected into `ambiguous` or `unresolved` instead.
pub fn resolve_all<'s, R, I, S>(resolver: &R, keys: I) -> ResolutionReport
where
    R: Resolve<'s>,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = ResolutionReport {
        metadata: ReportMetadata {
            platekey_version: crate::VERSION.to_string(),
            report_date: format!("{:?}", chrono::offset::Local::now()),
            ..ReportMetadata::default()
        },
        ..ResolutionReport::default()
    };

    for key in keys {
        let discovered = key.as_ref().trim();
        let resolution = resolver.resolve(discovered);

        match resolution {
            Resolution::Found { .. } => report.metadata.resolved += 1,
            Resolution::Ambiguous { .. } => {
                report.metadata.ambiguous += 1;
                report.ambiguous.push(discovered.to_string());
            }
            Resolution::Unresolved => {
                report.metadata.unresolved += 1;
                report.unresolved.push(discovered.to_string());
            }
        }
        report.rows.push(report_row(discovered, &resolution));
    }
    report.metadata.keys = report.rows.len();

    info!(
        "Stats: {} keys, {} resolved, {} ambiguous, {} unresolved",
        report.metadata.keys,
        report.metadata.resolved,
        report.metadata.ambiguous,
        report.metadata.unresolved
    );
    for key in report.unresolved.iter() {
        debug!("Unresolved: {key}");
    }

    report
}

impl ResolutionReport {
    /// Writes the metadata line followed by the rows as a tab-separated table.
    pub fn write_tsv(&self, mut writer: impl Write) -> Result<()> {
        writeln!(writer, "#{}", serde_json::to_string(&self.metadata)?)?;

        let mut wtr = WriterBuilder::new().delimiter(b'\t').from_writer(writer);
        for row in self.rows.iter() {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Reads discovered keys, one per line. Blank lines and lines starting with `#` are
/// skipped.
pub fn read_keys(path: &str) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Unable to open key file {path}"))?;

    let mut keys = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("Unable to read key file {path}"))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        keys.push(line.to_string());
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{ExpandingResolver, AMBIGUOUS};
    use crate::sheet::{SampleSheet, SampleSheetEntry};

    fn sheet() -> SampleSheet {
        let entry = |key: &str, library_id: &str| SampleSheetEntry {
            key: key.to_string(),
            library_id: library_id.to_string(),
            plate_id: "PL1".to_string(),
            experiment: "1240k".to_string(),
            udg: Some(Udg::Half),
            ..Default::default()
        };
        SampleSheet::from_entries([
            entry("AGGTATT_GCTTCAG__", "S1"),
            entry("TTGACCA_ACCTGTT_ACGGTCT_AGTCGCA", "S2"),
            entry("CCAGTTG_AATCCGA_ACGGTCT_AGTCGCA", "S3"),
            entry("CCAGTTG_AATCCGA_CGTTAGA_CATATGC", "S4"),
        ])
        .unwrap()
    }

    #[test]
    fn statuses() {
        let sheet = sheet();
        let resolver = ExpandingResolver::new(&sheet);
        let report = resolve_all(
            &resolver,
            [
                "AGGTATT_GCTTCAG__",
                "TTGACCA_ACCTGTT_ACGGTCT:CGTTAGA_AGTCGCA:CATATGC",
                "CCAGTTG_AATCCGA_ACGGTCT:CGTTAGA_AGTCGCA:CATATGC",
                "GGGGGGG_GCTTCAG__",
            ],
        );

        let statuses: Vec<_> = report.rows.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                Status::Exact,
                Status::Expanded,
                Status::Ambiguous,
                Status::Unresolved
            ]
        );
        assert_eq!(report.rows[1].library_id, "S2");
        assert_eq!(report.rows[1].resolved_key, "TTGACCA_ACCTGTT_ACGGTCT_AGTCGCA");
        assert_eq!(report.rows[2].library_id, AMBIGUOUS);
        assert_eq!(report.rows[2].resolved_key, AMBIGUOUS);
        assert_eq!(report.rows[3].library_id, "");

        assert_eq!(
            report.ambiguous,
            vec!["CCAGTTG_AATCCGA_ACGGTCT:CGTTAGA_AGTCGCA:CATATGC"]
        );
        assert_eq!(report.unresolved, vec!["GGGGGGG_GCTTCAG__"]);
        assert_eq!(report.metadata.keys, 4);
        assert_eq!(report.metadata.resolved, 2);
    }

    #[test]
    fn tsv_has_metadata_header() {
        let sheet = sheet();
        let resolver = ExpandingResolver::new(&sheet);
        let report = resolve_all(&resolver, ["AGGTATT_GCTTCAG__"]);

        let mut out = Vec::new();
        report.write_tsv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        let metadata: ReportMetadata = serde_json::from_str(&header[1..]).unwrap();
        assert_eq!(metadata.resolved, 1);

        assert_eq!(
            lines.next().unwrap(),
            "discovered\tresolved_key\tstatus\tlibrary_id\tplate_id\texperiment\tudg\tdo_not_use\tnotes"
        );
        assert_eq!(
            lines.next().unwrap(),
            "AGGTATT_GCTTCAG__\tAGGTATT_GCTTCAG__\texact\tS1\tPL1\t1240k\thalf\t\t"
        );
    }
}
