use csv::{ReaderBuilder, StringRecord};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// UDG treatment applied to a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Udg {
    Minus,
    Half,
    Plus,
}

impl FromStr for Udg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minus" => Ok(Udg::Minus),
            "half" => Ok(Udg::Half),
            "plus" => Ok(Udg::Plus),
            other => Err(format!("unknown UDG treatment `{other}`")),
        }
    }
}

impl fmt::Display for Udg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Udg::Minus => "minus",
            Udg::Half => "half",
            Udg::Plus => "plus",
        })
    }
}

/// One declared library in a sample sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleSheetEntry {
    pub key: String,
    pub library_id: String,
    pub plate_id: String,
    pub experiment: String,
    pub udg: Option<Udg>,
    pub do_not_use: Option<String>,
    pub notes: Option<String>,
}

impl SampleSheetEntry {
    /// Whether both entries describe the same library, whatever keys they were declared
    /// under.
    pub fn same_library(&self, other: &SampleSheetEntry) -> bool {
        #[allow(clippy::type_complexity)]
        fn identity(
            e: &SampleSheetEntry,
        ) -> (&str, &str, &str, Option<Udg>, Option<&str>, Option<&str>) {
            (
                e.library_id.as_str(),
                e.plate_id.as_str(),
                e.experiment.as_str(),
                e.udg,
                e.do_not_use.as_deref(),
                e.notes.as_deref(),
            )
        }
        identity(self) == identity(other)
    }
}

#[derive(Error, Debug)]
pub enum SheetError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("sample sheet has no `{column}` column")]
    MissingColumn { column: &'static str },

    #[error("key `{key}` appears more than once in the sample sheet (rows {first} and {second})")]
    DuplicateKey {
        key: String,
        first: usize,
        second: usize,
    },
}

// accepted header spellings, compared after `normalize_header`
const KEY_HEADERS: &[&str] = &["indexbarcodekeys", "indexbarcodekey", "key"];
const LIBRARY_HEADERS: &[&str] = &["libraryid"];
const PLATE_HEADERS: &[&str] = &["plateid"];
const EXPERIMENT_HEADERS: &[&str] = &["experiment"];
const UDG_HEADERS: &[&str] = &["udg", "udgtreatment"];
const DO_NOT_USE_HEADERS: &[&str] = &["donotuse"];
const NOTES_HEADERS: &[&str] = &["wetlabnotes", "notes"];

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Column positions of a sample sheet, found from its header row.
struct Columns {
    key: usize,
    library_id: usize,
    plate_id: usize,
    experiment: usize,
    udg: Option<usize>,
    do_not_use: Option<usize>,
    notes: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, SheetError> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |names: &[&str]| normalized.iter().position(|h| names.contains(&h.as_str()));
        let require = |names: &[&str], column: &'static str| {
            find(names).ok_or(SheetError::MissingColumn { column })
        };

        Ok(Columns {
            key: require(KEY_HEADERS, "index_barcode_keys")?,
            library_id: require(LIBRARY_HEADERS, "library_id")?,
            plate_id: require(PLATE_HEADERS, "plate_id")?,
            experiment: require(EXPERIMENT_HEADERS, "experiment")?,
            udg: find(UDG_HEADERS),
            do_not_use: find(DO_NOT_USE_HEADERS),
            notes: find(NOTES_HEADERS),
        })
    }

    fn entry(&self, record: &StringRecord) -> SampleSheetEntry {
        let cell = |i: usize| record.get(i).unwrap_or("").trim();
        let optional = |i: Option<usize>| {
            i.map(cell)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let udg = optional(self.udg).and_then(|v| match v.parse::<Udg>() {
            Ok(udg) => Some(udg),
            Err(e) => {
                warn!("Library {}: {e}; leaving UDG unset", cell(self.library_id));
                None
            }
        });

        SampleSheetEntry {
            key: cell(self.key).to_string(),
            library_id: cell(self.library_id).to_string(),
            plate_id: cell(self.plate_id).to_string(),
            experiment: cell(self.experiment).to_string(),
            udg,
            do_not_use: optional(self.do_not_use),
            notes: optional(self.notes),
        }
    }
}

/// The declared libraries of a sequencing run, keyed by index-barcode key text.
///
/// Entries keep the order they were declared in.
#[derive(Debug, Clone, Default)]
pub struct SampleSheet {
    entries: IndexMap<String, SampleSheetEntry>,
}

impl SampleSheet {
    /// Reads a tab-delimited sample sheet with a header row.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SheetError> {
        let rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(path)?;
        Self::from_csv(rdr)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SheetError> {
        let rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);
        Self::from_csv(rdr)
    }

    fn from_csv<R: Read>(mut rdr: csv::Reader<R>) -> Result<Self, SheetError> {
        let columns = Columns::from_headers(rdr.headers()?)?;

        let mut entries = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            // rows are reported 1-based, counting the header
            let row = row + 2;
            let entry = columns.entry(&record?);
            if entry.key.is_empty() {
                warn!("Sample sheet row {row} has no key; skipping");
                continue;
            }
            entries.push((row, entry));
        }

        let sheet = Self::from_numbered(entries)?;
        info!("Loaded {} sample sheet entries", sheet.len());
        Ok(sheet)
    }

    /// Builds a sheet from entries already in memory. Duplicate keys are reported by their
    /// 1-based position in `entries`.
    pub fn from_entries(
        entries: impl IntoIterator<Item = SampleSheetEntry>,
    ) -> Result<Self, SheetError> {
        Self::from_numbered(entries.into_iter().enumerate().map(|(n, e)| (n + 1, e)))
    }

    fn from_numbered(
        entries: impl IntoIterator<Item = (usize, SampleSheetEntry)>,
    ) -> Result<Self, SheetError> {
        let mut map = IndexMap::new();
        let mut rows = Vec::new();
        for (row, entry) in entries {
            if let Some(i) = map.get_index_of(&entry.key) {
                return Err(SheetError::DuplicateKey {
                    key: entry.key,
                    first: rows[i],
                    second: row,
                });
            }
            rows.push(row);
            map.insert(entry.key.clone(), entry);
        }
        Ok(SampleSheet { entries: map })
    }

    pub fn get(&self, key: &str) -> Option<&SampleSheetEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleSheetEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn reads_full_sheet() {
        let text = indoc! {"
            Index_Barcode_Keys\tLibrary_ID\tPlate_ID\tExperiment\tUDG\tdo_not_use\twetlab_notes
            AGGTATT_GCTTCAG__\tS1.E1.L1\tPL1\t1240k\thalf\t\tlow yield
            TTGACCA_ACCTGTT__\tS2.E1.L1\tPL1\t1240k\tminus\tyes\t
        "};
        let sheet = SampleSheet::from_reader(text.as_bytes()).unwrap();
        assert_eq!(sheet.len(), 2);

        let e = sheet.get("AGGTATT_GCTTCAG__").unwrap();
        assert_eq!(e.library_id, "S1.E1.L1");
        assert_eq!(e.plate_id, "PL1");
        assert_eq!(e.experiment, "1240k");
        assert_eq!(e.udg, Some(Udg::Half));
        assert_eq!(e.do_not_use, None);
        assert_eq!(e.notes.as_deref(), Some("low yield"));

        let e = sheet.get("TTGACCA_ACCTGTT__").unwrap();
        assert_eq!(e.udg, Some(Udg::Minus));
        assert_eq!(e.do_not_use.as_deref(), Some("yes"));
        assert_eq!(e.notes, None);
    }

    #[test]
    fn headers_are_case_insensitive_and_optional_columns_may_be_missing() {
        let text = indoc! {"
            library_id\tKEY\tplate id\tEXPERIMENT
            S1.E1.L1\tAGGTATT_GCTTCAG__\tPL1\tRaw
        "};
        let sheet = SampleSheet::from_reader(text.as_bytes()).unwrap();
        let e = sheet.get("AGGTATT_GCTTCAG__").unwrap();
        assert_eq!(e.library_id, "S1.E1.L1");
        assert_eq!(e.udg, None);
        assert_eq!(e.do_not_use, None);
    }

    #[test]
    fn unknown_udg_is_unset() {
        let text = indoc! {"
            key\tlibrary_id\tplate_id\texperiment\tudg
            AGGTATT_GCTTCAG__\tS1.E1.L1\tPL1\tRaw\tquarter
        "};
        let sheet = SampleSheet::from_reader(text.as_bytes()).unwrap();
        assert_eq!(sheet.get("AGGTATT_GCTTCAG__").unwrap().udg, None);
    }

    #[test]
    fn missing_required_column() {
        let text = indoc! {"
            key\tlibrary_id\texperiment
            AGGTATT_GCTTCAG__\tS1.E1.L1\tRaw
        "};
        assert!(matches!(
            SampleSheet::from_reader(text.as_bytes()),
            Err(SheetError::MissingColumn { column: "plate_id" })
        ));
    }

    #[test]
    fn duplicate_keys_rejected() {
        let text = indoc! {"
            key\tlibrary_id\tplate_id\texperiment
            AGGTATT_GCTTCAG__\tS1.E1.L1\tPL1\tRaw
            AGGTATT_GCTTCAG__\tS2.E1.L1\tPL1\tRaw
        "};
        assert!(matches!(
            SampleSheet::from_reader(text.as_bytes()),
            Err(SheetError::DuplicateKey { first: 2, second: 3, .. })
        ));
    }

    #[test]
    fn duplicate_keys_rejected_after_skipped_rows() {
        // written without indoc so the keyless row keeps its leading tab
        let text = "key\tlibrary_id\tplate_id\texperiment\n\
                    AGGTATT_GCTTCAG__\tS1.E1.L1\tPL1\tRaw\n\
                    \tS2.E1.L1\tPL1\tRaw\n\
                    AGGTATT_GCTTCAG__\tS3.E1.L1\tPL1\tRaw\n";
        assert!(matches!(
            SampleSheet::from_reader(text.as_bytes()),
            Err(SheetError::DuplicateKey { first: 2, second: 4, .. })
        ));

        let entry = |library_id: &str| SampleSheetEntry {
            key: "AGGTATT_GCTTCAG__".to_string(),
            library_id: library_id.to_string(),
            ..Default::default()
        };
        assert!(matches!(
            SampleSheet::from_entries([entry("S1"), entry("S2")]),
            Err(SheetError::DuplicateKey { first: 1, second: 2, .. })
        ));
    }

    #[test]
    fn same_library_ignores_key() {
        let entry = |key: &str, library_id: &str| SampleSheetEntry {
            key: key.to_string(),
            library_id: library_id.to_string(),
            plate_id: "PL1".to_string(),
            experiment: "1240k".to_string(),
            ..Default::default()
        };
        let a = entry("AGGTATT_GCTTCAG_ACGGTCT_AGTCGCA", "S1.E1.L1");
        let b = entry("AGGTATT_GCTTCAG_CGTTAGA_CATATGC", "S1.E1.L1");
        let c = entry("AGGTATT_GCTTCAG_CGTTAGA_CATATGC", "S2.E1.L1");
        assert!(a.same_library(&b));
        assert!(!a.same_library(&c));

        let flagged = SampleSheetEntry {
            do_not_use: Some("yes".to_string()),
            ..b.clone()
        };
        assert!(!a.same_library(&flagged));
    }

    #[test]
    fn udg_parsing() {
        assert_eq!("PLUS".parse::<Udg>(), Ok(Udg::Plus));
        assert_eq!(" half ".parse::<Udg>(), Ok(Udg::Half));
        assert!("none".parse::<Udg>().is_err());
        assert_eq!(Udg::Minus.to_string(), "minus");
    }
}
