//! Resolution of discovered index-barcode keys against a sample sheet.
//!
//! Demultiplexing reports the key a library was actually read with. The sample sheet
//! declares keys as prepared in the lab, which may differ in how pools are written, so a
//! discovered key that misses the sheet is expanded into every single-member key its
//! pools describe and each is looked up in turn.
use crate::key::{FIELD_SEPARATOR, POOL_SEPARATOR};
use crate::sheet::{SampleSheet, SampleSheetEntry};
use itertools::iproduct;

/// Reported in place of an entry or key when more than one library matches.
pub const AMBIGUOUS: &str = "MULTIPLE";

/// The outcome of resolving one discovered key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Exactly one library matched. `key` is the sheet key it was declared under.
    Found {
        key: String,
        entry: &'a SampleSheetEntry,
    },
    /// More than one distinct library matched. `candidates` lists their sheet keys.
    Ambiguous { candidates: Vec<String> },
    /// Nothing in the sheet matched.
    Unresolved,
}

impl Resolution<'_> {
    /// The key the discovered key resolved to: the sheet key, `MULTIPLE` when ambiguous,
    /// or empty when unresolved.
    pub fn resolved_key(&self) -> &str {
        match self {
            Resolution::Found { key, .. } => key,
            Resolution::Ambiguous { .. } => AMBIGUOUS,
            Resolution::Unresolved => "",
        }
    }

    pub fn entry(&self) -> Option<&SampleSheetEntry> {
        match self {
            Resolution::Found { entry, .. } => Some(entry),
            _ => None,
        }
    }

    /// The matched entry, an entry whose text fields all read `MULTIPLE` when ambiguous,
    /// or an empty entry when unresolved.
    pub fn entry_or_sentinel(&self) -> SampleSheetEntry {
        match self {
            Resolution::Found { entry, .. } => (*entry).clone(),
            Resolution::Ambiguous { .. } => SampleSheetEntry {
                key: AMBIGUOUS.to_string(),
                library_id: AMBIGUOUS.to_string(),
                plate_id: AMBIGUOUS.to_string(),
                experiment: AMBIGUOUS.to_string(),
                udg: None,
                do_not_use: Some(AMBIGUOUS.to_string()),
                notes: Some(AMBIGUOUS.to_string()),
            },
            Resolution::Unresolved => SampleSheetEntry::default(),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Resolution::Ambiguous { .. })
    }
}

/// Looks up discovered keys in a sample sheet.
///
/// Implementations must never guess: when several libraries could have produced a key,
/// the answer is `Resolution::Ambiguous`.
///
/// `'s` is the lifetime of the sheet, so a resolution outlives the resolver that made it.
pub trait Resolve<'s> {
    fn resolve(&self, discovered: &str) -> Resolution<'s>;
}

/// Resolves keys by exact lookup, falling back to expanding the discovered key's pools
/// into every p5 x p7 member combination.
pub struct ExpandingResolver<'a> {
    sheet: &'a SampleSheet,
}

impl<'a> ExpandingResolver<'a> {
    pub fn new(sheet: &'a SampleSheet) -> Self {
        ExpandingResolver { sheet }
    }
}

/// Splits a key into its four fields without validating lengths. Returns `None` unless
/// there are exactly four fields.
fn split_fields(key: &str) -> Option<[&str; 4]> {
    let mut fields = key.split(FIELD_SEPARATOR);
    let out = [fields.next()?, fields.next()?, fields.next()?, fields.next()?];
    match fields.next() {
        Some(_) => None,
        None => Some(out),
    }
}

/// Every single-member key described by a (possibly pooled) key, in p5-major order.
pub fn expand_key(key: &str) -> Option<Vec<String>> {
    let [i5, i7, p5, p7] = split_fields(key)?;
    let candidates = iproduct!(p5.split(POOL_SEPARATOR), p7.split(POOL_SEPARATOR))
        .map(|(p5, p7)| {
            let sep = FIELD_SEPARATOR;
            format!("{i5}{sep}{i7}{sep}{p5}{sep}{p7}")
        })
        .collect();
    Some(candidates)
}

impl<'s> Resolve<'s> for ExpandingResolver<'s> {
    fn resolve(&self, discovered: &str) -> Resolution<'s> {
        let discovered = discovered.trim();

        if let Some(entry) = self.sheet.get(discovered) {
            return Resolution::Found {
                key: discovered.to_string(),
                entry,
            };
        }

        let Some(candidates) = expand_key(discovered) else {
            debug!("`{discovered}` is not a four-field key; leaving unresolved");
            return Resolution::Unresolved;
        };

        // distinct libraries, each with the first candidate key that reached it
        let mut matches: Vec<(String, &'s SampleSheetEntry)> = Vec::new();
        for candidate in candidates {
            if let Some(entry) = self.sheet.get(&candidate) {
                if !matches.iter().any(|(_, e)| e.same_library(entry)) {
                    matches.push((candidate, entry));
                }
            }
        }

        match matches.len() {
            0 => Resolution::Unresolved,
            1 => {
                let (key, entry) = matches.remove(0);
                Resolution::Found { key, entry }
            }
            _ => {
                let candidates: Vec<String> = matches.into_iter().map(|(k, _)| k).collect();
                warn!(
                    "{discovered} matches {} sample sheet entries ({}); marking as {AMBIGUOUS}",
                    candidates.len(),
                    candidates.join(", ")
                );
                Resolution::Ambiguous { candidates }
            }
        }
    }
}
