use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the four fields of a key.
pub const FIELD_SEPARATOR: char = '_';

/// Separator between interchangeable members of a barcode pool.
pub const POOL_SEPARATOR: char = ':';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyError {
    #[error("i5 `{i5}` and i7 `{i7}` have different lengths")]
    IndexLengthMismatch { i5: String, i7: String },

    #[error("members of the {field} pool `{pool}` have different lengths")]
    PoolLengthMismatch { field: &'static str, pool: String },

    #[error("p5 `{p5}` and p7 `{p7}` barcodes have different lengths")]
    BarcodeLengthMismatch { p5: String, p7: String },

    #[error("`{key}` is not an index-barcode key (expected four `_`-separated fields: i5_i7_p5_p7)")]
    Malformed { key: String },
}

/// The compound identifier `i5_i7_p5_p7` used to demultiplex pooled sequencing output.
///
/// The p5 and p7 fields may each hold several pool members joined by `:`. A single
/// member is a one-element pool. Empty fields are allowed, e.g. for libraries without
/// barcodes, and render as empty segments: `AGGTATT_GCTTCAG__`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexBarcodeKey {
    i5: String,
    i7: String,
    p5: String,
    p7: String,
}

fn pool_length(field: &'static str, pool: &str) -> Result<usize, KeyError> {
    let mut members = pool.split(POOL_SEPARATOR);
    // split always yields at least one member
    let len = members.next().map_or(0, str::len);
    if members.any(|m| m.len() != len) {
        return Err(KeyError::PoolLengthMismatch {
            field,
            pool: pool.to_string(),
        });
    }
    Ok(len)
}

impl IndexBarcodeKey {
    /// Builds a key from its four fields, checking that paired fields agree in length.
    pub fn new(
        i5: impl Into<String>,
        i7: impl Into<String>,
        p5: impl Into<String>,
        p7: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let key = IndexBarcodeKey {
            i5: i5.into(),
            i7: i7.into(),
            p5: p5.into(),
            p7: p7.into(),
        };

        if key.i5.len() != key.i7.len() {
            return Err(KeyError::IndexLengthMismatch {
                i5: key.i5,
                i7: key.i7,
            });
        }

        let p5_len = pool_length("p5", &key.p5)?;
        let p7_len = pool_length("p7", &key.p7)?;
        if p5_len != p7_len {
            return Err(KeyError::BarcodeLengthMismatch {
                p5: key.p5,
                p7: key.p7,
            });
        }

        Ok(key)
    }

    /// A key with indices only and empty barcode fields.
    pub fn from_indices(i5: impl Into<String>, i7: impl Into<String>) -> Result<Self, KeyError> {
        Self::new(i5, i7, "", "")
    }

    pub fn i5(&self) -> &str {
        &self.i5
    }

    pub fn i7(&self) -> &str {
        &self.i7
    }

    /// The p5 field as written, including pool separators.
    pub fn p5(&self) -> &str {
        &self.p5
    }

    pub fn p7(&self) -> &str {
        &self.p7
    }

    pub fn p5_members(&self) -> impl Iterator<Item = &str> {
        self.p5.split(POOL_SEPARATOR)
    }

    pub fn p7_members(&self) -> impl Iterator<Item = &str> {
        self.p7.split(POOL_SEPARATOR)
    }

    /// Whether the key names more than one p5 or p7 pool member.
    pub fn is_pooled(&self) -> bool {
        self.p5.contains(POOL_SEPARATOR) || self.p7.contains(POOL_SEPARATOR)
    }

    /// Returns true if this key identifies a library also identified by `other`: the
    /// indices match exactly, and every pool member of this key is a member of the
    /// corresponding pool of `other`.
    ///
    /// This is not symmetric. A key read from one member of a pool maps to the key
    /// declaring the whole pool, but the pooled key does not map to the single member.
    pub fn maps_to(&self, other: &IndexBarcodeKey) -> bool {
        if self.i5 != other.i5 || self.i7 != other.i7 {
            return false;
        }
        let other_p5: HashSet<&str> = other.p5_members().collect();
        let other_p7: HashSet<&str> = other.p7_members().collect();

        self.p5_members().all(|m| other_p5.contains(m))
            && self.p7_members().all(|m| other_p7.contains(m))
    }
}

impl fmt::Display for IndexBarcodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}_{}", self.i5, self.i7, self.p5, self.p7)
    }
}

impl FromStr for IndexBarcodeKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(FIELD_SEPARATOR).collect();
        let [i5, i7, p5, p7] = fields.as_slice() else {
            return Err(KeyError::Malformed { key: s.to_string() });
        };
        Self::new(*i5, *i7, *p5, *p7)
    }
}
