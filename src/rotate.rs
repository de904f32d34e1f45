//! Plate rotation.
//!
//! Turning a plate 180° swaps row A with H, B with G and so on, and reverses the columns.
//! Batches that were rotated carry a `.U` marker in their name, which links a batch to its
//! unrotated counterpart.
use crate::occupancy::Occupant;
use crate::well::{WellPosition, COLUMNS, ROWS};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref BATCH_NAME_REGEX: Regex = Regex::new(
        r"^(?P<family>[^._]+)\.(?P<number>\d+)(?P<rotated>\.U)?(?:\.NE(?P<extract>\d+))?_(?P<kind>[^._]+)$"
    )
    .expect("batch name regex is valid");
}

/// Returns the well that `position` occupies after the plate is turned 180°.
pub fn rotate(position: WellPosition) -> WellPosition {
    WellPosition::from_coordinates(
        ROWS.len() - 1 - position.row_index(),
        COLUMNS + 1 - position.column(),
    )
}

/// A parsed batch name of the form `<family>.<number>[.U][.NE<n>]_<type>`, e.g.
/// `CAP.42.U.NE3_DS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchName {
    pub family: String,
    /// Batch number, kept as written so leading zeros survive.
    pub number: String,
    /// Whether the `.U` rotation marker is present.
    pub rotated: bool,
    /// Extract number from the `.NE<n>` suffix.
    pub extract: Option<String>,
    pub kind: String,
}

impl BatchName {
    /// Parses a batch name, returning `None` if it does not follow the batch grammar.
    pub fn parse(name: &str) -> Option<Self> {
        let captures = BATCH_NAME_REGEX.captures(name.trim())?;
        Some(BatchName {
            family: captures["family"].to_string(),
            number: captures["number"].to_string(),
            rotated: captures.name("rotated").is_some(),
            extract: captures.name("extract").map(|m| m.as_str().to_string()),
            kind: captures["kind"].to_string(),
        })
    }

    /// The same batch with the rotation marker toggled.
    pub fn toggled(&self) -> Self {
        BatchName {
            rotated: !self.rotated,
            ..self.clone()
        }
    }
}

impl fmt::Display for BatchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.family, self.number)?;
        if self.rotated {
            f.write_str(".U")?;
        }
        if let Some(extract) = &self.extract {
            write!(f, ".NE{extract}")?;
        }
        write!(f, "_{}", self.kind)
    }
}

/// Returns the name of the rotated counterpart of a batch: the rotation marker is added if
/// missing and removed if present. Names outside the batch grammar have no counterpart.
pub fn rotated_pair_name(name: &str) -> Option<String> {
    BatchName::parse(name).map(|batch| batch.toggled().to_string())
}

/// A named plate of occupants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateBatch {
    pub name: String,
    pub rotated: bool,
    pub occupants: Vec<Occupant>,
}

impl PlateBatch {
    /// Turns the plate 180°: every occupant moves to its rotated well and the batch's
    /// rotation flag flips.
    pub fn rotate(&mut self) {
        for occupant in self.occupants.iter_mut() {
            occupant.position = rotate(occupant.position);
        }
        self.rotated = !self.rotated;
        debug!(
            "Rotated {} occupants of {} (rotated = {})",
            self.occupants.len(),
            self.name,
            self.rotated
        );
    }

    /// The name of this batch's rotated counterpart, if the name follows the batch grammar.
    pub fn counterpart_name(&self) -> Option<String> {
        rotated_pair_name(&self.name)
    }
}
