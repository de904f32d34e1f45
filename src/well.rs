use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Row letters of a 96-well plate, top to bottom.
pub const ROWS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// Number of columns on a 96-well plate.
pub const COLUMNS: u32 = 12;

/// Number of wells on a plate.
pub const PLATE_SIZE: usize = 96;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("well index {index} is outside the plate (expected 0..{PLATE_SIZE})")]
    IndexOutOfRange { index: usize },

    #[error("row `{row}` is not a plate row (expected A-H)")]
    InvalidRow { row: char },

    #[error("column {column} is not a plate column (expected 1-{COLUMNS})")]
    InvalidColumn { column: u32 },

    #[error("`{text}` is not a well position (expected a row letter followed by a column, e.g. `C4`)")]
    Malformed { text: String },
}

/// A single well on a 96-well plate.
///
/// The row and column are private, so every `WellPosition` in existence lies within
/// A-H and 1-12. Wells are numbered column-major: A1 is 0, B1 is 1, ..., H1 is 7, A2 is 8
/// and H12 is 95.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WellPosition {
    // ordering by (column, row) matches the linear well index
    column: u8,
    row: u8,
}

impl WellPosition {
    /// Builds a well from a row letter and a 1-based column.
    pub fn new(row: char, column: u32) -> Result<Self, AddressError> {
        let index = index_of(row, column)?;
        locate(index)
    }

    /// Builds a well from coordinates already known to be on the plate.
    pub(crate) fn from_coordinates(row_index: usize, column: u32) -> Self {
        debug_assert!(row_index < ROWS.len() && (1..=COLUMNS).contains(&column));
        WellPosition {
            row: row_index as u8,
            column: column as u8,
        }
    }

    /// The row letter, `A` through `H`.
    pub fn row(&self) -> char {
        ROWS[self.row as usize]
    }

    /// The 0-based row index, 0 for `A` through 7 for `H`.
    pub fn row_index(&self) -> usize {
        self.row as usize
    }

    /// The 1-based column number.
    pub fn column(&self) -> u32 {
        self.column as u32
    }

    /// The linear, column-major well index in `0..96`.
    pub fn index(&self) -> usize {
        self.row as usize + (self.column as usize - 1) * ROWS.len()
    }
}

/// Returns the well at linear position `n`.
///
/// # Errors
///
/// Returns `AddressError::IndexOutOfRange` if `n` is not in `0..96`. Indices are never wrapped.
pub fn locate(n: usize) -> Result<WellPosition, AddressError> {
    if n >= PLATE_SIZE {
        return Err(AddressError::IndexOutOfRange { index: n });
    }
    Ok(WellPosition::from_coordinates(
        n % ROWS.len(),
        (n / ROWS.len() + 1) as u32,
    ))
}

/// Returns the linear well index for a row letter and 1-based column. This is the inverse
/// of [`locate`].
pub fn index_of(row: char, column: u32) -> Result<usize, AddressError> {
    let row_index = ROWS
        .iter()
        .position(|r| *r == row)
        .ok_or(AddressError::InvalidRow { row })?;

    if !(1..=COLUMNS).contains(&column) {
        return Err(AddressError::InvalidColumn { column });
    }

    Ok(row_index + (column as usize - 1) * ROWS.len())
}

/// Parses a well in text form such as `A1` or `H12`.
///
/// The column must be written as plain digits without a sign or leading zeros, so `A01`
/// and `A+1` are malformed rather than read as `A1`.
pub fn parse(text: &str) -> Result<WellPosition, AddressError> {
    let malformed = || AddressError::Malformed {
        text: text.to_string(),
    };

    let mut chars = text.chars();
    let row = chars.next().ok_or_else(malformed)?;
    let digits = chars.as_str();
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let column = digits.parse::<u32>().map_err(|_| malformed())?;

    locate(index_of(row, column)?)
}

/// Iterates over all 96 wells in linear order.
pub fn all_wells() -> impl Iterator<Item = WellPosition> {
    (0..PLATE_SIZE).map(|n| WellPosition::from_coordinates(n % ROWS.len(), (n / ROWS.len() + 1) as u32))
}

impl fmt::Display for WellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row(), self.column)
    }
}

impl FromStr for WellPosition {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl TryFrom<String> for WellPosition {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse(value.trim())
    }
}

impl From<WellPosition> for String {
    fn from(value: WellPosition) -> Self {
        value.to_string()
    }
}
