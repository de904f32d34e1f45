use crate::pool::{POOL_SIZE, POOL_TABLE};
use crate::well::{locate, AddressError, WellPosition, COLUMNS, ROWS};
use thiserror::Error;

/// Suffix marking single-stranded library index labels, e.g. `17ss`.
pub const SINGLE_STRANDED_SUFFIX: &str = "ss";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssignmentError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("p7 offset {offset} is odd; odd offsets would collide with the left/right half shift")]
    OddOffset { offset: i32 },

    #[error("p5 start index {start} is outside 1-{POOL_SIZE}")]
    P5StartOutOfRange { start: u32 },

    #[error("`{label}` is not an index label (expected a number, or `<n>ss` for single-stranded)")]
    MalformedIndex { label: String },

    #[error("index label `{label}` is outside the range used for plate layouts")]
    IndexOutOfRange { label: String },

    #[error("single-stranded labels `{i5}` and `{i7}` refer to different wells")]
    MismatchedSingleStranded { i5: String, i7: String },

    #[error("cannot mix single-stranded and double-stranded labels (`{i5}`, `{i7}`)")]
    MixedLabels { i5: String, i7: String },
}

/// Returns the `(p5, p7)` pool labels for the well at linear position `n`.
///
/// Both halves of the plate take their p5 label from the same table position, so wells
/// `i` and `i + 48` share a p5 barcode. Their p7 labels differ by exactly one table
/// position, which keeps every (p5, p7) pair on the plate unique. `p7_offset` staggers
/// p7 against p5 and must be even: the odd shifts are the ones reserved for the
/// left/right distinction.
///
/// # Errors
///
/// * `AssignmentError::OddOffset` if `p7_offset` is odd.
/// * `AssignmentError::Address` if `n` is not a well on the plate.
pub fn barcodes_for_location(
    n: usize,
    p7_offset: i32,
) -> Result<(&'static str, &'static str), AssignmentError> {
    if p7_offset % 2 != 0 {
        return Err(AssignmentError::OddOffset { offset: p7_offset });
    }
    locate(n)?;

    let mod_pos = n % POOL_SIZE;
    let side = n / POOL_SIZE;

    let p5 = POOL_TABLE[mod_pos];
    let p7_pos = (mod_pos as i64 + p7_offset as i64 + side as i64).rem_euclid(POOL_SIZE as i64);
    let p7 = POOL_TABLE[p7_pos as usize];

    Ok((p5, p7))
}

/// Returns the `(p5, p7)` index numbers for the well at linear position `n` in a
/// double-stranded capture preparation.
///
/// Rows A-D take `p5_start` and rows E-H take the following index, wrapping back to 1
/// after 48. The p7 index numbers the plate row-major from 1 (A1) to 96 (H12).
pub fn indices_for_location(n: usize, p5_start: u32) -> Result<(u32, u32), AssignmentError> {
    if !(1..=POOL_SIZE as u32).contains(&p5_start) {
        return Err(AssignmentError::P5StartOutOfRange { start: p5_start });
    }
    let well = locate(n)?;

    let p5 = if well.row_index() < ROWS.len() / 2 {
        p5_start
    } else if p5_start + 1 > POOL_SIZE as u32 {
        1
    } else {
        p5_start + 1
    };
    let p7 = well.row_index() as u32 * COLUMNS + well.column();

    Ok((p5, p7))
}

/// A well recovered from a pair of library index labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexLocation {
    pub well: WellPosition,
    /// The p5 start index the labels were assigned with. `None` for single-stranded
    /// labels, which do not use one.
    pub p5_start: Option<u32>,
}

/// Recovers the well that was assigned a pair of index labels. This is the inverse of
/// [`indices_for_location`], and also accepts single-stranded labels of the form
/// `<n>ss`, which map directly to linear plate position `n - 1`.
pub fn location_from_indices(i5: &str, i7: &str) -> Result<IndexLocation, AssignmentError> {
    let i5 = i5.trim();
    let i7 = i7.trim();

    match (
        i5.strip_suffix(SINGLE_STRANDED_SUFFIX),
        i7.strip_suffix(SINGLE_STRANDED_SUFFIX),
    ) {
        (Some(a), Some(b)) => {
            let a = parse_label(a, i5)?;
            let b = parse_label(b, i7)?;
            if a != b {
                return Err(AssignmentError::MismatchedSingleStranded {
                    i5: i5.to_string(),
                    i7: i7.to_string(),
                });
            }
            if a == 0 {
                return Err(AssignmentError::IndexOutOfRange {
                    label: i5.to_string(),
                });
            }
            let well = locate(a as usize - 1).map_err(|_| AssignmentError::IndexOutOfRange {
                label: i5.to_string(),
            })?;
            Ok(IndexLocation {
                well,
                p5_start: None,
            })
        }
        (None, None) => {
            let p5 = parse_label(i5, i5)?;
            let p7 = parse_label(i7, i7)?;

            if !(1..=POOL_SIZE as u32).contains(&p5) {
                return Err(AssignmentError::IndexOutOfRange {
                    label: i5.to_string(),
                });
            }
            if !(1..=ROWS.len() as u32 * COLUMNS).contains(&p7) {
                return Err(AssignmentError::IndexOutOfRange {
                    label: i7.to_string(),
                });
            }

            let row_index = ((p7 - 1) / COLUMNS) as usize;
            let column = (p7 - 1) % COLUMNS + 1;
            let well = WellPosition::new(ROWS[row_index], column)?;

            // rows E-H were given start + 1, and a start of 48 wrapped to 1
            let p5_start = if row_index < ROWS.len() / 2 {
                p5
            } else if p5 == 1 {
                POOL_SIZE as u32
            } else {
                p5 - 1
            };

            Ok(IndexLocation {
                well,
                p5_start: Some(p5_start),
            })
        }
        _ => Err(AssignmentError::MixedLabels {
            i5: i5.to_string(),
            i7: i7.to_string(),
        }),
    }
}

fn parse_label(digits: &str, label: &str) -> Result<u32, AssignmentError> {
    digits
        .parse::<u32>()
        .map_err(|_| AssignmentError::MalformedIndex {
            label: label.to_string(),
        })
}
