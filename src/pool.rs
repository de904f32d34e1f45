//! The Q-barcode pool table.
//!
//! Pooled barcodes are dispensed from a half-plate reagent layout of 48 wells. `POOL_TABLE`
//! lists the pool label held by each of those wells in linear (column-major) order, so
//! `POOL_TABLE[i]` is the label in the left-half well at position `i`. The same reagent
//! layout is repeated on the right half, shifted by 48.
use crate::well::{locate, WellPosition};
use thiserror::Error;

/// Number of pool labels; also the number of wells in one half of a plate.
pub const POOL_SIZE: usize = 48;

/// Reagent half-plate grid, read down each column.
///
/// This layout is reconstructed rather than copied from a reagent plate map. It is
/// column-major Q1..Q48 with Q6 and Q16 swapped, which holds the fixed anchors: position 0
/// is Q1, position 15 is Q6, Q1 is sourced from A7 and Q48 from H12. Check it against the
/// lab's reagent plate before relying on it for pipetting.
///
/// ```text
///        1     2     3     4     5     6
///  A    Q1    Q9   Q17   Q25   Q33   Q41
///  B    Q2   Q10   Q18   Q26   Q34   Q42
///  C    Q3   Q11   Q19   Q27   Q35   Q43
///  D    Q4   Q12   Q20   Q28   Q36   Q44
///  E    Q5   Q13   Q21   Q29   Q37   Q45
///  F   Q16   Q14   Q22   Q30   Q38   Q46
///  G    Q7   Q15   Q23   Q31   Q39   Q47
///  H    Q8    Q6   Q24   Q32   Q40   Q48
/// ```
pub static POOL_TABLE: [&str; POOL_SIZE] = [
    "Q1", "Q2", "Q3", "Q4", "Q5", "Q16", "Q7", "Q8", //
    "Q9", "Q10", "Q11", "Q12", "Q13", "Q14", "Q15", "Q6", //
    "Q17", "Q18", "Q19", "Q20", "Q21", "Q22", "Q23", "Q24", //
    "Q25", "Q26", "Q27", "Q28", "Q29", "Q30", "Q31", "Q32", //
    "Q33", "Q34", "Q35", "Q36", "Q37", "Q38", "Q39", "Q40", //
    "Q41", "Q42", "Q43", "Q44", "Q45", "Q46", "Q47", "Q48", //
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PoolError {
    #[error("pool position {position} is outside the pool table (expected 0..{POOL_SIZE})")]
    PositionOutOfRange { position: usize },

    #[error("`{label}` is not a pool label")]
    UnknownLabel { label: String },
}

/// Returns the pool label at table position `i`.
pub fn at(i: usize) -> Result<&'static str, PoolError> {
    POOL_TABLE
        .get(i)
        .copied()
        .ok_or(PoolError::PositionOutOfRange { position: i })
}

/// Returns the table position of a pool label.
pub fn position_of(label: &str) -> Option<usize> {
    POOL_TABLE.iter().position(|l| *l == label)
}

/// All pool labels in table order.
pub fn labels() -> &'static [&'static str] {
    &POOL_TABLE
}

/// Finds the right-half well holding the reagent for a pool label.
///
/// P7 assignments on the right half of a plate use labels from the left-half layout, so
/// pipetting instructions need the right-half well that physically holds the same
/// barcode reagent.
pub fn p7_source_well(label: &str) -> Result<WellPosition, PoolError> {
    let i = position_of(label).ok_or_else(|| PoolError::UnknownLabel {
        label: label.to_string(),
    })?;
    // i < 48, so i + 48 is always on the plate
    locate(i + POOL_SIZE).map_err(|_| PoolError::PositionOutOfRange { position: i })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fixed_positions() {
        assert_eq!(at(0).unwrap(), "Q1");
        assert_eq!(at(15).unwrap(), "Q6");
        assert_eq!(at(47).unwrap(), "Q48");
        assert_eq!(at(48), Err(PoolError::PositionOutOfRange { position: 48 }));
    }

    #[test]
    fn column_major_with_q6_and_q16_swapped() {
        for (i, label) in labels().iter().enumerate() {
            let expected = match i + 1 {
                6 => 16,
                16 => 6,
                n => n,
            };
            assert_eq!(*label, format!("Q{expected}"), "position {i}");
        }
    }

    #[test]
    fn every_label_appears_once() {
        let unique: HashSet<_> = labels().iter().collect();
        assert_eq!(unique.len(), POOL_SIZE);
        for n in 1..=POOL_SIZE {
            assert!(position_of(&format!("Q{n}")).is_some(), "Q{n} missing");
        }
    }

    #[test]
    fn source_wells() {
        assert_eq!(p7_source_well("Q1").unwrap().to_string(), "A7");
        assert_eq!(p7_source_well("Q48").unwrap().to_string(), "H12");
        assert_eq!(p7_source_well("Q6").unwrap().to_string(), "H8");
    }

    #[test]
    fn source_well_is_always_right_half() {
        for label in labels() {
            let well = p7_source_well(label).unwrap();
            assert!(well.index() >= POOL_SIZE);
            assert_eq!(POOL_TABLE[well.index() - POOL_SIZE], *label);
        }
    }

    #[test]
    fn unknown_label() {
        assert_eq!(
            p7_source_well("Q49"),
            Err(PoolError::UnknownLabel {
                label: "Q49".to_string()
            })
        );
    }
}
