use crate::well::{WellPosition, PLATE_SIZE};
use serde::{Deserialize, Serialize};

/// Anything that claims a well on a plate.
pub trait PlateOccupant {
    /// Identifier reported back when the occupant is part of a conflict.
    fn id(&self) -> &str;

    fn position(&self) -> WellPosition;

    /// Controls (blanks, positive controls) occupy a well but are not biological samples.
    fn is_control(&self) -> bool {
        false
    }
}

/// A row of a plate layout file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: String,
    pub position: WellPosition,
    #[serde(default)]
    pub control: bool,
}

impl PlateOccupant for Occupant {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> WellPosition {
        self.position
    }

    fn is_control(&self) -> bool {
        self.control
    }
}

/// A well claimed by more than one occupant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub position: WellPosition,
    /// Every claimant of the well, in input order.
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Wells with at least one occupant.
    pub occupied: usize,
    /// Occupied wells holding at least one non-control occupant.
    pub samples: usize,
}

fn claimants<'a, T: PlateOccupant>(occupants: &'a [T]) -> Vec<Vec<&'a T>> {
    let mut wells: Vec<Vec<&T>> = vec![Vec::new(); PLATE_SIZE];
    for occupant in occupants {
        wells[occupant.position().index()].push(occupant);
    }
    wells
}

/// Finds every well claimed by more than one occupant, in plate order.
///
/// Each conflict names all of its claimants, so a layout can be corrected in one pass.
pub fn find_conflicts<T: PlateOccupant>(occupants: &[T]) -> Vec<Conflict> {
    claimants(occupants)
        .into_iter()
        .filter(|claims| claims.len() > 1)
        .map(|claims| Conflict {
            position: claims[0].position(),
            ids: claims.iter().map(|o| o.id().to_string()).collect(),
        })
        .collect()
}

/// Counts occupied wells and, of those, the wells holding a real sample.
pub fn tally<T: PlateOccupant>(occupants: &[T]) -> Tally {
    claimants(occupants)
        .iter()
        .filter(|claims| !claims.is_empty())
        .fold(Tally::default(), |mut tally, claims| {
            tally.occupied += 1;
            if claims.iter().any(|o| !o.is_control()) {
                tally.samples += 1;
            }
            tally
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupant(id: &str, position: &str, control: bool) -> Occupant {
        Occupant {
            id: id.to_string(),
            position: position.parse().unwrap(),
            control,
        }
    }

    #[test]
    fn no_conflicts() {
        let layout = vec![
            occupant("S1", "A1", false),
            occupant("S2", "B1", false),
            occupant("S3", "H12", false),
        ];
        assert!(find_conflicts(&layout).is_empty());
    }

    #[test]
    fn shared_well_names_both() {
        let layout = vec![
            occupant("S1", "A1", false),
            occupant("S2", "B1", false),
            occupant("S3", "A1", false),
        ];
        let conflicts = find_conflicts(&layout);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].position.to_string(), "A1");
        assert_eq!(conflicts[0].ids, vec!["S1", "S3"]);
    }

    #[test]
    fn every_claimant_reported() {
        let layout = vec![
            occupant("S1", "C4", false),
            occupant("S2", "C4", false),
            occupant("S3", "C4", true),
            occupant("S4", "A2", false),
            occupant("S5", "A2", false),
        ];
        let conflicts = find_conflicts(&layout);
        assert_eq!(conflicts.len(), 2);
        // plate order: A2 (8) before C4 (26)
        assert_eq!(conflicts[0].position.to_string(), "A2");
        assert_eq!(conflicts[0].ids, vec!["S4", "S5"]);
        assert_eq!(conflicts[1].ids, vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn tally_counts_samples() {
        let layout = vec![
            occupant("S1", "A1", false),
            occupant("blank", "B1", true),
            occupant("S2", "C1", false),
            occupant("S3", "C1", false),
        ];
        assert_eq!(
            tally(&layout),
            Tally {
                occupied: 3,
                samples: 2
            }
        );
        assert_eq!(tally::<Occupant>(&[]), Tally::default());
    }
}
