use super::lattice::{CellParameters, Lattice, LatticeError};
use super::structure::{CrystalStructure, Site, StructureError};
use crate::core::symmetry::SymmetryError;
use crate::core::symmetry::spacegroup::SpaceGroup;
use nalgebra::Point3;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum BuildError {
    #[error("Expected {expected} species for the basis, got {found}")]
    SpeciesCount { expected: usize, found: usize },
    #[error(transparent)]
    SpaceGroup(#[from] SymmetryError),
    #[error(transparent)]
    Lattice(#[from] LatticeError),
    #[error(transparent)]
    Structure(#[from] StructureError),
}

/// Default cell for [`cubic_perovskite`]: a = b = c = 6 Å, all angles 90°.
pub const PEROVSKITE_CELL: [f64; 6] = [6.0, 6.0, 6.0, 90.0, 90.0, 90.0];
/// Default cell for [`wurtzite`]: a = b = 3 Å, c = 6 Å, γ = 120°.
pub const WURTZITE_CELL: [f64; 6] = [3.0, 3.0, 6.0, 90.0, 90.0, 120.0];

/// Builds a crystal from asymmetric-unit positions and a space group.
///
/// Each basis position is expanded into its full orbit under the space group; `species[i]`
/// occupies every position generated from `basis[i]`. The resulting cell is then repeated
/// `repetitions` times along a, b and c.
pub fn crystal(
    species: &[&str],
    basis: &[Point3<f64>],
    spacegroup: u16,
    cell: CellParameters,
    repetitions: [usize; 3],
) -> Result<CrystalStructure, BuildError> {
    let oxidation_states = vec![None; basis.len()];
    crystal_with_oxidation_states(species, basis, &oxidation_states, spacegroup, cell, repetitions)
}

fn crystal_with_oxidation_states(
    species: &[&str],
    basis: &[Point3<f64>],
    oxidation_states: &[Option<i8>],
    spacegroup: u16,
    cell: CellParameters,
    repetitions: [usize; 3],
) -> Result<CrystalStructure, BuildError> {
    if species.len() != basis.len() {
        return Err(BuildError::SpeciesCount {
            expected: basis.len(),
            found: species.len(),
        });
    }
    let group = SpaceGroup::from_number(spacegroup)?;
    let lattice = Lattice::from_parameters(cell)?;

    let mut sites = Vec::new();
    for ((element, position), oxidation_state) in species.iter().zip(basis).zip(oxidation_states) {
        for frac_coords in group.orbit(position) {
            sites.push(Site::new(element, frac_coords).with_oxidation_state(*oxidation_state));
        }
    }
    debug!(
        spacegroup = group.symbol(),
        num_sites = sites.len(),
        "Expanded basis into unit cell."
    );

    let unit_cell = CrystalStructure::new(lattice, sites)?;
    if repetitions == [1, 1, 1] {
        Ok(unit_cell)
    } else {
        Ok(unit_cell.supercell(repetitions)?)
    }
}

/// Cubic perovskite ABX3 in space group 221, with formal oxidation states A²⁺, B⁴⁺ and X²⁻.
///
/// `species` lists the A, B and X elements in that order.
pub fn cubic_perovskite(
    species: [&str; 3],
    cell: Option<CellParameters>,
    repetitions: [usize; 3],
) -> Result<CrystalStructure, BuildError> {
    crystal_with_oxidation_states(
        &species,
        &[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(0.5, 0.5, 0.0),
        ],
        &[Some(2), Some(4), Some(-2)],
        221,
        cell.unwrap_or_else(|| PEROVSKITE_CELL.into()),
        repetitions,
    )
}

/// Wurtzite AX in space group 186.
pub fn wurtzite(
    species: [&str; 2],
    cell: Option<CellParameters>,
    repetitions: [usize; 3],
) -> Result<CrystalStructure, BuildError> {
    crystal(
        &species,
        &[
            Point3::new(2.0 / 3.0, 1.0 / 3.0, 0.0),
            Point3::new(2.0 / 3.0, 1.0 / 3.0, 5.0 / 8.0),
        ],
        186,
        cell.unwrap_or_else(|| WURTZITE_CELL.into()),
        repetitions,
    )
}

/// Rock-salt AX in space group 225.
pub fn rocksalt(
    species: [&str; 2],
    lattice_constant: f64,
    repetitions: [usize; 3],
) -> Result<CrystalStructure, BuildError> {
    crystal(
        &species,
        &[Point3::new(0.0, 0.0, 0.0), Point3::new(0.5, 0.5, 0.5)],
        225,
        cubic_cell(lattice_constant),
        repetitions,
    )
}

/// Zinc-blende AX in space group 216.
pub fn zincblende(
    species: [&str; 2],
    lattice_constant: f64,
    repetitions: [usize; 3],
) -> Result<CrystalStructure, BuildError> {
    crystal(
        &species,
        &[Point3::new(0.0, 0.0, 0.0), Point3::new(0.25, 0.25, 0.25)],
        216,
        cubic_cell(lattice_constant),
        repetitions,
    )
}

fn cubic_cell(a: f64) -> CellParameters {
    CellParameters::new(a, a, a, 90.0, 90.0, 90.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::symmetry::analysis::{DEFAULT_TOLERANCE, inequivalent_sites};

    #[test]
    fn perovskite_unit_cell_has_five_sites_with_oxidation_states() {
        let s = cubic_perovskite(["Sr", "Ti", "O"], None, [1, 1, 1]).unwrap();
        assert_eq!(s.len(), 5);
        assert_eq!(s.formula().unwrap(), "SrTiO3");
        let states: Vec<_> = s.sites().iter().map(|site| site.oxidation_state).collect();
        assert_eq!(
            states,
            vec![Some(2), Some(4), Some(-2), Some(-2), Some(-2)]
        );
        assert!((s.lattice().parameters().a - 6.0).abs() < 1e-9);
    }

    #[test]
    fn perovskite_supercell_repeats_the_cell() {
        let s = cubic_perovskite(["Ba", "Ti", "O"], None, [2, 2, 2]).unwrap();
        assert_eq!(s.len(), 40);
        assert_eq!(s.species_counts().get("O"), Some(&24));
    }

    #[test]
    fn wurtzite_has_two_formula_units() {
        let s = wurtzite(["Zn", "O"], None, [1, 1, 1]).unwrap();
        assert_eq!(s.len(), 4);
        assert_eq!(s.formula().unwrap(), "ZnO");
        let params = s.lattice().parameters();
        assert!((params.a - 3.0).abs() < 1e-9);
        assert!((params.b - 3.0).abs() < 1e-9);
        assert!((params.gamma - 120.0).abs() < 1e-6);
        assert!((params.c - 6.0).abs() < 1e-9);
    }

    #[test]
    fn wurtzite_sites_fall_into_two_orbits() {
        let s = wurtzite(["Ga", "N"], Some([3.19, 3.19, 5.19, 90.0, 90.0, 120.0].into()), [1, 1, 1])
            .unwrap();
        let groups = inequivalent_sites(&s, None, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.multiplicity() == 2));
    }

    #[test]
    fn rocksalt_and_zincblende_have_eight_sites() {
        assert_eq!(rocksalt(["Na", "Cl"], 5.64, [1, 1, 1]).unwrap().len(), 8);
        let zb = zincblende(["Zn", "S"], 5.41, [1, 1, 1]).unwrap();
        assert_eq!(zb.len(), 8);
        assert_eq!(zb.formula().unwrap(), "ZnS");
    }

    #[test]
    fn mismatched_species_and_basis_is_an_error() {
        let result = crystal(
            &["Na"],
            &[Point3::origin(), Point3::new(0.5, 0.5, 0.5)],
            225,
            cubic_cell(5.0),
            [1, 1, 1],
        );
        assert_eq!(
            result,
            Err(BuildError::SpeciesCount {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn unsupported_space_group_is_reported() {
        let result = crystal(&["Na"], &[Point3::origin()], 99, cubic_cell(5.0), [1, 1, 1]);
        assert_eq!(
            result,
            Err(BuildError::SpaceGroup(SymmetryError::UnsupportedSpaceGroup(99)))
        );
    }
}
