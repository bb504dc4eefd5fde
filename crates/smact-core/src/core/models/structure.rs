use super::lattice::{Lattice, LatticeError};
use crate::core::chemistry::composition::{Composition, CompositionError};
use crate::core::chemistry::elements;
use nalgebra::{Point3, Vector3};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum StructureError {
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("Site index {index} is out of range for a structure with {len} sites")]
    SiteOutOfRange { index: usize, len: usize },
    #[error("Supercell repetitions must all be at least 1 (got {0:?})")]
    InvalidRepetitions([usize; 3]),
    #[error("Structure contains no sites")]
    Empty,
    #[error(transparent)]
    Lattice(#[from] LatticeError),
    #[error(transparent)]
    Composition(#[from] CompositionError),
}

/// A single occupied position in the unit cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// Element symbol of the occupying atom (e.g. "Ti").
    pub species: String,
    /// Position in fractional coordinates of the lattice.
    pub frac_coords: Point3<f64>,
    /// Formal oxidation state, when known.
    pub oxidation_state: Option<i8>,
}

impl Site {
    pub fn new(species: &str, frac_coords: Point3<f64>) -> Self {
        Self {
            species: species.to_string(),
            frac_coords,
            oxidation_state: None,
        }
    }

    pub fn with_oxidation_state(mut self, oxidation_state: Option<i8>) -> Self {
        self.oxidation_state = oxidation_state;
        self
    }
}

/// A periodic crystal: a lattice plus an ordered list of sites.
///
/// Site order is significant. Substitution and symmetry analysis refer to sites by their
/// index, and writers preserve it.
#[derive(Debug, Clone, PartialEq)]
pub struct CrystalStructure {
    lattice: Lattice,
    sites: Vec<Site>,
}

impl CrystalStructure {
    pub fn new(lattice: Lattice, sites: Vec<Site>) -> Result<Self, StructureError> {
        if sites.is_empty() {
            return Err(StructureError::Empty);
        }
        if let Some(site) = sites.iter().find(|s| !elements::is_element(&s.species)) {
            return Err(StructureError::UnknownElement(site.species.clone()));
        }
        Ok(Self { lattice, sites })
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn site(&self, index: usize) -> Option<&Site> {
        self.sites.get(index)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Indices of every site occupied by `element`.
    pub fn indices_of<'a>(&'a self, element: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.sites
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.species == element)
            .map(|(i, _)| i)
    }

    pub fn species_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for site in &self.sites {
            *counts.entry(site.species.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn composition(&self) -> Result<Composition, StructureError> {
        let counts = self.species_counts();
        let pairs = counts
            .iter()
            .map(|(element, &n)| (element.as_str(), n as u32));
        Ok(Composition::from_pairs(pairs)?)
    }

    /// Reduced formula of the cell contents, e.g. `SrTiO3`.
    pub fn formula(&self) -> Result<String, StructureError> {
        Ok(self.composition()?.reduced_formula())
    }

    pub fn cartesian_positions(&self) -> Vec<Point3<f64>> {
        self.sites
            .iter()
            .map(|s| self.lattice.to_cartesian(&s.frac_coords))
            .collect()
    }

    /// Replaces the atom on one site. The oxidation state of the site is cleared.
    pub fn substitute_site(&mut self, index: usize, element: &str) -> Result<(), StructureError> {
        if !elements::is_element(element) {
            return Err(StructureError::UnknownElement(element.to_string()));
        }
        let len = self.sites.len();
        let site = self
            .sites
            .get_mut(index)
            .ok_or(StructureError::SiteOutOfRange { index, len })?;
        site.species = element.to_string();
        site.oxidation_state = None;
        Ok(())
    }

    /// Replaces every `from` atom with `to`, returning how many sites changed.
    pub fn substitute_species(&mut self, from: &str, to: &str) -> Result<usize, StructureError> {
        if !elements::is_element(to) {
            return Err(StructureError::UnknownElement(to.to_string()));
        }
        let mut replaced = 0;
        for site in self.sites.iter_mut().filter(|s| s.species == from) {
            site.species = to.to_string();
            site.oxidation_state = None;
            replaced += 1;
        }
        Ok(replaced)
    }

    /// Repeats the cell `na × nb × nc` times. Sites are ordered by cell image, then by
    /// their order in the original cell.
    pub fn supercell(&self, repetitions: [usize; 3]) -> Result<Self, StructureError> {
        if repetitions.contains(&0) {
            return Err(StructureError::InvalidRepetitions(repetitions));
        }
        let lattice = self.lattice.scaled(repetitions)?;
        let scale = Vector3::new(
            repetitions[0] as f64,
            repetitions[1] as f64,
            repetitions[2] as f64,
        );

        let mut sites = Vec::with_capacity(self.sites.len() * repetitions.iter().product::<usize>());
        for i in 0..repetitions[0] {
            for j in 0..repetitions[1] {
                for k in 0..repetitions[2] {
                    let shift = Vector3::new(i as f64, j as f64, k as f64);
                    for site in &self.sites {
                        let coords = (site.frac_coords.coords + shift).component_div(&scale);
                        sites.push(Site {
                            species: site.species.clone(),
                            frac_coords: Point3::from(coords),
                            oxidation_state: site.oxidation_state,
                        });
                    }
                }
            }
        }
        Ok(Self { lattice, sites })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rocksalt_primitive() -> CrystalStructure {
        CrystalStructure::new(
            Lattice::cubic(5.64).unwrap(),
            vec![
                Site::new("Na", Point3::new(0.0, 0.0, 0.0)).with_oxidation_state(Some(1)),
                Site::new("Cl", Point3::new(0.5, 0.5, 0.5)).with_oxidation_state(Some(-1)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn new_validates_sites() {
        let lattice = Lattice::cubic(1.0).unwrap();
        assert_eq!(
            CrystalStructure::new(lattice, Vec::new()),
            Err(StructureError::Empty)
        );
        assert_eq!(
            CrystalStructure::new(lattice, vec![Site::new("Zz", Point3::origin())]),
            Err(StructureError::UnknownElement("Zz".to_string()))
        );
    }

    #[test]
    fn formula_and_counts_reflect_sites() {
        let s = rocksalt_primitive();
        assert_eq!(s.len(), 2);
        assert_eq!(s.formula().unwrap(), "NaCl");
        assert_eq!(s.species_counts().get("Na"), Some(&1));
        assert_eq!(s.indices_of("Cl").collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn substitute_site_replaces_species_and_clears_oxidation_state() {
        let mut s = rocksalt_primitive();
        s.substitute_site(0, "K").unwrap();
        assert_eq!(s.site(0).unwrap().species, "K");
        assert_eq!(s.site(0).unwrap().oxidation_state, None);
        assert_eq!(s.site(1).unwrap().oxidation_state, Some(-1));
        assert_eq!(s.formula().unwrap(), "KCl");
    }

    #[test]
    fn substitute_site_rejects_bad_input() {
        let mut s = rocksalt_primitive();
        assert_eq!(
            s.substitute_site(5, "K"),
            Err(StructureError::SiteOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(
            s.substitute_site(0, "Kk"),
            Err(StructureError::UnknownElement("Kk".to_string()))
        );
    }

    #[test]
    fn substitute_species_counts_replacements() {
        let mut s = rocksalt_primitive().supercell([2, 1, 1]).unwrap();
        assert_eq!(s.substitute_species("Cl", "Br").unwrap(), 2);
        assert_eq!(s.substitute_species("I", "Br").unwrap(), 0);
        assert_eq!(s.formula().unwrap(), "NaBr");
    }

    #[test]
    fn supercell_scales_lattice_and_replicates_sites() {
        let s = rocksalt_primitive().supercell([2, 2, 2]).unwrap();
        assert_eq!(s.len(), 16);
        assert!((s.lattice().volume() - 8.0 * 5.64f64.powi(3)).abs() < 1e-6);
        assert!(s.sites().iter().all(|site| {
            site.frac_coords.iter().all(|&x| (0.0..1.0).contains(&x))
        }));
        assert_eq!(s.site(2).unwrap().frac_coords, Point3::new(0.0, 0.0, 0.5));
        assert_eq!(s.formula().unwrap(), "NaCl");
    }

    #[test]
    fn supercell_rejects_zero_repetitions() {
        assert_eq!(
            rocksalt_primitive().supercell([1, 0, 1]),
            Err(StructureError::InvalidRepetitions([1, 0, 1]))
        );
    }

    #[test]
    fn cartesian_positions_use_the_lattice() {
        let s = rocksalt_primitive();
        let positions = s.cartesian_positions();
        assert!((positions[1] - Point3::new(2.82, 2.82, 2.82)).norm() < 1e-9);
    }
}
