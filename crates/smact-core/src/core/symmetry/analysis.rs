use super::SymmetryError;
use super::ops::SymmetryOperation;
use crate::core::models::lattice::Lattice;
use crate::core::models::structure::CrystalStructure;
use nalgebra::{Matrix3, Point3, Vector3};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Default matching tolerance in Angstroms.
pub const DEFAULT_TOLERANCE: f64 = 1e-2;

/// The symmetry operations of a concrete structure together with the site permutation each
/// one induces (`permutations[k][i]` is the image of site `i` under operation `k`).
#[derive(Debug, Clone)]
pub struct StructureSymmetry {
    pub operations: Vec<SymmetryOperation>,
    pub permutations: Vec<Vec<usize>>,
}

impl StructureSymmetry {
    /// Orbit representative for each site: the smallest index among its equivalent sites.
    pub fn equivalent_sites(&self, num_sites: usize) -> Vec<usize> {
        let mut parent: Vec<usize> = (0..num_sites).collect();

        fn find(parent: &mut [usize], i: usize) -> usize {
            let mut root = i;
            while parent[root] != root {
                root = parent[root];
            }
            let mut node = i;
            while parent[node] != root {
                let next = parent[node];
                parent[node] = root;
                node = next;
            }
            root
        }

        for permutation in &self.permutations {
            for (i, &j) in permutation.iter().enumerate() {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    let (low, high) = if ri < rj { (ri, rj) } else { (rj, ri) };
                    parent[high] = low;
                }
            }
        }
        (0..num_sites).map(|i| find(&mut parent, i)).collect()
    }
}

/// A set of symmetry-equivalent sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteGroup {
    pub species: String,
    pub representative: usize,
    pub members: Vec<usize>,
}

impl SiteGroup {
    pub fn multiplicity(&self) -> usize {
        self.members.len()
    }
}

/// Finds every operation `(W, t)` that maps the structure onto itself.
///
/// Candidate rotations are the integer matrices with entries in {-1, 0, 1} that preserve the
/// lattice metric; candidate translations map a reference atom of the least abundant species
/// onto each atom of that species. Positions match when their minimum-image distance is
/// below `tolerance` Angstroms.
#[instrument(skip_all, fields(num_sites = structure.len()))]
pub fn find_symmetry_operations(
    structure: &CrystalStructure,
    tolerance: f64,
) -> Result<StructureSymmetry, SymmetryError> {
    if tolerance <= 0.0 || !tolerance.is_finite() {
        return Err(SymmetryError::InvalidTolerance(tolerance));
    }
    let lattice = structure.lattice();
    let sites = structure.sites();

    let counts = structure.species_counts();
    let (reference_species, _) = counts
        .iter()
        .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
        .ok_or_else(|| SymmetryError::Internal("structure has no sites".to_string()))?;
    let reference_index = structure
        .indices_of(reference_species)
        .next()
        .ok_or_else(|| SymmetryError::Internal("reference species vanished".to_string()))?;
    let reference_point = sites[reference_index].frac_coords;
    let reference_images: Vec<usize> = structure.indices_of(reference_species).collect();

    let rotations = lattice_point_group(lattice);
    debug!(num_rotations = rotations.len(), "Lattice point group found.");

    let mut operations = Vec::new();
    let mut permutations = Vec::new();
    for rotation in rotations {
        let probe = SymmetryOperation::new(rotation, Vector3::zeros());
        let rotated_reference = probe.apply(&reference_point);
        for &target in &reference_images {
            let translation = sites[target].frac_coords - rotated_reference;
            let candidate = SymmetryOperation::new(rotation, translation);
            if let Some(permutation) = site_permutation(structure, &candidate, tolerance) {
                if !operations
                    .iter()
                    .any(|op: &SymmetryOperation| op.approx_eq(&candidate))
                {
                    operations.push(candidate);
                    permutations.push(permutation);
                }
            }
        }
    }

    if operations.is_empty() {
        return Err(SymmetryError::Internal(
            "identity operation was not recovered; tolerance too small?".to_string(),
        ));
    }
    debug!(num_operations = operations.len(), "Symmetry search complete.");
    Ok(StructureSymmetry {
        operations,
        permutations,
    })
}

/// Orbit representative index for every site.
pub fn equivalent_sites(
    structure: &CrystalStructure,
    tolerance: f64,
) -> Result<Vec<usize>, SymmetryError> {
    let symmetry = find_symmetry_operations(structure, tolerance)?;
    Ok(symmetry.equivalent_sites(structure.len()))
}

/// Groups the sites into symmetry-inequivalent sets, optionally keeping only one element.
///
/// Groups are ordered by their representative (lowest) site index.
pub fn inequivalent_sites(
    structure: &CrystalStructure,
    element: Option<&str>,
    tolerance: f64,
) -> Result<Vec<SiteGroup>, SymmetryError> {
    let representatives = equivalent_sites(structure, tolerance)?;
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, &representative) in representatives.iter().enumerate() {
        let species = &structure.sites()[index].species;
        if element.is_some_and(|e| e != species) {
            continue;
        }
        groups.entry(representative).or_default().push(index);
    }
    Ok(groups
        .into_iter()
        .map(|(representative, members)| SiteGroup {
            species: structure.sites()[representative].species.clone(),
            representative,
            members,
        })
        .collect())
}

fn site_permutation(
    structure: &CrystalStructure,
    operation: &SymmetryOperation,
    tolerance: f64,
) -> Option<Vec<usize>> {
    let lattice = structure.lattice();
    let sites = structure.sites();
    let mut permutation = Vec::with_capacity(sites.len());
    let mut used = vec![false; sites.len()];
    for site in sites {
        let image = operation.apply(&site.frac_coords);
        let matched = sites.iter().enumerate().position(|(j, other)| {
            !used[j]
                && other.species == site.species
                && coincide(lattice, &image, &other.frac_coords, tolerance)
        })?;
        used[matched] = true;
        permutation.push(matched);
    }
    Some(permutation)
}

fn coincide(lattice: &Lattice, a: &Point3<f64>, b: &Point3<f64>, tolerance: f64) -> bool {
    lattice.minimum_image_distance(&(a - b)) < tolerance
}

fn lattice_point_group(lattice: &Lattice) -> Vec<Matrix3<i32>> {
    let metric = lattice.metric();
    let scale = metric.abs().max().max(1.0);
    let values = [-1i32, 0, 1];
    let mut rotations = Vec::new();

    let mut entries = [0i32; 9];
    let total = 3usize.pow(9);
    for code in 0..total {
        let mut c = code;
        for entry in entries.iter_mut() {
            *entry = values[c % 3];
            c /= 3;
        }
        let w = Matrix3::from_row_slice(&entries);
        let det = w.map(|x| x as f64).determinant().round() as i32;
        if det.abs() != 1 {
            continue;
        }
        let wf = w.map(|x| x as f64);
        let transformed = wf.transpose() * metric * wf;
        if (transformed - metric).abs().max() < 1e-4 * scale {
            rotations.push(w);
        }
    }
    rotations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::lattice::CellParameters;
    use crate::core::models::structure::Site;

    fn perovskite() -> CrystalStructure {
        CrystalStructure::new(
            Lattice::cubic(3.9).unwrap(),
            vec![
                Site::new("Sr", Point3::new(0.0, 0.0, 0.0)),
                Site::new("Ti", Point3::new(0.5, 0.5, 0.5)),
                Site::new("O", Point3::new(0.5, 0.5, 0.0)),
                Site::new("O", Point3::new(0.5, 0.0, 0.5)),
                Site::new("O", Point3::new(0.0, 0.5, 0.5)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn cubic_lattice_point_group_has_48_operations() {
        assert_eq!(lattice_point_group(&Lattice::cubic(4.0).unwrap()).len(), 48);
    }

    #[test]
    fn hexagonal_lattice_point_group_has_24_operations() {
        let lattice =
            Lattice::from_parameters(CellParameters::new(3.0, 3.0, 5.0, 90.0, 90.0, 120.0))
                .unwrap();
        assert_eq!(lattice_point_group(&lattice).len(), 24);
    }

    #[test]
    fn perovskite_has_full_cubic_symmetry() {
        let symmetry = find_symmetry_operations(&perovskite(), DEFAULT_TOLERANCE).unwrap();
        assert_eq!(symmetry.operations.len(), 48);
        assert!(symmetry.operations.iter().any(|op| op.is_identity()));
    }

    #[test]
    fn perovskite_oxygens_form_one_orbit() {
        let groups = inequivalent_sites(&perovskite(), None, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[2].species, "O");
        assert_eq!(groups[2].members, vec![2, 3, 4]);
        assert_eq!(groups[2].multiplicity(), 3);
    }

    #[test]
    fn substitution_breaks_oxygen_orbit() {
        let mut s = perovskite();
        s.substitute_site(2, "F").unwrap();
        let oxygens = inequivalent_sites(&s, Some("O"), DEFAULT_TOLERANCE).unwrap();
        assert_eq!(oxygens.len(), 1);
        assert_eq!(oxygens[0].members, vec![3, 4]);
    }

    #[test]
    fn supercell_translations_make_all_titanium_equivalent() {
        let s = perovskite().supercell([2, 2, 2]).unwrap();
        let titanium = inequivalent_sites(&s, Some("Ti"), DEFAULT_TOLERANCE).unwrap();
        assert_eq!(titanium.len(), 1);
        assert_eq!(titanium[0].multiplicity(), 8);
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        assert!(matches!(
            find_symmetry_operations(&perovskite(), 0.0),
            Err(SymmetryError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn every_permutation_is_a_bijection() {
        let s = perovskite();
        let symmetry = find_symmetry_operations(&s, DEFAULT_TOLERANCE).unwrap();
        for permutation in &symmetry.permutations {
            let mut sorted = permutation.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..s.len()).collect::<Vec<_>>());
        }
    }
}
