use super::SymmetryError;
use super::ops::{SymmetryOperation, wrap_point};
use nalgebra::{Point3, Vector3};

const MAX_GROUP_ORDER: usize = 192;
const POSITION_TOLERANCE: f64 = 1e-4;

const FACE_CENTRING: &[[f64; 3]] = &[[0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0]];

struct SpaceGroupDefinition {
    number: u16,
    symbol: &'static str,
    generators: &'static [&'static str],
    centring: &'static [[f64; 3]],
}

#[rustfmt::skip]
const DEFINITIONS: &[SpaceGroupDefinition] = &[
    SpaceGroupDefinition { number: 1,   symbol: "P 1",       generators: &[],                              centring: &[] },
    SpaceGroupDefinition { number: 186, symbol: "P 63 m c",  generators: &["x-y,x,z+1/2", "-y,-x,z"],      centring: &[] },
    SpaceGroupDefinition { number: 216, symbol: "F -4 3 m",  generators: &["z,x,y", "y,-x,-z"],            centring: FACE_CENTRING },
    SpaceGroupDefinition { number: 221, symbol: "P m -3 m",  generators: &["z,x,y", "-y,x,z", "-x,-y,-z"], centring: &[] },
    SpaceGroupDefinition { number: 225, symbol: "F m -3 m",  generators: &["z,x,y", "-y,x,z", "-x,-y,-z"], centring: FACE_CENTRING },
];

/// A space group expanded to its full list of operations (including centring translations).
#[derive(Debug, Clone)]
pub struct SpaceGroup {
    number: u16,
    symbol: &'static str,
    operations: Vec<SymmetryOperation>,
}

impl SpaceGroup {
    /// Builds one of the supported space groups by closing its generators under composition.
    pub fn from_number(number: u16) -> Result<Self, SymmetryError> {
        let definition = DEFINITIONS
            .iter()
            .find(|d| d.number == number)
            .ok_or(SymmetryError::UnsupportedSpaceGroup(number))?;

        let generators = definition
            .generators
            .iter()
            .map(|g| g.parse::<SymmetryOperation>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SymmetryError::Internal(e.to_string()))?;

        let mut operations = close_group(&generators)?;

        let coset_representatives = operations.clone();
        for shift in definition.centring {
            let shift = Vector3::from(*shift);
            operations.extend(coset_representatives.iter().map(|op| op.translated(&shift)));
        }

        Ok(Self {
            number: definition.number,
            symbol: definition.symbol,
            operations,
        })
    }

    pub fn supported_numbers() -> Vec<u16> {
        DEFINITIONS.iter().map(|d| d.number).collect()
    }

    pub fn number(&self) -> u16 {
        self.number
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn operations(&self) -> &[SymmetryOperation] {
        &self.operations
    }

    pub fn order(&self) -> usize {
        self.operations.len()
    }

    /// Generates the distinct positions equivalent to `point`, wrapped into the unit cell,
    /// in order of first appearance.
    pub fn orbit(&self, point: &Point3<f64>) -> Vec<Point3<f64>> {
        let mut positions: Vec<Point3<f64>> = Vec::new();
        for op in &self.operations {
            let candidate = wrap_point(&op.apply(point));
            let duplicate = positions.iter().any(|existing| {
                (candidate - existing)
                    .iter()
                    .all(|d| (d - d.round()).abs() < POSITION_TOLERANCE)
            });
            if !duplicate {
                positions.push(candidate);
            }
        }
        positions
    }
}

fn close_group(generators: &[SymmetryOperation]) -> Result<Vec<SymmetryOperation>, SymmetryError> {
    let mut group = vec![SymmetryOperation::identity()];
    let mut frontier = group.clone();

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for element in &frontier {
            for generator in generators {
                let product = generator.compose(element);
                if !group.iter().any(|g| g.approx_eq(&product)) {
                    group.push(product.clone());
                    next.push(product);
                }
            }
        }
        if group.len() > MAX_GROUP_ORDER {
            return Err(SymmetryError::Internal(
                "generator closure exceeded the maximum space-group order".to_string(),
            ));
        }
        frontier = next;
    }
    Ok(group)
}
