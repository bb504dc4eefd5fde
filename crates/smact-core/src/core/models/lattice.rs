use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LatticeError {
    #[error("Lattice lengths must be positive (got a={a}, b={b}, c={c})")]
    NonPositiveLength { a: f64, b: f64, c: f64 },
    #[error("Lattice angles ({alpha}, {beta}, {gamma}) do not describe a valid cell")]
    InvalidAngles { alpha: f64, beta: f64, gamma: f64 },
    #[error("Lattice vectors are linearly dependent")]
    Singular,
}

/// Unit-cell parameters: three lengths in Angstroms and three angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl CellParameters {
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.alpha, self.beta, self.gamma]
    }
}

impl From<[f64; 6]> for CellParameters {
    fn from(p: [f64; 6]) -> Self {
        Self::new(p[0], p[1], p[2], p[3], p[4], p[5])
    }
}

/// A crystal lattice stored as a matrix whose rows are the lattice vectors a, b and c.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    matrix: Matrix3<f64>,
    inverse_transpose: Matrix3<f64>,
}

impl Lattice {
    pub fn new(matrix: Matrix3<f64>) -> Result<Self, LatticeError> {
        if matrix.determinant().abs() < 1e-10 {
            return Err(LatticeError::Singular);
        }
        let inverse_transpose = matrix
            .transpose()
            .try_inverse()
            .ok_or(LatticeError::Singular)?;
        Ok(Self {
            matrix,
            inverse_transpose,
        })
    }

    /// Builds the standard setting: a along x, b in the xy plane, c completing a right-handed cell.
    pub fn from_parameters(params: CellParameters) -> Result<Self, LatticeError> {
        let CellParameters {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        } = params;
        if a <= 0.0 || b <= 0.0 || c <= 0.0 {
            return Err(LatticeError::NonPositiveLength { a, b, c });
        }
        let invalid = || LatticeError::InvalidAngles { alpha, beta, gamma };
        if [alpha, beta, gamma]
            .iter()
            .any(|&angle| angle <= 0.0 || angle >= 180.0)
        {
            return Err(invalid());
        }

        let (cos_a, cos_b, cos_g) = (
            alpha.to_radians().cos(),
            beta.to_radians().cos(),
            gamma.to_radians().cos(),
        );
        let sin_g = gamma.to_radians().sin();

        let cx = c * cos_b;
        let cy = c * (cos_a - cos_b * cos_g) / sin_g;
        let cz_sq = c * c - cx * cx - cy * cy;
        if cz_sq <= 1e-12 {
            return Err(invalid());
        }

        #[rustfmt::skip]
        let matrix = Matrix3::new(
            a,           0.0,         0.0,
            b * cos_g,   b * sin_g,   0.0,
            cx,          cy,          cz_sq.sqrt(),
        );
        Self::new(clean(matrix))
    }

    pub fn cubic(a: f64) -> Result<Self, LatticeError> {
        Self::from_parameters(CellParameters::new(a, a, a, 90.0, 90.0, 90.0))
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Lattice vector `i` (0 = a, 1 = b, 2 = c).
    pub fn vector(&self, i: usize) -> Vector3<f64> {
        self.matrix.row(i).transpose()
    }

    pub fn to_cartesian(&self, frac: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.matrix.transpose() * frac.coords)
    }

    pub fn to_fractional(&self, cart: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.inverse_transpose * cart.coords)
    }

    /// Metric tensor `G = M Mᵀ`, so that `|x|² = xᵀ G x` for fractional vectors.
    pub fn metric(&self) -> Matrix3<f64> {
        self.matrix * self.matrix.transpose()
    }

    pub fn volume(&self) -> f64 {
        self.matrix.determinant().abs()
    }

    pub fn parameters(&self) -> CellParameters {
        let (va, vb, vc) = (self.vector(0), self.vector(1), self.vector(2));
        let angle = |u: &Vector3<f64>, v: &Vector3<f64>| {
            (u.dot(v) / (u.norm() * v.norm()))
                .clamp(-1.0, 1.0)
                .acos()
                .to_degrees()
        };
        CellParameters::new(
            va.norm(),
            vb.norm(),
            vc.norm(),
            angle(&vb, &vc),
            angle(&va, &vc),
            angle(&va, &vb),
        )
    }

    /// Returns the lattice scaled by integer repetitions along each axis.
    pub fn scaled(&self, repetitions: [usize; 3]) -> Result<Self, LatticeError> {
        let mut matrix = self.matrix;
        for (i, &n) in repetitions.iter().enumerate() {
            let mut row = matrix.row_mut(i);
            row *= n as f64;
        }
        Self::new(matrix)
    }

    /// Cartesian length of the shortest lattice image of a fractional difference vector.
    pub fn minimum_image_distance(&self, delta: &Vector3<f64>) -> f64 {
        let wrapped = delta.map(|x| x - x.round());
        let mut best = f64::INFINITY;
        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    let shifted = wrapped + Vector3::new(i as f64, j as f64, k as f64);
                    let cart = self.matrix.transpose() * shifted;
                    best = best.min(cart.norm());
                }
            }
        }
        best
    }
}

fn clean(matrix: Matrix3<f64>) -> Matrix3<f64> {
    matrix.map(|x| if x.abs() < 1e-12 { 0.0 } else { x })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn cubic_lattice_is_diagonal() {
        let lattice = Lattice::cubic(4.0).unwrap();
        assert_eq!(*lattice.matrix(), Matrix3::from_diagonal_element(4.0));
        assert!(approx(lattice.volume(), 64.0));
    }

    #[test]
    fn hexagonal_parameters_round_trip() {
        let params = CellParameters::new(3.0, 3.0, 5.0, 90.0, 90.0, 120.0);
        let lattice = Lattice::from_parameters(params).unwrap();
        let back = lattice.parameters();
        assert!(approx(back.a, 3.0));
        assert!(approx(back.b, 3.0));
        assert!(approx(back.c, 5.0));
        assert!(approx(back.alpha, 90.0));
        assert!(approx(back.beta, 90.0));
        assert!(approx(back.gamma, 120.0));
    }

    #[test]
    fn triclinic_parameters_round_trip() {
        let params = CellParameters::new(4.0, 5.0, 6.0, 80.0, 95.0, 105.0);
        let back = Lattice::from_parameters(params).unwrap().parameters();
        for (x, y) in back.as_array().iter().zip(params.as_array()) {
            assert!(approx(*x, y), "{x} != {y}");
        }
    }

    #[test]
    fn fractional_cartesian_conversion_round_trips() {
        let lattice =
            Lattice::from_parameters(CellParameters::new(3.0, 3.0, 5.0, 90.0, 90.0, 120.0))
                .unwrap();
        let frac = Point3::new(0.25, 0.5, 0.75);
        let cart = lattice.to_cartesian(&frac);
        let back = lattice.to_fractional(&cart);
        assert!((back - frac).norm() < EPS);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(
            Lattice::from_parameters(CellParameters::new(0.0, 1.0, 1.0, 90.0, 90.0, 90.0)),
            Err(LatticeError::NonPositiveLength { .. })
        ));
        assert!(matches!(
            Lattice::from_parameters(CellParameters::new(1.0, 1.0, 1.0, 90.0, 90.0, 180.0)),
            Err(LatticeError::InvalidAngles { .. })
        ));
        assert!(matches!(
            Lattice::from_parameters(CellParameters::new(1.0, 1.0, 1.0, 30.0, 30.0, 90.0)),
            Err(LatticeError::InvalidAngles { .. })
        ));
        assert_eq!(Lattice::new(Matrix3::zeros()), Err(LatticeError::Singular));
    }

    #[test]
    fn scaled_multiplies_rows() {
        let lattice = Lattice::cubic(2.0).unwrap().scaled([1, 2, 3]).unwrap();
        let p = lattice.parameters();
        assert!(approx(p.a, 2.0));
        assert!(approx(p.b, 4.0));
        assert!(approx(p.c, 6.0));
    }

    #[test]
    fn minimum_image_distance_wraps_across_boundaries() {
        let lattice = Lattice::cubic(10.0).unwrap();
        let d = lattice.minimum_image_distance(&Vector3::new(0.95, 0.0, 0.0));
        assert!(approx(d, 0.5));
    }
}
