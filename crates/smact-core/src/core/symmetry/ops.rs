use nalgebra::{Matrix3, Point3, Vector3};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const TRANSLATION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum OperationParseError {
    #[error("Expected three comma-separated components in '{0}'")]
    ComponentCount(String),
    #[error("Invalid term '{term}' in operation '{operation}'")]
    InvalidTerm { operation: String, term: String },
}

/// A space-group operation `x' = W x + t` acting on fractional coordinates.
///
/// The rotation `W` is an integer matrix in the lattice basis; the translation is kept
/// reduced to `[0, 1)` so that operations differing by a lattice vector compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperation {
    pub rotation: Matrix3<i32>,
    pub translation: Vector3<f64>,
}

impl SymmetryOperation {
    pub fn new(rotation: Matrix3<i32>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation: wrap_vector(&translation),
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::identity())
    }

    fn rotation_f64(&self) -> Matrix3<f64> {
        self.rotation.map(|x| x as f64)
    }

    /// Applies the operation without wrapping the result into the unit cell.
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation_f64() * point.coords + self.translation)
    }

    /// Returns `self ∘ other`, the operation that applies `other` first.
    pub fn compose(&self, other: &SymmetryOperation) -> SymmetryOperation {
        SymmetryOperation::new(
            self.rotation * other.rotation,
            self.rotation_f64() * other.translation + self.translation,
        )
    }

    /// Returns the same rotation with an extra (centring) translation added.
    pub fn translated(&self, shift: &Vector3<f64>) -> SymmetryOperation {
        SymmetryOperation::new(self.rotation, self.translation + shift)
    }

    /// Equality modulo lattice translations.
    pub fn approx_eq(&self, other: &SymmetryOperation) -> bool {
        self.rotation == other.rotation
            && (self.translation - other.translation)
                .iter()
                .all(|d| (d - d.round()).abs() < TRANSLATION_TOLERANCE)
    }

    pub fn determinant(&self) -> i32 {
        let m = &self.rotation;
        m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
            - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
            + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
    }
}

/// Reduces each component into `[0, 1)`, snapping values within tolerance of 1 back to 0.
pub fn wrap_vector(v: &Vector3<f64>) -> Vector3<f64> {
    v.map(wrap_coordinate)
}

pub fn wrap_point(p: &Point3<f64>) -> Point3<f64> {
    Point3::from(wrap_vector(&p.coords))
}

fn wrap_coordinate(x: f64) -> f64 {
    let w = x - x.floor();
    if (1.0 - w).abs() < TRANSLATION_TOLERANCE || w.abs() < TRANSLATION_TOLERANCE {
        0.0
    } else {
        w
    }
}

impl FromStr for SymmetryOperation {
    type Err = OperationParseError;

    /// Parses the coordinate-triplet notation used in the International Tables and CIF files,
    /// e.g. `-y,x-y,z+1/2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '"')
            .collect::<String>()
            .to_ascii_lowercase();
        let components: Vec<&str> = cleaned.split(',').collect();
        if components.len() != 3 {
            return Err(OperationParseError::ComponentCount(s.to_string()));
        }

        let mut rotation = Matrix3::zeros();
        let mut translation = Vector3::zeros();
        for (row, component) in components.iter().enumerate() {
            let (coefficients, shift) = parse_component(component).ok_or_else(|| {
                OperationParseError::InvalidTerm {
                    operation: s.to_string(),
                    term: component.to_string(),
                }
            })?;
            for (col, coefficient) in coefficients.iter().enumerate() {
                rotation[(row, col)] = *coefficient;
            }
            translation[row] = shift;
        }
        Ok(SymmetryOperation::new(rotation, translation))
    }
}

fn parse_component(component: &str) -> Option<([i32; 3], f64)> {
    if component.is_empty() {
        return None;
    }
    let mut coefficients = [0i32; 3];
    let mut shift = 0.0;

    let mut terms: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in component.chars() {
        if (c == '+' || c == '-') && !current.is_empty() {
            terms.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    terms.push(current);

    for term in terms {
        let (sign, body) = match term.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, term.strip_prefix('+').unwrap_or(&term)),
        };
        match body {
            "x" => coefficients[0] += sign,
            "y" => coefficients[1] += sign,
            "z" => coefficients[2] += sign,
            number => {
                let value = match number.split_once('/') {
                    Some((num, den)) => {
                        let num: f64 = num.parse().ok()?;
                        let den: f64 = den.parse().ok()?;
                        if den == 0.0 {
                            return None;
                        }
                        num / den
                    }
                    None => number.parse().ok()?,
                };
                shift += sign as f64 * value;
            }
        }
    }
    Some((coefficients, shift))
}

impl fmt::Display for SymmetryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axes = ['x', 'y', 'z'];
        let mut parts = Vec::with_capacity(3);
        for row in 0..3 {
            let mut part = String::new();
            for (col, axis) in axes.iter().enumerate() {
                match self.rotation[(row, col)] {
                    0 => {}
                    1 => {
                        if !part.is_empty() {
                            part.push('+');
                        }
                        part.push(*axis);
                    }
                    -1 => {
                        part.push('-');
                        part.push(*axis);
                    }
                    n => {
                        if n > 0 && !part.is_empty() {
                            part.push('+');
                        }
                        part.push_str(&format!("{}{}", n, axis));
                    }
                }
            }
            let t = self.translation[row];
            if t.abs() > TRANSLATION_TOLERANCE {
                part.push('+');
                part.push_str(&format_fraction(t));
            }
            if part.is_empty() {
                part.push('0');
            }
            parts.push(part);
        }
        write!(f, "{}", parts.join(","))
    }
}

fn format_fraction(value: f64) -> String {
    for den in [2, 3, 4, 6, 8, 12] {
        let num = value * den as f64;
        if (num - num.round()).abs() < 1e-6 {
            return format!("{}/{}", num.round() as i64, den);
        }
    }
    format!("{:.6}", value)
}
