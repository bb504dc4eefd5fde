use crate::core::io::traits::StructureFile;
use crate::core::models::lattice::{Lattice, LatticeError};
use crate::core::models::structure::{CrystalStructure, Site, StructureError};
use nalgebra::{Matrix3, Point3};
use std::io::{self, BufRead, Write};
use thiserror::Error;

const PROPERTIES: &str = "species:S:1:pos:R:3";

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Comment line has no Lattice=\"...\" entry")]
    MissingLattice,
    #[error("Unsupported Properties '{0}', expected '{PROPERTIES}'")]
    UnsupportedProperties(String),
    #[error("Expected {expected} atoms, found {found}")]
    AtomCount { expected: usize, found: usize },
    #[error(transparent)]
    Lattice(#[from] LatticeError),
    #[error(transparent)]
    Structure(#[from] StructureError),
}

/// Extended XYZ: Cartesian positions plus a `Lattice="..."` entry in the comment line.
pub struct XyzFile;

impl StructureFile for XyzFile {
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<CrystalStructure, Self::Error> {
        let mut lines = reader.lines();

        let count_line = lines.next().transpose()?.ok_or(XyzError::Parse {
            line: 1,
            message: "file is empty".into(),
        })?;
        let expected: usize = count_line.trim().parse().map_err(|_| XyzError::Parse {
            line: 1,
            message: format!("invalid atom count '{}'", count_line.trim()),
        })?;

        let comment = lines.next().transpose()?.ok_or(XyzError::Parse {
            line: 2,
            message: "missing comment line".into(),
        })?;
        if let Some(properties) = quoted_or_bare_value(&comment, "Properties") {
            if properties != PROPERTIES {
                return Err(XyzError::UnsupportedProperties(properties));
            }
        }
        let lattice_text = quoted_or_bare_value(&comment, "Lattice").ok_or(XyzError::MissingLattice)?;
        let values = lattice_text
            .split_whitespace()
            .map(|v| v.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| XyzError::Parse {
                line: 2,
                message: format!("invalid lattice '{}'", lattice_text),
            })?;
        if values.len() != 9 {
            return Err(XyzError::Parse {
                line: 2,
                message: format!("lattice needs 9 numbers, found {}", values.len()),
            });
        }
        let lattice = Lattice::new(Matrix3::from_row_slice(&values))?;

        let mut sites = Vec::with_capacity(expected);
        for (offset, line_res) in lines.enumerate() {
            let line = line_res?;
            let line_num = offset + 3;
            if line.trim().is_empty() {
                continue;
            }
            if sites.len() == expected {
                break;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return Err(XyzError::Parse {
                    line: line_num,
                    message: "expected species and three coordinates".into(),
                });
            }
            let mut coords = [0.0; 3];
            for (slot, raw) in coords.iter_mut().zip(&fields[1..4]) {
                *slot = raw.parse().map_err(|_| XyzError::Parse {
                    line: line_num,
                    message: format!("invalid coordinate '{}'", raw),
                })?;
            }
            let cart = Point3::new(coords[0], coords[1], coords[2]);
            sites.push(Site::new(fields[0], lattice.to_fractional(&cart)));
        }

        if sites.len() != expected {
            return Err(XyzError::AtomCount {
                expected,
                found: sites.len(),
            });
        }
        Ok(CrystalStructure::new(lattice, sites)?)
    }

    fn write_to(structure: &CrystalStructure, writer: &mut impl Write) -> Result<(), Self::Error> {
        let m = structure.lattice().matrix();
        let lattice = m
            .row_iter()
            .flat_map(|row| row.iter().map(|v| format!("{:.8}", v)).collect::<Vec<_>>())
            .collect::<Vec<_>>()
            .join(" ");

        writeln!(writer, "{}", structure.len())?;
        writeln!(
            writer,
            "Lattice=\"{}\" Properties={} pbc=\"T T T\"",
            lattice, PROPERTIES
        )?;
        for (site, cart) in structure.sites().iter().zip(structure.cartesian_positions()) {
            writeln!(
                writer,
                "{:<3} {:>15.8} {:>15.8} {:>15.8}",
                site.species, cart.x, cart.y, cart.z
            )?;
        }
        Ok(())
    }
}

/// Finds `key=value` or `key="quoted value"` in an extended XYZ comment line.
fn quoted_or_bare_value(comment: &str, key: &str) -> Option<String> {
    let pattern = format!("{}=", key);
    let start = comment.find(&pattern)? + pattern.len();
    let rest = &comment[start..];
    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        Some(quoted[..end].to_string())
    } else {
        Some(rest.split_whitespace().next().unwrap_or("").to_string())
    }
}
