use crate::core::io::traits::StructureFile;
use crate::core::models::lattice::{CellParameters, Lattice, LatticeError};
use crate::core::models::structure::{CrystalStructure, Site, StructureError};
use crate::core::symmetry::ops::{SymmetryOperation, wrap_point};
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const DUPLICATE_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error)]
pub enum CifError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Missing required tag '{0}'")]
    MissingTag(&'static str),
    #[error("Invalid number for '{tag}' (value: '{value}')")]
    InvalidNumber { tag: String, value: String },
    #[error("Invalid symmetry operation '{0}'")]
    InvalidOperation(String),
    #[error("Loop row on line {line} has {found} values but the loop declares {expected} tags")]
    LoopRowLength {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("No atom sites found")]
    NoSites,
    #[error(transparent)]
    Lattice(#[from] LatticeError),
    #[error(transparent)]
    Structure(#[from] StructureError),
}

/// Crystallographic Information File support.
///
/// Structures are written in P 1 with every site listed explicitly. The reader accepts
/// that output as well as files carrying a symmetry-operation loop, in which case the
/// listed sites are expanded by those operations.
pub struct CifFile;

impl StructureFile for CifFile {
    type Error = CifError;

    fn read_from(reader: &mut impl BufRead) -> Result<CrystalStructure, Self::Error> {
        let document = parse_document(reader)?;

        let cell_value = |tag: &'static str| -> Result<f64, CifError> {
            let raw = document.values.get(tag).ok_or(CifError::MissingTag(tag))?;
            parse_number(tag, raw)
        };
        let cell = CellParameters::new(
            cell_value("_cell_length_a")?,
            cell_value("_cell_length_b")?,
            cell_value("_cell_length_c")?,
            cell_value("_cell_angle_alpha")?,
            cell_value("_cell_angle_beta")?,
            cell_value("_cell_angle_gamma")?,
        );
        let lattice = Lattice::from_parameters(cell)?;

        let operations = document
            .loops
            .iter()
            .find_map(|l| {
                l.column("_symmetry_equiv_pos_as_xyz")
                    .or_else(|| l.column("_space_group_symop_operation_xyz"))
            })
            .map(|column| {
                column
                    .iter()
                    .map(|s| {
                        s.parse::<SymmetryOperation>()
                            .map_err(|_| CifError::InvalidOperation(s.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_else(|| vec![SymmetryOperation::identity()]);

        let atom_loop = document
            .loops
            .iter()
            .find(|l| l.index_of("_atom_site_fract_x").is_some())
            .ok_or(CifError::NoSites)?;

        let mut sites: Vec<Site> = Vec::new();
        for row in &atom_loop.rows {
            let field = |tag: &str| atom_loop.index_of(tag).map(|i| row[i].as_str());
            let coordinate = |tag: &'static str| -> Result<f64, CifError> {
                let raw = field(tag).ok_or(CifError::MissingTag(tag))?;
                parse_number(tag, raw)
            };
            let species = field("_atom_site_type_symbol")
                .or_else(|| field("_atom_site_label"))
                .map(element_from_label)
                .ok_or(CifError::MissingTag("_atom_site_type_symbol"))?;
            let position = Point3::new(
                coordinate("_atom_site_fract_x")?,
                coordinate("_atom_site_fract_y")?,
                coordinate("_atom_site_fract_z")?,
            );

            for op in &operations {
                let image = wrap_point(&op.apply(&position));
                let duplicate = sites.iter().any(|s| {
                    (s.frac_coords - image)
                        .iter()
                        .all(|d| (d - d.round()).abs() < DUPLICATE_TOLERANCE)
                });
                if !duplicate {
                    sites.push(Site::new(&species, image));
                }
            }
        }
        if sites.is_empty() {
            return Err(CifError::NoSites);
        }
        Ok(CrystalStructure::new(lattice, sites)?)
    }

    fn write_to(structure: &CrystalStructure, writer: &mut impl Write) -> Result<(), Self::Error> {
        let params = structure.lattice().parameters();
        let composition = structure.composition()?;
        let formula = composition.reduced_formula();
        let formula_sum = composition
            .iter()
            .map(|(element, n)| format!("{}{}", element, n))
            .collect::<Vec<_>>()
            .join(" ");

        writeln!(writer, "# generated by smactpp")?;
        writeln!(writer, "data_{}", formula)?;
        writeln!(writer, "_symmetry_space_group_name_H-M   'P 1'")?;
        writeln!(writer, "_symmetry_Int_Tables_number   1")?;
        writeln!(writer, "_cell_length_a   {:.8}", params.a)?;
        writeln!(writer, "_cell_length_b   {:.8}", params.b)?;
        writeln!(writer, "_cell_length_c   {:.8}", params.c)?;
        writeln!(writer, "_cell_angle_alpha   {:.8}", params.alpha)?;
        writeln!(writer, "_cell_angle_beta   {:.8}", params.beta)?;
        writeln!(writer, "_cell_angle_gamma   {:.8}", params.gamma)?;
        writeln!(writer, "_cell_volume   {:.8}", structure.lattice().volume())?;
        writeln!(writer, "_chemical_formula_structural   {}", formula)?;
        writeln!(writer, "_chemical_formula_sum   '{}'", formula_sum)?;
        writeln!(writer, "loop_")?;
        writeln!(writer, " _symmetry_equiv_pos_site_id")?;
        writeln!(writer, " _symmetry_equiv_pos_as_xyz")?;
        writeln!(writer, "  1  'x, y, z'")?;
        writeln!(writer, "loop_")?;
        writeln!(writer, " _atom_site_type_symbol")?;
        writeln!(writer, " _atom_site_label")?;
        writeln!(writer, " _atom_site_symmetry_multiplicity")?;
        writeln!(writer, " _atom_site_fract_x")?;
        writeln!(writer, " _atom_site_fract_y")?;
        writeln!(writer, " _atom_site_fract_z")?;
        writeln!(writer, " _atom_site_occupancy")?;

        let mut label_counters: HashMap<&str, usize> = HashMap::new();
        for site in structure.sites() {
            let counter = label_counters.entry(site.species.as_str()).or_insert(0);
            let label = format!("{}{}", site.species, counter);
            *counter += 1;
            writeln!(
                writer,
                "  {}  {}  1  {:.8}  {:.8}  {:.8}  1",
                site.species,
                label,
                site.frac_coords.x,
                site.frac_coords.y,
                site.frac_coords.z
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CifDocument {
    values: HashMap<String, String>,
    loops: Vec<CifLoop>,
}

#[derive(Debug, Default)]
struct CifLoop {
    tags: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CifLoop {
    fn index_of(&self, tag: &str) -> Option<usize> {
        self.tags.iter().position(|t| t.eq_ignore_ascii_case(tag))
    }

    fn column(&self, tag: &str) -> Option<Vec<&str>> {
        let index = self.index_of(tag)?;
        Some(self.rows.iter().map(|r| r[index].as_str()).collect())
    }
}

enum ParseState {
    Top,
    LoopHeader,
    LoopBody,
}

fn parse_document(reader: &mut impl BufRead) -> Result<CifDocument, CifError> {
    let mut document = CifDocument::default();
    let mut state = ParseState::Top;
    let mut current = CifLoop::default();
    let mut pending: Vec<String> = Vec::new();
    let mut in_text_field = false;

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = line_num + 1;

        if line.starts_with(';') {
            in_text_field = !in_text_field;
            continue;
        }
        if in_text_field {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let starts_new_item = trimmed.starts_with('_')
            || trimmed.eq_ignore_ascii_case("loop_")
            || trimmed.starts_with("data_");

        if starts_new_item {
            if let ParseState::LoopBody | ParseState::LoopHeader = state {
                if !(matches!(state, ParseState::LoopHeader) && trimmed.starts_with('_')) {
                    document.loops.push(std::mem::take(&mut current));
                    state = ParseState::Top;
                }
            }
        }

        if trimmed.eq_ignore_ascii_case("loop_") {
            state = ParseState::LoopHeader;
            continue;
        }
        if trimmed.starts_with("data_") {
            continue;
        }

        match state {
            ParseState::LoopHeader if trimmed.starts_with('_') => {
                current.tags.push(trimmed.split_whitespace().next().unwrap_or("").to_string());
            }
            ParseState::LoopHeader | ParseState::LoopBody => {
                state = ParseState::LoopBody;
                pending.extend(tokenize(trimmed));
                while pending.len() >= current.tags.len() && !current.tags.is_empty() {
                    let rest = pending.split_off(current.tags.len());
                    current.rows.push(std::mem::replace(&mut pending, rest));
                }
                if current.tags.is_empty() {
                    return Err(CifError::LoopRowLength {
                        line: line_num,
                        expected: 0,
                        found: pending.len(),
                    });
                }
            }
            ParseState::Top => {
                let mut tokens = tokenize(trimmed).into_iter();
                if let (Some(tag), Some(value)) = (tokens.next(), tokens.next()) {
                    document.values.insert(tag.to_ascii_lowercase(), value);
                }
            }
        }
    }

    if !pending.is_empty() {
        return Err(CifError::LoopRowLength {
            line: 0,
            expected: current.tags.len(),
            found: pending.len(),
        });
    }
    if !current.tags.is_empty() {
        document.loops.push(current);
    }
    Ok(document)
}

/// Splits a CIF line into whitespace-separated values, honouring single and double quotes.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '\'' || c == '"' {
            let quote = c;
            chars.next();
            let mut token = String::new();
            while let Some(ch) = chars.next() {
                if ch == quote && chars.peek().is_none_or(|n| n.is_whitespace()) {
                    break;
                }
                token.push(ch);
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                token.push(ch);
                chars.next();
            }
            tokens.push(token);
        }
    }
    tokens
}

/// Parses a CIF number, discarding a trailing standard uncertainty such as `5.431(2)`.
fn parse_number(tag: &str, raw: &str) -> Result<f64, CifError> {
    let value = raw.split('(').next().unwrap_or(raw);
    value.parse().map_err(|_| CifError::InvalidNumber {
        tag: tag.to_string(),
        value: raw.to_string(),
    })
}

/// Extracts an element symbol from a type symbol or label such as `Fe2+`, `O1` or `ti3`.
fn element_from_label(label: &str) -> String {
    let letters: String = label
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .take(2)
        .collect();
    let mut chars = letters.chars();
    let symbol = match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string(),
        None => return String::new(),
    };
    if let Some(second) = chars.next() {
        let candidate = format!("{}{}", symbol, second.to_ascii_lowercase());
        if crate::core::chemistry::elements::is_element(&candidate) {
            return candidate;
        }
    }
    symbol
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::{cubic_perovskite, wurtzite};
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn written_p1_file_reads_back_identically() {
        let original = wurtzite(["Zn", "O"], None, [1, 1, 1]).unwrap();
        let mut buffer = Vec::new();
        CifFile::write_to(&original, &mut buffer).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.contains("data_ZnO"));
        assert!(text.contains("_chemical_formula_sum   'O2 Zn2'"));

        let parsed = CifFile::read_from(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(parsed.len(), original.len());
        for (a, b) in parsed.sites().iter().zip(original.sites()) {
            assert_eq!(a.species, b.species);
            assert!((a.frac_coords - b.frac_coords).norm() < 1e-7);
        }
        let (pa, pb) = (parsed.lattice().parameters(), original.lattice().parameters());
        assert!((pa.gamma - pb.gamma).abs() < 1e-6);
    }

    #[test]
    fn reader_expands_symmetry_operations() {
        let cif = "\
data_NaCl
_cell_length_a 5.64(1)
_cell_length_b 5.64
_cell_length_c 5.64
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
loop_
_symmetry_equiv_pos_as_xyz
'x, y, z'
'x, y+1/2, z+1/2'
'x+1/2, y, z+1/2'
'x+1/2, y+1/2, z'
loop_
_atom_site_label
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Na1 0.0 0.0 0.0
Cl1 0.5 0.5 0.5
";
        let structure = CifFile::read_from(&mut Cursor::new(cif)).unwrap();
        assert_eq!(structure.len(), 8);
        assert_eq!(structure.formula().unwrap(), "NaCl");
        assert!((structure.lattice().parameters().a - 5.64).abs() < 1e-9);
    }

    #[test]
    fn missing_cell_tag_is_reported() {
        let cif = "data_x\n_cell_length_a 1\nloop_\n_atom_site_label\n_atom_site_fract_x\n";
        let result = CifFile::read_from(&mut Cursor::new(cif));
        assert!(matches!(result, Err(CifError::MissingTag("_cell_length_b"))));
    }

    #[test]
    fn invalid_number_is_reported() {
        let cif = "\
_cell_length_a abc
_cell_length_b 1
_cell_length_c 1
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
";
        let result = CifFile::read_from(&mut Cursor::new(cif));
        assert!(matches!(result, Err(CifError::InvalidNumber { .. })));
    }

    #[test]
    fn tokenizer_respects_quotes() {
        assert_eq!(
            tokenize("  1  'x, y, z'  \"a b\" c"),
            vec!["1", "x, y, z", "a b", "c"]
        );
        assert_eq!(tokenize("O'1 0.5"), vec!["O'1", "0.5"]);
    }

    #[test]
    fn element_from_label_normalises_case_and_suffixes() {
        assert_eq!(element_from_label("Fe2+"), "Fe");
        assert_eq!(element_from_label("O1"), "O");
        assert_eq!(element_from_label("TI3"), "Ti");
        assert_eq!(element_from_label("Ox"), "O");
    }

    #[test]
    fn path_helpers_write_and_read_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seed.cif");
        let structure = cubic_perovskite(["Sr", "Ti", "O"], None, [1, 1, 1]).unwrap();
        CifFile::write_to_path(&structure, &path).unwrap();
        let back = CifFile::read_from_path(&path).unwrap();
        assert_eq!(back.formula().unwrap(), "SrTiO3");
    }
}
