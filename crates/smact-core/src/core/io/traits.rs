use crate::core::models::structure::CrystalStructure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing crystal-structure file formats.
///
/// Implementors handle format-specific parsing and serialization; the path helpers
/// take care of opening files and buffering.
pub trait StructureFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a crystal structure from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<CrystalStructure, Self::Error>;

    /// Writes a crystal structure to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or I/O operations encounter issues.
    fn write_to(structure: &CrystalStructure, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a crystal structure from a file path.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<CrystalStructure, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a crystal structure to a file path, creating or truncating the file.
    fn write_to_path<P: AsRef<Path>>(
        structure: &CrystalStructure,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(structure, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
