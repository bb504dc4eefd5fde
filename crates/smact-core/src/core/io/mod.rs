pub mod cif;
pub mod format;
pub mod records;
pub mod table;
pub mod traits;
pub mod xyz;
