use smactpp::core::models::lattice::CellParameters;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid repetition '{0}'. Expected 'NAxNBxNC' with positive integers (e.g., '2x2x2').")]
    InvalidRepeat(String),

    #[error(
        "Invalid cell '{0}'. Expected six comma-separated numbers 'a,b,c,alpha,beta,gamma' (e.g., '6,6,6,90,90,90')."
    )]
    InvalidCell(String),

    #[error("Invalid replacement '{0}'. Expected 'HOST:DOPANT' (e.g., 'Ti:Zr').")]
    InvalidReplacement(String),

    #[error("Component '{component}' cannot be empty in '{value}'.")]
    EmptyComponent {
        component: &'static str,
        value: String,
    },
}

/// Parses a supercell repetition such as `2x2x2` (an `X` or `*` separator is also accepted).
pub fn parse_repeat(value: &str) -> Result<[usize; 3], ParseError> {
    let invalid = || ParseError::InvalidRepeat(value.to_string());
    let parts: Vec<&str> = value
        .trim()
        .split(['x', 'X', '*'])
        .map(str::trim)
        .collect();
    if parts.len() != 3 {
        return Err(invalid());
    }
    let mut repeat = [0usize; 3];
    for (slot, part) in repeat.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| invalid())?;
        if *slot == 0 {
            return Err(invalid());
        }
    }
    Ok(repeat)
}

/// Parses `a,b,c,alpha,beta,gamma` (lengths in Angstroms, angles in degrees).
pub fn parse_cell(value: &str) -> Result<CellParameters, ParseError> {
    let invalid = || ParseError::InvalidCell(value.to_string());
    let numbers = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    let array: [f64; 6] = numbers.try_into().map_err(|_| invalid())?;
    Ok(CellParameters::from(array))
}

/// Parses a substitution `HOST:DOPANT` such as `Ti:Zr`.
pub fn parse_replacement(value: &str) -> Result<(String, String), ParseError> {
    let (host, dopant) = value
        .split_once(':')
        .ok_or_else(|| ParseError::InvalidReplacement(value.to_string()))?;
    let host = host.trim();
    let dopant = dopant.trim();
    if host.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "host",
            value: value.to_string(),
        });
    }
    if dopant.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "dopant",
            value: value.to_string(),
        });
    }
    Ok((host.to_string(), dopant.to_string()))
}
