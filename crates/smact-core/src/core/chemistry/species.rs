use super::elements;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SpeciesError {
    #[error("Species string '{0}' does not start with an element symbol")]
    MissingElement(String),
    #[error("Charge in species string '{0}' is out of range")]
    ChargeOutOfRange(String),
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("Species list cannot be empty")]
    Empty,
    #[error("Stoichiometry of '{0}' must be positive")]
    ZeroStoichiometry(String),
}

/// An element in a given oxidation state, e.g. `Fe2+` or `O2-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Species {
    pub element: String,
    pub charge: i8,
}

impl Species {
    pub fn new(element: &str, charge: i8) -> Result<Self, SpeciesError> {
        if !elements::is_element(element) {
            return Err(SpeciesError::UnknownElement(element.to_string()));
        }
        Ok(Self {
            element: element.to_string(),
            charge,
        })
    }

    /// Renders the species, optionally omitting a unit charge (`Na+` instead of `Na1+`).
    pub fn to_string_with(&self, include_one: bool) -> String {
        unparse_spec(&self.element, self.charge, include_one)
    }
}

impl FromStr for Species {
    type Err = SpeciesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (element, charge) = parse_spec(s)?;
        Species::new(&element, charge)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(true))
    }
}

/// Splits a species string of the form `{element}{|charge|}{sign}` into element and signed charge.
///
/// The element is the leading alphabetic run and the magnitude the first digit run. A bare
/// sign (`Na+`, `Cl-`) counts as a unit charge rather than zero, so that the output of
/// `unparse_spec(.., false)` parses back to the same charge. No sign and no digits gives a
/// neutral species. The element symbol itself is not validated here.
pub fn parse_spec(species: &str) -> Result<(String, i8), SpeciesError> {
    let trimmed = species.trim();
    let element: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if element.is_empty() {
        return Err(SpeciesError::MissingElement(species.to_string()));
    }

    let rest = &trimmed[element.len()..];
    let digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    let has_minus = rest.contains('-');
    let has_sign = has_minus || rest.contains('+');

    let magnitude: i8 = if digits.is_empty() {
        if has_sign { 1 } else { 0 }
    } else {
        digits
            .parse()
            .map_err(|_| SpeciesError::ChargeOutOfRange(species.to_string()))?
    };

    let charge = if has_minus { -magnitude } else { magnitude };
    Ok((element, charge))
}

/// The inverse of [`parse_spec`].
pub fn unparse_spec(element: &str, charge: i8, include_one: bool) -> String {
    if include_one || charge.unsigned_abs() != 1 {
        format!("{}{}{}", element, charge.unsigned_abs(), get_sign(charge))
    } else {
        format!("{}{}", element, get_sign(charge))
    }
}

pub fn get_sign(charge: i8) -> &'static str {
    match charge {
        c if c > 0 => "+",
        c if c < 0 => "-",
        _ => "",
    }
}

/// A validated list of species with their stoichiometries, kept sorted by element symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesSet {
    entries: Vec<(Species, u32)>,
}

impl SpeciesSet {
    pub fn new(mut entries: Vec<(Species, u32)>) -> Result<Self, SpeciesError> {
        if entries.is_empty() {
            return Err(SpeciesError::Empty);
        }
        if let Some((species, _)) = entries.iter().find(|(_, n)| *n == 0) {
            return Err(SpeciesError::ZeroStoichiometry(species.to_string()));
        }
        entries.sort_by(|a, b| a.0.element.cmp(&b.0.element).then(a.0.charge.cmp(&b.0.charge)));
        Ok(Self { entries })
    }

    /// Builds the set from `(element, oxidation state, stoichiometry)` triples.
    pub fn from_triples(triples: &[(&str, i8, u32)]) -> Result<Self, SpeciesError> {
        let entries = triples
            .iter()
            .map(|&(el, ox, n)| Species::new(el, ox).map(|s| (s, n)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    pub fn entries(&self) -> &[(Species, u32)] {
        &self.entries
    }

    /// Net charge of the formula unit.
    pub fn total_charge(&self) -> i64 {
        self.entries
            .iter()
            .map(|(s, n)| s.charge as i64 * *n as i64)
            .sum()
    }

    pub fn is_charge_neutral(&self) -> bool {
        self.total_charge() == 0
    }
}
