use super::elements;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CompositionError {
    #[error("Formula is empty")]
    Empty,
    #[error("Unexpected character '{character}' at position {position} in formula '{formula}'")]
    UnexpectedCharacter {
        formula: String,
        character: char,
        position: usize,
    },
    #[error("Unbalanced parentheses in formula '{0}'")]
    UnbalancedParentheses(String),
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("Amount in formula '{0}' is zero or too large")]
    InvalidAmount(String),
}

/// An integer composition: element symbol mapped to the number of atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Composition {
    amounts: BTreeMap<String, u32>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a composition from `(element, amount)` pairs, summing repeated elements.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, u32)>,
    ) -> Result<Self, CompositionError> {
        let mut comp = Self::new();
        for (element, amount) in pairs {
            comp.add(element, amount)?;
        }
        if comp.amounts.is_empty() {
            return Err(CompositionError::Empty);
        }
        Ok(comp)
    }

    fn add(&mut self, element: &str, amount: u32) -> Result<(), CompositionError> {
        if !elements::is_element(element) {
            return Err(CompositionError::UnknownElement(element.to_string()));
        }
        if amount == 0 {
            return Err(CompositionError::InvalidAmount(element.to_string()));
        }
        let entry = self.amounts.entry(element.to_string()).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| CompositionError::InvalidAmount(element.to_string()))?;
        Ok(())
    }

    pub fn amount(&self, element: &str) -> u32 {
        self.amounts.get(element).copied().unwrap_or(0)
    }

    /// Element symbols in alphabetical order.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.amounts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.amounts.iter().map(|(e, n)| (e.as_str(), *n))
    }

    pub fn num_elements(&self) -> usize {
        self.amounts.len()
    }

    pub fn num_atoms(&self) -> u64 {
        self.amounts.values().map(|&n| n as u64).sum()
    }

    /// Divides every amount by their greatest common divisor.
    pub fn reduced(&self) -> Composition {
        let divisor = self.amounts.values().copied().fold(0, gcd);
        if divisor <= 1 {
            return self.clone();
        }
        Composition {
            amounts: self
                .amounts
                .iter()
                .map(|(e, n)| (e.clone(), n / divisor))
                .collect(),
        }
    }

    /// Canonical reduced formula, elements ordered by electronegativity (ties by symbol).
    ///
    /// Two formulas describe the same compound exactly when their reduced formulas are equal,
    /// so this string is the key used to join candidates against database records.
    pub fn reduced_formula(&self) -> String {
        self.reduced().formula()
    }

    /// Formula of this exact composition using the electronegativity ordering.
    pub fn formula(&self) -> String {
        let mut entries: Vec<(&str, u32)> = self.iter().collect();
        entries.sort_by(|(a, _), (b, _)| electronegativity_order(a, b));
        entries
            .into_iter()
            .map(|(e, n)| {
                if n == 1 {
                    e.to_string()
                } else {
                    format!("{}{}", e, n)
                }
            })
            .collect()
    }
}

fn electronegativity_order(a: &str, b: &str) -> Ordering {
    let en = |s: &str| elements::electronegativity(s).unwrap_or(f64::INFINITY);
    en(a).partial_cmp(&en(b))
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.cmp(b))
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formula())
    }
}

impl FromStr for Composition {
    type Err = CompositionError;

    /// Parses formulas such as `CsPbI3`, `Cs1Pb1I3`, `Ca(OH)2` or `Mg3(PO4)2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let formula = s.trim();
        if formula.is_empty() {
            return Err(CompositionError::Empty);
        }
        let chars: Vec<char> = formula.chars().collect();
        let mut parser = FormulaParser {
            formula,
            chars: &chars,
            pos: 0,
        };
        let group = parser.parse_group()?;
        if parser.pos != chars.len() {
            return Err(CompositionError::UnbalancedParentheses(formula.to_string()));
        }

        let mut comp = Composition::new();
        for (element, amount) in group {
            comp.add(&element, amount)?;
        }
        if comp.amounts.is_empty() {
            return Err(CompositionError::Empty);
        }
        Ok(comp)
    }
}

struct FormulaParser<'a> {
    formula: &'a str,
    chars: &'a [char],
    pos: usize,
}

impl FormulaParser<'_> {
    fn parse_group(&mut self) -> Result<BTreeMap<String, u32>, CompositionError> {
        let mut acc: BTreeMap<String, u32> = BTreeMap::new();
        while let Some(&c) = self.chars.get(self.pos) {
            match c {
                '(' | '[' => {
                    let closer = if c == '(' { ')' } else { ']' };
                    self.pos += 1;
                    let inner = self.parse_group()?;
                    match self.chars.get(self.pos) {
                        Some(&end) if end == closer => self.pos += 1,
                        _ => {
                            return Err(CompositionError::UnbalancedParentheses(
                                self.formula.to_string(),
                            ));
                        }
                    }
                    let multiplier = self.parse_amount()?;
                    for (element, amount) in inner {
                        self.merge(&mut acc, element, amount, multiplier)?;
                    }
                }
                ')' | ']' => break,
                c if c.is_ascii_uppercase() => {
                    let mut symbol = String::from(c);
                    self.pos += 1;
                    while let Some(&l) = self.chars.get(self.pos) {
                        if l.is_ascii_lowercase() {
                            symbol.push(l);
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                    let amount = self.parse_amount()?;
                    self.merge(&mut acc, symbol, 1, amount)?;
                }
                c => {
                    return Err(CompositionError::UnexpectedCharacter {
                        formula: self.formula.to_string(),
                        character: c,
                        position: self.pos,
                    });
                }
            }
        }
        Ok(acc)
    }

    fn parse_amount(&mut self) -> Result<u32, CompositionError> {
        let start = self.pos;
        while self
            .chars
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_digit())
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(1);
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        match digits.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(CompositionError::InvalidAmount(self.formula.to_string())),
        }
    }

    fn merge(
        &self,
        acc: &mut BTreeMap<String, u32>,
        element: String,
        amount: u32,
        multiplier: u32,
    ) -> Result<(), CompositionError> {
        let invalid = || CompositionError::InvalidAmount(self.formula.to_string());
        let scaled = amount.checked_mul(multiplier).ok_or_else(invalid)?;
        let entry = acc.entry(element).or_insert(0);
        *entry = entry.checked_add(scaled).ok_or_else(invalid)?;
        Ok(())
    }
}
