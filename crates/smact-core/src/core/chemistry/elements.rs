use phf::{Map, phf_map};

/// Static reference data for a chemical element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    /// Atomic number.
    pub number: u8,
    /// Pauling electronegativity, absent for elements without a tabulated value.
    pub electronegativity: Option<f64>,
    /// Oxidation states commonly observed in inorganic solids, sorted ascending.
    pub oxidation_states: &'static [i8],
}

#[rustfmt::skip]
static ELEMENTS: Map<&'static str, ElementData> = phf_map! {
    "H"  => ElementData { number: 1,  electronegativity: Some(2.20), oxidation_states: &[-1, 1] },
    "He" => ElementData { number: 2,  electronegativity: None,       oxidation_states: &[] },
    "Li" => ElementData { number: 3,  electronegativity: Some(0.98), oxidation_states: &[1] },
    "Be" => ElementData { number: 4,  electronegativity: Some(1.57), oxidation_states: &[2] },
    "B"  => ElementData { number: 5,  electronegativity: Some(2.04), oxidation_states: &[3] },
    "C"  => ElementData { number: 6,  electronegativity: Some(2.55), oxidation_states: &[-4, 2, 4] },
    "N"  => ElementData { number: 7,  electronegativity: Some(3.04), oxidation_states: &[-3, 3, 5] },
    "O"  => ElementData { number: 8,  electronegativity: Some(3.44), oxidation_states: &[-2] },
    "F"  => ElementData { number: 9,  electronegativity: Some(3.98), oxidation_states: &[-1] },
    "Ne" => ElementData { number: 10, electronegativity: None,       oxidation_states: &[] },
    "Na" => ElementData { number: 11, electronegativity: Some(0.93), oxidation_states: &[1] },
    "Mg" => ElementData { number: 12, electronegativity: Some(1.31), oxidation_states: &[2] },
    "Al" => ElementData { number: 13, electronegativity: Some(1.61), oxidation_states: &[3] },
    "Si" => ElementData { number: 14, electronegativity: Some(1.90), oxidation_states: &[-4, 4] },
    "P"  => ElementData { number: 15, electronegativity: Some(2.19), oxidation_states: &[-3, 3, 5] },
    "S"  => ElementData { number: 16, electronegativity: Some(2.58), oxidation_states: &[-2, 2, 4, 6] },
    "Cl" => ElementData { number: 17, electronegativity: Some(3.16), oxidation_states: &[-1, 1, 3, 5, 7] },
    "Ar" => ElementData { number: 18, electronegativity: None,       oxidation_states: &[] },
    "K"  => ElementData { number: 19, electronegativity: Some(0.82), oxidation_states: &[1] },
    "Ca" => ElementData { number: 20, electronegativity: Some(1.00), oxidation_states: &[2] },
    "Sc" => ElementData { number: 21, electronegativity: Some(1.36), oxidation_states: &[3] },
    "Ti" => ElementData { number: 22, electronegativity: Some(1.54), oxidation_states: &[2, 3, 4] },
    "V"  => ElementData { number: 23, electronegativity: Some(1.63), oxidation_states: &[2, 3, 4, 5] },
    "Cr" => ElementData { number: 24, electronegativity: Some(1.66), oxidation_states: &[2, 3, 6] },
    "Mn" => ElementData { number: 25, electronegativity: Some(1.55), oxidation_states: &[2, 3, 4, 6, 7] },
    "Fe" => ElementData { number: 26, electronegativity: Some(1.83), oxidation_states: &[2, 3] },
    "Co" => ElementData { number: 27, electronegativity: Some(1.88), oxidation_states: &[2, 3] },
    "Ni" => ElementData { number: 28, electronegativity: Some(1.91), oxidation_states: &[2] },
    "Cu" => ElementData { number: 29, electronegativity: Some(1.90), oxidation_states: &[1, 2] },
    "Zn" => ElementData { number: 30, electronegativity: Some(1.65), oxidation_states: &[2] },
    "Ga" => ElementData { number: 31, electronegativity: Some(1.81), oxidation_states: &[3] },
    "Ge" => ElementData { number: 32, electronegativity: Some(2.01), oxidation_states: &[-4, 2, 4] },
    "As" => ElementData { number: 33, electronegativity: Some(2.18), oxidation_states: &[-3, 3, 5] },
    "Se" => ElementData { number: 34, electronegativity: Some(2.55), oxidation_states: &[-2, 2, 4, 6] },
    "Br" => ElementData { number: 35, electronegativity: Some(2.96), oxidation_states: &[-1, 1, 3, 5] },
    "Kr" => ElementData { number: 36, electronegativity: Some(3.00), oxidation_states: &[2] },
    "Rb" => ElementData { number: 37, electronegativity: Some(0.82), oxidation_states: &[1] },
    "Sr" => ElementData { number: 38, electronegativity: Some(0.95), oxidation_states: &[2] },
    "Y"  => ElementData { number: 39, electronegativity: Some(1.22), oxidation_states: &[3] },
    "Zr" => ElementData { number: 40, electronegativity: Some(1.33), oxidation_states: &[4] },
    "Nb" => ElementData { number: 41, electronegativity: Some(1.60), oxidation_states: &[3, 5] },
    "Mo" => ElementData { number: 42, electronegativity: Some(2.16), oxidation_states: &[4, 6] },
    "Tc" => ElementData { number: 43, electronegativity: Some(1.90), oxidation_states: &[4, 7] },
    "Ru" => ElementData { number: 44, electronegativity: Some(2.20), oxidation_states: &[3, 4] },
    "Rh" => ElementData { number: 45, electronegativity: Some(2.28), oxidation_states: &[3] },
    "Pd" => ElementData { number: 46, electronegativity: Some(2.20), oxidation_states: &[2, 4] },
    "Ag" => ElementData { number: 47, electronegativity: Some(1.93), oxidation_states: &[1] },
    "Cd" => ElementData { number: 48, electronegativity: Some(1.69), oxidation_states: &[2] },
    "In" => ElementData { number: 49, electronegativity: Some(1.78), oxidation_states: &[3] },
    "Sn" => ElementData { number: 50, electronegativity: Some(1.96), oxidation_states: &[-4, 2, 4] },
    "Sb" => ElementData { number: 51, electronegativity: Some(2.05), oxidation_states: &[-3, 3, 5] },
    "Te" => ElementData { number: 52, electronegativity: Some(2.10), oxidation_states: &[-2, 2, 4, 6] },
    "I"  => ElementData { number: 53, electronegativity: Some(2.66), oxidation_states: &[-1, 1, 3, 5, 7] },
    "Xe" => ElementData { number: 54, electronegativity: Some(2.60), oxidation_states: &[2, 4, 6] },
    "Cs" => ElementData { number: 55, electronegativity: Some(0.79), oxidation_states: &[1] },
    "Ba" => ElementData { number: 56, electronegativity: Some(0.89), oxidation_states: &[2] },
    "La" => ElementData { number: 57, electronegativity: Some(1.10), oxidation_states: &[3] },
    "Ce" => ElementData { number: 58, electronegativity: Some(1.12), oxidation_states: &[3, 4] },
    "Pr" => ElementData { number: 59, electronegativity: Some(1.13), oxidation_states: &[3] },
    "Nd" => ElementData { number: 60, electronegativity: Some(1.14), oxidation_states: &[3] },
    "Pm" => ElementData { number: 61, electronegativity: Some(1.13), oxidation_states: &[3] },
    "Sm" => ElementData { number: 62, electronegativity: Some(1.17), oxidation_states: &[2, 3] },
    "Eu" => ElementData { number: 63, electronegativity: Some(1.20), oxidation_states: &[2, 3] },
    "Gd" => ElementData { number: 64, electronegativity: Some(1.20), oxidation_states: &[3] },
    "Tb" => ElementData { number: 65, electronegativity: Some(1.10), oxidation_states: &[3, 4] },
    "Dy" => ElementData { number: 66, electronegativity: Some(1.22), oxidation_states: &[3] },
    "Ho" => ElementData { number: 67, electronegativity: Some(1.23), oxidation_states: &[3] },
    "Er" => ElementData { number: 68, electronegativity: Some(1.24), oxidation_states: &[3] },
    "Tm" => ElementData { number: 69, electronegativity: Some(1.25), oxidation_states: &[3] },
    "Yb" => ElementData { number: 70, electronegativity: Some(1.10), oxidation_states: &[2, 3] },
    "Lu" => ElementData { number: 71, electronegativity: Some(1.27), oxidation_states: &[3] },
    "Hf" => ElementData { number: 72, electronegativity: Some(1.30), oxidation_states: &[4] },
    "Ta" => ElementData { number: 73, electronegativity: Some(1.50), oxidation_states: &[5] },
    "W"  => ElementData { number: 74, electronegativity: Some(2.36), oxidation_states: &[4, 6] },
    "Re" => ElementData { number: 75, electronegativity: Some(1.90), oxidation_states: &[4, 7] },
    "Os" => ElementData { number: 76, electronegativity: Some(2.20), oxidation_states: &[4] },
    "Ir" => ElementData { number: 77, electronegativity: Some(2.20), oxidation_states: &[3, 4] },
    "Pt" => ElementData { number: 78, electronegativity: Some(2.28), oxidation_states: &[2, 4] },
    "Au" => ElementData { number: 79, electronegativity: Some(2.54), oxidation_states: &[1, 3] },
    "Hg" => ElementData { number: 80, electronegativity: Some(2.00), oxidation_states: &[1, 2] },
    "Tl" => ElementData { number: 81, electronegativity: Some(1.62), oxidation_states: &[1, 3] },
    "Pb" => ElementData { number: 82, electronegativity: Some(2.33), oxidation_states: &[2, 4] },
    "Bi" => ElementData { number: 83, electronegativity: Some(2.02), oxidation_states: &[3] },
    "Po" => ElementData { number: 84, electronegativity: Some(2.00), oxidation_states: &[-2, 2, 4] },
    "At" => ElementData { number: 85, electronegativity: Some(2.20), oxidation_states: &[-1, 1] },
    "Rn" => ElementData { number: 86, electronegativity: None,       oxidation_states: &[] },
    "Fr" => ElementData { number: 87, electronegativity: Some(0.70), oxidation_states: &[1] },
    "Ra" => ElementData { number: 88, electronegativity: Some(0.90), oxidation_states: &[2] },
    "Ac" => ElementData { number: 89, electronegativity: Some(1.10), oxidation_states: &[3] },
    "Th" => ElementData { number: 90, electronegativity: Some(1.30), oxidation_states: &[4] },
    "Pa" => ElementData { number: 91, electronegativity: Some(1.50), oxidation_states: &[5] },
    "U"  => ElementData { number: 92, electronegativity: Some(1.38), oxidation_states: &[3, 4, 5, 6] },
    "Np" => ElementData { number: 93, electronegativity: Some(1.36), oxidation_states: &[3, 5] },
    "Pu" => ElementData { number: 94, electronegativity: Some(1.28), oxidation_states: &[3, 4] },
};

/// Looks up the reference data for an element symbol (case-sensitive, e.g. `"Fe"`).
pub fn lookup(symbol: &str) -> Option<&'static ElementData> {
    ELEMENTS.get(symbol)
}

pub fn is_element(symbol: &str) -> bool {
    ELEMENTS.contains_key(symbol)
}

/// Returns the Pauling electronegativity, or `None` for unknown symbols and untabulated elements.
pub fn electronegativity(symbol: &str) -> Option<f64> {
    lookup(symbol).and_then(|e| e.electronegativity)
}
