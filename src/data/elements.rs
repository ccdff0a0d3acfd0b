/// Reference emission-line table and element matching.
///
/// The table maps element names to their characteristic line wavelengths
/// in nanometers. It is loaded once at startup (built-in data or a user
/// JSON file) and never mutated afterwards.
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One reference line found within tolerance of a query wavelength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineMatch {
    pub element: String,
    pub wavelength: f64,
}

impl std::fmt::Display for LineMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.1} nm)", self.element, self.wavelength)
    }
}

/// Immutable element → known-line-wavelengths association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceLineTable {
    lines: HashMap<String, Vec<f64>>,
}

impl ReferenceLineTable {
    /// Built-in table of characteristic emission lines (nm).
    pub fn builtin() -> Self {
        let lines = BUILTIN_LINES
            .iter()
            .map(|(name, wls)| (name.to_string(), wls.to_vec()))
            .collect();
        Self { lines }
    }

    /// Load a table from a JSON file mapping element name → wavelength list.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let lines: HashMap<String, Vec<f64>> = serde_json::from_str(&text)
            .map_err(|e| crate::error::SpectrumError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Self { lines })
    }

    pub fn num_elements(&self) -> usize {
        self.lines.len()
    }

    /// All (element, line) pairs within `tolerance` nm of `wavelength`.
    ///
    /// An element appears once per matching line. An empty result means
    /// no known line is close enough — a normal outcome, not an error.
    pub fn matches_near(&self, wavelength: f64, tolerance: f64) -> Vec<LineMatch> {
        let mut matches: Vec<LineMatch> = self
            .lines
            .iter()
            .flat_map(|(element, wls)| {
                wls.iter()
                    .filter(move |wl| (**wl - wavelength).abs() <= tolerance)
                    .map(move |wl| LineMatch {
                        element: element.clone(),
                        wavelength: *wl,
                    })
            })
            .collect();
        // HashMap iteration order is arbitrary; sort for stable output
        matches.sort_by(|a, b| {
            a.wavelength
                .partial_cmp(&b.wavelength)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.element.cmp(&b.element))
        });
        matches
    }
}

/// Characteristic emission lines in nanometers.
const BUILTIN_LINES: &[(&str, &[f64])] = &[
    ("Hydrogen", &[410.2, 434.0, 486.1, 656.3]),
    ("Helium", &[587.6, 468.6, 667.8]),
    ("Oxygen", &[777.4, 844.6, 407.0]),
    ("Nitrogen", &[399.5, 460.1]),
    ("Carbon", &[247.9, 265.5, 357.7]),
    ("Sodium", &[589.0, 589.9]),
    ("Calcium", &[393.4, 396.8, 422.2]),
    ("Magnesium", &[518.4, 577.0]),
    ("Iron", &[526.9, 532.8, 458.3]),
    ("Boron", &[249.7, 257.9]),
    ("Aluminium", &[396.1, 667.8]),
    ("Silicon", &[288.1, 390.5, 410.3]),
    ("Sulphur", &[921.0, 406.8]),
    ("Chromium", &[425.4, 427.5]),
    ("Cobalt", &[345.3, 350.5, 355.5]),
    ("Strontium", &[460.7, 421.5, 407.8]),
    ("Radon", &[508.0, 534.3]),
    ("Platinum", &[360.3, 405.8, 304.3]),
    ("Silver", &[328.1, 338.3, 481.3]),
    ("Ruthenium", &[265.8, 373.1, 410.3]),
    ("Rhodium", &[343.2, 373.0, 420.6]),
    ("Palladium", &[341.4, 350.5, 379.8]),
    ("Tantalum", &[260.0, 261.4, 277.1]),
    ("Niobium", &[341.8, 347.0, 384.3]),
    ("Molybdenum", &[314.0, 370.0, 385.5]),
    ("Rhenium", &[335.0, 350.2, 406.0]),
    ("Osmium", &[248.3, 278.6, 305.6]),
    ("Iridium", &[238.3, 251.6, 291.0]),
    ("Tungsten", &[312.3, 335.0, 400.9]),
    ("Uranium", &[328.3, 367.3, 405.0]),
    ("Neodymium", &[334.5, 354.9, 379.5]),
    ("Samarium", &[343.1, 364.8, 401.9]),
    ("Europium", &[420.3, 443.0, 552.1]),
    ("Gadolinium", &[335.0, 363.0, 393.0]),
    ("Cerium", &[404.7, 418.6, 422.7]),
    ("Lanthanum", &[327.7, 379.5, 407.4]),
    ("Neon", &[585.2, 640.2]),
    ("Actinium", &[339.0, 403.0]),
    ("Thorium", &[401.9, 426.5, 433.6]),
    ("Plutonium", &[239.3, 315.2]),
    ("Americium", &[442.0, 548.0]),
    ("Curium", &[250.0, 291.0]),
    ("Berkelium", &[290.0, 315.0]),
    ("Californium", &[404.0, 442.0]),
    ("Fermium", &[283.0, 309.0]),
    ("Mendelevium", &[271.0, 310.0]),
    ("Lawrencium", &[340.0, 380.0]),
    ("Rutherfordium", &[271.0, 289.0]),
    ("Dubnium", &[278.0, 302.0]),
    ("Seaborgium", &[267.0, 291.0]),
    ("Bohrium", &[274.0, 295.0]),
    ("Hassium", &[252.0, 270.0]),
    ("Lithium", &[670.8, 610.3, 460.3]),
    ("Beryllium", &[234.8, 313.1]),
    ("Fluorine", &[685.6, 739.9]),
    ("Chlorine", &[725.7, 858.6]),
    ("Argon", &[696.5, 742.4]),
    ("Copper", &[324.7, 510.6, 327.4]),
    ("Zinc", &[213.9, 481.0]),
    ("Lead", &[405.8, 440.6]),
    ("Nickel", &[330.3, 341.5, 371.0]),
    ("Titanium", &[334.2, 336.1, 376.1]),
    ("Manganese", &[403.1, 404.4]),
    ("Zirconium", &[347.1, 339.6, 346.4]),
    ("Barium", &[455.4, 493.4]),
    ("Radium", &[407.8, 442.0]),
    ("Potassium", &[404.4, 769.9, 766.5]),
    ("Phosphorus", &[253.4, 178.3]),
];
