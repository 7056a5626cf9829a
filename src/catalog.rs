//! Fixed registry of named colour maps.
//!
//! Every [`ColorChoice`] contributes two entries: a lookup table for
//! colouring 2-D cross-sections and a transfer curve for the 3-D volume.
//! Curves are stored on `[0, 1]` and rescaled to a volume's scalar range
//! when they are bound.

use rayon::prelude::*;

use crate::enums::ColorChoice;
use crate::error::CatalogError;
use crate::transfer::ColorTransferCurve;

const TABLE_SIZE: usize = 256;

/// Discrete, range-bound mapping from intensity to RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    table: Vec<[u8; 4]>,
    range: (f32, f32),
}

impl LookupTable {
    /// Samples `curve` (defined on `[0, 1]`) into a table.
    pub fn from_curve(curve: &ColorTransferCurve) -> Self {
        let table = (0..TABLE_SIZE)
            .into_par_iter()
            .map(|i| {
                let [r, g, b] = curve.evaluate(i as f32 / (TABLE_SIZE - 1) as f32);
                [to_u8(r), to_u8(g), to_u8(b), u8::MAX]
            })
            .collect();
        Self {
            table,
            range: (0.0, 1.0),
        }
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    /// Sets the intensity domain covered by the table.
    pub fn set_range(&mut self, (min, max): (f32, f32)) {
        self.range = (min, max);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    #[inline]
    pub fn map(&self, value: f32) -> [u8; 4] {
        let (min, max) = self.range;
        let last = self.table.len() - 1;
        let index = if max > min {
            let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
            (t * last as f32).round() as usize
        } else if value > min {
            last
        } else {
            0
        };
        self.table[index]
    }
}

#[inline]
fn to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

#[derive(Debug, Clone)]
pub enum EntryKind {
    LookupTable(LookupTable),
    TransferCurve(ColorTransferCurve),
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub kind: EntryKind,
}

/// Closed set of colour maps, built once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    pub fn standard() -> Self {
        let entries = ColorChoice::ALL
            .into_iter()
            .flat_map(|choice| {
                let curve = base_curve(choice);
                [
                    CatalogEntry {
                        name: choice.lookup_table_name(),
                        kind: EntryKind::LookupTable(LookupTable::from_curve(&curve)),
                    },
                    CatalogEntry {
                        name: choice.transfer_curve_name(),
                        kind: EntryKind::TransferCurve(curve),
                    },
                ]
            })
            .collect();
        Self { entries }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    pub fn lookup_by_name(&self, name: &str) -> Result<&CatalogEntry, CatalogError> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| CatalogError::UnknownEntry(name.to_owned()))
    }

    pub fn lookup_table(&self, name: &str) -> Result<&LookupTable, CatalogError> {
        match &self.lookup_by_name(name)?.kind {
            EntryKind::LookupTable(table) => Ok(table),
            EntryKind::TransferCurve(_) => Err(CatalogError::WrongKind {
                name: name.to_owned(),
                expected: "lookup table",
            }),
        }
    }

    pub fn transfer_curve(&self, name: &str) -> Result<&ColorTransferCurve, CatalogError> {
        match &self.lookup_by_name(name)?.kind {
            EntryKind::TransferCurve(curve) => Ok(curve),
            EntryKind::LookupTable(_) => Err(CatalogError::WrongKind {
                name: name.to_owned(),
                expected: "transfer curve",
            }),
        }
    }
}

fn base_curve(choice: ColorChoice) -> ColorTransferCurve {
    match choice {
        ColorChoice::Grayscale => {
            ColorTransferCurve::new([(0.0, [0.0, 0.0, 0.0]), (1.0, [1.0, 1.0, 1.0])])
        }
        ColorChoice::Hot => ColorTransferCurve::new([
            (0.0, [0.0, 0.0, 0.0]),
            (0.375, [1.0, 0.0, 0.0]),
            (0.75, [1.0, 1.0, 0.0]),
            (1.0, [1.0, 1.0, 1.0]),
        ]),
        ColorChoice::Bone => ColorTransferCurve::new([
            (0.0, [0.0, 0.0, 0.0]),
            (0.375, [0.32, 0.32, 0.45]),
            (0.75, [0.65, 0.78, 0.78]),
            (1.0, [1.0, 1.0, 1.0]),
        ]),
        ColorChoice::Rainbow => ColorTransferCurve::new([
            (0.0, [0.0, 0.0, 1.0]),
            (0.25, [0.0, 1.0, 1.0]),
            (0.5, [0.0, 1.0, 0.0]),
            (0.75, [1.0, 1.0, 0.0]),
            (1.0, [1.0, 0.0, 0.0]),
        ]),
    }
}
