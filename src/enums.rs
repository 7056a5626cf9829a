use std::fmt;
use std::str::FromStr;

/// Fixed orientation of a cutting plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

impl Orientation {
    pub const ALL: [Orientation; 3] = [
        Orientation::Axial,
        Orientation::Coronal,
        Orientation::Sagittal,
    ];

    /// Position of this orientation in per-plane tables.
    pub fn index(self) -> usize {
        match self {
            Orientation::Axial => 0,
            Orientation::Coronal => 1,
            Orientation::Sagittal => 2,
        }
    }

    /// The display surface showing this plane.
    pub fn surface(self) -> Surface {
        match self {
            Orientation::Axial => Surface::Axial,
            Orientation::Coronal => Surface::Coronal,
            Orientation::Sagittal => Surface::Sagittal,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Orientation::Axial => "axial",
            Orientation::Coronal => "coronal",
            Orientation::Sagittal => "sagittal",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Orientation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "axial" | "z" => Ok(Orientation::Axial),
            "coronal" | "y" => Ok(Orientation::Coronal),
            "sagittal" | "x" => Ok(Orientation::Sagittal),
            _ => Err(ParseEnumError::new("orientation", s)),
        }
    }
}

/// One of the two dataset identities tracked by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    Slot1,
    Slot2,
}

impl SlotId {
    pub const ALL: [SlotId; 2] = [SlotId::Slot1, SlotId::Slot2];

    pub fn index(self) -> usize {
        match self {
            SlotId::Slot1 => 0,
            SlotId::Slot2 => 1,
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotId::Slot1 => f.write_str("slot 1"),
            SlotId::Slot2 => f.write_str("slot 2"),
        }
    }
}

impl FromStr for SlotId {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(SlotId::Slot1),
            "2" => Ok(SlotId::Slot2),
            _ => Err(ParseEnumError::new("slot", s)),
        }
    }
}

/// Render target. Slice surfaces layer both slots' cross-sections,
/// the volume surface holds both slots' volumes in one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Volume,
    Axial,
    Coronal,
    Sagittal,
}

impl Surface {
    pub const ALL: [Surface; 4] = [
        Surface::Volume,
        Surface::Axial,
        Surface::Coronal,
        Surface::Sagittal,
    ];

    pub const SLICES: [Surface; 3] = [Surface::Axial, Surface::Coronal, Surface::Sagittal];

    pub fn index(self) -> usize {
        match self {
            Surface::Volume => 0,
            Surface::Axial => 1,
            Surface::Coronal => 2,
            Surface::Sagittal => 3,
        }
    }

    /// The plane shown on this surface, `None` for the volume surface.
    pub fn orientation(self) -> Option<Orientation> {
        match self {
            Surface::Volume => None,
            Surface::Axial => Some(Orientation::Axial),
            Surface::Coronal => Some(Orientation::Coronal),
            Surface::Sagittal => Some(Orientation::Sagittal),
        }
    }
}

/// Colour map selectable per slot, for slices and for the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorChoice {
    Grayscale,
    Hot,
    Bone,
    Rainbow,
}

impl ColorChoice {
    pub const ALL: [ColorChoice; 4] = [
        ColorChoice::Grayscale,
        ColorChoice::Hot,
        ColorChoice::Bone,
        ColorChoice::Rainbow,
    ];

    /// Catalog name of the lookup table used for 2-D slices.
    pub fn lookup_table_name(self) -> &'static str {
        match self {
            ColorChoice::Grayscale => "grayscale",
            ColorChoice::Hot => "hot",
            ColorChoice::Bone => "bone",
            ColorChoice::Rainbow => "rainbow",
        }
    }

    /// Catalog name of the transfer curve used for the 3-D volume.
    pub fn transfer_curve_name(self) -> &'static str {
        match self {
            ColorChoice::Grayscale => "grayscale-volume",
            ColorChoice::Hot => "hot-volume",
            ColorChoice::Bone => "bone-volume",
            ColorChoice::Rainbow => "rainbow-volume",
        }
    }
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lookup_table_name())
    }
}

impl FromStr for ColorChoice {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorChoice::ALL
            .into_iter()
            .find(|choice| choice.lookup_table_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError::new("color", s))
    }
}

/// Which of a slot's outputs a colour choice applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTarget {
    Slices,
    Volume,
}

/// A slider whose value changes are reported to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Slice(Orientation),
    Opacity(SlotId),
}

/// A text label the controller writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    SliceIndex(Orientation),
    Opacity(SlotId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    ImagePositionPatient,
    TablePosition,
    InstanceNumber,
    None,
}

impl FromStr for SortBy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image-position" => Ok(SortBy::ImagePositionPatient),
            "table-position" => Ok(SortBy::TablePosition),
            "instance-number" => Ok(SortBy::InstanceNumber),
            "none" => Ok(SortBy::None),
            _ => Err(ParseEnumError::new("sort order", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense() {
        for (i, o) in Orientation::ALL.into_iter().enumerate() {
            assert_eq!(o.index(), i);
            assert_eq!(o.surface().orientation(), Some(o));
        }
        for (i, s) in Surface::ALL.into_iter().enumerate() {
            assert_eq!(s.index(), i);
        }
        assert_eq!(Surface::Volume.orientation(), None);
    }

    #[test]
    fn parses_names() {
        assert_eq!("Coronal".parse::<Orientation>(), Ok(Orientation::Coronal));
        assert_eq!("2".parse::<SlotId>(), Ok(SlotId::Slot2));
        assert_eq!("HOT".parse::<ColorChoice>(), Ok(ColorChoice::Hot));
        assert!("3".parse::<SlotId>().is_err());
        assert!("oblique".parse::<Orientation>().is_err());
    }
}
