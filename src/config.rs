use crate::enums::{ColorChoice, SlotId, SortBy};

/// What a slot is reset to after every successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDefaults {
    /// Slice opacity, 0 to 100.
    pub opacity_percent: i32,
    pub slice_color: ColorChoice,
    pub volume_color: ColorChoice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub slots: [SlotDefaults; 2],
    pub sort_by: SortBy,
    /// Width and height of each display surface in pixels.
    pub surface_size: (u32, u32),
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            slots: [
                SlotDefaults {
                    opacity_percent: 100,
                    slice_color: ColorChoice::Grayscale,
                    volume_color: ColorChoice::Grayscale,
                },
                SlotDefaults {
                    opacity_percent: 70,
                    slice_color: ColorChoice::Hot,
                    volume_color: ColorChoice::Hot,
                },
            ],
            sort_by: SortBy::default(),
            surface_size: (400, 400),
        }
    }
}

impl ViewerConfig {
    pub fn slot(&self, slot: SlotId) -> &SlotDefaults {
        &self.slots[slot.index()]
    }
}
