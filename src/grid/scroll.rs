use serde::Deserialize;

/// Direction in which the host pages from one month to the next
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ScrollAxis {
    #[default]
    Horizontal,
    Vertical,
}

/// Content offset of the paging view, in whatever unit the host measures its
/// page extent in
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ScrollOffset {
    pub x: u64,
    pub y: u64,
}

impl ScrollOffset {
    pub const ZERO: ScrollOffset = ScrollOffset { x: 0, y: 0 };

    pub fn along(axis: ScrollAxis, distance: u64) -> ScrollOffset {
        match axis {
            ScrollAxis::Horizontal => ScrollOffset { x: distance, y: 0 },
            ScrollAxis::Vertical => ScrollOffset { x: 0, y: distance },
        }
    }

    pub fn distance(self, axis: ScrollAxis) -> u64 {
        match axis {
            ScrollAxis::Horizontal => self.x,
            ScrollAxis::Vertical => self.y,
        }
    }
}

pub(super) fn offset_for_section(section: u32, axis: ScrollAxis, page_extent: u32) -> ScrollOffset {
    ScrollOffset::along(axis, u64::from(section) * u64::from(page_extent))
}

/// Index of the page whose leading edge is at or before `offset`
pub(super) fn page_for_offset(offset: ScrollOffset, axis: ScrollAxis, page_extent: u32) -> i64 {
    offset
        .distance(axis)
        .checked_div(u64::from(page_extent))
        .map_or(0, |page| i64::try_from(page).unwrap_or(i64::MAX))
}
