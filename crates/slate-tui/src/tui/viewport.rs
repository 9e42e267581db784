//! Scroll-offset windowing for column and list rendering.
//!
//! Only the rows inside the viewport are materialized as widgets; the offset
//! follows the selection so it always stays visible.

use std::ops::Range;

/// Adjust `offset` so `selected` falls inside a window of `height` rows.
#[must_use]
pub fn follow(offset: usize, selected: Option<usize>, height: usize, len: usize) -> usize {
    let Some(selected) = selected else {
        return offset.min(len.saturating_sub(1));
    };
    let height = height.max(1);
    if selected < offset {
        selected
    } else if selected >= offset + height {
        selected + 1 - height
    } else {
        // Clamp in case the list shrank under the window.
        offset.min(len.saturating_sub(1))
    }
}

/// The visible row range for a window at `offset`.
#[must_use]
pub fn window(offset: usize, height: usize, len: usize) -> Range<usize> {
    let start = offset.min(len);
    let end = (offset + height.max(1)).min(len);
    start..end
}
