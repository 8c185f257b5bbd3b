//! Selection / hover state of the gallery.
//!
//! The state is a plain `Copy` snapshot. Input handlers never mutate it in
//! place; they turn pointer activity into [`ViewerEvent`]s and the app swaps
//! in the snapshot returned by [`ViewerState::reduce`].

use crate::catalog::CATALOG;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerState {
    /// Always a valid catalog index
    selected_index: usize,
    hovered_index: Option<usize>,
}

/// User input relevant to the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    /// Thumbnail clicked
    Select(usize),
    /// Pointer entered a thumbnail
    PointerEnter(usize),
    /// Pointer left a thumbnail
    PointerLeave(usize),
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            selected_index: 0,
            hovered_index: None,
        }
    }
}

impl ViewerState {
    /// Initial state with a custom selection, clamped into the catalog.
    pub fn with_selection(index: usize) -> Self {
        Self {
            selected_index: index.min(CATALOG.len() - 1),
            hovered_index: None,
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn hovered_index(&self) -> Option<usize> {
        self.hovered_index
    }

    /// Produce the next snapshot. Events naming an index outside the
    /// catalog are ignored.
    pub fn reduce(self, event: ViewerEvent) -> Self {
        match event {
            ViewerEvent::Select(i) if i < CATALOG.len() => Self {
                selected_index: i,
                ..self
            },
            ViewerEvent::PointerEnter(i) if i < CATALOG.len() => Self {
                hovered_index: Some(i),
                ..self
            },
            ViewerEvent::PointerLeave(_) => Self {
                hovered_index: None,
                ..self
            },
            _ => self,
        }
    }

    /// Fold a batch of events, leave events first so a pointer moving
    /// straight from one thumbnail to the next ends up hovering the new one.
    pub fn reduce_all(self, events: &[ViewerEvent]) -> Self {
        let leaves = events
            .iter()
            .filter(|e| matches!(e, ViewerEvent::PointerLeave(_)));
        let others = events
            .iter()
            .filter(|e| !matches!(e, ViewerEvent::PointerLeave(_)));
        leaves.chain(others).fold(self, |state, &e| state.reduce(e))
    }

    pub fn thumbnail(&self, index: usize) -> ThumbnailVisual {
        let active = index == self.selected_index;
        let hovered = self.hovered_index == Some(index);
        ThumbnailVisual { active, hovered }
    }
}

/// How a single thumbnail should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailVisual {
    /// Opaque border and glow
    pub active: bool,
    /// Label revealed
    pub hovered: bool,
}

impl ThumbnailVisual {
    pub const ENLARGED_SCALE: f32 = 1.2;

    /// Target scale; either highlight enlarges the thumbnail.
    pub fn scale(&self) -> f32 {
        if self.active || self.hovered {
            Self::ENLARGED_SCALE
        } else {
            1.0
        }
    }

    pub fn label_visible(&self) -> bool {
        self.hovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_events_are_ignored() {
        let state = ViewerState::default();
        assert_eq!(state.reduce(ViewerEvent::Select(42)), state);
        assert_eq!(state.reduce(ViewerEvent::PointerEnter(9)), state);
    }

    #[test]
    fn with_selection_clamps() {
        assert_eq!(ViewerState::with_selection(100).selected_index(), CATALOG.len() - 1);
    }

    #[test]
    fn batched_leave_then_enter_keeps_new_hover() {
        let state = ViewerState::default().reduce(ViewerEvent::PointerEnter(3));
        // enter reported before leave within the same frame
        let next = state.reduce_all(&[ViewerEvent::PointerEnter(4), ViewerEvent::PointerLeave(3)]);
        assert_eq!(next.hovered_index(), Some(4));
    }
}
