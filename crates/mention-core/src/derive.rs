#![forbid(unsafe_code)]

//! Whole-snapshot derivation.
//!
//! One call per update cycle of the owning surface: project the rows, re-seat
//! the selection, and return a fully rebuilt [`HudState`]. Nothing is merged
//! or carried by reference from the previous snapshot; every field is
//! recomputed or copied by value, which is what keeps the function pure and
//! the snapshot internally consistent.

use crate::navigation::navigate;
use crate::projection::{Projection, project};

/// The derived snapshot for one update cycle.
///
/// # Invariants
///
/// 1. After the first derivation, `initial` is `false` forever.
/// 2. With a non-empty visible list,
///    `selected_index == projection.visible_to_index[selected_visible_index]`.
/// 3. With an empty visible list, both selection fields are 0.
/// 4. `filter`, `move_up_count`, and `move_down_count` are verbatim copies of
///    the inputs that produced the snapshot; the next derivation compares its
///    inputs against them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudState<R> {
    /// True only before the first derivation.
    pub initial: bool,
    /// Filter text the snapshot was derived from.
    pub filter: String,
    /// Selection in full-list space.
    pub selected_index: usize,
    /// "Move up" counter value observed at this derivation.
    pub move_up_count: u64,
    /// "Move down" counter value observed at this derivation.
    pub move_down_count: u64,
    /// The filtered view and its index translation tables.
    pub projection: Projection<R>,
    /// Selection in visible-list space.
    pub selected_visible_index: usize,
}

impl<R> HudState<R> {
    /// The pre-derivation state: empty, unselected, marked `initial`.
    ///
    /// The owning surface constructs this once (or whenever it re-activates
    /// the HUD) and thereafter feeds each derivation's output back in.
    pub fn initial() -> Self {
        Self {
            initial: true,
            filter: String::new(),
            selected_index: 0,
            move_up_count: 0,
            move_down_count: 0,
            projection: Projection::empty(),
            selected_visible_index: 0,
        }
    }

    /// Rows passing the current filter, in full-list order.
    #[inline]
    pub fn visible(&self) -> &[R] {
        &self.projection.visible
    }

    /// The currently selected row, if the visible list is non-empty.
    pub fn selected_row(&self) -> Option<&R> {
        self.projection.visible.get(self.selected_visible_index)
    }
}

/// Per-derivation inputs supplied by the owning surface.
///
/// `matcher` is the externally supplied filter predicate; it must be
/// deterministic and side-effect-free for derivation to be deterministic.
#[derive(Debug, Clone, Copy)]
pub struct HudInputs<'a, R, F> {
    /// The full candidate list, supplied wholesale each update.
    pub rows: &'a [R],
    /// Current filter text; passed to `matcher` unchanged, even when empty.
    pub filter: &'a str,
    /// Filter predicate.
    pub matcher: F,
    /// Caller-owned monotonic "move up" counter.
    pub move_up_count: u64,
    /// Caller-owned monotonic "move down" counter.
    pub move_down_count: u64,
}

/// Derive the next snapshot from the previous one and the current inputs.
///
/// Pure and total: empty rows, an empty filter, and unchanged or decreasing
/// counters are all ordinary inputs. The only way this panics is a panicking
/// `matcher`, which is a caller contract violation and propagates as-is.
pub fn derive<R, F>(previous: &HudState<R>, inputs: &HudInputs<'_, R, F>) -> HudState<R>
where
    R: Clone,
    F: Fn(&R, &str) -> bool,
{
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "hud_derive",
        rows = inputs.rows.len(),
        filter = inputs.filter,
        initial = previous.initial
    )
    .entered();

    let projection = project(inputs.rows, inputs.filter, &inputs.matcher);
    let selection = navigate(
        previous,
        &projection,
        inputs.move_up_count,
        inputs.move_down_count,
    );

    #[cfg(feature = "tracing")]
    tracing::trace!(
        visible = projection.visible_len(),
        selected = selection.visible_index,
        "derived mention snapshot"
    );

    HudState {
        initial: false,
        filter: inputs.filter.to_owned(),
        selected_index: selection.index,
        move_up_count: inputs.move_up_count,
        move_down_count: inputs.move_down_count,
        projection,
        selected_visible_index: selection.visible_index,
    }
}
