#![forbid(unsafe_code)]

//! Selection navigation over the visible list.
//!
//! Movement requests arrive as two monotonic counters, one per direction.
//! Only the *change* in each counter since the previous derivation carries
//! meaning: the caller bumps a counter once per keypress and the navigator
//! turns the pair of edges into a signed step. This lets discrete "move"
//! events cross an update boundary without an event queue.
//!
//! # Invariants
//!
//! 1. With a non-empty visible list, the resulting visible index is always in
//!    `[0, visible_len - 1]`; movement clamps at both edges, it never wraps.
//! 2. With an empty visible list, the selection collapses to `(0, 0)`.
//! 3. The base position is the previous full-space selection re-resolved
//!    through the *current* tables on every call, so a selection whose row
//!    was just filtered out recovers to a valid row even when no counter
//!    moved.

use crate::derive::HudState;
use crate::projection::Projection;

/// A selection expressed in both index spaces.
///
/// With a non-empty visible list, `index == visible_to_index[visible_index]`.
/// With an empty one, both fields are 0 by definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Position in the full, unfiltered list.
    pub index: usize,
    /// Position in the filtered, visible list.
    pub visible_index: usize,
}

impl Selection {
    /// The defined empty-list default.
    pub const fn origin() -> Self {
        Self {
            index: 0,
            visible_index: 0,
        }
    }
}

/// Direction of a counter edge: -1, 0, or +1.
#[inline]
fn trend(current: u64, previous: u64) -> isize {
    match current.cmp(&previous) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Less => -1,
    }
}

/// Compute the new selection against a freshly built projection.
///
/// `previous` supplies the prior full-space selection and the counter values
/// observed at the last derivation. The first derivation has no prior
/// observation, so its step is 0 regardless of the incoming counter values.
pub fn navigate<R>(
    previous: &HudState<R>,
    projection: &Projection<R>,
    move_up_count: u64,
    move_down_count: u64,
) -> Selection {
    if projection.is_empty() {
        return Selection::origin();
    }

    let delta = if previous.initial {
        0
    } else {
        trend(move_down_count, previous.move_down_count)
            - trend(move_up_count, previous.move_up_count)
    };

    // Re-resolve the previous selection in the current visible space; rows
    // that vanished (or a selection that never existed) land on 0.
    let base = projection.visible_index_of(previous.selected_index).unwrap_or(0);

    let last = projection.visible_len() - 1;
    let visible_index = base.saturating_add_signed(delta).min(last);
    let index = projection.visible_to_index[visible_index];

    Selection {
        index,
        visible_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::project;

    fn contains(row: &&str, filter: &str) -> bool {
        row.contains(filter)
    }

    /// A steady-state snapshot with the given selection and counters.
    fn steady(selected_index: usize, up: u64, down: u64) -> HudState<&'static str> {
        HudState {
            initial: false,
            filter: String::new(),
            selected_index,
            move_up_count: up,
            move_down_count: down,
            projection: Projection::empty(),
            selected_visible_index: 0,
        }
    }

    // ─── Empty list ───────────────────────────────────────────────

    #[test]
    fn empty_list_is_origin() {
        let p = project::<&str, _>(&[], "", contains);
        let sel = navigate(&steady(3, 0, 0), &p, 0, 5);
        assert_eq!(sel, Selection::origin());
    }

    // ─── Counter edges ────────────────────────────────────────────

    #[test]
    fn down_edge_moves_down() {
        let p = project(&["a", "b", "c"], "", contains);
        let sel = navigate(&steady(0, 0, 0), &p, 0, 1);
        assert_eq!(sel, Selection { index: 1, visible_index: 1 });
    }

    #[test]
    fn up_edge_moves_up() {
        let p = project(&["a", "b", "c"], "", contains);
        let sel = navigate(&steady(2, 0, 0), &p, 1, 0);
        assert_eq!(sel, Selection { index: 1, visible_index: 1 });
    }

    #[test]
    fn simultaneous_edges_cancel() {
        let p = project(&["a", "b", "c"], "", contains);
        let sel = navigate(&steady(1, 0, 0), &p, 1, 1);
        assert_eq!(sel.visible_index, 1);
    }

    #[test]
    fn absolute_counter_values_do_not_matter() {
        // A jump of 40 in one counter is still a single edge.
        let p = project(&["a", "b", "c"], "", contains);
        let sel = navigate(&steady(0, 7, 9), &p, 7, 49);
        assert_eq!(sel.visible_index, 1);
    }

    #[test]
    fn decreasing_counter_steps_backwards() {
        let p = project(&["a", "b", "c"], "", contains);
        let sel = navigate(&steady(1, 0, 5), &p, 0, 4);
        assert_eq!(sel.visible_index, 0);
    }

    // ─── Clamping ─────────────────────────────────────────────────

    #[test]
    fn clamps_at_bottom_edge() {
        let p = project(&["a", "b", "c"], "", contains);
        let sel = navigate(&steady(2, 0, 0), &p, 0, 1);
        assert_eq!(sel.visible_index, 2, "must clamp, not wrap");
    }

    #[test]
    fn clamps_at_top_edge() {
        let p = project(&["a", "b", "c"], "", contains);
        let sel = navigate(&steady(0, 0, 0), &p, 1, 0);
        assert_eq!(sel.visible_index, 0, "must clamp, not wrap");
    }

    #[test]
    fn single_row_list_pins_selection() {
        let p = project(&["only"], "", contains);
        assert_eq!(navigate(&steady(0, 0, 0), &p, 0, 1).visible_index, 0);
        assert_eq!(navigate(&steady(0, 0, 0), &p, 1, 0).visible_index, 0);
    }

    // ─── Stale-selection recovery ─────────────────────────────────

    #[test]
    fn filtered_out_selection_recovers_to_first_visible() {
        // Previous selection sat on "beta" (full index 1); the new filter
        // removes it. No counter moved, yet the selection must re-resolve.
        let p = project(&["alpha", "beta", "gamma"], "a", |r: &&str, f: &str| {
            r.starts_with(f)
        });
        let sel = navigate(&steady(1, 0, 0), &p, 0, 0);
        assert_eq!(sel, Selection { index: 0, visible_index: 0 });
    }

    #[test]
    fn surviving_selection_tracks_new_visible_position() {
        // "carrot" is full index 2; after filtering it is visible index 1.
        let p = project(&["car", "bus", "carrot"], "car", contains);
        let sel = navigate(&steady(2, 0, 0), &p, 0, 0);
        assert_eq!(sel, Selection { index: 2, visible_index: 1 });
    }

    #[test]
    fn recovery_and_edge_compose() {
        // Selection filtered out (base 0) plus a down edge lands on 1.
        let p = project(&["xa", "b", "xc"], "x", contains);
        let sel = navigate(&steady(1, 0, 0), &p, 0, 1);
        assert_eq!(sel, Selection { index: 2, visible_index: 1 });
    }

    #[test]
    fn out_of_range_previous_selection_recovers() {
        // The list shrank since the previous derivation.
        let p = project(&["a"], "", contains);
        let sel = navigate(&steady(10, 0, 0), &p, 0, 0);
        assert_eq!(sel, Selection::origin());
    }

    // ─── First derivation ─────────────────────────────────────────

    #[test]
    fn initial_state_ignores_counter_values() {
        let mut prev = steady(0, 0, 0);
        prev.initial = true;
        let p = project(&["a", "b", "c"], "", contains);
        // Counters already at 3/5 before the first derivation: no edge yet.
        let sel = navigate(&prev, &p, 3, 5);
        assert_eq!(sel.visible_index, 0);
    }
}
