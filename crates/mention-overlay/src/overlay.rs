#![forbid(unsafe_code)]

//! The mention overlay controller.
//!
//! [`MentionOverlay`] owns everything the derivation core treats as input:
//! the candidate rows, the filter text, and the two navigation counters. Key
//! events mutate those inputs; the derived snapshot is rebuilt at most once
//! per change: eagerly for navigation bumps (each counter edge must be
//! observed by its own derivation) and lazily on read for everything else.
//!
//! # Usage
//!
//! ```
//! use mention_overlay::{KeyCode, KeyEvent, MentionOverlay, OverlayAction};
//!
//! let mut overlay = MentionOverlay::new(
//!     vec!["alice", "bob", "bonnie"],
//!     |row: &&str, filter: &str| row.starts_with(filter),
//! );
//! overlay.open();
//!
//! // The user types "bo" and presses Down, then Enter.
//! overlay.handle_key(&KeyEvent::new(KeyCode::Char('b')));
//! overlay.handle_key(&KeyEvent::new(KeyCode::Char('o')));
//! overlay.handle_key(&KeyEvent::new(KeyCode::Down));
//! let action = overlay.handle_key(&KeyEvent::new(KeyCode::Enter));
//! assert_eq!(action, Some(OverlayAction::Commit(2))); // "bonnie"
//! ```

use mention_core::{HudInputs, HudState, derive};

use crate::event::{KeyCode, KeyEvent};

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Action returned from key handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    /// User committed the highlighted row (full-list index).
    Commit(usize),
    /// User dismissed the overlay (Esc).
    Dismiss,
}

/// Position and highlight information handed to the row renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowContext {
    /// Position in the visible (filtered) list.
    pub visible_index: usize,
    /// Position in the full candidate list.
    pub full_index: usize,
    /// Whether this row is the current selection.
    pub selected: bool,
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// Interactive mention overlay over a candidate list.
///
/// # Invariants
///
/// 1. The navigation counters only ever increase; one keypress is one bump.
/// 2. The derived snapshot is recomputed at most once per input change, and
///    always before it is observed.
/// 3. While inactive, key events are ignored and return `None`.
pub struct MentionOverlay<R, F> {
    /// Full candidate list, in presentation order.
    rows: Vec<R>,
    /// Externally supplied filter predicate.
    matcher: F,
    /// Filter text accumulated from keystrokes after the trigger.
    filter: String,
    /// Monotonic "move up" counter.
    move_up_count: u64,
    /// Monotonic "move down" counter.
    move_down_count: u64,
    /// Whether the overlay is showing.
    active: bool,
    /// Latest derived snapshot.
    state: HudState<R>,
    /// Inputs changed since `state` was derived.
    dirty: bool,
}

impl<R, F> MentionOverlay<R, F>
where
    R: Clone,
    F: Fn(&R, &str) -> bool,
{
    /// Create an inactive overlay over `rows`.
    pub fn new(rows: Vec<R>, matcher: F) -> Self {
        Self {
            rows,
            matcher,
            filter: String::new(),
            move_up_count: 0,
            move_down_count: 0,
            active: false,
            state: HudState::initial(),
            dirty: true,
        }
    }

    // --- Lifecycle ---

    /// Show the overlay with a cleared filter and a fresh selection.
    pub fn open(&mut self) {
        self.active = true;
        self.filter.clear();
        self.move_up_count = 0;
        self.move_down_count = 0;
        self.state = HudState::initial();
        self.dirty = true;
        // First derivation happens on open, so the first keypress lands on a
        // steady-state snapshot.
        self.sync();
    }

    /// Hide the overlay.
    pub fn close(&mut self) {
        self.active = false;
        self.filter.clear();
        self.dirty = true;
    }

    /// Whether the overlay is currently showing.
    pub fn is_active(&self) -> bool {
        self.active
    }

    // --- Input mutators ---

    /// Replace the candidate list (e.g. fresh session data arrived).
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.dirty = true;
    }

    /// Replace the filter text wholesale.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.dirty = true;
    }

    /// Append one typed character to the filter.
    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.dirty = true;
    }

    /// Remove the last typed character from the filter.
    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.dirty = true;
    }

    /// Request "select previous visible row".
    ///
    /// Derives eagerly: the navigator sees counter *edges*, so every bump
    /// must be observed by its own derivation rather than batched away.
    pub fn select_up(&mut self) {
        self.move_up_count += 1;
        self.dirty = true;
        self.sync();
    }

    /// Request "select next visible row".
    pub fn select_down(&mut self) {
        self.move_down_count += 1;
        self.dirty = true;
        self.sync();
    }

    // --- Key handling ---

    /// Handle a key event. Returns an [`OverlayAction`] when the user
    /// committed a row or dismissed the overlay, `None` otherwise (including
    /// while inactive).
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<OverlayAction> {
        if !self.active {
            return None;
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("overlay_key", code = ?event.code).entered();

        match event.code {
            KeyCode::Escape => {
                self.close();
                return Some(OverlayAction::Dismiss);
            }

            KeyCode::Enter | KeyCode::Tab => {
                self.sync();
                if !self.state.projection.is_empty() {
                    let index = self.state.selected_index;
                    self.close();
                    return Some(OverlayAction::Commit(index));
                }
            }

            KeyCode::Up | KeyCode::BackTab => self.select_up(),
            KeyCode::Down => self.select_down(),

            KeyCode::Char(c) if event.ctrl() => match c {
                'p' => self.select_up(),
                'n' => self.select_down(),
                _ => {}
            },

            KeyCode::Char(c) => self.push_filter_char(c),
            KeyCode::Backspace => self.pop_filter_char(),
        }

        None
    }

    // --- Derived state ---

    /// The current derived snapshot, recomputed if any input changed.
    pub fn state(&mut self) -> &HudState<R> {
        self.sync();
        &self.state
    }

    /// Current filter text.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Navigation counter values signalled so far, as `(up, down)`.
    pub fn move_counts(&self) -> (u64, u64) {
        (self.move_up_count, self.move_down_count)
    }

    /// The currently highlighted row, if any row is visible.
    pub fn selected_row(&mut self) -> Option<&R> {
        self.sync();
        self.state.selected_row()
    }

    /// Number of rows passing the current filter.
    pub fn visible_len(&mut self) -> usize {
        self.sync();
        self.state.projection.visible_len()
    }

    /// Enumerate the visible rows in order through the caller's renderer.
    ///
    /// The overlay decides order and highlight; drawing belongs entirely to
    /// the callback.
    pub fn render_rows(&mut self, mut render: impl FnMut(RowContext, &R)) {
        self.sync();
        let state = &self.state;
        for (visible_index, row) in state.projection.visible.iter().enumerate() {
            render(
                RowContext {
                    visible_index,
                    full_index: state.projection.visible_to_index[visible_index],
                    selected: visible_index == state.selected_visible_index,
                },
                row,
            );
        }
    }

    /// Re-derive the snapshot if any input changed since the last derivation.
    fn sync(&mut self) {
        if !self.dirty {
            return;
        }
        let next = derive(
            &self.state,
            &HudInputs {
                rows: &self.rows,
                filter: &self.filter,
                matcher: &self.matcher,
                move_up_count: self.move_up_count,
                move_down_count: self.move_down_count,
            },
        );
        self.state = next;
        self.dirty = false;
    }
}
