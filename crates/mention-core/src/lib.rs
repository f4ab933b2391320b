#![forbid(unsafe_code)]

//! Derivation core for the mention HUD.
//!
//! A mention HUD shows a filtered, keyboard-navigable list of candidate rows
//! (people, channels) while the user types. Three pieces of state have to stay
//! consistent on every keystroke: the full candidate list, the subsequence of
//! it that passes the current filter, and a selection pointer that must always
//! land on a valid visible row.
//!
//! This crate is the pure half of that problem. It knows nothing about
//! rendering, key events, or where the rows come from; it maps a previous
//! snapshot plus the current inputs to a fresh snapshot, once per update:
//!
//! ```
//! use mention_core::{HudInputs, HudState, derive};
//!
//! let rows = vec!["alice", "bob", "carol"];
//! let previous = HudState::initial();
//! let state = derive(
//!     &previous,
//!     &HudInputs {
//!         rows: &rows,
//!         filter: "b",
//!         matcher: |row: &&str, filter: &str| row.contains(filter),
//!         move_up_count: 0,
//!         move_down_count: 0,
//!     },
//! );
//! assert_eq!(state.projection.visible, vec!["bob"]);
//! assert_eq!(state.selected_index, 1);
//! ```
//!
//! # Index spaces
//!
//! Positions exist in two spaces: *full* (the unfiltered candidate list) and
//! *visible* (the filtered subsequence). [`Projection`] holds the translation
//! tables between them; the selection is carried in both spaces and the
//! visible one is authoritative for display.
//!
//! # Navigation counters
//!
//! Callers signal "move up"/"move down" by incrementing two monotonic
//! counters. The core only ever looks at the counter *deltas* between
//! successive derivations, so no event queue needs to cross the update
//! boundary.

pub mod derive;
pub mod navigation;
pub mod projection;

pub use derive::{HudInputs, HudState, derive};
pub use navigation::{Selection, navigate};
pub use projection::{Projection, project};
