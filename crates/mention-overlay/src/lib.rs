#![forbid(unsafe_code)]

//! Interactive mention overlay for a message-composition surface.
//!
//! [`mention_core`] is the pure derivation half: candidate list + filter +
//! navigation counters in, consistent snapshot out. This crate is the
//! stateful half that owns those inputs: it turns key events into filter
//! edits and counter bumps, decides when re-derivation is needed, and hands
//! visible rows to whatever renderer the host supplies.
//!
//! The overlay never draws. Hosts call [`MentionOverlay::render_rows`] with
//! their own row renderer and position/style the popup however they like.

pub mod event;
pub mod overlay;

pub use event::{KeyCode, KeyEvent, Modifiers};
pub use mention_core::{HudInputs, HudState, Projection, Selection};
pub use overlay::{MentionOverlay, OverlayAction, RowContext};
