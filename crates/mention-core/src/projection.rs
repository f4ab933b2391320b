#![forbid(unsafe_code)]

//! Visibility projection between the full and visible index spaces.
//!
//! Given the full candidate list and a filter, [`project`] computes the
//! ordered subsequence of rows that match, plus the two translation tables
//! between the index spaces.
//!
//! # Invariants
//!
//! 1. `index_to_visible.len() == rows.len()`.
//! 2. `visible_to_index.len() == visible.len()`.
//! 3. The tables are mutual inverses: `index_to_visible[i] == Some(v)` iff
//!    `visible_to_index[v] == i`.
//! 4. `visible` preserves the relative order of the full list.
//! 5. Projection is a pure function of `(rows, filter)`: re-running it on
//!    unchanged inputs yields an identical result.

/// The filtered view of a candidate list, with index translation tables.
///
/// `R` is the opaque per-row payload; the projector never inspects it beyond
/// handing a reference to the filter predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection<R> {
    /// Rows passing the filter, in full-list order.
    pub visible: Vec<R>,
    /// Full index -> visible index, `None` for rows the filter rejected.
    pub index_to_visible: Vec<Option<usize>>,
    /// Visible index -> originating full index.
    pub visible_to_index: Vec<usize>,
}

impl<R> Projection<R> {
    /// An empty projection (no rows, no filter matches).
    pub fn empty() -> Self {
        Self {
            visible: Vec::new(),
            index_to_visible: Vec::new(),
            visible_to_index: Vec::new(),
        }
    }

    /// Number of visible rows.
    #[inline]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Whether the filter left nothing visible.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Visible position of the row at `full_index`, if it passed the filter.
    ///
    /// Out-of-range full indices resolve to `None` rather than panicking, so
    /// a selection carried over from a longer previous list degrades cleanly.
    #[inline]
    pub fn visible_index_of(&self, full_index: usize) -> Option<usize> {
        self.index_to_visible.get(full_index).copied().flatten()
    }

    /// Full-list position of the row at `visible_index`.
    #[inline]
    pub fn full_index_of(&self, visible_index: usize) -> Option<usize> {
        self.visible_to_index.get(visible_index).copied()
    }
}

/// Project `rows` through the filter predicate.
///
/// The empty filter is not special-cased: it is passed to `matcher`
/// unchanged, so whether `""` matches everything (the usual choice) or
/// nothing is entirely the predicate's decision.
///
/// The predicate is trusted to be deterministic and not to panic; a panic
/// propagates to the caller.
pub fn project<R, F>(rows: &[R], filter: &str, matcher: F) -> Projection<R>
where
    R: Clone,
    F: Fn(&R, &str) -> bool,
{
    let mut visible = Vec::new();
    let mut index_to_visible = Vec::with_capacity(rows.len());
    let mut visible_to_index = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        if matcher(row, filter) {
            index_to_visible.push(Some(visible.len()));
            visible_to_index.push(index);
            visible.push(row.clone());
        } else {
            index_to_visible.push(None);
        }
    }

    Projection {
        visible,
        index_to_visible,
        visible_to_index,
    }
}
