//! Debug assertion macros for the cursor invariants.
//!
//! Only active in debug builds (`debug_assert!`), so release builds pay
//! nothing. All comparisons go through [`Index::distance`](crate::Index::distance)
//! because the cursors legitimately wrap.

// =============================================================================
// Bounded occupancy: 0 <= head - tail <= capacity
// =============================================================================

/// Assert that the occupancy implied by a pair of cursors fits in the ring.
///
/// Used in: every publish of `head` or `tail`.
macro_rules! debug_assert_bounded_count {
    ($head:expr, $tail:expr, $capacity:expr) => {
        debug_assert!(
            $crate::index::Index::distance($head, $tail) <= $capacity,
            "occupancy violated: head {} - tail {} exceeds capacity {}",
            $head,
            $tail,
            $capacity
        )
    };
}

// =============================================================================
// Monotonic progress: a cursor only moves forward, by at most `capacity`
// =============================================================================

/// Assert that a cursor advanced forward by no more than `capacity`.
///
/// A backwards move would show up as a huge wrapped distance.
///
/// Used in: `publish_head()`, `publish_tail()`.
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr, $capacity:expr) => {
        debug_assert!(
            $crate::index::Index::distance($new, $old) <= $capacity,
            "{} moved backwards or skipped ahead: {} -> {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// Readable range: tail <= pos < head
// =============================================================================

/// Assert that a consumer-side access targets an initialized slot.
///
/// **Invariant**: `slot(pos)` is initialized iff `tail <= pos < head`.
///
/// Used in: `get_unchecked()`, which `peek()` and `at()` go through.
macro_rules! debug_assert_initialized_read {
    ($offset:expr, $available:expr) => {
        debug_assert!(
            $offset < $available,
            "reading offset {} outside initialized range (available {})",
            $offset,
            $available
        )
    };
}

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_initialized_read;
pub(crate) use debug_assert_monotonic;
