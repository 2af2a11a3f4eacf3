//! Per-entity dirty tracking across frame slots.

/// Counts how many frame slots still hold a stale copy of an entity's
/// constants.
///
/// Every slot has its own copy of every constant buffer, so a change must be
/// written once into each of the N slots. Marking an entity dirty sets the
/// count to N; each refresh writes the entity into the current slot and
/// decrements the count by one. After N consecutive frames every slot holds
/// the new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyCountdown {
    remaining: usize,
    frame_count: usize,
}

impl DirtyCountdown {
    /// New entities start dirty in every slot.
    pub fn new(frame_count: usize) -> Self {
        Self {
            remaining: frame_count,
            frame_count,
        }
    }

    /// Record a mutation. All slots become stale again.
    pub fn mark_dirty(&mut self) {
        self.remaining = self.frame_count;
    }

    /// Whether any slot is stale.
    pub fn is_dirty(&self) -> bool {
        self.remaining > 0
    }

    /// Number of slots still holding a stale copy.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Account for one write into the current slot.
    ///
    /// Returns `true` if the entity needed writing.
    pub fn consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
