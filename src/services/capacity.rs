//! Capacity is derived, never stored: the participant count is always a
//! COUNT over Approved registrations at read time, so it cannot drift from
//! the registration set. Capacity-consuming writes additionally re-check the
//! ceiling inside the INSERT/UPDATE itself (see registrations_repo).

pub fn is_full(approved_count: i64, max_participants: i64) -> bool {
    approved_count >= max_participants
}

/// Remaining slots, floored at zero for display.
pub fn available_slots(approved_count: i64, max_participants: i64) -> i64 {
    (max_participants - approved_count).max(0)
}
