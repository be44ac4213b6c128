use crate::model::*;

// ── Availability Algorithm ────────────────────────────────────────

/// Reservations that make the room unavailable over `query`. The ledger is
/// fetched status-agnostically, then filtered to blocking statuses here, so
/// the status policy applies in exactly one place. Cancelled and no-show
/// stays never block.
pub fn blocking_reservations<'a>(
    rs: &'a RoomState,
    query: &Stay,
) -> impl Iterator<Item = &'a Reservation> {
    rs.overlapping(query).filter(|r| r.status.blocks())
}

/// Whether the room can take a new stay over `query`.
pub fn room_is_free(rs: &RoomState, query: &Stay) -> bool {
    blocking_reservations(rs, query).next().is_none()
}
