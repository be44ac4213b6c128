use ulid::Ulid;

use crate::model::*;

use super::availability::blocking_reservations;
use super::EngineError;

/// Normalize raw check-in/check-out instants to UTC day boundaries and
/// validate ordering. Check-in floors to its day start; check-out ceils to
/// the next boundary unless already on one, so date-only inputs pass through
/// unchanged and partial days expand outward. Ordering is checked on the raw
/// instants: equal or reversed inputs are rejected before they can widen into
/// a night.
pub(crate) fn normalize_stay(check_in: Ms, check_out: Ms) -> Result<Stay, EngineError> {
    use crate::limits::*;
    if check_in < MIN_VALID_TIMESTAMP_MS || check_out > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::Validation("timestamp out of range"));
    }
    if check_in >= check_out {
        return Err(EngineError::Validation("stay must span at least one night"));
    }
    Ok(Stay::new(floor_to_day(check_in), ceil_to_day(check_out)))
}

pub(crate) fn validate_stay_length(stay: &Stay) -> Result<(), EngineError> {
    if stay.nights() > crate::limits::MAX_STAY_NIGHTS {
        return Err(EngineError::LimitExceeded("stay too long"));
    }
    Ok(())
}

pub(crate) fn validate_query_window(stay: &Stay) -> Result<(), EngineError> {
    if stay.duration_ms() > crate::limits::MAX_QUERY_WINDOW_MS {
        return Err(EngineError::LimitExceeded("query window too wide"));
    }
    Ok(())
}

pub(crate) fn validate_guest(guest: &Guest) -> Result<(), EngineError> {
    use crate::limits::*;
    if guest.name.trim().is_empty() {
        return Err(EngineError::Validation("guest name must not be empty"));
    }
    if guest.name.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded("guest name too long"));
    }
    if guest.email.is_empty() || !guest.email.contains('@') {
        return Err(EngineError::Validation("guest email must contain '@'"));
    }
    if guest.email.len() > MAX_EMAIL_LEN {
        return Err(EngineError::LimitExceeded("guest email too long"));
    }
    if let Some(phone) = &guest.phone
        && phone.len() > MAX_PHONE_LEN
    {
        return Err(EngineError::LimitExceeded("guest phone too long"));
    }
    Ok(())
}

pub(crate) fn validate_persons(persons: u32, capacity: u32) -> Result<(), EngineError> {
    if persons < 1 {
        return Err(EngineError::Validation("persons must be at least 1"));
    }
    if persons > capacity {
        return Err(EngineError::Validation("persons exceeds room capacity"));
    }
    Ok(())
}

pub(crate) fn validate_room(room: &Room) -> Result<(), EngineError> {
    use crate::limits::*;
    if room.name.trim().is_empty() {
        return Err(EngineError::Validation("room name must not be empty"));
    }
    if room.name.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded("room name too long"));
    }
    if room.category.trim().is_empty() {
        return Err(EngineError::Validation("room category must not be empty"));
    }
    if room.capacity < 1 {
        return Err(EngineError::Validation("room capacity must be at least 1"));
    }
    if room.amenities.len() > MAX_AMENITIES {
        return Err(EngineError::LimitExceeded("too many amenities"));
    }
    Ok(())
}

pub(crate) fn validate_dinner(dinner: &Dinner) -> Result<(), EngineError> {
    if dinner.name.trim().is_empty() {
        return Err(EngineError::Validation("dinner name must not be empty"));
    }
    Ok(())
}

pub(crate) fn validate_tour(tour: &Tour) -> Result<(), EngineError> {
    use crate::limits::*;
    if tour.name.trim().is_empty() {
        return Err(EngineError::Validation("tour name must not be empty"));
    }
    if tour.description.len() > MAX_DESCRIPTION_LEN {
        return Err(EngineError::LimitExceeded("tour description too long"));
    }
    Ok(())
}

/// Scan the room's ledger for a blocking reservation overlapping `stay`.
/// `exclude` skips one reservation id so a revision is not in conflict with
/// itself. Must run under the room's write lock when guarding an insert.
pub(crate) fn check_no_conflict(
    rs: &RoomState,
    stay: &Stay,
    exclude: Option<Ulid>,
) -> Result<(), EngineError> {
    for r in blocking_reservations(rs, stay) {
        if Some(r.id) == exclude {
            continue;
        }
        return Err(EngineError::Conflict(r.id));
    }
    Ok(())
}
