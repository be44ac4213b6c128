use crate::model::Ms;

/// Rooms a single hostel may register.
pub const MAX_ROOMS: usize = 4096;

/// Reservations kept on one room's ledger (past and future).
pub const MAX_RESERVATIONS_PER_ROOM: usize = 65_536;

/// Room names, guest names, categories.
pub const MAX_NAME_LEN: usize = 256;

/// Guest email addresses (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 320;

/// Guest phone numbers.
pub const MAX_PHONE_LEN: usize = 32;

/// Amenity tags per room.
pub const MAX_AMENITIES: usize = 64;

/// Tour description text.
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Tours a single hostel may offer.
pub const MAX_TOURS: usize = 1024;

/// Longest bookable stay.
pub const MAX_STAY_NIGHTS: i64 = 365;

/// Widest availability-search window.
pub const MAX_QUERY_WINDOW_MS: Ms = 2 * 366 * crate::model::DAY_MS;

/// Instants before the Unix epoch are rejected outright.
pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;

/// 2100-01-01T00:00:00Z. Anything later is a caller bug, not a booking.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 4_102_444_800_000;
