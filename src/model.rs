use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

/// One calendar day in milliseconds.
pub const DAY_MS: Ms = 86_400_000;

/// Largest UTC day boundary at or before `t`.
pub fn floor_to_day(t: Ms) -> Ms {
    t - t.rem_euclid(DAY_MS)
}

/// Smallest UTC day boundary at or after `t`. Identity on boundaries, so a
/// date-only check-out stays exclusive of its own day.
pub fn ceil_to_day(t: Ms) -> Ms {
    let floored = floor_to_day(t);
    if floored == t { t } else { floored + DAY_MS }
}

/// Half-open stay `[check_in, check_out)`. The check-out day is not occupied:
/// a guest leaving on the 12th frees the room for one arriving on the 12th.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    pub check_in: Ms,
    pub check_out: Ms,
}

impl Stay {
    pub fn new(check_in: Ms, check_out: Ms) -> Self {
        debug_assert!(check_in < check_out, "Stay check-in must be before check-out");
        Self { check_in, check_out }
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in) / DAY_MS
    }

    pub fn duration_ms(&self) -> Ms {
        self.check_out - self.check_in
    }

    pub fn overlaps(&self, other: &Stay) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

/// Reservation lifecycle, with the literals the dashboard exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReservationStatus {
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 5] = [
        ReservationStatus::Confirmed,
        ReservationStatus::CheckedIn,
        ReservationStatus::CheckedOut,
        ReservationStatus::Cancelled,
        ReservationStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::CheckedIn => "checked-in",
            ReservationStatus::CheckedOut => "checked-out",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::NoShow => "no-show",
        }
    }

    /// Parse a wire literal. Anything outside the five states is `None`;
    /// callers surface that as a validation error.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(ReservationStatus::Confirmed),
            "checked-in" => Some(ReservationStatus::CheckedIn),
            "checked-out" => Some(ReservationStatus::CheckedOut),
            "cancelled" => Some(ReservationStatus::Cancelled),
            "no-show" => Some(ReservationStatus::NoShow),
            _ => None,
        }
    }

    /// Whether a reservation in this status still occupies its room.
    /// Cancelled and no-show stays release it.
    pub fn blocks(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled | ReservationStatus::NoShow)
    }
}

/// Staff roles, as the identity layer reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Manager,
    Volunteer,
    Owner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Volunteer => "volunteer",
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manager" => Some(Role::Manager),
            "volunteer" => Some(Role::Volunteer),
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Guest contact, denormalized onto each reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Ulid,
    pub name: String,
    /// "Private", "Dorm", ...
    pub category: String,
    /// Max persons per stay (>= 1).
    pub capacity: u32,
    /// Per night, whole currency units.
    pub price: u32,
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub room_id: Ulid,
    pub guest: Guest,
    pub stay: Stay,
    pub persons: u32,
    pub status: ReservationStatus,
}

/// A room plus its reservations, sorted by `stay.check_in`.
#[derive(Debug, Clone)]
pub struct RoomState {
    pub room: Room,
    pub reservations: Vec<Reservation>,
}

impl RoomState {
    pub fn new(room: Room) -> Self {
        Self { room, reservations: Vec::new() }
    }

    /// Insert keeping sort order by check-in.
    pub fn insert_reservation(&mut self, reservation: Reservation) {
        let pos = self
            .reservations
            .binary_search_by_key(&reservation.stay.check_in, |r| r.stay.check_in)
            .unwrap_or_else(|e| e);
        self.reservations.insert(pos, reservation);
    }

    /// Remove reservation by id.
    pub fn remove_reservation(&mut self, id: Ulid) -> Option<Reservation> {
        if let Some(pos) = self.reservations.iter().position(|r| r.id == id) {
            Some(self.reservations.remove(pos))
        } else {
            None
        }
    }

    pub fn find_reservation(&self, id: Ulid) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }

    pub fn find_reservation_mut(&mut self, id: Ulid) -> Option<&mut Reservation> {
        self.reservations.iter_mut().find(|r| r.id == id)
    }

    /// Return reservations whose stay overlaps the query window, any status.
    /// Uses binary search to skip stays checking in at or after `query.check_out`.
    pub fn overlapping(&self, query: &Stay) -> impl Iterator<Item = &Reservation> {
        // Everything at index >= right_bound checks in at or after query.check_out → can't overlap.
        let right_bound = self
            .reservations
            .partition_point(|r| r.stay.check_in < query.check_out);
        self.reservations[..right_bound]
            .iter()
            .filter(move |r| r.stay.check_out > query.check_in)
    }
}

/// Days of the week, keyed by the dinner schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// UTC weekday of a unix-ms instant. The epoch fell on a Thursday.
    pub fn from_unix_ms(t: Ms) -> Self {
        const FROM_THURSDAY: [Weekday; 7] = [
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
        ];
        let days = floor_to_day(t) / DAY_MS;
        FROM_THURSDAY[days.rem_euclid(7) as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Monday" => Some(Weekday::Monday),
            "Tuesday" => Some(Weekday::Tuesday),
            "Wednesday" => Some(Weekday::Wednesday),
            "Thursday" => Some(Weekday::Thursday),
            "Friday" => Some(Weekday::Friday),
            "Saturday" => Some(Weekday::Saturday),
            "Sunday" => Some(Weekday::Sunday),
            _ => None,
        }
    }
}

/// The dinner offered on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dinner {
    pub weekday: Weekday,
    pub name: String,
    pub vegetarian_option: bool,
    pub allergens: Vec<String>,
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    pub id: Ulid,
    pub name: String,
    pub description: String,
    pub price: u32,
}

/// The event types — flat, no nesting. This is the journal record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RoomAdded {
        id: Ulid,
        name: String,
        category: String,
        capacity: u32,
        price: u32,
        amenities: Vec<String>,
    },
    RoomUpdated {
        id: Ulid,
        name: String,
        category: String,
        capacity: u32,
        price: u32,
        amenities: Vec<String>,
    },
    RoomRemoved {
        id: Ulid,
    },
    ReservationCreated {
        id: Ulid,
        room_id: Ulid,
        guest: Guest,
        stay: Stay,
        persons: u32,
    },
    StatusChanged {
        id: Ulid,
        room_id: Ulid,
        status: ReservationStatus,
    },
    ReservationRevised {
        id: Ulid,
        room_id: Ulid,
        guest: Guest,
        stay: Stay,
        persons: u32,
    },
    ReservationDeleted {
        id: Ulid,
        room_id: Ulid,
    },
    DinnerScheduled {
        weekday: Weekday,
        name: String,
        vegetarian_option: bool,
        allergens: Vec<String>,
        price: u32,
    },
    TourAdded {
        id: Ulid,
        name: String,
        description: String,
        price: u32,
    },
    TourRemoved {
        id: Ulid,
    },
}

// ── Query result types ───────────────────────────────────────────

/// Dashboard row: a reservation joined with its room's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationSummary {
    pub id: Ulid,
    pub room_id: Ulid,
    pub room_name: String,
    pub guest: Guest,
    pub stay: Stay,
    pub persons: u32,
    pub status: ReservationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(name: &str) -> Guest {
        Guest {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
        }
    }

    fn reservation(id: Ulid, check_in: Ms, check_out: Ms) -> Reservation {
        Reservation {
            id,
            room_id: Ulid::new(),
            guest: guest("Amina"),
            stay: Stay::new(check_in, check_out),
            persons: 1,
            status: ReservationStatus::Confirmed,
        }
    }

    fn room() -> Room {
        Room {
            id: Ulid::new(),
            name: "Room 1".into(),
            category: "Private".into(),
            capacity: 2,
            price: 20,
            amenities: vec!["WIFI".into()],
        }
    }

    #[test]
    fn stay_basics() {
        let s = Stay::new(0, 2 * DAY_MS);
        assert_eq!(s.nights(), 2);
        assert_eq!(s.duration_ms(), 2 * DAY_MS);
    }

    #[test]
    fn stay_overlap_half_open() {
        let a = Stay::new(0, 2 * DAY_MS);
        let b = Stay::new(DAY_MS, 3 * DAY_MS);
        let c = Stay::new(2 * DAY_MS, 4 * DAY_MS);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // back-to-back, not overlapping
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn day_floor_and_ceil() {
        let noon = 3 * DAY_MS + DAY_MS / 2;
        assert_eq!(floor_to_day(noon), 3 * DAY_MS);
        assert_eq!(ceil_to_day(noon), 4 * DAY_MS);
        // Boundaries are fixed points both ways
        assert_eq!(floor_to_day(3 * DAY_MS), 3 * DAY_MS);
        assert_eq!(ceil_to_day(3 * DAY_MS), 3 * DAY_MS);
    }

    #[test]
    fn day_floor_pre_epoch() {
        assert_eq!(floor_to_day(-1), -DAY_MS);
        assert_eq!(ceil_to_day(-1), 0);
    }

    #[test]
    fn status_literals_round_trip() {
        for status in ReservationStatus::ALL {
            assert_eq!(ReservationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReservationStatus::parse("checked_in"), None);
        assert_eq!(ReservationStatus::parse("CONFIRMED"), None);
        assert_eq!(ReservationStatus::parse(""), None);
    }

    #[test]
    fn blocking_statuses() {
        assert!(ReservationStatus::Confirmed.blocks());
        assert!(ReservationStatus::CheckedIn.blocks());
        assert!(ReservationStatus::CheckedOut.blocks());
        assert!(!ReservationStatus::Cancelled.blocks());
        assert!(!ReservationStatus::NoShow.blocks());
    }

    #[test]
    fn role_literals() {
        assert_eq!(Role::parse("manager"), Some(Role::Manager));
        assert_eq!(Role::parse("volunteer"), Some(Role::Volunteer));
        assert_eq!(Role::parse("guest"), None);
        assert_eq!(Role::Manager.as_str(), "manager");
    }

    #[test]
    fn reservation_ordering() {
        let mut rs = RoomState::new(room());
        rs.insert_reservation(reservation(Ulid::new(), 5 * DAY_MS, 7 * DAY_MS));
        rs.insert_reservation(reservation(Ulid::new(), DAY_MS, 3 * DAY_MS));
        rs.insert_reservation(reservation(Ulid::new(), 3 * DAY_MS, 5 * DAY_MS));
        assert_eq!(rs.reservations[0].stay.check_in, DAY_MS);
        assert_eq!(rs.reservations[1].stay.check_in, 3 * DAY_MS);
        assert_eq!(rs.reservations[2].stay.check_in, 5 * DAY_MS);
    }

    #[test]
    fn reservation_remove() {
        let mut rs = RoomState::new(room());
        let id = Ulid::new();
        rs.insert_reservation(reservation(id, DAY_MS, 3 * DAY_MS));
        assert!(rs.remove_reservation(id).is_some());
        assert!(rs.reservations.is_empty());
        assert!(rs.remove_reservation(id).is_none());
    }

    #[test]
    fn remove_middle_preserves_order() {
        let mut rs = RoomState::new(room());
        let ids: Vec<Ulid> = (0..3).map(|_| Ulid::new()).collect();
        for (i, &id) in ids.iter().enumerate() {
            rs.insert_reservation(reservation(id, (i as Ms) * 2 * DAY_MS, (i as Ms) * 2 * DAY_MS + DAY_MS));
        }
        rs.remove_reservation(ids[1]); // remove middle
        assert_eq!(rs.reservations.len(), 2);
        assert_eq!(rs.reservations[0].id, ids[0]);
        assert_eq!(rs.reservations[1].id, ids[2]);
    }

    #[test]
    fn overlapping_skips_past_and_future() {
        let mut rs = RoomState::new(room());
        // Past stay
        rs.insert_reservation(reservation(Ulid::new(), 0, 2 * DAY_MS));
        // Overlapping stay
        let hit = Ulid::new();
        rs.insert_reservation(reservation(hit, 4 * DAY_MS, 6 * DAY_MS));
        // Future stay (checks in after query check-out)
        rs.insert_reservation(reservation(Ulid::new(), 10 * DAY_MS, 12 * DAY_MS));

        let query = Stay::new(5 * DAY_MS, 8 * DAY_MS);
        let hits: Vec<_> = rs.overlapping(&query).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, hit);
    }

    #[test]
    fn overlapping_back_to_back_not_included() {
        // Stay checking out exactly at the query check-in is NOT overlapping (half-open)
        let mut rs = RoomState::new(room());
        rs.insert_reservation(reservation(Ulid::new(), 0, 2 * DAY_MS));
        let query = Stay::new(2 * DAY_MS, 4 * DAY_MS);
        assert_eq!(rs.overlapping(&query).count(), 0);
    }

    #[test]
    fn overlapping_stay_spanning_query() {
        let mut rs = RoomState::new(room());
        // One long stay that checks in before and out after the query
        rs.insert_reservation(reservation(Ulid::new(), 0, 30 * DAY_MS));
        let query = Stay::new(10 * DAY_MS, 12 * DAY_MS);
        assert_eq!(rs.overlapping(&query).count(), 1);
    }

    #[test]
    fn overlapping_ignores_status() {
        // Fetch is status-agnostic; filtering is the availability layer's job
        let mut rs = RoomState::new(room());
        let mut r = reservation(Ulid::new(), 0, 2 * DAY_MS);
        r.status = ReservationStatus::Cancelled;
        rs.insert_reservation(r);
        let query = Stay::new(DAY_MS, 3 * DAY_MS);
        assert_eq!(rs.overlapping(&query).count(), 1);
    }

    #[test]
    fn overlapping_empty_room() {
        let rs = RoomState::new(room());
        assert_eq!(rs.overlapping(&Stay::new(0, DAY_MS)).count(), 0);
    }

    #[test]
    fn weekday_from_unix_ms() {
        assert_eq!(Weekday::from_unix_ms(0), Weekday::Thursday);
        assert_eq!(Weekday::from_unix_ms(DAY_MS), Weekday::Friday);
        assert_eq!(Weekday::from_unix_ms(4 * DAY_MS), Weekday::Monday);
        // Mid-day instants resolve to the same weekday
        assert_eq!(Weekday::from_unix_ms(DAY_MS / 2), Weekday::Thursday);
        // 1969-12-31 was a Wednesday
        assert_eq!(Weekday::from_unix_ms(-1), Weekday::Wednesday);
    }

    #[test]
    fn weekday_literals() {
        assert_eq!(Weekday::parse("Friday"), Some(Weekday::Friday));
        assert_eq!(Weekday::parse("friday"), None);
        assert_eq!(Weekday::Saturday.as_str(), "Saturday");
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::ReservationCreated {
            id: Ulid::new(),
            room_id: Ulid::new(),
            guest: guest("Yousef"),
            stay: Stay::new(DAY_MS, 3 * DAY_MS),
            persons: 2,
        };
        let bytes = bincode::serialize(&event).unwrap();
        let decoded: Event = bincode::deserialize(&bytes).unwrap();
        assert_eq!(event, decoded);
    }
}
