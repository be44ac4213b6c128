use ulid::Ulid;

use crate::model::*;

use super::availability::room_is_free;
use super::conflict::{normalize_stay, validate_query_window};
use super::{Engine, EngineError};

impl Engine {
    /// The booking-page query: rooms big enough for the party with no
    /// blocking reservation overlapping the normalized stay, in catalog (id)
    /// order. An empty result is an answer, not an error.
    pub async fn find_available_rooms(
        &self,
        check_in: Ms,
        check_out: Ms,
        persons: u32,
    ) -> Result<Vec<Room>, EngineError> {
        if persons < 1 {
            return Err(EngineError::Validation("persons must be at least 1"));
        }
        let stay = normalize_stay(check_in, check_out)?;
        validate_query_window(&stay)?;
        metrics::counter!(crate::observability::AVAILABILITY_QUERIES_TOTAL).increment(1);

        let mut ids: Vec<Ulid> = self.rooms.iter().map(|e| *e.key()).collect();
        ids.sort();

        let mut free = Vec::new();
        for id in ids {
            let Some(rs) = self.room_state(&id) else { continue };
            let guard = rs.read().await;
            if guard.room.capacity >= persons && room_is_free(&guard, &stay) {
                free.push(guard.room.clone());
            }
        }
        Ok(free)
    }

    pub async fn list_rooms(&self) -> Vec<Room> {
        let mut ids: Vec<Ulid> = self.rooms.iter().map(|e| *e.key()).collect();
        ids.sort();
        let mut rooms = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(rs) = self.room_state(&id) else { continue };
            let guard = rs.read().await;
            rooms.push(guard.room.clone());
        }
        rooms
    }

    pub async fn get_room(&self, id: Ulid) -> Result<Room, EngineError> {
        let rs = self.room_state(&id).ok_or(EngineError::NotFound(id))?;
        let guard = rs.read().await;
        Ok(guard.room.clone())
    }

    pub async fn get_reservation(&self, id: Ulid) -> Result<Reservation, EngineError> {
        let room_id = self
            .room_for_reservation(&id)
            .ok_or(EngineError::NotFound(id))?;
        let rs = self.room_state(&room_id).ok_or(EngineError::NotFound(id))?;
        let guard = rs.read().await;
        guard
            .find_reservation(id)
            .cloned()
            .ok_or(EngineError::NotFound(id))
    }

    /// All reservations on one room, any status, ordered by check-in.
    pub async fn reservations_for_room(
        &self,
        room_id: Ulid,
    ) -> Result<Vec<Reservation>, EngineError> {
        let rs = self
            .room_state(&room_id)
            .ok_or(EngineError::NotFound(room_id))?;
        let guard = rs.read().await;
        Ok(guard.reservations.clone())
    }

    /// Dashboard listing: every reservation joined with its room's name,
    /// ordered by reservation id.
    pub async fn list_reservations(&self) -> Vec<ReservationSummary> {
        let ids: Vec<Ulid> = self.rooms.iter().map(|e| *e.key()).collect();
        let mut out = Vec::new();
        for id in ids {
            let Some(rs) = self.room_state(&id) else { continue };
            let guard = rs.read().await;
            for r in &guard.reservations {
                out.push(ReservationSummary {
                    id: r.id,
                    room_id: r.room_id,
                    room_name: guard.room.name.clone(),
                    guest: r.guest.clone(),
                    stay: r.stay,
                    persons: r.persons,
                    status: r.status,
                });
            }
        }
        out.sort_by_key(|s| s.id);
        out
    }

    pub fn dinner_for(&self, weekday: Weekday) -> Option<Dinner> {
        self.dinners.get(&weekday).map(|e| e.value().clone())
    }

    /// Tonight's dinner, if one is scheduled for `now`'s UTC weekday.
    pub fn dinner_today(&self, now: Ms) -> Option<Dinner> {
        self.dinner_for(Weekday::from_unix_ms(now))
    }

    pub fn list_tours(&self) -> Vec<Tour> {
        let mut tours: Vec<Tour> = self.tours.iter().map(|e| e.value().clone()).collect();
        tours.sort_by_key(|t| t.id);
        tours
    }
}
