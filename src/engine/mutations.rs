use std::sync::Arc;

use tokio::sync::{oneshot, RwLock};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::policy;

use super::conflict::{
    check_no_conflict, normalize_stay, validate_dinner, validate_guest, validate_persons,
    validate_room, validate_stay_length, validate_tour,
};
use super::{Engine, EngineError, JournalCommand};

impl Engine {
    pub async fn add_room(&self, room: Room) -> Result<(), EngineError> {
        validate_room(&room)?;
        if self.rooms.len() >= MAX_ROOMS {
            return Err(EngineError::LimitExceeded("too many rooms"));
        }
        if self.rooms.contains_key(&room.id) {
            return Err(EngineError::AlreadyExists(room.id));
        }

        let event = Event::RoomAdded {
            id: room.id,
            name: room.name.clone(),
            category: room.category.clone(),
            capacity: room.capacity,
            price: room.price,
            amenities: room.amenities.clone(),
        };
        self.journal_append(&event).await?;
        self.rooms
            .insert(room.id, Arc::new(RwLock::new(RoomState::new(room))));
        Ok(())
    }

    pub async fn update_room(
        &self,
        id: Ulid,
        name: String,
        category: String,
        capacity: u32,
        price: u32,
        amenities: Vec<String>,
    ) -> Result<(), EngineError> {
        let candidate = Room {
            id,
            name,
            category,
            capacity,
            price,
            amenities,
        };
        validate_room(&candidate)?;
        let rs = self.room_state(&id).ok_or(EngineError::NotFound(id))?;
        let mut guard = rs.write().await;

        let event = Event::RoomUpdated {
            id,
            name: candidate.name,
            category: candidate.category,
            capacity: candidate.capacity,
            price: candidate.price,
            amenities: candidate.amenities,
        };
        self.persist_and_apply(&mut guard, &event).await
    }

    /// Remove a room from the catalog. Refused while any reservation still
    /// references it, whatever its status.
    pub async fn remove_room(&self, id: Ulid) -> Result<(), EngineError> {
        let rs = self.room_state(&id).ok_or(EngineError::NotFound(id))?;
        let guard = rs.write().await;
        if !guard.reservations.is_empty() {
            return Err(EngineError::HasReservations(id));
        }

        let event = Event::RoomRemoved { id };
        self.journal_append(&event).await?;
        self.rooms.remove(&id);
        Ok(())
    }

    /// Create a reservation. The conflict check and the insert run under the
    /// room's write lock, so of N concurrent overlapping requests exactly one
    /// wins and the rest see `Conflict`.
    pub async fn reserve(
        &self,
        room_id: Ulid,
        guest: Guest,
        check_in: Ms,
        check_out: Ms,
        persons: u32,
    ) -> Result<Reservation, EngineError> {
        validate_guest(&guest)?;
        let stay = normalize_stay(check_in, check_out)?;
        validate_stay_length(&stay)?;

        let rs = self
            .room_state(&room_id)
            .ok_or(EngineError::NotFound(room_id))?;
        let mut guard = rs.write().await;
        validate_persons(persons, guard.room.capacity)?;
        if guard.reservations.len() >= MAX_RESERVATIONS_PER_ROOM {
            return Err(EngineError::LimitExceeded("too many reservations on room"));
        }

        if let Err(e) = check_no_conflict(&guard, &stay, None) {
            metrics::counter!(crate::observability::RESERVATION_CONFLICTS_TOTAL).increment(1);
            return Err(e);
        }

        let id = Ulid::new();
        let reservation = Reservation {
            id,
            room_id,
            guest,
            stay,
            persons,
            status: ReservationStatus::Confirmed,
        };
        let event = Event::ReservationCreated {
            id,
            room_id,
            guest: reservation.guest.clone(),
            stay,
            persons,
        };
        self.persist_and_apply(&mut guard, &event).await?;
        let room = guard.room.clone();
        drop(guard);

        metrics::counter!(crate::observability::RESERVATIONS_TOTAL).increment(1);

        // Confirmation is fire-and-forget: a delivery failure never fails the
        // booking. Logged and counted, nothing else.
        let notifier = self.notifier.clone();
        let snapshot = reservation.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.booking_confirmed(&snapshot, &room).await {
                metrics::counter!(crate::observability::NOTIFY_FAILURES_TOTAL).increment(1);
                tracing::warn!("confirmation for {} failed: {e}", snapshot.id);
            }
        });

        Ok(reservation)
    }

    /// Set a reservation's status. The role gate is the only transition rule:
    /// there is no lifecycle graph, and nothing reverts on its own.
    pub async fn transition_status(
        &self,
        reservation_id: Ulid,
        new_status: ReservationStatus,
        acting_role: Role,
    ) -> Result<Reservation, EngineError> {
        if !policy::may_transition(acting_role, new_status) {
            return Err(EngineError::Forbidden("role may not set this status"));
        }
        let (room_id, mut guard) = self.resolve_reservation_write(&reservation_id).await?;
        if guard.find_reservation(reservation_id).is_none() {
            return Err(EngineError::NotFound(reservation_id));
        }

        let event = Event::StatusChanged {
            id: reservation_id,
            room_id,
            status: new_status,
        };
        self.persist_and_apply(&mut guard, &event).await?;
        metrics::counter!(crate::observability::STATUS_TRANSITIONS_TOTAL).increment(1);
        guard
            .find_reservation(reservation_id)
            .cloned()
            .ok_or(EngineError::NotFound(reservation_id))
    }

    /// Manager-only administrative update. Absent fields keep their current
    /// values; a stay change re-runs the conflict check against everyone but
    /// this reservation.
    pub async fn revise_reservation(
        &self,
        id: Ulid,
        guest: Option<Guest>,
        stay: Option<(Ms, Ms)>,
        persons: Option<u32>,
        acting_role: Role,
    ) -> Result<Reservation, EngineError> {
        if !policy::may_administer(acting_role) {
            return Err(EngineError::Forbidden("only managers may revise reservations"));
        }
        let (room_id, mut guard) = self.resolve_reservation_write(&id).await?;
        let current = guard
            .find_reservation(id)
            .cloned()
            .ok_or(EngineError::NotFound(id))?;

        let new_guest = match guest {
            Some(g) => {
                validate_guest(&g)?;
                g
            }
            None => current.guest,
        };
        let new_stay = match stay {
            Some((check_in, check_out)) => {
                let s = normalize_stay(check_in, check_out)?;
                validate_stay_length(&s)?;
                s
            }
            None => current.stay,
        };
        let new_persons = persons.unwrap_or(current.persons);
        validate_persons(new_persons, guard.room.capacity)?;

        if new_stay != current.stay {
            if let Err(e) = check_no_conflict(&guard, &new_stay, Some(id)) {
                metrics::counter!(crate::observability::RESERVATION_CONFLICTS_TOTAL).increment(1);
                return Err(e);
            }
        }

        let event = Event::ReservationRevised {
            id,
            room_id,
            guest: new_guest,
            stay: new_stay,
            persons: new_persons,
        };
        self.persist_and_apply(&mut guard, &event).await?;
        guard
            .find_reservation(id)
            .cloned()
            .ok_or(EngineError::NotFound(id))
    }

    /// Manager-only administrative delete. Removes the record outright,
    /// bypassing the status lifecycle.
    pub async fn delete_reservation(&self, id: Ulid, acting_role: Role) -> Result<(), EngineError> {
        if !policy::may_administer(acting_role) {
            return Err(EngineError::Forbidden("only managers may delete reservations"));
        }
        let (room_id, mut guard) = self.resolve_reservation_write(&id).await?;
        let event = Event::ReservationDeleted { id, room_id };
        self.persist_and_apply(&mut guard, &event).await
    }

    /// Upsert the dinner offered on `dinner.weekday`.
    pub async fn schedule_dinner(&self, dinner: Dinner) -> Result<(), EngineError> {
        validate_dinner(&dinner)?;
        let event = Event::DinnerScheduled {
            weekday: dinner.weekday,
            name: dinner.name.clone(),
            vegetarian_option: dinner.vegetarian_option,
            allergens: dinner.allergens.clone(),
            price: dinner.price,
        };
        self.journal_append(&event).await?;
        self.dinners.insert(dinner.weekday, dinner);
        Ok(())
    }

    pub async fn add_tour(&self, tour: Tour) -> Result<(), EngineError> {
        validate_tour(&tour)?;
        if self.tours.len() >= MAX_TOURS {
            return Err(EngineError::LimitExceeded("too many tours"));
        }
        if self.tours.contains_key(&tour.id) {
            return Err(EngineError::AlreadyExists(tour.id));
        }
        let event = Event::TourAdded {
            id: tour.id,
            name: tour.name.clone(),
            description: tour.description.clone(),
            price: tour.price,
        };
        self.journal_append(&event).await?;
        self.tours.insert(tour.id, tour);
        Ok(())
    }

    pub async fn remove_tour(&self, id: Ulid) -> Result<(), EngineError> {
        if !self.tours.contains_key(&id) {
            return Err(EngineError::NotFound(id));
        }
        let event = Event::TourRemoved { id };
        self.journal_append(&event).await?;
        self.tours.remove(&id);
        Ok(())
    }

    /// Compact the journal by rewriting it with only the events needed to
    /// recreate the current state.
    pub async fn compact_journal(&self) -> Result<(), EngineError> {
        let mut events = Vec::new();

        let room_ids: Vec<Ulid> = self.rooms.iter().map(|e| *e.key()).collect();
        for id in room_ids {
            let Some(rs) = self.room_state(&id) else { continue };
            let guard = rs.read().await;
            events.push(Event::RoomAdded {
                id: guard.room.id,
                name: guard.room.name.clone(),
                category: guard.room.category.clone(),
                capacity: guard.room.capacity,
                price: guard.room.price,
                amenities: guard.room.amenities.clone(),
            });
            for r in &guard.reservations {
                events.push(Event::ReservationCreated {
                    id: r.id,
                    room_id: r.room_id,
                    guest: r.guest.clone(),
                    stay: r.stay,
                    persons: r.persons,
                });
                // Created events replay as Confirmed; anything else needs its
                // last transition re-stated.
                if r.status != ReservationStatus::Confirmed {
                    events.push(Event::StatusChanged {
                        id: r.id,
                        room_id: r.room_id,
                        status: r.status,
                    });
                }
            }
        }
        for entry in self.dinners.iter() {
            let d = entry.value();
            events.push(Event::DinnerScheduled {
                weekday: d.weekday,
                name: d.name.clone(),
                vegetarian_option: d.vegetarian_option,
                allergens: d.allergens.clone(),
                price: d.price,
            });
        }
        for entry in self.tours.iter() {
            let t = entry.value();
            events.push(Event::TourAdded {
                id: t.id,
                name: t.name.clone(),
                description: t.description.clone(),
                price: t.price,
            });
        }

        let (tx, rx) = oneshot::channel();
        self.journal_tx
            .send(JournalCommand::Compact { events, response: tx })
            .await
            .map_err(|_| EngineError::Journal("journal writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::Journal("journal writer dropped response".into()))?
            .map_err(|e| EngineError::Journal(e.to_string()))
    }

    pub async fn journal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .journal_tx
            .send(JournalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}
