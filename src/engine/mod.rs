mod availability;
mod conflict;
mod error;
mod mutations;
mod queries;

pub use availability::{blocking_reservations, room_is_free};
pub use error::EngineError;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot, RwLock};
use ulid::Ulid;

use crate::journal::Journal;
use crate::model::*;
use crate::notify::Notifier;

pub type SharedRoomState = Arc<RwLock<RoomState>>;

// ── Group-commit journal channel ─────────────────────────

pub(super) enum JournalCommand {
    Append {
        event: Event,
        response: oneshot::Sender<io::Result<()>>,
    },
    Compact {
        events: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    AppendsSinceCompact {
        response: oneshot::Sender<u64>,
    },
}

/// Background task that owns the journal and batches appends for group commit.
/// 1. Block until the first Append arrives.
/// 2. Buffer it (no fsync).
/// 3. Drain all immediately available Appends (the batch window).
/// 4. Single flush_sync for the whole batch.
/// 5. Respond Ok to all senders.
async fn journal_writer_loop(mut journal: Journal, mut rx: mpsc::Receiver<JournalCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            JournalCommand::Append { event, response } => {
                let mut batch = vec![(event, response)];

                // Drain all immediately available appends
                loop {
                    match rx.try_recv() {
                        Ok(JournalCommand::Append { event, response }) => {
                            batch.push((event, response));
                        }
                        Ok(other) => {
                            // Flush current batch first, then handle the non-append command
                            metrics::histogram!(crate::observability::JOURNAL_FLUSH_BATCH_SIZE)
                                .record(batch.len() as f64);
                            let flush_start = std::time::Instant::now();
                            let result = flush_batch(&mut journal, &mut batch);
                            metrics::histogram!(crate::observability::JOURNAL_FLUSH_DURATION_SECONDS)
                                .record(flush_start.elapsed().as_secs_f64());
                            respond_batch(&mut batch, &result);
                            handle_non_append(&mut journal, other);
                            break;
                        }
                        Err(_) => break, // channel empty — flush batch
                    }
                }

                if !batch.is_empty() {
                    metrics::histogram!(crate::observability::JOURNAL_FLUSH_BATCH_SIZE)
                        .record(batch.len() as f64);
                    let flush_start = std::time::Instant::now();
                    let result = flush_batch(&mut journal, &mut batch);
                    metrics::histogram!(crate::observability::JOURNAL_FLUSH_DURATION_SECONDS)
                        .record(flush_start.elapsed().as_secs_f64());
                    respond_batch(&mut batch, &result);
                }
            }
            other => handle_non_append(&mut journal, other),
        }
    }
}

fn flush_batch(
    journal: &mut Journal,
    batch: &mut [(Event, oneshot::Sender<io::Result<()>>)],
) -> io::Result<()> {
    let mut append_err: Option<io::Error> = None;
    for (event, _) in batch.iter() {
        if let Err(e) = journal.append_buffered(event) {
            append_err = Some(e);
            break;
        }
    }
    // Always flush — even on append error — so partially buffered bytes
    // don't leak into the next batch (callers were told this batch failed).
    let flush_err = journal.flush_sync().err();
    if let Some(e) = append_err {
        return Err(e);
    }
    if let Some(e) = flush_err {
        return Err(e);
    }
    Ok(())
}

fn respond_batch(
    batch: &mut Vec<(Event, oneshot::Sender<io::Result<()>>)>,
    result: &io::Result<()>,
) {
    for (_, tx) in batch.drain(..) {
        let r = match result {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        };
        let _ = tx.send(r);
    }
}

fn handle_non_append(journal: &mut Journal, cmd: JournalCommand) {
    match cmd {
        JournalCommand::Compact { events, response } => {
            let result = Journal::write_compact_file(journal.path(), &events)
                .and_then(|()| journal.swap_compact_file());
            let _ = response.send(result);
        }
        JournalCommand::AppendsSinceCompact { response } => {
            let _ = response.send(journal.appends_since_compact());
        }
        JournalCommand::Append { .. } => unreachable!(),
    }
}

pub struct Engine {
    /// Room catalog + per-room reservation ledgers.
    rooms: DashMap<Ulid, SharedRoomState>,
    journal_tx: mpsc::Sender<JournalCommand>,
    notifier: Arc<dyn Notifier>,
    /// Reverse lookup: reservation id → room id
    reservation_rooms: DashMap<Ulid, Ulid>,
    dinners: DashMap<Weekday, Dinner>,
    tours: DashMap<Ulid, Tour>,
}

/// Apply an event directly to a RoomState (no locking — caller holds the lock).
fn apply_to_room(rs: &mut RoomState, event: &Event, reservation_map: &DashMap<Ulid, Ulid>) {
    match event {
        Event::ReservationCreated {
            id,
            room_id,
            guest,
            stay,
            persons,
        } => {
            rs.insert_reservation(Reservation {
                id: *id,
                room_id: *room_id,
                guest: guest.clone(),
                stay: *stay,
                persons: *persons,
                status: ReservationStatus::Confirmed,
            });
            reservation_map.insert(*id, *room_id);
        }
        Event::StatusChanged { id, status, .. } => {
            if let Some(r) = rs.find_reservation_mut(*id) {
                r.status = *status;
            }
        }
        Event::ReservationRevised {
            id,
            room_id,
            guest,
            stay,
            persons,
        } => {
            // Remove and reinsert: the new stay may change the sort position.
            // Status carries over.
            if let Some(mut r) = rs.remove_reservation(*id) {
                r.guest = guest.clone();
                r.stay = *stay;
                r.persons = *persons;
                rs.insert_reservation(r);
            }
            reservation_map.insert(*id, *room_id);
        }
        Event::ReservationDeleted { id, .. } => {
            rs.remove_reservation(*id);
            reservation_map.remove(id);
        }
        Event::RoomUpdated {
            name,
            category,
            capacity,
            price,
            amenities,
            ..
        } => {
            rs.room.name = name.clone();
            rs.room.category = category.clone();
            rs.room.capacity = *capacity;
            rs.room.price = *price;
            rs.room.amenities = amenities.clone();
        }
        // RoomAdded/RoomRemoved are handled at the DashMap level, not here;
        // dinner and tour events never touch a room.
        Event::RoomAdded { .. }
        | Event::RoomRemoved { .. }
        | Event::DinnerScheduled { .. }
        | Event::TourAdded { .. }
        | Event::TourRemoved { .. } => {}
    }
}

impl Engine {
    pub fn new(journal_path: PathBuf, notifier: Arc<dyn Notifier>) -> std::io::Result<Self> {
        let events = Journal::replay(&journal_path)?;
        let journal = Journal::open(&journal_path)?;
        let (journal_tx, journal_rx) = mpsc::channel(4096);
        tokio::spawn(journal_writer_loop(journal, journal_rx));

        let engine = Self {
            rooms: DashMap::new(),
            journal_tx,
            notifier,
            reservation_rooms: DashMap::new(),
            dinners: DashMap::new(),
            tours: DashMap::new(),
        };

        // Replay events — we're the sole owner of these Arcs, so try_write
        // always succeeds instantly (no contention). Never use blocking_write
        // here because this may run inside an async context.
        for event in &events {
            match event {
                Event::RoomAdded {
                    id,
                    name,
                    category,
                    capacity,
                    price,
                    amenities,
                } => {
                    let room = Room {
                        id: *id,
                        name: name.clone(),
                        category: category.clone(),
                        capacity: *capacity,
                        price: *price,
                        amenities: amenities.clone(),
                    };
                    engine.rooms.insert(*id, Arc::new(RwLock::new(RoomState::new(room))));
                }
                Event::RoomRemoved { id } => {
                    if let Some((_, rs)) = engine.rooms.remove(id) {
                        let guard = rs.try_read().expect("replay: uncontended read");
                        for r in &guard.reservations {
                            engine.reservation_rooms.remove(&r.id);
                        }
                    }
                }
                Event::DinnerScheduled {
                    weekday,
                    name,
                    vegetarian_option,
                    allergens,
                    price,
                } => {
                    engine.dinners.insert(
                        *weekday,
                        Dinner {
                            weekday: *weekday,
                            name: name.clone(),
                            vegetarian_option: *vegetarian_option,
                            allergens: allergens.clone(),
                            price: *price,
                        },
                    );
                }
                Event::TourAdded {
                    id,
                    name,
                    description,
                    price,
                } => {
                    engine.tours.insert(
                        *id,
                        Tour {
                            id: *id,
                            name: name.clone(),
                            description: description.clone(),
                            price: *price,
                        },
                    );
                }
                Event::TourRemoved { id } => {
                    engine.tours.remove(id);
                }
                other => {
                    if let Some(room_id) = event_room_id(other)
                        && let Some(entry) = engine.rooms.get(&room_id)
                    {
                        let rs_arc = entry.clone();
                        let mut guard = rs_arc.try_write().expect("replay: uncontended write");
                        apply_to_room(&mut guard, other, &engine.reservation_rooms);
                    }
                }
            }
        }

        Ok(engine)
    }

    /// Write event to the journal via the background group-commit writer.
    async fn journal_append(&self, event: &Event) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.journal_tx
            .send(JournalCommand::Append {
                event: event.clone(),
                response: tx,
            })
            .await
            .map_err(|_| EngineError::Journal("journal writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::Journal("journal writer dropped response".into()))?
            .map_err(|e| EngineError::Journal(e.to_string()))
    }

    pub fn room_state(&self, id: &Ulid) -> Option<SharedRoomState> {
        self.rooms.get(id).map(|e| e.value().clone())
    }

    pub fn room_for_reservation(&self, reservation_id: &Ulid) -> Option<Ulid> {
        self.reservation_rooms.get(reservation_id).map(|e| *e.value())
    }

    /// Journal-append + apply in one call. The caller holds the room's write
    /// lock, so durability and visibility happen under the same critical
    /// section.
    pub(super) async fn persist_and_apply(
        &self,
        rs: &mut RoomState,
        event: &Event,
    ) -> Result<(), EngineError> {
        self.journal_append(event).await?;
        apply_to_room(rs, event, &self.reservation_rooms);
        Ok(())
    }

    /// Lookup reservation → room, get room, acquire write lock.
    pub(super) async fn resolve_reservation_write(
        &self,
        reservation_id: &Ulid,
    ) -> Result<(Ulid, tokio::sync::OwnedRwLockWriteGuard<RoomState>), EngineError> {
        let room_id = self
            .room_for_reservation(reservation_id)
            .ok_or(EngineError::NotFound(*reservation_id))?;
        let rs = self
            .room_state(&room_id)
            .ok_or(EngineError::NotFound(room_id))?;
        let guard = rs.write_owned().await;
        Ok((room_id, guard))
    }
}

/// Extract the room_id from an event (for per-room events only).
fn event_room_id(event: &Event) -> Option<Ulid> {
    match event {
        Event::ReservationCreated { room_id, .. }
        | Event::StatusChanged { room_id, .. }
        | Event::ReservationRevised { room_id, .. }
        | Event::ReservationDeleted { room_id, .. } => Some(*room_id),
        Event::RoomUpdated { id, .. } => Some(*id),
        Event::RoomAdded { .. }
        | Event::RoomRemoved { .. }
        | Event::DinnerScheduled { .. }
        | Event::TourAdded { .. }
        | Event::TourRemoved { .. } => None,
    }
}
