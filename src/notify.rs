use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::model::{Reservation, Room};

#[derive(Debug)]
pub struct NotifyError(pub String);

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotifyError {}

/// Outbound confirmation seam. The engine calls this after a successful
/// reserve, off the request path; a returned error is logged and swallowed,
/// never surfaced to the booking caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_confirmed(
        &self,
        reservation: &Reservation,
        room: &Room,
    ) -> Result<(), NotifyError>;
}

/// Renders the confirmation payload and logs it instead of delivering it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_confirmed(
        &self,
        reservation: &Reservation,
        room: &Room,
    ) -> Result<(), NotifyError> {
        let nights = reservation.stay.nights();
        let payload = json!({
            "to": reservation.guest.email,
            "guest": reservation.guest.name,
            "room": room.name,
            "check_in": reservation.stay.check_in,
            "check_out": reservation.stay.check_out,
            "persons": reservation.persons,
            "nights": nights,
            "total": nights * i64::from(room.price),
        });
        info!("booking confirmation for {}: {payload}", reservation.id);
        Ok(())
    }
}

/// Discards confirmations. For tests and embedders that deliver their own.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn booking_confirmed(&self, _: &Reservation, _: &Room) -> Result<(), NotifyError> {
        Ok(())
    }
}
