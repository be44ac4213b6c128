use ulid::Ulid;

#[derive(Debug)]
pub enum EngineError {
    /// Request malformed or out of range; the message names the field.
    Validation(&'static str),
    /// The stay overlaps an existing blocking reservation (its id).
    Conflict(Ulid),
    NotFound(Ulid),
    /// The acting role may not perform this operation.
    Forbidden(&'static str),
    AlreadyExists(Ulid),
    /// Room removal refused while reservations reference it.
    HasReservations(Ulid),
    LimitExceeded(&'static str),
    /// Journal I/O failure; internal detail, not for end users.
    Journal(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(msg) => write!(f, "validation failed: {msg}"),
            EngineError::Conflict(id) => write!(f, "conflict with reservation: {id}"),
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::Forbidden(msg) => write!(f, "forbidden: {msg}"),
            EngineError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            EngineError::HasReservations(id) => {
                write!(f, "cannot remove room {id}: has reservations")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Journal(e) => write!(f, "journal error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
