use crate::model::{ReservationStatus, Role};

/// Whether `role` may move a reservation into `target` status.
/// Managers may set anything; volunteers only the day-to-day desk states;
/// everyone else is denied.
pub fn may_transition(role: Role, target: ReservationStatus) -> bool {
    match role {
        Role::Manager => true,
        Role::Volunteer => matches!(
            target,
            ReservationStatus::CheckedIn
                | ReservationStatus::CheckedOut
                | ReservationStatus::NoShow
        ),
        Role::Owner | Role::Admin => false,
    }
}

/// Whether `role` may revise or delete reservation records outright.
pub fn may_administer(role: Role) -> bool {
    matches!(role, Role::Manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_may_set_any_status() {
        for status in ReservationStatus::ALL {
            assert!(may_transition(Role::Manager, status));
        }
    }

    #[test]
    fn volunteer_limited_to_desk_states() {
        assert!(may_transition(Role::Volunteer, ReservationStatus::CheckedIn));
        assert!(may_transition(Role::Volunteer, ReservationStatus::CheckedOut));
        assert!(may_transition(Role::Volunteer, ReservationStatus::NoShow));
        assert!(!may_transition(Role::Volunteer, ReservationStatus::Confirmed));
        assert!(!may_transition(Role::Volunteer, ReservationStatus::Cancelled));
    }

    #[test]
    fn owner_and_admin_denied_everything() {
        for status in ReservationStatus::ALL {
            assert!(!may_transition(Role::Owner, status));
            assert!(!may_transition(Role::Admin, status));
        }
    }

    #[test]
    fn only_manager_administers() {
        assert!(may_administer(Role::Manager));
        assert!(!may_administer(Role::Volunteer));
        assert!(!may_administer(Role::Owner));
        assert!(!may_administer(Role::Admin));
    }
}
