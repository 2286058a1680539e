//! Booking conflict checks over half-open intervals.

use renta_types::{Address, BookingInterval};

/// Why a requested interval cannot be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The interval overlaps a booking controlled by someone else.
    AlreadyRented,
    /// The user's own booking would be extended into another booking.
    ExtensionBlocked,
}

impl ConflictReason {
    pub fn key(&self) -> &'static str {
        // Both cases surface as the same key to callers; the variant tells
        // them apart programmatically.
        "already_rented"
    }
}

/// Check `[rent_from, rent_until)` against the booking list.
///
/// An overlap with a foreign booking is [`ConflictReason::AlreadyRented`].
/// An overlap with the user's own booking means the request is an extension:
/// the extension window `[own.rented_until, own.rented_until + seconds)` is
/// then checked against the whole list, and a hit there is
/// [`ConflictReason::ExtensionBlocked`].  Touching intervals never conflict,
/// and an empty request interval overlaps nothing.
pub fn find_conflict(
    states: &[BookingInterval],
    user: Address,
    rent_from: u64,
    rent_until: u64,
) -> Option<ConflictReason> {
    if rent_from >= rent_until {
        return None;
    }
    let existing = states
        .iter()
        .find(|s| s.overlaps_range(rent_from, rent_until))?;
    if existing.controller != user {
        return Some(ConflictReason::AlreadyRented);
    }

    let seconds = rent_until.saturating_sub(rent_from);
    let ext_from = existing.rented_until;
    let ext_until = existing.rented_until.saturating_add(seconds);
    // The existing booking itself never matches: ext_from == its rented_until.
    if states.iter().any(|s| s.overlaps_range(ext_from, ext_until)) {
        return Some(ConflictReason::ExtensionBlocked);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adr(last: u8) -> Address {
        let mut raw = [0u8; 20];
        raw[19] = last;
        Address(raw)
    }

    fn booked(controller: Address, from: u64, until: u64) -> BookingInterval {
        BookingInterval::new(controller, from, until)
    }

    #[test]
    fn touching_intervals_do_not_conflict() {
        let states = [booked(adr(2), 100, 200)];
        assert_eq!(find_conflict(&states, adr(1), 200, 300), None);
        assert_eq!(find_conflict(&states, adr(1), 0, 100), None);
    }

    #[test]
    fn one_second_overlap_conflicts() {
        let states = [booked(adr(2), 100, 200)];
        assert_eq!(
            find_conflict(&states, adr(1), 199, 300),
            Some(ConflictReason::AlreadyRented)
        );
        assert_eq!(
            find_conflict(&states, adr(1), 0, 101),
            Some(ConflictReason::AlreadyRented)
        );
    }

    #[test]
    fn own_booking_extends_into_free_time() {
        let states = [booked(adr(1), 100, 200)];
        assert_eq!(find_conflict(&states, adr(1), 150, 250), None);
    }

    #[test]
    fn extension_into_foreign_booking_is_blocked() {
        // Extending [100,200) by 100s lands in [200,300), which adr(2) holds.
        let states = [booked(adr(1), 100, 200), booked(adr(2), 250, 400)];
        assert_eq!(
            find_conflict(&states, adr(1), 150, 250),
            Some(ConflictReason::ExtensionBlocked)
        );
    }

    #[test]
    fn extension_up_to_the_next_booking_is_allowed() {
        // Extension window [200,300) touches [300,400) exactly.
        let states = [booked(adr(1), 100, 200), booked(adr(2), 300, 400)];
        assert_eq!(find_conflict(&states, adr(1), 150, 250), None);
    }

    #[test]
    fn empty_list_never_conflicts() {
        assert_eq!(find_conflict(&[], adr(1), 0, u64::MAX), None);
    }

    #[test]
    fn empty_request_interval_never_conflicts() {
        // A zero-length request is not a booking; it must not reach the
        // extension scan even when the point sits inside an own interval.
        let states = [booked(adr(1), 100, 200), booked(adr(2), 200, 300)];
        assert_eq!(find_conflict(&states, adr(1), 150, 150), None);
        assert_eq!(find_conflict(&states, adr(3), 250, 250), None);
    }
}
