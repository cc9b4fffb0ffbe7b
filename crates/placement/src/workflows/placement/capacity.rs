use super::domain::{Internship, InternshipStatus};

/// Take one slot for an accepted offer. The posting fills and drops out of
/// view once none remain; the count never drops below zero.
pub(crate) fn consume_slot(internship: &mut Internship) {
    internship.remaining_slots = internship.remaining_slots.saturating_sub(1);
    if internship.remaining_slots == 0 {
        internship.status = InternshipStatus::Filled;
        internship.visible = false;
    }
}

/// Give back the slot of an acceptance that was withdrawn. A Filled posting
/// reopens as Approved and visible, and never moves past it.
pub(crate) fn release_slot(internship: &mut Internship) {
    internship.remaining_slots = internship.remaining_slots.saturating_add(1);
    if internship.status == InternshipStatus::Filled {
        internship.status = InternshipStatus::Approved;
        internship.visible = true;
    }
}
