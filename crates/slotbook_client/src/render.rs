//! Plain-text rendering of the slot and booking lists.

use slotbook_booking::logic::{format_birth_date, SlotView};
use slotbook_common::models::Booking;
use std::fmt::Write;

pub const EMPTY_BOOKINGS: &str = "No bookings yet.";

/// Header with the available count, then one line per slot.
pub fn render_slots(views: &[SlotView], available: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Choose a time ({} available)", available);
    for (index, view) in views.iter().enumerate() {
        let status = if view.booked { "Booked" } else { "Available" };
        let _ = write!(out, "  {}  {:<9}", view.slot, status);
        if (index + 1) % 4 == 0 || index + 1 == views.len() {
            out.push('\n');
        } else {
            out.push_str(" |");
        }
    }
    out
}

/// Count followed by one entry per booking, or the empty-state line.
pub fn render_bookings(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return format!("{}\n", EMPTY_BOOKINGS);
    }
    let mut out = String::new();
    let _ = writeln!(out, "Bookings ({})", bookings.len());
    for booking in bookings {
        let _ = writeln!(
            out,
            "  {}  {}  born {}  reg. {}  phone {}",
            booking.slot_label(),
            booking.name,
            format_birth_date(&booking.birth_date),
            booking.registration,
            booking.phone,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn view(slot: &str, booked: bool) -> SlotView {
        SlotView {
            slot: slot.to_string(),
            booked,
        }
    }

    #[test]
    fn slots_show_count_and_status() {
        let text = render_slots(&[view("10:00", true), view("10:04", false)], 1);
        assert!(text.starts_with("Choose a time (1 available)\n"));
        assert!(text.contains("10:00  Booked"));
        assert!(text.contains("10:04  Available"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn empty_booking_list() {
        assert_eq!(render_bookings(&[]), "No bookings yet.\n");
    }

    #[test]
    fn booking_entries_use_display_formats() {
        let booking = Booking {
            id: "b1".to_string(),
            name: "Maria Silva".to_string(),
            birth_date: "1990-02-01".to_string(),
            registration: "5123".to_string(),
            phone: "62999998888".to_string(),
            slot: "10:04:00".to_string(),
            created_at: Utc::now(),
        };
        let text = render_bookings(&[booking]);
        assert!(text.starts_with("Bookings (1)\n"));
        assert!(text.contains("10:04  Maria Silva  born 01/02/1990  reg. 5123  phone 62999998888"));
    }
}
