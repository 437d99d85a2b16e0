#[cfg(test)]
mod tests {
    use crate::logic::{
        available_count, generate_time_slots, mask_birth_date, validate_form, BookingForm, Slot,
        SlotCatalog,
    };
    use chrono::NaiveTime;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn minutes_to_time(minutes: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap()
    }

    proptest! {
        // Slots are strictly increasing, start at the opening time and never pass closing
        #[test]
        fn test_slots_are_ordered_and_bounded(
            open in 0u32..(23 * 60),
            length in 1u32..(6 * 60),
            step in 1u32..90,
            include_closing in any::<bool>(),
        ) {
            let close = (open + length).min(24 * 60 - 1);
            prop_assume!(close > open);
            let opens_at = minutes_to_time(open);
            let closes_at = minutes_to_time(close);

            let slots = generate_time_slots(opens_at, closes_at, step, include_closing).unwrap();

            prop_assert!(!slots.is_empty());
            prop_assert_eq!(slots[0].time(), opens_at);
            for pair in slots.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for slot in &slots {
                prop_assert!(slot.time() <= closes_at);
            }
            let has_closing = slots.last().map(|s| s.time()) == Some(closes_at);
            if include_closing {
                prop_assert!(has_closing);
            } else {
                prop_assert!(slots.iter().all(|s| s.time() < closes_at));
            }
        }

        // Booking any subset of the catalog reduces availability by exactly that many
        #[test]
        fn test_available_count_matches_booked_subset(picks in proptest::collection::vec(any::<prop::sample::Index>(), 0..40)) {
            let catalog = SlotCatalog::from_config(&Default::default()).unwrap();
            let booked: BTreeSet<Slot> = picks
                .iter()
                .map(|index| *index.get(catalog.slots()))
                .collect();

            prop_assert_eq!(available_count(&catalog, &booked), catalog.len() - booked.len());
        }

        // The mask output only ever contains digits and at most two slashes
        #[test]
        fn test_mask_output_shape(input in ".{0,30}") {
            let masked = mask_birth_date(&input);
            prop_assert!(masked.chars().all(|c| c.is_ascii_digit() || c == '/'));
            prop_assert!(masked.chars().filter(|c| *c == '/').count() <= 2);
            prop_assert!(masked.len() <= 10);
        }

        // Masking eight digits always yields a string the validator accepts as shaped
        #[test]
        fn test_masked_real_dates_validate(day in 1u32..=28, month in 1u32..=12, year in 1900i32..2010) {
            let typed = format!("{:02}{:02}{:04}", day, month, year);
            let form = BookingForm {
                name: "Maria da Silva".to_string(),
                birth_date: mask_birth_date(&typed),
                registration: "5123".to_string(),
                phone: "62999998888".to_string(),
            };
            prop_assert!(validate_form(&form).is_ok());
        }
    }
}
