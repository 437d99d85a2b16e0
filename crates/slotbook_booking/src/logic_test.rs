// --- File: crates/slotbook_booking/src/logic_test.rs ---
#[cfg(test)]
mod tests {
    use crate::logic::*;
    use chrono::{NaiveTime, Utc};
    use slotbook_common::models::Booking;
    use slotbook_config::CampaignConfig;
    use std::collections::BTreeSet;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn booking(slot: &str) -> Booking {
        Booking {
            id: format!("id-{}", slot),
            name: "Maria Silva".to_string(),
            birth_date: "1990-02-01".to_string(),
            registration: "12345".to_string(),
            phone: "62999998888".to_string(),
            slot: slot.to_string(),
            created_at: Utc::now(),
        }
    }

    fn valid_form() -> BookingForm {
        BookingForm {
            name: "Maria da Silva".to_string(),
            birth_date: "01/02/1990".to_string(),
            registration: "5123".to_string(),
            phone: "62999998888".to_string(),
        }
    }

    fn fields(errors: &[slotbook_common::error::FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    // --- Slot catalog ---

    #[test]
    fn default_campaign_has_91_slots() {
        let catalog = SlotCatalog::from_config(&CampaignConfig::default()).unwrap();
        let labels: Vec<String> = catalog.slots().iter().map(Slot::label).collect();

        assert_eq!(catalog.len(), 91);
        assert_eq!(labels[0], "10:00");
        assert_eq!(labels[1], "10:04");
        assert_eq!(labels[89], "15:56");
        assert_eq!(labels[90], "16:00");
    }

    #[test]
    fn closing_slot_is_optional() {
        let slots = generate_time_slots(time(10, 0), time(16, 0), 4, false).unwrap();
        assert_eq!(slots.len(), 90);
        assert_eq!(slots.last().unwrap().label(), "15:56");
    }

    #[test]
    fn closing_slot_is_not_duplicated_when_step_lands_on_it() {
        let slots = generate_time_slots(time(10, 0), time(11, 0), 30, true).unwrap();
        let labels: Vec<String> = slots.iter().map(Slot::label).collect();
        assert_eq!(labels, vec!["10:00", "10:30", "11:00"]);
    }

    #[test]
    fn uneven_step_still_appends_closing_time() {
        let slots = generate_time_slots(time(10, 0), time(10, 10), 4, true).unwrap();
        let labels: Vec<String> = slots.iter().map(Slot::label).collect();
        assert_eq!(labels, vec!["10:00", "10:04", "10:08", "10:10"]);
    }

    #[test]
    fn generation_stops_at_midnight() {
        let slots = generate_time_slots(time(23, 0), time(23, 59), 40, false).unwrap();
        let labels: Vec<String> = slots.iter().map(Slot::label).collect();
        assert_eq!(labels, vec!["23:00", "23:40"]);
    }

    #[test]
    fn zero_step_and_empty_day_are_rejected() {
        assert_eq!(
            generate_time_slots(time(10, 0), time(16, 0), 0, true),
            Err(CatalogError::ZeroStep)
        );
        assert!(matches!(
            generate_time_slots(time(16, 0), time(10, 0), 4, true),
            Err(CatalogError::EmptyDay { .. })
        ));
    }

    #[test]
    fn slot_parsing_accepts_seconds_and_rejects_garbage() {
        assert_eq!(Slot::parse("10:04:00").unwrap().label(), "10:04");
        assert_eq!(Slot::parse(" 09:12 ").unwrap().label(), "09:12");
        assert!(Slot::parse("25:00").is_err());
        assert!(Slot::parse("ten").is_err());
    }

    #[test]
    fn resolve_only_accepts_catalog_slots() {
        let catalog = SlotCatalog::from_config(&CampaignConfig::default()).unwrap();
        assert_eq!(catalog.resolve("10:04").unwrap().label(), "10:04");
        assert_eq!(catalog.resolve("10:04:00").unwrap().label(), "10:04");
        assert!(catalog.resolve("10:05").is_none());
        assert!(catalog.resolve("09:56").is_none());
        assert!(catalog.resolve("").is_none());
    }

    #[test]
    fn slot_serializes_as_label() {
        let slot = Slot::parse("10:08").unwrap();
        assert_eq!(serde_json::to_string(&slot).unwrap(), "\"10:08\"");
        let back: Slot = serde_json::from_str("\"10:08:00\"").unwrap();
        assert_eq!(back, slot);
    }

    // --- Availability ---

    #[test]
    fn views_flag_booked_slots_and_count_the_rest() {
        let catalog = SlotCatalog::from_config(&CampaignConfig::default()).unwrap();
        let booked = booked_slots(&[booking("10:00"), booking("10:04:00"), booking("16:00")]);

        let views = slot_views(&catalog, &booked);
        assert_eq!(views.len(), 91);
        assert!(views[0].booked);
        assert!(views[1].booked);
        assert!(!views[2].booked);
        assert!(views[90].booked);
        assert_eq!(available_count(&catalog, &booked), 88);
    }

    #[test]
    fn bookings_outside_the_catalog_do_not_reduce_availability() {
        let catalog = SlotCatalog::from_config(&CampaignConfig::default()).unwrap();
        let booked = booked_slots(&[booking("08:00"), booking("garbage")]);

        assert_eq!(booked.len(), 1);
        assert_eq!(available_count(&catalog, &booked), 91);
    }

    #[test]
    fn empty_booking_list_leaves_everything_available() {
        let catalog = SlotCatalog::from_config(&CampaignConfig::default()).unwrap();
        let booked = BTreeSet::new();
        assert!(slot_views(&catalog, &booked).iter().all(|v| !v.booked));
        assert_eq!(available_count(&catalog, &booked), catalog.len());
    }

    // --- Validation ---

    #[test]
    fn valid_form_passes_and_is_normalized() {
        let mut form = valid_form();
        form.name = "  Maria da Silva  ".to_string();

        let validated = validate_form(&form).unwrap();
        assert_eq!(validated.name, "Maria da Silva");

        let new_booking = validated.to_new_booking(&Slot::parse("10:04").unwrap());
        assert_eq!(new_booking.birth_date, "1990-02-01");
        assert_eq!(new_booking.slot, "10:04");
        assert_eq!(new_booking.phone, "62999998888");
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = validate_form(&BookingForm::default()).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec![FIELD_NAME, FIELD_BIRTH_DATE, FIELD_REGISTRATION, FIELD_PHONE]
        );
    }

    #[test]
    fn name_length_bounds() {
        let mut form = valid_form();
        form.name = "Al".to_string();
        assert_eq!(fields(&validate_form(&form).unwrap_err()), vec![FIELD_NAME]);

        form.name = "Ana".to_string();
        assert!(validate_form(&form).is_ok());

        form.name = "x".repeat(101);
        let errors = validate_form(&form).unwrap_err();
        assert_eq!(errors[0].message, "Name must have at most 100 characters");
    }

    #[test]
    fn birth_date_must_be_a_real_date_in_the_mask_format() {
        let mut form = valid_form();

        form.birth_date = "01/02/199".to_string();
        assert_eq!(
            validate_form(&form).unwrap_err()[0].message,
            "Birth date is required"
        );

        form.birth_date = "1990-02-01".to_string();
        assert_eq!(
            validate_form(&form).unwrap_err()[0].message,
            "Birth date must be in DD/MM/YYYY format"
        );

        form.birth_date = "31/02/1990".to_string();
        assert_eq!(
            validate_form(&form).unwrap_err()[0].message,
            "Birth date is not a valid date"
        );
    }

    #[test]
    fn registration_is_required_and_bounded() {
        let mut form = valid_form();
        form.registration = "   ".to_string();
        assert_eq!(
            validate_form(&form).unwrap_err()[0].message,
            "Registration number is required"
        );

        form.registration = "9".repeat(51);
        assert_eq!(fields(&validate_form(&form).unwrap_err()), vec![FIELD_REGISTRATION]);
    }

    #[test]
    fn phone_rules_report_first_failure_only() {
        let mut form = valid_form();

        form.phone = "123".to_string();
        let errors = validate_form(&form).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Phone must have at least 10 digits");

        form.phone = "1".repeat(16);
        assert_eq!(
            validate_form(&form).unwrap_err()[0].message,
            "Phone must have at most 15 digits"
        );

        form.phone = "(62) 99999-8888".to_string();
        assert_eq!(
            validate_form(&form).unwrap_err()[0].message,
            "Phone must contain only digits"
        );
    }

    // --- Masking and formatting ---

    #[test]
    fn mask_inserts_separators_as_digits_arrive() {
        assert_eq!(mask_birth_date(""), "");
        assert_eq!(mask_birth_date("0"), "0");
        assert_eq!(mask_birth_date("01"), "01/");
        assert_eq!(mask_birth_date("010"), "01/0");
        assert_eq!(mask_birth_date("0102"), "01/02/");
        assert_eq!(mask_birth_date("01021990"), "01/02/1990");
    }

    #[test]
    fn mask_strips_non_digits_and_extra_year_digits() {
        assert_eq!(mask_birth_date("01/02/1990"), "01/02/1990");
        assert_eq!(mask_birth_date("ab01cd02ef19900"), "01/02/1990");
    }

    #[test]
    fn birth_date_formatting() {
        assert_eq!(format_birth_date("1990-02-01"), "01/02/1990");
        assert_eq!(format_birth_date("not a date"), "not a date");
    }

    #[test]
    fn reserve_request_reads_flat_json() {
        let request: ReserveRequest = serde_json::from_str(
            r#"{"name":"Maria","birth_date":"01/02/1990","registration":"1","phone":"62999998888","slot":"10:00"}"#,
        )
        .unwrap();
        assert_eq!(request.form.name, "Maria");
        assert_eq!(request.slot, "10:00");
    }
}
