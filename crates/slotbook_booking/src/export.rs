// --- File: crates/slotbook_booking/src/export.rs ---
//! Spreadsheet export of the current bookings.

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use slotbook_common::error::SlotbookError;
use slotbook_common::models::Booking;
use thiserror::Error;

use crate::logic::MSG_NOTHING_TO_EXPORT;

pub const SHEET_NAME: &str = "Agendamentos";
pub const HEADERS: [&str; 6] = [
    "Nome",
    "Data de Nascimento",
    "Matrícula",
    "Telefone",
    "Horário",
    "Data do Agendamento",
];
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const CREATED_AT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("There are no bookings to export")]
    Empty,
    #[error("Failed to build workbook: {0}")]
    Workbook(#[from] XlsxError),
}

impl From<ExportError> for SlotbookError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Empty => SlotbookError::NotFoundError(MSG_NOTHING_TO_EXPORT.to_string()),
            ExportError::Workbook(e) => SlotbookError::InternalError(e.to_string()),
        }
    }
}

/// A finished workbook ready to be written or sent.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// `agendamentos-doacao-sangue-YYYY-MM-DD.xlsx`
pub fn export_file_name(today: NaiveDate) -> String {
    format!("agendamentos-doacao-sangue-{}.xlsx", today.format("%Y-%m-%d"))
}

/// One row per booking in the given order. The birth date column holds the stored value.
pub fn export_rows(bookings: &[Booking], time_zone: Tz) -> Vec<[String; 6]> {
    bookings
        .iter()
        .map(|booking| {
            [
                booking.name.clone(),
                booking.birth_date.clone(),
                booking.registration.clone(),
                booking.phone.clone(),
                booking.slot_label().to_string(),
                booking
                    .created_at
                    .with_timezone(&time_zone)
                    .format(CREATED_AT_FORMAT)
                    .to_string(),
            ]
        })
        .collect()
}

/// Builds the workbook: a single sheet with a header row and one row per booking.
pub fn build_export(
    bookings: &[Booking],
    time_zone: Tz,
    today: NaiveDate,
) -> Result<ExportFile, ExportError> {
    if bookings.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, title) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }

    for (index, row) in export_rows(bookings, time_zone).iter().enumerate() {
        let row_number = index as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(row_number, col as u16, value.as_str())?;
        }
    }
    worksheet.autofit();

    let bytes = workbook.save_to_buffer()?;
    Ok(ExportFile {
        file_name: export_file_name(today),
        bytes,
    })
}
