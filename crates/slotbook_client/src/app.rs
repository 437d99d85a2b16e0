//! Terminal front end driving the page controller.

use futures::StreamExt;
use slotbook_booking::logic::{mask_birth_date, BookingForm, MSG_LOAD_FAILED};
use slotbook_booking::{
    AdminAction, AdminCredentials, AdminOutcome, FlowError, PageController, SelectOutcome,
};
use slotbook_common::models::Booking;
use slotbook_common::services::ChangeStream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::render::{render_bookings, render_slots};

const BACK: &str = "back";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Line-oriented terminal: prompts on `output`, reads answers from `input`.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub async fn say(&mut self, text: &str) -> Result<(), ClientError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }

    /// Reads one answer; a closed input is an error.
    pub async fn ask(&mut self, label: &str) -> Result<String, ClientError> {
        self.say(&format!("{}: ", label)).await?;
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Err(ClientError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Like [`Terminal::ask`], an empty answer keeps `current`.
    pub async fn ask_or_keep(&mut self, label: &str, current: &str) -> Result<String, ClientError> {
        let answer = if current.is_empty() {
            self.ask(label).await?
        } else {
            self.ask(&format!("{} [{}]", label, current)).await?
        };
        if answer.is_empty() {
            Ok(current.to_string())
        } else {
            Ok(answer)
        }
    }
}

async fn refresh_or_report<R, W>(
    page: &mut PageController,
    term: &mut Terminal<R, W>,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Err(err) = page.refresh().await {
        warn!(error = %err, "Showing last known bookings");
        term.say(&format!("{}\n", MSG_LOAD_FAILED)).await?;
    }
    Ok(())
}

async fn fill_form<R, W>(
    page: &mut PageController,
    term: &mut Terminal<R, W>,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let draft = page.draft().clone();
        let name = term.ask_or_keep("Full name", &draft.name).await?;
        let typed = term
            .ask_or_keep("Birth date (DD/MM/YYYY)", &draft.birth_date)
            .await?;
        let birth_date = mask_birth_date(&typed);
        let registration = term
            .ask_or_keep("Registration number", &draft.registration)
            .await?;
        let phone = term.ask_or_keep("Phone (digits only)", &draft.phone).await?;

        let form = BookingForm {
            name,
            birth_date,
            registration,
            phone,
        };
        match page.submit_form(form) {
            Ok(()) => return Ok(()),
            Err(errors) => {
                for error in errors {
                    term.say(&format!("  {}: {}\n", error.field, error.message))
                        .await?;
                }
            }
        }
    }
}

/// The two-step booking flow: form, then slot choice, until a slot is booked.
pub async fn book<R, W>(
    page: &mut PageController,
    term: &mut Terminal<R, W>,
) -> Result<Booking, ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    'form: loop {
        fill_form(page, term).await?;

        loop {
            refresh_or_report(page, term).await?;
            let slots = render_slots(&page.slot_views(), page.available_count());
            term.say(&slots).await?;

            let choice = term
                .ask(&format!("Time (HH:MM, '{}' to edit your details)", BACK))
                .await?;
            if choice.trim().eq_ignore_ascii_case(BACK) {
                page.back_to_form();
                continue 'form;
            }

            match page.select_slot(choice.trim()).await {
                Ok(outcome) => {
                    term.say(&format!("{}\n", outcome.message())).await?;
                    if let SelectOutcome::Booked(booking) = outcome {
                        term.say(&format!("Your time: {}\n", booking.slot_label()))
                            .await?;
                        return Ok(booking);
                    }
                }
                Err(
                    err @ (FlowError::UnknownSlot(_)
                    | FlowError::SlotUnavailable(_)
                    | FlowError::Booking(_)),
                ) => {
                    term.say(&format!("{}\n", err)).await?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Prints the slot list once.
pub async fn show_slots<R, W>(
    page: &mut PageController,
    term: &mut Terminal<R, W>,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    page.load().await?;
    term.say(&render_slots(&page.slot_views(), page.available_count()))
        .await
}

/// Prints the booking list once.
pub async fn show_bookings<R, W>(
    page: &mut PageController,
    term: &mut Terminal<R, W>,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    page.load().await?;
    term.say(&render_bookings(page.bookings())).await
}

/// Redraws the booking list on every change until the feed ends.
pub async fn watch<R, W>(
    page: &mut PageController,
    term: &mut Terminal<R, W>,
    mut changes: ChangeStream,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    refresh_or_report(page, term).await?;
    term.say(&format!("{}{}", CLEAR_SCREEN, render_bookings(page.bookings())))
        .await?;

    while let Some(change) = changes.next().await {
        if let Err(err) = page.apply_change(&change).await {
            warn!(error = %err, "Refetch after change failed");
            term.say(&format!("{}\n", MSG_LOAD_FAILED)).await?;
            continue;
        }
        term.say(&format!("{}{}", CLEAR_SCREEN, render_bookings(page.bookings())))
            .await?;
    }
    debug!("Change feed ended");
    Ok(())
}

/// Runs the admin dialog for `action`.
///
/// `preset` credentials are tried first and are not retried when wrong. Otherwise
/// the operator is prompted until the credentials are accepted or an empty
/// username cancels the dialog (`Ok(None)`).
pub async fn admin<R, W>(
    page: &mut PageController,
    term: &mut Terminal<R, W>,
    action: AdminAction,
    preset: Option<AdminCredentials>,
) -> Result<Option<AdminOutcome>, ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    page.request_admin(action);
    if let Some(title) = page.dialog_title() {
        term.say(&format!("{}\n", title)).await?;
    }

    if let Some(credentials) = preset {
        return match page.authenticate(&credentials).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(err) => {
                page.cancel_admin();
                Err(err.into())
            }
        };
    }

    loop {
        let username = term.ask("Username").await?;
        if username.is_empty() {
            page.cancel_admin();
            return Ok(None);
        }
        let password = term.ask("Password").await?;
        match page
            .authenticate(&AdminCredentials::new(username, password))
            .await
        {
            Ok(outcome) => return Ok(Some(outcome)),
            Err(FlowError::InvalidCredentials) => {
                let message = page.dialog_error().unwrap_or_default().to_string();
                term.say(&format!("{}\n", message)).await?;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
