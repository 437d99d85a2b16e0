// --- File: crates/slotbook_client/src/bin/slotbook.rs ---
use chrono_tz::Tz;
use clap::Parser;
use slotbook_booking::logic::{MSG_CLEARED, MSG_EXPORTED};
use slotbook_booking::{
    AdminAction, AdminCredentials, AdminGate, AdminOutcome, PageController, SlotCatalog,
};
use slotbook_client::app::{self, Terminal};
use slotbook_client::cli::{Cli, Cmd};
use slotbook_client::{ClientError, RemoteBookingStore};
use slotbook_config::{load_config, AppConfig};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{stdin, stdout, BufReader, Stdin, Stdout};
use tracing::{error, Level};

type Console = Terminal<BufReader<Stdin>, Stdout>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    slotbook_common::init_with_level(if cli.verbose { Level::DEBUG } else { Level::WARN });

    let mut config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Could not load configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Some(base_url) = cli.base_url.clone() {
        config.client.base_url = base_url;
    }

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "slotbook command failed");
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn controller(config: &AppConfig, store: RemoteBookingStore) -> Result<PageController, ClientError> {
    let catalog = SlotCatalog::from_config(&config.campaign)
        .map_err(|e| ClientError::Config(e.to_string()))?;
    let time_zone: Tz = config.campaign.time_zone.parse().map_err(|_| {
        ClientError::Config(format!(
            "Unknown campaign time zone {:?}",
            config.campaign.time_zone
        ))
    })?;
    Ok(PageController::new(
        Arc::new(store),
        catalog,
        AdminGate::from_config(&config.admin),
        time_zone,
    ))
}

async fn run(cli: Cli, config: &AppConfig) -> Result<(), ClientError> {
    let store = RemoteBookingStore::from_config(&config.client)?;
    let mut term: Console = Terminal::new(BufReader::new(stdin()), stdout());

    match cli.cmd {
        Cmd::Book => {
            let mut page = controller(config, store)?;
            app::book(&mut page, &mut term).await?;
        }
        Cmd::Slots => {
            let mut page = controller(config, store)?;
            app::show_slots(&mut page, &mut term).await?;
        }
        Cmd::List => {
            let mut page = controller(config, store)?;
            app::show_bookings(&mut page, &mut term).await?;
        }
        Cmd::Watch => {
            let changes = store.changes().await?;
            let mut page = controller(config, store)?;
            app::watch(&mut page, &mut term, changes).await?;
        }
        Cmd::Export { out, admin } => {
            let store = admin_store(store, admin.credentials(), config);
            let mut page = controller(config, store)?;
            if let Some(AdminOutcome::Exported(file)) =
                app::admin(&mut page, &mut term, AdminAction::Export, admin.credentials()).await?
            {
                let path = write_export(&out, &file.file_name, &file.bytes).await?;
                term.say(&format!("{} {}\n", MSG_EXPORTED, path)).await?;
            }
        }
        Cmd::Clear { admin } => {
            let store = admin_store(store, admin.credentials(), config);
            let mut page = controller(config, store)?;
            if let Some(AdminOutcome::Cleared { removed }) =
                app::admin(&mut page, &mut term, AdminAction::Clear, admin.credentials()).await?
            {
                term.say(&format!("{} ({} removed)\n", MSG_CLEARED, removed))
                    .await?;
            }
        }
    }
    Ok(())
}

/// Admin requests carry the given credentials, else the configured pair.
fn admin_store(
    store: RemoteBookingStore,
    given: Option<AdminCredentials>,
    config: &AppConfig,
) -> RemoteBookingStore {
    store.with_admin(given.unwrap_or_else(|| {
        AdminCredentials::new(config.admin.username.as_str(), config.admin.password.as_str())
    }))
}

async fn write_export(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<String, ClientError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path.display().to_string())
}
