use clap::Parser;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use zoo_tracker::app::export::{history_to_csv, history_to_table};
use zoo_tracker::config::cli::{AnimalCommand, Command, OutputFormat, QrCommand};
use zoo_tracker::domain::ports::{AnimalRegistry, EnclosureDirectory, HistoryLedger};
use zoo_tracker::utils::error::ErrorCategory;
use zoo_tracker::utils::logger;
use zoo_tracker::{
    dispatch, Cli, NewAnimal, QrOutcome, QrPayload, Result, SessionContext, ZooApp, ZooConfig,
    ZooError,
};

fn load_config(cli: &Cli) -> Result<ZooConfig> {
    match &cli.config {
        Some(path) => ZooConfig::from_file(path),
        None => ZooConfig::from_env(),
    }
}

fn exit_code(err: &ZooError) -> i32 {
    match err.category() {
        ErrorCategory::Validation => 2,
        ErrorCategory::NotFound => 3,
        ErrorCategory::PartialFailure => 4,
        ErrorCategory::Configuration => 5,
        ErrorCategory::Backend | ErrorCategory::Network | ErrorCategory::Internal => 1,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 設定檔先載入，日誌等級可能來自設定
    let config = if cli.needs_backend() {
        Some(load_config(&cli))
    } else {
        None
    };
    let level = config
        .as_ref()
        .and_then(|c| c.as_ref().ok())
        .and_then(|c| c.log_level())
        .map(str::to_string);

    if cli.json_logs {
        logger::init_json_logger(level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, level.as_deref());
    }

    tracing::debug!("CLI args: {:?}", cli.command);

    let result = match config {
        Some(Ok(config)) => match ZooApp::from_config(&config) {
            Ok(app) => run(&cli, Some(&app)).await,
            Err(e) => Err(e),
        },
        Some(Err(e)) => Err(e),
        None => run(&cli, None).await,
    };

    if let Err(e) = result {
        tracing::error!("❌ {} (category: {:?})", e, e.category());
        eprintln!("❌ {}", e.user_message());
        if e.is_partial_failure() {
            eprintln!("⚠️ The animal's enclosure was already changed; its history is incomplete.");
        }
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: &Cli, app: Option<&ZooApp>) -> Result<()> {
    let ctx = cli.session();

    match (&cli.command, app) {
        (Command::Qr(qr), app) => run_qr(qr, app, &ctx).await,
        (_, None) => Err(ZooError::Config {
            message: "backend configuration is required for this command".to_string(),
        }),
        (command, Some(app)) => run_backend_command(command, app, &ctx).await,
    }
}

async fn run_qr(qr: &QrCommand, app: Option<&ZooApp>, ctx: &SessionContext) -> Result<()> {
    match qr {
        QrCommand::Generate { action, data } => {
            let data = match serde_json::from_str::<Value>(data)? {
                Value::Object(map) => map,
                _ => {
                    return Err(ZooError::validation("data", "QR data must be a JSON object"));
                }
            };
            println!("{}", QrPayload::new(action.clone(), data).encode()?);
        }
        QrCommand::Dispatch {
            payload,
            format,
            resolve,
            yes,
        } => {
            if let Ok(decoded) = QrPayload::decode(payload) {
                tracing::debug!(
                    "app payload v{} action={} generated at {}",
                    decoded.version,
                    decoded.action,
                    decoded.timestamp
                );
            }
            let outcome = dispatch(payload, format);
            if outcome.requires_confirmation() && !*yes && !confirm(&outcome.describe())? {
                println!("Skipped");
                return Ok(());
            }
            println!("{}", outcome.describe());
            match (*resolve, app) {
                (true, Some(app)) => resolve_outcome(app, ctx, &outcome).await?,
                (true, None) => tracing::warn!("--resolve needs backend configuration"),
                _ => {}
            }
        }
    }
    Ok(())
}

/// 在 stdin 詢問是否繼續，只有 y/yes 視為同意
fn confirm(prompt: &str) -> Result<bool> {
    print!("{}? [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn resolve_outcome(app: &ZooApp, ctx: &SessionContext, outcome: &QrOutcome) -> Result<()> {
    match outcome {
        QrOutcome::ViewAnimal { animal_id } | QrOutcome::NavigateToAnimal { animal_id } => {
            let animal = app.animals().get_animal(ctx, animal_id).await?;
            println!("{}", serde_json::to_string_pretty(&animal)?);
        }
        _ => tracing::debug!("nothing to resolve for {:?}", outcome),
    }
    Ok(())
}

async fn run_backend_command(
    command: &Command,
    app: &ZooApp,
    ctx: &SessionContext,
) -> Result<()> {
    match command {
        Command::Relocate { animal, to, notes } => {
            let updated = app
                .relocation
                .relocate(ctx, animal, to.as_deref(), notes.as_deref())
                .await?;
            let where_to = updated
                .enclosure
                .as_ref()
                .map(|e| e.name.as_str())
                .or(updated.animal.enclosure_id.as_deref())
                .unwrap_or("-");
            println!("✅ {} is now in {}", updated.animal.name, where_to);
        }
        Command::History {
            limit,
            animal,
            format,
        } => {
            let cap = app.ledger().cap();
            if *limit > cap {
                tracing::warn!("limit {} exceeds cap, showing at most {}", limit, cap);
            }
            let entries = match animal {
                Some(animal_id) => app.ledger().list_for_animal(ctx, animal_id, *limit).await?,
                None => app.ledger().list_recent(ctx, *limit).await?,
            };
            match format {
                OutputFormat::Table => println!("{}", history_to_table(&entries)),
                OutputFormat::Csv => print!("{}", history_to_csv(&entries)?),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
            }
        }
        Command::Animal(AnimalCommand::Show { id }) => {
            let animal = app.animals().get_animal(ctx, id).await?;
            println!("{}", serde_json::to_string_pretty(&animal)?);
        }
        Command::Animal(AnimalCommand::Create {
            id,
            name,
            species,
            enclosure,
            status,
        }) => {
            let mut new_animal = NewAnimal::new(id.clone(), name.clone());
            new_animal.species_id = species.clone();
            new_animal.enclosure_id = enclosure.clone();
            new_animal.status = status.clone();
            let created = app.animals().create_animal(ctx, &new_animal).await?;
            println!("✅ created {} ({})", created.animal.name, created.animal.id);
        }
        Command::Enclosures { area } => {
            for enclosure in app.enclosures.list_enclosures(ctx, area.as_deref()).await? {
                println!("{:<16} {}", enclosure.id, enclosure.name);
            }
        }
        Command::Qr(qr) => run_qr(qr, Some(app), ctx).await?,
    }
    Ok(())
}
