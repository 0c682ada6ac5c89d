//! Budgie Fit CLI
//!
//! Command-line front end for the weight log:
//! - Dashboard, history and chart views
//! - Add/edit/delete pets and weight records
//! - Spreadsheet export
//! - Config generation

use anyhow::{bail, Context};
use budgie_fit::config::{expand_path, generate_default_config, Config, LoggingConfig};
use budgie_fit::export::export_to_dir;
use budgie_fit::storage::{
    format_date_display, format_grams, today, FileStore, PetForm, PetId, RecordForm, RecordId,
    Store,
};
use budgie_fit::views::{
    build_chart_series, format_delta, history_table, pet_cards, value_domain, HistoryRow,
    PetFilter, RangeStatus, ReferenceRange, Trend, ViewMode, ViewState,
};
use chrono::Duration;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "budgie-fit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Weight log for pet birds")]
#[command(long_about = "Budgie Fit keeps a weight log for your birds.\nRecord weigh-ins, review trends and export everything to a spreadsheet.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/budgie-fit/config.toml or ./budgie-fit.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartStyle {
    Table,
    Bars,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Latest weight and change for every pet
    Dashboard,

    /// Weight records, newest first
    History {
        /// Only this pet (id or name)
        #[arg(short, long)]
        pet: Option<String>,
    },

    /// Weights of all pets aligned by date
    Chart {
        #[arg(short, long, value_enum, default_value_t = ChartStyle::Table)]
        style: ChartStyle,
    },

    /// Manage pets
    Pet {
        #[command(subcommand)]
        action: PetCommand,
    },

    /// Manage weight records
    Log {
        #[command(subcommand)]
        action: LogCommand,
    },

    /// Export everything to an .xlsx spreadsheet
    Export {
        /// Output directory (default: from config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum PetCommand {
    /// List pets
    List,

    /// Add a pet
    Add {
        name: String,
        /// Species (default: Budgerigar)
        #[arg(short, long, default_value = "")]
        species: String,
    },

    /// Rename a pet or change its species
    Edit {
        /// Pet id or name
        pet: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        species: Option<String>,
    },

    /// Delete a pet and all of its weight records
    Delete {
        /// Pet id or name
        pet: String,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum LogCommand {
    /// Record a weight
    Add {
        /// Pet id or name
        pet: String,
        /// Weight in grams
        weight: String,
        /// Date: YYYY-MM-DD, "today" or "yesterday" (default: today)
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Change a weight record
    Edit {
        /// Record id
        id: String,
        #[arg(short, long)]
        weight: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a weight record
    Delete {
        /// Record id
        id: String,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.to_string_lossy().to_string();
    }

    init_logging(&config.logging)?;
    tracing::debug!(data_dir = %config.storage.data_dir, "Budgie Fit v{}", env!("CARGO_PKG_VERSION"));

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &content)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut store = Store::load(FileStore::new(expand_path(&config.storage.data_dir)));
    let reference = config.chart.reference_range();

    match cli.command {
        Commands::Dashboard => print_dashboard(&store, &reference, cli.format)?,

        Commands::History { pet } => {
            let filter = match pet {
                Some(query) => PetFilter::Pet(resolve_pet(&store, &query)?),
                None => PetFilter::All,
            };
            let view = ViewState::new(ViewMode::History).with_filter(filter);
            print_history(&store, &view, cli.format)?;
        }

        Commands::Chart { style } => print_chart(&store, &reference, style, cli.format)?,

        Commands::Pet { action } => match action {
            PetCommand::List => print_pets(&store, cli.format)?,

            PetCommand::Add { name, species } => {
                let pet = store.add_pet(&PetForm::new(name, species))?;
                println!("Added {} ({}) [{}]", pet.name, pet.species, pet.id);
            }

            PetCommand::Edit { pet, name, species } => {
                let id = resolve_pet(&store, &pet)?;
                let current = store.pet(&id).context("pet disappeared")?;
                let form = PetForm::new(
                    name.unwrap_or_else(|| current.name.clone()),
                    species.unwrap_or_else(|| current.species.clone()),
                );
                let pet = store.update_pet(&id, &form)?;
                println!("Updated {} ({})", pet.name, pet.species);
            }

            PetCommand::Delete { pet, yes } => {
                let id = resolve_pet(&store, &pet)?;
                if !yes {
                    let count = store.records().iter().filter(|r| r.pet_id == id).count();
                    bail!(
                        "Deleting {} also deletes its {} weight records and cannot be undone; re-run with --yes",
                        store.pet_name_or_unknown(&id),
                        count
                    );
                }
                let deleted = store.delete_pet(&id)?;
                println!(
                    "Deleted {} and {} weight records",
                    deleted.pet.name, deleted.removed_records
                );
            }
        },

        Commands::Log { action } => match action {
            LogCommand::Add {
                pet,
                weight,
                date,
                notes,
            } => {
                let pet_id = resolve_pet(&store, &pet)?;
                let date = resolve_date(date.as_deref().unwrap_or("today"));
                let form = RecordForm::new(pet_id.as_str(), weight, date, notes);
                let record = store.add_weight_record(&form)?;
                println!(
                    "Logged {} for {} on {} [{}]",
                    format_grams(record.weight),
                    pet,
                    record.date,
                    record.id
                );
            }

            LogCommand::Edit {
                id,
                weight,
                date,
                notes,
            } => {
                let id = RecordId::from(id);
                let current = store
                    .record(&id)
                    .with_context(|| format!("Weight record not found: {}", id))?;
                let form = RecordForm::new(
                    current.pet_id.as_str(),
                    weight.unwrap_or_else(|| current.weight.to_string()),
                    date.map(|d| resolve_date(&d))
                        .unwrap_or_else(|| current.date.to_string()),
                    notes.unwrap_or_else(|| current.notes.clone().unwrap_or_default()),
                );
                let record = store.update_weight_record(&id, &form)?;
                println!("Updated {}: {} on {}", record.id, format_grams(record.weight), record.date);
            }

            LogCommand::Delete { id, yes } => {
                let id = RecordId::from(id);
                if !yes {
                    bail!("Deleting a weight record cannot be undone; re-run with --yes");
                }
                let record = store.delete_weight_record(&id)?;
                println!("Deleted {} from {}", format_grams(record.weight), record.date);
            }
        },

        Commands::Export { output_dir } => {
            let dir = output_dir.unwrap_or_else(|| expand_path(&config.export.output_dir));
            let path = export_to_dir(
                store.pets(),
                store.records(),
                &dir,
                &config.export.filename_prefix,
                today(),
            )?;
            println!("Exported to {}", path.display());
        }

        // Written before the store is opened
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("budgie_fit={}", config.level)));

    let writer = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(expand_path(path))
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let ansi = config.file.is_none();

    let (json_layer, text_layer) = if config.format.eq_ignore_ascii_case("json") {
        (
            Some(tracing_subscriber::fmt::layer().json().with_writer(writer)),
            None,
        )
    } else {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(ansi),
            ),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
    Ok(())
}

fn resolve_pet(store: &Store<FileStore>, query: &str) -> anyhow::Result<PetId> {
    match store.find_pet(query) {
        Some(pet) => Ok(pet.id.clone()),
        None => bail!("No pet matches {:?} (use `budgie-fit pet list`)", query),
    }
}

/// Accept `today`, `yesterday` or pass the text through for validation
fn resolve_date(input: &str) -> String {
    match input.trim().to_lowercase().as_str() {
        "today" => today().to_string(),
        "yesterday" => (today() - Duration::days(1)).to_string(),
        _ => input.to_string(),
    }
}

fn trend_marker(trend: Option<Trend>) -> &'static str {
    match trend {
        Some(Trend::Gain) => "▲",
        Some(Trend::Loss) => "▼",
        Some(Trend::Steady) => "=",
        None => " ",
    }
}

fn range_label(status: Option<RangeStatus>) -> &'static str {
    match status {
        Some(RangeStatus::Below) => "below",
        Some(RangeStatus::Within) => "ok",
        Some(RangeStatus::Above) => "above",
        None => "-",
    }
}

fn csv_writer() -> csv::Writer<std::io::Stdout> {
    csv::Writer::from_writer(std::io::stdout())
}

fn print_dashboard(
    store: &Store<FileStore>,
    reference: &ReferenceRange,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let cards = pet_cards(store.pets(), store.records(), reference);

    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = cards
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.pet.id,
                        "name": c.pet.name,
                        "species": c.pet.species,
                        "color": c.pet.color,
                        "latestWeight": c.summary.latest.map(|r| r.weight),
                        "latestDate": c.summary.latest.map(|r| r.date),
                        "delta": c.summary.delta,
                        "records": c.record_count,
                        "range": range_label(c.range_status),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Csv => {
            let mut wtr = csv_writer();
            wtr.write_record(["name", "species", "latest_weight", "latest_date", "delta", "records"])?;
            for c in &cards {
                wtr.write_record([
                    c.pet.name.clone(),
                    c.pet.species.clone(),
                    c.summary.latest.map(|r| r.weight.to_string()).unwrap_or_default(),
                    c.summary.latest.map(|r| r.date.to_string()).unwrap_or_default(),
                    c.summary.delta.map(|d| format!("{:.1}", d)).unwrap_or_default(),
                    c.record_count.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table => {
            if cards.is_empty() {
                println!("No birds yet.");
                println!();
                println!("Add your first one with:");
                println!("  budgie-fit pet add Pippi");
                return Ok(());
            }

            println!(
                "{:<16} {:<14} {:>8} {:<12} {:>9} {:>7}  {}",
                "Name", "Species", "Latest", "Date", "Change", "Records", "Range"
            );
            println!("{}", "-".repeat(82));
            for c in &cards {
                let latest = c.summary.latest;
                println!(
                    "{:<16} {:<14} {:>8} {:<12} {:>7} {} {:>7}  {}",
                    c.pet.name,
                    c.pet.species,
                    latest.map(|r| format_grams(r.weight)).unwrap_or_else(|| "--".to_string()),
                    latest.map(|r| format_date_display(r.date)).unwrap_or_default(),
                    c.summary.delta.map(format_delta).unwrap_or_default(),
                    trend_marker(c.summary.trend()),
                    c.record_count,
                    range_label(c.range_status),
                );
            }
            println!();
            println!(
                "Reference range: {}-{}",
                format_grams(reference.min),
                format_grams(reference.max)
            );
        }
    }

    Ok(())
}

fn print_history(
    store: &Store<FileStore>,
    view: &ViewState,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rows = history_table(store.pets(), store.records(), &view.filter);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&history_json(&rows)?)?);
        }
        OutputFormat::Csv => {
            let mut wtr = csv_writer();
            wtr.write_record(["date", "pet", "weight", "notes", "id"])?;
            for row in &rows {
                wtr.write_record([
                    row.record.date.to_string(),
                    row.pet_name.to_string(),
                    row.record.weight.to_string(),
                    row.record.notes.clone().unwrap_or_default(),
                    row.record.id.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No records");
                return Ok(());
            }

            println!(
                "{:<12} {:<16} {:>8}  {:<30} {}",
                "Date", "Pet", "Weight", "Notes", "ID"
            );
            println!("{}", "-".repeat(80));
            for row in &rows {
                println!(
                    "{:<12} {:<16} {:>8}  {:<30} {}",
                    row.record.date,
                    row.pet_name,
                    format_grams(row.record.weight),
                    truncate(row.record.notes.as_deref().unwrap_or("-"), 30),
                    row.record.id
                );
            }
        }
    }

    Ok(())
}

/// History rows as JSON records with the pet's name attached
fn history_json(rows: &[HistoryRow]) -> anyhow::Result<Vec<serde_json::Value>> {
    rows.iter()
        .map(|row| {
            let mut value = serde_json::to_value(row.record)?;
            value["petName"] = serde_json::Value::from(row.pet_name);
            Ok(value)
        })
        .collect()
}

fn print_chart(
    store: &Store<FileStore>,
    reference: &ReferenceRange,
    style: ChartStyle,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let pets = store.pets();
    let rows = build_chart_series(pets, store.records());
    let domain = value_domain(&rows);

    match format {
        OutputFormat::Json => {
            let legend: Vec<serde_json::Value> = pets
                .iter()
                .map(|p| serde_json::json!({"id": p.id, "name": p.name, "color": p.color}))
                .collect();
            let body = serde_json::json!({
                "pets": legend,
                "rows": rows,
                "domain": domain.map(|(lo, hi)| [lo, hi]),
                "reference": {"min": reference.min, "max": reference.max},
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Csv => {
            let mut wtr = csv_writer();
            let mut header = vec!["date".to_string()];
            header.extend(pets.iter().map(|p| p.name.clone()));
            wtr.write_record(&header)?;
            for row in &rows {
                let mut record = vec![row.date.to_string()];
                record.extend(
                    pets.iter()
                        .map(|p| row.value(&p.id).map(|w| w.to_string()).unwrap_or_default()),
                );
                wtr.write_record(&record)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No data to chart");
                return Ok(());
            }

            match style {
                ChartStyle::Table => {
                    print!("{:<12}", "Date");
                    for pet in pets {
                        print!(" | {:<10}", truncate(&pet.name, 10));
                    }
                    println!();
                    println!("{}", "-".repeat(12 + pets.len() * 13));

                    for row in &rows {
                        print!("{:<12}", row.date.to_string());
                        for pet in pets {
                            let cell = row
                                .value(&pet.id)
                                .map(format_grams)
                                .unwrap_or_else(|| "-".to_string());
                            print!(" | {:<10}", cell);
                        }
                        println!();
                    }
                }
                ChartStyle::Bars => {
                    let (lo, hi) = domain.unwrap_or((reference.min, reference.max));
                    const WIDTH: f64 = 40.0;
                    for row in &rows {
                        for pet in pets {
                            if let Some(weight) = row.value(&pet.id) {
                                let len = (((weight - lo) / (hi - lo)) * WIDTH).round().max(1.0);
                                let flag = match reference.classify(weight) {
                                    RangeStatus::Within => "",
                                    _ => " !",
                                };
                                println!(
                                    "{:<12} {:<10} {} {}{}",
                                    row.date.to_string(),
                                    truncate(&pet.name, 10),
                                    "█".repeat(len as usize),
                                    format_grams(weight),
                                    flag
                                );
                            }
                        }
                    }
                }
            }

            println!();
            println!(
                "Reference range: {}-{} (! = outside)",
                format_grams(reference.min),
                format_grams(reference.max)
            );
        }
    }

    Ok(())
}

fn print_pets(store: &Store<FileStore>, format: OutputFormat) -> anyhow::Result<()> {
    let pets = store.pets();
    let count = |id: &PetId| store.records().iter().filter(|r| &r.pet_id == id).count();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(pets)?),
        OutputFormat::Csv => {
            let mut wtr = csv_writer();
            wtr.write_record(["id", "name", "species", "color", "records"])?;
            for pet in pets {
                wtr.write_record([
                    pet.id.to_string(),
                    pet.name.clone(),
                    pet.species.clone(),
                    pet.color.clone(),
                    count(&pet.id).to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table => {
            if pets.is_empty() {
                println!("No birds yet.");
                return Ok(());
            }
            println!(
                "{:<16} {:<14} {:<8} {:>7}  {}",
                "Name", "Species", "Color", "Records", "ID"
            );
            println!("{}", "-".repeat(70));
            for pet in pets {
                println!(
                    "{:<16} {:<14} {:<8} {:>7}  {}",
                    pet.name,
                    pet.species,
                    pet.color,
                    count(&pet.id),
                    pet.id
                );
            }
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
