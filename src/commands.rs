use crate::{OutputMode, emit_success};
use std::path::Path;
use std::time::Instant;
use swift_registry::config::{self, RegistryConfig};
use swift_registry::ui::{self, Icons, SeedProgress, Spinner};
use swift_registry::{loader, CountryCode, NewSwiftRecord, Registry, SqliteStore, SwiftCode};
use owo_colors::OwoColorize;

fn open_registry(database: &Path) -> anyhow::Result<Registry<SqliteStore>> {
    config::ensure_db_dir(database)?;
    Ok(Registry::new(SqliteStore::open(database)?))
}

fn human(output_mode: OutputMode) -> bool {
    output_mode.is_human() && !swift_registry::output::is_quiet()
}

pub fn run_version(output_mode: OutputMode) -> anyhow::Result<()> {
    if human(output_mode) {
        println!(
            "{} {}",
            "swift-registry".bold().style(ui::theme().info.clone()),
            format!("Version {}", env!("CARGO_PKG_VERSION")).bold()
        );
    } else {
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        });
        emit_success(output_mode, "version", data)?;
    }
    Ok(())
}

pub fn run_show(output_mode: OutputMode, database: &Path, code: &str) -> anyhow::Result<()> {
    let code = SwiftCode::parse(code)?;
    let registry = open_registry(database)?;
    let detail = registry.find_one(&code)?;

    if human(output_mode) {
        ui::detail(&detail);
    } else {
        emit_success(output_mode, "show", serde_json::to_value(&detail)?)?;
    }
    Ok(())
}

pub fn run_country(output_mode: OutputMode, database: &Path, iso2: &str) -> anyhow::Result<()> {
    let country = CountryCode::parse(iso2)?;
    let registry = open_registry(database)?;
    let view = registry.find_by_country(&country)?;

    if human(output_mode) {
        ui::country(&view);
    } else {
        emit_success(output_mode, "country", serde_json::to_value(&view)?)?;
    }
    Ok(())
}

pub fn run_add(output_mode: OutputMode, database: &Path, candidate: &NewSwiftRecord) -> anyhow::Result<()> {
    let registry = open_registry(database)?;
    let record = match registry.create(candidate) {
        Ok(record) => record,
        Err(swift_registry::Error::Validation(errors)) => {
            anyhow::bail!("validation failed: {}", errors);
        }
        Err(e) => return Err(e.into()),
    };

    if human(output_mode) {
        println!("{} Added {}", Icons::NEW, record.swift_code.bold());
    } else {
        emit_success(output_mode, "add", serde_json::to_value(&record)?)?;
    }
    Ok(())
}

pub fn run_remove(output_mode: OutputMode, database: &Path, code: &str) -> anyhow::Result<()> {
    let code = SwiftCode::parse(code)?;
    let registry = open_registry(database)?;
    registry.remove(&code)?;

    if human(output_mode) {
        println!("{} Deleted {}", Icons::DEL, code.bold());
    } else {
        emit_success(output_mode, "remove", serde_json::json!({ "swiftCode": code }))?;
    }
    Ok(())
}

pub fn run_seed(output_mode: OutputMode, database: &Path, csv: &Path) -> anyhow::Result<()> {
    config::ensure_db_dir(database)?;
    let store = SqliteStore::open(database)?;

    if human(output_mode) {
        ui::header(Icons::DATABASE, &format!("Seeding {} from {}", database.display(), csv.display()));
    }

    let started = Instant::now();
    let progress = SeedProgress::new();
    let report = loader::load_file(&store, csv, |written, total| progress.update(written, total))?;
    progress.finish();

    if human(output_mode) {
        if report.loaded == 0 {
            ui::warn("No valid rows found; registry left unchanged");
        } else {
            ui::success(&format!("Loaded {} SWIFT codes", report.loaded));
        }
        ui::summary_row("Rows read:", &report.parsed.to_string());
        ui::summary_row("Rows skipped:", &report.skipped.to_string());
        ui::timing(&format!("{:.2?}", started.elapsed()));
    } else {
        emit_success(output_mode, "seed", serde_json::to_value(&report)?)?;
    }
    Ok(())
}

pub fn run_stats(output_mode: OutputMode, database: &Path) -> anyhow::Result<()> {
    let store = SqliteStore::open(database)?;
    let spinner = Spinner::new("Reading registry...");
    let stats = store.stats()?;
    spinner.set_message("Counting per country...");
    let countries = store.count_by_country()?;
    spinner.finish_and_clear();

    if human(output_mode) {
        ui::info("Database", &database.display().to_string());
        ui::stats(&stats, &countries);
    } else {
        let data = serde_json::json!({
            "stats": stats,
            "countries": countries,
        });
        emit_success(output_mode, "stats", data)?;
    }
    Ok(())
}

pub fn run_init(output_mode: OutputMode, path: &Path, new_config: &RegistryConfig, force: bool) -> anyhow::Result<()> {
    config::write_config(path, new_config, force)?;
    if let Some(database) = &new_config.database {
        config::ensure_db_dir(Path::new(database))?;
    }

    if human(output_mode) {
        ui::success(&format!("Wrote {}", path.display()));
    } else {
        emit_success(output_mode, "init", serde_json::json!({ "config": path.display().to_string() }))?;
    }
    Ok(())
}
