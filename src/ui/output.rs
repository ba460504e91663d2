use crate::storage::{CountryCount, StoreStats};
use crate::ui::{codes_table, stats_table, theme, Icons};
use crate::view::{CountryView, SwiftCodeDetail};
use owo_colors::OwoColorize;

pub fn header(icon: &str, text: &str) {
    println!("{} {}", icon, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn timing(elapsed: &str) {
    println!("{} {}", Icons::CLOCK.style(theme().dim.clone()), elapsed);
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

/// Print one code, with its branch table when it is a headquarters
pub fn detail(view: &SwiftCodeDetail) {
    let details = view.details();
    let code = details.summary.swift_code.as_str();

    match view.branches() {
        Some(_) => header(Icons::BANK, &format!("{} (headquarters)", code.style(theme().headquarters.clone()))),
        None => header(Icons::BRANCH, &format!("{} (branch)", code)),
    }
    summary_row("Bank:", &details.summary.bank_name);
    summary_row("Address:", &details.summary.address);
    summary_row(
        "Country:",
        &format!("{} ({})", details.country_name, details.summary.country_iso2),
    );

    if let Some(branches) = view.branches() {
        section(&format!("Branches ({})", branches.len()));
        if branches.is_empty() {
            summary_row("", "none");
        } else {
            println!("{}", codes_table(branches));
        }
    }
}

/// Print every code of a country
pub fn country(view: &CountryView) {
    header(
        Icons::GLOBE,
        &format!("{} ({}) - {} codes", view.country_name, view.country_iso2, view.swift_codes.len()),
    );
    if view.swift_codes.is_empty() {
        summary_row("", "no SWIFT codes registered");
    } else {
        println!("{}", codes_table(&view.swift_codes));
    }
}

pub fn stats(stats: &StoreStats, countries: &[CountryCount]) {
    header(Icons::STATS, "Registry Statistics");
    println!(
        "{}",
        stats_table(&[
            ("Records", stats.records.to_string()),
            ("Headquarters", stats.headquarters.to_string()),
            ("Branches", stats.branches.to_string()),
            ("Countries", stats.countries.to_string()),
        ])
    );

    if !countries.is_empty() {
        section("Per country");
        for c in countries {
            summary_row(&format!("{} {}", c.country_iso2, c.country_name), &c.count.to_string());
        }
    }
}
