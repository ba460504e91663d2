use tabled::{settings::Style, Table, Tabled};
use crate::view::SwiftCodeSummary;

#[derive(Tabled)]
pub struct CodeRow {
    #[tabled(rename = "SWIFT code")]
    pub swift_code: String,
    #[tabled(rename = "HQ")]
    pub headquarters: String,
    #[tabled(rename = "Bank")]
    pub bank_name: String,
    #[tabled(rename = "Address")]
    pub address: String,
}

impl From<&SwiftCodeSummary> for CodeRow {
    fn from(summary: &SwiftCodeSummary) -> Self {
        Self {
            swift_code: summary.swift_code.to_string(),
            headquarters: if summary.is_headquarter { "yes" } else { "" }.to_string(),
            bank_name: summary.bank_name.clone(),
            address: summary.address.clone(),
        }
    }
}

/// Render summaries as a rounded table; empty input renders nothing
pub fn codes_table(codes: &[SwiftCodeSummary]) -> String {
    if codes.is_empty() {
        return String::new();
    }
    let rows: Vec<CodeRow> = codes.iter().map(CodeRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub fn stats_table(stats: &[(&str, String)]) -> String {
    let rows: Vec<TableRow> = stats
        .iter()
        .map(|(label, value)| TableRow {
            metric: label.to_string(),
            value: value.clone(),
        })
        .collect();
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}
