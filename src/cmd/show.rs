//! Show command - the distribution as a table, CSV, or JSON

use crate::cmd::read_scenario;
use crate::core::{AllocationRow, AllocationSet, ScenarioInput};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Scenario file (JSON). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

impl ShowCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let scenario = read_scenario(&self.file)?;
        let set = scenario.to_set();

        if self.csv {
            write_csv(&set, io::stdout())
        } else if self.json {
            self.print_json(&scenario, &set)
        } else {
            self.print_table(&scenario, &set);
            Ok(())
        }
    }

    fn print_table(&self, scenario: &ScenarioInput, set: &AllocationSet) {
        let invoice = &scenario.invoice;
        let date_str = invoice
            .date
            .map_or("no date".to_string(), |d| d.format("%Y-%m-%d").to_string());

        println!();
        println!("DISTRIBUTION ({}, {})", invoice.currency, date_str);
        println!(
            "  Gross: {} | Effective: {} | Allocated: {}%",
            format_amount(invoice.gross()),
            format_amount(scenario.effective_value()),
            format_amount(set.total_percent())
        );
        println!();

        let rows: Vec<DistributionRow> = set.iter().map(DistributionRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn print_json(&self, scenario: &ScenarioInput, set: &AllocationSet) -> anyhow::Result<()> {
        let output = JsonOutput {
            effective_value: format!("{:.2}", scenario.effective_value()),
            total_percent: format!("{:.2}", set.total_percent()),
            rows: set.iter().cloned().collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

#[derive(Debug, Clone, Tabled)]
struct DistributionRow {
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Brand")]
    brand: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Subdept")]
    subdepartment: String,
    #[tabled(rename = "Percent")]
    percent: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Locked")]
    locked: String,
    #[tabled(rename = "Reinv")]
    reinvoice: String,
}

impl From<&AllocationRow> for DistributionRow {
    fn from(row: &AllocationRow) -> Self {
        DistributionRow {
            company: row.recipient.company.clone(),
            brand: row.recipient.brand.clone().unwrap_or_default(),
            department: row.recipient.department.clone(),
            subdepartment: row.recipient.subdepartment.clone().unwrap_or_default(),
            percent: format_amount(row.percent),
            value: format_amount(row.value),
            locked: if row.locked { "yes" } else { "" }.to_string(),
            reinvoice: if row.reinvoice_destinations.is_empty() {
                String::new()
            } else {
                row.reinvoice_destinations.len().to_string()
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonOutput {
    effective_value: String,
    total_percent: String,
    rows: Vec<AllocationRow>,
}

/// CSV record for distribution output
#[derive(Debug, Serialize)]
struct DistributionCsvRecord {
    company: String,
    brand: String,
    department: String,
    subdepartment: String,
    percent: String,
    value: String,
    locked: bool,
    comment: String,
}

fn write_csv<W: Write>(set: &AllocationSet, writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in set.iter() {
        let record = DistributionCsvRecord {
            company: row.recipient.company.clone(),
            brand: row.recipient.brand.clone().unwrap_or_default(),
            department: row.recipient.department.clone(),
            subdepartment: row.recipient.subdepartment.clone().unwrap_or_default(),
            percent: row.percent.round_dp(2).to_string(),
            value: row.value.round_dp(2).to_string(),
            locked: row.locked,
            comment: row.comment.clone().unwrap_or_default(),
        };
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}
