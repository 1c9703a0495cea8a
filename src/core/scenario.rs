use super::row::{Recipient, ReinvoiceDestination, RowEdit, RowId};
use super::set::AllocationSet;
use super::vat::{default_vat_rate, effective_value, find_vat_rate, parse_amount, VatRate};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Input root for an allocation scenario: the invoice context the host
/// form owns, the VAT rate table, and the distribution rows.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioInput {
    pub invoice: InvoiceContext,
    #[serde(default)]
    pub vat_rates: Vec<VatRate>,
    pub rows: Vec<RowInput>,
}

/// Invoice-level scalars consumed (not owned) by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InvoiceContext {
    /// Gross amount exactly as typed; malformed input degrades to 0
    pub gross_value: String,
    pub currency: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Treat the gross amount as VAT-inclusive and extract the net base
    #[serde(default)]
    pub subtract_vat: bool,
    /// Selected entry in the VAT rate table; falls back to the table's
    /// default entry when absent
    #[serde(default)]
    pub vat_rate_id: Option<String>,
}

impl InvoiceContext {
    pub fn gross(&self) -> Decimal {
        parse_amount(&self.gross_value)
    }

    pub fn vat_rate(&self, rates: &[VatRate]) -> Option<Decimal> {
        match &self.vat_rate_id {
            Some(id) => find_vat_rate(rates, id).map(|r| r.rate),
            None => default_vat_rate(rates).map(|r| r.rate),
        }
    }
}

/// One distribution row as written in the scenario file. Values are not
/// part of the input; they are derived from the effective value on load.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RowInput {
    #[serde(flatten)]
    pub recipient: Recipient,
    /// Share of the invoice in percent
    #[serde(default)]
    #[schemars(with = "f64")]
    pub percent: Decimal,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub reinvoice_destinations: Vec<ReinvoiceDestination>,
}

/// Read a scenario from JSON.
pub fn read_scenario_json<R: Read>(reader: R) -> anyhow::Result<ScenarioInput> {
    let input: ScenarioInput = serde_json::from_reader(reader)?;
    Ok(input)
}

impl ScenarioInput {
    /// Net base for all percent/value conversions in this scenario.
    pub fn effective_value(&self) -> Decimal {
        effective_value(
            self.invoice.gross(),
            self.invoice.subtract_vat,
            self.invoice.vat_rate(&self.vat_rates),
        )
    }

    /// Build the live allocation set, deriving every row's value from the
    /// effective invoice value.
    pub fn to_set(&self) -> AllocationSet {
        let effective = self.effective_value();
        let first_company = self
            .rows
            .first()
            .map(|r| r.recipient.company.clone())
            .unwrap_or_default();
        let mut set = AllocationSet::new(first_company);

        let mut ids: Vec<RowId> = set.iter().map(|r| r.id).collect();
        for _ in 1..self.rows.len() {
            ids.push(set.add_row(effective));
        }

        for (input, &id) in self.rows.iter().zip(&ids) {
            set.apply(id, RowEdit::Target(input.recipient.clone()), effective);
            set.apply(id, RowEdit::Locked(input.locked), effective);
            set.apply(id, RowEdit::Comment(input.comment.clone()), effective);
            set.apply(id, RowEdit::Percent(input.percent), effective);
            if let Some(row) = set.row_mut(id) {
                row.reinvoice_destinations = input.reinvoice_destinations.clone();
            }
        }
        set
    }
}
