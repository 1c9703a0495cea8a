use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Entry in the VAT rate table provided by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VatRate {
    pub id: String,
    /// Rate in percent (e.g. 19 for 19%)
    #[schemars(with = "f64")]
    pub rate: Decimal,
    #[serde(default)]
    pub is_default: bool,
}

/// Look up a rate by id.
pub fn find_vat_rate<'a>(rates: &'a [VatRate], id: &str) -> Option<&'a VatRate> {
    rates.iter().find(|r| r.id == id)
}

/// The rate preselected by the form when the user has not chosen one.
pub fn default_vat_rate(rates: &[VatRate]) -> Option<&VatRate> {
    rates.iter().find(|r| r.is_default)
}

/// Taxable base used for every percent/value conversion.
///
/// The gross amount is treated as VAT-inclusive: when `subtract_vat` is set
/// and a rate is selected, the net base is extracted as
/// `gross / (1 + rate/100)`. Otherwise gross and net are the same amount.
/// Pure and cheap enough to call on every keystroke.
pub fn effective_value(gross: Decimal, subtract_vat: bool, vat_rate: Option<Decimal>) -> Decimal {
    match vat_rate {
        Some(rate) if subtract_vat => gross / (dec!(1) + rate / dec!(100)),
        _ => gross,
    }
}

/// Lenient parse of a user-typed amount.
///
/// Malformed or negative input degrades to zero so the form never crashes
/// mid-keystroke. Accepts a decimal comma as well as a decimal point.
pub fn parse_amount(input: &str) -> Decimal {
    let trimmed = input.trim();
    let parsed = trimmed
        .parse::<Decimal>()
        .or_else(|_| trimmed.replace(',', ".").parse::<Decimal>());
    match parsed {
        Ok(amount) if amount >= Decimal::ZERO => amount,
        _ => Decimal::ZERO,
    }
}
