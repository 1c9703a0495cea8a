use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stable handle for an allocation row.
///
/// Handles are handed out by the arena and never reused after removal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Organizational target of a share: company, brand, department,
/// subdepartment. Only the department matters for validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Recipient {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub subdepartment: Option<String>,
}

impl Recipient {
    /// A recipient needs at least a company and a department to appear in
    /// the submission payload.
    pub fn is_complete(&self) -> bool {
        !self.company.is_empty() && !self.department.is_empty()
    }
}

/// Second-level recipient subdividing one row's value across other legal
/// entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReinvoiceDestination {
    #[serde(flatten)]
    pub recipient: Recipient,
    /// Share of the parent row's value, not of the invoice total. No sum
    /// constraint is enforced across a row's destinations.
    #[serde(default)]
    #[schemars(with = "f64")]
    pub percent: Decimal,
}

/// One recipient's share of the effective invoice value.
///
/// `percent` and `value` are stored redundantly (`value` is semantically
/// `effective * percent / 100`) so either can be the field the user edited
/// last; [`RowEdit`](crate::core::RowEdit) names which axis drives the sync.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationRow {
    pub id: RowId,
    pub recipient: Recipient,
    pub percent: Decimal,
    pub value: Decimal,
    pub locked: bool,
    pub comment: Option<String>,
    pub reinvoice_destinations: Vec<ReinvoiceDestination>,
}

impl AllocationRow {
    pub(crate) fn new(id: RowId, recipient: Recipient) -> Self {
        AllocationRow {
            id,
            recipient,
            percent: Decimal::ZERO,
            value: Decimal::ZERO,
            locked: false,
            comment: None,
            reinvoice_destinations: Vec::new(),
        }
    }
}

/// Tagged edit command for a single row.
///
/// The numeric variants name the axis the user edited last, which decides
/// the direction of the percent/value synchronization.
#[derive(Debug, Clone)]
pub enum RowEdit {
    /// Set the share in percent; the monetary value is derived.
    Percent(Decimal),
    /// Set the monetary value; the percent is derived when an effective
    /// value exists.
    Value(Decimal),
    Target(Recipient),
    Locked(bool),
    Comment(Option<String>),
}
