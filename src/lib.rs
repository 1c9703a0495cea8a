//! Proportional cost allocation for invoice entry.
//!
//! Splits an invoice's effective (net) value across organizational
//! recipients, keeping percent and monetary representations in sync,
//! with locking, equal redistribution on add/remove, and a second level
//! of re-invoicing splits. All amounts are [`rust_decimal::Decimal`].

pub mod cmd;
pub mod core;

pub use crate::core::{
    build_submission, default_vat_rate, effective_value, find_vat_rate, parse_amount,
    read_scenario_json, AllocationError, AllocationRow, AllocationSet, DebounceTimer,
    DepartmentSuggestion, InvoiceContext, Recipient, ReinvoiceDestination, RowEdit, RowId,
    RowInput, ScenarioInput, SubmissionDestination, SubmissionRow, SuggestionTracker, VatRate,
    PERCENT_TOLERANCE, SUGGESTION_DEBOUNCE,
};
