pub mod row;
pub mod scenario;
pub mod set;
pub mod submit;
pub mod suggest;
pub mod vat;

// Flat public surface for domain types and functions.
pub use row::{AllocationRow, Recipient, ReinvoiceDestination, RowEdit, RowId};
pub use scenario::{read_scenario_json, InvoiceContext, RowInput, ScenarioInput};
pub use set::{AllocationError, AllocationSet, PERCENT_TOLERANCE};
pub use submit::{build_submission, SubmissionDestination, SubmissionRow};
pub use suggest::{DebounceTimer, DepartmentSuggestion, SuggestionTracker, SUGGESTION_DEBOUNCE};
pub use vat::{default_vat_rate, effective_value, find_vat_rate, parse_amount, VatRate};
