use super::row::AllocationRow;
use super::set::AllocationSet;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// One row of the outbound distribution payload.
///
/// The share is converted from percent to a `[0,1]` fraction only here, at
/// the submission boundary; everywhere inside the engine it stays a
/// percentage.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRow {
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdepartment: Option<String>,
    /// Share as a fraction in [0,1]
    pub allocation: Decimal,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub reinvoice_destinations: Vec<SubmissionDestination>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionDestination {
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdepartment: Option<String>,
    pub percent: Decimal,
}

/// Map the live set to the submission payload, in display order.
pub fn build_submission(set: &AllocationSet) -> Vec<SubmissionRow> {
    set.iter().map(submission_row).collect()
}

fn submission_row(row: &AllocationRow) -> SubmissionRow {
    let reinvoice_destinations = row
        .reinvoice_destinations
        .iter()
        .filter(|d| {
            // incomplete destinations are omitted, not rejected
            let keep = d.recipient.is_complete();
            if !keep {
                log::warn!(
                    "dropping incomplete reinvoice destination on row {}: company='{}' department='{}'",
                    row.id,
                    d.recipient.company,
                    d.recipient.department
                );
            }
            keep
        })
        .map(|d| SubmissionDestination {
            company: d.recipient.company.clone(),
            brand: d.recipient.brand.clone(),
            department: d.recipient.department.clone(),
            subdepartment: d.recipient.subdepartment.clone(),
            percent: d.percent,
        })
        .collect();

    SubmissionRow {
        company: row.recipient.company.clone(),
        brand: row.recipient.brand.clone(),
        department: row.recipient.department.clone(),
        subdepartment: row.recipient.subdepartment.clone(),
        allocation: row.percent / dec!(100),
        locked: row.locked,
        comment: row.comment.clone(),
        reinvoice_destinations,
    }
}
