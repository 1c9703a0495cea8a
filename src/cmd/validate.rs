//! Validate command - surface submit-time issues without building the payload

use crate::cmd::read_scenario;
use crate::core::AllocationError;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Scenario file (JSON). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// A validation issue for output
#[derive(Debug, Clone, Serialize)]
struct ValidationIssue {
    #[serde(rename = "type")]
    issue_type: String,
    message: String,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput {
    issue_count: usize,
    issues: Vec<ValidationIssue>,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let scenario = read_scenario(&self.file)?;
        let set = scenario.to_set();

        let issues: Vec<ValidationIssue> = set
            .submit_issues()
            .iter()
            .map(|issue| ValidationIssue {
                issue_type: issue_type_name(issue),
                message: issue.to_string(),
            })
            .collect();

        if self.json {
            self.print_json(&issues)?;
        } else {
            self.print_text(&issues);
        }

        // Exit with code 1 if issues found
        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }

    fn print_text(&self, issues: &[ValidationIssue]) {
        println!();
        println!("VALIDATION RESULTS");
        println!();

        if issues.is_empty() {
            println!("\u{2713} No issues found.");
        } else {
            println!("\u{26A0} {} issue(s) found:", issues.len());
            println!();
            for (i, issue) in issues.iter().enumerate() {
                println!("  {}. [{}] {}", i + 1, issue.issue_type, issue.message);
            }
            println!();
        }
    }

    fn print_json(&self, issues: &[ValidationIssue]) -> anyhow::Result<()> {
        let output = ValidationOutput {
            issue_count: issues.len(),
            issues: issues.to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn issue_type_name(issue: &AllocationError) -> String {
    match issue {
        AllocationError::TotalPercentOutOfRange { .. } => "TotalPercent".to_string(),
        AllocationError::MissingDepartment { .. } => "MissingDepartment".to_string(),
    }
}
