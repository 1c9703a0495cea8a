//! Payload command - the outbound submission document

use crate::cmd::read_scenario;
use crate::core::build_submission;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PayloadCommand {
    /// Scenario file (JSON). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Skip submit-time validation and print the payload regardless
    #[arg(long)]
    force: bool,
}

impl PayloadCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let scenario = read_scenario(&self.file)?;
        let set = scenario.to_set();

        if !self.force {
            set.validate_for_submit()?;
        }

        let payload = build_submission(&set);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        Ok(())
    }
}
