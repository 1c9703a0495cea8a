//! Schema command - print the expected scenario input format

use crate::core::ScenarioInput;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schema = schema_for!(ScenarioInput);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}
