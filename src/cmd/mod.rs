pub mod payload;
pub mod schema;
pub mod show;
pub mod validate;

pub use payload::PayloadCommand;
pub use schema::SchemaCommand;
pub use show::ShowCommand;
pub use validate::ValidateCommand;

use crate::core::{read_scenario_json, ScenarioInput};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read a scenario (JSON) from a file, or stdin with "-"
pub fn read_scenario(path: &Path) -> anyhow::Result<ScenarioInput> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        read_from_file(path)
    }
}

fn read_from_file(path: &Path) -> anyhow::Result<ScenarioInput> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    read_scenario_json(reader)
}

fn read_from_stdin() -> anyhow::Result<ScenarioInput> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    let cursor = io::Cursor::new(buffer);
    read_scenario_json(cursor)
}
