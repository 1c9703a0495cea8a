use clap::{Parser, Subcommand};
use costsplit::cmd::{PayloadCommand, SchemaCommand, ShowCommand, ValidateCommand};

#[derive(Parser, Debug)]
#[command(
    name = "costsplit",
    version,
    about = "Proportional cost allocation for invoice entry"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Display the distribution for a scenario
    Show(ShowCommand),
    /// Check a scenario for submit-time issues
    Validate(ValidateCommand),
    /// Print the submission payload as JSON
    Payload(PayloadCommand),
    /// Print the JSON Schema for scenario input
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Show(cmd) => cmd.exec(),
        Command::Validate(cmd) => cmd.exec(),
        Command::Payload(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
