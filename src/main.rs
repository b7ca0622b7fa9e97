use clap::{Parser, Subcommand};
use perfhub::config::Config;
use perfhub::output::{OutputFormat, create_writer};
use perfhub::report::ReportDocument;
use perfhub::server;
use perfhub::table::RunTable;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "perfhub")]
#[command(about = "Performance report collection and comparison service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the collection service
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        config: Option<PathBuf>,
    },
    /// Render the run comparison table for a report document
    Inspect {
        /// Path to a report JSON document
        report: PathBuf,
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { config } => {
            let config = match config {
                Some(path) => Config::load(path)?,
                None => Config::default(),
            };
            server::run(config)
        }
        Command::Inspect { report, format } => {
            let format: OutputFormat = format.parse()?;
            let text = std::fs::read_to_string(&report)?;
            let doc = ReportDocument::parse(&text)?;
            create_writer(format).print_table(&RunTable::new(&doc).build());
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}
