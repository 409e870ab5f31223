//! Command-line interface implementation for mkproject.
//! Provides argument parsing and help text formatting using clap.

use crate::conflict::ConflictPolicy;
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for mkproject.
#[derive(Parser, Debug)]
#[command(author, version, about = "mkproject: generate projects from YAML structures", long_about = None)]
pub struct Args {
    /// Path to a structure description, or the name of a project template
    #[arg(value_name = "STRUCTURE")]
    pub structure: String,

    /// Directory the project is generated into
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Value of the {mp:title} token. Defaults to the structure's title,
    /// then to the output directory name
    #[arg(short, long)]
    pub title: Option<String>,

    /// Value of the {mp:description} token
    #[arg(short, long)]
    pub description: Option<String>,

    /// Configuration file (default: mkproject.json, mkproject.yml or mkproject.yaml
    /// in the current directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding file and folder templates
    #[arg(long, value_name = "DIR")]
    pub file_templates: Option<PathBuf>,

    /// Directory holding project templates
    #[arg(long, value_name = "DIR")]
    pub project_templates: Option<PathBuf>,

    /// What to do when a generated path already exists
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_conflict: Option<ConflictPolicy>,

    /// Print the resolved tree without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
