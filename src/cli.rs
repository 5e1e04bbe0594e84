//! Command-line interface implementation for nextkit.
//! Provides argument parsing and help text formatting using clap.

use crate::constants::DEFAULT_TEMPLATE;
use crate::variables::Request;
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for nextkit.
#[derive(Parser, Debug)]
#[command(author, version, about = "nextkit: scaffold a pre-wired Next.js workspace", long_about = None)]
pub struct Args {
    /// Directory where the project will be created
    #[arg(value_name = "TARGET_DIR", required_unless_present = "list_templates")]
    pub target: Option<PathBuf>,

    /// Project name (defaults to the target directory name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Project description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Project author
    #[arg(short, long)]
    pub author: Option<String>,

    /// Extra template variable, may be repeated
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Bundled template name or path to a template directory
    #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Replace files that already exist in the target directory
    #[arg(short, long)]
    pub overwrite: bool,

    /// Leave end-to-end tests and their configuration out of the project
    #[arg(long)]
    pub skip_tests: bool,

    /// Read answers as a JSON object from stdin
    #[arg(short, long)]
    pub stdin: bool,

    /// Prompt for values not given on the command line
    #[arg(short, long)]
    pub interactive: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// List bundled templates and exit
    #[arg(long)]
    pub list_templates: bool,
}

impl Args {
    /// Request for the variable resolver. `None` when no target was given.
    pub fn request(&self) -> Option<Request> {
        let target = self.target.clone()?;
        Some(Request {
            target,
            name: self.name.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            vars: self.vars.clone(),
            skip_tests: self.skip_tests,
            interactive: self.interactive,
        })
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 after printing help if required arguments are missing
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
