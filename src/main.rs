//! nextkit's main application entry point.
//! Parses arguments, chooses the template store once, then runs a generation
//! and reports each written path.

use std::path::PathBuf;

use indexmap::IndexMap;
use nextkit::{
    cli::{get_args, Args},
    constants::TEMPLATE_DIR_ENV,
    error::{default_error_handler, Error, Result},
    generate::generate,
    logger::init_logger,
    prompt::DialoguerPrompter,
    store::{EmbeddedStore, TemplateSource},
    variables::load_answers_from_stdin,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Selects the template store (environment override, directory or bundled name)
/// 2. Collects stdin answers when requested
/// 3. Resolves variables, renders the plan and materializes it
/// 4. Prints every written path and a summary
fn run(args: Args) -> Result<()> {
    if args.list_templates {
        for name in EmbeddedStore::available() {
            println!("{name}");
        }
        return Ok(());
    }

    let request = args
        .request()
        .ok_or_else(|| Error::Usage("missing TARGET_DIR argument".to_string()))?;

    let source =
        TemplateSource::select(&args.template, std::env::var_os(TEMPLATE_DIR_ENV).map(PathBuf::from));
    let store = source.open()?;

    let answers = if args.stdin { load_answers_from_stdin()? } else { IndexMap::new() };
    let prompter = DialoguerPrompter::new();

    let outcome = generate(&*store, &request, &answers, Some(&prompter), args.overwrite)?;

    for file in &outcome.report.files {
        println!("{}: '{}'", file.action, file.path.display());
    }
    if !outcome.skipped.is_empty() {
        println!("Skipped {} test file(s).", outcome.skipped.len());
    }
    println!("{}", outcome.summary());
    Ok(())
}
