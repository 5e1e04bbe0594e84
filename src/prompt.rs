//! User input and interaction handling.
use crate::error::{Error, Result};
use dialoguer::Input;
use std::io;

/// Source of interactive answers.
pub trait Prompter {
    /// Asks for a free text value, offering `default`.
    fn text(&self, question: &str, default: &str) -> Result<String>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn text(&self, question: &str, default: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(question)
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)
    }
}

/// Terminal failures while prompting are I/O errors.
fn prompt_error(err: dialoguer::Error) -> Error {
    Error::Io(io::Error::other(err))
}
