//! Variable resolution.
//! Collects the values that fill template placeholders from flags, stdin
//! answers, prompts and defaults, and validates them before anything is
//! rendered or written.

use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::renderer::slugify;
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use serde_json::Value;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

/// Longest accepted project name, matching the npm package name limit.
pub const MAX_NAME_LEN: usize = 214;

/// Variables computed by the resolver; `--var` may not redefine them.
pub const BUILTINS: [&str; 6] =
    ["project_name", "project_slug", "package_name", "description", "author", "include_tests"];

/// Built-ins that stdin answers are allowed to provide.
const ANSWERABLE: [&str; 3] = ["project_name", "description", "author"];

/// Everything the resolver needs from the command line.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub target: PathBuf,
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub vars: Vec<String>,
    pub skip_tests: bool,
    pub interactive: bool,
}

/// Resolved placeholder values, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableSet(IndexMap<String, Value>);

impl VariableSet {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Rendering context with every variable at the top level.
    pub fn to_context(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

fn identifier_re() -> Regex {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
}

fn slug_re() -> Regex {
    Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("slug pattern is valid")
}

/// Parses a JSON object of answers. Empty input yields no answers.
///
/// # Errors
/// * `Error::Validation` if the input is not a JSON object
pub fn parse_answers(input: &str) -> Result<IndexMap<String, Value>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(IndexMap::new());
    }
    match serde_json::from_str::<Value>(input) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(other) => Err(Error::Validation(format!(
            "answers must be a JSON object, got {}",
            json_type(&other)
        ))),
        Err(e) => Err(Error::Validation(format!("failed to parse answers as JSON: {e}"))),
    }
}

/// Reads answers from standard input.
pub fn load_answers_from_stdin() -> Result<IndexMap<String, Value>> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    parse_answers(&buffer)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Splits a `KEY=VALUE` argument.
///
/// # Errors
/// * `Error::Validation` if `=` is missing, the key is not an identifier, or
///   the key names a built-in variable
pub fn parse_var(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| Error::Validation(format!("'{raw}' is not in KEY=VALUE form")))?;
    let key = key.trim();
    validate_extra_key(key)?;
    Ok((key.to_string(), value.to_string()))
}

fn validate_extra_key(key: &str) -> Result<()> {
    if !identifier_re().is_match(key) {
        return Err(Error::Validation(format!("'{key}' is not a valid variable name")));
    }
    if BUILTINS.contains(&key) {
        return Err(Error::Validation(format!(
            "'{key}' is a built-in variable and cannot be set with --var"
        )));
    }
    Ok(())
}

/// Checks a project name and returns it trimmed.
///
/// # Errors
/// * `Error::Validation` if the name is empty, too long, or contains path
///   separators, control characters or characters invalid in file names
pub fn validate_project_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("project name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "project name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_control() || matches!(c, '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*'))
    {
        return Err(Error::Validation(format!(
            "project name '{}' contains invalid character {c:?}",
            name.escape_debug()
        )));
    }
    Ok(name.to_string())
}

/// Derives the package slug from a project name.
///
/// # Errors
/// * `Error::Validation` if nothing usable remains after slugifying
pub fn project_slug(name: &str) -> Result<String> {
    let slug = slugify(name.to_string());
    if !slug_re().is_match(&slug) {
        return Err(Error::Validation(format!(
            "project name '{name}' does not yield a valid package name (got '{slug}')"
        )));
    }
    Ok(slug)
}

/// Last normal component of the target, resolving `.` and `..` against the
/// current directory.
pub fn default_project_name(target: &Path) -> Result<String> {
    let absolute = if target.is_absolute() {
        target.to_path_buf()
    } else {
        std::env::current_dir()?.join(target)
    };
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in absolute.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop();
            }
            _ => {}
        }
    }
    parts
        .last()
        .and_then(|part| part.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::Validation(format!(
                "cannot derive a project name from '{}', pass --name",
                target.display()
            ))
        })
}

fn answer_str(answers: &IndexMap<String, Value>, key: &str) -> Result<Option<String>> {
    match answers.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::Validation(format!(
            "answer '{key}' must be a string, got {}",
            json_type(other)
        ))),
    }
}

/// Produces the variable set for one generation run.
///
/// Precedence per value: command line flag, stdin answer, interactive
/// prompt, default.
///
/// # Errors
/// * `Error::Validation` for any value that violates its constraints
pub fn resolve(
    request: &Request,
    answers: &IndexMap<String, Value>,
    prompter: Option<&dyn Prompter>,
) -> Result<VariableSet> {
    let raw_name = match request.name.clone() {
        Some(name) => name,
        None => match answer_str(answers, "project_name")? {
            Some(name) => name,
            None => default_project_name(&request.target)?,
        },
    };
    let project_name = validate_project_name(&raw_name)?;
    let slug = project_slug(&project_name)?;

    let mut description = match request.description.clone() {
        Some(description) => Some(description),
        None => answer_str(answers, "description")?,
    };
    let mut author = match request.author.clone() {
        Some(author) => Some(author),
        None => answer_str(answers, "author")?,
    };

    if let Some(prompter) = prompter.filter(|_| request.interactive) {
        if description.is_none() {
            let default = format!("{project_name} web application");
            description = Some(prompter.text("Project description", &default)?);
        }
        if author.is_none() {
            author = Some(prompter.text("Author", "")?);
        }
    }

    let mut variables = VariableSet::default();
    variables.insert("project_name", Value::String(project_name.clone()));
    variables.insert("project_slug", Value::String(slug.clone()));
    variables.insert("package_name", Value::String(slug));
    variables.insert(
        "description",
        Value::String(description.unwrap_or_else(|| format!("{project_name} web application"))),
    );
    variables.insert("author", Value::String(author.unwrap_or_default()));
    variables.insert("include_tests", Value::Bool(!request.skip_tests));

    for (key, value) in answers {
        if ANSWERABLE.contains(&key.as_str()) {
            continue;
        }
        if BUILTINS.contains(&key.as_str()) {
            return Err(Error::Validation(format!(
                "'{key}' is computed and cannot be answered"
            )));
        }
        validate_extra_key(key)?;
        variables.insert(key.clone(), value.clone());
    }

    for raw in &request.vars {
        let (key, value) = parse_var(raw)?;
        variables.insert(key, Value::String(value));
    }

    for (key, value) in variables.iter() {
        debug!("Variable {key} = {value}");
    }
    Ok(variables)
}
