//! # Environment
//!
//! The variable mapping substituted into request templates.
//!
//! An `Environment` is a cheap handle: cloning it shares the same underlying
//! map, and every mutation happens in place. The inspector, the variable
//! editor and the execution context all hold clones of one handle, so an edit
//! saved in the editor is visible to the next render or send without any
//! explicit hand-off.
//!
//! ```text
//! Environment ──clone──► Context (engine substitution)
//!      │      ──clone──► TextEditorView (replace on save)
//!      └── Rc<RefCell<BTreeMap<String, String>>>
//! ```
//!
//! Two text formats are handled here:
//! - startup env files (`--env`): strict, a line without `=` is fatal
//! - editor text: lenient, a line without `=` is skipped

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use log::{debug, info};

/// Shared, in-place mutable variable mapping.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: Rc<RefCell<BTreeMap<String, String>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env = Self::new();
        env.vars
            .borrow_mut()
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        env
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.vars.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.borrow().contains_key(name)
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.borrow_mut().insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.vars.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.borrow().is_empty()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.vars.borrow().clone()
    }

    /// Clear the mapping and repopulate it. Identity is preserved, so every
    /// clone of this handle observes the new contents.
    pub fn replace<I>(&self, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars = self.vars.borrow_mut();
        vars.clear();
        vars.extend(pairs);
        debug!("Environment replaced ({} variables)", vars.len());
    }

    /// Serialize as one `KEY=VALUE` pair per line, sorted by key.
    pub fn to_text(&self) -> String {
        self.vars
            .borrow()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the contents from editor text. Lines without `=` are skipped.
    /// Returns the number of variables now set.
    pub fn apply_text(&self, text: &str) -> usize {
        let pairs = parse_assignments(text);
        let count = pairs.len();
        self.replace(pairs);
        debug!("Applied {count} assignments from editor text");
        self.len()
    }

    /// True when both handles point at the same mapping.
    pub fn same_as(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.vars, &other.vars)
    }
}

/// Parse editor text into assignments, splitting each line on the first `=`.
///
/// Lines with no `=` are ignored rather than reported.
pub fn parse_assignments(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            line.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect()
}

// ============================================================================
// Startup env files
// ============================================================================

#[derive(Debug)]
pub enum EnvFileError {
    Io(std::io::Error),
    MalformedLine { line_number: usize, line: String },
}

impl fmt::Display for EnvFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvFileError::Io(e) => write!(f, "env file I/O error: {e}"),
            EnvFileError::MalformedLine { line_number, line } => {
                write!(f, "invalid line {line_number} in env file: {line}")
            }
        }
    }
}

impl std::error::Error for EnvFileError {}

/// Parse the contents of an env file.
///
/// Comment lines (first non-blank character `#`) are skipped. Every other
/// line, blank ones included, must contain `=`.
pub fn parse_env_file(contents: &str) -> Result<Vec<(String, String)>, EnvFileError> {
    let mut pairs = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        match line.split_once('=') {
            Some((k, v)) => pairs.push((k.to_string(), v.to_string())),
            None => {
                return Err(EnvFileError::MalformedLine {
                    line_number: idx + 1,
                    line: line.to_string(),
                });
            }
        }
    }
    Ok(pairs)
}

/// Load an env file into a fresh environment.
pub fn load_env_file(path: &Path) -> Result<Environment, EnvFileError> {
    let contents = fs::read_to_string(path).map_err(EnvFileError::Io)?;
    let pairs = parse_env_file(&contents)?;
    info!("Loaded {} variables from {}", pairs.len(), path.display());
    Ok(Environment::from_pairs(pairs))
}
