use itertools::Itertools;
use miette::Diagnostic;
use std::fmt;
use std::path::PathBuf;

use crate::writer::Placeholder;

/// What a locator was being rendered for when it turned out to be invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorTarget {
    Field(String),
    List,
    Page,
}

impl fmt::Display for LocatorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorTarget::Field(name) => write!(f, "field \"{}\"", name),
            LocatorTarget::List => write!(f, "list locator"),
            LocatorTarget::Page => write!(f, "pagination locator"),
        }
    }
}

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum SubstitutionError {
    #[error("Failed to access {}: {source}", .path.display())]
    #[diagnostic(code(spidergen::substitution::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Placeholder {placeholder} not found in {}", .path.display())]
    #[diagnostic(
        code(spidergen::substitution::placeholder_not_found),
        help("The target file must contain the marker `###{placeholder}###`")
    )]
    PlaceholderNotFound {
        path: PathBuf,
        placeholder: Placeholder,
    },
}

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("Invalid locator for {target} in stage \"{stage}\": neither css nor xpath is set")]
    #[diagnostic(
        code(spidergen::invalid_locator),
        help("Set exactly one of `css` or `xpath`")
    )]
    InvalidLocator { stage: String, target: LocatorTarget },
    #[error("Stage \"{stage}\" is a list stage but has no list locator")]
    #[diagnostic(
        code(spidergen::missing_list_locator),
        help("Add a `list` locator or set `is_list` to false")
    )]
    MissingListLocator { stage: String },
    #[error("Stage \"{stage}\" has more than one next-stage field: {}", .fields.iter().join(", "))]
    #[diagnostic(
        code(spidergen::ambiguous_chain),
        help("At most one field per stage may set `next_stage`")
    )]
    AmbiguousChain { stage: String, fields: Vec<String> },
    #[error("Field \"{field}\" in stage \"{stage}\" chains to unknown stage \"{target}\"")]
    #[diagnostic(code(spidergen::unknown_stage))]
    UnknownStage {
        stage: String,
        field: String,
        target: String,
    },
    #[error("Invalid stage name \"{stage}\"")]
    #[diagnostic(
        code(spidergen::invalid_stage_name),
        help("Stage names may only contain ASCII letters, digits and underscores")
    )]
    InvalidStageName { stage: String },
    #[error("Stage \"{stage}\" is defined more than once")]
    #[diagnostic(
        code(spidergen::duplicate_stage),
        help("Each stage name generates one `parse_<name>` callback and must be unique")
    )]
    DuplicateStage { stage: String },
    #[error("Invalid field name \"{field}\" in stage \"{stage}\"")]
    #[diagnostic(
        code(spidergen::invalid_field_name),
        help("Field names must be Python identifiers and not Python keywords")
    )]
    InvalidFieldName { stage: String, field: String },
    #[error("Configuration has no stages")]
    #[diagnostic(code(spidergen::no_stages))]
    NoStages,
    #[error("Failed to load configuration {}: {message}", .path.display())]
    #[diagnostic(code(spidergen::config))]
    Config { path: PathBuf, message: String },
    #[error("Failed to write {}: {source}", .path.display())]
    #[diagnostic(code(spidergen::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} already exists", .path.display())]
    #[diagnostic(
        code(spidergen::file_exists),
        help("Pass --force to overwrite the existing project files")
    )]
    FileExists { path: PathBuf },
    #[error("{} placeholder substitution(s) failed", .0.len())]
    #[diagnostic(code(spidergen::substitution))]
    Substitution(#[related] Vec<SubstitutionError>),
}
