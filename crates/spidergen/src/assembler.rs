use indexmap::IndexSet;

use crate::config::{Config, Stage};
use crate::emitter;
use crate::error::Error;
use crate::fields::is_valid_name;
use crate::selector;

/// The generated spider: its entry callback and every parser function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spider {
    pub entry_callback: String,
    pub parsers: String,
}

/// Emits every stage in configuration order.
///
/// The first stage is the entry point. Chain targets must name a configured stage.
pub fn assemble(config: &Config) -> Result<Spider, Error> {
    let entry = config.entry_stage().ok_or(Error::NoStages)?;

    let mut names = IndexSet::new();
    for stage in &config.stages {
        validate_stage(stage, config)?;
        if !names.insert(stage.name.as_str()) {
            return Err(Error::DuplicateStage {
                stage: stage.name.clone(),
            });
        }
    }

    let parsers = config
        .stages
        .iter()
        .map(|stage| emitter::emit(stage, config))
        .collect::<Result<Vec<_>, _>>()?
        .concat();

    tracing::debug!(
        entry = %entry.name,
        stages = config.stages.len(),
        "Assembled spider"
    );

    Ok(Spider {
        entry_callback: entry.callback(),
        parsers,
    })
}

fn validate_stage(stage: &Stage, config: &Config) -> Result<(), Error> {
    if stage.name.is_empty()
        || !stage
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Error::InvalidStageName {
            stage: stage.name.clone(),
        });
    }

    for field in &stage.fields {
        if !is_valid_name(&field.name) {
            return Err(Error::InvalidFieldName {
                stage: stage.name.clone(),
                field: field.name.clone(),
            });
        }
        // Checked even where content extraction supplies the value.
        selector::field_expression(stage, field)?;
    }

    if let Some(field) = emitter::chain_field(stage)? {
        let target = field.next_stage().unwrap_or_default();
        if config.stage(target).is_none() {
            return Err(Error::UnknownStage {
                stage: stage.name.clone(),
                field: field.name.clone(),
                target: target.to_string(),
            });
        }
    }

    Ok(())
}
