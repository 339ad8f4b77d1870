use std::fs;
use std::path::Path;

use crate::error::SubstitutionError;
use crate::writer::{Placeholder, RegionSubstitution};

/// Substitutes `###NAME###` markers in files on disk.
///
/// Every occurrence of the marker is replaced. The file is rewritten in one
/// `fs::write`; a missing marker leaves it untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAnchors;

impl RegionSubstitution for FileAnchors {
    fn substitute_region(
        &mut self,
        path: &Path,
        placeholder: Placeholder,
        text: &str,
    ) -> Result<(), SubstitutionError> {
        let content = fs::read_to_string(path).map_err(|source| SubstitutionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let marker = placeholder.marker();
        if !content.contains(&marker) {
            return Err(SubstitutionError::PlaceholderNotFound {
                path: path.to_path_buf(),
                placeholder,
            });
        }

        fs::write(path, content.replace(&marker, text)).map_err(|source| SubstitutionError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
