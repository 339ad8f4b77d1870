//! Bundled skeleton project the generator writes into.
//!
//! The templates carry the `###NAME###` markers addressed by [`crate::writer::Placeholder`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Template files as (path relative to the project root, content).
pub const TEMPLATES: [(&str, &str); 8] = [
    ("scrapy.cfg", include_str!("../templates/scrapy.cfg")),
    (
        "config_spider/__init__.py",
        include_str!("../templates/config_spider/__init__.py"),
    ),
    (
        "config_spider/items.py",
        include_str!("../templates/config_spider/items.py"),
    ),
    (
        "config_spider/settings.py",
        include_str!("../templates/config_spider/settings.py"),
    ),
    (
        "config_spider/middlewares.py",
        include_str!("../templates/config_spider/middlewares.py"),
    ),
    (
        "config_spider/pipelines.py",
        include_str!("../templates/config_spider/pipelines.py"),
    ),
    (
        "config_spider/spiders/__init__.py",
        include_str!("../templates/config_spider/spiders/__init__.py"),
    ),
    (
        "config_spider/spiders/spider.py",
        include_str!("../templates/config_spider/spiders/spider.py"),
    ),
];

/// Writes the skeleton project under `root` and returns the written paths.
///
/// Existing files are only overwritten when `force` is set; otherwise the
/// first existing file aborts before anything is written.
pub fn write_project(root: impl AsRef<Path>, force: bool) -> Result<Vec<PathBuf>, Error> {
    let root = root.as_ref();

    if !force {
        if let Some(path) = TEMPLATES
            .iter()
            .map(|(relative, _)| root.join(relative))
            .find(|path| path.exists())
        {
            return Err(Error::FileExists { path });
        }
    }

    TEMPLATES
        .iter()
        .map(|(relative, content)| {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| Error::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&path, content).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "Wrote template");
            Ok(path)
        })
        .collect()
}
