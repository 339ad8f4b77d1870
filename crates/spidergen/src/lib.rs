//! Generates multi-stage Scrapy spiders from declarative stage configurations.
//!
//! A [`Config`] lists named stages. Each stage describes either a list of
//! elements or a single record on a page, the fields to extract, and which
//! field (if any) holds the URL of the following stage. The generator turns
//! it into Python source and substitutes that source into placeholder regions
//! of a skeleton Scrapy project.
//!
//! # Usage
//!
//! ```rust,ignore
//! use spidergen::{Config, generate};
//!
//! let config = Config::from_path("spider.yaml")?;
//! spidergen::scaffold::write_project("out", false)?;
//! generate(&config, "out")?;
//! ```
//!
//! # Generated regions
//!
//! - `ITEMS` in `config_spider/items.py`: one `scrapy.Field()` per field name
//! - `PROXY` in `config_spider/settings.py`: only when `proxy_mode` is `http`
//! - `PIPELINES` in `config_spider/settings.py`: only in content extraction mode
//! - `START_STAGE`, `START_URL` and `PARSERS` in `config_spider/spiders/spider.py`
//!
pub mod anchor;
pub mod assembler;
pub mod code;
pub mod config;
pub mod emitter;
pub mod error;
pub mod fields;
pub mod scaffold;
pub mod selector;
pub mod writer;

use std::path::Path;

pub use anchor::FileAnchors;
pub use assembler::{Spider, assemble};
pub use config::{Config, DedupScope, Field, Locator, Stage};
pub use error::{Error, LocatorTarget, SubstitutionError};
pub use fields::FieldSet;
pub use writer::{ArtifactWriter, Artifacts, Placeholder, ProjectLayout, RegionSubstitution};

/// Renders `config` and writes it into the project at `project_dir`.
pub fn generate(config: &Config, project_dir: impl AsRef<Path>) -> Result<Artifacts, Error> {
    let mut writer = ArtifactWriter::new(ProjectLayout::new(project_dir.as_ref()), FileAnchors);
    tracing::info!(project = %writer.layout().root().display(), "Generating spider");

    writer.generate(config)
}
