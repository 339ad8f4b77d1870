use std::path::{Path, PathBuf};

use crate::assembler;
use crate::config::Config;
use crate::error::{Error, SubstitutionError};
use crate::fields::FieldSet;

/// Named regions in the project templates that generated text replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Placeholder {
    Items,
    Proxy,
    Pipelines,
    StartStage,
    StartUrl,
    Parsers,
}

impl Placeholder {
    /// The marker written in template files, e.g. `###ITEMS###`.
    pub fn marker(&self) -> String {
        format!("###{}###", self.as_ref())
    }
}

/// Replaces a placeholder region inside a target file.
pub trait RegionSubstitution {
    fn substitute_region(
        &mut self,
        path: &Path,
        placeholder: Placeholder,
        text: &str,
    ) -> Result<(), SubstitutionError>;
}

/// Locations of the generated files inside a project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub const PACKAGE: &'static str = "config_spider";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn items(&self) -> PathBuf {
        self.root.join(Self::PACKAGE).join("items.py")
    }

    pub fn settings(&self) -> PathBuf {
        self.root.join(Self::PACKAGE).join("settings.py")
    }

    pub fn spider(&self) -> PathBuf {
        self.root.join(Self::PACKAGE).join("spiders").join("spider.py")
    }

    /// File holding `placeholder`.
    pub fn file_for(&self, placeholder: Placeholder) -> PathBuf {
        match placeholder {
            Placeholder::Items => self.items(),
            Placeholder::Proxy | Placeholder::Pipelines => self.settings(),
            Placeholder::StartStage | Placeholder::StartUrl | Placeholder::Parsers => self.spider(),
        }
    }
}

/// Middleware registration written into `settings.py` when proxying over HTTP.
pub const PROXY_MIDDLEWARES: &str = "DOWNLOADER_MIDDLEWARES = {\n    'config_spider.middlewares.ProxyMiddleware': 100,\n}\n";

/// Pipeline registration written into `settings.py` in content extraction mode.
///
/// Replaces the default pipeline with the one filling `title_zh` and `content_zh`.
pub const TRANSLATION_PIPELINES: &str = "ITEM_PIPELINES = {\n    'config_spider.pipelines.ConfigTranslationPipeline': 300,\n}\n";

/// Every generated region, rendered and ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub items: String,
    pub proxy: Option<String>,
    pub pipelines: Option<String>,
    pub start_stage: String,
    pub start_url: String,
    pub parsers: String,
}

impl Artifacts {
    /// Renders all regions. No file is touched, so structural errors surface first.
    pub fn render(config: &Config) -> Result<Self, Error> {
        let items = FieldSet::build(config).render();
        let spider = assembler::assemble(config)?;

        Ok(Self {
            items,
            proxy: config
                .wants_proxy_middleware()
                .then(|| PROXY_MIDDLEWARES.to_string()),
            pipelines: config
                .content_extraction_mode
                .then(|| TRANSLATION_PIPELINES.to_string()),
            start_stage: spider.entry_callback,
            start_url: config.entry_url.clone(),
            parsers: spider.parsers,
        })
    }

    /// Regions in write order, paired with their text.
    pub fn regions(&self) -> Vec<(Placeholder, &str)> {
        let mut regions = vec![(Placeholder::Items, self.items.as_str())];
        if let Some(proxy) = &self.proxy {
            regions.push((Placeholder::Proxy, proxy.as_str()));
        }
        if let Some(pipelines) = &self.pipelines {
            regions.push((Placeholder::Pipelines, pipelines.as_str()));
        }
        regions.extend([
            (Placeholder::StartStage, self.start_stage.as_str()),
            (Placeholder::StartUrl, self.start_url.as_str()),
            (Placeholder::Parsers, self.parsers.as_str()),
        ]);
        regions
    }

    pub fn region(&self, placeholder: Placeholder) -> Option<&str> {
        self.regions()
            .into_iter()
            .find(|(p, _)| *p == placeholder)
            .map(|(_, text)| text)
    }
}

/// Writes rendered artifacts into a project through a [`RegionSubstitution`].
pub struct ArtifactWriter<S> {
    layout: ProjectLayout,
    substitution: S,
}

impl<S: RegionSubstitution> ArtifactWriter<S> {
    pub fn new(layout: ProjectLayout, substitution: S) -> Self {
        Self {
            layout,
            substitution,
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn into_inner(self) -> S {
        self.substitution
    }

    /// Writes every region.
    ///
    /// A failed region does not stop the remaining ones; all failures are
    /// reported together and nothing already written is rolled back.
    pub fn write(&mut self, artifacts: &Artifacts) -> Result<(), Error> {
        let mut failures = Vec::new();

        for (placeholder, text) in artifacts.regions() {
            let path = self.layout.file_for(placeholder);
            match self.substitution.substitute_region(&path, placeholder, text) {
                Ok(()) => {
                    tracing::info!(%placeholder, path = %path.display(), "Substituted region");
                }
                Err(e) => {
                    tracing::warn!(%placeholder, path = %path.display(), "Substitution failed: {}", e);
                    failures.push(e);
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Substitution(failures))
        }
    }

    /// Renders `config` and writes the result.
    pub fn generate(&mut self, config: &Config) -> Result<Artifacts, Error> {
        let artifacts = Artifacts::render(config)?;
        self.write(&artifacts)?;
        Ok(artifacts)
    }
}
