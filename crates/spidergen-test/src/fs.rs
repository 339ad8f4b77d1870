use std::path::{Path, PathBuf};

use spidergen::ProjectLayout;
use tempfile::TempDir;

/// A scaffolded project in a temporary directory, removed on drop.
pub struct Project {
    dir: TempDir,
    layout: ProjectLayout,
}

impl Project {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn read(&self, path: impl AsRef<Path>) -> String {
        std::fs::read_to_string(path.as_ref()).expect("Failed to read project file")
    }

    pub fn items(&self) -> String {
        self.read(self.layout.items())
    }

    pub fn settings(&self) -> String {
        self.read(self.layout.settings())
    }

    pub fn spider(&self) -> String {
        self.read(self.layout.spider())
    }

    /// Every template file, in template order, as (path, content).
    pub fn snapshot(&self) -> Vec<(PathBuf, String)> {
        spidergen::scaffold::TEMPLATES
            .iter()
            .map(|(relative, _)| {
                let path = self.path().join(relative);
                let content = self.read(&path);
                (path, content)
            })
            .collect()
    }
}

/// Creates a temporary directory holding the bundled skeleton project.
pub fn create_project() -> Project {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    spidergen::scaffold::write_project(dir.path(), false).expect("Failed to write templates");
    let layout = ProjectLayout::new(dir.path());

    Project { dir, layout }
}
