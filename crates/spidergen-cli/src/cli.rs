use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use spidergen::{Artifacts, Config, Placeholder};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "spidergen")]
#[command(version)]
#[command(after_help = "Examples:\n\n\
    To generate a spider into a fresh project:\n\
    $ spidergen generate -c spider.yaml -p out --scaffold\n\n\
    To preview the generated parsers:\n\
    $ spidergen render -c spider.yaml -r parsers\n\n\
    To validate a configuration:\n\
    $ spidergen check -c spider.json")]
#[command(
    about = "spidergen turns declarative crawl stages into a ready-to-run Scrapy spider.",
    long_about = None
)]
pub struct Cli {
    #[clap(subcommand)]
    commands: Commands,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate the spider into a project's placeholder regions
    Generate {
        /// Crawl configuration (JSON or YAML)
        #[arg(short, long)]
        config: PathBuf,
        /// Project directory containing config_spider/
        #[arg(short, long)]
        project: PathBuf,
        /// Write the skeleton project before generating
        #[arg(long)]
        scaffold: bool,
        /// Overwrite existing files when scaffolding
        #[arg(long, requires = "scaffold")]
        force: bool,
    },
    /// Print generated regions to stdout without touching any file
    Render {
        /// Crawl configuration (JSON or YAML)
        #[arg(short, long)]
        config: PathBuf,
        /// Region to print
        #[arg(short, long, value_enum, default_value_t)]
        region: Region,
    },
    /// Write the skeleton project with its placeholder markers
    Init {
        /// Project directory
        project: PathBuf,
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
    /// Validate a configuration by rendering it
    Check {
        /// Crawl configuration (JSON or YAML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Clone, Debug, Default, clap::ValueEnum)]
enum Region {
    #[default]
    All,
    Items,
    Proxy,
    Pipelines,
    StartStage,
    StartUrl,
    Parsers,
}

impl Region {
    fn placeholder(&self) -> Option<Placeholder> {
        match self {
            Region::All => None,
            Region::Items => Some(Placeholder::Items),
            Region::Proxy => Some(Placeholder::Proxy),
            Region::Pipelines => Some(Placeholder::Pipelines),
            Region::StartStage => Some(Placeholder::StartStage),
            Region::StartUrl => Some(Placeholder::StartUrl),
            Region::Parsers => Some(Placeholder::Parsers),
        }
    }
}

impl Cli {
    pub fn run(&self) -> miette::Result<()> {
        match &self.commands {
            Commands::Generate {
                config,
                project,
                scaffold,
                force,
            } => self.generate(config, project, *scaffold, *force),
            Commands::Render { config, region } => self.render(config, region),
            Commands::Init { project, force } => {
                let written = spidergen::scaffold::write_project(project, *force)?;
                let stdout = io::stdout();
                let mut handle = BufWriter::new(stdout.lock());
                for path in written {
                    writeln!(handle, "{}", path.display()).into_diagnostic()?;
                }
                handle.flush().into_diagnostic()
            }
            Commands::Check { config } => {
                let loaded = Config::from_path(config)?;
                Artifacts::render(&loaded)?;
                println!(
                    "{}: ok ({} stage(s))",
                    config.display(),
                    loaded.stages.len()
                );
                Ok(())
            }
        }
    }

    fn generate(
        &self,
        config: &Path,
        project: &Path,
        scaffold: bool,
        force: bool,
    ) -> miette::Result<()> {
        let config = Config::from_path(config)?;

        if scaffold {
            spidergen::scaffold::write_project(project, force)?;
        }

        let artifacts = spidergen::generate(&config, project)?;
        println!(
            "Generated {} parser(s) into {}, entry callback {}",
            config.stages.len(),
            project.display(),
            artifacts.start_stage
        );
        Ok(())
    }

    fn render(&self, config: &Path, region: &Region) -> miette::Result<()> {
        let config = Config::from_path(config)?;
        let artifacts = Artifacts::render(&config)?;

        let stdout = io::stdout();
        let mut handle = BufWriter::new(stdout.lock());

        match region.placeholder() {
            Some(placeholder) => match artifacts.region(placeholder) {
                Some(text) => {
                    write!(handle, "{}", text).into_diagnostic()?;
                }
                None => {
                    tracing::warn!(%placeholder, "Region is not generated for this configuration");
                }
            },
            None => {
                for (placeholder, text) in artifacts.regions() {
                    writeln!(handle, "# --- {} ---", placeholder).into_diagnostic()?;
                    write!(handle, "{}", text).into_diagnostic()?;
                    if !text.ends_with('\n') {
                        writeln!(handle).into_diagnostic()?;
                    }
                }
            }
        }

        handle.flush().into_diagnostic()
    }
}
