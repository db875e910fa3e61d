use std::fmt;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{error, warn};

use crate::config::{SiteConfig, Verbosity};
use crate::progress;
use crate::registry::{LinkDefinition, LinkEntry, LinkRegistry, RegistryError};
use crate::sitemap::{SitemapError, SitemapGenerator};
use crate::template::{Template, TemplateError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Sitemap(#[from] SitemapError),
    #[error("IO error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl BuildError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> BuildError + '_ {
        move |source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Input and output locations for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub registry: PathBuf,
    pub output_dir: PathBuf,
    pub template: PathBuf,
    pub config: PathBuf,
    pub error_page: PathBuf,
    pub sitemap_name: String,
    pub verbosity: Verbosity,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            registry: PathBuf::from("url.json"),
            output_dir: PathBuf::from("_site"),
            template: PathBuf::from("template.html"),
            config: PathBuf::from("config.json"),
            error_page: PathBuf::from("404.html"),
            sitemap_name: "sitemap.xml".to_string(),
            verbosity: Verbosity::Verbose,
        }
    }
}

/// Why a registry entry produced no page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingUrl,
    InvalidKey,
    PathConflict(PathBuf),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingUrl => write!(f, "no url given"),
            SkipReason::InvalidKey => write!(f, "key is not a single path segment"),
            SkipReason::PathConflict(p) => write!(f, "'{}' clashes with another output file", p.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub key: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub key: String,
    pub reason: SkipReason,
}

/// What a finished build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub rendered: Vec<RenderedPage>,
    pub skipped: Vec<SkippedEntry>,
    pub error_page: Option<PathBuf>,
    pub sitemap: PathBuf,
}

enum Outcome {
    Rendered(PathBuf),
    Skipped(SkipReason),
}

pub struct SiteBuilder {
    options: BuildOptions,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            options: BuildOptions::default(),
        }
    }

    pub fn from_options(options: BuildOptions) -> Self {
        Self { options }
    }

    // Inputs
    pub fn registry<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.options.registry = path.as_ref().to_path_buf();
        self
    }

    pub fn template<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.options.template = path.as_ref().to_path_buf();
        self
    }

    pub fn config<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.options.config = path.as_ref().to_path_buf();
        self
    }

    pub fn error_page<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.options.error_page = path.as_ref().to_path_buf();
        self
    }

    // Outputs
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.options.output_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn sitemap_name<S: Into<String>>(mut self, name: S) -> Self {
        self.options.sitemap_name = name.into();
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.options.verbosity = verbosity;
        self
    }

    /// Load every input. Nothing on disk is touched until
    /// [`Site::render_all`], so a bad registry or template leaves the
    /// previous output in place.
    pub fn build(self) -> Result<Site, BuildError> {
        let options = self.options;
        let config = SiteConfig::load(&options.config, options.verbosity);
        let registry = LinkRegistry::load(&options.registry, options.verbosity)?;
        let template = Template::read(&options.template)?;

        Ok(Site {
            config,
            registry,
            template,
            options,
        })
    }
}

/// A site whose inputs are loaded and which is ready to be written out.
pub struct Site {
    config: SiteConfig,
    registry: LinkRegistry,
    template: Template,
    options: BuildOptions,
}

impl Site {
    pub fn new(config: SiteConfig, registry: LinkRegistry, template: Template, options: BuildOptions) -> Self {
        Self {
            config,
            registry,
            template,
            options,
        }
    }

    fn verbosity(&self) -> Verbosity {
        self.options.verbosity
    }

    /// Wipe the output directory and recreate it empty.
    fn reset_output(&self) -> Result<(), BuildError> {
        let out = &self.options.output_dir;

        if out.exists() {
            std::fs::remove_dir_all(out).map_err(BuildError::io(out))?;
            progress!(self.verbosity(), "Folder '{}' removed.", out.display());
        }

        std::fs::create_dir_all(out).map_err(BuildError::io(out))?;
        progress!(self.verbosity(), "Folder '{}' created.", out.display());

        Ok(())
    }

    fn copy_error_page(&self) -> Result<Option<PathBuf>, BuildError> {
        let source = &self.options.error_page;

        let file_name = match source.file_name() {
            Some(name) if source.is_file() => name,
            _ => {
                warn!(
                    "The file '{}' does not exist. It was not copied.",
                    source.display()
                );
                return Ok(None);
            }
        };

        let dest = self.options.output_dir.join(file_name);
        std::fs::copy(source, &dest).map_err(BuildError::io(&dest))?;
        progress!(
            self.verbosity(),
            "File '{}' copied to '{}'.",
            source.display(),
            self.options.output_dir.display()
        );

        Ok(Some(dest))
    }

    /// Top-level names the build writes itself after the pages.
    fn is_reserved(&self, key: &str) -> bool {
        key == "index.html" || key == self.options.sitemap_name
    }

    /// Where the page for `entry` goes, creating its folder if needed.
    fn page_out_path(&self, entry: &LinkEntry) -> Result<Result<PathBuf, SkipReason>, BuildError> {
        let out = &self.options.output_dir;

        if entry.is_root() {
            return Ok(Ok(out.join("index.html")));
        }

        let folder = out.join(&entry.key);
        if self.is_reserved(&entry.key) {
            return Ok(Err(SkipReason::PathConflict(folder)));
        }

        if folder.is_dir() {
            progress!(self.verbosity(), "Folder '{}' already exists.", folder.display());
        } else if folder.exists() {
            return Ok(Err(SkipReason::PathConflict(folder)));
        } else {
            std::fs::create_dir(&folder).map_err(BuildError::io(&folder))?;
            progress!(self.verbosity(), "Folder '{}' created.", folder.display());
        }

        Ok(Ok(folder.join("index.html")))
    }

    fn render_entry(&self, key: &str, definition: &LinkDefinition) -> Result<Outcome, BuildError> {
        let Some(entry) = definition.resolve(key) else {
            return Ok(Outcome::Skipped(SkipReason::MissingUrl));
        };

        if !is_single_segment(key) {
            return Ok(Outcome::Skipped(SkipReason::InvalidKey));
        }

        let out_path = match self.page_out_path(&entry)? {
            Ok(path) => path,
            Err(reason) => return Ok(Outcome::Skipped(reason)),
        };

        self.template.render_to_file(&entry, &out_path)?;
        progress!(self.verbosity(), "File '{}' created", out_path.display());

        Ok(Outcome::Rendered(out_path))
    }

    /// Rebuild the whole output tree from scratch.
    pub fn render_all(&self) -> Result<BuildReport, BuildError> {
        self.reset_output()?;
        let error_page = self.copy_error_page()?;

        let mut rendered = Vec::new();
        let mut skipped = Vec::new();

        for (key, definition) in self.registry.iter() {
            match self.render_entry(key, definition)? {
                Outcome::Rendered(path) => rendered.push(RenderedPage {
                    key: key.to_string(),
                    path,
                }),
                Outcome::Skipped(reason) => {
                    error!("Skipping '{}': {}.", key, reason);
                    skipped.push(SkippedEntry {
                        key: key.to_string(),
                        reason,
                    });
                }
            }
        }

        let sitemap = SitemapGenerator::new(self.config.base_url.as_str(), self.options.sitemap_name.as_str())
            .generate(
                &self.options.output_dir,
                rendered.iter().map(|page| page.key.as_str()),
                self.verbosity(),
            )?;

        Ok(BuildReport {
            output_dir: self.options.output_dir.clone(),
            rendered,
            skipped,
            error_page,
            sitemap,
        })
    }
}

/// Load inputs and write the site described by `options`.
pub fn build_site(options: BuildOptions) -> Result<BuildReport, BuildError> {
    SiteBuilder::from_options(options).build()?.render_all()
}

fn is_single_segment(key: &str) -> bool {
    if key.contains(['/', '\\']) {
        return false;
    }

    let mut components = Path::new(key).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
