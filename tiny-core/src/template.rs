use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::registry::LinkEntry;

pub const TITLE: &str = "{{ title }}";
pub const HEADING: &str = "{{ heading }}";
pub const URL: &str = "{{ url }}";
pub const DESCRIPTION: &str = "{{ description }}";
pub const IMAGE: &str = "{{ image }}";

/// Every placeholder, in the order they are substituted.
pub const PLACEHOLDERS: [&str; 5] = [TITLE, HEADING, URL, DESCRIPTION, IMAGE];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("could not read template '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The redirect page template. Placeholders are replaced literally, one
/// after another, so a value that contains a later placeholder's text will
/// itself be substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self { text })
    }

    pub fn render(&self, entry: &LinkEntry) -> String {
        self.text
            .replace(TITLE, &entry.title)
            .replace(HEADING, &entry.title)
            .replace(URL, &entry.url)
            .replace(DESCRIPTION, &entry.description)
            .replace(IMAGE, &entry.image)
    }

    /// Render and write to `output_path`, overwriting whatever is there.
    pub fn render_to_file(&self, entry: &LinkEntry, output_path: &Path) -> Result<(), TemplateError> {
        let rendered = self.render(entry);

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(output_path, rendered)?;
        Ok(())
    }
}
