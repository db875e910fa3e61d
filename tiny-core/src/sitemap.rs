//! Sitemap generation.
//!
//! Writes a `urlset` document listing one location per rendered link.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::config::Verbosity;
use crate::progress;

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("could not write sitemap '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Sitemap writer for a set of link keys under one base URL.
#[derive(Debug)]
pub struct SitemapGenerator {
    base_url: String,
    file_name: String,
}

impl SitemapGenerator {
    pub fn new<B: Into<String>, F: Into<String>>(base_url: B, file_name: F) -> Self {
        Self {
            base_url: base_url.into(),
            file_name: file_name.into(),
        }
    }

    /// Location of a key: `{base_url}/{key}/`.
    pub fn location(&self, key: &str) -> String {
        format!("{}/{}/", self.base_url.trim_end_matches('/'), key)
    }

    /// Render the whole document.
    pub fn render<'a, I>(&self, keys: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!("<urlset xmlns=\"{SITEMAP_NAMESPACE}\">\n"));

        for key in keys {
            let loc = self.location(key);
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", html_escape::encode_text(&loc)));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    /// Write the sitemap into `output_dir`, replacing any existing one.
    pub fn generate<'a, I>(
        &self,
        output_dir: &Path,
        keys: I,
        verbosity: Verbosity,
    ) -> Result<PathBuf, SitemapError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let path = output_dir.join(&self.file_name);
        let io_err = |source| SitemapError::Io {
            path: path.clone(),
            source,
        };

        let mut file = BufWriter::new(File::create(&path).map_err(io_err)?);
        file.write_all(self.render(keys).as_bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)?;

        progress!(verbosity, "Sitemap '{}' created", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_joins_base_and_key() {
        let generator = SitemapGenerator::new("https://s.example", "sitemap.xml");
        assert_eq!(generator.location("docs"), "https://s.example/docs/");
    }

    #[test]
    fn test_location_trims_trailing_slash() {
        let generator = SitemapGenerator::new("https://s.example/", "sitemap.xml");
        assert_eq!(generator.location("docs"), "https://s.example/docs/");
    }

    #[test]
    fn test_empty_base_url() {
        let generator = SitemapGenerator::new("", "sitemap.xml");
        assert_eq!(generator.location("docs"), "/docs/");
    }

    #[test]
    fn test_render_document() {
        let generator = SitemapGenerator::new("https://s.example", "sitemap.xml");
        let xml = generator.render(["docs", "index"]);

        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n  \
             <url>\n    <loc>https://s.example/docs/</loc>\n  </url>\n  \
             <url>\n    <loc>https://s.example/index/</loc>\n  </url>\n\
             </urlset>\n"
        );
    }

    #[test]
    fn test_render_empty() {
        let generator = SitemapGenerator::new("https://s.example", "sitemap.xml");
        let xml = generator.render(std::iter::empty());

        assert!(xml.contains("<urlset"));
        assert!(!xml.contains("<url>"));
    }

    #[test]
    fn test_escapes_markup_in_location() {
        let generator = SitemapGenerator::new("https://s.example?a=1&b=2", "sitemap.xml");
        let xml = generator.render(["x"]);

        assert!(xml.contains("<loc>https://s.example?a=1&amp;b=2/x/</loc>"));
    }

    #[test]
    fn test_generate_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("map.xml"), "old").unwrap();

        let generator = SitemapGenerator::new("", "map.xml");
        let path = generator
            .generate(dir.path(), ["a"], Verbosity::Quiet)
            .unwrap();

        assert_eq!(path, dir.path().join("map.xml"));
        let xml = std::fs::read_to_string(path).unwrap();
        assert!(xml.contains("<loc>/a/</loc>"));
    }
}
