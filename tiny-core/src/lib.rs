/// Log a progress line, but only when the build is verbose.
macro_rules! progress {
    ($verbosity:expr, $($arg:tt)+) => {
        if $verbosity.is_verbose() {
            tracing::info!($($arg)+);
        }
    };
}
pub(crate) use progress;

pub mod builder;
pub mod config;
pub mod registry;
pub mod sitemap;
pub mod template;

// Re-export main types
pub use builder::{BuildError, BuildOptions, BuildReport, Site, SiteBuilder, SkipReason, build_site};
pub use config::{SiteConfig, Verbosity};
pub use registry::{LinkDefinition, LinkEntry, LinkRegistry, ROOT_KEY, RegistryError};
pub use sitemap::SitemapGenerator;
pub use template::{Template, TemplateError};
