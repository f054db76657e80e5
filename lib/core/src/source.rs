//! Configuration source resolution chain.
//!
//! Every declaration catalog is read from an ordered chain of sources: a
//! local override file, a default file in the configuration directory, and
//! finally a default packaged into the binary. The first source whose
//! content parses into something usable wins. Sources that are missing,
//! unreadable or malformed are logged and skipped, never fatal.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A single place configuration content can come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A file on disk; may not exist.
    File(PathBuf),
    /// Content compiled into the binary.
    Packaged {
        /// Name used in log output.
        name: &'static str,
        /// The packaged document.
        contents: &'static str,
    },
}

impl ConfigSource {
    /// Creates a file source.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Creates a packaged source.
    #[must_use]
    pub const fn packaged(name: &'static str, contents: &'static str) -> Self {
        Self::Packaged { name, contents }
    }

    /// Reads the source content, or `None` if it is absent or unreadable.
    fn read(&self) -> Option<String> {
        match self {
            Self::File(path) => match std::fs::read_to_string(path) {
                Ok(content) => Some(content),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "configuration file not present");
                    None
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read configuration file");
                    None
                }
            },
            Self::Packaged { contents, .. } => Some((*contents).to_string()),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Packaged { name, .. } => write!(f, "packaged:{name}"),
        }
    }
}

/// Content parsed from one source of a chain.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    /// Where the content came from.
    pub source: ConfigSource,
    /// The parsed content.
    pub value: T,
}

/// An ordered list of configuration sources.
#[derive(Debug, Clone, Default)]
pub struct SourceChain {
    sources: Vec<ConfigSource>,
}

impl SourceChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the standard chain: `<dir>/<local>`, `<dir>/<default>`, then
    /// the packaged document (if any).
    #[must_use]
    pub fn standard(
        config_dir: &Path,
        local_file: &str,
        default_file: &str,
        packaged: Option<ConfigSource>,
    ) -> Self {
        let mut chain = Self::new()
            .with_source(ConfigSource::file(config_dir.join(local_file)))
            .with_source(ConfigSource::file(config_dir.join(default_file)));
        if let Some(packaged) = packaged {
            chain = chain.with_source(packaged);
        }
        chain
    }

    /// Appends a source.
    #[must_use]
    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Returns the sources in resolution order.
    #[must_use]
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// Parses every readable source, skipping those that fail to parse.
    pub fn load_all<T, E, F>(&self, parse: F) -> Vec<Loaded<T>>
    where
        E: fmt::Display,
        F: Fn(&str) -> Result<T, E>,
    {
        self.sources
            .iter()
            .filter_map(|source| {
                let content = source.read()?;
                match parse(&content) {
                    Ok(value) => Some(Loaded {
                        source: source.clone(),
                        value,
                    }),
                    Err(e) => {
                        warn!(source = %source, error = %e, "failed to parse configuration source");
                        None
                    }
                }
            })
            .collect()
    }

    /// Returns the first source whose parsed content satisfies `accept`.
    pub fn first_accepted<T, E, F, A>(&self, parse: F, accept: A) -> Option<Loaded<T>>
    where
        E: fmt::Display,
        F: Fn(&str) -> Result<T, E>,
        A: Fn(&T) -> bool,
    {
        for source in &self.sources {
            let Some(content) = source.read() else {
                continue;
            };
            match parse(&content) {
                Ok(value) if accept(&value) => {
                    debug!(source = %source, "configuration source selected");
                    return Some(Loaded {
                        source: source.clone(),
                        value,
                    });
                }
                Ok(_) => {
                    warn!(source = %source, "configuration source is empty, trying next");
                }
                Err(e) => {
                    warn!(source = %source, error = %e, "failed to parse configuration source");
                }
            }
        }
        None
    }

    /// Returns the first source that parses to a non-empty list.
    pub fn first_non_empty<T, E, F>(&self, parse: F) -> Option<Loaded<Vec<T>>>
    where
        E: fmt::Display,
        F: Fn(&str) -> Result<Vec<T>, E>,
    {
        self.first_accepted(parse, |items| !items.is_empty())
    }
}
