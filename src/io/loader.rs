use std::{
    collections::HashMap,
    fmt, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Resource `{name}` is unavailable: {}", describe_attempts(.attempts))]
    Unavailable { name: String, attempts: Vec<Attempt> },
}

/// Outcome of a single failed lookup, kept for the error message.
#[derive(Debug)]
pub struct Attempt {
    pub source: String,
    pub reason: String,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.source, self.reason)
    }
}

fn describe_attempts(attempts: &[Attempt]) -> String {
    if attempts.is_empty() {
        return "no sources configured".into();
    }

    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A place where named resources can be looked up. Each call is a single attempt.
pub trait Source {
    fn describe(&self) -> String;

    /// Returns `Ok(None)` if the resource does not exist in this source.
    fn fetch(&self, name: &str) -> std::io::Result<Option<String>>;
}

/// Resolves names relative to a directory on the local file system.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Source for DirectorySource {
    fn describe(&self) -> String {
        format!("directory {:?}", self.root)
    }

    fn fetch(&self, name: &str) -> std::io::Result<Option<String>> {
        match fs::read_to_string(self.root.join(name)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Serves resources from memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(name.into(), text.into());
        self
    }
}

impl Source for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} entries)", self.entries.len())
    }

    fn fetch(&self, name: &str) -> std::io::Result<Option<String>> {
        Ok(self.entries.get(name).cloned())
    }
}

/// Tries an ordered chain of sources and returns the first hit.
#[derive(Default)]
pub struct Loader {
    sources: Vec<Box<dyn Source>>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that only looks into a local directory.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::new().with_source(DirectorySource::new(root))
    }

    /// Appends a fallback source; sources are tried in insertion order.
    pub fn with_source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn load(&self, name: &str) -> Result<String, LoadError> {
        let mut attempts = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            debug!("Look up {name:?} in {}", source.describe());
            match source.fetch(name) {
                Ok(Some(text)) => {
                    debug!("Loaded {name:?} ({} bytes)", text.len());
                    return Ok(text);
                }
                Ok(None) => attempts.push(Attempt {
                    source: source.describe(),
                    reason: "not found".into(),
                }),
                Err(e) => attempts.push(Attempt {
                    source: source.describe(),
                    reason: e.to_string(),
                }),
            }
        }

        Err(LoadError::Unavailable {
            name: name.to_string(),
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::tests::test_instances_directory;

    struct Broken;

    impl Source for Broken {
        fn describe(&self) -> String {
            "broken".into()
        }

        fn fetch(&self, _name: &str) -> std::io::Result<Option<String>> {
            Err(std::io::Error::other("offline"))
        }
    }

    #[test]
    fn local_directory() {
        let loader = Loader::local(test_instances_directory("slalom"));
        let text = loader.load("small.in").unwrap();
        assert!(text.starts_with("3"));
    }

    #[test]
    fn falls_back_in_order() {
        let loader = Loader::new()
            .with_source(Broken)
            .with_source(MemorySource::new().with("a.in", "first"))
            .with_source(MemorySource::new().with("a.in", "second"));

        assert_eq!(loader.load("a.in").unwrap(), "first");
    }

    #[test]
    fn reports_every_attempt() {
        let loader = Loader::local(test_instances_directory("slalom")).with_source(Broken);
        let err = loader.load("does-not-exist.in").unwrap_err();

        let LoadError::Unavailable { name, attempts } = &err;
        assert_eq!(name, "does-not-exist.in");
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].reason, "not found");
        assert_eq!(attempts[1].reason, "offline");

        let msg = err.to_string();
        assert!(msg.contains("does-not-exist.in"), "{msg}");
        assert!(msg.contains("offline"), "{msg}");
    }

    #[test]
    fn no_sources() {
        let err = Loader::new().load("x").unwrap_err();
        assert!(err.to_string().contains("no sources configured"));
    }
}
