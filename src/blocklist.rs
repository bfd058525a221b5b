//! Blocklist management module
//!
//! Handles loading and querying corpora of leaked passwords.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};
use thiserror::Error;

pub const ENV_BLOCKLIST_PATH: &str = "PWD_BLOCKLIST_PATH";
const DEFAULT_BLOCKLIST_PATH: &str = "./rockyou.txt";

#[derive(Error, Debug)]
pub enum BlocklistError {
    #[error("Blocklist file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read blocklist file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Blocklist file is empty")]
    EmptyFile,
    #[error("Failed to provision blocklist: {0}")]
    Provisioning(String),
}

/// Answers whether a password appears in a leaked-password corpus.
///
/// Matching is exact and case-sensitive against whitespace-trimmed entries.
pub trait BlocklistSource: Send + Sync {
    fn lookup(&self, password: &str) -> Result<bool, BlocklistError>;
}

/// Makes a corpus file available at `path` when it does not exist yet,
/// e.g. by downloading it.
pub trait CorpusProvisioner: Send + Sync {
    fn provision(&self, path: &Path) -> Result<(), BlocklistError>;
}

/// Returns the blocklist file path.
///
/// Priority:
/// 1. Environment variable `PWD_BLOCKLIST_PATH`
/// 2. Default path `./rockyou.txt`
pub fn get_blocklist_path() -> PathBuf {
    std::env::var(ENV_BLOCKLIST_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_BLOCKLIST_PATH))
}

/// A line-oriented blocklist file, one password per line.
///
/// The file is read on the first lookup and kept in memory afterwards. A
/// failed load is not remembered, so the next lookup tries again. Loads are
/// serialized: a lookup arriving while the file is being provisioned or read
/// waits for that load instead of reading a partial file.
pub struct FileBlocklist {
    path: PathBuf,
    provisioner: Option<Box<dyn CorpusProvisioner>>,
    entries: RwLock<Option<HashSet<String>>>,
    loading: Mutex<()>,
}

impl FileBlocklist {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            provisioner: None,
            entries: RwLock::new(None),
            loading: Mutex::new(()),
        }
    }

    /// Uses the path from [`get_blocklist_path`].
    pub fn from_env() -> Self {
        Self::new(get_blocklist_path())
    }

    /// Installs a provisioner that runs when the file is missing.
    pub fn with_provisioner<C: CorpusProvisioner + 'static>(mut self, provisioner: C) -> Self {
        self.provisioner = Some(Box::new(provisioner));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file if it is not loaded yet and returns the entry count.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File does not exist and cannot be provisioned
    /// - File cannot be read
    /// - File is empty
    pub fn load(&self) -> Result<usize, BlocklistError> {
        if let Some(count) = self.loaded_count() {
            return Ok(count);
        }

        let _loading = self.loading.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished loading while we waited.
        if let Some(count) = self.loaded_count() {
            return Ok(count);
        }

        let set = self.read_entries()?;
        let count = set.len();

        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(set);

        Ok(count)
    }

    fn loaded_count(&self) -> Option<usize> {
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(HashSet::len)
    }

    fn read_entries(&self) -> Result<HashSet<String>, BlocklistError> {
        let path = self.path.as_path();

        if !path.exists() {
            if let Some(provisioner) = &self.provisioner {
                #[cfg(feature = "tracing")]
                tracing::info!("Provisioning blocklist at {:?}", path);

                if let Err(e) = provisioner.provision(path) {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Blocklist provisioning FAILED for {:?}: {}", path, e);
                    return Err(e);
                }
            }
        }

        if !path.exists() {
            #[cfg(feature = "tracing")]
            tracing::error!("Blocklist initialization FAILED: FileNotFound {:?}", path);
            return Err(BlocklistError::FileNotFound(path.to_path_buf()));
        }

        // Leaked corpora are not always valid UTF-8.
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);

        if content.trim().is_empty() {
            #[cfg(feature = "tracing")]
            tracing::error!("Blocklist initialization FAILED: Empty file {:?}", path);
            return Err(BlocklistError::EmptyFile);
        }

        let set = parse_entries(content.lines());

        #[cfg(feature = "tracing")]
        tracing::info!("Blocklist initialized: {} passwords from {:?}", set.len(), path);

        Ok(set)
    }
}

impl BlocklistSource for FileBlocklist {
    fn lookup(&self, password: &str) -> Result<bool, BlocklistError> {
        self.load()?;
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.as_ref().is_some_and(|set| set.contains(password)))
    }
}

/// A blocklist held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlocklist {
    entries: HashSet<String>,
}

impl InMemoryBlocklist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: parse_entries(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BlocklistSource for InMemoryBlocklist {
    fn lookup(&self, password: &str) -> Result<bool, BlocklistError> {
        Ok(self.entries.contains(password))
    }
}

fn parse_entries<I, S>(lines: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|l| l.as_ref().trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
