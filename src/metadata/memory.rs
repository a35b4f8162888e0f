use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{GatewayError, MetadataGateway};

/// Keeps keyword strings in a map instead of image files
#[derive(Debug, Default)]
pub struct MemoryGateway {
    keywords: Mutex<HashMap<PathBuf, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords(self, path: impl Into<PathBuf>, raw: &str) -> Self {
        self.keywords
            .lock()
            .unwrap()
            .insert(path.into(), raw.to_string());
        self
    }

    /// What is stored for `path`, if anything
    pub fn stored(&self, path: impl AsRef<Path>) -> Option<String> {
        self.keywords.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl MetadataGateway for MemoryGateway {
    fn read_keywords(&self, path: &Path) -> Result<String, GatewayError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GatewayError::Tool(format!(
                "simulated read failure for {}",
                path.display()
            )));
        }
        self.keywords
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    fn write_keywords(&self, path: &Path, raw: &str) -> Result<(), GatewayError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::Tool(format!(
                "simulated write failure for {}",
                path.display()
            )));
        }
        self.keywords
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), raw.to_string());
        Ok(())
    }
}
