//! Mobile filesystem path helpers.
#![cfg_attr(not(target_os = "android"), allow(dead_code))]

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use fieldwork_core::files::CacheDir;
use fieldwork_core::Result;

const APP_DIR_NAME: &str = "fieldwork";

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Writable app data directory, resolved once per process.
#[must_use]
pub fn fieldwork_data_dir() -> PathBuf {
    DATA_DIR.get_or_init(resolve_data_dir).clone()
}

/// Scratch space for downloaded and signed PDFs.
pub fn cache_dir() -> Result<CacheDir> {
    CacheDir::new(fieldwork_data_dir().join("cache"))
}

fn resolve_data_dir() -> PathBuf {
    let selected = candidate_base_dirs()
        .into_iter()
        .map(|base| base.join(APP_DIR_NAME))
        .find(|candidate| ensure_writable_dir(candidate))
        .unwrap_or_else(|| std::env::temp_dir().join(APP_DIR_NAME));

    tracing::info!("Resolved mobile data directory: {}", selected.display());
    selected
}

// Android exposes no XDG dirs; TMPDIR points into the app sandbox.
fn candidate_base_dirs() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = std::env::var_os("FIELDWORK_DATA_DIR").map(PathBuf::from) {
        candidates.push(path);
    }
    if let Some(path) = dirs::data_local_dir() {
        candidates.push(path);
    }
    if let Some(path) = dirs::data_dir() {
        candidates.push(path);
    }
    for name in ["TMPDIR", "TEMP", "TMP"] {
        if let Some(path) = std::env::var_os(name).map(PathBuf::from) {
            candidates.push(path);
        }
    }
    candidates.push(std::env::temp_dir());
    candidates
}

fn ensure_writable_dir(path: &Path) -> bool {
    if std::fs::create_dir_all(path).is_err() {
        return false;
    }

    let test_file = path.join(".fieldwork-write-test");
    let Ok(mut file) = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&test_file)
    else {
        return false;
    };

    let writable = file.write_all(b"ok").is_ok();
    let _ = std::fs::remove_file(test_file);
    writable
}
