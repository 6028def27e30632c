//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services as an immutable value. Request handling never reads process-wide
//! environment variables, which keeps behaviour consistent across
//! multi-threaded runtimes and test harnesses.

use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

pub const FORMULARY_FILENAME: &str = "formulary.json";
pub const RENAL_ADJUSTMENTS_FILENAME: &str = "renal_adjustments.json";
pub const INTERACTIONS_FILENAME: &str = "interactions.json";

const DATA_DIR_NAME: &str = "data";

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig` over a reference-data directory.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DataFileMissing`] if any of the required
    /// reference data files is absent. Reference data is mandatory: the
    /// engine must not start with a partial knowledge base.
    pub fn new(data_dir: PathBuf) -> CoreResult<Self> {
        for filename in [
            FORMULARY_FILENAME,
            RENAL_ADJUSTMENTS_FILENAME,
            INTERACTIONS_FILENAME,
        ] {
            let path = data_dir.join(filename);
            if !path.is_file() {
                return Err(CoreError::DataFileMissing(path));
            }
        }

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn formulary_path(&self) -> PathBuf {
        self.data_dir.join(FORMULARY_FILENAME)
    }

    pub fn renal_adjustments_path(&self) -> PathBuf {
        self.data_dir.join(RENAL_ADJUSTMENTS_FILENAME)
    }

    pub fn interactions_path(&self) -> PathBuf {
        self.data_dir.join(INTERACTIONS_FILENAME)
    }
}

/// Resolve the reference-data directory without reading environment variables.
///
/// If `override_dir` is provided, it must be a directory containing
/// `formulary.json`. Otherwise this searches for `data/` relative to the
/// current working directory and then walks up from `CARGO_MANIFEST_DIR`,
/// so binaries run from anywhere inside the workspace find the repository's
/// seed data.
pub fn resolve_data_dir(override_dir: Option<PathBuf>) -> CoreResult<PathBuf> {
    fn looks_like_data_dir(path: &Path) -> bool {
        path.join(FORMULARY_FILENAME).is_file()
    }

    if let Some(data_dir) = override_dir {
        if data_dir.is_dir() && looks_like_data_dir(&data_dir) {
            return Ok(data_dir);
        }
        return Err(CoreError::InvalidInput(format!(
            "data directory override is not a valid reference-data directory \
             (must contain {FORMULARY_FILENAME})"
        )));
    }

    let cwd_relative = PathBuf::from(DATA_DIR_NAME);
    if cwd_relative.is_dir() && looks_like_data_dir(&cwd_relative) {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(DATA_DIR_NAME);
        if candidate.is_dir() && looks_like_data_dir(&candidate) {
            return Ok(candidate);
        }
    }

    Err(CoreError::InvalidInput(format!(
        "could not locate {DATA_DIR_NAME}/ directory containing {FORMULARY_FILENAME}"
    )))
}
