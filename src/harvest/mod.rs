//! Harvest module: the two phases end to end
//!
//! 1. **Enumerate**: listing rows -> popup URLs -> resolved records -> manifest
//! 2. **Fetch**: manifest -> content per record -> batch artifacts, checkpoint
//!    and reports in a run directory

#[cfg(feature = "browser")]
mod browser;
mod coordinator;

#[cfg(feature = "browser")]
pub use browser::{enumerate_with_browser, fetch_with_browser};
pub use coordinator::{
    enumerate_urls, export_report, fetch_content, http_processor, load_manifest_records,
    prepare_run, run_statistics,
};

use crate::storage::latest_run_dir;
use crate::{Result, WaymarkError};
use std::path::{Path, PathBuf};

/// Phase selection for a harvest invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Enumerate,
    Fetch,
    All,
}

impl Phase {
    pub fn enumerates(&self) -> bool {
        matches!(self, Self::Enumerate | Self::All)
    }

    pub fn fetches(&self) -> bool {
        matches!(self, Self::Fetch | Self::All)
    }
}

/// The newest run directory under `runs_root`
pub fn latest_run(runs_root: &Path) -> Result<PathBuf> {
    latest_run_dir(runs_root)?.ok_or_else(|| WaymarkError::NoRuns(runs_root.display().to_string()))
}
