//! Host handoff type for loaded S-parameter files
//!
//! The host loads Touchstone files and hands them to the evaluator as a
//! read-only pool; the evaluator never mutates the pool or the flags.

use std::path::PathBuf;

use crate::network::Network;

/// One loaded S-parameter file as presented by the host
#[derive(Debug, Clone)]
pub struct LoadedSParamFile {
    /// Source file path
    pub path: PathBuf,
    /// The parsed network; `network.name` is the display name patterns match
    pub network: Network,
    /// Whether the file is currently selected in the host UI
    pub selected: bool,
}

impl LoadedSParamFile {
    pub fn new(path: impl Into<PathBuf>, network: Network, selected: bool) -> Self {
        Self {
            path: path.into(),
            network,
            selected,
        }
    }
}
