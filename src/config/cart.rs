//! Cart Config

use std::path::PathBuf;

use clap::Args;

use crate::cart::FileSnapshotStore;

/// Local cart settings.
#[derive(Debug, Clone, Args)]
pub struct CartConfig {
    /// Directory holding the cart snapshot
    #[arg(long, env = "CART_SNAPSHOT_DIR", default_value = ".sazon")]
    pub cart_snapshot_dir: PathBuf,
}

impl CartConfig {
    /// Snapshot store rooted at the configured directory.
    #[must_use]
    pub fn snapshot_store(&self) -> FileSnapshotStore {
        FileSnapshotStore::new(self.cart_snapshot_dir.clone())
    }
}
