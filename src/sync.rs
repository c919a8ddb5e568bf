use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{anyhow, bail, Context};
use color_eyre::Result;
use log::info;

/// Default name of the consolidated export, as consumed by the BI report.
pub const DEFAULT_EXPORT_NAME: &str = "cartola_latest.csv";

pub const EXPORT_DIR_VAR: &str = "CARTOLA_EXPORT_DIR";
pub const DRIVE_FOLDER_NAME_VAR: &str = "GOOGLE_DRIVE_FOLDER_NAME";

const DEFAULT_DRIVE_FOLDER_NAME: &str = "LOOKER";

/// Sync settings, resolved from the environment exactly once at startup and
/// handed to collaborators explicitly. Business logic never reads the
/// environment on its own.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Local directory mirrored to the Drive folder (a synced mount).
    pub export_dir: Option<PathBuf>,
    /// Drive folder the BI report reads from; only used in operator-facing
    /// guidance.
    pub drive_folder_name: String,
}

impl SyncConfig {
    pub fn from_env() -> Self {
        Self {
            export_dir: non_empty(EXPORT_DIR_VAR).map(PathBuf::from),
            drive_folder_name: non_empty(DRIVE_FOLDER_NAME_VAR)
                .unwrap_or_else(|| DEFAULT_DRIVE_FOLDER_NAME.to_owned()),
        }
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Uploader seam: takes a local file and a target name, returns an opaque
/// identifier of the uploaded object. The Google Drive and Sheets clients
/// are external collaborators behind this trait.
pub trait StatementSink {
    fn upload(&self, local: &Path, title: &str) -> Result<String>;
}

/// Built-in sink: copies the export into the configured local directory
/// (typically a folder the Drive client keeps in sync) and returns the
/// destination path.
#[derive(Debug)]
pub struct FolderSink {
    dir: PathBuf,
}

impl FolderSink {
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let dir = config.export_dir.clone().ok_or_else(|| {
            anyhow!(
                "No sync destination configured. Set {EXPORT_DIR_VAR} to the local folder synced \
                 with your Drive folder '{}', and share that folder with your service account \
                 (Editor).",
                config.drive_folder_name
            )
        })?;
        if !dir.is_dir() {
            bail!(
                "Sync destination {dir:?} does not exist. Create it, or point {EXPORT_DIR_VAR} \
                 at the synced folder for '{}'.",
                config.drive_folder_name
            );
        }
        Ok(Self { dir })
    }
}

impl StatementSink for FolderSink {
    fn upload(&self, local: &Path, title: &str) -> Result<String> {
        if !local.exists() {
            bail!("No local file to upload: {local:?}");
        }
        let dest = self.dir.join(title);
        fs::copy(local, &dest)
            .with_context(|| format!("Could not copy {local:?} into sync folder {:?}", self.dir))?;
        info!("uploaded {local:?} as {title}");
        Ok(dest.display().to_string())
    }
}
