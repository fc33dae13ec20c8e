//! Persistence of the selfie shared by the most recently verified user.

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Prefix the service puts in front of the base64 payload.
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// File name of the shared selfie inside the static directory.
pub const SELFIE_FILE_NAME: &str = "YotiSelfie.jpeg";

#[derive(Debug, Error)]
pub enum SelfieError {
    #[error("selfie is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("failed to write selfie to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Strip the JPEG data URI prefix, if present, and decode the remainder.
///
/// Input without the prefix is decoded as-is, so a data URI of another
/// media type fails on the `:` and `;` characters.
pub fn decode_selfie(data: &str) -> Result<Vec<u8>, SelfieError> {
    let payload = data.strip_prefix(JPEG_DATA_URI_PREFIX).unwrap_or(data);
    Ok(general_purpose::STANDARD.decode(payload)?)
}

/// Writes selfies to a single file, last writer wins.
///
/// Writes are serialized so two requests never interleave their bytes.
#[derive(Debug)]
pub struct SelfieStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SelfieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store placed at `SELFIE_FILE_NAME` inside the static directory.
    pub fn in_static_dir(static_dir: &Path) -> Self {
        Self::new(static_dir.join(SELFIE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode `data` and overwrite the shared file with it.
    pub async fn save(&self, data: &str) -> Result<usize, SelfieError> {
        let bytes = decode_selfie(data)?;

        match image::guess_format(&bytes) {
            Ok(ImageFormat::Jpeg) => {}
            Ok(other) => warn!("Selfie is {:?}, not JPEG; writing anyway", other),
            Err(_) => warn!("Selfie bytes are not a recognised image; writing anyway"),
        }

        let _guard = self.write_lock.lock().await;
        tokio::fs::write(&self.path, &bytes)
            .await
            .map_err(|source| SelfieError::Io {
                path: self.path.clone(),
                source,
            })?;

        debug!("Wrote {} byte selfie to {}", bytes.len(), self.path.display());
        Ok(bytes.len())
    }
}
