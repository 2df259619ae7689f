use base64::Engine;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Directory under the media root that recipe images are written to
pub const RECIPE_IMAGE_DIR: &str = "recipes/images";

const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("png", "png"),
    ("jpeg", "jpg"),
    ("jpg", "jpg"),
    ("gif", "gif"),
    ("webp", "webp"),
];

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Image must be a base64 data URI")]
    InvalidDataUri,

    #[error("Unsupported image type '{0}'")]
    UnsupportedType(String),

    #[error("Image is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Image is empty")]
    Empty,

    #[error("Failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Errors caused by the uploaded payload rather than the server
    pub fn is_client_error(&self) -> bool {
        !matches!(self, MediaError::Io(_))
    }
}

/// A decoded upload ready to be written
#[derive(Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Parse `data:image/<type>;base64,<payload>`
pub fn decode_data_uri(uri: &str) -> Result<DecodedImage, MediaError> {
    let rest = uri.trim().strip_prefix("data:image/").ok_or(MediaError::InvalidDataUri)?;
    let (mime, payload) = rest.split_once(";base64,").ok_or(MediaError::InvalidDataUri)?;

    let mime = mime.to_ascii_lowercase();
    let extension = ACCEPTED_TYPES
        .iter()
        .find(|(name, _)| *name == mime)
        .map(|(_, ext)| *ext)
        .ok_or(MediaError::UnsupportedType(mime))?;

    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    if bytes.is_empty() {
        return Err(MediaError::Empty);
    }

    Ok(DecodedImage { extension, bytes })
}

/// Writes uploaded images below a root directory, content addressed by
/// SHA-256 so identical uploads share a file.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decode and persist a data URI, returning the path relative to the root
    pub async fn save_image(&self, data_uri: &str) -> Result<String, MediaError> {
        let image = decode_data_uri(data_uri)?;

        let digest = Sha256::digest(&image.bytes);
        let hash: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
        let relative = format!("{}/{}.{}", RECIPE_IMAGE_DIR, hash, image.extension);

        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &image.bytes).await?;

        debug!("Stored image {} ({} bytes)", relative, image.bytes.len());
        Ok(relative)
    }
}
