//! Image textures assigned to material map slots
//!
//! Files are decoded on a short-lived thread per request and delivered
//! through a channel that the editor drains once per frame.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use log::debug;

use crate::error::{EditorError, Result};

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tga", "webp"];

/// Larger images are scaled down to fit the device's texture limit.
pub const MAX_TEXTURE_SIZE: u32 = 4096;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Decoded RGBA8 pixels. Clones share the pixel buffer; the id identifies
/// the upload on the GPU side.
#[derive(Debug, Clone)]
pub struct TextureMap {
    pub id: u64,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<Vec<u8>>,
    /// JPEG files carry no alpha and are drawn without it
    pub opaque: bool,
}

impl PartialEq for TextureMap {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl TextureMap {
    /// Wraps decoded pixels under a fresh id.
    ///
    /// # Arguments
    /// * `name` - File name, for logging
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `rgba` - Tightly packed RGBA8 rows
    /// * `opaque` - Forces alpha to 255 for formats without transparency
    pub fn from_rgba(name: impl Into<String>, width: u32, height: u32, mut rgba: Vec<u8>, opaque: bool) -> Self {
        if opaque {
            for pixel in rgba.chunks_exact_mut(4) {
                pixel[3] = 255;
            }
        }
        Self {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            width,
            height,
            rgba: Arc::new(rgba),
            opaque,
        }
    }

    /// Reads and decodes an image file, downscaling it to the texture
    /// size limit.
    ///
    /// # Errors
    /// [`EditorError::UnsupportedFile`] for non-image extensions, and I/O
    /// or decode errors otherwise
    pub fn decode(path: &Path) -> Result<Self> {
        if !is_image_path(path) {
            return Err(EditorError::UnsupportedFile(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|source| EditorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = image::load_from_memory(&bytes).map_err(|source| EditorError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
        let image = if image.width() > MAX_TEXTURE_SIZE || image.height() > MAX_TEXTURE_SIZE {
            image.resize(MAX_TEXTURE_SIZE, MAX_TEXTURE_SIZE, image::imageops::FilterType::Triangle)
        } else {
            image
        };
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::from_rgba(name, width, height, rgba.into_raw(), is_jpeg(path)))
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// True for files whose extension names an `image/*` type we can decode.
pub fn is_image_path(path: &Path) -> bool {
    extension(path).is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

fn is_jpeg(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("jpg" | "jpeg"))
}

/// Off-thread image decoding with results polled on the frame callback.
pub struct TextureLoader {
    sender: Sender<Result<TextureMap>>,
    receiver: Receiver<Result<TextureMap>>,
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureLoader {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Starts decoding `path`. Non-image files are dropped here and
    /// `false` is returned.
    pub fn request(&self, path: PathBuf) -> bool {
        if !is_image_path(&path) {
            debug!("Ignoring non-image file {}", path.display());
            return false;
        }
        let sender = self.sender.clone();
        std::thread::spawn(move || {
            // the receiver only goes away with the editor
            let _ = sender.send(TextureMap::decode(&path));
        });
        true
    }

    /// Finished decodes in arrival order.
    pub fn poll(&self) -> Vec<Result<TextureMap>> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_image_extensions() {
        assert!(is_image_path(Path::new("bricks.PNG")));
        assert!(is_image_path(Path::new("/tmp/wood.jpeg")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("no_extension")));
    }

    #[test]
    fn test_non_image_request_is_ignored() {
        let loader = TextureLoader::new();
        assert!(!loader.request(PathBuf::from("model.obj")));
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn test_opaque_maps_drop_alpha() {
        let map = TextureMap::from_rgba("a.jpg", 1, 2, vec![10, 20, 30, 0, 1, 2, 3, 4], true);
        assert_eq!(map.rgba.as_slice(), &[10, 20, 30, 255, 1, 2, 3, 255]);
        let other = TextureMap::from_rgba("a.jpg", 1, 1, vec![0; 4], true);
        assert_ne!(map, other);
    }

    #[test]
    fn test_decode_round_trip_through_disk() {
        let dir = std::env::temp_dir().join(format!("primedit-texture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("checker.png");
        let img = image::RgbaImage::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 255, 255, 128])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        });
        img.save(&path).unwrap();

        let loader = TextureLoader::new();
        assert!(loader.request(path.clone()));
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut results = Vec::new();
        while results.is_empty() && Instant::now() < deadline {
            results = loader.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
        let map = results.pop().unwrap().unwrap();
        assert_eq!((map.width, map.height), (2, 2));
        assert!(!map.opaque);
        assert_eq!(map.rgba[3], 128);
        assert_eq!(map.name, "checker.png");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let err = TextureMap::decode(Path::new("/definitely/missing/file.png")).unwrap_err();
        assert!(matches!(err, EditorError::Io { .. }));
    }
}
