//! Decorative frame art, loaded from the frames directory.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;

use super::AssetError;
use crate::style::FrameChoice;

#[derive(Default, Clone)]
pub struct FrameLibrary {
    art: HashMap<FrameChoice, Arc<RgbaImage>>,
}

impl FrameLibrary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the art for every frame choice found in `dir`
    pub fn load(dir: &Path) -> Self {
        let mut library = Self::empty();
        for choice in FrameChoice::ALL {
            let Some(name) = choice.asset_name() else {
                continue;
            };
            match load_art(&dir.join(name)) {
                Ok(art) => {
                    log::debug!("Loaded frame art {:?} ({}x{})", choice, art.width(), art.height());
                    library.insert(choice, art);
                }
                Err(e) => log::warn!("Frame {:?} unavailable: {}", choice, e),
            }
        }
        log::info!("Loaded {} frame(s) from {}", library.art.len(), dir.display());
        library
    }

    pub fn insert(&mut self, choice: FrameChoice, art: RgbaImage) {
        self.art.insert(choice, Arc::new(art));
    }

    pub fn get(&self, choice: FrameChoice) -> Option<&RgbaImage> {
        self.art.get(&choice).map(|art| art.as_ref())
    }

    pub fn len(&self) -> usize {
        self.art.len()
    }

    pub fn is_empty(&self) -> bool {
        self.art.is_empty()
    }
}

fn load_art(path: &Path) -> Result<RgbaImage, AssetError> {
    let art = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(art.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let art = RgbaImage::from_pixel(10, 10, image::Rgba([0, 200, 0, 128]));
        art.save(dir.path().join("holly.png")).unwrap();
        std::fs::write(dir.path().join("garland.png"), b"not a png").unwrap();

        let library = FrameLibrary::load(dir.path());
        assert_eq!(library.len(), 1);
        assert_eq!(library.get(FrameChoice::Holly).unwrap().get_pixel(0, 0).0, [0, 200, 0, 128]);
        assert!(library.get(FrameChoice::Garland).is_none());
        assert!(library.get(FrameChoice::Snowflakes).is_none());
        assert!(library.get(FrameChoice::None).is_none());
    }

    #[test]
    fn test_missing_directory() {
        let library = FrameLibrary::load(Path::new("/nonexistent/stripbooth/frames"));
        assert!(library.is_empty());
    }
}
