//! Camera capability: single-frame grabs from the live feed.

use std::sync::Arc;

use image::RgbaImage;

/// A captured still. Cloning shares the pixel data.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Capture order assigned by the source
    pub seq: u64,
    pub image: Arc<RgbaImage>,
}

impl Frame {
    pub fn new(seq: u64, image: RgbaImage) -> Self {
        Self {
            seq,
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Anything that can hand out the current camera frame on demand.
///
/// `None` means no frame was available at that instant (camera not ready,
/// device unplugged). Callers treat it as a missed shot, not an error.
pub trait FrameSource {
    fn grab_frame(&mut self) -> Option<Frame>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn grab_frame(&mut self) -> Option<Frame> {
        (**self).grab_frame()
    }
}
