//! GStreamer pipeline for webcam preview and still capture.
//!
//! ```text
//! v4l2src ! videoconvert ! videoscale ! capsfilter ! [videoflip] ! tee
//!     tee. ! queue ! gtk4paintablesink      (preview)
//!     tee. ! queue ! videoconvert ! appsink (RGBA stills)
//! ```

use std::cell::RefCell;

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use gtk4 as gtk;
use image::RgbaImage;
use thiserror::Error;

use crate::camera::{Frame, FrameSource};
use crate::config::{self, CameraOptions};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("GStreamer error: {0}")]
    Gstreamer(#[from] glib::Error),
    #[error("GStreamer bool error: {0}")]
    GstreamerBool(#[from] glib::BoolError),
    #[error("Failed to create element: {0}")]
    ElementCreation(String),
    #[error("Failed to link {0}")]
    Link(String),
    #[error("State change failed")]
    StateChange,
}

/// Webcam pipeline feeding the preview paintable and the still grabber
pub struct VideoPipeline {
    pipeline: gst::Pipeline,
    paintable: gtk::gdk::Paintable,
    appsink: gst_app::AppSink,
    bus_watch: RefCell<Option<gst::bus::BusWatchGuard>>,
}

fn make(factory: &str) -> Result<gst::Element, PipelineError> {
    gst::ElementFactory::make(factory)
        .build()
        .map_err(|_| PipelineError::ElementCreation(factory.into()))
}

impl VideoPipeline {
    /// Create the pipeline for the configured camera
    pub fn new(options: &CameraOptions) -> Result<Self, PipelineError> {
        gst::init()?;
        gstgtk4::plugin_register_static()?;

        let pipeline = gst::Pipeline::new();

        // Source: V4L2 webcam
        let source = gst::ElementFactory::make("v4l2src")
            .property("device", &options.device)
            .build()
            .map_err(|_| PipelineError::ElementCreation("v4l2src".into()))?;

        let convert = make("videoconvert")?;
        let scale = make("videoscale")?;

        // Resolution and frame rate constraint
        let caps = gst::Caps::builder("video/x-raw")
            .field("width", options.width as i32)
            .field("height", options.height as i32)
            .field("framerate", gst::Fraction::new(config::PREVIEW_FPS as i32, 1))
            .build();
        let capsfilter = gst::ElementFactory::make("capsfilter")
            .property("caps", &caps)
            .build()
            .map_err(|_| PipelineError::ElementCreation("capsfilter".into()))?;

        let tee = make("tee")?;

        // Preview branch
        let preview_queue = make("queue")?;
        let sink = make("gtk4paintablesink")?;
        let paintable = sink.property::<gtk::gdk::Paintable>("paintable");

        // Still branch: keep only the newest RGBA frame
        let still_queue = gst::ElementFactory::make("queue")
            .property_from_str("leaky", "downstream")
            .property("max-size-buffers", 1u32)
            .build()
            .map_err(|_| PipelineError::ElementCreation("queue".into()))?;
        let still_convert = make("videoconvert")?;
        let appsink = gst_app::AppSink::builder()
            .caps(
                &gst::Caps::builder("video/x-raw")
                    .field("format", "RGBA")
                    .build(),
            )
            .max_buffers(1)
            .drop(true)
            .sync(false)
            .build();

        let mut head = vec![source, convert, scale, capsfilter];
        if options.mirrored {
            let flip = gst::ElementFactory::make("videoflip")
                .property_from_str("method", "horizontal-flip")
                .build()
                .map_err(|_| PipelineError::ElementCreation("videoflip".into()))?;
            head.push(flip);
        }
        head.push(tee.clone());

        pipeline.add_many(&head)?;
        pipeline.add_many([&preview_queue, &sink, &still_queue, &still_convert])?;
        pipeline.add(&appsink)?;

        gst::Element::link_many(&head).map_err(|_| PipelineError::Link("camera chain".into()))?;
        gst::Element::link_many([&tee, &preview_queue, &sink])
            .map_err(|_| PipelineError::Link("preview branch".into()))?;
        gst::Element::link_many([
            &tee,
            &still_queue,
            &still_convert,
            appsink.upcast_ref::<gst::Element>(),
        ])
        .map_err(|_| PipelineError::Link("still branch".into()))?;

        log::info!(
            "Camera pipeline built for {} at {}x{} (mirrored: {})",
            options.device,
            options.width,
            options.height,
            options.mirrored
        );

        Ok(Self {
            pipeline,
            paintable,
            appsink,
            bus_watch: RefCell::new(None),
        })
    }

    /// Get the paintable for use in GTK widgets
    pub fn paintable(&self) -> &gtk::gdk::Paintable {
        &self.paintable
    }

    /// Handle for grabbing stills from the running pipeline
    pub fn camera(&self) -> PipelineCamera {
        PipelineCamera {
            appsink: self.appsink.clone(),
            next_seq: 0,
        }
    }

    /// Start the pipeline
    pub fn play(&self) -> Result<(), PipelineError> {
        log::info!("Starting video pipeline");
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|_| PipelineError::StateChange)?;
        Ok(())
    }

    /// Stop the pipeline
    pub fn stop(&self) -> Result<(), PipelineError> {
        log::info!("Stopping video pipeline");
        self.pipeline
            .set_state(gst::State::Null)
            .map_err(|_| PipelineError::StateChange)?;
        Ok(())
    }

    /// Log errors and warnings posted on the pipeline bus
    pub fn setup_bus_watch(&self) {
        let Some(bus) = self.pipeline.bus() else {
            return;
        };
        let watch = bus.add_watch_local(|_, msg| {
            match msg.view() {
                gst::MessageView::Error(err) => {
                    log::error!("Camera pipeline error: {} ({:?})", err.error(), err.debug());
                }
                gst::MessageView::Warning(warning) => {
                    log::warn!("Camera pipeline warning: {}", warning.error());
                }
                gst::MessageView::Eos(_) => log::warn!("Camera stream ended"),
                _ => {}
            }
            glib::ControlFlow::Continue
        });
        match watch {
            Ok(guard) => *self.bus_watch.borrow_mut() = Some(guard),
            Err(e) => log::error!("Failed to watch pipeline bus: {}", e),
        }
    }
}

impl Drop for VideoPipeline {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Grabs the newest frame the still branch has seen
pub struct PipelineCamera {
    appsink: gst_app::AppSink,
    next_seq: u64,
}

impl PipelineCamera {
    fn sample_to_image(sample: &gst::Sample) -> Option<RgbaImage> {
        let buffer = sample.buffer()?;
        let info = gst_video::VideoInfo::from_caps(sample.caps()?).ok()?;
        let map = buffer.map_readable().ok()?;

        let (width, height) = (info.width(), info.height());
        let stride = info.stride()[0] as usize;
        let row_bytes = width as usize * 4;
        let data = map.as_slice();

        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            pixels.extend_from_slice(data.get(start..start + row_bytes)?);
        }
        RgbaImage::from_raw(width, height, pixels)
    }
}

impl FrameSource for PipelineCamera {
    fn grab_frame(&mut self) -> Option<Frame> {
        let sample = self
            .appsink
            .property::<Option<gst::Sample>>("last-sample")?;
        let image = Self::sample_to_image(&sample)?;
        let seq = self.next_seq;
        self.next_seq += 1;
        Some(Frame::new(seq, image))
    }
}
