//! Timed capture of rendered frames.
//!
//! A [`Recorder`] decides when a frame should be captured and collects the
//! frames of one fixed-length session. When the session is over it hands out a
//! [`Recording`], which encodes itself in the first [`CaptureFormat`] the
//! frame size allows. [`FrameCapture`] reads the composited frame back from
//! the GPU.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::*;
use image::{
    Delay, Frame, RgbaImage,
    codecs::gif::{GifEncoder, Repeat},
    imageops::{self, FilterType},
};
use instant::Duration;

pub const CAPTURE_FPS: u32 = 15;
pub const RECORD_SECONDS: f32 = 6.0;
/// Captured frames are scaled down to at most this width.
pub const MAX_CAPTURE_WIDTH: u32 = 640;

/// Output containers, most preferred first in [`CaptureFormat::PREFERENCE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaptureFormat {
    Gif,
    PngSequence,
}

impl CaptureFormat {
    pub const PREFERENCE: [CaptureFormat; 2] = [CaptureFormat::Gif, CaptureFormat::PngSequence];

    /// GIF stores its logical screen size in 16 bits.
    pub fn is_supported(self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        match self {
            CaptureFormat::Gif => width <= u16::MAX as u32 && height <= u16::MAX as u32,
            CaptureFormat::PngSequence => true,
        }
    }

    /// First format of the preference list that can hold frames of this size.
    pub fn preferred(width: u32, height: u32) -> Option<Self> {
        Self::PREFERENCE
            .into_iter()
            .find(|format| format.is_supported(width, height))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordSettings {
    pub fps: u32,
    pub seconds: f32,
    pub max_width: u32,
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            fps: CAPTURE_FPS,
            seconds: RECORD_SECONDS,
            max_width: MAX_CAPTURE_WIDTH,
        }
    }
}

impl RecordSettings {
    pub fn frame_interval(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }

    /// Size frames are stored at: `width` x `height` shrunk to fit `max_width`.
    pub fn capture_size(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width || width == 0 {
            return (width, height);
        }
        let scale = self.max_width as f32 / width as f32;
        (self.max_width, ((height as f32 * scale).round() as u32).max(1))
    }
}

#[derive(Debug)]
struct Session {
    started: f32,
    next_capture: f32,
    format: CaptureFormat,
    size: (u32, u32),
    frames: Vec<RgbaImage>,
}

/// Frames of one finished session.
#[derive(Debug)]
pub struct Recording {
    pub format: CaptureFormat,
    pub fps: u32,
    pub frames: Vec<RgbaImage>,
}

#[derive(Debug, Default)]
pub struct Recorder {
    settings: RecordSettings,
    session: Option<Session>,
}

impl Recorder {
    pub fn new(settings: RecordSettings) -> Self {
        Self {
            settings,
            session: None,
        }
    }

    pub fn settings(&self) -> &RecordSettings {
        &self.settings
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn format(&self) -> Option<CaptureFormat> {
        self.session.as_ref().map(|session| session.format)
    }

    pub fn frame_count(&self) -> usize {
        self.session.as_ref().map_or(0, |session| session.frames.len())
    }

    /// Starts a session for frames of the given surface size.
    ///
    /// Returns the chosen format, or `None` when a session is already running
    /// or no format can hold frames of this size.
    pub fn start(&mut self, now: f32, width: u32, height: u32) -> Option<CaptureFormat> {
        if self.session.is_some() {
            log::info!("already recording");
            return None;
        }
        let size = self.settings.capture_size(width, height);
        let Some(format) = CaptureFormat::preferred(size.0, size.1) else {
            log::error!("no capture format supports {}x{} frames", size.0, size.1);
            return None;
        };
        log::info!(
            "recording {}s at {} fps as {:?} ({}x{})",
            self.settings.seconds,
            self.settings.fps,
            format,
            size.0,
            size.1
        );
        self.session = Some(Session {
            started: now,
            next_capture: now,
            format,
            size,
            frames: Vec::new(),
        });
        Some(format)
    }

    pub fn should_capture(&self, now: f32) -> bool {
        self.session.as_ref().is_some_and(|session| {
            now >= session.next_capture && now < session.started + self.settings.seconds
        })
    }

    pub fn push_frame(&mut self, now: f32, frame: RgbaImage) {
        let interval = self.settings.frame_interval();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let frame = if frame.dimensions() == session.size {
            frame
        } else {
            imageops::resize(&frame, session.size.0, session.size.1, FilterType::Triangle)
        };
        session.frames.push(frame);
        session.next_capture += interval;
        // a stalled frame loop must not trigger a burst of catch-up captures
        if session.next_capture < now {
            session.next_capture = now + interval;
        }
    }

    /// Ends the session once its duration has passed.
    pub fn finish_if_due(&mut self, now: f32) -> Option<Recording> {
        let due = self
            .session
            .as_ref()
            .is_some_and(|session| now >= session.started + self.settings.seconds);
        if !due {
            return None;
        }
        let session = self.session.take()?;
        log::info!("recording finished with {} frames", session.frames.len());
        Some(Recording {
            format: session.format,
            fps: self.settings.fps,
            frames: session.frames,
        })
    }
}

impl Recording {
    pub fn frame_delay(&self) -> Delay {
        Delay::from_numer_denom_ms(1000, self.fps.max(1))
    }

    pub fn encode_gif<W: Write>(&self, writer: W) -> Result<()> {
        if self.frames.is_empty() {
            bail!("nothing to encode, the recording holds no frames");
        }
        let mut encoder = GifEncoder::new_with_speed(writer, 10);
        encoder.set_repeat(Repeat::Infinite)?;
        let delay = self.frame_delay();
        encoder.encode_frames(
            self.frames
                .iter()
                .map(|frame| Frame::from_parts(frame.clone(), 0, 0, delay)),
        )?;
        Ok(())
    }

    pub fn write_png_sequence(&self, dir: &Path) -> Result<()> {
        if self.frames.is_empty() {
            bail!("nothing to write, the recording holds no frames");
        }
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        for (index, frame) in self.frames.iter().enumerate() {
            let path = dir.join(format!("frame-{index:04}.png"));
            frame
                .save_with_format(&path, image::ImageFormat::Png)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        Ok(())
    }

    /// Writes `<dir>/<stem>.gif` or a `<dir>/<stem>/` directory of PNG frames.
    pub fn save(&self, dir: &Path, stem: &str) -> Result<PathBuf> {
        match self.format {
            CaptureFormat::Gif => {
                let path = dir.join(format!("{stem}.gif"));
                let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
                self.encode_gif(BufWriter::new(file))?;
                Ok(path)
            }
            CaptureFormat::PngSequence => {
                let path = dir.join(stem);
                self.write_png_sequence(&path)?;
                Ok(path)
            }
        }
    }
}

/// File stem of a recording started at `unix_seconds`.
pub fn recording_stem(unix_seconds: u64) -> String {
    format!("holiday-{unix_seconds}")
}

/// Row pitch of a texture-to-buffer copy of `width` RGBA8 pixels.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * 4).div_ceil(align) * align
}

/// Strips the row padding of a readback buffer and normalises BGRA to RGBA.
pub fn unpad_rows(data: &[u8], width: u32, height: u32, bgra: bool) -> Option<RgbaImage> {
    let padded = padded_bytes_per_row(width) as usize;
    let row = width as usize * 4;
    if data.len() < padded * height as usize {
        return None;
    }
    let mut pixels = Vec::with_capacity(row * height as usize);
    for chunk in data.chunks(padded).take(height as usize) {
        pixels.extend_from_slice(&chunk[..row]);
    }
    if bgra {
        pixels.chunks_exact_mut(4).for_each(|pixel| pixel.swap(0, 2));
    }
    RgbaImage::from_raw(width, height, pixels)
}

/// Offscreen copy of the final frame that can be read back on the CPU.
#[derive(Debug)]
pub struct FrameCapture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    bgra: bool,
}

impl FrameCapture {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Capture Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Capture Buffer"),
            size: (padded_bytes_per_row(width) * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let bgra = matches!(
            format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        );
        Self {
            texture,
            view,
            buffer,
            width,
            height,
            bgra,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn copy_to_buffer(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row(self.width)),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Maps the buffer after the copy was submitted and returns the frame.
    pub async fn read(&self, device: &wgpu::Device) -> Result<RgbaImage> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            // the receiver is gone if the read was abandoned
            let _ = tx.send(result);
        });
        device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })?;
        rx.receive()
            .await
            .ok_or_else(|| anyhow!("frame readback was cancelled"))??;
        let image = {
            let data = slice.get_mapped_range();
            unpad_rows(&data, self.width, self.height, self.bgra)
        };
        self.buffer.unmap();
        image.ok_or_else(|| anyhow!("frame readback returned a truncated buffer"))
    }
}
