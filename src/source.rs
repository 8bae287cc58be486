//! Sequential video frame sources.
//!
//! The sampler only needs a forward-only stream of RGB frames plus the
//! container's idea of how many frames there are. [`VideoSource`] captures
//! exactly that, so any decoder can be plugged in:
//!
//! - [`MediaFile`] decodes a file on disk through FFmpeg.
//! - [`FrameSequence`] serves frames already held in memory.
//!
//! # Example
//!
//! ```no_run
//! use looking_glass::{GridError, MediaFile, VideoSource};
//!
//! let mut source = MediaFile::open("input.mp4")?;
//! println!("{} frames at {:.2} fps", source.frame_count(), source.frames_per_second());
//! while let Some(frame) = source.read_frame()? {
//!     println!("{}x{}", frame.width(), frame.height());
//! }
//! source.close();
//! # Ok::<(), GridError>(())
//! ```

use std::{
    collections::VecDeque,
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::{
    error::GridError,
    metadata::{VideoMetadata, stream_frame_count, stream_frames_per_second},
};

/// A decoded frame: 8-bit RGB, row-major, no padding.
pub type Frame = RgbImage;

/// Consecutive non-EOF read failures tolerated before giving up on a file.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 16;

/// A forward-only stream of decoded frames.
///
/// Implementations must make [`close`](VideoSource::close) idempotent and
/// return `Ok(None)` from [`read_frame`](VideoSource::read_frame) once the
/// stream is exhausted or closed.
pub trait VideoSource {
    /// Total number of frames the container reports.
    ///
    /// Zero or negative when unknown. The number of frames actually
    /// delivered by [`read_frame`](VideoSource::read_frame) may differ.
    fn frame_count(&self) -> i64;

    /// Nominal frame rate. Informational only.
    fn frames_per_second(&self) -> f64;

    /// Decode the next frame, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::VideoDecodeError`] or [`GridError::FfmpegError`]
    /// if the underlying decoder fails.
    fn read_frame(&mut self) -> Result<Option<Frame>, GridError>;

    /// Release the decoder and any file handles.
    fn close(&mut self);
}

impl<S: VideoSource + ?Sized> VideoSource for &mut S {
    fn frame_count(&self) -> i64 {
        (**self).frame_count()
    }

    fn frames_per_second(&self) -> f64 {
        (**self).frames_per_second()
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, GridError> {
        (**self).read_frame()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Live FFmpeg state. Dropping it closes the demuxer and the decoder.
struct DecodeState {
    input_context: Input,
    decoder: VideoDecoder,
    /// Built lazily from the first decoded frame, rebuilt if the frame
    /// geometry changes mid-stream.
    scaler: Option<(ScalingContext, Pixel, u32, u32)>,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    eof_sent: bool,
}

/// A video file decoded sequentially through FFmpeg.
///
/// Created via [`MediaFile::open`]. Frames come out in decode order, converted
/// to RGB24 at the stream's native resolution.
pub struct MediaFile {
    state: Option<DecodeState>,
    video_stream_index: usize,
    metadata: VideoMetadata,
    file_path: PathBuf,
}

impl Debug for MediaFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaFile")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .field("closed", &self.state.is_none())
            .finish_non_exhaustive()
    }
}

impl MediaFile {
    /// Open a video file for sequential decoding.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, selects the best
    /// video stream, and caches its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::FileOpen`] if the path cannot be opened or its
    /// video codec is unsupported, and [`GridError::NoVideoStream`] if the
    /// file has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GridError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening video file: {}", file_path.display());

        ffmpeg_next::init().map_err(|error| GridError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| GridError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(GridError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let decoder_context =
            CodecContext::from_parameters(stream.parameters()).map_err(|error| {
                GridError::FileOpen {
                    path: file_path.clone(),
                    reason: format!("Failed to read video codec parameters: {error}"),
                }
            })?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| GridError::FileOpen {
                path: file_path.clone(),
                reason: format!("Failed to create video decoder: {error}"),
            })?;

        let frames_per_second = stream_frames_per_second(&stream);
        let frame_count = stream_frame_count(&input_context, &stream, frames_per_second);
        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            codec,
        };

        log::debug!(
            "Video stream {}: {}x{} {} at {:.3} fps, {} frames",
            video_stream_index,
            metadata.width,
            metadata.height,
            metadata.codec,
            metadata.frames_per_second,
            metadata.frame_count
        );

        Ok(Self {
            state: Some(DecodeState {
                input_context,
                decoder,
                scaler: None,
                decoded_frame: VideoFrame::empty(),
                rgb_frame: VideoFrame::empty(),
                eof_sent: false,
            }),
            video_stream_index,
            metadata,
            file_path,
        })
    }

    /// Cached metadata for the selected video stream.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path this file was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Whether [`close`](VideoSource::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.state.is_none()
    }
}

impl DecodeState {
    /// Scale the current `decoded_frame` to RGB24 and copy it out.
    fn convert_current_frame(&mut self) -> Result<Frame, GridError> {
        let format = self.decoded_frame.format();
        let width = self.decoded_frame.width();
        let height = self.decoded_frame.height();

        let stale = !matches!(
            &self.scaler,
            Some((_, f, w, h)) if *f == format && *w == width && *h == height
        );
        if stale {
            let context = ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?;
            self.scaler = Some((context, format, width, height));
        }

        if let Some((scaler, ..)) = self.scaler.as_mut() {
            scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;
        }

        let buffer = crate::utilities::frame_to_rgb_buffer(&self.rgb_frame, width, height);
        RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            GridError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })
    }
}

impl VideoSource for MediaFile {
    fn frame_count(&self) -> i64 {
        self.metadata.frame_count
    }

    fn frames_per_second(&self) -> f64 {
        self.metadata.frames_per_second
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, GridError> {
        let video_stream_index = self.video_stream_index;
        let Some(state) = self.state.as_mut() else {
            return Ok(None);
        };

        let mut read_errors = 0;
        loop {
            // Drain frames the decoder has already produced.
            if state.decoder.receive_frame(&mut state.decoded_frame).is_ok() {
                return state.convert_current_frame().map(Some);
            }

            if state.eof_sent {
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut state.input_context) {
                Ok(()) => {
                    read_errors = 0;
                    if packet.stream() == video_stream_index {
                        state.decoder.send_packet(&packet)?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    state.decoder.send_eof()?;
                    state.eof_sent = true;
                }
                Err(error) => {
                    read_errors += 1;
                    log::warn!(
                        "Skipping unreadable packet in {}: {error}",
                        self.file_path.display()
                    );
                    if read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        return Err(GridError::VideoDecodeError(format!(
                            "Giving up after {read_errors} consecutive read errors: {error}"
                        )));
                    }
                }
            }
        }
    }

    fn close(&mut self) {
        if self.state.take().is_some() {
            log::debug!("Closed video file: {}", self.file_path.display());
        }
    }
}

/// Frames held in memory, served in order.
///
/// Useful when frames come from somewhere other than a file, and for
/// exercising the sampler deterministically. The reported frame count is
/// independent of the frames actually held, so truncated or mislabelled
/// containers can be modelled.
///
/// # Example
///
/// ```
/// use image::RgbImage;
/// use looking_glass::{FrameSequence, VideoSource};
///
/// let frames = vec![RgbImage::new(4, 4); 3];
/// let mut source = FrameSequence::new(frames);
/// assert_eq!(source.frame_count(), 3);
/// assert!(source.read_frame().unwrap().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: VecDeque<Frame>,
    frame_count: i64,
    frames_per_second: f64,
    fail_at: Option<u64>,
    frames_read: u64,
    closed: bool,
}

impl FrameSequence {
    /// Serve `frames`, reporting their exact count at 30 fps.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frame_count: frames.len() as i64,
            frames: frames.into(),
            frames_per_second: 30.0,
            ..Self::default()
        }
    }

    /// Report `frame_count` instead of the number of frames held.
    pub fn with_reported_frame_count(mut self, frame_count: i64) -> Self {
        self.frame_count = frame_count;
        self
    }

    /// Report a different frame rate.
    pub fn with_frames_per_second(mut self, frames_per_second: f64) -> Self {
        self.frames_per_second = frames_per_second;
        self
    }

    /// Fail with a decode error when the frame at `index` is requested.
    pub fn with_decode_failure_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Number of frames handed out so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Whether [`close`](VideoSource::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl VideoSource for FrameSequence {
    fn frame_count(&self) -> i64 {
        self.frame_count
    }

    fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, GridError> {
        if self.closed {
            return Ok(None);
        }
        if self.fail_at == Some(self.frames_read) {
            return Err(GridError::VideoDecodeError(format!(
                "Injected failure at frame {}",
                self.frames_read
            )));
        }
        let frame = self.frames.pop_front();
        if frame.is_some() {
            self.frames_read += 1;
        }
        Ok(frame)
    }

    fn close(&mut self) {
        self.closed = true;
        self.frames.clear();
    }
}
