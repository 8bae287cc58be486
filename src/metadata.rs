//! Video stream metadata.
//!
//! [`VideoMetadata`] is read once when a [`MediaFile`](crate::MediaFile) is
//! opened and cached for the lifetime of the handle.

use ffmpeg_next::{Rational, format::context::Input, format::stream::Stream};

/// Metadata for the decoded video stream.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Total number of frames.
    ///
    /// Taken from the stream header when the container records it, otherwise
    /// estimated from duration and frame rate. Zero when neither is known.
    pub frame_count: i64,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
}

/// Frames per second from the stream's average frame rate, falling back to
/// its nominal rate.
pub(crate) fn stream_frames_per_second(stream: &Stream<'_>) -> f64 {
    rational_to_f64(stream.avg_frame_rate())
        .or_else(|| rational_to_f64(stream.rate()))
        .unwrap_or(0.0)
}

/// Frame count from the stream header, or an estimate from the stream or
/// container duration.
pub(crate) fn stream_frame_count(input: &Input, stream: &Stream<'_>, frames_per_second: f64) -> i64 {
    let recorded = stream.frames();
    if recorded > 0 {
        return recorded;
    }
    if frames_per_second <= 0.0 {
        return 0;
    }

    let stream_seconds = if stream.duration() > 0 {
        rational_to_f64(stream.time_base()).map(|tb| stream.duration() as f64 * tb)
    } else {
        None
    };
    // Container duration is in AV_TIME_BASE units (microseconds).
    let container_seconds = (input.duration() > 0).then(|| input.duration() as f64 / 1_000_000.0);

    stream_seconds
        .or(container_seconds)
        .map(|seconds| (seconds * frames_per_second).round() as i64)
        .unwrap_or(0)
}

fn rational_to_f64(rational: Rational) -> Option<f64> {
    if rational.denominator() == 0 || rational.numerator() <= 0 {
        None
    } else {
        Some(rational.numerator() as f64 / rational.denominator() as f64)
    }
}
