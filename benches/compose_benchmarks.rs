//! Benchmarks for sampling and grid composition.
//!
//! Run with: cargo bench
//!
//! The end-to-end benchmark requires `tests/fixtures/sample_video.mp4`.

use std::path::Path;

use criterion::Criterion;
use image::{Rgb, RgbImage};
use looking_glass::{
    FfmpegLogLevel, FrameSequence, GridOptions, GridSpec, ResizeFilter, SampledSequence,
    Storyboard, compositor, sampler,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn synthetic_frames(count: usize, width: u32, height: u32) -> Vec<RgbImage> {
    (0..count)
        .map(|index| RgbImage::from_pixel(width, height, Rgb([(index * 3 % 256) as u8, 64, 128])))
        .collect()
}

fn benchmark_sampling(criterion: &mut Criterion) {
    let frames = synthetic_frames(600, 64, 36);

    criterion.bench_function("sample 66 of 600 in-memory frames", |bencher| {
        bencher.iter(|| {
            let mut source = FrameSequence::new(frames.clone());
            let _sequence = sampler::sample(&mut source, 66).unwrap();
        });
    });
}

fn benchmark_compose(criterion: &mut Criterion) {
    let frames = synthetic_frames(66, 640, 360);
    let indices = (0..66).collect();
    let sequence = SampledSequence::new(frames, indices, 66);
    let spec = GridSpec::default().with_canvas_size(2046, 2046);

    let mut group = criterion.benchmark_group("compose 11x6 from 640x360");
    group.sample_size(10);
    for filter in [ResizeFilter::Nearest, ResizeFilter::Bilinear, ResizeFilter::Lanczos3] {
        group.bench_function(format!("{filter:?}"), |bencher| {
            bencher.iter(|| {
                let _canvas = compositor::compose_with(
                    &sequence,
                    &spec,
                    filter,
                    std::sync::Arc::new(NoProgress),
                )
                .unwrap();
            });
        });
    }
    group.finish();
}

fn benchmark_end_to_end(criterion: &mut Criterion) {
    looking_glass::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let options = GridOptions::new().with_grid(GridSpec::new(4, 3).with_canvas_size(1280, 720));
    let mut group = criterion.benchmark_group("storyboard");
    group.sample_size(10);
    group.bench_function("render 4x3 from fixture", |bencher| {
        bencher.iter(|| {
            let _rendered = Storyboard::render(SAMPLE_VIDEO, &options).unwrap();
        });
    });
    group.finish();
}

struct NoProgress;

impl looking_glass::ProgressCallback for NoProgress {
    fn on_progress(&self, _info: &looking_glass::ProgressInfo) {}
}

criterion::criterion_group!(
    benches,
    benchmark_sampling,
    benchmark_compose,
    benchmark_end_to_end,
);
criterion::criterion_main!(benches);
