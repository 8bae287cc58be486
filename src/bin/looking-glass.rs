use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use looking_glass::{
    EmptyVideoPolicy, FfmpegLogLevel, GridOptions, GridSpec, Phase, ProgressCallback,
    ProgressInfo, ResizeFilter, StoryboardReport, grid,
};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  looking-glass grid vase.mp4\n  looking-glass grid vase.mp4 --out storyboard.png --columns 8 --rows 4 --width 2048 --height 1024\n  looking-glass grid vase.mp4 --out-dir outputs --progress --json\n  looking-glass completions zsh > _looking-glass";

#[derive(Debug, Parser)]
#[command(
    name = "looking-glass",
    version,
    about = "Turn a video into a storyboard grid image",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sample a video and write its storyboard grid.
    #[command(
        about = "Render a storyboard grid from a video",
        visible_alias = "storyboard",
        after_help = "Examples:\n  looking-glass grid vase.mp4\n  looking-glass grid vase.mp4 --out grid.jpg --quality 80 --overwrite"
    )]
    Grid {
        /// Input video path.
        input: PathBuf,
        /// Output image path. The format follows the extension.
        #[arg(long, conflicts_with = "out_dir")]
        out: Option<PathBuf>,
        /// Directory for the default output name `<stem>_qs<columns>x<rows>.jpg`.
        #[arg(long, default_value = "outputs")]
        out_dir: PathBuf,
        /// Number of grid columns.
        #[arg(long, default_value_t = grid::DEFAULT_COLUMNS)]
        columns: u32,
        /// Number of grid rows.
        #[arg(long, default_value_t = grid::DEFAULT_ROWS)]
        rows: u32,
        /// Canvas width in pixels.
        #[arg(long, default_value_t = grid::DEFAULT_CANVAS_WIDTH)]
        width: u32,
        /// Canvas height in pixels.
        #[arg(long, default_value_t = grid::DEFAULT_CANVAS_HEIGHT)]
        height: u32,
        /// JPEG quality (1-100).
        #[arg(long, default_value_t = looking_glass::config::DEFAULT_JPEG_QUALITY)]
        quality: u8,
        /// Resampling filter (nearest, bilinear, catmull-rom, gaussian, lanczos3).
        #[arg(long, default_value = "bilinear")]
        filter: String,
        /// Fail instead of writing a blank image when the video has no frames.
        #[arg(long)]
        strict: bool,
        /// Allow overwriting an existing output file.
        #[arg(long)]
        overwrite: bool,
        /// Show a progress bar.
        #[arg(long)]
        progress: bool,
        /// Print a JSON summary of the run.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        /// Shell to generate completion script for.
        shell: Shell,
    },
}

fn parse_filter(value: &str) -> Option<ResizeFilter> {
    match value.to_ascii_lowercase().as_str() {
        "nearest" => Some(ResizeFilter::Nearest),
        "bilinear" | "triangle" | "linear" => Some(ResizeFilter::Bilinear),
        "catmull-rom" | "catmullrom" | "cubic" => Some(ResizeFilter::CatmullRom),
        "gaussian" => Some(ResizeFilter::Gaussian),
        "lanczos" | "lanczos3" => Some(ResizeFilter::Lanczos3),
        _ => None,
    }
}

fn default_output_path(input: &Path, out_dir: &Path, columns: u32, rows: u32) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "storyboard".to_string());
    out_dir.join(format!("{stem}_qs{columns}x{rows}.jpg"))
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn init_logging(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let level = if global.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()?;

    if let Some(level) = &global.log_level {
        let parsed: FfmpegLogLevel = level.parse()?;
        looking_glass::set_ffmpeg_log_level(parsed);
    } else if !global.verbose {
        looking_glass::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    }
    Ok(())
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let phase = match info.phase {
            Phase::Sampling => "decoding",
            Phase::Compositing => "compositing",
            Phase::Encoding => "encoding",
            _ => "working",
        };
        if let Some(expected) = info.expected {
            self.bar.set_length(expected);
        }
        self.bar.set_position(info.completed);
        self.bar.set_message(phase);
    }
}

fn print_report(input: &Path, report: &StoryboardReport, json_output: bool) {
    let output = report
        .output_path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_default();

    if json_output {
        let payload = json!({
            "input": input.display().to_string(),
            "output": output,
            "total_frames": report.total_frames,
            "frames_per_second": report.frames_per_second,
            "columns": report.grid.columns,
            "rows": report.grid.rows,
            "canvas_width": report.grid.canvas_width,
            "canvas_height": report.grid.canvas_height,
            "filled_cells": report.filled_cells(),
            "frame_indices": report.frame_indices,
        });
        println!("{payload}");
    } else {
        println!(
            "{} {} -> {} ({}/{} cells, {}x{})",
            "saved".green().bold(),
            input.display(),
            output,
            report.filled_cells(),
            report.grid.capacity(),
            report.grid.canvas_width,
            report.grid.canvas_height
        );
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global)?;

    match cli.command {
        Commands::Grid {
            input,
            out,
            out_dir,
            columns,
            rows,
            width,
            height,
            quality,
            filter,
            strict,
            overwrite,
            progress,
            json,
        } => {
            let filter = parse_filter(&filter).ok_or(format!("unsupported --filter: {filter}"))?;
            let spec = GridSpec::new(columns, rows).with_canvas_size(width, height);
            spec.validate()?;

            let output = out.unwrap_or_else(|| default_output_path(&input, &out_dir, columns, rows));
            ensure_writable_path(&output, overwrite)?;

            let mut options = GridOptions::new()
                .with_grid(spec)
                .with_filter(filter)
                .with_jpeg_quality(quality);
            if strict {
                options = options.with_empty_policy(EmptyVideoPolicy::Error);
            }

            let terminal_progress = if progress {
                Some(Arc::new(TerminalProgress::new()?))
            } else {
                None
            };
            if let Some(terminal_progress) = &terminal_progress {
                options = options.with_progress(terminal_progress.clone());
            }

            let result = looking_glass::video_to_grid_with_options(&input, &output, &options);
            if let Some(terminal_progress) = &terminal_progress {
                terminal_progress.bar.finish_and_clear();
            }

            print_report(&input, &result?, json);
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "looking-glass", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use super::{Cli, Commands, default_output_path, ensure_writable_path, parse_filter};
    use looking_glass::ResizeFilter;

    #[test]
    fn parse_filter_aliases() {
        assert_eq!(parse_filter("bilinear"), Some(ResizeFilter::Bilinear));
        assert_eq!(parse_filter("Triangle"), Some(ResizeFilter::Bilinear));
        assert_eq!(parse_filter("cubic"), Some(ResizeFilter::CatmullRom));
        assert_eq!(parse_filter("LANCZOS"), Some(ResizeFilter::Lanczos3));
        assert_eq!(parse_filter("nearest"), Some(ResizeFilter::Nearest));
        assert_eq!(parse_filter("bicubic-ish"), None);
    }

    #[test]
    fn default_output_name_uses_stem_and_grid() {
        let path = default_output_path(Path::new("clips/vase.mp4"), Path::new("outputs"), 11, 6);
        assert_eq!(path, Path::new("outputs").join("vase_qs11x6.jpg"));
    }

    #[test]
    fn grid_defaults_match_library() {
        let cli = Cli::try_parse_from(["looking-glass", "grid", "vase.mp4"]).unwrap();
        match cli.command {
            Commands::Grid {
                columns,
                rows,
                width,
                height,
                quality,
                out,
                ..
            } => {
                assert_eq!((columns, rows), (11, 6));
                assert_eq!((width, height), (4092, 4092));
                assert_eq!(quality, 90);
                assert!(out.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn out_conflicts_with_out_dir() {
        let result = Cli::try_parse_from([
            "looking-glass",
            "grid",
            "vase.mp4",
            "--out",
            "a.jpg",
            "--out-dir",
            "elsewhere",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn existing_output_requires_overwrite() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let path = directory.path().join("grid.jpg");
        std::fs::write(&path, b"old").expect("Failed to write file");

        assert!(ensure_writable_path(&path, false).is_err());
        assert!(ensure_writable_path(&path, true).is_ok());
        assert!(ensure_writable_path(&directory.path().join("new.jpg"), false).is_ok());
    }
}
