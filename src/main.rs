// CLI entry point: the calling layer around the conversion core. Owns
// everything the core does not: reading files, the naming convention,
// writing outputs or the bulk zip archive, and user-facing progress.

use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use image_converter::archive::build_archive;
use image_converter::core::{
    AspectRatio, ConversionRequest, ConversionSettings, CropSettings, ProgressType,
    ResizeSettings,
};
use image_converter::processing::BatchProcessor;
use image_converter::utils::{
    output_filename, validate_upload, NamingStrategy, OutputFormat, UploadPolicy,
};

#[derive(Parser, Debug)]
#[command(
    name = "image-converter",
    version,
    about = "Batch-convert raster images between formats, locally"
)]
struct Args {
    /// Input image files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Target format: jpg, png, webp, bmp, tiff, heic, heif
    /// (HEIC/HEIF output falls back to PNG)
    #[arg(short, long, value_parser = parse_format)]
    format: OutputFormat,

    /// Quality in (0, 1]; affects lossy formats (jpg, webp) only
    #[arg(short, long, default_value_t = 0.92)]
    quality: f32,

    /// Resize to this width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Resize to this height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Crop to a fixed aspect ratio: 1:1, 16:9, 9:16, 4:3 or 3:4
    #[arg(long, value_parser = parse_aspect)]
    crop: Option<AspectRatio>,

    /// Prepend this string to every output filename
    #[arg(long, conflicts_with = "suffix")]
    prefix: Option<String>,

    /// Append this string to every output filename stem
    #[arg(long)]
    suffix: Option<String>,

    /// Directory converted files are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Package all outputs into this zip archive instead of single files
    #[arg(long)]
    zip: Option<PathBuf>,

    /// Maximum number of concurrent conversions (default 4)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Emit progress events as JSON lines on stdout
    #[arg(long)]
    progress_json: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_aspect(s: &str) -> Result<AspectRatio, String> {
    s.parse().map_err(|e| format!("{}", e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so --progress-json output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let settings = ConversionSettings {
        target_format: args.format,
        quality: args.quality,
        resize: ResizeSettings {
            enabled: args.width.is_some() || args.height.is_some(),
            width: args.width,
            height: args.height,
        },
        crop: CropSettings {
            enabled: args.crop.is_some(),
            aspect_ratio: args.crop,
        },
    };

    let strategy = match (args.prefix, args.suffix) {
        (Some(prefix), _) => NamingStrategy::Prefix(prefix),
        (_, Some(suffix)) => NamingStrategy::Suffix(suffix),
        _ => NamingStrategy::Preserve,
    };

    // Upload layer: files failing the allow-list or size limit never reach
    // the pipeline.
    let policy = UploadPolicy::default();
    let mut requests = Vec::new();
    for path in &args.inputs {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("input")
            .to_string();

        if let Err(e) = validate_upload(&filename, None, bytes.len() as u64, &policy) {
            warn!("Skipping '{}': {}", filename, e);
            continue;
        }

        requests.push(ConversionRequest {
            source_bytes: bytes,
            filename,
            content_type: None,
            settings: settings.clone(),
        });
    }

    if requests.is_empty() {
        anyhow::bail!("No convertible input files");
    }

    let total = requests.len();
    let progress_json = args.progress_json;
    let processor = BatchProcessor::new(args.jobs);

    let outcomes = processor
        .process_batch(requests, move |event| {
            if progress_json {
                if let Ok(line) = serde_json::to_string(&event) {
                    println!("{}", line);
                }
                return;
            }
            match event.progress_type {
                ProgressType::Complete => info!(
                    "[{}/{}] {} done",
                    event.completed_tasks,
                    event.total_tasks,
                    event.file_name.as_deref().unwrap_or("?")
                ),
                ProgressType::Error => warn!(
                    "[{}/{}] {} failed: {}",
                    event.completed_tasks,
                    event.total_tasks,
                    event.file_name.as_deref().unwrap_or("?"),
                    event.error.as_deref().unwrap_or("unknown error")
                ),
                _ => {}
            }
        })
        .await;

    // Collect outputs; the archive (when requested) is only built after every
    // conversion has settled.
    let mut converted = Vec::new();
    let mut failures = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(output) => {
                if output.effective_format != args.format {
                    info!(
                        "'{}': no {:?} encoder available, wrote {:?} instead",
                        outcome.filename, args.format, output.effective_format
                    );
                }
                let name = output_filename(&outcome.filename, args.format, &strategy);
                converted.push((name, output.bytes.clone()));
            }
            Err(_) => failures += 1,
        }
    }

    match &args.zip {
        Some(zip_path) => {
            let archive = build_archive(&converted)?;
            tokio::fs::write(zip_path, archive)
                .await
                .with_context(|| format!("Cannot write {}", zip_path.display()))?;
            info!("Wrote {} files to {}", converted.len(), zip_path.display());
        }
        None => {
            tokio::fs::create_dir_all(&args.out_dir)
                .await
                .with_context(|| format!("Cannot create {}", args.out_dir.display()))?;
            for (name, bytes) in &converted {
                let path = args.out_dir.join(name);
                tokio::fs::write(&path, bytes)
                    .await
                    .with_context(|| format!("Cannot write {}", path.display()))?;
            }
            info!(
                "Wrote {} files to {}",
                converted.len(),
                args.out_dir.display()
            );
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} conversions failed", failures, total);
    }
    Ok(())
}
