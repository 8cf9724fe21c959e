//! Run a backend on an image file - `cargo run -p textsnip-ocr --bin test_ocr -- shot.png --mode advanced`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use textsnip_ocr::{PaddleLoader, RecognitionDispatcher, TesseractEngine};
use textsnip_types::{Bitmap, RecognitionMode};

#[derive(Parser, Debug)]
#[command(about = "Recognize text in an image with the textsnip OCR backends")]
struct Args {
    /// Image to recognize
    image: PathBuf,

    /// standard or advanced
    #[arg(long, default_value = "standard")]
    mode: String,

    /// Tesseract language
    #[arg(long, default_value = "eng")]
    language: String,

    #[arg(long, default_value = "models")]
    models_dir: PathBuf,

    #[arg(long, default_value = "english")]
    advanced_language: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mode = RecognitionMode::parse(&args.mode);

    let image = image::open(&args.image)
        .with_context(|| format!("Failed to open {}", args.image.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    let bitmap = Bitmap::from_rgba(width, height, image.into_raw())
        .context("Decoded image has inconsistent dimensions")?;

    let dispatcher = RecognitionDispatcher::new(
        TesseractEngine::new(args.language, Vec::new()),
        PaddleLoader::new(args.models_dir, args.advanced_language),
    );

    let start = std::time::Instant::now();
    let result = dispatcher.recognize(bitmap, mode);
    tracing::info!("{} backend finished in {:?}", mode, start.elapsed());

    match result {
        Ok(recognition) if recognition.is_empty() => println!("(no text detected)"),
        Ok(recognition) => println!("{}", recognition.text),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
    Ok(())
}
