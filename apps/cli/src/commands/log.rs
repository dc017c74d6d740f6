//! Log command implementation.
//!
//! `fcp log add` logs a single meal; `fcp log batch` uploads a folder of
//! meal images in parallel through the bounded batch processor.

use anyhow::{bail, Context};
use clap::Subcommand;
use colored::Colorize;
use fcp_core::batch::{ProgressCallback, ProgressUpdate};
use fcp_core::{
    auto_select_resolution, images, read_image_as_base64, BatchProcessor, BatchProgressTracker,
    Config, CreateFoodLogRequest, FcpClient, FoodLog, ItemError, Resolution, RetryPolicy,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::render;

/// Log command actions.
#[derive(Subcommand, Debug)]
pub enum LogAction {
    /// Log a single meal
    Add {
        /// Name of the dish
        dish_name: String,

        /// Path to a food image
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Free-text description
        #[arg(short, long)]
        description: Option<String>,

        /// Meal type (breakfast, lunch, dinner, snack)
        #[arg(short = 'm', long)]
        meal_type: Option<String>,

        /// Image resolution: low (fast/cheap), medium (balanced), high
        /// (detailed). Auto-detected from file size if not specified.
        #[arg(short = 'r', long = "res")]
        resolution: Option<String>,
    },

    /// Log multiple meal images in parallel
    Batch {
        /// Folder with meal images
        folder: PathBuf,

        /// Max concurrent uploads (1-10)
        #[arg(short = 'p', long = "parallel", default_value = "5")]
        parallel: usize,

        /// Image resolution: low (fast/cheap), medium (balanced), high (detailed)
        #[arg(short = 'r', long = "res", default_value = "low")]
        resolution: String,

        /// Meal type for all images (breakfast, lunch, dinner, snack)
        #[arg(short = 'm', long)]
        meal_type: Option<String>,
    },
}

/// Execute the log command.
pub async fn execute(action: LogAction) -> anyhow::Result<()> {
    match action {
        LogAction::Add { dish_name, image, description, meal_type, resolution } => {
            execute_add(dish_name, image, description, meal_type, resolution).await
        }
        LogAction::Batch { folder, parallel, resolution, meal_type } => {
            execute_batch(folder, parallel, resolution, meal_type).await
        }
    }
}

async fn execute_add(
    dish_name: String,
    image: Option<PathBuf>,
    description: Option<String>,
    meal_type: Option<String>,
    resolution: Option<String>,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = FcpClient::new(&config).context("Failed to build FCP client")?;

    let mut request = CreateFoodLogRequest {
        description,
        meal_type,
        ..CreateFoodLogRequest::new(dish_name)
    };

    if let Some(path) = image {
        let selected = match resolution {
            Some(res) => res.parse::<Resolution>().map_err(|e| anyhow::anyhow!(e))?,
            None => {
                let auto = auto_select_resolution(&path)?;
                println!("{}", format!("Auto-selected resolution: {}", auto).dimmed());
                auto
            }
        };
        request.image_base64 = Some(read_image_as_base64(&path)?);
        request.resolution = Some(selected);
    }

    let log = client.create_food_log(&request).await?;
    let name = log.dish_name.as_deref().unwrap_or(&request.dish_name);
    println!("{} Logged {}", "✓".green(), name.cyan());
    if let Some(message) = &log.message {
        println!("  {}", message.dimmed());
    }
    Ok(())
}

async fn execute_batch(
    folder: PathBuf,
    parallel: usize,
    resolution: String,
    meal_type: Option<String>,
) -> anyhow::Result<()> {
    if !folder.is_dir() {
        bail!("Not a directory: {}", folder.display());
    }
    if parallel == 0 || parallel > 10 {
        bail!("Parallelism must be between 1 and 10");
    }
    let resolution = resolution.parse::<Resolution>().map_err(|e| anyhow::anyhow!(e))?;

    let images = collect_images(&folder)?;
    if images.is_empty() {
        println!("{}", format!("No images found in {}", folder.display()).yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Processing {} images with {} parallel uploads...", images.len(), parallel).cyan()
    );
    println!("{}\n", format!("Resolution: {}", resolution).dimmed());

    let config = Config::load()?;
    let client = FcpClient::new(&config).context("Failed to build FCP client")?;

    // Ctrl+C cancels the run; in-flight uploads finish, the rest report as
    // cancelled.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                eprintln!(
                    "\n{} Cancellation requested, waiting for active uploads...",
                    "⚠".yellow()
                );
                cancel.cancel();
            }
        });
    }

    let tracker = Arc::new(Mutex::new(BatchProgressTracker::new(images.len())));
    let progress: ProgressCallback = {
        let tracker = Arc::clone(&tracker);
        Arc::new(move |update: ProgressUpdate| {
            if let Ok(mut tracker) = tracker.lock() {
                tracker.update(&update);
                render::render_progress(&tracker);
            }
        })
    };

    let handler = {
        let client = client.clone();
        let meal_type = meal_type.clone();
        move |path: PathBuf| {
            let client = client.clone();
            let meal_type = meal_type.clone();
            async move { upload_image(&client, &path, resolution, meal_type).await }
        }
    };

    let processor: BatchProcessor<PathBuf, FoodLog> =
        BatchProcessor::new(parallel, RetryPolicy::default())?;
    let report = processor.run(images, handler, Some(progress), cancel).await;

    render::render_summary(&report);
    Ok(())
}

/// Upload one image as a food log entry.
///
/// Local validation failures are permanent; server/transport failures carry
/// the client's transient/permanent classification.
async fn upload_image(
    client: &FcpClient,
    path: &PathBuf,
    resolution: Resolution,
    meal_type: Option<String>,
) -> Result<FoodLog, ItemError> {
    let image_base64 =
        read_image_as_base64(path).map_err(|e| ItemError::permanent(e.to_string()))?;

    let dish_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("meal")
        .to_string();
    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();

    let request = CreateFoodLogRequest {
        description: Some(format!("Logged from {}", file_name)),
        meal_type,
        image_base64: Some(image_base64),
        resolution: Some(resolution),
        ..CreateFoodLogRequest::new(dish_name)
    };

    client.create_food_log(&request).await.map_err(ItemError::from)
}

/// Collect supported images from a folder, sorted by name.
fn collect_images(folder: &PathBuf) -> anyhow::Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(folder)
        .with_context(|| format!("Failed to read directory: {}", folder.display()))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && images::has_supported_extension(path))
        .collect();
    images.sort();
    Ok(images)
}
