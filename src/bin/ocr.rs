use async_ocr_worker::config::AppConfig;
use async_ocr_worker::services::ocr::{OcrClient, RecognitionService};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

const PREVIEW_CHARS: usize = 500;

/// Asynchronous OCR using Yandex Cloud
#[derive(Debug, Parser)]
#[command(name = "ocr", version)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(true)
        .args(["image_path", "operation_id"])
))]
struct Args {
    /// Path to the image file to submit
    #[arg(long)]
    image_path: Option<PathBuf>,

    /// Operation ID to retrieve results for
    #[arg(long)]
    operation_id: Option<String>,

    /// Yandex Cloud API key (falls back to API_KEY from the environment)
    #[arg(long)]
    api_key: Option<String>,

    /// Path to save the recognition results
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = AppConfig::ocr_settings_from_env()?;
    if let Some(key) = &args.api_key {
        settings.api_key = Some(key.clone());
    }
    let client = OcrClient::new(settings)?;

    if let Some(image_path) = &args.image_path {
        let operation_id = client.submit(image_path).await?;
        println!("Recognition request submitted successfully!");
        println!("Operation ID: {}", operation_id);
        println!("You can use this ID to retrieve the recognition results later with:");
        println!("{}", follow_up_command(&operation_id, args.api_key.is_some()));
    }

    if let Some(operation_id) = &args.operation_id {
        println!("Retrieving results for operation: {}", operation_id);
        let pages = client.fetch_results(operation_id).await?;

        if pages.is_empty() {
            println!("No results returned. The operation may still be in progress.");
            return Ok(());
        }
        println!("Retrieved {} result(s).", pages.len());

        for (i, page) in pages.iter().enumerate() {
            if !page.text.is_empty() {
                println!("\nPage {} text:", page.number(i));
                println!("{}", preview(&page.text, PREVIEW_CHARS));
            }

            if let Some(output) = &args.output {
                let target = page_output_path(output, i, pages.len());
                tokio::fs::write(&target, &page.text).await?;
                println!("Full text saved to {}", target.display());
            }
        }
    }

    Ok(())
}

/// Command to fetch results later; repeats `--api-key` only if it was given.
fn follow_up_command(operation_id: &str, key_flag_given: bool) -> String {
    let key = if key_flag_given { " --api-key YOUR_API_KEY" } else { "" };
    format!("ocr --operation-id {}{}", operation_id, key)
}

/// First `limit` characters, with an ellipsis when truncated.
fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// `output` itself for a single page, `{output}_{i}.txt` otherwise.
fn page_output_path(output: &std::path::Path, index: usize, total: usize) -> PathBuf {
    if total > 1 {
        PathBuf::from(format!("{}_{}.txt", output.display(), index))
    } else {
        output.to_path_buf()
    }
}
