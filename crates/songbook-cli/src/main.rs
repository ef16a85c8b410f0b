//! Command-line interface for preparing choral songbooks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use songbook_analyze::{DEFAULT_MODEL, GeminiClient, render_pages_jpeg};
use songbook_layout::{
    PageSlot, Piece, assemble_plan, calculate_statistics, group_spreads, load_multiple_pdfs,
    load_pdf, merge_pdfs, plan_layout, save_pdf,
};

#[derive(Parser)]
#[command(name = "songbook", about = "Songbook page layout tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge sheet-music PDFs into a single songbook source
    Merge {
        /// Input PDF files, in songbook order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Detect pieces by sending rendered page images to the classifier
    Analyze {
        /// Merged songbook PDF
        #[arg(short, long)]
        input: PathBuf,

        /// Write the detected pieces as JSON (for plan and export)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Gemini model to query
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Pixel width of the rendered page images
        #[arg(long, default_value = "800")]
        width: u32,
    },

    /// Compute the page order and review it spread by spread
    Plan {
        /// Merged songbook PDF
        #[arg(short, long)]
        input: PathBuf,

        /// Detected pieces JSON (from analyze)
        #[arg(short, long)]
        pieces: PathBuf,

        /// Write the layout plan as JSON for hand editing
        #[arg(long)]
        plan_out: Option<PathBuf>,
    },

    /// Export the final songbook PDF
    Export {
        /// Merged songbook PDF
        #[arg(short, long)]
        input: PathBuf,

        /// Detected pieces JSON; the layout is computed from these
        #[arg(short, long, required_unless_present = "plan", conflicts_with = "plan")]
        pieces: Option<PathBuf>,

        /// Layout plan JSON, as written by plan --plan-out and possibly edited
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Merge { input, output } => {
            let documents = load_multiple_pdfs(&input).await?;
            let merged = merge_pdfs(documents).await?;
            let page_count = merged.get_pages().len();
            save_pdf(merged, &output).await?;
            println!(
                "Merged {} files ({} pages) → {}",
                input.len(),
                page_count,
                output.display()
            );
        }

        Commands::Analyze {
            input,
            output,
            model,
            width,
        } => {
            let api_key =
                std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;

            let images = render_pages_jpeg(&input, width).await?;
            println!("Rendered {} pages", images.len());

            let client = GeminiClient::with_model(api_key, model);
            let pieces = client.analyze(&images).await?;

            println!("Detected pieces:");
            for piece in &pieces {
                println!("  {:<12} {}", page_range(piece), piece.title);
            }

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&pieces)?;
                tokio::fs::write(&path, json).await?;
                println!("Pieces → {}", path.display());
            }
        }

        Commands::Plan {
            input,
            pieces,
            plan_out,
        } => {
            let source = load_pdf(&input).await?;
            let total_pages = source.get_pages().len() as u32;
            let piece_list = read_pieces(&pieces).await?;

            let plan = plan_layout(total_pages, &piece_list)?;
            print_spreads(&plan, &piece_list);
            print_statistics(&plan, &piece_list);

            if let Some(path) = plan_out {
                let json = serde_json::to_string_pretty(&plan)?;
                tokio::fs::write(&path, json).await?;
                println!("Plan → {}", path.display());
            }
        }

        Commands::Export {
            input,
            pieces,
            plan,
            output,
        } => {
            let source = load_pdf(&input).await?;

            let (arranged, slots, piece_list) = match (pieces, plan) {
                (_, Some(plan_path)) => {
                    let slots = read_plan(&plan_path).await?;
                    let arranged = assemble_plan(&source, &slots).await?;
                    (arranged, slots, Vec::new())
                }
                (Some(pieces_path), None) => {
                    let piece_list = read_pieces(&pieces_path).await?;
                    let total_pages = source.get_pages().len() as u32;
                    let slots = plan_layout(total_pages, &piece_list)?;
                    let arranged = assemble_plan(&source, &slots).await?;
                    (arranged, slots, piece_list)
                }
                (None, None) => bail!("either --pieces or --plan is required"),
            };

            let stats = calculate_statistics(&slots, &piece_list);
            save_pdf(arranged, &output).await?;
            println!(
                "Exported {} pages ({} blank) → {}",
                stats.output_pages,
                stats.blank_pages_added,
                output.display()
            );
        }
    }

    Ok(())
}

/// "p. 3" for one-page pieces, "pp. 3-4" for longer ones.
fn page_range(piece: &Piece) -> String {
    if piece.start_page == piece.end_page {
        format!("p. {}", piece.start_page)
    } else {
        format!("pp. {}-{}", piece.start_page, piece.end_page)
    }
}

fn print_spreads(plan: &[PageSlot], pieces: &[Piece]) {
    let titles: HashMap<u32, &str> = pieces
        .iter()
        .map(|piece| (piece.start_page, piece.title.as_str()))
        .collect();

    println!("Spread review:");
    for (number, spread) in group_spreads(plan).iter().enumerate() {
        println!(
            "  Spread {:>2}: {:<24} | {}",
            number + 1,
            describe_slot(spread.verso, &titles),
            describe_slot(spread.recto, &titles),
        );
    }
}

fn describe_slot(slot: Option<PageSlot>, titles: &HashMap<u32, &str>) -> String {
    match slot {
        None => "-".to_string(),
        Some(PageSlot::Blank { .. }) => "(blank)".to_string(),
        Some(PageSlot::Source { page }) => match titles.get(&page) {
            Some(title) => format!("page {page}: {title}"),
            None => format!("page {page}"),
        },
    }
}

fn print_statistics(plan: &[PageSlot], pieces: &[Piece]) {
    let stats = calculate_statistics(plan, pieces);
    println!("Layout statistics:");
    println!("  Source pages: {}", stats.source_pages);
    println!("  Two-page pieces: {}", stats.two_page_pieces);
    println!("  Blank pages added: {}", stats.blank_pages_added);
    println!("  Output pages: {}", stats.output_pages);
    println!("  Spreads: {}", stats.spreads);
}

async fn read_pieces(path: &Path) -> Result<Vec<Piece>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading pieces from {}", path.display()))?;
    let pieces = serde_json::from_str(&json)
        .with_context(|| format!("parsing pieces JSON in {}", path.display()))?;
    Ok(pieces)
}

async fn read_plan(path: &Path) -> Result<Vec<PageSlot>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading plan from {}", path.display()))?;
    let plan = serde_json::from_str(&json)
        .with_context(|| format!("parsing plan JSON in {}", path.display()))?;
    Ok(plan)
}
