use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use pdf_finder::{spawn_search, viewer, SearchEvent, SearchOptions, SearchRequest};

#[derive(Parser)]
#[command(author, version, about = "Find text in PDF files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search PDF files in a directory
    Search {
        /// Directory to search in
        directory: PathBuf,

        /// Text to search for
        term: String,

        /// Only match text with the same case
        #[arg(short = 'c', long)]
        match_case: bool,

        /// Only match whole words
        #[arg(short, long)]
        whole_word: bool,

        /// Include subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Also search PDFs inside ZIP archives
        #[arg(short, long)]
        archives: bool,
    },

    /// Open a PDF in the default viewer
    Open {
        /// PDF file to open
        file: PathBuf,

        /// Page to jump to (1-based)
        #[arg(short, long)]
        page: Option<u32>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search { directory, term, match_case, whole_word, recursive, archives } => {
            let options = SearchOptions {
                match_case,
                whole_word,
                include_subdirectories: recursive,
                include_archives: archives,
            };
            run_search_command(SearchRequest::new(directory, term, options))
        },
        Commands::Open { file, page } => {
            viewer::open_at_page(&file, page)
                .with_context(|| format!("Failed to open {}", file.display()))
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Run a search on the worker thread and print results as they arrive
fn run_search_command(request: SearchRequest) -> Result<()> {
    let term = request.term().to_string();
    let handle = spawn_search(request, || {})?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    while let Some(event) = handle.next_event() {
        match event {
            SearchEvent::Started { total } => {
                pb.set_length(total as u64);
                pb.set_message(format!("searching for '{}'", term));
            },
            SearchEvent::FileSearched { source, matches } => {
                if !matches.is_empty() {
                    pb.println(source.to_string());
                    for m in &matches {
                        pb.println(format!("    {}: {}", m.label, m.snippet));
                    }
                }
            },
            SearchEvent::FileFailed { source, reason } => {
                pb.println(format!("Warning: skipped {}: {}", source, reason));
            },
            SearchEvent::ArchiveFailed { archive, error } => {
                pb.println(format!("Warning: skipped archive {}: {}", archive.display(), error));
            },
            SearchEvent::Progress(progress) => {
                pb.set_position(progress.processed as u64);
            },
            SearchEvent::Finished(summary) => {
                pb.finish_and_clear();
                println!("{}", summary.outcome);
            },
        }
    }

    handle.join();
    Ok(())
}
