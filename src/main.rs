use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use autofinder::listing::{Dealer, ListingStore};
use autofinder::output::OutputFormat;
use autofinder::scoring::{MatchConfig, MatchResponse};

const EXIT_SUCCESS: i32 = 0;
const EXIT_IO: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Rank stored listings by your preferences (default if no subcommand)
    Rank,
    /// Open a ranked listing in the browser by its index number
    Open {
        /// Index number of the listing to open (1-based, as shown in rank)
        index: usize,
    },
    /// Fetch listing pages and add what they contain to the store
    Ingest {
        /// Listing or search result URLs
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Compose an e-mail introducing you to the dealer of a ranked listing
    Lead {
        /// Index number of the listing (1-based, as shown in rank)
        index: usize,
        /// Your name
        #[arg(long)]
        name: String,
        /// Your e-mail address
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        /// Anything the dealer should know
        #[arg(long)]
        notes: Option<String>,
        /// Dealer address, when the listing has none or a different one is wanted
        #[arg(long)]
        dealer_email: Option<String>,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "autofinder")]
#[command(about = "Rank used-car listings by what matters to you", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/autofinder/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the listing store (overrides the config file)
    #[arg(long, global = true)]
    listings: Option<PathBuf>,

    /// Fetch every page fresh instead of using the page cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Output format for ranked listings
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Commands::Rank);
    let start_time = Instant::now();

    if let Err(e) = autofinder::telemetry::init(cli.verbose) {
        eprintln!("Logging disabled: {}", e);
    }

    // The wizard runs before any config exists
    if let Commands::Init = command {
        if let Err(e) = autofinder::config::init::run_init_wizard(cli.config.clone()) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_IO);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match autofinder::config::load_config(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate everything at startup, reporting all problems at once
    let matching = config.matching.clone().unwrap_or_default();
    let ingest = config.ingest.clone().unwrap_or_default();
    let mut errors = Vec::new();
    if let Err(e) = autofinder::scoring::validate_matching(&matching) {
        errors.extend(e);
    }
    if let Err(e) = autofinder::ingest::validate_ingest(&ingest) {
        errors.extend(e);
    }
    if !errors.is_empty() {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let store_path = autofinder::config::resolve_store_path(cli.listings.clone(), &config);
    let mut store = match autofinder::listing::load_store(&store_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Listing store error: {:#}", e);
            std::process::exit(EXIT_IO);
        }
    };
    tracing::debug!(
        path = %store_path.display(),
        listings = store.listings.len(),
        "loaded listing store"
    );

    match command {
        Commands::Ingest { urls } => {
            let fetcher = match autofinder::ingest::PageFetcher::new(&ingest, !cli.no_cache) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Failed to create HTTP client: {:#}", e);
                    std::process::exit(EXIT_NETWORK);
                }
            };
            let registry = autofinder::ingest::ParserRegistry::with_defaults();

            let listings =
                autofinder::ingest::ingest_urls(&urls, &registry, &fetcher, ingest.max_concurrent)
                    .await;

            // Every page failed or held nothing usable
            if listings.is_empty() {
                eprintln!("No listings found. Run with --verbose to see why each page was skipped.");
                std::process::exit(EXIT_NETWORK);
            }

            let (added, updated) = store.merge(listings);
            if let Err(e) = autofinder::listing::save_store(&store_path, &store) {
                eprintln!("Listing store error: {:#}", e);
                std::process::exit(EXIT_IO);
            }

            println!(
                "Ingested {} listings ({} new, {} updated) into {}",
                added + updated,
                added,
                updated,
                store_path.display()
            );
            tracing::info!(elapsed = ?start_time.elapsed(), "ingest finished");
        }
        Commands::Rank => {
            let response = rank_or_exit(&store, &matching);
            let use_colors = autofinder::output::should_use_colors();

            match cli.format {
                OutputFormat::Table => {
                    if store.listings.is_empty() {
                        eprintln!("No listings stored yet. Run `autofinder ingest <url>` to add some.");
                    }
                    let output = if cli.verbose {
                        autofinder::output::format_verbose_table(&response.results, use_colors)
                    } else {
                        autofinder::output::format_ranked_table(&response.results, use_colors)
                    };
                    println!("{}", output);
                }
                OutputFormat::Tsv => {
                    let output = autofinder::output::format_tsv(&response.results);
                    if !output.is_empty() {
                        println!("{}", output);
                    }
                }
                OutputFormat::Json => match autofinder::output::format_json(&response) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("{:#}", e);
                        std::process::exit(EXIT_IO);
                    }
                },
            }

            if cli.verbose {
                eprintln!();
                eprintln!(
                    "Showing {} of {} candidates ({} stored) in {:?}",
                    response.returned,
                    response.total_candidates,
                    store.listings.len(),
                    start_time.elapsed()
                );
            }
        }
        Commands::Open { index } => {
            let response = rank_or_exit(&store, &matching);
            let listing = &pick_or_exit(&response, index).listing;

            if let Err(e) = autofinder::browser::open_listing(listing) {
                eprintln!("Failed to open browser: {:#}", e);
                std::process::exit(EXIT_NETWORK);
            }

            println!(
                "Opening {} in browser: {}",
                listing.title(),
                listing.url.as_deref().unwrap_or_default()
            );
        }
        Commands::Lead {
            index,
            name,
            email,
            phone,
            notes,
            dealer_email,
        } => {
            let response = rank_or_exit(&store, &matching);
            let listing = &pick_or_exit(&response, index).listing;

            let mut dealer = listing.dealer.clone().unwrap_or_else(|| Dealer {
                name: listing
                    .source
                    .clone()
                    .unwrap_or_else(|| "Sales Team".to_string()),
                email: None,
            });
            if dealer_email.is_some() {
                dealer.email = dealer_email;
            }

            let buyer = autofinder::notify::BuyerContact {
                name,
                email,
                phone,
                notes,
            };
            let lead = autofinder::notify::compose_lead_email(&dealer, &buyer, listing);

            if cli.format == OutputFormat::Json {
                match serde_json::to_string_pretty(&lead) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize lead: {}", e);
                        std::process::exit(EXIT_IO);
                    }
                }
            } else {
                println!("{}", lead);
            }

            if lead.to.is_none() {
                eprintln!("No dealer e-mail on file; pass --dealer-email to fill in the recipient.");
            }
        }
        // handled before config is loaded
        Commands::Init => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Rank the stored listings. A scoring error is a configuration problem.
fn rank_or_exit(store: &ListingStore, matching: &MatchConfig) -> MatchResponse {
    match autofinder::scoring::rank_listings(&store.listings, matching) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Scoring error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

/// Look up a 1-based index from the ranked output.
fn pick_or_exit(response: &MatchResponse, index: usize) -> &autofinder::scoring::ScoredListing {
    if index < 1 || index > response.results.len() {
        eprintln!(
            "Invalid index {}. Must be between 1 and {}.",
            index,
            response.results.len()
        );
        std::process::exit(EXIT_CONFIG);
    }
    &response.results[index - 1]
}
