mod commands;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ownertrace")]
#[command(about = "Find property owner contact details on a people-search site")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the listing for a property address and match the owner
    Address {
        /// Street address to search
        address: String,
        city: String,
        state: String,
        /// First name of the first owner
        #[arg(long)]
        owner_first: Option<String>,
        /// Last name of the first owner
        #[arg(long)]
        owner_last: Option<String>,
        #[arg(long)]
        owner2_first: Option<String>,
        #[arg(long)]
        owner2_last: Option<String>,
        /// Address on the owner record, if different from the searched one
        #[arg(long)]
        owner_address: Option<String>,
        #[command(flatten)]
        flags: SearchFlags,
    },
    /// Search the listing for a person and confirm them by address
    Name {
        /// Full name to search
        name: String,
        city: String,
        state: String,
        /// Property address used to confirm the match
        #[arg(long, default_value = "")]
        property_address: String,
        /// Mailing address used to confirm the match
        #[arg(long, default_value = "")]
        mailing_address: String,
        #[command(flatten)]
        flags: SearchFlags,
    },
    /// Look up an LLC's registered agent and their filing addresses
    Llc {
        /// Business name as registered
        llc_name: String,
        /// Also run a name search for the agent using the mailing address
        #[arg(long)]
        search: bool,
        #[command(flatten)]
        flags: SearchFlags,
    },
}

#[derive(Debug, Clone, Copy, Args)]
struct SearchFlags {
    /// Stop after this many result pages
    #[arg(long)]
    max_pages: Option<u32>,
    /// End the crawl after the first expanded match
    #[arg(long)]
    stop_after_match: bool,
    /// Match against result cards instead of embedded structured data
    #[arg(long)]
    cards: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ownertrace_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let output = match cli.command {
        Commands::Address {
            address,
            city,
            state,
            owner_first,
            owner_last,
            owner2_first,
            owner2_last,
            owner_address,
            flags,
        } => {
            let owners = commands::Owners {
                first: owner_first,
                last: owner_last,
                second_first: owner2_first,
                second_last: owner2_last,
                address: owner_address,
            };
            commands::run_address(&config, &address, &city, &state, owners, flags.into()).await?
        }
        Commands::Name {
            name,
            city,
            state,
            property_address,
            mailing_address,
            flags,
        } => {
            commands::run_name(
                &config,
                &name,
                &property_address,
                &mailing_address,
                &city,
                &state,
                flags.into(),
            )
            .await?
        }
        Commands::Llc {
            llc_name,
            search,
            flags,
        } => commands::run_llc(&config, &llc_name, search, flags.into()).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

impl From<SearchFlags> for ownertrace_scraper::SearchOptions {
    fn from(flags: SearchFlags) -> Self {
        Self {
            max_pages: flags.max_pages,
            stop_after_match: flags.stop_after_match,
            extraction: if flags.cards {
                ownertrace_scraper::ExtractionStrategy::CardScan
            } else {
                ownertrace_scraper::ExtractionStrategy::StructuredData
            },
        }
    }
}
