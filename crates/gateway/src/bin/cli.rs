use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use gateway::commands;
use gateway::config::CliConfig;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Manage shareable login links and site settings for the login gateway")]
#[command(
    long_about = "A command-line interface for the login gateway's local files.\n\n\
    Creates, lists and deletes shareable links that prefill the login form,\n\
    edits presentation settings in site_config.json and the allowed email\n\
    domain in .env. Reads the same environment (and .env file) as the server."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a shareable link for an email
    ///
    /// The email must belong to ALLOWED_EMAIL_DOMAIN when that is set.
    /// Prints the new token and the full link built from APP_ORIGIN.
    Add {
        /// Email address the link will prefill.
        email: String,
    },

    /// List all saved links as token<TAB>email
    List,

    /// Delete a link so it no longer prefills the form
    Delete {
        /// The token to delete, as shown by 'list'.
        token: String,
    },

    /// Edit presentation settings and the allowed email domain
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },

    /// Copy *.sample.json files to their working names when those are missing
    InitSamples,
}

#[derive(Subcommand)]
enum SiteAction {
    /// Turn right-to-left layout on or off
    Rtl {
        #[arg(value_enum)]
        value: Toggle,
    },

    /// Set the accent colour used for buttons and focus rings
    Accent {
        /// A hex colour such as "#facc15" or a CSS colour name.
        #[arg(value_name = "COLOUR")]
        colour: String,
    },

    /// Set ALLOWED_EMAIL_DOMAIN in the .env file (applies on next start)
    Domain {
        /// A bare domain such as "keepa.ir", without '@'.
        domain: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gateway=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::from_env();
    let out = &mut std::io::stdout();

    let code = match cli.command {
        Commands::Add { email } => commands::add(&config, &email, out).await?,
        Commands::List => commands::list(&config, out).await?,
        Commands::Delete { token } => commands::delete(&config, &token, out).await?,
        Commands::Site { action } => match action {
            SiteAction::Rtl { value } => {
                commands::set_rtl(&config, matches!(value, Toggle::On), out).await?
            }
            SiteAction::Accent { colour } => commands::set_accent(&config, &colour, out).await?,
            SiteAction::Domain { domain } => commands::set_domain(&config, &domain, out).await?,
        },
        Commands::InitSamples => commands::init_samples(&config, out).await?,
    };

    Ok(ExitCode::from(code))
}
