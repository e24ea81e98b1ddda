use std::time::Duration;

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fhirdesk::commands::{self, PersonInput};
use fhirdesk::form::GENDERS;
use fhirdesk::{DeskConfig, ResourceKind, connect};

/// fhirdesk: create and list FHIR Patient and Practitioner resources
#[derive(Parser, Debug)]
#[command(name = "fhirdesk", version, about)]
struct Cli {
    /// FHIR base URL (falls back to API_BASE_URL, then http://localhost:8080/fhir)
    #[arg(long, global = true, env = "FHIR_SERVER_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct PersonArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    /// Administrative gender
    #[arg(long, value_parser = PossibleValuesParser::new(GENDERS))]
    gender: String,
    /// Single address line
    #[arg(long)]
    address: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    email: String,
}

impl PersonArgs {
    fn into_input(self) -> PersonInput {
        PersonInput {
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender,
            address: self.address,
            phone: self.phone,
            email: self.email,
            birth_date: None,
            practitioner: None,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and print every resource of a type
    List {
        #[arg(value_enum)]
        kind: ResourceKind,
    },

    /// Keep the list on screen, refreshing periodically
    Watch {
        #[arg(value_enum)]
        kind: ResourceKind,

        /// Seconds between refreshes (defaults to FHIRDESK_POLL_SECS or 10)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Create a Patient
    CreatePatient {
        #[command(flatten)]
        person: PersonArgs,

        /// ISO 8601 date, e.g. 1990-01-31
        #[arg(long)]
        birth_date: String,

        /// Id of the patient's general practitioner
        #[arg(long)]
        practitioner: Option<String>,
    },

    /// Create a Practitioner
    CreatePractitioner {
        #[command(flatten)]
        person: PersonArgs,
    },

    /// Print one resource as JSON
    Read {
        #[arg(value_enum)]
        kind: ResourceKind,
        id: String,
    },

    /// Delete one resource
    Delete {
        #[arg(value_enum)]
        kind: ResourceKind,
        id: String,
    },

    /// Search with FHIR search parameters, e.g. `search patient family=Doe`
    Search {
        #[arg(value_enum)]
        kind: ResourceKind,

        #[arg(value_parser = commands::parse_search_param)]
        params: Vec<(String, String)>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fhirdesk=warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = DeskConfig::resolve(cli.base_url)?;
    tracing::debug!(base_url = config.base_url(), "configuration resolved");
    let client = connect(&config)?;

    match cli.command {
        Commands::List { kind } => commands::run_list(client, kind).await?,

        Commands::Watch { kind, interval } => {
            let poll_interval = match interval {
                Some(secs) if secs > 0 => Duration::from_secs(secs),
                Some(_) => return Err("--interval must be at least 1 second".into()),
                None => config.poll_interval(),
            };
            commands::run_watch(client, kind, poll_interval).await?
        }

        Commands::CreatePatient {
            person,
            birth_date,
            practitioner,
        } => {
            let input = PersonInput {
                birth_date: Some(birth_date),
                practitioner,
                ..person.into_input()
            };
            commands::run_create(client, ResourceKind::Patient, &input).await?;
        }

        Commands::CreatePractitioner { person } => {
            commands::run_create(client, ResourceKind::Practitioner, &person.into_input()).await?;
        }

        Commands::Read { kind, id } => commands::run_read(client, kind, &id).await?,

        Commands::Delete { kind, id } => commands::run_delete(client, kind, &id).await?,

        Commands::Search { kind, params } => {
            commands::run_search(client, kind, &params).await?
        }
    }

    Ok(())
}
