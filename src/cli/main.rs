use clap::{Parser, Subcommand};
use incident_service::models::{
    CreateIncidentRequest, IncidentStatus, Severity, UpdateIncidentRequest,
};
use reqwest::{Client, Response};
use std::error::Error;

#[derive(Parser)]
#[command(name = "incident-cli")]
#[command(about = "Incident service CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "INCIDENT_SERVICE_URL", default_value = "http://localhost:8000")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an incident
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: String,

        /// Critical, High, Medium or Low
        #[arg(short, long, default_value = "Medium")]
        severity: Severity,
    },

    /// List incidents
    List,

    /// Get incident details
    Get {
        #[arg(value_name = "INCIDENT_ID")]
        id: i64,
    },

    /// Update selected fields of an incident
    Update {
        #[arg(value_name = "INCIDENT_ID")]
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        severity: Option<Severity>,

        /// Open, "In Progress", Resolved or Closed
        #[arg(short = 'S', long)]
        status: Option<IncidentStatus>,
    },

    /// Delete an incident
    Delete {
        #[arg(value_name = "INCIDENT_ID")]
        id: i64,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();
    let endpoint = cli.endpoint.trim_end_matches('/');

    match cli.command {
        Commands::Create {
            title,
            description,
            severity,
        } => {
            let response = client
                .post(format!("{}/incidents", endpoint))
                .json(&CreateIncidentRequest {
                    title,
                    description,
                    severity,
                })
                .send()
                .await?;

            print_json(response).await?;
        }

        Commands::List => {
            let response = client.get(format!("{}/incidents", endpoint)).send().await?;
            print_json(response).await?;
        }

        Commands::Get { id } => {
            let response = client
                .get(format!("{}/incidents/{}", endpoint, id))
                .send()
                .await?;

            print_json(response).await?;
        }

        Commands::Update {
            id,
            title,
            description,
            severity,
            status,
        } => {
            let response = client
                .put(format!("{}/incidents/{}", endpoint, id))
                .json(&UpdateIncidentRequest {
                    title,
                    description,
                    severity,
                    status,
                })
                .send()
                .await?;

            print_json(response).await?;
        }

        Commands::Delete { id } => {
            let response = client
                .delete(format!("{}/incidents/{}", endpoint, id))
                .send()
                .await?;

            println!("{}", response.status());
        }

        Commands::Health => {
            let response = client.get(format!("{}/health", endpoint)).send().await?;
            print_json(response).await?;
        }
    }

    Ok(())
}

async fn print_json(response: Response) -> Result<(), Box<dyn Error>> {
    let status = response.status();
    let body: serde_json::Value = response.json().await?;

    if !status.is_success() {
        eprintln!("{}", status);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
