use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "hub-cli")]
#[command(about = "Management CLI for the egress hub", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin API key, required for enable/disable.
    #[arg(short, long, env = "EGRESS_HUB_ADMIN_KEY", default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check hub status
    Status,
    /// List path health and counters
    Paths,
    /// Show recorded health samples for a path
    History { name: String },
    /// Put a path back into rotation
    Enable { name: String },
    /// Take a path out of rotation
    Disable { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if !cli.key.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
        );
    }

    let request = match &cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::Paths => client.get(format!("{}/admin/paths", cli.url)),
        Commands::History { name } => {
            client.get(format!("{}/admin/paths/{}/history", cli.url, name))
        }
        Commands::Enable { name } => {
            client.post(format!("{}/admin/paths/{}/enable", cli.url, name))
        }
        Commands::Disable { name } => {
            client.post(format!("{}/admin/paths/{}/disable", cli.url, name))
        }
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprintln!("Response: {}", text);
            }
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
