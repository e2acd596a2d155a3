use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "nbkr-cli")]
#[command(about = "Query a running NBKR CORS proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show proxy info (allowed domains, aliases)
    Info,
    /// Probe upstream health through the proxy
    Health,
    /// Fetch an alias feed (daily, weekly, reference)
    Rates {
        #[arg(default_value = "daily")]
        alias: String,
    },
    /// Fetch an arbitrary allow-listed URL through the proxy
    Fetch { target: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Info => {
            let res = client.get(format!("{}/", base)).send().await?;
            print_json(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_json(res).await?;
        }
        Commands::Rates { alias } => {
            let res = client.get(format!("{}/nbkr/{}", base, alias)).send().await?;
            print_body(res).await?;
        }
        Commands::Fetch { target } => {
            let res = client
                .get(format!("{}/proxy", base))
                .query(&[("url", target.as_str())])
                .send()
                .await?;
            print_body(res).await?;
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn print_body(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Status: {}", status);
    }
    println!("{}", res.text().await?);
    Ok(())
}
