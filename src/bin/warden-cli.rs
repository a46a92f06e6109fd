use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "warden-cli")]
#[command(about = "Operator CLI for the fleet warden", long_about = None)]
struct Cli {
    /// Base URL of the warden instance.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token for the trigger endpoint.
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep-alive scheduler status
    Status,
    /// Full health report
    Health {
        /// Include the host diagnostics snapshot
        #[arg(long)]
        detailed: bool,
    },
    /// Readiness report
    Ready,
    /// Liveness report
    Live,
    /// Run one sibling ping cycle now (requires --token)
    Trigger,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/health/keepalive", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health { detailed } => {
            let mut url = format!("{}/health", cli.url);
            if detailed {
                url.push_str("?detailed=true");
            }
            let res = client.get(url).send().await?;
            print_response(res).await?;
        }
        Commands::Ready => {
            let res = client
                .get(format!("{}/health/ready", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Live => {
            let res = client
                .get(format!("{}/health/live", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Trigger => {
            let token = cli
                .token
                .ok_or("the trigger endpoint requires --token")?;
            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );

            let res = client
                .post(format!("{}/health/keepalive/trigger", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body: Value = res.json().await?;
    println!("HTTP {}", status);
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
