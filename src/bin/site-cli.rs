use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "site-cli")]
#[command(about = "Management CLI for the web-addresses site", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long)]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check site status
    Status,
    /// List rewrite rules in match order
    Rules,
    /// Show registered content types, endpoints and public query vars
    ContentTypes,
    /// List clients
    Clients,
    /// Create a client
    AddClient {
        /// URL slug of the client
        name: String,
        /// Display title
        title: String,
    },
    /// Show how a path resolves, without request filters
    Resolve {
        /// Site path, e.g. compare/alice+bob
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let request = match &cli.command {
        Commands::Status => client.get(format!("{}/admin/status", base)),
        Commands::Rules => client.get(format!("{}/admin/rewrite-rules", base)),
        Commands::ContentTypes => client.get(format!("{}/admin/content-types", base)),
        Commands::Clients => client.get(format!("{}/admin/clients", base)),
        Commands::AddClient { name, title } => client
            .post(format!("{}/admin/clients", base))
            .json(&json!({ "name": name, "title": title })),
        Commands::Resolve { path } => match path.trim_matches('/') {
            "" => client.get(format!("{}/admin/resolve", base)),
            path => client.get(format!("{}/admin/resolve/{}", base, path)),
        },
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
