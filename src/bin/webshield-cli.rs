use clap::{ArgGroup, Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "webshield-cli")]
#[command(about = "Command-line client for the WebShield scanner", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Admin bearer key, needed for `rate-limiting` when the server sets one.
    #[arg(short, long, env = "WEBSHIELD_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the server is up
    Health,
    /// Classify a payload
    Scan {
        payload: String,
    },
    /// Show the current scan settings
    Config,
    /// Change scan settings
    SetConfig {
        /// Low, Medium or Paranoid (any case)
        #[arg(long)]
        sensitivity: Option<String>,
        #[arg(long)]
        safe_mode: Option<bool>,
    },
    /// Show recent scan records, newest first
    Logs {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show or flip the global rate limiting switch
    #[command(group(ArgGroup::new("toggle").args(["enable", "disable"])))]
    RateLimiting {
        #[arg(long)]
        enable: bool,
        #[arg(long)]
        disable: bool,
    },
    /// Show rate limit policies and tracked windows
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    let request = match cli.command {
        Commands::Health => client.get(format!("{}/health", cli.url)),
        Commands::Scan { payload } => client
            .post(format!("{}/scan", cli.url))
            .json(&json!({ "payload": payload })),
        Commands::Config => client.get(format!("{}/config", cli.url)),
        Commands::SetConfig { sensitivity, safe_mode } => {
            let mut body = Map::new();
            if let Some(sensitivity) = sensitivity {
                body.insert("sensitivity".into(), Value::String(sensitivity));
            }
            if let Some(safe_mode) = safe_mode {
                body.insert("safe_mode".into(), Value::Bool(safe_mode));
            }
            client.post(format!("{}/config", cli.url)).json(&body)
        }
        Commands::Logs { limit } => {
            let request = client.get(format!("{}/logs", cli.url));
            match limit {
                Some(limit) => request.query(&[("limit", limit)]),
                None => request,
            }
        }
        Commands::RateLimiting { enable, disable } => {
            let url = format!("{}/rate-limiting", cli.url);
            if enable || disable {
                client.post(url).json(&json!({ "enabled": enable }))
            } else {
                client.get(url)
            }
        }
        Commands::Stats => client.get(format!("{}/rate-limit-stats", cli.url)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Some(retry_after) = res.headers().get(reqwest::header::RETRY_AFTER) {
            eprintln!("Retry after: {}s", retry_after.to_str().unwrap_or("?"));
        }
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
