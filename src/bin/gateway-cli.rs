use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for the auth gateway", long_about = None)]
struct Cli {
    #[arg(long, default_value = "http://localhost:8080")]
    url: String,

    /// Operator username for basic auth.
    #[arg(short, long, env = "BASIC_AUTH_USR")]
    user: Option<String>,

    /// Operator password for basic auth.
    #[arg(short, long, env = "BASIC_AUTH_PWD")]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the gateway is alive
    Ping,
    /// Force a route cache reset
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Ping => client.get(format!("{}/authenv-service/tests/ping", base)),
        Commands::Reset => client.get(format!("{}/authenv-service/tests/reset", base)),
    };
    let request = match cli.user {
        Some(user) => request.basic_auth(user, cli.password),
        None => request,
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
