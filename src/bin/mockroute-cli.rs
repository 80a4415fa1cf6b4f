use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use mockroute::routing::method::UnknownMethod;
use mockroute::routing::HttpMethod;

#[derive(Parser)]
#[command(name = "mockroute-cli")]
#[command(about = "Management CLI for a running mockroute server", long_about = None)]
struct Cli {
    /// Base URL of the admin surface.
    #[arg(short, long, default_value = "http://127.0.0.1:6767/__mock")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server status
    Status,
    /// List registered routes and their states
    Routes,
    /// List active states
    States,
    /// Activate a state for a route
    Set {
        /// Route pattern, e.g. /users/[userid]
        route: String,
        /// State tag to activate
        state: String,
        /// Restrict to one HTTP method (any case)
        #[arg(short, long, value_parser = parse_method)]
        method: Option<HttpMethod>,
    },
    /// Remove the state override of a route
    Clear {
        /// Route pattern, e.g. /users/[userid]
        route: String,
        /// Method of the override to remove (any case)
        #[arg(short, long, value_parser = parse_method)]
        method: Option<HttpMethod>,
    },
}

fn parse_method(s: &str) -> Result<HttpMethod, UnknownMethod> {
    s.to_ascii_uppercase().parse()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/status", cli.url)).send().await?,
        Commands::Routes => client.get(format!("{}/routes", cli.url)).send().await?,
        Commands::States => client.get(format!("{}/states", cli.url)).send().await?,
        Commands::Set { route, state, method } => {
            client
                .put(format!("{}/states", cli.url))
                .json(&json!({ "route": route, "method": method, "state": state }))
                .send()
                .await?
        }
        Commands::Clear { route, method } => {
            client
                .put(format!("{}/states", cli.url))
                .json(&json!({ "route": route, "method": method }))
                .send()
                .await?
        }
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_flag_ignores_case() {
        let cli = Cli::try_parse_from(["mockroute-cli", "set", "/users/[userid]", "ERR", "-m", "delete"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Set { method: Some(HttpMethod::Delete), .. }
        ));

        let cli = Cli::try_parse_from(["mockroute-cli", "clear", "/users/[userid]", "--method", "Put"]).unwrap();
        assert!(matches!(cli.command, Commands::Clear { method: Some(HttpMethod::Put), .. }));

        assert!(Cli::try_parse_from(["mockroute-cli", "clear", "/users", "-m", "fetch"]).is_err());
    }
}
