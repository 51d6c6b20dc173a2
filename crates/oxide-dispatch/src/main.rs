//! oxide-dispatch CLI
//!
//! Inspect a route manifest and try requests against it.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_dispatch::manifest::{HandlerRegistry, RouteManifest};
use oxide_dispatch::{
    DEFAULT_NOT_FOUND_STATUS, Dispatcher, DispatcherConfig, Method, Request, Response,
};

/// Route table inspector and request dispatcher.
#[derive(Parser)]
#[command(name = "oxide-dispatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route manifest (JSON).
    #[arg(short, long, env = "OXIDE_ROUTES", default_value = "routes.json")]
    routes: PathBuf,

    /// Public base URL; its path is stripped from incoming paths.
    #[arg(short, long, env = "OXIDE_BASE_URL")]
    base_url: Option<String>,

    /// Explicit path prefix, overriding the base URL's path.
    #[arg(long, env = "OXIDE_PREFIX")]
    prefix: Option<String>,

    /// Status for unmatched paths.
    #[arg(long, env = "OXIDE_NOT_FOUND_STATUS", default_value_t = DEFAULT_NOT_FOUND_STATUS)]
    not_found_status: u16,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes in registration order.
    Routes,

    /// Show which route a request resolves to.
    Resolve {
        /// HTTP method.
        method: Method,
        /// Request target, e.g. `/users/42?page=2`.
        target: String,
    },

    /// Run a request through the dispatcher and print the response.
    Dispatch {
        /// HTTP method.
        method: Method,
        /// Request target, e.g. `/users/42?page=2`.
        target: String,
    },
}

impl Cli {
    fn config(&self) -> DispatcherConfig {
        DispatcherConfig {
            base_url: self.base_url.clone(),
            prefix: self.prefix.clone(),
            not_found_status: self.not_found_status,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let manifest = RouteManifest::load(&cli.routes)?;
    let table = manifest.build(&HandlerRegistry::builtin())?;
    info!(
        "Loaded {} route patterns from {}",
        table.len(),
        cli.routes.display()
    );

    let dispatcher = Dispatcher::with_config(table, &cli.config())?;
    if !dispatcher.prefix().is_empty() {
        info!("Stripping prefix {:?}", dispatcher.prefix());
    }

    match cli.command {
        Commands::Routes => {
            println!("{:<40} {:<24} VARIABLES", "TEMPLATE", "METHODS");
            println!("{:-<80}", "");
            for (pattern, entry) in dispatcher.table().routes() {
                let methods = entry
                    .methods()
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
                println!(
                    "{:<40} {:<24} {}",
                    pattern.template(),
                    methods,
                    pattern.variables().join(",")
                );
            }
        }

        Commands::Resolve { method, target } => {
            let request = Request::from_target(method, &target);
            match dispatcher.resolve(&request) {
                Ok(found) => {
                    println!("{} {}", method, found.pattern.template());
                    for (name, value) in found.variables.iter() {
                        println!("  {name} = {value:?}");
                    }
                    let handler = found.binding.handler().map_or("<none>", |_| "bound");
                    println!("  handler: {handler}");
                }
                Err(err) => {
                    println!("{} {}", dispatcher.status_for(&err), err.message());
                    info!("{err}");
                }
            }
        }

        Commands::Dispatch { method, target } => {
            let response = dispatcher
                .dispatch(Request::from_target(method, &target))
                .await;
            print_response(&response);
        }
    }

    Ok(())
}

fn print_response(response: &Response) {
    println!("{} {}", response.status, response.status_text());
    let mut headers: Vec<_> = response.headers.iter().collect();
    headers.sort();
    for (key, value) in headers {
        println!("{key}: {value}");
    }
    println!();
    println!("{}", String::from_utf8_lossy(&response.body));
}
