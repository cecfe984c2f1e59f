mod args;
mod reclaim;

use args::GlobalArgs;
use clap::{Parser, Subcommand};
use skitty_lib::{
    error::SkittyError,
    log::LoggingFormat,
    rpc::get_query_client,
    server::{run_rpc_server, server::ServerHandles, SkittyRpc},
    state::{init_config, init_sponsor_from_env},
    Config,
};
use std::path::Path;

#[derive(Subcommand)]
enum Commands {
    /// Scan an address or name-service domain for reclaimable objects
    Scan {
        /// Wallet address (0x...) or .sui domain
        target: String,
    },
    /// Build, simulate, and optionally execute a sponsored reclaim batch
    Reclaim {
        /// Wallet address (0x...) or .sui domain
        target: String,

        /// Submit the transaction (default is dry-run)
        #[arg(long, default_value_t = false)]
        execute: bool,
    },
    /// RPC server operations
    Rpc {
        #[command(subcommand)]
        rpc_command: RpcCommands,
    },
}

#[derive(Subcommand)]
enum RpcCommands {
    /// Start the sponsorship/explanation RPC server
    Start {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Output format for logs (standard or json)
        #[arg(long, default_value = "standard")]
        logging_format: LoggingFormat,
    },
}

#[derive(Parser)]
#[command(author, version, about = "Skitty - Sui storage-rebate reclaimer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    pub global_args: GlobalArgs,
}

#[tokio::main]
async fn main() -> Result<(), SkittyError> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // a missing config file falls back to defaults; a broken one is fatal
    let config = if Path::new(&cli.global_args.config).exists() {
        Config::load_config(&cli.global_args.config).unwrap_or_else(|e| {
            print_error(&format!("Failed to load config: {e}"));
            std::process::exit(1);
        })
    } else {
        Config::default()
    };

    init_config(config).unwrap_or_else(|e| {
        print_error(&format!("Failed to initialize config: {e}"));
        std::process::exit(1);
    });

    let query_client = get_query_client(&cli.global_args.rpc_url).unwrap_or_else(|e| {
        print_error(&format!("Failed to create query client: {e}"));
        std::process::exit(1);
    });

    match cli.command {
        Some(Commands::Scan { target }) => {
            setup_logging(&LoggingFormat::Standard);
            reclaim::handle_scan(query_client, &target).await?;
        }
        Some(Commands::Reclaim { target, execute }) => {
            setup_logging(&LoggingFormat::Standard);

            // reclaiming needs the sponsor identity to countersign
            init_sponsor_from_env().unwrap_or_else(|e| {
                print_error(&format!("Failed to initialize sponsor: {e}"));
                std::process::exit(1);
            });

            reclaim::handle_reclaim(query_client, &target, execute).await?;
        }
        Some(Commands::Rpc { rpc_command }) => match rpc_command {
            RpcCommands::Start { port, logging_format } => {
                setup_logging(&logging_format);

                init_sponsor_from_env().unwrap_or_else(|e| {
                    print_error(&format!("Failed to initialize sponsor: {e}"));
                    std::process::exit(1);
                });

                let port = port.unwrap_or_else(|| {
                    skitty_lib::state::get_config()
                        .map(|config| config.rpc_server.port)
                        .unwrap_or(8080)
                });

                let skitty_rpc = SkittyRpc::new(query_client);
                let ServerHandles { rpc_handle } = run_rpc_server(skitty_rpc, port)
                    .await
                    .map_err(|e| SkittyError::InternalServerError(e.to_string()))?;

                if let Err(e) = tokio::signal::ctrl_c().await {
                    panic!("Error waiting for Ctrl+C signal: {e:?}");
                }
                println!("Shutting down server...");

                if let Err(e) = rpc_handle.stop() {
                    panic!("Error stopping RPC server: {e:?}");
                }
            }
        },
        None => {
            println!("No command specified. Use --help for usage information.");
            println!("Available commands:");
            println!("  scan <target>      - Scan an address for reclaimable objects");
            println!("  reclaim <target>   - Simulate (and with --execute, submit) a reclaim");
            println!("  rpc start          - Start the sponsorship RPC server");
        }
    }

    Ok(())
}

fn print_error(message: &str) {
    eprintln!("Error: {message}");
}

fn setup_logging(format: &LoggingFormat) {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,jsonrpsee_server=warn".into());

    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter);
    match format {
        LoggingFormat::Standard => subscriber.init(),
        LoggingFormat::Json => subscriber.json().init(),
    }
}
