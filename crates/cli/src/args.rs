use clap::Parser;

/// Global arguments used by all subcommands
#[derive(Debug, Parser)]
#[command(name = "skitty")]
pub struct GlobalArgs {
    /// Sui fullnode JSON-RPC endpoint URL
    #[arg(long, env = "RPC_URL", default_value = "https://fullnode.mainnet.sui.io:443")]
    pub rpc_url: String,

    /// Path to Skitty configuration file (TOML format)
    #[arg(long, default_value = "skitty.toml")]
    pub config: String,
}
