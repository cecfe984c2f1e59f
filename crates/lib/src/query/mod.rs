pub mod client;
pub mod jsonrpc;
pub mod types;

pub use client::QueryClient;
pub use jsonrpc::SuiRpcClient;
