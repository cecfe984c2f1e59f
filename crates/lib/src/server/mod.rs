pub mod method;
pub mod rpc;
#[allow(clippy::module_inception)]
pub mod server;

pub use rpc::SkittyRpc;
pub use server::run_rpc_server;
