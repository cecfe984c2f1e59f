use crate::{explain::ExplainRateLimiter, server::rpc::SkittyRpc};

#[cfg(not(test))]
use crate::state::get_config;

#[cfg(test)]
use crate::tests::config_mock::mock_state::get_config;

use http::{header, Method};
use jsonrpsee::{
    server::{middleware::proxy_get_request::ProxyGetRequestLayer, ServerBuilder, ServerHandle},
    RpcModule,
};
use std::{net::SocketAddr, time::Duration};
use tower::limit::RateLimitLayer;
use tower_http::cors::CorsLayer;

pub struct ServerHandles {
    pub rpc_handle: ServerHandle,
}

pub async fn run_rpc_server(rpc: SkittyRpc, port: u16) -> Result<ServerHandles, anyhow::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    log::info!("RPC server started on {addr}, port {port}");

    // Initialize the explain quota limiter
    if let Err(e) = ExplainRateLimiter::init_rate_limiter().await {
        log::error!("Failed to initialize explain limiter: {e}");
        return Err(anyhow::anyhow!("Explain limiter initialization failed: {e}"));
    }

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::POST, Method::GET])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let config = get_config()?;

    let middleware = tower::ServiceBuilder::new()
        .layer(ProxyGetRequestLayer::new("/liveness", "liveness")?)
        .layer(RateLimitLayer::new(config.rpc_server.rate_limit, Duration::from_secs(1)))
        .layer(cors);

    let server = ServerBuilder::default()
        .max_request_body_size(config.rpc_server.max_request_body_size as u32)
        .set_middleware(middleware)
        .http_only()
        .build(addr)
        .await?;

    let rpc_module = build_rpc_module(rpc)?;

    let rpc_handle = server
        .start(rpc_module)
        .map_err(|e| anyhow::anyhow!("Failed to start RPC server: {}", e))?;

    Ok(ServerHandles { rpc_handle })
}

fn build_rpc_module(rpc: SkittyRpc) -> Result<RpcModule<SkittyRpc>, anyhow::Error> {
    let mut module = RpcModule::new(rpc);

    let _ = module.register_async_method("liveness", |_rpc_params, rpc_context| async move {
        let rpc = rpc_context.as_ref();
        rpc.liveness().await.map_err(Into::into)
    });

    let _ = module.register_async_method(
        "sponsorTransaction",
        |rpc_params, rpc_context| async move {
            let rpc = rpc_context.as_ref();
            let params = rpc_params.parse()?;
            rpc.sponsor_transaction(params).await.map_err(Into::into)
        },
    );

    let _ = module.register_async_method(
        "explainTransaction",
        |rpc_params, rpc_context| async move {
            let rpc = rpc_context.as_ref();
            let params = rpc_params.parse()?;
            rpc.explain_transaction(params).await.map_err(Into::into)
        },
    );

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::query_mock::QueryMockBuilder;

    #[test]
    fn test_build_rpc_module_registers_methods() {
        let rpc = SkittyRpc::new(QueryMockBuilder::new().build());
        let module = build_rpc_module(rpc).unwrap();
        let method_names: Vec<&str> = module.method_names().collect();
        assert_eq!(method_names.len(), 3);
        assert!(method_names.contains(&"liveness"));
        assert!(method_names.contains(&"sponsorTransaction"));
        assert!(method_names.contains(&"explainTransaction"));
    }
}
