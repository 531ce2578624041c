use bundle_host::config::Config;
use bundle_host::hosting::BundleHost;
use bundle_host::{logger, server};
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "host";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Bundles are read once; a bad manifest stops startup here
    let host = Arc::new(BundleHost::from_config(&cfg)?);
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&addr, &cfg);
    server::serve(listener, host, cfg.performance.clone()).await?;
    Ok(())
}
