use std::process;
use std::sync::Arc;

use wasm_asset_server::config::{AppState, Config};
use wasm_asset_server::{logger, server};

fn main() {
    if let Err(e) = run() {
        logger::log_error(&e.to_string());
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        if workers == 0 {
            return Err("server.workers must be at least 1".into());
        }
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr)
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;

    logger::log_server_start(&listener.local_addr()?, &cfg);

    let state = Arc::new(AppState::new(cfg)?);
    server::run(listener, state, server::shutdown_signal()).await;
    Ok(())
}
