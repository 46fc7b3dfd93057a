use std::sync::Arc;
use std::time::Duration;

mod captcha;
mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;
mod store;
#[cfg(test)]
mod test_support;
mod voting;

use captcha::RecaptchaVerifier;
use config::AppState;
use store::DataApiStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Worker threads default to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    // One pooled client for both upstreams
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.upstream.timeout_secs))
        .build()?;
    let store = DataApiStore::new(client.clone(), &cfg.store);
    let captcha = RecaptchaVerifier::new(client, cfg.captcha.verify_url.clone());

    logger::log_server_start(&addr, &cfg);
    let state = Arc::new(AppState::new(cfg, store, captcha));

    // LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(listener, state))
        .await;

    Ok(())
}
