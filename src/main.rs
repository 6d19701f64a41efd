use std::path::Path;
use std::sync::Arc;

use project_fileserver::classifier::{options, SqueezeNet, SQUEEZENET_OPTIONS_FILE};
use project_fileserver::config::{AppState, Config};
use project_fileserver::gateway::GatewayError;
use project_fileserver::{logger, server};

const DEFAULT_CONFIG: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let first = args.next();

    if first.as_deref() == Some("squeezenet-options") {
        let file = args.next().unwrap_or_else(|| SQUEEZENET_OPTIONS_FILE.to_string());
        return print_squeezenet_options(&file);
    }

    let cfg = Config::load_from(first.as_deref().unwrap_or(DEFAULT_CONFIG))?;
    logger::init(&cfg)?;

    // Worker count from config, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))?;
    Ok(())
}

async fn async_main(cfg: Config) -> Result<(), GatewayError> {
    let addr = cfg.get_socket_addr().map_err(GatewayError::InvalidAddress)?;
    let state = Arc::new(AppState::new(cfg)?);
    let listener = server::create_listener(addr)?;

    logger::log_server_start(
        &addr,
        &state.settings.static_dir().display().to_string(),
        state.settings.static_address(),
        &state.config,
    );

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            server::shutdown_signal(),
        ))
        .await;

    logger::log_info("Server stopped");
    Ok(())
}

fn print_squeezenet_options(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let opts =
        SqueezeNet::<()>::default_options(Path::new(file), &options::torchvision_defaults())?;
    println!("{}", serde_json::to_string_pretty(&opts)?);
    Ok(())
}
