use tracing::error;
use tracing_subscriber::EnvFilter;

mod app;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(message) = app::run_demo() {
        error!(%message, "simulation failed");
        std::process::exit(1);
    }
}
