use log::error;

use primedit::{EditorConfig, PrimeditApp};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = EditorConfig::load()?;
    PrimeditApp::new(config)?.run()
}
