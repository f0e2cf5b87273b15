use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use clap::Parser;
use env_logger::{Env, Target};
use quiz_attempt::{run, Config, ConfigError, ConfigStore, FileConfigStore, LaunchOptions};

const TOKEN_ENV: &str = "QUIZ_API_TOKEN";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the quiz API, e.g. http://localhost:5000/api
    #[arg(long)]
    api_url: Option<String>,

    /// Bearer token for the quiz API
    #[arg(long)]
    token: Option<String>,

    /// JSON file to read the quiz list from instead of the API
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Start this quiz immediately
    #[arg(long)]
    quiz: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Logging disabled, cannot create {}: {}", parent.display(), e);
            return;
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => env_logger::Builder::from_env(Env::default().default_filter_or("info"))
            .target(Target::Pipe(Box::new(file)))
            .init(),
        Err(e) => eprintln!("Logging disabled, cannot open {}: {}", path.display(), e),
    }
}

/// Load the config file and apply overrides. Problems with the file are
/// returned so they can be logged once logging is up.
fn resolve_config(args: &Args) -> (Config, Vec<ConfigError>) {
    let store = match &args.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let mut problems = Vec::new();
    let mut config = match store.try_load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            let config = Config::default();
            if let Err(e) = store.save(&config) {
                problems.push(e);
            }
            config
        }
        Err(e) => {
            problems.push(e);
            Config::default()
        }
    };

    if let Some(url) = &args.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(token) = &args.token {
        config.auth_token = Some(token.clone());
    }
    if config.auth_token.is_none() {
        config.auth_token = std::env::var(TOKEN_ENV).ok();
    }
    (config, problems)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    let (config, problems) = resolve_config(&args);
    init_logging(&config.resolved_log_path());
    for problem in problems {
        log::warn!("{}", problem);
        eprintln!("Warning: {}", problem);
    }

    let options = LaunchOptions {
        catalog_path: args.catalog,
        quiz_id: args.quiz,
    };

    if let Err(e) = run(config, options).await {
        log::error!("{}", e);
        eprintln!("Error running quiz: {}", e);
        std::process::exit(1);
    }
}
