use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};

use strata::{
    app::Strata,
    config::{Scope, Settings},
    core::{ErrorContext, ResolveResult},
    logging::Logger,
    routing::RouteRequest,
};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Resolve routes, configuration and translations of a layered project", long_about = None)]
struct Cli {
    /// Settings file (YAML)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    scope: Option<Scope>,

    /// Project root, overrides the settings file
    #[arg(long)]
    root: Option<PathBuf>,

    #[arg(long)]
    bundle: Option<String>,

    #[arg(long)]
    project: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a request path against the route table
    Route {
        path: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
        #[arg(long)]
        ajax: bool,
    },
    /// Print a configuration value by dotted key
    Config { key: String },
    /// Translate a dictionary key
    Translate {
        key: String,
        #[arg(short, long)]
        lang: Option<String>,
        args: Vec<String>,
    },
    /// Manage cached mappings
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Drop the cached mapping of a domain
    Clear { domain: CacheDomain },
}

#[derive(Clone, Copy, ValueEnum)]
enum CacheDomain {
    Routes,
    Config,
    Dictionary,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_settings(cli: &Cli) -> ResolveResult<Settings> {
    let mut settings = match (&cli.settings, &cli.root) {
        (Some(path), _) => Settings::load_from_yaml(path)?,
        (None, Some(root)) => Settings::new(root),
        (None, None) => Settings::new("."),
    };

    if let Some(root) = &cli.root {
        settings.project_root = root.clone();
    }
    if let Some(scope) = cli.scope {
        settings.scope = scope;
    }
    if cli.bundle.is_some() {
        settings.bundle = cli.bundle.clone();
    }
    if cli.project.is_some() {
        settings.project = cli.project.clone();
    }
    Ok(settings)
}

fn run(cli: Cli) -> ResolveResult<()> {
    let settings = load_settings(&cli)?;
    Logger::new(settings.log.clone()).init_env_logger()?;
    let mut app = Strata::new(settings)?;

    let output = match cli.command {
        Commands::Route { path, method, ajax } => {
            let request = RouteRequest::new(Some(&path), &method, ajax);
            let (resolved, matched) = app.router().resolve(&request)?;
            json!({
                "name": resolved.name(),
                "matched": matched,
                "route": &*resolved.route,
                "params": &resolved.params,
            })
        }
        Commands::Config { key } => app.config().get(&key)?.unwrap_or(Value::Null),
        Commands::Translate { key, lang, args } => {
            if let Some(lang) = lang {
                app.dictionary_mut().set_language(lang);
            }
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            Value::String(app.dictionary().translate(&key, &args)?)
        }
        Commands::Cache {
            command: CacheCommands::Clear { domain },
        } => {
            let cleared = match domain {
                CacheDomain::Routes => app.router().invalidate()?,
                CacheDomain::Config => app.config().invalidate()?,
                CacheDomain::Dictionary => app.dictionary().invalidate()?,
            };
            json!({ "cleared": cleared })
        }
    };

    match output {
        Value::String(text) => println!("{text}"),
        other => println!(
            "{}",
            serde_json::to_string_pretty(&other).with_context("Failed to render output")?
        ),
    }
    Ok(())
}
