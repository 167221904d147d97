//! Command-line front end for the directive compiler.
//!
//! `compile` runs one pass and prints the assembled config; `watch` keeps a
//! config file up to date as the tokenized input changes.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::sync::broadcast;

use directive_compiler::config::{load_settings, CompilerSettings};
use directive_compiler::observability::logging::init_logging;
use directive_compiler::reload::{ConfigApplier, FileApplier, InputWatcher, Reloader};
use directive_compiler::{AdapterInput, CompileInput, Compiler, DirectiveRegistry, ModuleTable};

#[derive(Parser)]
#[command(name = "directive-compiler")]
#[command(about = "Compile tokenized site configuration into HTTP routes", long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile once and print the resulting config
    Compile {
        /// Tokenized input (JSON)
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        pretty: bool,
    },
    /// Recompile whenever the input changes and write each accepted config
    Watch {
        /// Tokenized input (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file; defaults to `[output] path` from settings
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => CompilerSettings::default(),
    };
    init_logging(&settings.logging.level)?;

    let registry = DirectiveRegistry::with_builtins().install()?;
    let modules = ModuleTable::with_builtins().install()?;
    let compiler = Compiler::new(registry, modules);

    tracing::info!(
        directives = registry.names().len(),
        modules = modules.len(),
        "directive-compiler v0.1.0 starting"
    );

    match cli.command {
        Commands::Compile { input, pretty } => {
            let input = CompileInput::from(AdapterInput::from_path(&input)?)
                .with_options(settings.options())
                .with_matcher_defs(settings.matcher_defs());
            let compiled = compiler.compile(&input)?;

            for warning in &compiled.warnings {
                eprintln!("warning: {warning}");
            }

            let config = compiled.to_config();
            let blob = if pretty {
                serde_json::to_vec_pretty(&config)?
            } else {
                serde_json::to_vec(&config)?
            };
            if let Some(path) = &settings.output.path {
                FileApplier::new(path).apply(&blob)?;
            }
            println!("{}", String::from_utf8_lossy(&blob));
        }
        Commands::Watch { input, output } => {
            let output = output
                .or_else(|| settings.output.path.clone())
                .ok_or("watch needs an output path: pass --output or set [output] path")?;
            let reloader = Reloader::new(compiler, FileApplier::new(output)).with_settings(&settings);

            match AdapterInput::from_path(&input) {
                // Reload logs its own failures; keep watching for a fixed input.
                Ok(initial) => {
                    let _ = reloader.reload(initial.server_blocks);
                }
                Err(e) => tracing::warn!(path = ?input, error = %e, "Initial input unreadable, waiting for changes"),
            }

            let (watcher, updates) = InputWatcher::new(&input);
            let _watch_handle = watcher.run()?;

            let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupt received, shutting down");
                    let _ = shutdown_tx.send(());
                }
            });

            reloader.run(updates, shutdown_rx).await;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
