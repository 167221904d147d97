//! Compile-apply-swap cycle.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use crate::compiler::{CompileInput, Compiled, Compiler};
use crate::config::CompilerSettings;
use crate::directives::Options;
use crate::error::CompileError;
use crate::matchers::MatcherDefs;
use crate::observability::metrics;
use crate::reload::applier::{ApplyError, ConfigApplier};
use crate::tokens::{AdapterInput, ServerBlock};

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to apply config: {0}")]
    Apply(#[from] ApplyError),
}

/// Holds the active compiled config and replaces it as new input arrives.
pub struct Reloader<'r, A> {
    compiler: Compiler<'r>,
    options: Options,
    matcher_defs: MatcherDefs,
    applier: A,
    active: ArcSwapOption<Compiled>,
}

impl<'r, A: ConfigApplier> Reloader<'r, A> {
    pub fn new(compiler: Compiler<'r>, applier: A) -> Self {
        Self {
            compiler,
            options: Options::new(),
            matcher_defs: MatcherDefs::new(),
            applier,
            active: ArcSwapOption::empty(),
        }
    }

    /// Use the global options and matcher aliases from settings for every pass.
    pub fn with_settings(mut self, settings: &CompilerSettings) -> Self {
        self.options = settings.options();
        self.matcher_defs = settings.matcher_defs();
        self
    }

    /// The last config the applier accepted, if any.
    pub fn active(&self) -> Option<Arc<Compiled>> {
        self.active.load_full()
    }

    pub fn applier(&self) -> &A {
        &self.applier
    }

    /// Compile, apply, then swap. On error the active config is untouched.
    pub fn reload(&self, server_blocks: Vec<ServerBlock>) -> Result<Arc<Compiled>, ReloadError> {
        let input = CompileInput::new(server_blocks)
            .with_options(self.options.clone())
            .with_matcher_defs(self.matcher_defs.clone());

        let result = self.compile_and_apply(&input);
        metrics::record_reload(result.is_ok());
        match &result {
            Ok(compiled) => tracing::info!(
                routes = compiled.route_count(),
                warnings = compiled.warnings.len(),
                "New config active"
            ),
            Err(e) => tracing::error!(
                error = %e,
                has_active = self.active.load().is_some(),
                "Reload failed, keeping current configuration"
            ),
        }
        result
    }

    fn compile_and_apply(&self, input: &CompileInput) -> Result<Arc<Compiled>, ReloadError> {
        let compiled = self.compiler.compile(input)?;
        let blob = compiled.to_json_bytes()?;
        self.applier.apply(&blob)?;

        let compiled = Arc::new(compiled);
        self.active.store(Some(Arc::clone(&compiled)));
        Ok(compiled)
    }

    /// Reload on every update until the channel closes or shutdown fires.
    pub async fn run(
        &self,
        mut updates: mpsc::UnboundedReceiver<AdapterInput>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    // Failures are logged by reload and leave the active config in place.
                    Some(input) => { let _ = self.reload(input.server_blocks); }
                    None => {
                        tracing::info!("Input channel closed, reloader exiting");
                        break;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Reloader received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
