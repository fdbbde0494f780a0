//! GQM Planner - command line shell around the authoring core
//!
//! - [`logging`]: tracing subscriber from config and `RUST_LOG`
//! - [`listing`]: resolved catalog entries per level
//! - [`script`]: YAML authoring scripts replayed through the wizard
//!
//! The binary only parses arguments and wires these together.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod listing;
pub mod logging;
pub mod script;

use anyhow::Context;
use gqm_catalog::english_bundle;
use gqm_core::PlannerConfig;
use gqm_i18n::{MapTranslator, Translator};
use std::sync::Arc;

pub use listing::{catalog_rows, CatalogRow};
pub use logging::init_tracing;
pub use script::{AuthorOutcome, AuthorScript};

/// English bundle, overlaid with the configured locale bundle if any
///
/// # Errors
/// Fails if the configured bundle cannot be read or parsed.
pub fn load_translator(config: &PlannerConfig) -> anyhow::Result<Arc<dyn Translator>> {
    let mut bundle = english_bundle().context("built-in English bundle is malformed")?;
    if let Some(path) = &config.locale_bundle {
        let overlay = MapTranslator::load(path)
            .with_context(|| format!("failed to load locale bundle {}", path.display()))?;
        tracing::debug!(locale = overlay.locale(), entries = overlay.len(), "locale bundle loaded");
        bundle.merge(overlay);
    }
    Ok(Arc::new(bundle))
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
