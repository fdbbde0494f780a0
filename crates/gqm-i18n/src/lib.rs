//! GQM i18n - translation-key resolution
//!
//! Provides:
//! - The [`Translator`] collaborator contract and a bundle-backed
//!   [`MapTranslator`]
//! - Display resolution of single values ([`resolve_display`],
//!   [`resolve_display_str`])
//! - Whole-tree resolution of drafts into literal payloads ([`Resolve`])
//!
//! Resolution of a [`gqm_model::Text`] is a pattern match. Resolution of a
//! bare stored string falls back to the namespace prefix convention.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod resolve;
pub mod translator;

pub use error::BundleError;
pub use resolve::{resolve_display, resolve_display_str, resolve_plan_display, Resolve};
pub use translator::{IdentityTranslator, MapTranslator, Translator};
