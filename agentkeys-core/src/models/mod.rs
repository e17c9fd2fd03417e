//! Model discovery and resolution.
//!
//! This module provides:
//! - `ModelLister` - Source of a provider's advertised models (`HttpModelLister` over HTTP)
//! - `ModelResolution` - Selectable models and the provider serving each
//! - `discover_models` - Queries every credentialed provider

mod lister;
mod resolution;
mod types;

pub use lister::{discover_models, HttpModelLister, ModelLister};
pub use resolution::ModelResolution;
pub use types::ModelListError;
