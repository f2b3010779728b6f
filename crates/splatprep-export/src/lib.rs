#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Export job configuration.
pub mod config;

mod error;
pub use crate::error::{ErrorKind, ExportError};

/// The export state machine.
pub mod exporter;

/// The live scene an export reads from and temporarily extends.
pub mod scene;

/// Scoped ownership of the scene mutations made by an export.
pub mod session;

pub use crate::config::ExportConfig;
pub use crate::exporter::{ExportReport, ExportState, Exporter};
pub use crate::scene::Scene;
