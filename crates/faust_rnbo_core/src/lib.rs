//! Faust to RNBO patch generation
//!
//! Turns the output of the Faust compiler's RNBO backend (a `codebox~` program
//! and a JSON manifest) into a Max patch with an `rnbo~` device ready to open.
//! The crate owns a small model of the `.maxpat` format; it does no audio
//! processing.

pub mod builder;
pub mod error;
pub mod generate;
pub mod manifest;
pub mod maxpat;

// Re-export commonly used items
pub use builder::{BuildOptions, Optimization, create_rnbo_patch, write_rnbo_patch};
pub use error::{Result, RnboError};
pub use generate::{GenerationReport, gen_faust_rnbo, gen_faust_rnbo_with};
pub use manifest::{ControlDescriptor, DspManifest, WidgetKind, extract_controls};
pub use maxpat::{BoxId, MaxBox, Patcher, Rect};
