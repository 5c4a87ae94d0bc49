//! Faust DSP manifest parsing
//!
//! The Faust compiler emits a JSON description of a DSP alongside the
//! generated code. Only the channel counts and the UI tree matter here: the
//! UI tree is flattened into a list of [`ControlDescriptor`]s, one per
//! settable parameter, in depth-first order.

use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Result, RnboError};

/// The parts of a Faust JSON manifest used to build a patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DspManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: usize,
    #[serde(default)]
    pub outputs: usize,
    #[serde(default)]
    pub ui: Vec<UiItem>,
}

/// A node of the Faust UI tree: either a group holding `items` or a widget.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiItem {
    #[serde(rename = "type", default)]
    pub kind: WidgetKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub shortname: String,
    #[serde(default)]
    pub address: String,
    pub init: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    #[serde(default)]
    pub items: Vec<UiItem>,
}

/// Widget type as named by Faust (`"type"` in the manifest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WidgetKind {
    Button,
    Checkbox,
    HSlider,
    VSlider,
    NEntry,
    /// Groups, bargraphs, soundfiles and anything newer.
    Other(String),
}

impl WidgetKind {
    pub fn as_str(&self) -> &str {
        match self {
            WidgetKind::Button => "button",
            WidgetKind::Checkbox => "checkbox",
            WidgetKind::HSlider => "hslider",
            WidgetKind::VSlider => "vslider",
            WidgetKind::NEntry => "nentry",
            WidgetKind::Other(s) => s,
        }
    }

    /// Buttons and checkboxes only ever send 0 or 1.
    pub fn is_boolean(&self) -> bool {
        matches!(self, WidgetKind::Button | WidgetKind::Checkbox)
    }
}

impl Default for WidgetKind {
    fn default() -> Self {
        WidgetKind::Other(String::new())
    }
}

impl From<String> for WidgetKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "button" => WidgetKind::Button,
            "checkbox" => WidgetKind::Checkbox,
            "hslider" => WidgetKind::HSlider,
            "vslider" => WidgetKind::VSlider,
            "nentry" => WidgetKind::NEntry,
            _ => WidgetKind::Other(s),
        }
    }
}

impl From<WidgetKind> for String {
    fn from(kind: WidgetKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A settable DSP parameter extracted from the UI tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlDescriptor {
    pub shortname: String,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub init: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ControlDescriptor {
    pub fn is_boolean(&self) -> bool {
        self.kind.is_boolean()
    }
}

impl DspManifest {
    /// Parse a manifest from JSON text.
    ///
    /// Errors are classified as in [`DspManifest::from_path`], with `<string>`
    /// standing in for the file name.
    pub fn from_json_str(json: &str) -> Result<Self> {
        parse_manifest(json, Path::new("<string>"))
    }

    /// Read and parse a manifest file.
    ///
    /// Malformed JSON is reported as [`RnboError::Json`]; well-formed JSON with
    /// a field of the wrong type as [`RnboError::Manifest`] naming the field
    /// (e.g. `ui[0].min`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| RnboError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_manifest(&text, path)
    }

    pub fn controls(&self) -> Vec<ControlDescriptor> {
        extract_controls(self)
    }
}

fn parse_manifest(text: &str, origin: &Path) -> Result<DspManifest> {
    let syntax = |source: serde_json::Error| RnboError::Json {
        path: origin.to_path_buf(),
        source,
    };

    let mut de = serde_json::Deserializer::from_str(text);
    let manifest: DspManifest = serde_path_to_error::deserialize(&mut de).map_err(|err| {
        let field = err.path().to_string();
        let source = err.into_inner();
        match source.classify() {
            Category::Data => RnboError::Manifest(format!(
                "{}: field '{}': {}",
                origin.display(),
                field,
                source
            )),
            _ => syntax(source),
        }
    })?;
    de.end().map_err(syntax)?;
    Ok(manifest)
}

/// Flatten the manifest's UI tree into control descriptors.
///
/// Each item is emitted before its children. Boolean widgets always get the
/// range `[0, 1]` with step 1; other widgets are emitted only when they carry
/// `min`, `max` and `step`.
pub fn extract_controls(manifest: &DspManifest) -> Vec<ControlDescriptor> {
    let mut controls = Vec::new();
    extract_from_ui(&manifest.ui, &mut controls);
    controls
}

fn extract_from_ui(items: &[UiItem], out: &mut Vec<ControlDescriptor>) {
    for item in items {
        if let Some(control) = control_for_item(item) {
            if control.shortname.is_empty() {
                tracing::warn!(
                    "{} control at '{}' has no shortname",
                    control.kind,
                    item.address
                );
            }
            tracing::debug!(
                "control {} ({}) range [{}, {}] step {}",
                control.shortname,
                control.kind,
                control.min,
                control.max,
                control.step
            );
            out.push(control);
        }

        if !item.items.is_empty() {
            extract_from_ui(&item.items, out);
        }
    }
}

fn control_for_item(item: &UiItem) -> Option<ControlDescriptor> {
    if item.kind.is_boolean() {
        return Some(ControlDescriptor {
            shortname: item.shortname.clone(),
            kind: item.kind.clone(),
            init: 0.0,
            min: 0.0,
            max: 1.0,
            step: 1.0,
        });
    }

    let (min, max, step) = match (item.min, item.max, item.step) {
        (Some(min), Some(max), Some(step)) => (min, max, step),
        _ => return None,
    };

    Some(ControlDescriptor {
        shortname: item.shortname.clone(),
        kind: item.kind.clone(),
        init: item.init.unwrap_or(0.0),
        min,
        max,
        step,
    })
}
