//! In-memory model of a Max patcher (`.maxpat`)
//!
//! Only the objects needed to wrap a Faust DSP in an RNBO device are modelled:
//! comments, plain object boxes, toggles, `number~`, `codebox~` and `rnbo~`
//! with its embedded patcher. Boxes added without a position are placed by a
//! [`LayoutManager`].

mod boxes;
mod layout;

pub use boxes::{BoxId, MaxBox, ObjectIo, Patchline};
pub use layout::{DEFAULT_PATCHER_RECT, LayoutManager, Rect};

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::{PortDirection, Result, RnboError};

const TOGGLE_SIZE: (f64, f64) = (24.0, 24.0);

/// Class namespace of a patcher: plain Max, or the inside of an `rnbo~`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Box,
    Rnbo,
}

#[derive(Debug, Clone, Serialize)]
struct AppVersion {
    major: u32,
    minor: u32,
    revision: u32,
    architecture: &'static str,
    modernui: u32,
}

impl Default for AppVersion {
    fn default() -> Self {
        AppVersion {
            major: 8,
            minor: 5,
            revision: 5,
            architecture: "x64",
            modernui: 1,
        }
    }
}

/// A patcher: boxes, the lines between them and the window rect.
#[derive(Debug, Clone, Serialize)]
pub struct Patcher {
    fileversion: u32,
    appversion: AppVersion,
    classnamespace: Namespace,
    rect: Rect,
    default_fontsize: f64,
    default_fontface: u32,
    default_fontname: &'static str,
    gridonopen: u32,
    gridsize: [f64; 2],
    gridsnaponopen: u32,
    objectsnaponopen: u32,
    statusbarvisible: u32,
    toolbarvisible: u32,
    boxanimatetime: u32,
    enablehscroll: u32,
    enablevscroll: u32,
    description: &'static str,
    digest: &'static str,
    tags: &'static str,
    style: &'static str,
    #[serde(serialize_with = "serialize_boxes")]
    boxes: Vec<MaxBox>,
    lines: Vec<Patchline>,
    dependency_cache: Vec<Value>,
    autosave: u32,
    #[serde(skip)]
    layout: LayoutManager,
}

fn serialize_boxes<S: Serializer>(
    boxes: &[MaxBox],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Entry<'a> {
        #[serde(rename = "box")]
        inner: &'a MaxBox,
    }

    serializer.collect_seq(boxes.iter().map(|inner| Entry { inner }))
}

impl Patcher {
    /// An empty top level patcher.
    pub fn new() -> Self {
        Self::with_namespace(Namespace::Box)
    }

    /// An empty patcher for the inside of an `rnbo~` object.
    pub fn rnbo() -> Self {
        Self::with_namespace(Namespace::Rnbo)
    }

    fn with_namespace(classnamespace: Namespace) -> Self {
        Patcher {
            fileversion: 1,
            appversion: AppVersion::default(),
            classnamespace,
            rect: DEFAULT_PATCHER_RECT,
            default_fontsize: 12.0,
            default_fontface: 0,
            default_fontname: "Arial",
            gridonopen: 1,
            gridsize: [15.0, 15.0],
            gridsnaponopen: 1,
            objectsnaponopen: 1,
            statusbarvisible: 2,
            toolbarvisible: 1,
            boxanimatetime: 200,
            enablehscroll: 1,
            enablevscroll: 1,
            description: "",
            digest: "",
            tags: "",
            style: "",
            boxes: Vec::new(),
            lines: Vec::new(),
            dependency_cache: Vec::new(),
            autosave: 0,
            layout: LayoutManager::new(DEFAULT_PATCHER_RECT),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.classnamespace
    }

    pub fn boxes(&self) -> &[MaxBox] {
        &self.boxes
    }

    pub fn lines(&self) -> &[Patchline] {
        &self.lines
    }

    pub fn get(&self, id: &BoxId) -> Option<&MaxBox> {
        self.boxes.iter().find(|b| &b.id == id)
    }

    /// Lines whose destination is `id`.
    pub fn lines_into<'a>(&'a self, id: &'a BoxId) -> impl Iterator<Item = &'a Patchline> + 'a {
        self.lines.iter().filter(move |l| &l.destination.0 == id)
    }

    /// Lines whose source is `id`.
    pub fn lines_from<'a>(&'a self, id: &'a BoxId) -> impl Iterator<Item = &'a Patchline> + 'a {
        self.lines.iter().filter(move |l| &l.source.0 == id)
    }

    /// Boxes whose text starts with the object name `name`.
    pub fn objects_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MaxBox> + 'a {
        self.boxes
            .iter()
            .filter(move |b| b.maxclass == "newobj" && b.object_name() == Some(name))
    }

    fn next_id(&self) -> BoxId {
        BoxId::from_index(self.boxes.len() + 1)
    }

    fn place(&mut self, rect: Option<Rect>, size: Option<(f64, f64)>) -> Rect {
        rect.unwrap_or_else(|| self.layout.next_rect(size))
    }

    fn push(&mut self, max_box: MaxBox) -> BoxId {
        let id = max_box.id.clone();
        tracing::trace!("add {} {} {:?}", id, max_box.maxclass, max_box.text);
        self.boxes.push(max_box);
        id
    }

    pub fn add_comment(&mut self, text: &str, rect: Option<Rect>) -> BoxId {
        let rect = self.place(rect, None);
        let b = MaxBox::new(self.next_id(), "comment", ObjectIo::new(1, 0, &[]), rect)
            .with_text(text);
        self.push(b)
    }

    /// A generic object box; inlets and outlets come from [`ObjectIo::for_text`].
    pub fn add_textbox(&mut self, text: &str, rect: Option<Rect>) -> BoxId {
        let rect = self.place(rect, None);
        let b = MaxBox::new(self.next_id(), "newobj", ObjectIo::for_text(text), rect)
            .with_text(text);
        self.push(b)
    }

    pub fn add_toggle(&mut self, rect: Option<Rect>) -> BoxId {
        let rect = self.place(rect, Some(TOGGLE_SIZE));
        let b = MaxBox::new(self.next_id(), "toggle", ObjectIo::new(1, 1, &["int"]), rect)
            .with_attribute("parameter_enable", 0);
        self.push(b)
    }

    /// Signal number box in output mode, starting at `init` and clamped to `[min, max]`.
    pub fn add_number_tilde(
        &mut self,
        init: f64,
        min: f64,
        max: f64,
        rect: Option<Rect>,
    ) -> BoxId {
        let rect = self.place(rect, None);
        let b = MaxBox::new(
            self.next_id(),
            "number~",
            ObjectIo::new(2, 2, &["signal", "float"]),
            rect,
        )
        .with_attribute("mode", 1)
        .with_attribute("sig", init)
        .with_attribute("minimum", min)
        .with_attribute("maximum", max);
        self.push(b)
    }

    pub fn add_codebox_tilde(
        &mut self,
        code: &str,
        inlets: usize,
        outlets: usize,
        rect: Option<Rect>,
    ) -> BoxId {
        let rect = self.place(rect, None);
        let b = MaxBox::new(self.next_id(), "codebox~", ObjectIo::signals(inlets, outlets), rect)
            .with_attribute("code", code)
            .with_attribute("fontface", 0)
            .with_attribute("fontname", "<Monospaced>")
            .with_attribute("fontsize", 12.0);
        self.push(b)
    }

    /// An `rnbo~` device wrapping `subpatcher`.
    ///
    /// The device gets one inlet per `in~` in the subpatcher (at least one, for
    /// messages) and one signal outlet per `out~`.
    pub fn add_rnbo(
        &mut self,
        mut subpatcher: Patcher,
        saved_object_attributes: Map<String, Value>,
        rect: Option<Rect>,
    ) -> BoxId {
        subpatcher.classnamespace = Namespace::Rnbo;
        let inlets = subpatcher.objects_named("in~").count().max(1);
        let outlets = subpatcher.objects_named("out~").count();

        let rect = self.place(rect, None);
        let io = ObjectIo::signals(inlets, outlets);
        let mut b = MaxBox::new(self.next_id(), "newobj", io, rect)
            .with_text("rnbo~")
            .with_attribute("autosave", 0)
            .with_attribute("saved_object_attributes", Value::Object(saved_object_attributes));
        b.subpatcher = Some(Box::new(subpatcher));
        self.push(b)
    }

    /// Connect `outlet` of `src` to `inlet` of `dst`.
    pub fn add_line(
        &mut self,
        src: &BoxId,
        outlet: usize,
        dst: &BoxId,
        inlet: usize,
    ) -> Result<()> {
        let source = self.get(src).ok_or_else(|| RnboError::UnknownBox(src.clone()))?;
        if outlet >= source.numoutlets {
            return Err(RnboError::PortOutOfRange {
                id: src.clone(),
                direction: PortDirection::Outlet,
                index: outlet,
                available: source.numoutlets,
            });
        }

        let destination = self.get(dst).ok_or_else(|| RnboError::UnknownBox(dst.clone()))?;
        if inlet >= destination.numinlets {
            return Err(RnboError::PortOutOfRange {
                id: dst.clone(),
                direction: PortDirection::Inlet,
                index: inlet,
                available: destination.numinlets,
            });
        }

        self.lines.push(Patchline {
            source: (src.clone(), outlet),
            destination: (dst.clone(), inlet),
        });
        Ok(())
    }

    /// The patcher as a `.maxpat` document, indented with four spaces.
    pub fn to_json_string(&self) -> std::result::Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Document<'a> {
            patcher: &'a Patcher,
        }

        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        Document { patcher: self }.serialize(&mut ser)?;
        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Serialize and write the patcher to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_string().map_err(|source| RnboError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| RnboError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            "Wrote {} boxes and {} lines to {}",
            self.boxes.len(),
            self.lines.len(),
            path.display()
        );
        Ok(())
    }
}

impl Default for Patcher {
    fn default() -> Self {
        Self::new()
    }
}
