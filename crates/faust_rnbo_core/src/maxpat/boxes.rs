//! Boxes and patch lines

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use super::Patcher;
use super::layout::Rect;

/// Identifier of a box inside one patcher (`obj-1`, `obj-2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BoxId(String);

impl BoxId {
    pub(crate) fn from_index(index: usize) -> Self {
        BoxId(format!("obj-{}", index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single object in a patcher.
#[derive(Debug, Clone, Serialize)]
pub struct MaxBox {
    pub id: BoxId,
    pub maxclass: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub numinlets: usize,
    pub numoutlets: usize,
    pub outlettype: Vec<String>,
    pub patching_rect: Rect,
    /// Class specific attributes (`code`, `minimum`, `saved_object_attributes`, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    /// Embedded patcher, for `rnbo~` and other container objects.
    #[serde(rename = "patcher", skip_serializing_if = "Option::is_none")]
    pub subpatcher: Option<Box<Patcher>>,
}

impl MaxBox {
    pub(crate) fn new(id: BoxId, maxclass: &str, io: ObjectIo, patching_rect: Rect) -> Self {
        MaxBox {
            id,
            maxclass: maxclass.to_string(),
            text: None,
            numinlets: io.inlets,
            numoutlets: io.outlets,
            outlettype: io.outlettype,
            patching_rect,
            attributes: Map::new(),
            subpatcher: None,
        }
    }

    pub(crate) fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub(crate) fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// First word of the box text, e.g. `in~` for `in~ 1`.
    pub fn object_name(&self) -> Option<&str> {
        self.text.as_deref().and_then(|t| t.split_whitespace().next())
    }
}

/// Inlet/outlet signature of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIo {
    pub inlets: usize,
    pub outlets: usize,
    pub outlettype: Vec<String>,
}

impl ObjectIo {
    pub fn new(inlets: usize, outlets: usize, outlettype: &[&str]) -> Self {
        ObjectIo {
            inlets,
            outlets,
            outlettype: outlettype.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// `outlets` signal outlets.
    pub fn signals(inlets: usize, outlets: usize) -> Self {
        ObjectIo {
            inlets,
            outlets,
            outlettype: vec!["signal".to_string(); outlets],
        }
    }

    /// Signature of a `newobj` box, looked up by the first word of its text.
    pub fn for_text(text: &str) -> Self {
        match text.split_whitespace().next().unwrap_or_default() {
            "ezdac~" => ObjectIo::new(2, 0, &[]),
            "in~" => ObjectIo::signals(0, 1),
            "out~" => ObjectIo::new(1, 0, &[]),
            _ => ObjectIo::new(1, 1, &[""]),
        }
    }
}

/// A connection from one box's outlet to another box's inlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patchline {
    pub source: (BoxId, usize),
    pub destination: (BoxId, usize),
}

impl Serialize for Patchline {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Inner<'a> {
            destination: (&'a BoxId, usize),
            source: (&'a BoxId, usize),
        }

        #[derive(Serialize)]
        struct Entry<'a> {
            patchline: Inner<'a>,
        }

        Entry {
            patchline: Inner {
                destination: (&self.destination.0, self.destination.1),
                source: (&self.source.0, self.source.1),
            },
        }
        .serialize(serializer)
    }
}
