//! Builds the RNBO patch around a Faust codebox
//!
//! The generated patch is always the same shape:
//!
//! ```text
//! comment
//! rnbo~ ──────────────── ezdac~
//!   └─ subpatcher
//!        in~ 1..n ──▶ codebox~ ──▶ out~ 1..m
//!        display ──▶ set <param> ──▶ codebox~ (inlet 0)
//! ```

use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

use crate::error::{Result, RnboError};
use crate::manifest::ControlDescriptor;
use crate::maxpat::{BoxId, Patcher, Rect};

pub const GRAME_BANNER: &str = "Faust generated RNBO patch, Copyright (c) 2023 Grame";

const BANNER_RECT: Rect = Rect::new(50.0, 20.0, 250.0, 50.0);
const DAC_RECT: Rect = Rect::new(50.0, 100.0, 50.0, 50.0);
const RNBO_RECT: Rect = Rect::new(50.0, 60.0, 50.0, 50.0);
const CODEBOX_RECT: Rect = Rect::new(200.0, 200.0, 400.0, 400.0);
const TOGGLE_SIZE: f64 = 24.0;
/// Vertical distance between a display and the setter below it.
const DISPLAY_OFFSET: f64 = 25.0;

/// RNBO code generation optimization level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Optimization {
    O0,
    O1,
    O2,
    #[default]
    O3,
}

impl fmt::Display for Optimization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Optimization::O0 => "O0",
            Optimization::O1 => "O1",
            Optimization::O2 => "O2",
            Optimization::O3 => "O3",
        };
        f.write_str(s)
    }
}

/// Knobs for patch generation.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub optimization: Optimization,
    /// Comment placed at the top of the root patcher; `None` omits it.
    pub banner: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            optimization: Optimization::O3,
            banner: Some(GRAME_BANNER.to_string()),
        }
    }
}

/// Build the root patcher: an `rnbo~` device wrapping `codebox_code`, next
/// to an `ezdac~`.
pub fn create_rnbo_patch(
    dsp_name: &str,
    codebox_code: &str,
    controls: &[ControlDescriptor],
    num_inputs: usize,
    num_outputs: usize,
    options: &BuildOptions,
) -> Result<Patcher> {
    let mut patcher = Patcher::new();

    if let Some(banner) = &options.banner {
        patcher.add_comment(banner, Some(BANNER_RECT));
    }

    patcher.add_textbox("ezdac~", Some(DAC_RECT));

    let subpatcher = build_subpatcher(codebox_code, controls, num_inputs, num_outputs)?;

    let mut attributes = Map::new();
    attributes.insert(
        "optimization".to_string(),
        Value::from(options.optimization.to_string()),
    );
    attributes.insert("title".to_string(), Value::from(dsp_name));
    patcher.add_rnbo(subpatcher, attributes, Some(RNBO_RECT));

    tracing::debug!(
        "Built RNBO patch '{}': {} inputs, {} outputs, {} controls",
        dsp_name,
        num_inputs,
        num_outputs,
        controls.len()
    );

    Ok(patcher)
}

/// Build the patch and write it to `maxpat_path`.
pub fn write_rnbo_patch(
    maxpat_path: &Path,
    dsp_name: &str,
    codebox_code: &str,
    controls: &[ControlDescriptor],
    num_inputs: usize,
    num_outputs: usize,
    options: &BuildOptions,
) -> Result<()> {
    let patcher = create_rnbo_patch(
        dsp_name,
        codebox_code,
        controls,
        num_inputs,
        num_outputs,
        options,
    )?;
    patcher.save(maxpat_path)
}

fn build_subpatcher(
    codebox_code: &str,
    controls: &[ControlDescriptor],
    num_inputs: usize,
    num_outputs: usize,
) -> Result<Patcher> {
    let mut sp = Patcher::rnbo();

    // Parameter messages arrive on inlet 0, so keep it even without audio inputs.
    let codebox = sp.add_codebox_tilde(
        codebox_code,
        num_inputs.max(1),
        num_outputs,
        Some(CODEBOX_RECT),
    );

    for i in 0..num_inputs {
        let input = sp.add_textbox(&format!("in~ {}", i + 1), None);
        sp.add_line(&input, 0, &codebox, i)?;
    }

    for i in 0..num_outputs {
        let output = sp.add_textbox(&format!("out~ {}", i + 1), None);
        sp.add_line(&codebox, i, &output, 0)?;
    }

    for control in controls {
        add_control(&mut sp, control, &codebox)?;
    }

    Ok(sp)
}

/// A `set <name>` box fed by a display sitting just above it.
fn add_control(sp: &mut Patcher, control: &ControlDescriptor, codebox: &BoxId) -> Result<()> {
    let param = sp.add_textbox(&format!("set {}", control.shortname), None);
    let param_rect = sp
        .get(&param)
        .map(|b| b.patching_rect)
        .ok_or_else(|| RnboError::UnknownBox(param.clone()))?;
    let above = param_rect.offset(0.0, -DISPLAY_OFFSET);

    let display = if control.is_boolean() {
        sp.add_toggle(Some(Rect::new(above.x, above.y, TOGGLE_SIZE, TOGGLE_SIZE)))
    } else {
        sp.add_number_tilde(control.init, control.min, control.max, Some(above))
    };

    sp.add_line(&display, 0, &param, 0)?;
    sp.add_line(&param, 0, codebox, 0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::WidgetKind;

    fn slider(name: &str) -> ControlDescriptor {
        ControlDescriptor {
            shortname: name.to_string(),
            kind: WidgetKind::HSlider,
            init: 0.5,
            min: 0.0,
            max: 2.0,
            step: 0.01,
        }
    }

    fn button(name: &str) -> ControlDescriptor {
        ControlDescriptor {
            shortname: name.to_string(),
            kind: WidgetKind::Button,
            init: 0.0,
            min: 0.0,
            max: 1.0,
            step: 1.0,
        }
    }

    fn subpatcher(p: &Patcher) -> &Patcher {
        p.boxes()
            .iter()
            .find_map(|b| b.subpatcher.as_deref())
            .expect("rnbo~ box")
    }

    fn codebox_id(sp: &Patcher) -> BoxId {
        sp.boxes()
            .iter()
            .find(|b| b.maxclass == "codebox~")
            .map(|b| b.id.clone())
            .expect("codebox~ box")
    }

    #[test]
    fn test_root_layout() {
        let p = create_rnbo_patch("osc", "", &[], 0, 2, &BuildOptions::default()).unwrap();
        let boxes = p.boxes();
        assert_eq!(boxes.len(), 3);
        assert_eq!(boxes[0].maxclass, "comment");
        assert_eq!(boxes[0].text.as_deref(), Some(GRAME_BANNER));
        assert_eq!(boxes[1].text.as_deref(), Some("ezdac~"));
        assert_eq!(boxes[2].text.as_deref(), Some("rnbo~"));
        assert_eq!(boxes[2].patching_rect, RNBO_RECT);

        let attrs = boxes[2].attribute("saved_object_attributes").unwrap();
        assert_eq!(attrs["optimization"], "O3");
        assert_eq!(attrs["title"], "osc");
        assert!(p.lines().is_empty());
    }

    #[test]
    fn test_banner_can_be_omitted() {
        let options = BuildOptions {
            optimization: Optimization::O1,
            banner: None,
        };
        let p = create_rnbo_patch("osc", "", &[], 0, 0, &options).unwrap();
        assert_eq!(p.boxes().len(), 2);
        let attrs = p.boxes()[1].attribute("saved_object_attributes").unwrap();
        assert_eq!(attrs["optimization"], "O1");
    }

    #[test]
    fn test_io_stubs_wired_to_codebox() {
        let p = create_rnbo_patch("fx", "code", &[], 3, 2, &BuildOptions::default()).unwrap();
        let sp = subpatcher(&p);
        let codebox = codebox_id(sp);

        let inputs: Vec<_> = sp.objects_named("in~").collect();
        assert_eq!(inputs.len(), 3);
        for (i, input) in inputs.iter().enumerate() {
            assert_eq!(input.text.as_deref(), Some(format!("in~ {}", i + 1).as_str()));
            let lines: Vec<_> = sp.lines_from(&input.id).collect();
            assert_eq!(lines.len(), 1);
            assert_eq!(lines[0].destination, (codebox.clone(), i));
        }

        let outputs: Vec<_> = sp.objects_named("out~").collect();
        assert_eq!(outputs.len(), 2);
        for (i, output) in outputs.iter().enumerate() {
            let lines: Vec<_> = sp.lines_into(&output.id).collect();
            assert_eq!(lines.len(), 1);
            assert_eq!(lines[0].source, (codebox.clone(), i));
        }

        let rnbo = &p.boxes()[2];
        assert_eq!((rnbo.numinlets, rnbo.numoutlets), (3, 2));
    }

    #[test]
    fn test_codebox_keeps_code_verbatim() {
        let code = "@param x = 0;\nout1 = in1 * x;\n";
        let p = create_rnbo_patch("fx", code, &[], 1, 1, &BuildOptions::default()).unwrap();
        let sp = subpatcher(&p);
        let codebox = sp.get(&codebox_id(sp)).unwrap();
        assert_eq!(codebox.attribute("code").and_then(|v| v.as_str()), Some(code));
        assert_eq!(codebox.patching_rect, CODEBOX_RECT);
    }

    #[test]
    fn test_each_control_gets_display_and_setter() {
        let controls = vec![slider("freq"), button("gate"), slider("gain")];
        let p = create_rnbo_patch("synth", "", &controls, 0, 1, &BuildOptions::default()).unwrap();
        let sp = subpatcher(&p);
        let codebox = codebox_id(sp);

        let setters: Vec<_> = sp.objects_named("set").collect();
        assert_eq!(setters.len(), 3);
        assert_eq!(sp.boxes().iter().filter(|b| b.maxclass == "toggle").count(), 1);
        assert_eq!(sp.boxes().iter().filter(|b| b.maxclass == "number~").count(), 2);

        for (setter, control) in setters.iter().zip(&controls) {
            assert_eq!(
                setter.text.as_deref(),
                Some(format!("set {}", control.shortname).as_str())
            );

            let incoming: Vec<_> = sp.lines_into(&setter.id).collect();
            assert_eq!(incoming.len(), 1);
            let display = sp.get(&incoming[0].source.0).unwrap();
            let expected = if control.is_boolean() { "toggle" } else { "number~" };
            assert_eq!(display.maxclass, expected);
            assert_eq!(display.patching_rect.y, setter.patching_rect.y - DISPLAY_OFFSET);

            let outgoing: Vec<_> = sp.lines_from(&setter.id).collect();
            assert_eq!(outgoing.len(), 1);
            assert_eq!(outgoing[0].destination, (codebox.clone(), 0));
        }
    }

    #[test]
    fn test_number_display_carries_range() {
        let p = create_rnbo_patch("s", "", &[slider("freq")], 0, 0, &BuildOptions::default())
            .unwrap();
        let sp = subpatcher(&p);
        let number = sp.boxes().iter().find(|b| b.maxclass == "number~").unwrap();
        assert_eq!(number.attribute("sig"), Some(&Value::from(0.5)));
        assert_eq!(number.attribute("minimum"), Some(&Value::from(0.0)));
        assert_eq!(number.attribute("maximum"), Some(&Value::from(2.0)));
        assert_eq!(number.attribute("mode"), Some(&Value::from(1)));
    }

    #[test]
    fn test_toggle_size() {
        let p = create_rnbo_patch("s", "", &[button("gate")], 0, 0, &BuildOptions::default())
            .unwrap();
        let sp = subpatcher(&p);
        let toggle = sp.boxes().iter().find(|b| b.maxclass == "toggle").unwrap();
        assert_eq!((toggle.patching_rect.w, toggle.patching_rect.h), (24.0, 24.0));
    }
}
