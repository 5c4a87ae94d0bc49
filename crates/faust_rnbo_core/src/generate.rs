//! File-level driver: codebox + manifest in, `.maxpat` out

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::{BuildOptions, write_rnbo_patch};
use crate::error::{Result, RnboError};
use crate::manifest::DspManifest;

/// What was written by [`gen_faust_rnbo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub maxpat_path: PathBuf,
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub num_controls: usize,
}

/// Read `codebox_path` and `json_path`, then write the RNBO patch for
/// `dsp_name` to `maxpat_path` using default [`BuildOptions`].
pub fn gen_faust_rnbo(
    dsp_name: &str,
    codebox_path: &Path,
    json_path: &Path,
    maxpat_path: &Path,
) -> Result<GenerationReport> {
    gen_faust_rnbo_with(
        dsp_name,
        codebox_path,
        json_path,
        maxpat_path,
        &BuildOptions::default(),
    )
}

pub fn gen_faust_rnbo_with(
    dsp_name: &str,
    codebox_path: &Path,
    json_path: &Path,
    maxpat_path: &Path,
    options: &BuildOptions,
) -> Result<GenerationReport> {
    let codebox_code = fs::read_to_string(codebox_path).map_err(|source| RnboError::Io {
        path: codebox_path.to_path_buf(),
        source,
    })?;

    let manifest = DspManifest::from_path(json_path)?;
    let controls = manifest.controls();
    tracing::debug!(
        "Manifest {}: {} inputs, {} outputs, {} controls",
        json_path.display(),
        manifest.inputs,
        manifest.outputs,
        controls.len()
    );

    write_rnbo_patch(
        maxpat_path,
        dsp_name,
        &codebox_code,
        &controls,
        manifest.inputs,
        manifest.outputs,
        options,
    )?;

    Ok(GenerationReport {
        maxpat_path: maxpat_path.to_path_buf(),
        num_inputs: manifest.inputs,
        num_outputs: manifest.outputs,
        num_controls: controls.len(),
    })
}
