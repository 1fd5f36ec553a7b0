// src/retrieval/external.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Correction, ReflectanceProvider, ReflectanceRequest};
use crate::error::{AlbedoError, Result};
use crate::io::{read_band, BandArray};
use crate::scene::Scene;

/// An external program and its argument templates.
///
/// Arguments may contain `{band}`, `{band_number}`, `{metadata}`, `{output}`,
/// `{temp_dir}`, `{angles}`, `{angle_utility}` and `{shell}`. The tool must
/// write a single-band reflectance raster to `{output}`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Tool commands per correction, usually loaded from a JSON file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ToolSet {
    pub raw: Option<ToolCommand>,
    pub dos: Option<ToolCommand>,
    pub srem: Option<ToolCommand>,
}

impl ToolSet {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn command(&self, correction: Correction) -> Option<&ToolCommand> {
        match correction {
            Correction::Raw => self.raw.as_ref(),
            Correction::Dos => self.dos.as_ref(),
            Correction::Srem => self.srem.as_ref(),
        }
    }
}

/// Obtains reflectance by running one external calibration/correction tool per band.
pub struct ExternalToolProvider {
    tools: ToolSet,
    scratch_root: PathBuf,
}

impl ExternalToolProvider {
    pub fn new(tools: ToolSet, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            tools,
            scratch_root: scratch_root.into(),
        }
    }
}

impl ReflectanceProvider for ExternalToolProvider {
    fn reflectance(
        &self,
        scene: &Scene,
        band: u8,
        request: &ReflectanceRequest,
    ) -> Result<BandArray> {
        let correction = request.correction();
        let tool = self
            .tools
            .command(correction)
            .ok_or_else(|| AlbedoError::MissingInput {
                input: tool_key(correction),
                context: format!("{} reflectance of band {}", correction, band),
            })?;

        // Removed on drop, whichever way this call returns.
        fs::create_dir_all(&self.scratch_root)?;
        let scratch = tempfile::Builder::new()
            .prefix("albedo_")
            .tempdir_in(&self.scratch_root)?;
        let output = scratch.path().join(format!("B{}_{}.tif", band, correction));

        let mut values: Vec<(&'static str, Option<String>)> = vec![
            ("band_number", Some(band.to_string())),
            ("metadata", Some(path_arg(scene.metadata_file()))),
            ("output", Some(path_arg(&output))),
        ];

        match request {
            ReflectanceRequest::Srem(options) => {
                let (angles, angle_utility) = options.require_angles()?;
                values.push(("band", Some(path_arg(&options.band))));
                values.push(("temp_dir", Some(path_arg(&options.temp_dir))));
                values.push(("angles", Some(path_arg(angles))));
                values.push(("angle_utility", Some(path_arg(angle_utility))));
                values.push(("shell", options.shell.as_deref().map(path_arg)));
            }
            ReflectanceRequest::Raw | ReflectanceRequest::Dos => {
                values.push(("band", Some(path_arg(&scene.band_path(band)?))));
                values.push(("temp_dir", Some(path_arg(scratch.path()))));
                values.push(("angles", None));
                values.push(("angle_utility", None));
                values.push(("shell", None));
            }
        }

        let context = format!("{} tool for band {}", correction, band);
        let args = tool
            .args
            .iter()
            .map(|arg| expand_placeholders(arg, &values, &context))
            .collect::<Result<Vec<_>>>()?;

        info!("Running {} for band {}", tool.program, band);
        debug!("{} {}", tool.program, args.join(" "));

        let result = Command::new(&tool.program)
            .args(&args)
            .output()
            .map_err(|e| AlbedoError::Tool {
                program: tool.program.clone(),
                reason: e.to_string(),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(AlbedoError::Tool {
                program: tool.program.clone(),
                reason: format!("{}: {}", result.status, stderr.trim()),
            });
        }

        if !output.exists() {
            return Err(AlbedoError::Tool {
                program: tool.program.clone(),
                reason: format!("no raster written to {}", output.display()),
            });
        }

        read_band(&output)
    }
}

fn tool_key(correction: Correction) -> &'static str {
    match correction {
        Correction::Raw => "tools.raw",
        Correction::Dos => "tools.dos",
        Correction::Srem => "tools.srem",
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Expands `{key}` placeholders in a single pass over `template`, so
/// substituted values are never scanned again. Unknown `{...}` text is kept.
fn expand_placeholders(
    template: &str,
    values: &[(&'static str, Option<String>)],
    context: &str,
) -> Result<String> {
    let mut expanded = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        expanded.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];

        let known = candidate.find('}').and_then(|close| {
            let name = &candidate[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(key, value)| (close, *key, value))
        });

        match known {
            Some((close, key, value)) => {
                let value = value.as_deref().ok_or_else(|| AlbedoError::MissingInput {
                    input: key,
                    context: context.to_string(),
                })?;
                expanded.push_str(value);
                rest = &candidate[close + 1..];
            }
            None => {
                expanded.push('{');
                rest = candidate;
            }
        }
    }
    expanded.push_str(rest);

    Ok(expanded)
}
