//! Persisted build selection (`Automation/.build_state.json`).
//!
//! The file is plain JSON so it stays readable and hand-editable. Loading is
//! forgiving: each field is applied on its own, and anything malformed is
//! skipped without touching the rest of the selection.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::types::{BuildSelection, BuildSystem, Choice, Configuration, Ide, Platform, Toolchain};

#[derive(Serialize)]
struct StateRecord<'a> {
    #[serde(rename = "PROJECT_NAME")]
    project_name: &'a str,
    #[serde(rename = "CXX_STANDARD")]
    cxx_standard: u32,
    #[serde(rename = "CMAKE_MINIMUM_VERSION")]
    cmake_minimum_version: &'a str,
    current_ide: &'static str,
    current_build_system: &'static str,
    current_configuration: &'static str,
    current_platform: &'static str,
    current_toolchain: &'static str,
}

impl<'a> From<&'a BuildSelection> for StateRecord<'a> {
    fn from(sel: &'a BuildSelection) -> Self {
        Self {
            project_name: &sel.project_name,
            cxx_standard: sel.cxx_standard,
            cmake_minimum_version: &sel.cmake_minimum_version,
            current_ide: sel.ide.key(),
            current_build_system: sel.build_system.key(),
            current_configuration: sel.configuration.key(),
            current_platform: sel.platform.key(),
            current_toolchain: sel.toolchain.key(),
        }
    }
}

fn read_state(path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("{} does not contain a JSON object", path.display()),
    }
}

fn write_state(sel: &BuildSelection, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&StateRecord::from(sel))?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn choice_field<T: Choice>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let text = map.get(key)?.as_str()?;
    let value = T::resolve(text);
    if value.is_none() {
        debug!(key, text, "ignoring unknown value in state file");
    }
    value
}

impl BuildSelection {
    /// Overlays whatever valid fields `map` carries.
    pub fn apply_state(&mut self, map: &Map<String, Value>) {
        if let Some(name) = map.get("PROJECT_NAME").and_then(Value::as_str)
            && !name.trim().is_empty()
        {
            self.project_name = name.to_string();
        }
        if let Some(raw) = map.get("CXX_STANDARD").and_then(Value::as_u64)
            && let Ok(standard) = u32::try_from(raw)
            && standard > 0
        {
            self.cxx_standard = standard;
        }
        if let Some(version) = map.get("CMAKE_MINIMUM_VERSION").and_then(Value::as_str) {
            self.cmake_minimum_version = version.to_string();
        }

        if let Some(v) = choice_field::<Ide>(map, "current_ide") {
            self.ide = v;
        }
        if let Some(v) = choice_field::<BuildSystem>(map, "current_build_system") {
            self.build_system = v;
        }
        if let Some(v) = choice_field::<Configuration>(map, "current_configuration") {
            self.configuration = v;
        }
        if let Some(v) = choice_field::<Platform>(map, "current_platform") {
            self.platform = v;
        }
        if let Some(v) = choice_field::<Toolchain>(map, "current_toolchain") {
            self.toolchain = v;
        }
    }

    /// Returns `false` when there is no readable state file.
    pub fn load_persisted(&mut self, path: &Path) -> bool {
        if !path.exists() {
            return false;
        }
        match read_state(path) {
            Ok(map) => {
                self.apply_state(&map);
                debug!(path = %path.display(), "loaded build state");
                true
            }
            Err(e) => {
                warn!("{:#}", e);
                false
            }
        }
    }

    pub fn save_persisted(&self, path: &Path) -> bool {
        match write_state(self, path) {
            Ok(()) => {
                debug!(path = %path.display(), "saved build state");
                true
            }
            Err(e) => {
                warn!("{:#}", e);
                false
            }
        }
    }
}
