//! User override file (`Automation/user_config.toml`).
//!
//! A per-user copy under the platform config directory is read first and the
//! project copy is layered on top. Every field is optional.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::{BuildSelection, BuildSystem, Choice, Configuration, Ide, Platform, Toolchain};
use crate::toolchain::ToolPaths;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct UserConfig {
    pub suppress_tool_warnings: Option<bool>,
    pub tools: ToolOverrides,
    pub defaults: DefaultOverrides,
    pub build: BuildOverrides,
    pub format: FormatOverrides,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct ToolOverrides {
    pub cmake: Option<PathBuf>,
    pub ninja: Option<PathBuf>,
    pub vcvarsall: Option<PathBuf>,
    pub cl: Option<PathBuf>,
    pub clang_cl: Option<PathBuf>,
    pub clangxx: Option<PathBuf>,
    pub gcc: Option<PathBuf>,
    pub gpp: Option<PathBuf>,
}

/// Preferred selection, spelled the way the command line spells it.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct DefaultOverrides {
    pub ide: Option<String>,
    pub build_system: Option<String>,
    pub configuration: Option<String>,
    pub platform: Option<String>,
    pub toolchain: Option<String>,
    pub verbose: Option<bool>,
    pub clean_first: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct BuildOverrides {
    pub parallel_jobs: Option<u32>,
    pub extra_cmake_flags: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct FormatOverrides {
    pub source_dirs: Option<Vec<String>>,
    pub additional_source_dirs: Option<Vec<String>>,
}

/// Per-user override file, e.g. `~/.config/huybuild/user.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("huybuild").join("user.toml"))
}

impl UserConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse user configuration")
    }

    pub fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content).with_context(|| format!("in {}", path.display()))?;
        debug!(path = %path.display(), "loaded user configuration");
        Ok(Some(config))
    }

    /// `self` wins wherever it sets a value.
    pub fn layered_over(self, base: UserConfig) -> UserConfig {
        UserConfig {
            suppress_tool_warnings: self.suppress_tool_warnings.or(base.suppress_tool_warnings),
            tools: ToolOverrides {
                cmake: self.tools.cmake.or(base.tools.cmake),
                ninja: self.tools.ninja.or(base.tools.ninja),
                vcvarsall: self.tools.vcvarsall.or(base.tools.vcvarsall),
                cl: self.tools.cl.or(base.tools.cl),
                clang_cl: self.tools.clang_cl.or(base.tools.clang_cl),
                clangxx: self.tools.clangxx.or(base.tools.clangxx),
                gcc: self.tools.gcc.or(base.tools.gcc),
                gpp: self.tools.gpp.or(base.tools.gpp),
            },
            defaults: DefaultOverrides {
                ide: self.defaults.ide.or(base.defaults.ide),
                build_system: self.defaults.build_system.or(base.defaults.build_system),
                configuration: self.defaults.configuration.or(base.defaults.configuration),
                platform: self.defaults.platform.or(base.defaults.platform),
                toolchain: self.defaults.toolchain.or(base.defaults.toolchain),
                verbose: self.defaults.verbose.or(base.defaults.verbose),
                clean_first: self.defaults.clean_first.or(base.defaults.clean_first),
            },
            build: BuildOverrides {
                parallel_jobs: self.build.parallel_jobs.or(base.build.parallel_jobs),
                extra_cmake_flags: self.build.extra_cmake_flags.or(base.build.extra_cmake_flags),
            },
            format: FormatOverrides {
                source_dirs: self.format.source_dirs.or(base.format.source_dirs),
                additional_source_dirs: self
                    .format
                    .additional_source_dirs
                    .or(base.format.additional_source_dirs),
            },
        }
    }

    /// Applies `[defaults]`. Unrecognised spellings leave the field alone.
    pub fn apply_defaults(&self, sel: &mut BuildSelection) {
        let d = &self.defaults;
        if let Some(v) = d.ide.as_deref().and_then(Ide::from_cli) {
            sel.ide = v;
        }
        if let Some(v) = d.build_system.as_deref().and_then(BuildSystem::from_cli) {
            sel.build_system = v;
        }
        if let Some(v) = d.configuration.as_deref().and_then(Configuration::from_cli) {
            sel.configuration = v;
        }
        if let Some(v) = d.platform.as_deref().and_then(Platform::from_cli) {
            sel.platform = v;
        }
        if let Some(v) = d.toolchain.as_deref().and_then(Toolchain::from_cli) {
            sel.toolchain = v;
        }
        if let Some(v) = d.verbose {
            sel.verbose = v;
        }
        if let Some(v) = d.clean_first {
            sel.clean_first = v;
        }
    }

    /// Replaces probed tool paths with the ones set in `[tools]`.
    pub fn apply_tools(&self, tools: &mut ToolPaths) {
        let t = &self.tools;
        let pairs = [
            (&t.cmake, &mut tools.cmake),
            (&t.ninja, &mut tools.ninja),
            (&t.vcvarsall, &mut tools.vcvarsall),
            (&t.cl, &mut tools.cl),
            (&t.clang_cl, &mut tools.clang_cl),
            (&t.clangxx, &mut tools.clangxx),
            (&t.gcc, &mut tools.gcc),
            (&t.gpp, &mut tools.gpp),
        ];
        for (user, slot) in pairs {
            if let Some(path) = user {
                *slot = Some(path.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
suppress_tool_warnings = true

[tools]
cmake = 'D:\Tools\CMake\bin\cmake.exe'

[defaults]
ide = "vs"
build_system = "msbuild"
configuration = "Release"
platform = "sparc"

[build]
parallel_jobs = 16
extra_cmake_flags = ["-DENABLE_TESTING=ON"]

[format]
additional_source_dirs = ["Tests"]
"#;

    #[test]
    fn test_parse_sample() {
        let cfg = UserConfig::parse(SAMPLE).unwrap();
        assert_eq!(cfg.suppress_tool_warnings, Some(true));
        assert_eq!(cfg.tools.cmake, Some(PathBuf::from(r"D:\Tools\CMake\bin\cmake.exe")));
        assert_eq!(cfg.build.parallel_jobs, Some(16));
        assert_eq!(
            cfg.format.additional_source_dirs,
            Some(vec!["Tests".to_string()])
        );
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        let cfg = UserConfig::parse("use_colors = false\n[defaults]\nide = \"clion\"\n").unwrap();
        assert_eq!(cfg.defaults.ide.as_deref(), Some("clion"));
    }

    #[test]
    fn test_apply_defaults_skips_unknown_spellings() {
        let cfg = UserConfig::parse(SAMPLE).unwrap();
        let mut sel = BuildSelection::default();
        cfg.apply_defaults(&mut sel);
        assert_eq!(sel.ide, Ide::VisualStudio);
        assert_eq!(sel.build_system, BuildSystem::MSBuild);
        assert_eq!(sel.configuration, Configuration::Release);
        assert_eq!(sel.platform, Platform::X64);
    }

    #[test]
    fn test_apply_tools_overrides_only_set_paths() {
        let cfg = UserConfig::parse(SAMPLE).unwrap();
        let mut tools = ToolPaths {
            ninja: Some(PathBuf::from("/usr/bin/ninja")),
            ..ToolPaths::default()
        };
        cfg.apply_tools(&mut tools);
        assert_eq!(tools.cmake, Some(PathBuf::from(r"D:\Tools\CMake\bin\cmake.exe")));
        assert_eq!(tools.ninja, Some(PathBuf::from("/usr/bin/ninja")));
        assert!(tools.gcc.is_none());
    }

    #[test]
    fn test_project_file_layers_over_user_file() {
        let user = UserConfig::parse("[build]\nparallel_jobs = 4\n[defaults]\nide = \"clion\"\n").unwrap();
        let project = UserConfig::parse("[build]\nparallel_jobs = 12\n").unwrap();
        let merged = project.layered_over(user);
        assert_eq!(merged.build.parallel_jobs, Some(12));
        assert_eq!(merged.defaults.ide.as_deref(), Some("clion"));
    }

    #[test]
    fn test_load_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_config.toml");
        assert!(UserConfig::load_file(&path).unwrap().is_none());

        fs::write(&path, "[build\nparallel_jobs = ").unwrap();
        assert!(UserConfig::load_file(&path).is_err());
    }
}
