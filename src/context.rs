//! The value every action operates on.

use colored::*;
use tracing::warn;

use crate::config::user::user_config_path;
use crate::config::{BuildSelection, ProjectLayout, UserConfig};
use crate::toolchain::ToolPaths;

pub const DEFAULT_JOBS: u32 = 8;
pub const DEFAULT_SOURCE_DIRS: &[&str] = &["Engine", "main.cpp"];

/// Settings that come from the user override file rather than the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub jobs: u32,
    pub extra_cmake_flags: Vec<String>,
    pub source_dirs: Vec<String>,
    pub suppress_tool_warnings: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            jobs: DEFAULT_JOBS,
            extra_cmake_flags: Vec::new(),
            source_dirs: DEFAULT_SOURCE_DIRS.iter().map(|s| s.to_string()).collect(),
            suppress_tool_warnings: false,
        }
    }
}

impl BuildOptions {
    pub fn from_user(user: &UserConfig) -> Self {
        let mut options = BuildOptions::default();
        if let Some(jobs) = user.build.parallel_jobs.filter(|j| *j > 0) {
            options.jobs = jobs;
        }
        if let Some(flags) = &user.build.extra_cmake_flags {
            options.extra_cmake_flags = flags.clone();
        }
        if let Some(dirs) = &user.format.source_dirs {
            options.source_dirs = dirs.clone();
        }
        if let Some(extra) = &user.format.additional_source_dirs {
            options.source_dirs.extend(extra.iter().cloned());
        }
        options.suppress_tool_warnings = user.suppress_tool_warnings.unwrap_or(false);
        options
    }
}

/// Selection, tool locations and options for one run.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub layout: ProjectLayout,
    pub selection: BuildSelection,
    pub tools: ToolPaths,
    pub options: BuildOptions,
    pub user: UserConfig,
}

/// Per-user file first, project file on top. Broken files are skipped.
pub fn load_user_config(layout: &ProjectLayout) -> UserConfig {
    let mut candidates = Vec::new();
    candidates.extend(user_config_path());
    candidates.push(layout.user_config_file());

    candidates
        .iter()
        .filter_map(|path| match UserConfig::load_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring user configuration: {:#}", e);
                None
            }
        })
        .fold(UserConfig::default(), |base, next| next.layered_over(base))
}

impl BuildContext {
    /// A context with explicit parts and no file or tool probing.
    pub fn new(layout: ProjectLayout, selection: BuildSelection, tools: ToolPaths) -> Self {
        Self {
            layout,
            selection,
            tools,
            options: BuildOptions::default(),
            user: UserConfig::default(),
        }
    }

    /// Defaults, then user overrides, then persisted state; tools are probed.
    pub fn bootstrap(layout: ProjectLayout) -> Self {
        let user = load_user_config(&layout);

        let mut selection = BuildSelection::default();
        user.apply_defaults(&mut selection);
        selection.load_persisted(&layout.state_file());

        let mut tools = ToolPaths::detect();
        user.apply_tools(&mut tools);

        Self {
            layout,
            selection,
            tools,
            options: BuildOptions::from_user(&user),
            user,
        }
    }

    pub fn refresh_tools(&mut self) {
        let mut tools = ToolPaths::detect();
        self.user.apply_tools(&mut tools);
        self.tools = tools;
    }

    pub fn save_selection(&self) -> bool {
        self.selection.save_persisted(&self.layout.state_file())
    }

    /// Prints a warning per tool the current selection needs but lacks.
    pub fn warn_missing_tools(&self) {
        if self.options.suppress_tool_warnings {
            return;
        }
        for tool in self.tools.missing_for(&self.selection) {
            println!("{} {} not found", "!".yellow(), tool);
        }
    }
}
