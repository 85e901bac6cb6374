//! Build selection, its on-disk state, and the project layout.

pub mod state;
pub mod types;
pub mod user;

pub use types::{
    BuildSelection, BuildSystem, Choice, Configuration, Ide, Platform, Toolchain,
    parse_cmake_version,
};
pub use user::UserConfig;

use std::path::{Path, PathBuf};

/// Every folder `build_folder_name` can produce, plus the legacy `build`.
pub const BUILD_FOLDERS: &[&str] = &[
    "build",
    "vs-build",
    "build-msvc",
    "build-clang-cl",
    "build-mingw",
    "cmake-build-debug",
    "cmake-build-release",
    "cmake-build-relwithdebinfo",
    "cmake-build-minsizerel",
];

/// Where things live relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn automation_dir(&self) -> PathBuf {
        self.root.join("Automation")
    }

    pub fn state_file(&self) -> PathBuf {
        self.automation_dir().join(".build_state.json")
    }

    pub fn user_config_file(&self) -> PathBuf {
        self.automation_dir().join("user_config.toml")
    }

    pub fn toolchain_file(&self, toolchain: Toolchain) -> PathBuf {
        self.automation_dir()
            .join("CMAKE")
            .join("Toolchains")
            .join(format!("toolchain-{}.cmake", toolchain.file_id()))
    }

    pub fn build_dir(&self, sel: &BuildSelection) -> PathBuf {
        self.root.join(sel.build_folder_name())
    }

    pub fn executable_path(&self, sel: &BuildSelection) -> PathBuf {
        self.build_dir(sel).join("bin").join(sel.executable_name())
    }
}
