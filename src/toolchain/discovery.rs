//! Locating build tools and compilers on disk.
//!
//! Known install locations are checked first, then `PATH`. The Visual Studio
//! and LLVM locations only exist on Windows; elsewhere the probes simply come
//! back empty and `PATH` lookup does the work.

use std::path::{Path, PathBuf};
use tracing::debug;

const CMAKE_PATHS: &[&str] = &[
    r"C:\Program Files\CMake\bin\cmake.exe",
    r"C:\Program Files (x86)\CMake\bin\cmake.exe",
];

const NINJA_PATHS: &[&str] = &[
    r"C:\ProgramData\chocolatey\bin\ninja.exe",
    r"C:\Program Files\Ninja\ninja.exe",
];

/// Visual Studio installations, newest first, with their release year.
const VISUAL_STUDIO_PATHS: &[(&str, &str)] = &[
    (r"C:\Program Files\Microsoft Visual Studio\2022\Community", "2022"),
    (r"C:\Program Files\Microsoft Visual Studio\2022\Professional", "2022"),
    (r"C:\Program Files\Microsoft Visual Studio\2022\Enterprise", "2022"),
    (r"C:\Program Files (x86)\Microsoft Visual Studio\2019\Community", "2019"),
    (r"C:\Program Files (x86)\Microsoft Visual Studio\2019\Professional", "2019"),
    (r"C:\Program Files (x86)\Microsoft Visual Studio\2019\Enterprise", "2019"),
];

const LLVM_PATHS: &[&str] = &[
    r"C:\Program Files\LLVM\bin",
    r"C:\Program Files (x86)\LLVM\bin",
];

const MINGW_PATHS: &[&str] = &[
    r"C:\msys64\mingw64\bin",
    r"C:\mingw64\bin",
    r"C:\msys64\ucrt64\bin",
    r"C:\msys64\mingw32\bin",
];

/// `cl.exe` and `vcvarsall.bat` from one Visual Studio installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsvcInstall {
    pub year: String,
    pub install_path: PathBuf,
    pub toolset_version: String,
    pub cl: PathBuf,
    pub vcvarsall: PathBuf,
}

fn exe(name: &str) -> String {
    format!("{}{}", name, std::env::consts::EXE_SUFFIX)
}

fn first_existing(candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn on_path(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

pub fn find_cmake() -> Option<PathBuf> {
    let found = first_existing(CMAKE_PATHS).or_else(|| on_path("cmake"));
    debug!(?found, "cmake probe");
    found
}

pub fn find_ninja() -> Option<PathBuf> {
    let found = first_existing(NINJA_PATHS).or_else(|| on_path("ninja"));
    debug!(?found, "ninja probe");
    found
}

/// Latest MSVC toolset inside a Visual Studio installation.
///
/// Both the x64-hosted `cl.exe` and `vcvarsall.bat` must exist.
pub fn find_msvc_in(vs_path: &Path, year: &str) -> Option<MsvcInstall> {
    let vc_tools = vs_path.join("VC").join("Tools").join("MSVC");

    let mut versions: Vec<String> = std::fs::read_dir(&vc_tools)
        .ok()?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    versions.sort();
    let latest = versions.pop()?;

    let cl = vc_tools
        .join(&latest)
        .join("bin")
        .join("Hostx64")
        .join("x64")
        .join("cl.exe");
    let vcvarsall = vs_path
        .join("VC")
        .join("Auxiliary")
        .join("Build")
        .join("vcvarsall.bat");

    if cl.exists() && vcvarsall.exists() {
        Some(MsvcInstall {
            year: year.to_string(),
            install_path: vs_path.to_path_buf(),
            toolset_version: latest,
            cl,
            vcvarsall,
        })
    } else {
        None
    }
}

pub fn find_visual_studio() -> Option<MsvcInstall> {
    let found = VISUAL_STUDIO_PATHS
        .iter()
        .filter(|(path, _)| Path::new(path).exists())
        .find_map(|(path, year)| find_msvc_in(Path::new(path), year));
    debug!(?found, "visual studio probe");
    found
}

/// LLVM's `bin` directory as recorded by its Windows installer.
#[cfg(windows)]
fn llvm_from_registry() -> Option<PathBuf> {
    use winreg::RegKey;
    use winreg::enums::*;

    let key = RegKey::predef(HKEY_LOCAL_MACHINE)
        .open_subkey(r"SOFTWARE\LLVM\LLVM")
        .ok()?;
    let root: String = key.get_value("").ok()?;
    Some(PathBuf::from(root).join("bin"))
}

#[cfg(not(windows))]
fn llvm_from_registry() -> Option<PathBuf> {
    None
}

/// `(clang-cl, clang++)` from `dir`, if at least one exists.
pub fn find_llvm_in(dir: &Path) -> Option<(Option<PathBuf>, Option<PathBuf>)> {
    let clang_cl = Some(dir.join(exe("clang-cl"))).filter(|p| p.exists());
    let clangxx = Some(dir.join(exe("clang++"))).filter(|p| p.exists());
    if clang_cl.is_some() || clangxx.is_some() {
        Some((clang_cl, clangxx))
    } else {
        None
    }
}

/// `PATH` first, then the standard install directories and the registry.
pub fn find_llvm() -> (Option<PathBuf>, Option<PathBuf>) {
    let clang_cl = on_path("clang-cl");
    let clangxx = on_path("clang++");
    if clang_cl.is_some() || clangxx.is_some() {
        return (clang_cl, clangxx);
    }

    let mut dirs: Vec<PathBuf> = LLVM_PATHS.iter().map(PathBuf::from).collect();
    dirs.extend(llvm_from_registry());

    dirs.iter()
        .filter(|d| d.exists())
        .find_map(|d| find_llvm_in(d))
        .unwrap_or((None, None))
}

/// `(gcc, g++)` from `dir`; both must exist.
pub fn find_mingw_in(dir: &Path) -> Option<(PathBuf, PathBuf)> {
    let gcc = dir.join(exe("gcc"));
    let gpp = dir.join(exe("g++"));
    if gcc.exists() && gpp.exists() {
        Some((gcc, gpp))
    } else {
        None
    }
}

pub fn find_mingw() -> Option<(PathBuf, PathBuf)> {
    if let (Some(gcc), Some(gpp)) = (on_path("gcc"), on_path("g++")) {
        return Some((gcc, gpp));
    }
    MINGW_PATHS
        .iter()
        .map(Path::new)
        .filter(|d| d.exists())
        .find_map(find_mingw_in)
}
