use clap::ValueEnum;
use clap::builder::PossibleValue;
use std::fmt;
use std::path::Path;

/// One row of a choice table: the variant, its stable serialization key,
/// its display label, and the spellings accepted on the command line.
#[derive(Debug, Clone, Copy)]
pub struct Spelling<T: 'static> {
    pub value: T,
    pub key: &'static str,
    pub label: &'static str,
    pub cli: &'static [&'static str],
}

/// A closed set of build settings with a fixed mapping to text.
///
/// The serialization key is what lands in the state file; the label is what
/// the menu shows. Neither is derived from the other.
pub trait Choice: Copy + Eq + Sized + 'static {
    const ALL: &'static [Self];

    fn table() -> &'static [Spelling<Self>];

    fn all() -> impl Iterator<Item = Self> {
        Self::ALL.iter().copied()
    }

    fn spelling(self) -> &'static Spelling<Self> {
        Self::table()
            .iter()
            .find(|s| s.value == self)
            .unwrap_or(&Self::table()[0])
    }

    fn key(self) -> &'static str {
        self.spelling().key
    }

    fn label(self) -> &'static str {
        self.spelling().label
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::table().iter().find(|s| s.key == key).map(|s| s.value)
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::table()
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.value)
    }

    /// Key first, then display label. Used for persisted state.
    fn resolve(text: &str) -> Option<Self> {
        Self::from_key(text).or_else(|| Self::from_label(text))
    }

    /// Case-insensitive match against the command-line spellings.
    fn from_cli(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::table()
            .iter()
            .find(|s| s.cli.iter().any(|c| c.eq_ignore_ascii_case(text)))
            .map(|s| s.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ide {
    VisualStudio,
    CLion,
    VSCode,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildSystem {
    Ninja,
    MSBuild,
    Make,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Configuration {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    X64,
    Win32,
    Arm64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum Toolchain {
    /// Microsoft Visual C++ (cl.exe)
    MSVC,
    /// Clang with MSVC compatibility (clang-cl.exe)
    ClangCL,
    /// GCC from a MinGW distribution
    MinGW,
}

impl Choice for Ide {
    const ALL: &'static [Self] = &[Ide::VisualStudio, Ide::CLion, Ide::VSCode, Ide::Manual];

    #[rustfmt::skip]
    fn table() -> &'static [Spelling<Self>] {
        const TABLE: &[Spelling<Ide>] = &[
            Spelling { value: Ide::VisualStudio, key: "VISUAL_STUDIO", label: "Visual Studio", cli: &["vs", "visual-studio"] },
            Spelling { value: Ide::CLion, key: "CLION", label: "CLion", cli: &["clion"] },
            Spelling { value: Ide::VSCode, key: "VSCODE", label: "VSCode", cli: &["vscode"] },
            Spelling { value: Ide::Manual, key: "MANUAL", label: "Manual (Command Line)", cli: &["manual"] },
        ];
        TABLE
    }
}

impl Choice for BuildSystem {
    const ALL: &'static [Self] = &[BuildSystem::Ninja, BuildSystem::MSBuild, BuildSystem::Make];

    #[rustfmt::skip]
    fn table() -> &'static [Spelling<Self>] {
        const TABLE: &[Spelling<BuildSystem>] = &[
            Spelling { value: BuildSystem::Ninja, key: "NINJA", label: "Ninja", cli: &["ninja"] },
            Spelling { value: BuildSystem::MSBuild, key: "MSBUILD", label: "MSBuild (Visual Studio)", cli: &["msbuild"] },
            Spelling { value: BuildSystem::Make, key: "MAKE", label: "Unix Makefiles", cli: &["make"] },
        ];
        TABLE
    }
}

impl Choice for Configuration {
    const ALL: &'static [Self] = &[
        Configuration::Debug,
        Configuration::Release,
        Configuration::RelWithDebInfo,
        Configuration::MinSizeRel,
    ];

    #[rustfmt::skip]
    fn table() -> &'static [Spelling<Self>] {
        const TABLE: &[Spelling<Configuration>] = &[
            Spelling { value: Configuration::Debug, key: "DEBUG", label: "Debug", cli: &["debug"] },
            Spelling { value: Configuration::Release, key: "RELEASE", label: "Release", cli: &["release"] },
            Spelling { value: Configuration::RelWithDebInfo, key: "RELWITHDEBINFO", label: "RelWithDebInfo", cli: &["relwithdebinfo"] },
            Spelling { value: Configuration::MinSizeRel, key: "MINSIZEREL", label: "MinSizeRel", cli: &["minsizerel"] },
        ];
        TABLE
    }
}

impl Choice for Platform {
    const ALL: &'static [Self] = &[Platform::X64, Platform::Win32, Platform::Arm64];

    #[rustfmt::skip]
    fn table() -> &'static [Spelling<Self>] {
        const TABLE: &[Spelling<Platform>] = &[
            Spelling { value: Platform::X64, key: "X64", label: "x64", cli: &["x64"] },
            Spelling { value: Platform::Win32, key: "WIN32", label: "Win32", cli: &["win32"] },
            Spelling { value: Platform::Arm64, key: "ARM64", label: "ARM64", cli: &["arm64"] },
        ];
        TABLE
    }
}

impl Choice for Toolchain {
    const ALL: &'static [Self] = &[Toolchain::MSVC, Toolchain::ClangCL, Toolchain::MinGW];

    #[rustfmt::skip]
    fn table() -> &'static [Spelling<Self>] {
        const TABLE: &[Spelling<Toolchain>] = &[
            Spelling { value: Toolchain::MSVC, key: "MSVC", label: "MSVC (cl)", cli: &["msvc"] },
            Spelling { value: Toolchain::ClangCL, key: "CLANG_CL", label: "Clang-CL (LLVM with MSVC)", cli: &["clang-cl"] },
            Spelling { value: Toolchain::MinGW, key: "MINGW_GCC", label: "MinGW (GCC)", cli: &["mingw"] },
        ];
        TABLE
    }
}

macro_rules! choice_traits {
    ($($ty:ty),* $(,)?) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl ValueEnum for $ty {
            fn value_variants<'a>() -> &'a [Self] {
                <$ty as Choice>::ALL
            }

            fn to_possible_value(&self) -> Option<PossibleValue> {
                let spelling = self.spelling();
                let (name, aliases) = spelling.cli.split_first()?;
                Some(
                    PossibleValue::new(*name)
                        .aliases(aliases.iter().copied())
                        .help(spelling.label),
                )
            }
        }
    )*};
}

choice_traits!(Ide, BuildSystem, Configuration, Platform, Toolchain);

impl Configuration {
    /// Name CMake expects for `CMAKE_BUILD_TYPE` and `--config`.
    pub fn cmake_name(self) -> &'static str {
        self.label()
    }
}

impl Platform {
    /// Value for the Visual Studio generator's `-A` flag.
    pub fn cmake_arch(self) -> &'static str {
        self.label()
    }

    /// Architecture argument understood by `vcvarsall.bat`.
    pub fn vcvars_arch(self) -> &'static str {
        match self {
            Platform::X64 => "x64",
            Platform::Win32 => "x86",
            Platform::Arm64 => "arm64",
        }
    }
}

impl Toolchain {
    /// Suffix of the `toolchain-<id>.cmake` description file.
    pub fn file_id(self) -> &'static str {
        match self {
            Toolchain::MSVC => "msvc",
            Toolchain::ClangCL => "clang-cl",
            Toolchain::MinGW => "mingw",
        }
    }

    pub fn uses_msvc_environment(self) -> bool {
        matches!(self, Toolchain::MSVC | Toolchain::ClangCL)
    }
}

/// Visual Studio generators in preference order, with the directory whose
/// presence selects them.
pub const VS_GENERATORS: &[(&str, &str)] = &[
    (
        "Visual Studio 17 2022",
        r"C:\Program Files\Microsoft Visual Studio\2022",
    ),
    (
        "Visual Studio 16 2019",
        r"C:\Program Files (x86)\Microsoft Visual Studio\2019",
    ),
];

pub const DEFAULT_PROJECT_NAME: &str = "HuyEngine";
pub const DEFAULT_CXX_STANDARD: u32 = 20;
pub const DEFAULT_CMAKE_MINIMUM_VERSION: &str = "3.31.6";

/// The active build selection. Exactly one value per axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSelection {
    pub ide: Ide,
    pub build_system: BuildSystem,
    pub configuration: Configuration,
    pub platform: Platform,
    pub toolchain: Toolchain,
    pub project_name: String,
    pub cxx_standard: u32,
    pub cmake_minimum_version: String,
    pub verbose: bool,
    pub clean_first: bool,
}

impl Default for BuildSelection {
    fn default() -> Self {
        Self {
            ide: Ide::Manual,
            build_system: BuildSystem::Ninja,
            configuration: Configuration::Debug,
            platform: Platform::X64,
            toolchain: Toolchain::MSVC,
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            cxx_standard: DEFAULT_CXX_STANDARD,
            cmake_minimum_version: DEFAULT_CMAKE_MINIMUM_VERSION.to_string(),
            verbose: false,
            clean_first: true,
        }
    }
}

impl BuildSelection {
    /// Output folder for the current IDE/toolchain/configuration.
    ///
    /// Non-IDE builds get one folder per toolchain so that switching
    /// compilers never reuses a stale CMake cache.
    pub fn build_folder_name(&self) -> &'static str {
        match self.ide {
            Ide::CLion => match self.configuration {
                Configuration::Debug => "cmake-build-debug",
                Configuration::Release => "cmake-build-release",
                Configuration::RelWithDebInfo => "cmake-build-relwithdebinfo",
                Configuration::MinSizeRel => "cmake-build-minsizerel",
            },
            Ide::VisualStudio => "vs-build",
            Ide::VSCode | Ide::Manual => match self.toolchain {
                Toolchain::MSVC => "build-msvc",
                Toolchain::ClangCL => "build-clang-cl",
                Toolchain::MinGW => "build-mingw",
            },
        }
    }

    pub fn cmake_generator(&self) -> &'static str {
        self.cmake_generator_with(|dir| dir.exists())
    }

    /// Generator name, probing Visual Studio install directories with
    /// `installed` when MSBuild is selected.
    pub fn cmake_generator_with(&self, installed: impl Fn(&Path) -> bool) -> &'static str {
        match self.build_system {
            BuildSystem::Ninja => "Ninja",
            BuildSystem::Make => "Unix Makefiles",
            BuildSystem::MSBuild => VS_GENERATORS
                .iter()
                .find(|(_, dir)| installed(Path::new(dir)))
                .map(|(name, _)| *name)
                .unwrap_or(VS_GENERATORS[0].0),
        }
    }

    pub fn executable_name(&self) -> String {
        format!("{}{}", self.project_name, std::env::consts::EXE_SUFFIX)
    }
}

/// Accepts `3`, `3.20` or `3.31.6` style CMake versions.
pub fn parse_cmake_version(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut padded = parts.clone();
    padded.resize(3, "0");
    semver::Version::parse(&padded.join(".")).ok()?;
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(ide: Ide, toolchain: Toolchain, configuration: Configuration) -> BuildSelection {
        BuildSelection {
            ide,
            toolchain,
            configuration,
            ..BuildSelection::default()
        }
    }

    #[test]
    fn test_clion_folders_follow_configuration() {
        for tc in Toolchain::all() {
            assert_eq!(
                selection(Ide::CLion, tc, Configuration::Debug).build_folder_name(),
                "cmake-build-debug"
            );
            assert_eq!(
                selection(Ide::CLion, tc, Configuration::Release).build_folder_name(),
                "cmake-build-release"
            );
            assert_eq!(
                selection(Ide::CLion, tc, Configuration::MinSizeRel).build_folder_name(),
                "cmake-build-minsizerel"
            );
        }
    }

    #[test]
    fn test_visual_studio_folder_is_fixed() {
        for tc in Toolchain::all() {
            for cfg in Configuration::all() {
                assert_eq!(selection(Ide::VisualStudio, tc, cfg).build_folder_name(), "vs-build");
            }
        }
    }

    #[test]
    fn test_manual_folders_split_by_toolchain() {
        let cfg = Configuration::Release;
        assert_eq!(selection(Ide::Manual, Toolchain::MSVC, cfg).build_folder_name(), "build-msvc");
        assert_eq!(
            selection(Ide::VSCode, Toolchain::ClangCL, cfg).build_folder_name(),
            "build-clang-cl"
        );
        assert_eq!(selection(Ide::Manual, Toolchain::MinGW, cfg).build_folder_name(), "build-mingw");
    }

    #[test]
    fn test_generator_names() {
        let mut sel = BuildSelection::default();
        assert_eq!(sel.cmake_generator_with(|_| true), "Ninja");

        sel.build_system = BuildSystem::Make;
        assert_eq!(sel.cmake_generator_with(|_| true), "Unix Makefiles");

        sel.build_system = BuildSystem::MSBuild;
        assert_eq!(sel.cmake_generator_with(|_| false), "Visual Studio 17 2022");
        assert_eq!(
            sel.cmake_generator_with(|p| p.to_string_lossy().contains("2019")),
            "Visual Studio 16 2019"
        );
        assert_eq!(sel.cmake_generator_with(|_| true), "Visual Studio 17 2022");
    }

    #[test]
    fn test_executable_name_uses_project_name() {
        let sel = BuildSelection {
            project_name: "Sandbox".to_string(),
            ..BuildSelection::default()
        };
        assert_eq!(sel.executable_name(), format!("Sandbox{}", std::env::consts::EXE_SUFFIX));
    }

    #[test]
    fn test_resolve_by_key_then_label() {
        assert_eq!(Ide::resolve("VISUAL_STUDIO"), Some(Ide::VisualStudio));
        assert_eq!(Ide::resolve("Visual Studio"), Some(Ide::VisualStudio));
        assert_eq!(BuildSystem::resolve("MSBuild (Visual Studio)"), Some(BuildSystem::MSBuild));
        assert_eq!(Toolchain::resolve("MINGW_GCC"), Some(Toolchain::MinGW));
        assert_eq!(Platform::resolve("x64"), Some(Platform::X64));
        assert_eq!(Configuration::resolve("debug"), None);
        assert_eq!(Ide::resolve("Eclipse"), None);
    }

    #[test]
    fn test_key_and_label_round_trip() {
        for ide in Ide::all() {
            assert_eq!(Ide::from_key(ide.key()), Some(ide));
            assert_eq!(Ide::from_label(ide.label()), Some(ide));
        }
        for tc in Toolchain::all() {
            assert_eq!(Toolchain::from_key(tc.key()), Some(tc));
        }
    }

    #[test]
    fn test_cli_spellings() {
        assert_eq!(Ide::from_cli("vs"), Some(Ide::VisualStudio));
        assert_eq!(Ide::from_cli("visual-studio"), Some(Ide::VisualStudio));
        assert_eq!(Configuration::from_cli("Release"), Some(Configuration::Release));
        assert_eq!(Toolchain::from_cli("clang-cl"), Some(Toolchain::ClangCL));
        assert_eq!(Platform::from_cli("ARM64"), Some(Platform::Arm64));
        assert_eq!(BuildSystem::from_cli("scons"), None);
    }

    #[test]
    fn test_value_enum_matches_tables() {
        assert_eq!(Ide::value_variants().len(), Ide::table().len());
        assert_eq!(Toolchain::from_str("clang-cl", false), Ok(Toolchain::ClangCL));
        assert_eq!(Ide::from_str("visual-studio", false), Ok(Ide::VisualStudio));
        assert_eq!(Configuration::from_str("RelWithDebInfo", true), Ok(Configuration::RelWithDebInfo));
    }

    #[test]
    fn test_parse_cmake_version() {
        assert_eq!(parse_cmake_version("3.31.6"), Some("3.31.6".to_string()));
        assert_eq!(parse_cmake_version(" 3.20 "), Some("3.20".to_string()));
        assert_eq!(parse_cmake_version("3"), Some("3".to_string()));
        assert_eq!(parse_cmake_version("three"), None);
        assert_eq!(parse_cmake_version("3.1.2.4"), None);
        assert_eq!(parse_cmake_version(""), None);
    }
}
