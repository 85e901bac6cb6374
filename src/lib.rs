//! # huybuild - HuyEngine build automation
//!
//! A command-line and menu front end that drives CMake, Ninja, MSBuild and
//! clang-format for the HuyEngine C++ project.
//!
//! ## Quick Start
//!
//! ```bash
//! # Interactive menu
//! huybuild
//!
//! # Configure and build a release with clang-cl
//! huybuild -c release -t clang-cl generate
//! huybuild -c release -t clang-cl build
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Build selection, persisted state, user overrides
//! - [`toolchain`] - Tool discovery and the MSVC environment
//! - [`build`] - CMake command lines and the build actions
//! - [`context`] - The context every action receives

/// CMake command construction and build actions.
pub mod build;

/// Source formatting (clang-format).
pub mod checker;

/// Build selection, state file and user override file.
pub mod config;

/// Selection, tools and options for one run.
pub mod context;

/// `tracing` subscriber setup.
pub mod logging;

/// Interactive menu.
pub mod menu;

/// Build tool and compiler discovery.
pub mod toolchain;

/// Terminal UI utilities (tables, banners).
pub mod ui;
