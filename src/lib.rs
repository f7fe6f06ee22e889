//! # lumosc - Lumos Firmware Build Driver
//!
//! lumosc turns a workspace of mixed C/C++/Arduino-style sources into a
//! flashable firmware image for a Lumos board.
//!
//! ## What a build does
//!
//! - **Resolve the board**: a board identifier maps to a bundled
//!   configuration document and an MCU family build profile
//! - **Scan the workspace**: sources are discovered recursively and
//!   bucketed into C++, C and headers
//! - **Guarantee an entry point**: workspaces without a `main()` get an
//!   Arduino-style `setup()`/`loop()` wrapper synthesized for them
//! - **Compile, link, post-process**: startup code, system init, user
//!   sources and the optional wrapper are compiled one at a time with
//!   fail-fast semantics, then linked against the family linker script and
//!   converted to a raw binary
//!
//! ## Module Organization
//!
//! - [`build`] - Source scanning, entry-point synthesis and the build pipeline
//! - [`board`] - Bundled board configuration registry
//! - [`mcu`] - MCU family detection and static per-family profiles
//! - [`toolchain`] - Paths to the bundled ARM GCC cross tools
//! - [`runner`] - External tool execution with captured output and timeouts

/// Bundled board configuration registry.
pub mod board;

/// Build pipeline, source scanner and entry-point synthesizer.
pub mod build;

/// MCU family detection and per-family build profiles.
pub mod mcu;

/// External tool execution.
pub mod runner;

/// Bundled cross-toolchain locations.
pub mod toolchain;
