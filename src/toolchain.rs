//! Locations of the bundled ARM GCC cross tools.
//!
//! The driver ships with a `gcc-arm-none-eabi` bundle at a fixed path next
//! to the executable; nothing is searched on `PATH`. A fresh
//! [`ToolchainPaths`] is built per invocation so no toolchain state outlives
//! a single build.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Relative path of the bundled cross-tool bin directory under the driver root.
pub const BUNDLE_BIN_DIR: &str = "bin/gcc-arm-none-eabi-10.3-2021.10/bin";

/// Absolute paths to the four external tools one build invokes.
#[derive(Debug, Clone)]
pub struct ToolchainPaths {
    /// C++ compiler/linker driver (`arm-none-eabi-g++`)
    pub cxx: PathBuf,
    /// C and assembly compiler (`arm-none-eabi-gcc`)
    pub cc: PathBuf,
    /// ELF-to-binary converter (`arm-none-eabi-objcopy`)
    pub objcopy: PathBuf,
    /// Section size reporter (`arm-none-eabi-size`)
    pub size: PathBuf,
}

impl ToolchainPaths {
    /// Toolchain rooted at an explicit bin directory (tests, custom installs).
    pub fn from_bin_dir(bin_dir: &Path) -> Self {
        Self {
            cxx: bin_dir.join("arm-none-eabi-g++"),
            cc: bin_dir.join("arm-none-eabi-gcc"),
            objcopy: bin_dir.join("arm-none-eabi-objcopy"),
            size: bin_dir.join("arm-none-eabi-size"),
        }
    }

    /// The bundle shipped alongside the driver executable.
    pub fn bundled() -> Result<Self> {
        Ok(Self::from_bin_dir(&driver_root()?.join(BUNDLE_BIN_DIR)))
    }
}

/// Directory holding the driver executable; the toolchain bundle and the
/// board-support packages live at fixed paths beneath it.
pub fn driver_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the driver executable")?;
    let root = exe
        .parent()
        .context("Driver executable has no parent directory")?;
    Ok(root.to_path_buf())
}
