//! MCU family detection and per-family build profiles.
//!
//! A family groups every flag, include path and support file that a chip
//! line shares. Profiles are fully static: resolving one is a pure lookup,
//! never a computation or a cache.

/// Supported STM32 families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McuFamily {
    F4,
    H7,
    G0,
    G4,
}

/// Static build settings for one MCU family.
///
/// Paths are relative to the driver's board-support root (`boards/`) so the
/// same profile works wherever the toolchain bundle is installed.
#[derive(Debug)]
pub struct McuProfile {
    /// Board-support package subpath under the driver root
    pub bsp_dir: &'static str,
    /// CMSIS device folder name (e.g. `STM32F4xx`)
    pub cmsis_device: &'static str,
    /// Startup assembly source filename
    pub startup_file: &'static str,
    /// System clock/init C source filename
    pub system_file: &'static str,
    /// Linker script filename
    pub linker_script: &'static str,
    /// CPU instruction-set/FPU/ABI flags
    pub cpu_flags: &'static [&'static str],
    /// Preprocessor defines (without the `-D` prefix)
    pub defines: &'static [&'static str],
    /// Human-readable target description
    pub description: &'static str,
}

static F4_PROFILE: McuProfile = McuProfile {
    bsp_dir: "boards/f4",
    cmsis_device: "STM32F4xx",
    startup_file: "startup_stm32f407xx.s",
    system_file: "system_stm32f4xx.c",
    linker_script: "STM32F407VG_FLASH.ld",
    cpu_flags: &["-mcpu=cortex-m4", "-mthumb", "-mfloat-abi=soft"],
    defines: &["STM32F407xx"],
    description: "STM32F407VG (Cortex-M4, 168MHz)",
};

static H7_PROFILE: McuProfile = McuProfile {
    bsp_dir: "boards/h7",
    cmsis_device: "STM32H7xx",
    startup_file: "startup_stm32h723xx.s",
    system_file: "system_stm32h7xx.c",
    linker_script: "STM32H723VG_FLASH.ld",
    cpu_flags: &[
        "-mcpu=cortex-m7",
        "-mthumb",
        "-mfpu=fpv5-d16",
        "-mfloat-abi=hard",
    ],
    defines: &["STM32H723xx", "CORE_CM7", "DATA_IN_D2_SRAM"],
    description: "STM32H723VG (Cortex-M7, 550MHz)",
};

static G0_PROFILE: McuProfile = McuProfile {
    bsp_dir: "boards/g0",
    cmsis_device: "STM32G0xx",
    startup_file: "startup_stm32g0b1xx.s",
    system_file: "system_stm32g0xx.c",
    linker_script: "STM32G0B1CB_FLASH.ld",
    cpu_flags: &["-mcpu=cortex-m0plus", "-mthumb"],
    defines: &["STM32G0B1xx"],
    description: "STM32G0B1CB (Cortex-M0+, 64MHz)",
};

static G4_PROFILE: McuProfile = McuProfile {
    bsp_dir: "boards/g4",
    cmsis_device: "STM32G4xx",
    startup_file: "startup_stm32g431xx.s",
    system_file: "system_stm32g4xx.c",
    linker_script: "STM32G431CB_FLASH.ld",
    cpu_flags: &[
        "-mcpu=cortex-m4",
        "-mthumb",
        "-mfpu=fpv4-sp-d16",
        "-mfloat-abi=hard",
    ],
    defines: &["STM32G431xx"],
    description: "STM32G431CB (Cortex-M4, 170MHz)",
};

impl McuFamily {
    /// Detect the family from an MCU model string.
    ///
    /// Case-insensitive substring match against a fixed priority list.
    /// Unknown models fall back to F4 so a build is still attempted on
    /// hardware we have not catalogued yet.
    pub fn detect(model: &str) -> McuFamily {
        let model = model.to_uppercase();

        if model.contains("STM32H7") {
            McuFamily::H7
        } else if model.contains("STM32F4") {
            McuFamily::F4
        } else if model.contains("STM32G0") {
            McuFamily::G0
        } else if model.contains("STM32G4") {
            McuFamily::G4
        } else {
            McuFamily::F4
        }
    }

    /// Static build profile for this family.
    pub fn profile(self) -> &'static McuProfile {
        match self {
            McuFamily::F4 => &F4_PROFILE,
            McuFamily::H7 => &H7_PROFILE,
            McuFamily::G0 => &G0_PROFILE,
            McuFamily::G4 => &G4_PROFILE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_families() {
        assert_eq!(McuFamily::detect("STM32F407VGT6"), McuFamily::F4);
        assert_eq!(McuFamily::detect("STM32H723VGT6"), McuFamily::H7);
        assert_eq!(McuFamily::detect("STM32G0B1CBT6"), McuFamily::G0);
        assert_eq!(McuFamily::detect("STM32G431CBU6"), McuFamily::G4);
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(McuFamily::detect("stm32h723vgt6"), McuFamily::H7);
        assert_eq!(McuFamily::detect("Stm32g0b1cbt6"), McuFamily::G0);
    }

    #[test]
    fn test_unknown_model_falls_back_to_f4() {
        assert_eq!(McuFamily::detect("STM32L476RG"), McuFamily::F4);
        assert_eq!(McuFamily::detect("ATSAMD21G18"), McuFamily::F4);
        assert_eq!(McuFamily::detect(""), McuFamily::F4);
    }

    #[test]
    fn test_g4_not_shadowed_by_g0() {
        // Both start with STM32G; the priority list must still separate them.
        assert_eq!(McuFamily::detect("STM32G474RET6"), McuFamily::G4);
    }

    #[test]
    fn test_profiles_are_complete() {
        for family in [McuFamily::F4, McuFamily::H7, McuFamily::G0, McuFamily::G4] {
            let p = family.profile();
            assert!(!p.cpu_flags.is_empty());
            assert!(!p.defines.is_empty());
            assert!(p.startup_file.ends_with(".s"));
            assert!(p.system_file.ends_with(".c"));
            assert!(p.linker_script.ends_with(".ld"));
        }
    }
}
