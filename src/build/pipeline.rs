//! The firmware build pipeline.
//!
//! One invocation runs a fixed sequence of stages: load the board
//! configuration, prepare the build directory, scan the workspace, ensure an
//! entry point exists, compile startup/system/user sources one at a time,
//! link, then report size and convert to a raw binary. Any compile or link
//! failure stops the pipeline immediately; size reporting and binary
//! conversion are best-effort extras on top of a successful link.
//!
//! All state for a build lives in a [`BuildContext`] constructed fresh per
//! invocation; nothing carries over between builds.

use std::fs;
use std::path::{Path, PathBuf};

use crate::board;
use crate::mcu::McuProfile;
use crate::runner::{RunOutput, ToolRunner};
use crate::toolchain::{self, ToolchainPaths};

use super::entry::{has_entry_point, synthesize_entry_point};
use super::scan::scan;

/// Name of the per-workspace directory holding all build output.
pub const BUILD_MARKER_DIR: &str = ".lumos";

/// Per-invocation knobs. Everything here is threaded explicitly through the
/// pipeline; there is no long-lived driver state.
#[derive(Debug, Default)]
pub struct BuildOptions {
    /// Per-tool-invocation timeout. `None` waits indefinitely.
    pub timeout_ms: Option<u64>,
    /// Extra flags appended to every compile invocation.
    pub extra_flags: Vec<String>,
    /// Toolchain override; defaults to the bundle next to the executable.
    pub toolchain: Option<ToolchainPaths>,
    /// Board-support root override; defaults to the driver directory.
    pub bsp_root: Option<PathBuf>,
}

/// Terminal outcome of one build invocation. Never mutated after return.
#[derive(Debug)]
pub struct BuildResult {
    pub success: bool,
    /// Accumulated human-readable progress log, complete up to the point the
    /// build finished or failed.
    pub output: String,
    pub elf_path: Option<PathBuf>,
    pub bin_path: Option<PathBuf>,
    pub error: Option<String>,
    /// Raw diagnostic stream of the failing step, when one exists.
    pub stderr: Option<String>,
}

/// A fatal stage failure, carried up to be folded into the [`BuildResult`].
struct StageFailure {
    error: String,
    stderr: Option<String>,
}

impl StageFailure {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            stderr: None,
        }
    }

    fn from_tool(headline: &str, result: &RunOutput) -> Self {
        let diag = result
            .error
            .clone()
            .unwrap_or_else(|| result.stderr.clone());
        Self {
            error: format!("{}\n{}", headline, diag),
            stderr: Some(result.stderr.clone()),
        }
    }
}

/// Everything one build needs, resolved once up front.
struct BuildContext<'a> {
    workspace: &'a Path,
    build_dir: PathBuf,
    toolchain: ToolchainPaths,
    /// Family BSP directory (CMSIS tree + lumos_config) under the driver root
    bsp_path: PathBuf,
    profile: &'static McuProfile,
    timeout_ms: Option<u64>,
    extra_flags: &'a [String],
}

impl BuildContext<'_> {
    /// Directory holding the startup/system sources and the linker script.
    fn config_dir(&self) -> PathBuf {
        self.bsp_path.join("lumos_config")
    }

    fn cmsis_device_include(&self) -> PathBuf {
        self.bsp_path
            .join("Drivers")
            .join("CMSIS")
            .join("Device")
            .join("ST")
            .join(self.profile.cmsis_device)
            .join("Include")
    }

    fn cmsis_core_include(&self) -> PathBuf {
        self.bsp_path.join("Drivers").join("CMSIS").join("Include")
    }

    /// Object path for a source: same stem, `.o`, in the build directory.
    fn object_for(&self, source: &Path) -> PathBuf {
        let stem = source.file_stem().unwrap_or_default();
        let mut name = stem.to_os_string();
        name.push(".o");
        self.build_dir.join(name)
    }
}

/// Build the firmware for `workspace` targeting `board_id`.
///
/// This is the single public entry point of the pipeline. It never panics
/// and never returns `Err`; every failure mode is folded into the returned
/// [`BuildResult`] together with the progress log accumulated so far.
pub fn compile_workspace(
    workspace: &Path,
    board_id: &str,
    runner: &dyn ToolRunner,
    opts: &BuildOptions,
) -> BuildResult {
    let mut log: Vec<String> = Vec::new();

    match run_pipeline(workspace, board_id, runner, opts, &mut log) {
        Ok((elf_path, bin_path)) => BuildResult {
            success: true,
            output: log.join("\n"),
            elf_path: Some(elf_path),
            bin_path,
            error: None,
            stderr: None,
        },
        Err(failure) => BuildResult {
            success: false,
            output: log.join("\n"),
            elf_path: None,
            bin_path: None,
            error: Some(failure.error),
            stderr: failure.stderr,
        },
    }
}

fn run_pipeline(
    workspace: &Path,
    board_id: &str,
    runner: &dyn ToolRunner,
    opts: &BuildOptions,
    log: &mut Vec<String>,
) -> Result<(PathBuf, Option<PathBuf>), StageFailure> {
    // --- ConfigLoad ---
    let (board, profile) =
        board::resolve_profile(board_id).map_err(|e| StageFailure::new(e.to_string()))?;

    let toolchain = match &opts.toolchain {
        Some(tc) => tc.clone(),
        None => ToolchainPaths::bundled().map_err(|e| StageFailure::new(e.to_string()))?,
    };
    let bsp_root = match &opts.bsp_root {
        Some(root) => root.clone(),
        None => toolchain::driver_root().map_err(|e| StageFailure::new(e.to_string()))?,
    };

    // --- SetupBuildDir ---
    let build_dir = workspace.join(BUILD_MARKER_DIR).join("build");
    fs::create_dir_all(&build_dir).map_err(|e| {
        StageFailure::new(format!(
            "Failed to create build directory {}: {}",
            build_dir.display(),
            e
        ))
    })?;

    let ctx = BuildContext {
        workspace,
        build_dir,
        toolchain,
        bsp_path: bsp_root.join(profile.bsp_dir),
        profile,
        timeout_ms: opts.timeout_ms,
        extra_flags: &opts.extra_flags,
    };

    log.push("=== Lumos Firmware Build ===".to_string());
    log.push(format!("Board: {}", board.board.name));
    log.push(format!("Target: {}", profile.description));
    log.push(format!("Workspace: {}", workspace.display()));
    log.push(format!("Build directory: {}", ctx.build_dir.display()));
    log.push(String::new());

    // --- Scan ---
    log.push("Scanning for source files...".to_string());
    let sources = scan(workspace);

    if sources.compilable_count() == 0 {
        return Err(StageFailure::new("No source files found in workspace"));
    }

    log.push(format!("Found {} C++ file(s)", sources.cpp.len()));
    log.push(format!("Found {} C file(s)", sources.c.len()));
    log.push(format!("Found {} header file(s)", sources.headers.len()));
    log.push(String::new());

    // --- EntryPointCheck ---
    let shim_path = if has_entry_point(&sources) {
        log.push("Detected existing main() function, skipping wrapper...".to_string());
        None
    } else {
        log.push("Creating Arduino-style main() wrapper...".to_string());
        let path = synthesize_entry_point(&ctx.build_dir)
            .map_err(|e| StageFailure::new(e.to_string()))?;
        Some(path)
    };
    log.push(String::new());

    // --- Compile stages ---
    log.push("Compiling source files...".to_string());
    let mut objects: Vec<PathBuf> = Vec::new();

    let startup = ctx.config_dir().join(profile.startup_file);
    log.push(format!("  Compiling {} startup code...", board.mcu.model));
    compile_into(&ctx, runner, &startup, "Failed to compile startup code:", &mut objects)?;

    let system = ctx.config_dir().join(profile.system_file);
    log.push(format!(
        "  Compiling {} system initialization...",
        board.mcu.model
    ));
    compile_into(
        &ctx,
        runner,
        &system,
        "Failed to compile system initialization:",
        &mut objects,
    )?;
    log.push(String::new());

    for source in sources.cpp.iter().chain(sources.c.iter()) {
        let name = file_name(source);
        log.push(format!("  Compiling {}...", name));
        compile_into(
            &ctx,
            runner,
            source,
            &format!("Failed to compile {}:", name),
            &mut objects,
        )?;
    }

    if let Some(shim) = &shim_path {
        log.push("  Compiling Arduino wrapper...".to_string());
        compile_into(&ctx, runner, shim, "Failed to compile wrapper:", &mut objects)?;
    }

    log.push(format!("Successfully compiled {} file(s)", objects.len()));
    log.push(String::new());

    // --- Link ---
    log.push("Linking...".to_string());
    let elf_path = ctx.build_dir.join("firmware.elf");
    let link_result = link(&ctx, runner, &objects, &elf_path);
    if !link_result.success {
        return Err(StageFailure::from_tool("Linking failed:", &link_result));
    }
    log.push("Linking successful".to_string());
    log.push(String::new());

    // --- SizeReport (best-effort: a failure only omits the report) ---
    log.push("Getting binary size...".to_string());
    let size_result = runner.run(
        &ctx.toolchain.size,
        &[elf_path.display().to_string()],
        ctx.timeout_ms,
    );
    if size_result.success && !size_result.stdout.is_empty() {
        log.push(size_result.stdout.trim().to_string());
    }
    log.push(String::new());

    // --- ElfToBin (best-effort: the build already succeeded at link time) ---
    log.push("Creating binary file...".to_string());
    let bin_path = ctx.build_dir.join("firmware.bin");
    let bin_result = runner.run(
        &ctx.toolchain.objcopy,
        &[
            "-O".to_string(),
            "binary".to_string(),
            elf_path.display().to_string(),
            bin_path.display().to_string(),
        ],
        ctx.timeout_ms,
    );
    let bin_path = if bin_result.success {
        log.push(format!("Binary created: {}", bin_path.display()));
        Some(bin_path)
    } else {
        log.push("Binary conversion failed; flash the ELF directly".to_string());
        None
    };

    log.push(String::new());
    log.push("=== Compilation Complete ===".to_string());

    Ok((elf_path, bin_path))
}

/// Compile one source; on success its object joins the link set.
fn compile_into(
    ctx: &BuildContext,
    runner: &dyn ToolRunner,
    source: &Path,
    failure_headline: &str,
    objects: &mut Vec<PathBuf>,
) -> Result<(), StageFailure> {
    let (result, object) = compile_file(ctx, runner, source);
    if !result.success {
        return Err(StageFailure::from_tool(failure_headline, &result));
    }
    objects.push(object);
    Ok(())
}

/// Compile a single source file into the build directory.
///
/// Assembly sources get only the CPU flags; C/C++ sources get the full
/// include/define/optimization set. C and assembly go through the C
/// compiler, everything else through the C++ compiler.
fn compile_file(ctx: &BuildContext, runner: &dyn ToolRunner, source: &Path) -> (RunOutput, PathBuf) {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    let is_assembly = ext == "s";

    let compiler = if is_assembly || ext == "c" {
        &ctx.toolchain.cc
    } else {
        &ctx.toolchain.cxx
    };

    let object = ctx.object_for(source);

    let mut args = vec![
        "-c".to_string(),
        source.display().to_string(),
        "-o".to_string(),
        object.display().to_string(),
    ];

    if is_assembly {
        args.extend(ctx.profile.cpu_flags.iter().map(|f| f.to_string()));
        args.extend(ctx.extra_flags.iter().cloned());
        return (runner.run(compiler, &args, ctx.timeout_ms), object);
    }

    args.push(format!("-I{}", ctx.workspace.display()));
    args.push(format!("-I{}", ctx.config_dir().display()));
    args.push(format!("-I{}", ctx.cmsis_device_include().display()));
    args.push(format!("-I{}", ctx.cmsis_core_include().display()));
    args.extend(ctx.profile.cpu_flags.iter().map(|f| f.to_string()));
    args.extend(ctx.profile.defines.iter().map(|d| format!("-D{}", d)));
    args.push("-O2".to_string());
    args.push("-Wall".to_string());
    // Per-section placement lets --gc-sections drop dead code at link time.
    args.push("-ffunction-sections".to_string());
    args.push("-fdata-sections".to_string());
    args.extend(ctx.extra_flags.iter().cloned());

    (runner.run(compiler, &args, ctx.timeout_ms), object)
}

/// Link every produced object into the firmware ELF.
fn link(
    ctx: &BuildContext,
    runner: &dyn ToolRunner,
    objects: &[PathBuf],
    elf_path: &Path,
) -> RunOutput {
    let linker_script = ctx.config_dir().join(ctx.profile.linker_script);
    let map_path = ctx.build_dir.join("output.map");

    let mut args: Vec<String> = objects.iter().map(|o| o.display().to_string()).collect();
    args.push("-o".to_string());
    args.push(elf_path.display().to_string());
    args.extend(ctx.profile.cpu_flags.iter().map(|f| f.to_string()));
    args.push(format!("-T{}", linker_script.display()));
    args.push("-Wl,--gc-sections".to_string());
    args.push(format!("-Wl,-Map={}", map_path.display()));
    // Bare-metal runtime: no syscalls, newlib-nano.
    args.push("-specs=nosys.specs".to_string());
    args.push("--specs=nano.specs".to_string());

    runner.run(&ctx.toolchain.cxx, &args, ctx.timeout_ms)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
