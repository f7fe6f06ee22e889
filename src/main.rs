//! # lumosc CLI Entry Point
//!
//! Thin command-line front end over the build pipeline. Parses arguments
//! with clap and routes to the library; all build logic lives in the
//! library modules so it stays testable without a terminal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use lumosc::board;
use lumosc::build::{self, BuildOptions};
use lumosc::mcu::McuFamily;
use lumosc::runner::ProcessRunner;
use lumosc::toolchain::ToolchainPaths;

#[derive(Parser)]
#[command(name = "lumosc")]
#[command(about = "Firmware build driver for Lumos boards", version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a workspace into a flashable firmware image
    Build {
        /// Workspace root (defaults to the current directory)
        workspace: Option<PathBuf>,
        /// Target board identifier (see `lumosc boards`)
        #[arg(short, long, default_value = "lumos-brain")]
        board: String,
        /// Per-tool timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Override the cross-toolchain bin directory
        #[arg(long)]
        toolchain_bin: Option<PathBuf>,
        /// Extra flags appended to every compile invocation
        #[arg(long = "flag")]
        flags: Vec<String>,
    },
    /// List the supported boards
    Boards,
    /// Remove build artifacts for a workspace
    Clean {
        /// Workspace root (defaults to the current directory)
        workspace: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            workspace,
            board,
            timeout_ms,
            toolchain_bin,
            flags,
        } => run_build(workspace, &board, timeout_ms, toolchain_bin, flags),
        Commands::Boards => {
            list_boards();
            Ok(())
        }
        Commands::Clean { workspace } => {
            let workspace = workspace_or_cwd(workspace)?;
            build::clean_build(&workspace)?;
            println!("{} Clean complete.", "✓".green());
            Ok(())
        }
    }
}

fn workspace_or_cwd(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => Ok(path),
        None => Ok(std::env::current_dir()?),
    }
}

fn run_build(
    workspace: Option<PathBuf>,
    board: &str,
    timeout_ms: Option<u64>,
    toolchain_bin: Option<PathBuf>,
    extra_flags: Vec<String>,
) -> Result<()> {
    let workspace = workspace_or_cwd(workspace)?;

    let opts = BuildOptions {
        timeout_ms,
        extra_flags,
        toolchain: toolchain_bin.map(|bin| ToolchainPaths::from_bin_dir(&bin)),
        bsp_root: None,
    };

    let result = build::compile_workspace(&workspace, board, &ProcessRunner, &opts);

    println!("{}", result.output);

    if result.success {
        if let Some(elf) = &result.elf_path {
            println!("{} Firmware: {}", "✓".green(), elf.display());
        }
        if let Some(bin) = &result.bin_path {
            println!("{} Binary:   {}", "✓".green(), bin.display());
        }
        Ok(())
    } else {
        if let Some(error) = &result.error {
            eprintln!("{} {}", "x".red(), error);
        }
        std::process::exit(1);
    }
}

fn list_boards() {
    println!("{}", "Supported boards:".bold());
    for id in board::board_ids() {
        match board::resolve_board(id) {
            Ok(config) => {
                let profile = McuFamily::detect(&config.mcu.model).profile();
                println!(
                    "  {} {} — {} ({})",
                    "→".dimmed(),
                    id.cyan(),
                    config.board.name,
                    profile.description
                );
            }
            Err(e) => eprintln!("  {} {}: {}", "!".yellow(), id, e),
        }
    }
}
