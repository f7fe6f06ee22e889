//! Entry-point detection and shim synthesis.
//!
//! Detection is a deliberate text-level heuristic, not a parse: the pattern
//! can match inside a comment or string literal and can miss exotic
//! formatting. That trade-off matches how sketch-style workspaces are
//! actually written, and keeps the check cheap.

use anyhow::{Context, Result};
use colored::*;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::scan::SourceSet;

/// File name of the synthesized entry-point source in the build directory.
pub const SHIM_FILENAME: &str = "_lumos_main_wrapper.cpp";

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(int|void|auto)\s+main\s*\(").unwrap())
}

/// True if any C/C++ source in the set declares a conventional `main`.
///
/// Files that cannot be read are reported and treated as not matching; the
/// compiler will surface the real problem later.
pub fn has_entry_point(sources: &SourceSet) -> bool {
    sources
        .cpp
        .iter()
        .chain(sources.c.iter())
        .any(|path| match fs::read_to_string(path) {
            Ok(content) => entry_pattern().is_match(&content),
            Err(e) => {
                eprintln!("{} Could not read {}: {}", "!".yellow(), path.display(), e);
                false
            }
        })
}

const SHIM_SOURCE: &str = r#"// Auto-generated wrapper for Arduino-style setup()/loop()
extern "C" void setup() __attribute__((weak));
extern "C" void loop() __attribute__((weak));

void setup() {}
void loop() {}

int main() {
    setup();
    while(1) {
        loop();
    }
    return 0;
}
"#;

/// Write the init-once/run-forever entry-point shim into the build directory.
///
/// The hooks are weakly bound, so user definitions of `setup()`/`loop()`
/// override the empty defaults at link time.
pub fn synthesize_entry_point(build_dir: &Path) -> Result<PathBuf> {
    let shim_path = build_dir.join(SHIM_FILENAME);
    fs::write(&shim_path, SHIM_SOURCE)
        .with_context(|| format!("Failed to write entry-point shim to {}", shim_path.display()))?;
    Ok(shim_path)
}
