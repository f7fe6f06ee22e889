mod clean;
mod entry;
mod pipeline;
mod scan;

pub use clean::clean_build;
pub use entry::{has_entry_point, synthesize_entry_point, SHIM_FILENAME};
pub use pipeline::{compile_workspace, BuildOptions, BuildResult, BUILD_MARKER_DIR};
pub use scan::{scan, SourceSet};
