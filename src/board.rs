//! Board registry.
//!
//! Maps a board identifier to its bundled configuration document. The set of
//! boards is closed: the JSON documents ship inside the binary via
//! `include_str!`, so resolution never touches the filesystem.

use serde::Deserialize;

use crate::mcu::{McuFamily, McuProfile};

/// A board configuration document as bundled under `boards/`.
#[derive(Deserialize, Debug, Clone)]
pub struct BoardConfig {
    pub board: BoardInfo,
    pub mcu: McuInfo,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BoardInfo {
    pub name: String,
    #[serde(default)]
    pub revision: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct McuInfo {
    pub model: String,
    #[serde(default)]
    pub flash_kb: Option<u32>,
    #[serde(default)]
    pub ram_kb: Option<u32>,
}

/// Error type for board/profile resolution
#[derive(Debug)]
pub enum ConfigError {
    /// Board identifier is not in the bundled registry
    UnknownBoard(String),
    /// A bundled board document failed to parse (a packaging bug, not user error)
    MalformedDocument(String, serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownBoard(id) => write!(f, "Unknown board ID: {}", id),
            ConfigError::MalformedDocument(id, e) => {
                write!(f, "Bundled board document for '{}' is malformed: {}", id, e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

const BOARDS: &[(&str, &str)] = &[
    ("lumos-brain", include_str!("../boards/LumosBrain.json")),
    ("lumos-microbrain", include_str!("../boards/LumosMicroBrain.json")),
];

/// Identifiers of every bundled board, in registry order.
pub fn board_ids() -> impl Iterator<Item = &'static str> {
    BOARDS.iter().map(|(id, _)| *id)
}

/// Look up a board by identifier. Pure: no filesystem or process side effects.
pub fn resolve_board(board_id: &str) -> Result<BoardConfig, ConfigError> {
    let (_, doc) = BOARDS
        .iter()
        .find(|(id, _)| *id == board_id)
        .ok_or_else(|| ConfigError::UnknownBoard(board_id.to_string()))?;

    serde_json::from_str(doc)
        .map_err(|e| ConfigError::MalformedDocument(board_id.to_string(), e))
}

/// Resolve a board identifier to its configuration and MCU build profile.
pub fn resolve_profile(board_id: &str) -> Result<(BoardConfig, &'static McuProfile), ConfigError> {
    let config = resolve_board(board_id)?;
    let profile = McuFamily::detect(&config.mcu.model).profile();
    Ok((config, profile))
}
