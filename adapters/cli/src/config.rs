//! Optional TOML game configuration.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;
/// Largest number of cells a board may hold.
pub(crate) const MAX_BOARD_CELLS: u64 = u16::MAX as u64;

/// Game parameters resolved from the config file before flag overrides.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) version: u32,
    #[serde(default = "default_rows")]
    pub(crate) rows: u32,
    #[serde(default = "default_columns")]
    pub(crate) columns: u32,
    #[serde(default = "default_tile_extent")]
    pub(crate) tile_width: f32,
    #[serde(default = "default_tile_extent")]
    pub(crate) tile_height: f32,
    #[serde(default)]
    pub(crate) seed: u64,
    #[serde(default = "default_initial_tiles")]
    pub(crate) initial_tiles: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            rows: default_rows(),
            columns: default_columns(),
            tile_width: default_tile_extent(),
            tile_height: default_tile_extent(),
            seed: 0,
            initial_tiles: default_initial_tiles(),
        }
    }
}

impl GameConfig {
    /// Reads and validates the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read game config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid game config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse game config toml contents")?;
        if config.version != SUPPORTED_CONFIG_VERSION {
            bail!(
                "unsupported game config version {}; expected {}",
                config.version,
                SUPPORTED_CONFIG_VERSION
            );
        }
        validate_dimensions(config.rows, config.columns)?;
        if !(config.tile_width > 0.0 && config.tile_height > 0.0) {
            bail!(
                "tile size must be positive, got {}x{}",
                config.tile_width,
                config.tile_height
            );
        }
        Ok(config)
    }
}

/// Reports whether a `rows`×`columns` board is non-empty and within [`MAX_BOARD_CELLS`].
pub(crate) fn dimensions_fit(rows: u32, columns: u32) -> bool {
    rows > 0 && columns > 0 && u64::from(rows) * u64::from(columns) <= MAX_BOARD_CELLS
}

/// Rejects empty boards and boards larger than [`MAX_BOARD_CELLS`].
pub(crate) fn validate_dimensions(rows: u32, columns: u32) -> Result<()> {
    if !dimensions_fit(rows, columns) {
        bail!(
            "board dimensions must be positive and hold at most {MAX_BOARD_CELLS} cells, got {rows}x{columns}"
        );
    }
    Ok(())
}

const fn default_rows() -> u32 {
    4
}

const fn default_columns() -> u32 {
    4
}

const fn default_tile_extent() -> f32 {
    100.0
}

const fn default_initial_tiles() -> usize {
    9
}
