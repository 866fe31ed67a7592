use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use threes_core::{CellCoord, Command};
use threes_world::{query, World};

use crate::config::dimensions_fit;

const SNAPSHOT_DOMAIN: &str = "threes";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "threes:v1";
/// Delimiter used to separate the prefix, board dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of the resting tiles and the board dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct BoardLayoutSnapshot {
    /// Number of rows on the board.
    pub(crate) rows: u32,
    /// Number of columns on the board.
    pub(crate) columns: u32,
    /// Tiles resting on the board, in row-major order.
    pub(crate) tiles: Vec<BoardLayoutTile>,
}

impl BoardLayoutSnapshot {
    /// Captures the resting tiles of the provided world.
    #[must_use]
    pub(crate) fn capture(world: &World) -> Self {
        let matrix = query::matrix(world);
        let tiles = matrix
            .occupied()
            .filter_map(|(cell, tile)| {
                query::tile(world, tile).map(|snapshot| BoardLayoutTile {
                    number: snapshot.number,
                    cell,
                })
            })
            .collect();
        Self {
            rows: matrix.rows(),
            columns: matrix.columns(),
            tiles,
        }
    }

    /// Commands that rebuild this layout on a fresh board.
    #[must_use]
    pub(crate) fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(self.tiles.len() + 1);
        commands.push(Command::ConfigureBoard {
            rows: self.rows,
            columns: self.columns,
        });
        commands.extend(self.tiles.iter().map(|tile| Command::AddTile {
            number: tile.number,
            cell: tile.cell,
        }));
        commands
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let payload = SerializableSnapshot {
            tiles: self.tiles.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.rows, self.columns
        ))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts
            .next()
            .ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (rows, columns) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self {
            rows,
            columns,
            tiles: decoded.tiles,
        })
    }
}

/// Tile description captured within a layout snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct BoardLayoutTile {
    /// Number carried by the tile.
    pub(crate) number: u32,
    /// Cell the tile rests on.
    pub(crate) cell: CellCoord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    tiles: Vec<BoardLayoutTile>,
}

/// Errors that can occur while encoding or decoding layout transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include board dimensions.
    #[error("layout string is missing the board dimensions")]
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The board dimensions could not be parsed from the encoded snapshot.
    #[error("could not parse board dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not process layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (rows, columns) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;
    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;

    if !dimensions_fit(rows, columns) {
        return Err(invalid());
    }

    Ok((rows, columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use threes_world::apply;

    #[test]
    fn captured_layout_survives_transfer() {
        let mut world = World::new();
        let mut events = Vec::new();
        for (column, row, number) in [(0, 0, 3), (2, 1, 12), (3, 3, 1)] {
            apply(
                &mut world,
                Command::AddTile {
                    number,
                    cell: CellCoord::new(column, row),
                },
                &mut events,
            );
        }

        let snapshot = BoardLayoutSnapshot::capture(&world);
        let encoded = snapshot.encode().expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:4x4:")));

        let decoded = BoardLayoutSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);

        let mut rebuilt = World::new();
        for command in decoded.commands() {
            apply(&mut rebuilt, command, &mut events);
        }
        assert_eq!(BoardLayoutSnapshot::capture(&rebuilt), snapshot);
    }

    #[test]
    fn rejects_foreign_prefix() {
        let error = BoardLayoutSnapshot::decode("puzzle:v1:4x4:e30").expect_err("prefix rejected");
        assert!(matches!(error, LayoutTransferError::InvalidPrefix(prefix) if prefix == "puzzle"));
    }

    #[test]
    fn rejects_zero_dimensions() {
        let error =
            BoardLayoutSnapshot::decode("threes:v1:0x4:e30").expect_err("dimensions rejected");
        assert!(matches!(error, LayoutTransferError::InvalidDimensions(_)));
    }

    #[test]
    fn rejects_oversized_dimensions() {
        let error = BoardLayoutSnapshot::decode("threes:v1:100000x100000:e30")
            .expect_err("dimensions rejected");
        assert!(
            matches!(error, LayoutTransferError::InvalidDimensions(dimensions) if dimensions == "100000x100000")
        );
    }

    #[test]
    fn rejects_empty_string() {
        assert!(matches!(
            BoardLayoutSnapshot::decode("   "),
            Err(LayoutTransferError::EmptyPayload)
        ));
    }
}
