use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use hexmap_core::GridSettings;
use hexmap_world::{self as world, FormatError, Grid, MAP_FORMAT_VERSION};

const SHARE_DOMAIN: &str = "hexmap";

/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a grid into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(grid: &Grid) -> Result<String, FormatError> {
    let bytes = world::save(grid)?;
    let encoded = STANDARD_NO_PAD.encode(bytes);
    Ok(format!(
        "{SHARE_DOMAIN}{FIELD_DELIMITER}v{MAP_FORMAT_VERSION}{FIELD_DELIMITER}{encoded}"
    ))
}

/// Decodes a share string into a new grid built with `settings`.
pub(crate) fn decode(value: &str, settings: GridSettings) -> Result<Grid, MapTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MapTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(MapTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(MapTransferError::MissingVersion)?;
    let payload = parts.next().ok_or(MapTransferError::MissingPayload)?;

    if domain != SHARE_DOMAIN {
        return Err(MapTransferError::InvalidPrefix(domain.to_owned()));
    }
    let supported = version
        .strip_prefix('v')
        .and_then(|number| number.parse::<i32>().ok())
        .map_or(false, |number| (0..=MAP_FORMAT_VERSION).contains(&number));
    if !supported {
        return Err(MapTransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(MapTransferError::InvalidEncoding)?;
    world::load_with(settings, &bytes).map_err(MapTransferError::InvalidPayload)
}

/// Errors that can occur while decoding map share strings.
#[derive(Debug)]
pub(crate) enum MapTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the share string.
    MissingPrefix,
    /// The share string did not contain a version segment.
    MissingVersion,
    /// The share string did not include the payload segment.
    MissingPayload,
    /// The share string used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The share string used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload is not a valid map.
    InvalidPayload(FormatError),
}

impl fmt::Display for MapTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "share string was empty"),
            Self::MissingPrefix => write!(f, "share string is missing the prefix"),
            Self::MissingVersion => write!(f, "share string is missing the version"),
            Self::MissingPayload => write!(f, "share string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "share prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "share version '{version}' is not supported")
            }
            Self::InvalidEncoding(error) => write!(f, "could not decode map payload: {error}"),
            Self::InvalidPayload(error) => write!(f, "could not load map payload: {error}"),
        }
    }
}

impl Error for MapTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}
