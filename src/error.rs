use std::io::ErrorKind;

use thiserror::Error;

use crate::{BitField, Coordinate, Length, LocationType, Point};

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum DeserializeError {
    #[error("OpenLR input is not valid Base64")]
    InvalidBase64,
    #[error("OpenLR buffer I/O error: {0:?}")]
    IO(ErrorKind),
    #[error("OpenLR version {0} is not supported, expected 3")]
    VersionNotSupported(u8),
    #[error("OpenLR header is not valid: {0:08b}")]
    InvalidHeader(u8),
    #[error("OpenLR {0:?} payload is malformed")]
    MalformedInput(LocationType),
    #[error("OpenLR bit field out of range: {0:?}")]
    OutOfRange(BitField),
    #[error("OpenLR Coordinate is not valid: {0:?}")]
    InvalidCoordinate(Coordinate),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum SerializeError {
    #[error("OpenLR buffer I/O error: {0:?}")]
    IO(ErrorKind),
    #[error("OpenLR bit field out of range: {0:?}")]
    OutOfRange(BitField),
    #[error("OpenLR bearing {0} is outside [0, 360)")]
    InvalidBearing(u16),
    #[error("OpenLR relative offset {0} is outside [0, 1)")]
    InvalidOffset(f64),
    #[error("OpenLR line needs 2 or more location reference points")]
    InvalidLine,
    #[error("OpenLR polygon needs 3 or more corners")]
    InvalidPolygon,
    #[error("OpenLR Rectangle consists of a lower left and an upper right coordinate")]
    InvalidRectangle,
    #[error("OpenLR grid needs more than one column and more than one row")]
    InvalidGridSize,
    #[error("OpenLR Coordinate is not valid: {0:?}")]
    InvalidCoordinate(Coordinate),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum DecodeError {
    #[error("Cannot decode location: {0}")]
    DeserializeError(#[from] DeserializeError),
    #[error("Cannot decode location: {0}")]
    InvalidLocation(#[from] LocationError),
    #[error("Cannot find candidates for {0:?}")]
    NoCandidate(Point),
    #[error("No route matches the LRP pair {0:?}")]
    NoRoute((Point, Point)),
    #[error("Route {0} does not end where the next route starts")]
    Inconsistent(usize),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum EncodeError {
    #[error("Cannot encode location: {0}")]
    SerializeError(#[from] SerializeError),
    #[error("Cannot encode location: {0}")]
    InvalidLocation(#[from] LocationError),
    #[error("No shortest path connects the location edges")]
    NoRoute,
    #[error("Cannot infer FRC and FOW of the edge at location index {0}")]
    Unclassifiable(usize),
    #[error("Location does not yield enough LRPs")]
    InvalidLrp,
    #[error("An edge is longer than the maximum distance between LRPs")]
    MaxDistanceExceeded,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum LocationError {
    #[error("Offsets {0:?} do not fit the location length")]
    InvalidOffsets((Length, Length)),
    #[error("Location has no edges")]
    Empty,
    #[error("Location edges are not connected")]
    NotConnected,
}

impl From<base64::DecodeError> for DeserializeError {
    fn from(_: base64::DecodeError) -> Self {
        Self::InvalidBase64
    }
}

impl From<std::io::Error> for DeserializeError {
    fn from(error: std::io::Error) -> Self {
        Self::IO(error.kind())
    }
}

impl From<std::io::Error> for SerializeError {
    fn from(error: std::io::Error) -> Self {
        Self::IO(error.kind())
    }
}
