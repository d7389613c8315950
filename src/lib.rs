#![doc = include_str!("../README.md")]

mod binary;
mod classifier;
mod decoder;
mod encoder;
mod error;
mod graph;
mod location;
mod model;
mod routing;
mod tags;

pub use binary::{
    BitField, CircleCodec, ClosedLineCodec, GeoCoordinateCodec, GridCodec, LineCodec,
    LocationCodec, PoiCodec, PointAlongLineCodec, PolygonCodec, RectangleCodec, decode_field,
    deserialize_base64_openlr, deserialize_binary_openlr, encode_field, serialize_base64_openlr,
    serialize_binary_openlr,
};
pub use classifier::{OsmClassifier, RoadClassifier};
pub use decoder::candidates::{
    CandidateVertex, CandidateVertices, find_all_candidate_vertices, find_candidate_vertices,
};
pub use decoder::resolver::{CandidateRoute, Routes, rate_candidate_routes, resolve_routes};
pub use decoder::{DecoderConfig, RouteScoring, decode_base64_openlr, decode_binary_openlr};
pub use encoder::lrp::{LocRefPoint, LocRefPoints};
pub use encoder::resolver::resolve_lrps;
pub use encoder::{EncoderConfig, encode_base64_openlr, encode_binary_openlr, encode_location};
pub use error::{DecodeError, DeserializeError, EncodeError, LocationError, SerializeError};
pub use graph::DirectedGraph;
pub use graph::path::{is_path_connected, path_length, path_vertices};
pub use location::{
    ClosedLineLocation, LineLocation, Location, PoiLocation, PointAlongLineLocation,
    ensure_closed_line_is_valid, ensure_line_is_valid, ensure_point_is_valid,
};
pub use model::{
    Bearing, Circle, ClosedLine, Coordinate, Fow, Frc, Grid, GridSize, Length, Line,
    LineAttributes, LocationReference, LocationType, Offset, Offsets, Orientation, PathAttributes,
    Poi, Point, PointAlongLine, Polygon, RatingScore, Rectangle, SideOfRoad,
};
pub use routing::{
    Path, ShortestPathConfig, ShortestPathTree, shortest_circuit, shortest_path,
    shortest_path_tree,
};
pub use tags::Tags;
