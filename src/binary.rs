pub(crate) mod bits;
mod codec;
mod encoding;
mod header;
mod reader;
mod writer;

pub use bits::{BitField, decode_field, encode_field};
pub use codec::{
    CircleCodec, ClosedLineCodec, GeoCoordinateCodec, GridCodec, LineCodec, LocationCodec,
    PoiCodec, PointAlongLineCodec, PolygonCodec, RectangleCodec, deserialize_base64_openlr,
    deserialize_binary_openlr, serialize_base64_openlr, serialize_binary_openlr,
};
