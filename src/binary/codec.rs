use std::io::ErrorKind;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::binary::bits::fields;
use crate::binary::encoding::EncodedAttributes;
use crate::binary::header::Header;
use crate::binary::reader::OpenLrBinaryReader;
use crate::binary::writer::OpenLrBinaryWriter;
use crate::{
    Circle, ClosedLine, Coordinate, DeserializeError, Grid, Line, LocationReference, LocationType,
    Offset, Offsets, Poi, PointAlongLine, Polygon, Rectangle, SerializeError,
};

/// Binary codec of a single location kind.
///
/// `can_decode` never fails: it only inspects the header flags and the payload length,
/// so that a dispatcher can probe the codecs one after the other.
pub trait LocationCodec {
    type Location;

    /// Returns true if the payload has the header and the length of this location kind.
    fn can_decode(data: &[u8]) -> bool;

    /// Decodes a payload accepted by [`LocationCodec::can_decode`].
    fn decode(data: &[u8]) -> Result<Self::Location, DeserializeError>;

    /// Appends the binary representation of the location to the buffer.
    /// Nothing is appended if the location cannot be encoded.
    fn encode(location: &Self::Location, buffer: &mut Vec<u8>) -> Result<(), SerializeError>;
}

/// Deserializes an OpenLR Location Reference encoded in Base64.
pub fn deserialize_base64_openlr(
    data: impl AsRef<[u8]>,
) -> Result<LocationReference, DeserializeError> {
    let data = BASE64_STANDARD.decode(data)?;
    deserialize_binary_openlr(&data)
}

/// Deserializes a binary representation of an OpenLR Location Reference.
pub fn deserialize_binary_openlr(data: &[u8]) -> Result<LocationReference, DeserializeError> {
    use LocationReference::*;

    if LineCodec::can_decode(data) {
        LineCodec::decode(data).map(Line)
    } else if ClosedLineCodec::can_decode(data) {
        ClosedLineCodec::decode(data).map(ClosedLine)
    } else if GeoCoordinateCodec::can_decode(data) {
        GeoCoordinateCodec::decode(data).map(GeoCoordinate)
    } else if PoiCodec::can_decode(data) {
        PoiCodec::decode(data).map(Poi)
    } else if PointAlongLineCodec::can_decode(data) {
        PointAlongLineCodec::decode(data).map(PointAlongLine)
    } else if GridCodec::can_decode(data) {
        GridCodec::decode(data).map(Grid)
    } else if RectangleCodec::can_decode(data) {
        RectangleCodec::decode(data).map(Rectangle)
    } else if PolygonCodec::can_decode(data) {
        PolygonCodec::decode(data).map(Polygon)
    } else if CircleCodec::can_decode(data) {
        CircleCodec::decode(data).map(Circle)
    } else {
        Err(undecodable(data))
    }
}

/// Serializes an OpenLR Location Reference into Base64.
pub fn serialize_base64_openlr(location: &LocationReference) -> Result<String, SerializeError> {
    let data = serialize_binary_openlr(location)?;
    Ok(BASE64_STANDARD.encode(data))
}

/// Serializes an OpenLR Location Reference into binary.
pub fn serialize_binary_openlr(location: &LocationReference) -> Result<Vec<u8>, SerializeError> {
    use LocationReference::*;

    let mut data = Vec::new();

    match location {
        Line(line) => LineCodec::encode(line, &mut data)?,
        GeoCoordinate(coordinate) => GeoCoordinateCodec::encode(coordinate, &mut data)?,
        PointAlongLine(point) => PointAlongLineCodec::encode(point, &mut data)?,
        Poi(poi) => PoiCodec::encode(poi, &mut data)?,
        Circle(circle) => CircleCodec::encode(circle, &mut data)?,
        Rectangle(rectangle) => RectangleCodec::encode(rectangle, &mut data)?,
        Grid(grid) => GridCodec::encode(grid, &mut data)?,
        Polygon(polygon) => PolygonCodec::encode(polygon, &mut data)?,
        ClosedLine(line) => ClosedLineCodec::encode(line, &mut data)?,
    };

    Ok(data)
}

fn undecodable(data: &[u8]) -> DeserializeError {
    let Some(&byte) = data.first() else {
        return DeserializeError::IO(ErrorKind::UnexpectedEof);
    };

    match Header::from_byte(byte) {
        Ok(header) => header
            .location_type(data.len())
            .map_or(DeserializeError::InvalidHeader(byte), |location_type| {
                DeserializeError::MalformedInput(location_type)
            }),
        Err(error) => error,
    }
}

/// Number of offset bytes announced by the flags of the last attributes.
fn offset_flags_count(byte: Option<&u8>) -> Option<usize> {
    let byte = *byte?;
    let pos = fields::POS_OFFSET_FLAG.decode(byte).ok()?;
    let neg = fields::NEG_OFFSET_FLAG.decode(byte).ok()?;
    Some((pos + neg) as usize)
}

fn read_offsets(
    reader: &mut OpenLrBinaryReader,
    attributes: &EncodedAttributes,
    location_type: LocationType,
) -> Result<Offsets, DeserializeError> {
    let mut offsets = Offsets::default();
    if attributes.pos_offset_flag() {
        offsets.pos = reader.read_offset()?;
    }
    if attributes.neg_offset_flag() {
        offsets.neg = reader.read_offset()?;
    }

    if reader.remaining() != 0 {
        return Err(DeserializeError::MalformedInput(location_type));
    }

    Ok(offsets)
}

fn write_offsets(writer: &mut OpenLrBinaryWriter, offsets: &Offsets) -> Result<(), SerializeError> {
    if !offsets.pos.is_zero() {
        writer.write_offset(offsets.pos)?;
    }
    if !offsets.neg.is_zero() {
        writer.write_offset(offsets.neg)?;
    }
    Ok(())
}

/// Line location: first LRP (absolute), intermediate and last LRPs (relative), offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl LineCodec {
    const MIN_LEN: usize = 16;
    const RELATIVE_POINT_LEN: usize = 7;
}

impl LocationCodec for LineCodec {
    type Location = Line;

    fn can_decode(data: &[u8]) -> bool {
        if !Header::LINE.matches(data) || data.len() < Self::MIN_LEN {
            return false;
        }

        let offsets_count = (data.len() - Self::MIN_LEN) % Self::RELATIVE_POINT_LEN;
        let last_attributes = data.len() - offsets_count - 1;
        offset_flags_count(data.get(last_attributes)) == Some(offsets_count)
    }

    fn decode(data: &[u8]) -> Result<Line, DeserializeError> {
        if !Self::can_decode(data) {
            return Err(DeserializeError::MalformedInput(LocationType::Line));
        }

        let intermediate_points_count = (data.len() - Self::MIN_LEN) / Self::RELATIVE_POINT_LEN;
        let mut points = Vec::with_capacity(intermediate_points_count + 2);
        let mut reader = OpenLrBinaryReader::new(data);

        let mut coordinate = reader.read_coordinate()?;
        points.push(reader.read_point(coordinate)?.0);

        for _ in 0..intermediate_points_count {
            coordinate = reader.read_relative_coordinate(coordinate)?;
            points.push(reader.read_point(coordinate)?.0);
        }

        coordinate = reader.read_relative_coordinate(coordinate)?;
        let (last_point, attributes) = reader.read_last_point(coordinate)?;
        points.push(last_point);

        let offsets = read_offsets(&mut reader, &attributes, LocationType::Line)?;
        Ok(Line { points, offsets })
    }

    fn encode(line: &Line, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let Line { points, offsets } = line;
        let [first_point, intermediate_points @ .., last_point] = points.as_slice() else {
            return Err(SerializeError::InvalidLine);
        };

        let mut writer = OpenLrBinaryWriter::new(Header::LINE)?;

        let mut coordinate = writer.write_coordinate(&first_point.coordinate)?;
        writer.write_point(first_point, EncodedAttributes::from(first_point.line))?;

        for point in intermediate_points {
            coordinate = writer.write_relative_coordinate(point.coordinate, coordinate)?;
            writer.write_point(point, EncodedAttributes::from(point.line))?;
        }

        writer.write_relative_coordinate(last_point.coordinate, coordinate)?;
        let attributes = EncodedAttributes::from(last_point.line).with_offsets(offsets);
        writer.write_attributes(attributes)?;
        write_offsets(&mut writer, offsets)?;

        buffer.extend(writer.into_inner());
        Ok(())
    }
}

/// Closed line location: LRPs without the last one, which is implied by the first one,
/// followed by the attributes of the line entering the first LRP.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosedLineCodec;

impl ClosedLineCodec {
    const MIN_LEN: usize = 12;
    const RELATIVE_POINT_LEN: usize = 7;
}

impl LocationCodec for ClosedLineCodec {
    type Location = ClosedLine;

    fn can_decode(data: &[u8]) -> bool {
        Header::CLOSED_LINE.matches(data)
            && data.len() >= Self::MIN_LEN
            && (data.len() - Self::MIN_LEN) % Self::RELATIVE_POINT_LEN == 0
    }

    fn decode(data: &[u8]) -> Result<ClosedLine, DeserializeError> {
        if !Self::can_decode(data) {
            return Err(DeserializeError::MalformedInput(LocationType::ClosedLine));
        }

        let relative_points_count = (data.len() - Self::MIN_LEN) / Self::RELATIVE_POINT_LEN;
        let mut points = Vec::with_capacity(relative_points_count + 1);
        let mut reader = OpenLrBinaryReader::new(data);

        let mut coordinate = reader.read_coordinate()?;
        points.push(reader.read_point(coordinate)?.0);

        for _ in 0..relative_points_count {
            coordinate = reader.read_relative_coordinate(coordinate)?;
            points.push(reader.read_point(coordinate)?.0);
        }

        let last_line = reader.read_attributes()?.line;
        Ok(ClosedLine { points, last_line })
    }

    fn encode(line: &ClosedLine, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let ClosedLine { points, last_line } = line;
        let [first_point, relative_points @ ..] = points.as_slice() else {
            return Err(SerializeError::InvalidLine);
        };

        let mut writer = OpenLrBinaryWriter::new(Header::CLOSED_LINE)?;

        let mut coordinate = writer.write_coordinate(&first_point.coordinate)?;
        writer.write_point(first_point, EncodedAttributes::from(first_point.line))?;

        for point in relative_points {
            coordinate = writer.write_relative_coordinate(point.coordinate, coordinate)?;
            writer.write_point(point, EncodedAttributes::from(point.line))?;
        }

        writer.write_attributes(EncodedAttributes::from(*last_line))?;

        buffer.extend(writer.into_inner());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeoCoordinateCodec;

impl LocationCodec for GeoCoordinateCodec {
    type Location = Coordinate;

    fn can_decode(data: &[u8]) -> bool {
        Header::GEO_COORDINATE.matches(data) && data.len() == 7
    }

    fn decode(data: &[u8]) -> Result<Coordinate, DeserializeError> {
        if !Self::can_decode(data) {
            return Err(DeserializeError::MalformedInput(LocationType::GeoCoordinate));
        }

        OpenLrBinaryReader::new(data).read_coordinate()
    }

    fn encode(coordinate: &Coordinate, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let mut writer = OpenLrBinaryWriter::new(Header::GEO_COORDINATE)?;
        writer.write_coordinate(coordinate)?;
        buffer.extend(writer.into_inner());
        Ok(())
    }
}

/// Point along line location: two LRPs and an optional positive offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointAlongLineCodec;

impl PointAlongLineCodec {
    const LEN: usize = 16;

    fn can_decode_with_trailer(data: &[u8], trailer: usize) -> bool {
        if !Header::POINT_ALONG_LINE.matches(data) {
            return false;
        }

        let Some(offsets_count) = data.len().checked_sub(Self::LEN + trailer) else {
            return false;
        };

        offsets_count <= 1 && offset_flags_count(data.get(Self::LEN - 1)) == Some(offsets_count)
    }

    fn read(
        reader: &mut OpenLrBinaryReader,
        location_type: LocationType,
    ) -> Result<PointAlongLine, DeserializeError> {
        let coordinate = reader.read_coordinate()?;
        let (first_point, attributes) = reader.read_point(coordinate)?;
        let orientation = attributes.orientation()?;

        let coordinate = reader.read_relative_coordinate(coordinate)?;
        let (last_point, attributes) = reader.read_last_point(coordinate)?;
        let side = attributes.side()?;

        if attributes.neg_offset_flag() {
            return Err(DeserializeError::MalformedInput(location_type));
        }

        let offset = if attributes.pos_offset_flag() {
            reader.read_offset()?
        } else {
            Offset::default()
        };

        Ok(PointAlongLine {
            points: [first_point, last_point],
            offset,
            orientation,
            side,
        })
    }

    /// Writes the point along line and returns the first coordinate as the reader will see it.
    fn write(
        writer: &mut OpenLrBinaryWriter,
        point: &PointAlongLine,
    ) -> Result<Coordinate, SerializeError> {
        let PointAlongLine {
            points: [first_point, last_point],
            offset,
            orientation,
            side,
        } = point;

        let coordinate = writer.write_coordinate(&first_point.coordinate)?;
        let attributes = EncodedAttributes::from(first_point.line).with_orientation(*orientation);
        writer.write_point(first_point, attributes)?;

        writer.write_relative_coordinate(last_point.coordinate, coordinate)?;
        let offsets = Offsets::positive(*offset);
        let attributes = EncodedAttributes::from(last_point.line)
            .with_offsets(&offsets)
            .with_side(*side);
        writer.write_attributes(attributes)?;
        write_offsets(writer, &offsets)?;

        Ok(coordinate)
    }
}

impl LocationCodec for PointAlongLineCodec {
    type Location = PointAlongLine;

    fn can_decode(data: &[u8]) -> bool {
        Self::can_decode_with_trailer(data, 0)
    }

    fn decode(data: &[u8]) -> Result<PointAlongLine, DeserializeError> {
        if !Self::can_decode(data) {
            return Err(DeserializeError::MalformedInput(LocationType::PointAlongLine));
        }

        let mut reader = OpenLrBinaryReader::new(data);
        Self::read(&mut reader, LocationType::PointAlongLine)
    }

    fn encode(point: &PointAlongLine, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let mut writer = OpenLrBinaryWriter::new(Header::POINT_ALONG_LINE)?;
        PointAlongLineCodec::write(&mut writer, point)?;
        buffer.extend(writer.into_inner());
        Ok(())
    }
}

/// Point along line with access point: a point along line followed by the coordinate
/// of the point of interest, relative to the first LRP.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoiCodec;

impl LocationCodec for PoiCodec {
    type Location = Poi;

    fn can_decode(data: &[u8]) -> bool {
        PointAlongLineCodec::can_decode_with_trailer(data, 4)
    }

    fn decode(data: &[u8]) -> Result<Poi, DeserializeError> {
        if !Self::can_decode(data) {
            return Err(DeserializeError::MalformedInput(
                LocationType::PoiWithAccessPoint,
            ));
        }

        let mut reader = OpenLrBinaryReader::new(data);
        let point = PointAlongLineCodec::read(&mut reader, LocationType::PoiWithAccessPoint)?;
        let coordinate = reader.read_relative_coordinate(point.points[0].coordinate)?;
        Ok(Poi { point, coordinate })
    }

    fn encode(poi: &Poi, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let Poi { point, coordinate } = poi;
        let mut writer = OpenLrBinaryWriter::new(Header::POINT_ALONG_LINE)?;
        let first_coordinate = PointAlongLineCodec::write(&mut writer, point)?;
        writer.write_relative_coordinate(*coordinate, first_coordinate)?;
        buffer.extend(writer.into_inner());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CircleCodec;

impl LocationCodec for CircleCodec {
    type Location = Circle;

    fn can_decode(data: &[u8]) -> bool {
        Header::CIRCLE.matches(data) && (8..=11).contains(&data.len())
    }

    fn decode(data: &[u8]) -> Result<Circle, DeserializeError> {
        if !Self::can_decode(data) {
            return Err(DeserializeError::MalformedInput(LocationType::Circle));
        }

        let mut reader = OpenLrBinaryReader::new(data);
        let center = reader.read_coordinate()?;
        let radius = reader.read_radius()?;
        Ok(Circle { center, radius })
    }

    fn encode(circle: &Circle, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let Circle { center, radius } = circle;
        let mut writer = OpenLrBinaryWriter::new(Header::CIRCLE)?;
        writer.write_coordinate(center)?;
        writer.write_radius(radius)?;
        buffer.extend(writer.into_inner());
        Ok(())
    }
}

/// Rectangle location: lower left corner (absolute) and upper right corner,
/// relative when it fits into 16 bits and absolute otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectangleCodec;

impl RectangleCodec {
    const RELATIVE_LEN: usize = 11;
    const ABSOLUTE_LEN: usize = 13;

    fn read(
        reader: &mut OpenLrBinaryReader,
        absolute: bool,
    ) -> Result<Rectangle, DeserializeError> {
        let lower_left = reader.read_coordinate()?;

        let upper_right = if absolute {
            reader.read_coordinate()?
        } else {
            reader.read_relative_coordinate(lower_left)?
        };

        Ok(Rectangle {
            lower_left,
            upper_right,
        })
    }

    fn write(writer: &mut OpenLrBinaryWriter, rectangle: &Rectangle) -> Result<(), SerializeError> {
        let Rectangle {
            lower_left,
            upper_right,
        } = rectangle;

        if lower_left == upper_right {
            return Err(SerializeError::InvalidRectangle);
        }

        let lower_left = writer.write_coordinate(lower_left)?;

        if upper_right.fits_relative_to(&lower_left) {
            writer.write_relative_coordinate(*upper_right, lower_left)?;
        } else {
            writer.write_coordinate(upper_right)?;
        }

        Ok(())
    }
}

impl LocationCodec for RectangleCodec {
    type Location = Rectangle;

    fn can_decode(data: &[u8]) -> bool {
        Header::RECTANGLE.matches(data)
            && (data.len() == Self::RELATIVE_LEN || data.len() == Self::ABSOLUTE_LEN)
    }

    fn decode(data: &[u8]) -> Result<Rectangle, DeserializeError> {
        if !Self::can_decode(data) {
            return Err(DeserializeError::MalformedInput(LocationType::Rectangle));
        }

        let mut reader = OpenLrBinaryReader::new(data);
        Self::read(&mut reader, data.len() == Self::ABSOLUTE_LEN)
    }

    fn encode(rectangle: &Rectangle, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let mut writer = OpenLrBinaryWriter::new(Header::RECTANGLE)?;
        Self::write(&mut writer, rectangle)?;
        buffer.extend(writer.into_inner());
        Ok(())
    }
}

/// Grid location: lower left corner (absolute), upper right corner (always relative) and the
/// number of columns and rows. A 17 byte payload carries a 2 byte area check trailer that is
/// skipped on decode and never written.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridCodec;

impl GridCodec {
    const LEN: usize = 15;
    const LEN_WITH_TRAILER: usize = 17;

    fn is_north_east(rect: &Rectangle) -> bool {
        rect.upper_right.lon > rect.lower_left.lon && rect.upper_right.lat > rect.lower_left.lat
    }
}

impl LocationCodec for GridCodec {
    type Location = Grid;

    fn can_decode(data: &[u8]) -> bool {
        Header::RECTANGLE.matches(data)
            && (data.len() == Self::LEN || data.len() == Self::LEN_WITH_TRAILER)
    }

    fn decode(data: &[u8]) -> Result<Grid, DeserializeError> {
        if !Self::can_decode(data) {
            return Err(DeserializeError::MalformedInput(LocationType::Grid));
        }

        let mut reader = OpenLrBinaryReader::new(&data[..Self::LEN]);
        let rect = RectangleCodec::read(&mut reader, false)?;
        let size = reader.read_grid_size()?;

        if size.columns < 2 || size.rows < 2 || !Self::is_north_east(&rect) {
            return Err(DeserializeError::MalformedInput(LocationType::Grid));
        }

        Ok(Grid { rect, size })
    }

    fn encode(grid: &Grid, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let Grid { rect, size } = grid;

        if !Self::is_north_east(rect) {
            return Err(SerializeError::InvalidRectangle);
        }

        let mut writer = OpenLrBinaryWriter::new(Header::RECTANGLE)?;
        let lower_left = writer.write_coordinate(&rect.lower_left)?;
        writer.write_relative_coordinate(rect.upper_right, lower_left)?;
        writer.write_grid_size(size)?;
        buffer.extend(writer.into_inner());
        Ok(())
    }
}

/// Polygon location: first corner (absolute) followed by the other corners (relative).
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonCodec;

impl PolygonCodec {
    const MIN_LEN: usize = 15;
}

impl LocationCodec for PolygonCodec {
    type Location = Polygon;

    fn can_decode(data: &[u8]) -> bool {
        Header::POLYGON.matches(data) && data.len() >= Self::MIN_LEN && (data.len() - 7) % 4 == 0
    }

    fn decode(data: &[u8]) -> Result<Polygon, DeserializeError> {
        if !Self::can_decode(data) {
            return Err(DeserializeError::MalformedInput(LocationType::Polygon));
        }

        let relative_corners_count = (data.len() - 7) / 4;
        let mut corners = Vec::with_capacity(1 + relative_corners_count);
        let mut reader = OpenLrBinaryReader::new(data);

        let mut coordinate = reader.read_coordinate()?;
        corners.push(coordinate);

        for _ in 0..relative_corners_count {
            coordinate = reader.read_relative_coordinate(coordinate)?;
            corners.push(coordinate);
        }

        Ok(Polygon { corners })
    }

    fn encode(polygon: &Polygon, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let Polygon { corners } = polygon;
        let [first_corner, relative_corners @ ..] = corners.as_slice() else {
            return Err(SerializeError::InvalidPolygon);
        };

        if corners.len() < 3 {
            return Err(SerializeError::InvalidPolygon);
        }

        let mut writer = OpenLrBinaryWriter::new(Header::POLYGON)?;
        let mut coordinate = writer.write_coordinate(first_corner)?;

        for corner in relative_corners {
            coordinate = writer.write_relative_coordinate(*corner, coordinate)?;
        }

        buffer.extend(writer.into_inner());
        Ok(())
    }
}
