use std::io::{Cursor, Write};

use crate::binary::bits::fields;
use crate::binary::encoding::EncodedAttributes;
use crate::binary::header::Header;
use crate::{Coordinate, GridSize, Length, Offset, Point, SerializeError};

#[derive(Debug)]
pub(crate) struct OpenLrBinaryWriter {
    cursor: Cursor<Vec<u8>>,
}

impl OpenLrBinaryWriter {
    pub(crate) fn new(header: Header) -> Result<Self, SerializeError> {
        let mut cursor = Cursor::new(Vec::with_capacity(32));
        cursor.write_all(&[header.into_byte()?])?;
        Ok(Self { cursor })
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }

    /// Writes an absolute coordinate and returns it as the reader will see it.
    pub(crate) fn write_coordinate(
        &mut self,
        coordinate: &Coordinate,
    ) -> Result<Coordinate, SerializeError> {
        if !coordinate.is_valid() {
            return Err(SerializeError::InvalidCoordinate(*coordinate));
        }

        let mut write_degrees = |degrees| -> Result<f64, SerializeError> {
            let bytes = Coordinate::degrees_into_be_bytes(degrees);
            self.cursor.write_all(&bytes)?;
            Ok(Coordinate::degrees_from_be_bytes(bytes))
        };

        let lon = write_degrees(coordinate.lon)?;
        let lat = write_degrees(coordinate.lat)?;
        Ok(Coordinate { lon, lat })
    }

    /// Writes a coordinate relative to the previous one (as seen by the reader)
    /// and returns it as the reader will see it.
    pub(crate) fn write_relative_coordinate(
        &mut self,
        coordinate: Coordinate,
        previous: Coordinate,
    ) -> Result<Coordinate, SerializeError> {
        if !coordinate.is_valid() {
            return Err(SerializeError::InvalidCoordinate(coordinate));
        }

        let mut write_degrees = |degrees, previous| -> Result<f64, SerializeError> {
            let bytes = Coordinate::degrees_into_be_bytes_relative(degrees, previous)
                .ok_or(SerializeError::InvalidCoordinate(coordinate))?;
            self.cursor.write_all(&bytes)?;
            Ok(Coordinate::degrees_from_be_bytes_relative(bytes, previous))
        };

        let lon = write_degrees(coordinate.lon, previous.lon)?;
        let lat = write_degrees(coordinate.lat, previous.lat)?;
        Ok(Coordinate { lon, lat })
    }

    pub(crate) fn write_attributes(
        &mut self,
        attributes: EncodedAttributes,
    ) -> Result<(), SerializeError> {
        let mut bytes = [0u8; 2];
        fields::ORIENTATION_OR_SIDE.encode(&mut bytes[0], attributes.orientation_or_side)?;
        fields::FRC.encode(&mut bytes[0], attributes.line.frc.value())?;
        fields::FOW.encode(&mut bytes[0], attributes.line.fow.value())?;
        fields::LFRCNP_OR_FLAGS.encode(&mut bytes[1], attributes.lfrcnp_or_flags)?;
        fields::BEARING.encode(&mut bytes[1], attributes.line.bearing.try_into_byte()?)?;

        self.cursor.write_all(&bytes)?;
        Ok(())
    }

    /// Writes the attributes and the distance to next point of a non last LRP.
    pub(crate) fn write_point(
        &mut self,
        point: &Point,
        attributes: EncodedAttributes,
    ) -> Result<(), SerializeError> {
        let path = point.path.unwrap_or_default();
        self.write_attributes(attributes.with_lfrcnp(path.lfrcnp))?;
        self.write_dnp(&path.dnp)
    }

    pub(crate) fn write_dnp(&mut self, dnp: &Length) -> Result<(), SerializeError> {
        let dnp = dnp.dnp_into_byte();
        self.cursor.write_all(&[dnp])?;
        Ok(())
    }

    pub(crate) fn write_radius(&mut self, radius: &Length) -> Result<(), SerializeError> {
        let radius = radius.radius_into_be_bytes();
        self.cursor.write_all(&radius)?;
        Ok(())
    }

    pub(crate) fn write_offset(&mut self, offset: Offset) -> Result<(), SerializeError> {
        let offset = offset.try_into_byte()?;
        self.cursor.write_all(&[offset])?;
        Ok(())
    }

    pub(crate) fn write_grid_size(&mut self, size: &GridSize) -> Result<(), SerializeError> {
        let size = size.try_into_be_bytes()?;
        self.cursor.write_all(&size)?;
        Ok(())
    }
}
