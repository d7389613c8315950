use std::io::{Cursor, Read};

use crate::binary::bits::fields;
use crate::binary::encoding::EncodedAttributes;
use crate::{
    Bearing, Coordinate, DeserializeError, Fow, Frc, GridSize, Length, LineAttributes, Offset,
    PathAttributes, Point,
};

#[derive(Debug)]
pub(crate) struct OpenLrBinaryReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> OpenLrBinaryReader<'a> {
    /// Creates a reader positioned right after the header byte.
    pub(crate) fn new(data: &'a [u8]) -> Self {
        let mut cursor = Cursor::new(data);
        cursor.set_position(1);
        Self { cursor }
    }

    pub(crate) const fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub(crate) fn remaining(&self) -> usize {
        let position = usize::try_from(self.cursor.position()).unwrap_or(usize::MAX);
        self.len().saturating_sub(position)
    }

    /// Reads a location reference point with its path attributes.
    pub(crate) fn read_point(
        &mut self,
        coordinate: Coordinate,
    ) -> Result<(Point, EncodedAttributes), DeserializeError> {
        let attributes = self.read_attributes()?;
        let dnp = self.read_dnp()?;

        let point = Point {
            coordinate,
            line: attributes.line,
            path: Some(PathAttributes {
                lfrcnp: attributes.lfrcnp()?,
                dnp,
            }),
        };

        Ok((point, attributes))
    }

    /// Reads the last location reference point, whose second attribute byte carries flags.
    pub(crate) fn read_last_point(
        &mut self,
        coordinate: Coordinate,
    ) -> Result<(Point, EncodedAttributes), DeserializeError> {
        let attributes = self.read_attributes()?;

        let point = Point {
            coordinate,
            line: attributes.line,
            path: None,
        };

        Ok((point, attributes))
    }

    pub(crate) fn read_coordinate(&mut self) -> Result<Coordinate, DeserializeError> {
        let mut read_degrees = || -> Result<f64, DeserializeError> {
            let mut c = [0u8; 3];
            self.cursor.read_exact(&mut c)?;
            Ok(Coordinate::degrees_from_be_bytes(c))
        };

        let lon = read_degrees()?;
        let lat = read_degrees()?;
        Coordinate::new(lon, lat)
    }

    pub(crate) fn read_relative_coordinate(
        &mut self,
        previous: Coordinate,
    ) -> Result<Coordinate, DeserializeError> {
        let mut read_degrees = |previous| -> Result<f64, DeserializeError> {
            let mut c = [0u8; 2];
            self.cursor.read_exact(&mut c)?;
            Ok(Coordinate::degrees_from_be_bytes_relative(c, previous))
        };

        let lon = read_degrees(previous.lon)?;
        let lat = read_degrees(previous.lat)?;
        Coordinate::new(lon, lat)
    }

    pub(crate) fn read_attributes(&mut self) -> Result<EncodedAttributes, DeserializeError> {
        let mut attributes = [0u8; 2];
        self.cursor.read_exact(&mut attributes)?;

        let frc = fields::FRC.decode(attributes[0])?;
        let fow = fields::FOW.decode(attributes[0])?;
        let orientation_or_side = fields::ORIENTATION_OR_SIDE.decode(attributes[0])?;
        let lfrcnp_or_flags = fields::LFRCNP_OR_FLAGS.decode(attributes[1])?;
        let bearing = fields::BEARING.decode(attributes[1])?;

        let line = LineAttributes {
            frc: Frc::from_repr(frc).ok_or(DeserializeError::OutOfRange(fields::FRC))?,
            fow: Fow::from_repr(fow).ok_or(DeserializeError::OutOfRange(fields::FOW))?,
            bearing: Bearing::from_byte(bearing),
        };

        Ok(EncodedAttributes {
            line,
            lfrcnp_or_flags,
            orientation_or_side,
        })
    }

    pub(crate) fn read_dnp(&mut self) -> Result<Length, DeserializeError> {
        let mut dnp = [0u8; 1];
        self.cursor.read_exact(&mut dnp)?;
        Ok(Length::dnp_from_byte(dnp[0]))
    }

    pub(crate) fn read_offset(&mut self) -> Result<Offset, DeserializeError> {
        let mut offset = [0u8; 1];
        self.cursor.read_exact(&mut offset)?;
        Ok(Offset::from_byte(offset[0]))
    }

    pub(crate) fn read_radius(&mut self) -> Result<Length, DeserializeError> {
        let mut radius = [0u8; 4];
        let length = self.cursor.read(&mut radius)?;
        Ok(Length::radius_from_be_bytes(&radius[..length]))
    }

    pub(crate) fn read_grid_size(&mut self) -> Result<GridSize, DeserializeError> {
        let mut size = [0u8; 4];
        self.cursor.read_exact(&mut size)?;
        Ok(GridSize::from_be_bytes(size))
    }
}
