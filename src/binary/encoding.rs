use crate::binary::bits::fields;
use crate::{
    Bearing, Coordinate, DeserializeError, Frc, GridSize, Length, LineAttributes, Offset, Offsets,
    Orientation, SerializeError, SideOfRoad,
};

/// The two attribute bytes of an LRP, before their context dependent fields are interpreted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EncodedAttributes {
    pub(crate) line: LineAttributes,
    pub(crate) lfrcnp_or_flags: u8,
    pub(crate) orientation_or_side: u8,
}

impl From<LineAttributes> for EncodedAttributes {
    fn from(line: LineAttributes) -> Self {
        Self {
            line,
            lfrcnp_or_flags: 0,
            orientation_or_side: 0,
        }
    }
}

impl EncodedAttributes {
    pub(crate) const fn with_lfrcnp(mut self, lfrcnp: Frc) -> Self {
        self.lfrcnp_or_flags = lfrcnp.value();
        self
    }

    pub(crate) fn with_offsets(mut self, offsets: &Offsets) -> Self {
        self.lfrcnp_or_flags = offsets.flags();
        self
    }

    pub(crate) const fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation_or_side = orientation as u8;
        self
    }

    pub(crate) const fn with_side(mut self, side: SideOfRoad) -> Self {
        self.orientation_or_side = side as u8;
        self
    }

    pub(crate) fn lfrcnp(&self) -> Result<Frc, DeserializeError> {
        Frc::from_repr(self.lfrcnp_or_flags)
            .ok_or(DeserializeError::OutOfRange(fields::LFRCNP_OR_FLAGS))
    }

    pub(crate) fn pos_offset_flag(&self) -> bool {
        self.lfrcnp_or_flags & 0b010 != 0
    }

    pub(crate) fn neg_offset_flag(&self) -> bool {
        self.lfrcnp_or_flags & 0b001 != 0
    }

    pub(crate) fn orientation(&self) -> Result<Orientation, DeserializeError> {
        Orientation::from_repr(self.orientation_or_side)
            .ok_or(DeserializeError::OutOfRange(fields::ORIENTATION_OR_SIDE))
    }

    pub(crate) fn side(&self) -> Result<SideOfRoad, DeserializeError> {
        SideOfRoad::from_repr(self.orientation_or_side)
            .ok_or(DeserializeError::OutOfRange(fields::ORIENTATION_OR_SIDE))
    }
}

impl Coordinate {
    const RESOLUTION: usize = 24;
    const DECA_MICRO_DEG_FACTOR: f64 = 100000.0;

    /// Returns degrees from a big-endian degrees representation in a 24-bit resolution.
    pub(crate) fn degrees_from_be_bytes(bytes: [u8; 3]) -> f64 {
        let is_negative = bytes[0] & 0x80 != 0;
        let sign = if is_negative { 0xFF } else { 0 };
        let degrees = i32::from_be_bytes([sign, bytes[0], bytes[1], bytes[2]]) as f64;
        ((degrees - signum(degrees) * 0.5) * 360.0) / (1 << Self::RESOLUTION) as f64
    }

    /// Returns the big-endian representation of the given degrees in a 24-bit resolution.
    pub(crate) fn degrees_into_be_bytes(degrees: f64) -> [u8; 3] {
        const MAX: i32 = (1 << (Coordinate::RESOLUTION - 1)) - 1;
        const MIN: i32 = -(1 << (Coordinate::RESOLUTION - 1));

        let degrees = signum(degrees) * 0.5 + degrees * (1 << Self::RESOLUTION) as f64 / 360.0;
        // +-180 would overflow the 24 bits and come back with the opposite sign
        let degrees = (degrees.round() as i32).clamp(MIN, MAX).to_be_bytes();
        [degrees[1], degrees[2], degrees[3]]
    }

    /// Returns degrees from a big-endian relative degrees representation in a 16-bit resolution.
    pub(crate) fn degrees_from_be_bytes_relative(bytes: [u8; 2], previous_degrees: f64) -> f64 {
        let degrees = i16::from_be_bytes(bytes) as f64;
        previous_degrees + degrees / Self::DECA_MICRO_DEG_FACTOR
    }

    /// Returns the big-endian relative degrees representation in a 16-bit resolution.
    /// Returns None if the difference cannot be represented in 16 bits.
    pub(crate) fn degrees_into_be_bytes_relative(
        degrees: f64,
        previous_degrees: f64,
    ) -> Option<[u8; 2]> {
        let delta = (Self::DECA_MICRO_DEG_FACTOR * (degrees - previous_degrees)).round();
        if delta < i16::MIN as f64 || delta > i16::MAX as f64 {
            return None;
        }
        Some(i16::to_be_bytes(delta as i16))
    }

    /// Returns true if the coordinate can be written relative to the previous one.
    pub(crate) fn fits_relative_to(&self, previous: &Self) -> bool {
        Self::degrees_into_be_bytes_relative(self.lon, previous.lon).is_some()
            && Self::degrees_into_be_bytes_relative(self.lat, previous.lat).is_some()
    }

    /// Decodes a coordinate stored relative to the reference coordinate at the given offset.
    pub fn decode_relative(
        reference: Coordinate,
        data: &[u8],
        offset: usize,
    ) -> Result<Coordinate, DeserializeError> {
        let bytes = offset
            .checked_add(4)
            .and_then(|end| data.get(offset..end))
            .ok_or(DeserializeError::MalformedInput(
                crate::LocationType::GeoCoordinate,
            ))?;

        let lon = Self::degrees_from_be_bytes_relative([bytes[0], bytes[1]], reference.lon);
        let lat = Self::degrees_from_be_bytes_relative([bytes[2], bytes[3]], reference.lat);
        Coordinate::new(lon, lat)
    }
}

impl Length {
    /// This representation defines 256 intervals and each interval has a length of approximately
    /// 58.6 meters.
    /// Maximum length between two consecutive LR-points is limited by 15000m.
    const DISTANCE_PER_INTERVAL: f64 = 58.6;
    /// Bucket reserved for distances that are unknown or that exceed the representable range.
    const UNKNOWN_DNP: u8 = u8::MAX;

    /// Returns the distance to next LR-point in meters from a byte.
    pub(crate) fn dnp_from_byte(byte: u8) -> Self {
        if byte == Self::UNKNOWN_DNP {
            return Self::MAX_BINARY_LRP_DISTANCE;
        }
        let meters = ((byte as f64 + 0.5) * Self::DISTANCE_PER_INTERVAL).round();
        Self::from_meters(meters)
    }

    /// Returns the distance to next LR-point interval.
    pub(crate) fn dnp_into_byte(self) -> u8 {
        let interval = (self.meters() / Self::DISTANCE_PER_INTERVAL - 0.5).round();
        interval.clamp(0.0, Self::UNKNOWN_DNP as f64) as u8
    }

    /// Returns true if the distance is the one decoded from the unknown bucket (or larger).
    pub fn is_unknown_dnp(&self) -> bool {
        *self >= Self::MAX_BINARY_LRP_DISTANCE
    }

    /// Half of the distance covered by a single bucket.
    pub(crate) fn dnp_tolerance() -> Self {
        Self::from_meters(Self::DISTANCE_PER_INTERVAL / 2.0)
    }

    /// Returns the length of a radius in meters from big-endian slice of (up to 4) bytes.
    pub(crate) fn radius_from_be_bytes(bytes: &[u8]) -> Self {
        let mut radius = [0u8; 4];
        let bytes = &bytes[bytes.len().saturating_sub(4)..];
        radius[4 - bytes.len()..].copy_from_slice(bytes);
        Self::from_meters(u32::from_be_bytes(radius) as f64)
    }

    /// Returns the big-endian representation of a radius without its leading zero bytes.
    pub(crate) fn radius_into_be_bytes(self) -> Vec<u8> {
        let radius = self.meters().round().clamp(0.0, u32::MAX as f64) as u32;
        let bytes = u32::to_be_bytes(radius);
        let leading_zeros = bytes.iter().take(3).take_while(|&&b| b == 0).count();
        bytes[leading_zeros..].to_vec()
    }
}

impl Bearing {
    /// The bearing describes the angle between the true North and the road.
    /// The data format defines 32 sectors whereby each sector covers 11.25° of the circle.
    const BEAR_SECTOR: f64 = 11.25;

    pub(crate) fn from_byte(byte: u8) -> Self {
        let degrees = (byte as f64 * Self::BEAR_SECTOR + Self::BEAR_SECTOR / 2.0).round() as u16;
        Self::from_degrees(degrees)
    }

    pub(crate) fn try_into_byte(self) -> Result<u8, SerializeError> {
        let degrees = self.degrees();
        if !(0..360).contains(&degrees) {
            return Err(SerializeError::InvalidBearing(degrees));
        }

        let bear = (degrees as f64 - Self::BEAR_SECTOR / 2.0) / Self::BEAR_SECTOR;
        Ok(bear.round().max(0.0) as u8)
    }

    /// Sector (0-31) of the physical format this bearing falls into.
    pub fn sector(&self) -> u8 {
        self.try_into_byte().unwrap_or_default()
    }
}

impl Offset {
    /// The value used here is the relation of the offset length to the length of the path
    /// between the first two location reference points (last two location reference points
    /// for the negative offset). The length between these two LR-points shall be called LRP length.
    /// The relative value (or percentage) will then be equally distributed over the available
    /// 256 buckets so that every bucket covers 0.390625% of the LRP length.
    /// Returns the offset in [0, 1] range.
    pub(crate) fn from_byte(bucket: u8) -> Self {
        Self::from_range((bucket as f64 + 0.5) / 256.0)
    }

    /// Returns the bucket index corresponding to the given offset.
    pub(crate) fn try_into_byte(self) -> Result<u8, SerializeError> {
        let range = self.range();
        if !(0.0..1.0).contains(&range) {
            return Err(SerializeError::InvalidOffset(range));
        }

        let bucket = if range == 0.0 {
            0
        } else {
            (range * 256.0 - 0.5).round().max(0.0) as u8
        };

        Ok(bucket)
    }
}

impl Offsets {
    pub(crate) fn flags(&self) -> u8 {
        let pos = (!self.pos.is_zero() as u8) << 1;
        let neg = !self.neg.is_zero() as u8;
        pos | neg
    }
}

impl GridSize {
    pub(crate) fn from_be_bytes(bytes: [u8; 4]) -> Self {
        let [c1, c2, r1, r2] = bytes;
        let columns = u16::from_be_bytes([c1, c2]);
        let rows = u16::from_be_bytes([r1, r2]);
        Self { columns, rows }
    }

    pub(crate) fn try_into_be_bytes(self) -> Result<[u8; 4], SerializeError> {
        if self.columns < 2 || self.rows < 2 {
            return Err(SerializeError::InvalidGridSize);
        }

        let columns = u16::to_be_bytes(self.columns);
        let rows = u16::to_be_bytes(self.rows);
        Ok([columns[0], columns[1], rows[0], rows[1]])
    }
}

const fn signum(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value.signum() }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use test_log::test;

    use super::*;

    #[test]
    fn openlr_encode_decode_degrees() {
        let assert_degrees_relative_eq = |degrees| {
            let encoded = Coordinate::degrees_into_be_bytes(degrees);
            let decoded = Coordinate::degrees_from_be_bytes(encoded);
            assert!((degrees - decoded).abs() < Coordinate::EPSILON, "{degrees}");
        };

        for (lon, lat) in [
            (5.10007, 52.103207),
            (41.030143, 28.977417),
            (50.749673, 7.099048),
            (21.173398, -86.828_1),
            (43.259594, 76.940_86),
            (-27.22775, 153.11216),
            (48.068831, 12.858026),
            (-33.22979, -60.32423),
            (-179.9, 90.0),
            (179.9, -90.0),
        ] {
            assert_degrees_relative_eq(lon);
            assert_degrees_relative_eq(lat);
        }

        // the antimeridian saturates at the extreme 24-bit values instead of wrapping around
        for degrees in [180.0, 179.99999, -180.0, -179.99999] {
            let encoded = Coordinate::degrees_into_be_bytes(degrees);
            let decoded = Coordinate::degrees_from_be_bytes(encoded);
            assert_eq!(decoded.signum(), degrees.signum(), "{degrees}");
            assert_abs_diff_eq!(decoded, degrees, epsilon = 2.0 * Coordinate::EPSILON);
        }
        assert_eq!(Coordinate::degrees_into_be_bytes(180.0), [0x7F, 0xFF, 0xFF]);
        assert_eq!(Coordinate::degrees_into_be_bytes(-180.0), [0x80, 0x00, 0x00]);
    }

    #[test]
    fn openlr_encode_decode_relative_degrees() {
        let assert_degrees_relative_eq = |degrees, previous| {
            let encoded = Coordinate::degrees_into_be_bytes_relative(degrees, previous).unwrap();
            let decoded = Coordinate::degrees_from_be_bytes_relative(encoded, previous);
            assert_relative_eq!(degrees, decoded, epsilon = 0.5e-5);
            decoded
        };

        let mut coordinate = Coordinate {
            lon: 6.5954983,
            lat: 48.0714404,
        };

        for (lon, lat) in [
            (6.4856483, 48.1540304),
            (6.4849583, 48.1689504),
            (6.3911883, 48.2611404),
            (6.3875183, 48.2661004),
            (6.2329683, 48.4129304),
            (6.1870783, 48.5563704),
        ] {
            coordinate.lon = assert_degrees_relative_eq(lon, coordinate.lon);
            coordinate.lat = assert_degrees_relative_eq(lat, coordinate.lat);
        }
    }

    #[test]
    fn openlr_relative_degrees_out_of_range() {
        assert!(Coordinate::degrees_into_be_bytes_relative(0.32767, 0.0).is_some());
        assert!(Coordinate::degrees_into_be_bytes_relative(0.32768, 0.0).is_none());
        assert!(Coordinate::degrees_into_be_bytes_relative(-0.32768, 0.0).is_some());
        assert!(Coordinate::degrees_into_be_bytes_relative(-0.32769, 0.0).is_none());
    }

    #[test]
    fn openlr_decode_relative_coordinate() {
        let reference = Coordinate { lon: 4.0, lat: 50.0 };
        let data = [0xFF, 0x03, 0xE8, 0x07, 0xD0];

        let coordinate = Coordinate::decode_relative(reference, &data, 1).unwrap();
        assert_relative_eq!(coordinate.lon, 4.01, epsilon = 1e-9);
        assert_relative_eq!(coordinate.lat, 50.02, epsilon = 1e-9);

        assert!(Coordinate::decode_relative(reference, &data, 2).is_err());
        assert!(Coordinate::decode_relative(reference, &data, usize::MAX).is_err());
    }

    #[test]
    fn openlr_dnp_buckets() {
        assert_eq!(Length::dnp_from_byte(0), Length::from_meters(29.0));
        assert_eq!(Length::dnp_from_byte(9), Length::from_meters(557.0));
        assert_eq!(Length::dnp_from_byte(254), Length::from_meters(14913.0));
        assert_eq!(Length::dnp_from_byte(255), Length::MAX_BINARY_LRP_DISTANCE);
        assert!(Length::dnp_from_byte(255).is_unknown_dnp());

        for byte in 0..=u8::MAX {
            assert_eq!(Length::dnp_from_byte(byte).dnp_into_byte(), byte);
        }

        assert_eq!(Length::ZERO.dnp_into_byte(), 0);
        assert_eq!(Length::from_meters(100_000.0).dnp_into_byte(), 255);
    }

    #[test]
    fn openlr_bearing_sectors() {
        for sector in 0..32 {
            let bearing = Bearing::from_byte(sector);
            assert_eq!(bearing.try_into_byte().unwrap(), sector);
            assert_eq!(bearing.sector(), sector);
        }

        assert_eq!(Bearing::from_degrees(0).try_into_byte().unwrap(), 0);
        assert_eq!(Bearing::from_degrees(359).try_into_byte().unwrap(), 31);
        assert_eq!(
            Bearing::from_degrees(360).try_into_byte(),
            Err(SerializeError::InvalidBearing(360))
        );
    }

    #[test]
    fn openlr_offset_buckets() {
        for bucket in 0..=u8::MAX {
            assert_eq!(Offset::from_byte(bucket).try_into_byte().unwrap(), bucket);
        }

        assert_eq!(Offset::from_range(0.0).try_into_byte().unwrap(), 0);
        assert_eq!(
            Offset::from_range(1.0).try_into_byte(),
            Err(SerializeError::InvalidOffset(1.0))
        );
        assert_eq!(
            Offset::from_range(-0.1).try_into_byte(),
            Err(SerializeError::InvalidOffset(-0.1))
        );
    }

    #[test]
    fn openlr_radius_bytes() {
        assert_eq!(Length::from_meters(0.0).radius_into_be_bytes(), [0]);
        assert_eq!(Length::from_meters(300.0).radius_into_be_bytes(), [1, 44]);
        assert_eq!(
            Length::from_meters(16_777_216.0).radius_into_be_bytes(),
            [1, 0, 0, 0]
        );
        assert_eq!(Length::radius_from_be_bytes(&[1, 44]), Length::from_meters(300.0));
        assert_eq!(
            Length::radius_from_be_bytes(&[1, 0, 0, 0]),
            Length::from_meters(16_777_216.0)
        );
    }
}
