use crate::binary::bits::fields;
use crate::{DeserializeError, LocationType, SerializeError};

/// Flags of the header byte that tell the location kinds apart.
/// Some kinds share the same flags and are told apart by the payload length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    area_flag_1: bool,
    point_flag: bool,
    area_flag_0: bool,
    attribute_flag: bool,
}

impl Header {
    pub(crate) const VERSION: u8 = 3;

    pub(crate) const CIRCLE: Self = Self::new(false, false, false, false);
    pub(crate) const LINE: Self = Self::new(false, false, false, true);
    pub(crate) const POLYGON: Self = Self::new(false, false, true, false);
    pub(crate) const GEO_COORDINATE: Self = Self::new(false, true, false, false);
    pub(crate) const POINT_ALONG_LINE: Self = Self::new(false, true, false, true);
    pub(crate) const RECTANGLE: Self = Self::new(true, false, false, false);
    pub(crate) const CLOSED_LINE: Self = Self::new(true, false, true, true);

    const fn new(
        area_flag_1: bool,
        point_flag: bool,
        area_flag_0: bool,
        attribute_flag: bool,
    ) -> Self {
        Self {
            area_flag_1,
            point_flag,
            area_flag_0,
            attribute_flag,
        }
    }

    pub(crate) const fn of(location_type: LocationType) -> Self {
        match location_type {
            LocationType::Circle => Self::CIRCLE,
            LocationType::Line => Self::LINE,
            LocationType::Polygon => Self::POLYGON,
            LocationType::GeoCoordinate => Self::GEO_COORDINATE,
            LocationType::PointAlongLine | LocationType::PoiWithAccessPoint => {
                Self::POINT_ALONG_LINE
            }
            LocationType::Rectangle | LocationType::Grid => Self::RECTANGLE,
            LocationType::ClosedLine => Self::CLOSED_LINE,
        }
    }

    /// Parses the header byte, rejecting unsupported versions and reserved bits.
    pub(crate) fn from_byte(byte: u8) -> Result<Self, DeserializeError> {
        let version = fields::HEADER_VERSION.decode(byte)?;
        if version != Self::VERSION {
            return Err(DeserializeError::VersionNotSupported(version));
        }

        if fields::HEADER_RFU.decode(byte)? != 0 {
            return Err(DeserializeError::InvalidHeader(byte));
        }

        Ok(Self {
            area_flag_1: fields::HEADER_ARF1.decode(byte)? == 1,
            point_flag: fields::HEADER_POINT_FLAG.decode(byte)? == 1,
            area_flag_0: fields::HEADER_ARF0.decode(byte)? == 1,
            attribute_flag: fields::HEADER_ATTRIBUTE_FLAG.decode(byte)? == 1,
        })
    }

    /// Returns true if the payload starts with this header.
    pub(crate) fn matches(&self, data: &[u8]) -> bool {
        data.first()
            .and_then(|&byte| Self::from_byte(byte).ok())
            .is_some_and(|header| header == *self)
    }

    pub(crate) fn into_byte(self) -> Result<u8, SerializeError> {
        let mut byte = 0;
        fields::HEADER_ARF1.encode(&mut byte, self.area_flag_1 as u8)?;
        fields::HEADER_POINT_FLAG.encode(&mut byte, self.point_flag as u8)?;
        fields::HEADER_ARF0.encode(&mut byte, self.area_flag_0 as u8)?;
        fields::HEADER_ATTRIBUTE_FLAG.encode(&mut byte, self.attribute_flag as u8)?;
        fields::HEADER_VERSION.encode(&mut byte, Self::VERSION)?;
        Ok(byte)
    }

    /// Most likely location type of a payload with this header, used to report malformed input.
    pub(crate) fn location_type(&self, len: usize) -> Option<LocationType> {
        let location_type = match *self {
            Self::CIRCLE => LocationType::Circle,
            Self::LINE => LocationType::Line,
            Self::POLYGON => LocationType::Polygon,
            Self::GEO_COORDINATE => LocationType::GeoCoordinate,
            Self::POINT_ALONG_LINE if len > 17 => LocationType::PoiWithAccessPoint,
            Self::POINT_ALONG_LINE => LocationType::PointAlongLine,
            Self::RECTANGLE if len > 13 => LocationType::Grid,
            Self::RECTANGLE => LocationType::Rectangle,
            Self::CLOSED_LINE => LocationType::ClosedLine,
            _ => return None,
        };
        Some(location_type)
    }
}
