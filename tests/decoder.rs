mod graph;

use approx::assert_abs_diff_eq;
use openlr_referenced::{
    ClosedLineLocation, DecodeError, DecoderConfig, DeserializeError, EncoderConfig, Length,
    LineLocation, Location, LocationReference, Orientation, OsmClassifier, PointAlongLineLocation,
    RouteScoring, SideOfRoad, decode_base64_openlr, deserialize_base64_openlr,
    encode_base64_openlr,
};
use rayon::prelude::*;
use test_log::test;

use crate::graph::{EdgeId, NETWORK_GRAPH, NetworkGraph};

fn encode(location: Location<EdgeId>) -> String {
    let graph: &NetworkGraph = &NETWORK_GRAPH;
    let config = EncoderConfig::default();
    encode_base64_openlr(&config, graph, &OsmClassifier, location).unwrap()
}

#[test]
fn decode_line_location_reference_001() {
    let graph: &NetworkGraph = &NETWORK_GRAPH;
    let config = DecoderConfig::default();

    let location = Location::Line(LineLocation {
        path: vec![EdgeId(4), EdgeId(5), EdgeId(6)],
        pos_offset: Length::ZERO,
        neg_offset: Length::ZERO,
    });

    let code = encode(location.clone());
    let decoded = decode_base64_openlr(&config, graph, &OsmClassifier, &code).unwrap();
    assert_eq!(decoded, location);

    // the decoded location is encoded into the same location reference
    assert_eq!(encode(decoded), code);
}

#[test]
fn decode_line_location_reference_offsets() {
    let graph: &NetworkGraph = &NETWORK_GRAPH;
    let config = DecoderConfig::default();

    let code = encode(Location::Line(LineLocation {
        path: vec![EdgeId(1), EdgeId(2), EdgeId(3)],
        pos_offset: Length::from_meters(69.5),
        neg_offset: Length::ZERO,
    }));

    let Location::Line(line) = decode_base64_openlr(&config, graph, &OsmClassifier, &code).unwrap()
    else {
        panic!("expected a line location");
    };

    assert_eq!(line.path, [EdgeId(1), EdgeId(2), EdgeId(3)]);
    assert_abs_diff_eq!(line.pos_offset.meters(), 69.5, epsilon = 1.0);
    assert_eq!(line.neg_offset, Length::ZERO);
}

#[test]
fn decode_line_location_reference_feasibility() {
    let graph: &NetworkGraph = &NETWORK_GRAPH;
    let config = DecoderConfig {
        scoring: RouteScoring::Feasibility,
        ..Default::default()
    };

    let location = Location::Line(LineLocation {
        path: vec![EdgeId(7), EdgeId(-1)],
        pos_offset: Length::ZERO,
        neg_offset: Length::ZERO,
    });

    let code = encode(location.clone());
    assert_eq!(
        decode_base64_openlr(&config, graph, &OsmClassifier, &code),
        Ok(location)
    );
}

#[test]
fn decode_point_along_line_location_reference() {
    let graph: &NetworkGraph = &NETWORK_GRAPH;
    let config = DecoderConfig::default();

    let code = encode(Location::PointAlongLine(PointAlongLineLocation {
        path: vec![EdgeId(1), EdgeId(2)],
        offset: Length::from_meters(208.5),
        orientation: Orientation::Forward,
        side: SideOfRoad::Left,
    }));

    let Location::PointAlongLine(point) =
        decode_base64_openlr(&config, graph, &OsmClassifier, &code).unwrap()
    else {
        panic!("expected a point along line location");
    };

    assert_eq!(point.path, [EdgeId(2)]);
    assert_abs_diff_eq!(point.offset.meters(), 69.5, epsilon = 1.0);
    assert_eq!(point.orientation, Orientation::Forward);
    assert_eq!(point.side, SideOfRoad::Left);
}

#[test]
fn decode_closed_line_location_reference() {
    let graph: &NetworkGraph = &NETWORK_GRAPH;
    let config = DecoderConfig::default();

    let location = Location::ClosedLine(ClosedLineLocation {
        path: vec![EdgeId(6), EdgeId(-2), EdgeId(4), EdgeId(5)],
    });

    let code = encode(location.clone());
    assert_eq!(
        decode_base64_openlr(&config, graph, &OsmClassifier, &code),
        Ok(location)
    );
}

#[test]
fn decode_area_location_references() {
    let graph: &NetworkGraph = &NETWORK_GRAPH;
    let config = DecoderConfig::default();

    for code in ["AwOgxCUNmwEs", "QwOgcSUNGgGIAX8=", "EwOgUCUNEwJFAH//yAEv/vIAxw=="] {
        let location = decode_base64_openlr(&config, graph, &OsmClassifier, code).unwrap();

        match (location, deserialize_base64_openlr(code).unwrap()) {
            (Location::Circle(circle), LocationReference::Circle(expected)) => {
                assert_eq!(circle, expected)
            }
            (Location::Rectangle(rectangle), LocationReference::Rectangle(expected)) => {
                assert_eq!(rectangle, expected)
            }
            (Location::Polygon(polygon), LocationReference::Polygon(expected)) => {
                assert_eq!(polygon, expected)
            }
            (location, _) => panic!("unexpected {location:?} for {code}"),
        }
    }
}

#[test]
fn decode_location_reference_errors() {
    let graph: &NetworkGraph = &NETWORK_GRAPH;
    let config = DecoderConfig::default();

    assert_eq!(
        decode_base64_openlr(&config, graph, &OsmClassifier, "not base64!"),
        Err(DecodeError::DeserializeError(DeserializeError::InvalidBase64))
    );

    // line referenced on a different map
    assert!(matches!(
        decode_base64_openlr(&config, graph, &OsmClassifier, "CwRbWyNG9RpsCQCb/jsbtAT/6/+jK1lE"),
        Err(DecodeError::NoCandidate(_))
    ));
}

#[test]
fn decode_line_location_reference_concurrently() {
    let graph: &NetworkGraph = &NETWORK_GRAPH;
    let config = DecoderConfig::default();

    let codes = [
        encode(Location::Line(LineLocation {
            path: vec![EdgeId(4), EdgeId(5), EdgeId(6)],
            pos_offset: Length::ZERO,
            neg_offset: Length::ZERO,
        })),
        encode(Location::Line(LineLocation {
            path: vec![EdgeId(-3), EdgeId(-2), EdgeId(-1)],
            pos_offset: Length::ZERO,
            neg_offset: Length::from_meters(50.0),
        })),
    ];

    let expected: Vec<_> = codes
        .iter()
        .map(|code| decode_base64_openlr(&config, graph, &OsmClassifier, code))
        .collect();

    let locations: Vec<_> = (0..64_usize)
        .into_par_iter()
        .map(|i| {
            let code = &codes[i % codes.len()];
            decode_base64_openlr(&config, graph, &OsmClassifier, code)
        })
        .collect();

    for (i, location) in locations.iter().enumerate() {
        assert!(location.is_ok());
        assert_eq!(location, &expected[i % codes.len()]);
    }
}
