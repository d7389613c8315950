use tracing::{debug, info};

use crate::decoder::candidates::find_all_candidate_vertices;
use crate::decoder::resolver::{Routes, resolve_routes};
use crate::{
    ClosedLine, ClosedLineLocation, DecodeError, DecoderConfig, DirectedGraph, Line, LineLocation,
    Offsets, Poi, PoiLocation, Point, PointAlongLine, PointAlongLineLocation, RoadClassifier,
    ensure_closed_line_is_valid,
};

pub fn decode_line<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    line: Line,
) -> Result<LineLocation<G::EdgeId>, DecodeError> {
    info!("Decoding {line:?} with {config:?}");

    let routes = resolve_points(config, graph, classifier, &line.points, false)?;

    // Step – 5 Concatenate and trim path according to the offsets
    let (pos_offset, neg_offset) = routes.calculate_offsets(line.offsets);

    let location = LineLocation {
        path: routes.to_path()?,
        pos_offset,
        neg_offset,
    };

    Ok(location.trim(graph)?)
}

pub fn decode_point_along_line<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    point: PointAlongLine,
) -> Result<PointAlongLineLocation<G::EdgeId>, DecodeError> {
    info!("Decoding {point:?} with {config:?}");

    let routes = resolve_points(config, graph, classifier, &point.points, false)?;

    // Step – 5 Concatenate and reduce the path to the line the point lies on
    let (offset, _) = routes.calculate_offsets(Offsets::positive(point.offset));

    let location = PointAlongLineLocation {
        path: routes.to_path()?,
        offset,
        orientation: point.orientation,
        side: point.side,
    };

    Ok(location.trim(graph)?)
}

pub fn decode_poi<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    poi: Poi,
) -> Result<PoiLocation<G::EdgeId>, DecodeError> {
    let point = decode_point_along_line(config, graph, classifier, poi.point)?;

    Ok(PoiLocation {
        point,
        coordinate: poi.coordinate,
    })
}

pub fn decode_closed_line<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    line: ClosedLine,
) -> Result<ClosedLineLocation<G::EdgeId>, DecodeError> {
    info!("Decoding {line:?} with {config:?}");

    let points = line.to_points();
    let routes = resolve_points(config, graph, classifier, &points, true)?;

    // Step – 5 Concatenate the routes into a circuit
    let location = ClosedLineLocation {
        path: routes.to_path()?,
    };

    ensure_closed_line_is_valid(graph, &location)?;
    Ok(location)
}

fn resolve_points<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    points: &[Point],
    closed: bool,
) -> Result<Routes<G::VertexId, G::EdgeId>, DecodeError> {
    // Step – 2 For each location reference point find candidate vertices
    let candidates = find_all_candidate_vertices(config, graph, points)?;
    debug_assert_eq!(candidates.len(), points.len());

    // Step – 3 Determine and rate candidate routes between subsequent location reference points
    // Step – 4 Select the best routes, consistent with each other
    let routes = resolve_routes(config, graph, classifier, &candidates, closed)?;
    debug_assert_eq!(routes.paths().len(), points.len().saturating_sub(1));
    debug!("Resolved routes of length {}", routes.path_length());

    Ok(routes)
}
