use tracing::info;

use crate::encoder::lrp::{LocRefPoints, relative_offset};
use crate::encoder::resolver::resolve_lrps;
use crate::{
    ClosedLine, ClosedLineLocation, DirectedGraph, EncodeError, EncoderConfig, Line,
    LineLocation, Poi, PoiLocation, PointAlongLine, PointAlongLineLocation, RoadClassifier,
    ensure_closed_line_is_valid, ensure_line_is_valid, ensure_point_is_valid,
};

pub fn encode_line<G: DirectedGraph, C: RoadClassifier>(
    config: &EncoderConfig,
    graph: &G,
    classifier: &C,
    line: LineLocation<G::EdgeId>,
) -> Result<Line, EncodeError> {
    info!("Encoding {line:?} with {config:?}");

    // Step – 1 Check validity of the location and offsets to be encoded
    ensure_line_is_valid(graph, &line, config.max_lrp_distance)?;

    // Step – 2 Remove the lines fully covered by the offsets
    let line = line.trim(graph)?;

    let lrps = LocRefPoints {
        lrps: resolve_lrps(config, graph, classifier, &line.path)?,
        pos_offset: line.pos_offset,
        neg_offset: line.neg_offset,
    };

    Ok(Line {
        points: lrps.points(),
        offsets: lrps.offsets(),
    })
}

pub fn encode_point_along_line<G: DirectedGraph, C: RoadClassifier>(
    config: &EncoderConfig,
    graph: &G,
    classifier: &C,
    point: PointAlongLineLocation<G::EdgeId>,
) -> Result<PointAlongLine, EncodeError> {
    info!("Encoding {point:?} with {config:?}");

    // Step – 1 Check validity of the location and offset to be encoded
    ensure_point_is_valid(graph, &point)?;

    // Step – 2 Reduce the location to the line the point lies on
    let point = point.trim(graph)?;

    let lrps = resolve_lrps(config, graph, classifier, &point.path)?;
    let [first, last] = <[_; 2]>::try_from(lrps).map_err(|_| EncodeError::InvalidLrp)?;

    Ok(PointAlongLine {
        offset: relative_offset(point.offset, first.point.dnp()),
        points: [first.point, last.point],
        orientation: point.orientation,
        side: point.side,
    })
}

pub fn encode_poi<G: DirectedGraph, C: RoadClassifier>(
    config: &EncoderConfig,
    graph: &G,
    classifier: &C,
    poi: PoiLocation<G::EdgeId>,
) -> Result<Poi, EncodeError> {
    let point = encode_point_along_line(config, graph, classifier, poi.point)?;

    Ok(Poi {
        point,
        coordinate: poi.coordinate,
    })
}

pub fn encode_closed_line<G: DirectedGraph, C: RoadClassifier>(
    config: &EncoderConfig,
    graph: &G,
    classifier: &C,
    line: ClosedLineLocation<G::EdgeId>,
) -> Result<ClosedLine, EncodeError> {
    info!("Encoding {line:?} with {config:?}");

    // Step – 1 Check validity of the circuit to be encoded
    ensure_closed_line_is_valid(graph, &line)?;

    let mut lrps = resolve_lrps(config, graph, classifier, &line.path)?;

    // the last LRP lies on the first one, only its line attributes are kept
    let last = lrps.pop().ok_or(EncodeError::InvalidLrp)?;
    if lrps.is_empty() {
        return Err(EncodeError::InvalidLrp);
    }

    Ok(ClosedLine {
        points: lrps.into_iter().map(|lrp| lrp.point).collect(),
        last_line: last.point.line,
    })
}
