use crate::{
    DirectedGraph, EncodeError, EncoderConfig, Fow, Frc, Length, LineAttributes, LocationError,
    Offset, Offsets, PathAttributes, Point, RoadClassifier,
};

/// Location Reference Point together with the edges it covers up to the next LRP.
#[derive(Debug, Clone, PartialEq)]
pub struct LocRefPoint<EdgeId> {
    pub edges: Vec<EdgeId>,
    pub point: Point,
}

impl<EdgeId: Copy> LocRefPoint<EdgeId> {
    /// Creates the LRP at the start of the given edges, which must be the shortest path to the
    /// next LRP. The index is the position of the first edge in the location.
    pub fn from_segment<G, C>(
        config: &EncoderConfig,
        graph: &G,
        classifier: &C,
        edges: &[EdgeId],
        index: usize,
    ) -> Result<Self, EncodeError>
    where
        G: DirectedGraph<EdgeId = EdgeId>,
        C: RoadClassifier,
    {
        let &first_edge = edges.first().ok_or(LocationError::Empty)?;

        let vertex = graph
            .get_edge_start_vertex(first_edge)
            .ok_or(LocationError::NotConnected)?;
        let coordinate = graph
            .get_vertex_coordinate(vertex)
            .ok_or(LocationError::NotConnected)?;

        let bearing = graph
            .get_edge_bearing(first_edge, config.bearing_distance)
            .ok_or(EncodeError::InvalidLrp)?;
        let (frc, fow) = infer_frc_fow(graph, classifier, first_edge, index)?;

        let mut lfrcnp = Frc::Frc0;
        let mut dnp = Length::ZERO;
        for (i, &edge) in edges.iter().enumerate() {
            let (frc, _) = infer_frc_fow(graph, classifier, edge, index + i)?;
            lfrcnp = lfrcnp.max(frc);
            dnp += graph
                .get_edge_length(edge)
                .ok_or(LocationError::NotConnected)?;
        }

        Ok(Self {
            edges: edges.to_vec(),
            point: Point {
                coordinate,
                line: LineAttributes { frc, fow, bearing },
                path: Some(PathAttributes { lfrcnp, dnp }),
            },
        })
    }

    /// Creates the last LRP at the end of the last edge of the location, its bearing points
    /// backwards along the edge.
    pub fn from_last_edge<G, C>(
        config: &EncoderConfig,
        graph: &G,
        classifier: &C,
        edge: EdgeId,
        index: usize,
    ) -> Result<Self, EncodeError>
    where
        G: DirectedGraph<EdgeId = EdgeId>,
        C: RoadClassifier,
    {
        let vertex = graph
            .get_edge_end_vertex(edge)
            .ok_or(LocationError::NotConnected)?;
        let coordinate = graph
            .get_vertex_coordinate(vertex)
            .ok_or(LocationError::NotConnected)?;

        let bearing = graph
            .get_edge_reverse_bearing(edge, config.bearing_distance)
            .ok_or(EncodeError::InvalidLrp)?;
        let (frc, fow) = infer_frc_fow(graph, classifier, edge, index)?;

        Ok(Self {
            edges: vec![],
            point: Point {
                coordinate,
                line: LineAttributes { frc, fow, bearing },
                path: None,
            },
        })
    }
}

fn infer_frc_fow<G: DirectedGraph, C: RoadClassifier>(
    graph: &G,
    classifier: &C,
    edge: G::EdgeId,
    index: usize,
) -> Result<(Frc, Fow), EncodeError> {
    graph
        .get_edge_tags(edge)
        .and_then(|tags| classifier.infer_frc_fow(tags))
        .ok_or(EncodeError::Unclassifiable(index))
}

/// The LRPs covering a location, and the offsets in meters trimming the covered path down to the
/// location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocRefPoints<EdgeId> {
    pub lrps: Vec<LocRefPoint<EdgeId>>,
    pub pos_offset: Length,
    pub neg_offset: Length,
}

impl<EdgeId> LocRefPoints<EdgeId> {
    pub fn points(&self) -> Vec<Point> {
        self.lrps.iter().map(|lrp| lrp.point).collect()
    }

    /// Offsets relative to the distance between the first two LRPs and the distance between the
    /// last two LRPs.
    pub fn offsets(&self) -> Offsets {
        let first_length = self.lrps.first().map(|lrp| lrp.point.dnp());
        let last_length = self.lrps.iter().rev().nth(1).map(|lrp| lrp.point.dnp());

        Offsets {
            pos: relative_offset(self.pos_offset, first_length.unwrap_or_default()),
            neg: relative_offset(self.neg_offset, last_length.unwrap_or_default()),
        }
    }
}

pub fn relative_offset(offset: Length, length: Length) -> Offset {
    if length.is_zero() {
        Offset::default()
    } else {
        Offset::from_range(offset.meters() / length.meters())
    }
}
