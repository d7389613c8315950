use crate::graph::path::{is_path_connected, path_length, path_vertices};
use crate::{
    Circle, Coordinate, DirectedGraph, Grid, Length, LocationError, LocationType, Orientation,
    Polygon, Rectangle, SideOfRoad,
};

/// Defines a location (in a map) that can be encoded using the OpenLR encoder
/// and is also the result of the decoding process.
#[derive(Debug, Clone, PartialEq)]
pub enum Location<EdgeId> {
    // Line Locations
    Line(LineLocation<EdgeId>),
    // Point Locations
    GeoCoordinate(Coordinate),
    PointAlongLine(PointAlongLineLocation<EdgeId>),
    Poi(PoiLocation<EdgeId>),
    // Area Locations
    Circle(Circle),
    Rectangle(Rectangle),
    Grid(Grid),
    Polygon(Polygon),
    ClosedLine(ClosedLineLocation<EdgeId>),
}

impl<EdgeId> Location<EdgeId> {
    pub const fn location_type(&self) -> LocationType {
        match self {
            Self::Line(_) => LocationType::Line,
            Self::GeoCoordinate(_) => LocationType::GeoCoordinate,
            Self::PointAlongLine(_) => LocationType::PointAlongLine,
            Self::Poi(_) => LocationType::PoiWithAccessPoint,
            Self::Circle(_) => LocationType::Circle,
            Self::Rectangle(_) => LocationType::Rectangle,
            Self::Grid(_) => LocationType::Grid,
            Self::Polygon(_) => LocationType::Polygon,
            Self::ClosedLine(_) => LocationType::ClosedLine,
        }
    }
}

/// Location (in a map) that represents a Line Location Reference.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLocation<EdgeId> {
    /// Complete list of edges that form the line.
    pub path: Vec<EdgeId>,
    /// Distance from the start of the first edge to the beginning of the location.
    pub pos_offset: Length,
    /// Distance from the end of the last edge to the end of the location.
    pub neg_offset: Length,
}

impl<EdgeId: Copy> LineLocation<EdgeId> {
    pub fn path_length<G>(&self, graph: &G) -> Length
    where
        G: DirectedGraph<EdgeId = EdgeId>,
    {
        path_length(graph, &self.path)
    }

    /// Sequence of vertices connected by the line edges.
    pub fn vertices<G>(&self, graph: &G) -> Option<Vec<G::VertexId>>
    where
        G: DirectedGraph<EdgeId = EdgeId>,
    {
        path_vertices(graph, &self.path)
    }

    /// Construct a valid Line location from the path trimmed by its offsets.
    ///
    /// The offsets must fulfill the following constraints:
    /// - The sum of the positive and negative offset cannot be greater than the total length of the
    ///   location lines.
    /// - Positive offset value shall be less than the length of the first line:
    ///     - Otherwise the first line can be removed from the list of location lines and the offset
    ///       value must be reduced in the same way.
    ///     - This procedure shall be repeated until this constraint is fulfilled.
    /// - Negative offset value shall be less than the length of the last line:
    ///     - Otherwise the last line can be removed from the list of location lines and the offset
    ///       value must be reduced in the same way.
    ///     - This procedure shall be repeated until this constraint is fulfilled.
    pub fn trim<G>(self, graph: &G) -> Result<LineLocation<G::EdgeId>, LocationError>
    where
        G: DirectedGraph<EdgeId = EdgeId>,
    {
        let path_length = self.path_length(graph);

        let Self {
            mut path,
            mut pos_offset,
            mut neg_offset,
        } = self;

        if pos_offset + neg_offset >= path_length {
            return Err(LocationError::InvalidOffsets((pos_offset, neg_offset)));
        }

        let start_cut = get_path_cut(graph, path.iter().copied(), pos_offset);
        let (start, cut_length) = start_cut.unwrap_or((0, Length::ZERO));
        pos_offset -= cut_length;

        let end_cut = get_path_cut(graph, path.iter().rev().copied(), neg_offset);
        let end_cut = end_cut.map(|(i, length)| (path.len() - i, length));
        let (end, cut_length) = end_cut.unwrap_or((path.len(), Length::ZERO));
        neg_offset -= cut_length;

        if end < path.len() {
            path.drain(end..);
        }
        if start < path.len() {
            path.drain(..start);
        }

        let line = LineLocation {
            path,
            pos_offset,
            neg_offset,
        };

        ensure_line_is_valid(graph, &line, Length::MAX_BINARY_LRP_DISTANCE)?;

        Ok(line)
    }
}

/// Returns an error if the Line location is not valid.
///
/// A line location is valid if the following constraints are fulfilled:
/// - The location is a connected path.
/// - The location is traversable from its start to its end.
/// - The offsets are not negative, and not greater than the maximum distance between LRPs.
/// - The sum of the positive and negative offset cannot be greater than the total length of the
///   location lines.
pub fn ensure_line_is_valid<G: DirectedGraph>(
    graph: &G,
    line: &LineLocation<G::EdgeId>,
    max_lrp_distance: Length,
) -> Result<(), LocationError> {
    let LineLocation {
        ref path,
        pos_offset,
        neg_offset,
    } = *line;

    ensure_path_is_valid(graph, path)?;

    if pos_offset < Length::ZERO
        || neg_offset < Length::ZERO
        || pos_offset > max_lrp_distance
        || neg_offset > max_lrp_distance
        || pos_offset + neg_offset >= line.path_length(graph)
    {
        return Err(LocationError::InvalidOffsets((pos_offset, neg_offset)));
    }

    Ok(())
}

fn ensure_path_is_valid<G: DirectedGraph>(
    graph: &G,
    path: &[G::EdgeId],
) -> Result<(), LocationError> {
    if path.is_empty() {
        Err(LocationError::Empty)
    } else if path_vertices(graph, path).is_none() || !is_path_connected(graph, path) {
        Err(LocationError::NotConnected)
    } else {
        Ok(())
    }
}

/// Returns the cut index and the total cut length.
fn get_path_cut<G, I>(graph: &G, edges: I, offset: Length) -> Option<(usize, Length)>
where
    G: DirectedGraph,
    I: IntoIterator<Item = G::EdgeId>,
{
    edges
        .into_iter()
        .enumerate()
        .scan(Length::ZERO, |length, (i, edge)| {
            let current_length = *length;
            if current_length <= offset {
                *length += graph.get_edge_length(edge).unwrap_or(Length::ZERO);
                Some((i, current_length))
            } else {
                None
            }
        })
        .last()
}

/// Location (in a map) of a point along a line.
#[derive(Debug, Clone, PartialEq)]
pub struct PointAlongLineLocation<EdgeId> {
    /// Connected edges the point lies on.
    pub path: Vec<EdgeId>,
    /// Distance of the point from the start of the first edge.
    pub offset: Length,
    pub orientation: Orientation,
    pub side: SideOfRoad,
}

impl<EdgeId: Copy> PointAlongLineLocation<EdgeId> {
    pub fn path_length<G>(&self, graph: &G) -> Length
    where
        G: DirectedGraph<EdgeId = EdgeId>,
    {
        path_length(graph, &self.path)
    }

    /// Reduces the path to the only edge the point lies on.
    pub fn trim<G>(self, graph: &G) -> Result<PointAlongLineLocation<G::EdgeId>, LocationError>
    where
        G: DirectedGraph<EdgeId = EdgeId>,
    {
        ensure_point_is_valid(graph, &self)?;

        let (index, cut_length) =
            get_path_cut(graph, self.path.iter().copied(), self.offset).unwrap_or_default();

        let path: Vec<_> = self.path.get(index).copied().into_iter().collect();
        let offset = self.offset - cut_length;

        let point = PointAlongLineLocation {
            path,
            offset,
            ..self
        };

        ensure_point_is_valid(graph, &point)?;

        Ok(point)
    }
}

/// Returns an error if the path is not a valid connected path, or if the point offset doesn't
/// fall within it.
pub fn ensure_point_is_valid<G: DirectedGraph>(
    graph: &G,
    point: &PointAlongLineLocation<G::EdgeId>,
) -> Result<(), LocationError> {
    ensure_path_is_valid(graph, &point.path)?;

    if point.offset < Length::ZERO || point.offset >= point.path_length(graph) {
        return Err(LocationError::InvalidOffsets((point.offset, Length::ZERO)));
    }

    Ok(())
}

/// Location (in a map) of a point of interest, accessed from a point along a line.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiLocation<EdgeId> {
    pub point: PointAlongLineLocation<EdgeId>,
    /// Coordinate of the point of interest.
    pub coordinate: Coordinate,
}

/// Location (in a map) of the area enclosed by a circuit of the road network.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedLineLocation<EdgeId> {
    /// Connected edges, the last edge ends where the first edge starts.
    pub path: Vec<EdgeId>,
}

impl<EdgeId: Copy> ClosedLineLocation<EdgeId> {
    pub fn path_length<G>(&self, graph: &G) -> Length
    where
        G: DirectedGraph<EdgeId = EdgeId>,
    {
        path_length(graph, &self.path)
    }
}

/// Returns an error if the path is not connected or not closed.
pub fn ensure_closed_line_is_valid<G: DirectedGraph>(
    graph: &G,
    line: &ClosedLineLocation<G::EdgeId>,
) -> Result<(), LocationError> {
    ensure_path_is_valid(graph, &line.path)?;

    let vertices = path_vertices(graph, &line.path).unwrap_or_default();
    if vertices.first() != vertices.last() {
        return Err(LocationError::NotConnected);
    }

    Ok(())
}
