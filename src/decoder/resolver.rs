use tracing::{debug, trace, warn};

use crate::decoder::candidates::{CandidateVertex, CandidateVertices};
use crate::{
    DecodeError, DecoderConfig, DirectedGraph, Length, Offsets, Path, Point, RatingScore,
    RoadClassifier, RouteScoring, ShortestPathConfig, shortest_circuit, shortest_path,
};

/// Route between a candidate vertex of an LRP and a candidate vertex of the next LRP.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRoute<VertexId, EdgeId> {
    pub from: CandidateVertex<VertexId>,
    pub to: CandidateVertex<VertexId>,
    /// Shortest path between the two candidates, None if they cannot be connected.
    pub route: Option<Path<VertexId, EdgeId>>,
    /// How well the route agrees with the LRP describing it, 0 if there is no route.
    pub score: RatingScore,
}

/// Sequence of the routes resolved for each pair of consecutive LRPs.
#[derive(Debug, Clone, PartialEq)]
pub struct Routes<VertexId, EdgeId>(Vec<Path<VertexId, EdgeId>>);

impl<VertexId, EdgeId> From<Vec<Path<VertexId, EdgeId>>> for Routes<VertexId, EdgeId> {
    fn from(routes: Vec<Path<VertexId, EdgeId>>) -> Self {
        Self(routes)
    }
}

impl<VertexId, EdgeId> Routes<VertexId, EdgeId>
where
    VertexId: Copy + PartialEq,
    EdgeId: Copy,
{
    pub fn paths(&self) -> &[Path<VertexId, EdgeId>] {
        &self.0
    }

    pub fn path_length(&self) -> Length {
        self.0.iter().map(|route| route.length).sum()
    }

    /// Concatenates the edges of all the routes.
    /// Fails with the index of the first route that doesn't end where the next one starts.
    pub fn to_path(&self) -> Result<Vec<EdgeId>, DecodeError> {
        for (i, window) in self.0.windows(2).enumerate() {
            if window[0].destination() != window[1].origin() {
                return Err(DecodeError::Inconsistent(i));
            }
        }

        Ok(self.0.iter().flat_map(|route| route.edges.iter().copied()).collect())
    }

    /// Converts the offsets of the location reference into meters.
    /// The positive offset is relative to the first route and the negative offset is relative
    /// to the last one.
    pub fn calculate_offsets(&self, offsets: Offsets) -> (Length, Length) {
        let first_length = self.0.first().map(|route| route.length).unwrap_or_default();
        let last_length = self.0.last().map(|route| route.length).unwrap_or_default();

        let pos_offset = offsets.distance_from_start(first_length);
        let neg_offset = offsets.distance_to_end(last_length);

        (pos_offset, neg_offset)
    }
}

/// Shortest path search constraints given by the path attributes of the LRP.
fn route_config(config: &DecoderConfig, lrp: &Point) -> ShortestPathConfig {
    let max_length = if lrp.dnp().is_unknown_dnp() {
        Length::MAX
    } else {
        lrp.dnp() + config.next_point_variance
    };

    ShortestPathConfig {
        lowest_frc: lrp.lfrcnp().relaxed(config.frc_variance),
        max_length,
    }
}

/// Computes the routes between every candidate of the first LRP and every candidate of the
/// second LRP, and sorts them from the best to the worst.
///
/// Routes are sorted by score, then by the proximity of their candidates to the LRPs. Routes
/// that cannot be told apart keep the order of the candidates.
pub fn rate_candidate_routes<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    candidates_lrp1: &CandidateVertices<G::VertexId>,
    candidates_lrp2: &CandidateVertices<G::VertexId>,
) -> Vec<CandidateRoute<G::VertexId, G::EdgeId>> {
    let pairs = candidates_lrp1
        .vertices
        .iter()
        .flat_map(|&from| candidates_lrp2.vertices.iter().map(move |&to| (from, to)));

    rate_routes(config, graph, classifier, &candidates_lrp1.lrp, pairs, false)
}

fn rate_routes<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    lrp: &Point,
    pairs: impl IntoIterator<Item = (CandidateVertex<G::VertexId>, CandidateVertex<G::VertexId>)>,
    circuit: bool,
) -> Vec<CandidateRoute<G::VertexId, G::EdgeId>> {
    let path_config = route_config(config, lrp);

    let mut routes: Vec<_> = pairs
        .into_iter()
        .map(|(from, to)| {
            let route = if circuit && from.vertex == to.vertex {
                shortest_circuit(&path_config, graph, classifier, from.vertex)
            } else {
                shortest_path(&path_config, graph, classifier, from.vertex, to.vertex)
            };

            let score = route
                .as_ref()
                .map(|path| rate_route(config, graph, classifier, lrp, path))
                .unwrap_or(RatingScore::ZERO);
            trace!("Route {:?} -> {:?} rated {score}", from.vertex, to.vertex);

            CandidateRoute {
                from,
                to,
                route,
                score,
            }
        })
        .collect();

    routes.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| (b.from.score + b.to.score).cmp(&(a.from.score + a.to.score)))
    });

    routes
}

/// Rates how well the path agrees with the LRP describing it.
fn rate_route<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    lrp: &Point,
    path: &Path<G::VertexId, G::EdgeId>,
) -> RatingScore {
    if config.scoring == RouteScoring::Feasibility {
        return RatingScore::ONE;
    }

    let distance = rate_distance(config, lrp, path.length);

    let Some(&edge) = path.edges.first() else {
        return distance;
    };

    let bearing = graph
        .get_edge_bearing(edge, config.bearing_distance)
        .map(|bearing| 1.0 - bearing.difference(&lrp.bearing()) as f64 / 180.0)
        .unwrap_or(0.0);

    let attributes = graph
        .get_edge_tags(edge)
        .map(|tags| classifier.match_arc(tags, lrp.fow(), lrp.frc()).value())
        .unwrap_or(0.0);

    let total_weight = config.bearing_weight + config.distance_weight + config.attribute_weight;
    if total_weight <= 0.0 {
        return RatingScore::ONE;
    }

    let score = config.bearing_weight * bearing
        + config.distance_weight * distance.value()
        + config.attribute_weight * attributes;

    RatingScore::from(score / total_weight).clamped()
}

/// Full score if the length falls in the bucket of the distance to next point, decreasing
/// linearly to 0 at the next point variance.
fn rate_distance(config: &DecoderConfig, lrp: &Point, length: Length) -> RatingScore {
    if lrp.dnp().is_unknown_dnp() {
        return RatingScore::ONE;
    }

    let deviation = (length.meters() - lrp.dnp().meters()).abs();
    let excess = (deviation - Length::dnp_tolerance().meters()).max(0.0);

    let variance = config.next_point_variance.meters();
    if variance <= 0.0 {
        return if excess > 0.0 {
            RatingScore::ZERO
        } else {
            RatingScore::ONE
        };
    }

    RatingScore::from(1.0 - excess / variance).clamped()
}

/// Selects a route for each pair of consecutive LRPs.
///
/// Each pair picks its best rated route among the ones that start where the previous route ends.
/// If there is none, the best rated route is taken and the previous route is computed again
/// to end where the new route starts.
///
/// Closed lines end at the vertex the first route starts from. A closed line with a single
/// explicit LRP is resolved as the shortest circuit through one of its candidates.
pub fn resolve_routes<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    candidates: &[CandidateVertices<G::VertexId>],
    closed: bool,
) -> Result<Routes<G::VertexId, G::EdgeId>, DecodeError> {
    debug!("Resolving routes for {} candidates", candidates.len());

    let pairs_count = candidates.len().saturating_sub(1);
    let mut selected: Vec<CandidateRoute<G::VertexId, G::EdgeId>> =
        Vec::with_capacity(pairs_count);

    for (i, window) in candidates.windows(2).enumerate() {
        let [candidates_lrp1, candidates_lrp2] = [&window[0], &window[1]];
        let lrp = &candidates_lrp1.lrp;

        let rated = match selected.first() {
            Some(first) if closed && i + 1 == pairs_count => {
                let pairs = candidates_lrp1.vertices.iter().map(|&from| (from, first.from));
                rate_routes(config, graph, classifier, lrp, pairs, false)
            }
            None if closed && pairs_count == 1 => {
                let pairs = candidates_lrp1.vertices.iter().map(|&from| (from, from));
                rate_routes(config, graph, classifier, lrp, pairs, true)
            }
            _ => rate_candidate_routes(config, graph, classifier, candidates_lrp1, candidates_lrp2),
        };

        let mut qualified: Vec<_> = rated
            .into_iter()
            .filter(|route| route.score > RatingScore::ZERO && route.route.is_some())
            .collect();

        let previous_lrp = i.checked_sub(1).map(|j| &candidates[j].lrp);
        let previous_end = selected.last().map(|route| route.to.vertex);
        let consistent = qualified
            .iter()
            .position(|route| Some(route.from.vertex) == previous_end);

        let route = match consistent {
            Some(index) => Some(qualified.swap_remove(index)),
            None => qualified.into_iter().find(|new_route| {
                reroute_previous(config, graph, classifier, previous_lrp, &mut selected, new_route)
            }),
        };

        let Some(route) = route else {
            return Err(DecodeError::NoRoute((candidates_lrp1.lrp, candidates_lrp2.lrp)));
        };

        debug!(
            "Selected route {:?} -> {:?} with score {}",
            route.from.vertex, route.to.vertex, route.score
        );
        selected.push(route);
    }

    let routes: Vec<_> = selected.into_iter().filter_map(|route| route.route).collect();
    Ok(Routes::from(routes))
}

/// Computes the previous route again so it ends where the new route starts.
/// Returns false if the previous route cannot be connected to the new one.
fn reroute_previous<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    previous_lrp: Option<&Point>,
    selected: &mut [CandidateRoute<G::VertexId, G::EdgeId>],
    new_route: &CandidateRoute<G::VertexId, G::EdgeId>,
) -> bool {
    let Some(previous) = selected.last_mut() else {
        return true;
    };
    let Some(lrp) = previous_lrp else {
        return false;
    };

    warn!(
        "Route ending at {:?} is not connected to {:?}, computing it again",
        previous.to.vertex, new_route.from.vertex
    );

    let path_config = route_config(config, lrp);
    let origin = previous.from.vertex;
    let destination = new_route.from.vertex;

    let Some(path) = shortest_path(&path_config, graph, classifier, origin, destination) else {
        debug!("Cannot connect {origin:?} to {destination:?}");
        return false;
    };

    previous.score = rate_route(config, graph, classifier, lrp, &path);
    previous.route = Some(path);
    previous.to = new_route.from;
    true
}
