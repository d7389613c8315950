//! Matching between the descriptive tags of the road network and the OpenLR road categories.

use crate::{Fow, Frc, RatingScore, Tags};

/// Translates the tag vocabulary of a road network into Functional Road Classes (FRC) and
/// Forms of Way (FOW), and back.
/// Should be implemented for the map source the decoder and encoder run on.
pub trait RoadClassifier {
    /// Similarity in [0, 1] between the edge tags and the given road categories.
    fn match_arc(&self, tags: &Tags, fow: Fow, frc: Frc) -> RatingScore;

    /// Infers the road categories of an edge from its tags.
    /// Returns None if the tags give no basis for a classification.
    fn infer_frc_fow(&self, tags: &Tags) -> Option<(Frc, Fow)>;

    /// Infers the Functional Road Class only.
    fn infer_frc(&self, tags: &Tags) -> Option<Frc> {
        self.infer_frc_fow(tags).map(|(frc, _)| frc)
    }
}

/// Classifier of OpenStreetMap ways, based on their `highway` tag.
/// See <https://wiki.openstreetmap.org/wiki/Key:highway>.
///
/// `match_arc` rates 1.0 when the `highway` value is listed for the FRC, 0.2 for any other
/// highway and 0.0 without one. The lists follow the usual OSM to FRC table, extended with
/// `motorway_link` and `trunk_link` for FRC 0 and `service` for FRC 6, so that every FRC
/// inferred by `infer_frc_fow` is also rated as an exact match.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsmClassifier;

impl OsmClassifier {
    const EXACT_MATCH: f64 = 1.0;
    const ROAD_MATCH: f64 = 0.2;

    fn highways(frc: Frc) -> &'static [&'static str] {
        match frc {
            Frc::Frc0 => &["motorway", "motorway_link", "trunk", "trunk_link"],
            Frc::Frc1 => &["primary", "primary_link"],
            Frc::Frc2 => &["secondary", "secondary_link"],
            Frc::Frc3 => &["tertiary", "tertiary_link"],
            Frc::Frc4 => &["road", "road_link", "unclassified", "residential"],
            Frc::Frc5 => &[
                "road",
                "road_link",
                "unclassified",
                "residential",
                "living_street",
            ],
            Frc::Frc6 => &[
                "road",
                "track",
                "unclassified",
                "residential",
                "living_street",
                "service",
            ],
            Frc::Frc7 => &["footway", "bridleway", "steps", "path", "living_street"],
        }
    }
}

impl RoadClassifier for OsmClassifier {
    fn match_arc(&self, tags: &Tags, _fow: Fow, frc: Frc) -> RatingScore {
        match tags.get("highway") {
            Some(highway) if Self::highways(frc).contains(&highway) => {
                RatingScore::from(Self::EXACT_MATCH)
            }
            Some(highway) if !highway.is_empty() => RatingScore::from(Self::ROAD_MATCH),
            _ => RatingScore::ZERO,
        }
    }

    fn infer_frc_fow(&self, tags: &Tags) -> Option<(Frc, Fow)> {
        let (frc, fow) = match tags.get("highway")? {
            "motorway" => (Frc::Frc0, Fow::Motorway),
            "trunk" => (Frc::Frc0, Fow::MultipleCarriageway),
            "motorway_link" | "trunk_link" => (Frc::Frc0, Fow::SlipRoad),
            "primary" => (Frc::Frc1, Fow::SingleCarriageway),
            "primary_link" => (Frc::Frc1, Fow::SlipRoad),
            "secondary" => (Frc::Frc2, Fow::SingleCarriageway),
            "secondary_link" => (Frc::Frc2, Fow::SlipRoad),
            "tertiary" => (Frc::Frc3, Fow::SingleCarriageway),
            "tertiary_link" => (Frc::Frc3, Fow::SlipRoad),
            "road" | "unclassified" | "residential" => (Frc::Frc4, Fow::SingleCarriageway),
            "road_link" => (Frc::Frc4, Fow::SlipRoad),
            "living_street" => (Frc::Frc5, Fow::SingleCarriageway),
            "track" | "service" => (Frc::Frc6, Fow::SingleCarriageway),
            "footway" | "bridleway" | "steps" | "path" => (Frc::Frc7, Fow::Other),
            _ => return None,
        };

        if tags.has("junction", "roundabout") {
            Some((frc, Fow::Roundabout))
        } else {
            Some((frc, fow))
        }
    }
}
