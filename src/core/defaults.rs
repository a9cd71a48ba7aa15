//! Default road attributes per OSM highway class
//!
//! Speed limits follow Turkish road standards. Unknown classes fall back to
//! 50 km/h and two lanes.

/// Surface assumed when a segment has none
pub const DEFAULT_SURFACE: &str = "asphalt";

/// Road class used when a segment carries no usable `highway` tag
pub const UNCLASSIFIED: &str = "unclassified";

/// Default speed limit (km/h) for a highway class
pub fn default_maxspeed(highway: &str) -> i64 {
    match highway {
        "motorway" => 120,
        "motorway_link" => 80,
        "trunk" => 110,
        "trunk_link" => 70,
        "primary" => 82,
        "primary_link" => 50,
        "secondary" => 70,
        "secondary_link" => 50,
        "tertiary" => 50,
        "tertiary_link" => 30,
        "residential" => 50,
        "living_street" => 20,
        "unclassified" => 50,
        _ => 50,
    }
}

/// Default total lane count (both directions) for a highway class
pub fn default_lanes(highway: &str) -> i64 {
    match highway {
        "motorway" => 6,
        "motorway_link" => 2,
        "trunk" => 4,
        "trunk_link" => 2,
        "primary" => 4,
        "primary_link" => 2,
        "secondary" => 2,
        "secondary_link" => 1,
        "tertiary" => 2,
        "tertiary_link" => 1,
        "residential" => 2,
        "living_street" => 1,
        "unclassified" => 2,
        _ => 2,
    }
}
