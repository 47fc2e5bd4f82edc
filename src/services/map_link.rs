// src/services/map_link.rs
// DOCUMENTATION: Admin-entered map link parsing
// PURPOSE: Extract the pinned coordinate from a Google Maps share URL

use crate::models::Coordinate;
use regex::Regex;
use std::sync::LazyLock;

// "!3d29.37!4d47.97" is the exact pin; "@lat,lng" is only the viewport centre.
static PIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!3d(-?\d+(?:\.\d+)?)!4d(-?\d+(?:\.\d+)?)").expect("valid pin regex")
});
static QUERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&](?:q|query|ll|destination|center)=(-?\d+(?:\.\d+)?)(?:,|%2C)\s*(-?\d+(?:\.\d+)?)")
        .expect("valid query regex")
});
static VIEWPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(-?\d+(?:\.\d+)?),(-?\d+(?:\.\d+)?)").expect("valid viewport regex")
});

/// Parse the coordinate out of a map link
/// DOCUMENTATION: Tried in order of precision: pin data, query parameter,
/// viewport centre. Returns None for short links that carry no coordinate
/// and for values outside world bounds.
pub fn parse_map_link(link: &str) -> Option<Coordinate> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    [&*PIN_RE, &*QUERY_RE, &*VIEWPORT_RE]
        .iter()
        .find_map(|re| {
            let caps = re.captures(link)?;
            let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
            let lng = caps.get(2)?.as_str().parse::<f64>().ok()?;
            Some(Coordinate::new(lat, lng))
        })
        .filter(Coordinate::is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_beats_viewport() {
        let link = "https://www.google.com/maps/place/Slice/@29.3700,47.9700,17z/data=!3m1!4b1!4m6!3m5!1s0x0:0x0!8m2!3d29.3751!4d47.9812";
        assert_eq!(parse_map_link(link), Some(Coordinate::new(29.3751, 47.9812)));
    }

    #[test]
    fn test_query_parameter() {
        assert_eq!(
            parse_map_link("https://maps.google.com/?q=29.3312,48.0021"),
            Some(Coordinate::new(29.3312, 48.0021))
        );
        assert_eq!(
            parse_map_link("https://www.google.com/maps/search/?api=1&query=29.1%2C47.9"),
            Some(Coordinate::new(29.1, 47.9))
        );
    }

    #[test]
    fn test_viewport_only() {
        assert_eq!(
            parse_map_link("https://www.google.com/maps/@29.2,47.8,15z"),
            Some(Coordinate::new(29.2, 47.8))
        );
    }

    #[test]
    fn test_unparseable_links() {
        assert_eq!(parse_map_link(""), None);
        assert_eq!(parse_map_link("https://maps.app.goo.gl/AbCdEf"), None);
        assert_eq!(parse_map_link("https://maps.google.com/?q=95.0,47.0"), None);
    }
}
