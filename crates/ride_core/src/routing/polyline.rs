//! Encoded-polyline decoding.
//!
//! Directions-style APIs ship route geometry as an encoded polyline:
//! zigzag-encoded lat/lng deltas at 1e-5 precision, packed five bits per
//! character with an offset of 63. Decoding happens here at the boundary;
//! the rest of the engine only ever sees decoded [`GeoPoint`]s.

use crate::geo::GeoPoint;

/// Decodes an encoded polyline into its waypoints.
///
/// Returns `None` on truncated or malformed input. The empty string decodes
/// to an empty waypoint list.
pub fn decode(encoded: &str) -> Option<Vec<GeoPoint>> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        let (dlat, next) = decode_value(bytes, index)?;
        let (dlng, next) = decode_value(bytes, next)?;
        lat += dlat;
        lng += dlng;
        index = next;
        points.push(GeoPoint::new(lat as f64 / 1e5, lng as f64 / 1e5));
    }

    Some(points)
}

/// Decodes one zigzag varint starting at `index`; returns the signed delta
/// and the index of the next value.
fn decode_value(bytes: &[u8], mut index: usize) -> Option<(i64, usize)> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let chunk = i64::from(*bytes.get(index)?) - 63;
        if !(0..64).contains(&chunk) {
            return None;
        }
        index += 1;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    let delta = if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Some((delta, index))
}
