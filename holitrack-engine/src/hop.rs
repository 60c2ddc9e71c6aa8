//! Deterministic "hopping" motion while the character delivers at a city.
use std::f64::consts::PI;

use crate::constants::{
    DELIVERY_RANGE_STREET, DELIVERY_RANGE_TIERS, HOP_ARC_HEIGHT, HOP_LAT_SCALE, HOP_LON_SCALE,
    HOP_PERIOD_MILLIS, HOP_REST_FRACTION,
};
use crate::geo::GeoPoint;
use crate::numbers::i64_to_f64;

/// Unit offset pair in `[-1, 1]` derived from `seed` by trigonometric hashing.
///
/// `r1 = sin(seed * 123.456) * 0.5 + 0.5`, `r2 = cos(seed * 789.012) * 0.5 + 0.5`,
/// each mapped through `r * 2 - 1`. Multiply by [`delivery_range`] for degrees.
#[must_use]
pub fn hop_offset(seed: i64) -> (f64, f64) {
    let s = i64_to_f64(seed);
    let r1 = (s * HOP_LAT_SCALE).sin() * 0.5 + 0.5;
    let r2 = (s * HOP_LON_SCALE).cos() * 0.5 + 0.5;
    (r1 * 2.0 - 1.0, r2 * 2.0 - 1.0)
}

/// Maximum hop distance in degrees for a map zoom level.
#[must_use]
pub fn delivery_range(zoom: u8) -> f64 {
    DELIVERY_RANGE_TIERS
        .iter()
        .find(|(max_zoom, _)| zoom <= *max_zoom)
        .map_or(DELIVERY_RANGE_STREET, |(_, range)| *range)
}

/// Eased phase for a raw phase in `[0, 1)`: rests at both ends, arcs in between.
#[must_use]
pub fn eased_phase(phase: f64) -> f64 {
    if phase < HOP_REST_FRACTION {
        0.0
    } else if phase > 1.0 - HOP_REST_FRACTION {
        1.0
    } else {
        let t = (phase - HOP_REST_FRACTION) / (1.0 - 2.0 * HOP_REST_FRACTION);
        t + (t * PI).sin() * HOP_ARC_HEIGHT
    }
}

/// Seed and raw phase for a wall-clock instant.
#[must_use]
pub fn hop_clock(wall_millis: i64) -> (i64, f64) {
    let seed = wall_millis.div_euclid(HOP_PERIOD_MILLIS);
    let phase = i64_to_f64(wall_millis.rem_euclid(HOP_PERIOD_MILLIS)) / i64_to_f64(HOP_PERIOD_MILLIS);
    (seed, phase)
}

/// Displayed position around `center` at `wall_millis` for a map `zoom`.
#[must_use]
pub fn hop_position(center: GeoPoint, wall_millis: i64, zoom: u8) -> GeoPoint {
    let range = delivery_range(zoom);
    let (seed, phase) = hop_clock(wall_millis);
    let target = offset_point(center, hop_offset(seed), range);
    let previous = offset_point(center, hop_offset(seed - 1), range);
    let t = eased_phase(phase);
    GeoPoint::new(
        previous.latitude + (target.latitude - previous.latitude) * t,
        previous.longitude + (target.longitude - previous.longitude) * t,
    )
}

fn offset_point(center: GeoPoint, (d_lat, d_lon): (f64, f64), range: f64) -> GeoPoint {
    GeoPoint::new(center.latitude + d_lat * range, center.longitude + d_lon * range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_tiers_step_down() {
        let expected = [
            (0, 8.0),
            (2, 8.0),
            (3, 4.0),
            (4, 4.0),
            (6, 2.0),
            (7, 1.0),
            (10, 0.5),
            (11, 0.2),
            (18, 0.2),
        ];
        for (zoom, range) in expected {
            assert!((delivery_range(zoom) - range).abs() < f64::EPSILON, "zoom {zoom}");
        }
    }

    #[test]
    fn hop_offset_is_deterministic_and_bounded() {
        for seed in [-5_i64, 0, 1, 42, 1_745_107_200] {
            let (a, b) = hop_offset(seed);
            assert_eq!((a, b), hop_offset(seed));
            assert!((-1.0..=1.0).contains(&a));
            assert!((-1.0..=1.0).contains(&b));
        }
        let (lat, lon) = hop_offset(0);
        assert!(lat.abs() < 1e-12);
        assert!((lon - 1.0).abs() < 1e-12);
    }

    #[test]
    fn phase_rests_then_arcs() {
        assert!(eased_phase(0.05).abs() < f64::EPSILON);
        assert!((eased_phase(0.95) - 1.0).abs() < f64::EPSILON);
        // Midway the sine arc adds its full height.
        assert!((eased_phase(0.5) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn hop_position_starts_at_previous_target() {
        let center = GeoPoint::new(48.85, 2.35);
        let wall = 12_345_000;
        let start = hop_position(center, wall, 4);
        let (d_lat, d_lon) = hop_offset(12_344);
        assert!((start.latitude - (center.latitude + d_lat * 4.0)).abs() < 1e-9);
        assert!((start.longitude - (center.longitude + d_lon * 4.0)).abs() < 1e-9);

        let end = hop_position(center, wall + 950, 4);
        let (d_lat, d_lon) = hop_offset(12_345);
        assert!((end.latitude - (center.latitude + d_lat * 4.0)).abs() < 1e-9);
        assert!((end.longitude - (center.longitude + d_lon * 4.0)).abs() < 1e-9);
        assert!((end.latitude - center.latitude).abs() <= 4.0 + 1e-9);
    }

    #[test]
    fn hop_clock_handles_negative_instants() {
        assert_eq!(hop_clock(-1).0, -1);
        assert!((hop_clock(-1).1 - 0.999).abs() < 1e-9);
    }
}
