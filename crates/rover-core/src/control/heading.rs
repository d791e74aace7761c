/// Signed change from `from_deg` to `to_deg`, normalized into `(-180, 180]`.
///
/// Positive is clockwise, matching the odometry heading convention.
pub fn heading_delta(from_deg: i32, to_deg: i32) -> i32 {
    let delta = (to_deg - from_deg).rem_euclid(360);
    if delta > 180 {
        delta - 360
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_across_zero() {
        assert_eq!(heading_delta(350, 10), 20);
        assert_eq!(heading_delta(10, 350), -20);
    }

    #[test]
    fn half_turn_is_positive() {
        assert_eq!(heading_delta(0, 180), 180);
        assert_eq!(heading_delta(180, 0), 180);
        assert_eq!(heading_delta(90, 270), 180);
    }
}
