pub struct Math {}
impl Math {
    pub fn round_float_to_n_decimals(number: f64, decimals: i32) -> f64 {
        let multiplier = 10.0_f64.powi(decimals);
        (number * multiplier).round() / multiplier
    }

    /// # percentage change between two values
    /// the absolute change relative to the previous value, in percent
    ///
    /// ## Returns
    /// * `Option<f64>` - none when the previous value is not positive
    pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
        if previous <= 0.0 || !previous.is_finite() || !current.is_finite() {
            return None;
        }

        Some((current - previous).abs() / previous * 100.0)
    }

    /// share of `part` in `whole` in percent, rounded to two decimals
    pub fn percentage(part: i64, whole: i64) -> f64 {
        if whole == 0 {
            return 0.0;
        }

        Math::round_float_to_n_decimals(part as f64 * 100.0 / whole as f64, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_float_to_n_decimals() {
        assert_eq!(Math::round_float_to_n_decimals(12.3456, 2), 12.35);
        assert_eq!(Math::round_float_to_n_decimals(50.0, 2), 50.0);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(Math::percent_change(10.0, 15.0), Some(50.0));
        assert_eq!(Math::percent_change(10.0, 5.0), Some(50.0));
        assert_eq!(Math::percent_change(10.0, 10.0), Some(0.0));
    }

    #[test]
    fn test_percent_change_without_positive_previous() {
        assert_eq!(Math::percent_change(0.0, 15.0), None);
        assert_eq!(Math::percent_change(-1.0, 15.0), None);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(Math::percentage(1, 3), 33.33);
        assert_eq!(Math::percentage(0, 0), 0.0);
    }
}
