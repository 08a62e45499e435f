//! Battery voltage classification
//!
//! The board samples the battery through a 2:1 divider on a 12-bit ADC
//! channel with a 3.3 V reference. Classification maps millivolts to a
//! coarse status through fixed, monotonically ordered thresholds; an
//! asserted charge-detect line overrides the voltage-derived class.

/// ADC full-scale count (12-bit)
pub const ADC_MAX: u16 = 4095;

/// ADC reference voltage in millivolts
pub const VREF_MV: u32 = 3300;

/// Battery divider ratio (battery volts per ADC volts)
pub const DIVIDER: u32 = 2;

/// Below this the device should shut down soon
pub const CRITICAL_BELOW_MV: u16 = 3300;
/// Below this the battery is low
pub const LOW_BELOW_MV: u16 = 3600;
/// At or above this the battery is full
pub const FULL_FROM_MV: u16 = 4050;

/// Coarse battery status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryStatus {
    Critical,
    Low,
    Normal,
    Full,
    /// Charger attached and charging; overrides the voltage class
    Charging,
    /// Sample could not be taken
    Unknown,
}

impl BatteryStatus {
    /// Classify a battery voltage
    ///
    /// `charging` is the charge-detect line; when asserted the status is
    /// `Charging` regardless of the measured voltage.
    pub fn classify(mv: u16, charging: bool) -> Self {
        if charging {
            return BatteryStatus::Charging;
        }
        match mv {
            v if v >= FULL_FROM_MV => BatteryStatus::Full,
            v if v >= LOW_BELOW_MV => BatteryStatus::Normal,
            v if v >= CRITICAL_BELOW_MV => BatteryStatus::Low,
            _ => BatteryStatus::Critical,
        }
    }

    /// Returns true if the device should warn or power down
    pub fn is_low_power(self) -> bool {
        matches!(self, BatteryStatus::Critical | BatteryStatus::Low)
    }
}

/// Charger sense-line state
///
/// Derived from the charge-detect and standby lines of the charging IC:
/// charge-detect asserted means a charge cycle is running, standby
/// asserted means the cycle finished with the charger still attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChargeState {
    Charging,
    Charged,
    Discharging,
}

impl ChargeState {
    /// Decode the two sense lines
    pub fn from_sense(charging: bool, standby: bool) -> Self {
        match (charging, standby) {
            (true, _) => ChargeState::Charging,
            (false, true) => ChargeState::Charged,
            (false, false) => ChargeState::Discharging,
        }
    }
}

/// Convert raw ADC counts to battery millivolts
///
/// Integer-only: counts scale to the reference voltage, then through the
/// divider. Counts above full scale are clamped.
pub fn counts_to_millivolts(raw: u16) -> u16 {
    let raw = raw.min(ADC_MAX) as u32;
    (raw * VREF_MV * DIVIDER / ADC_MAX as u32) as u16
}

/// Estimate remaining charge from battery millivolts
///
/// Piecewise-linear approximation of the LiPo discharge curve used by
/// the board's fuel gauge readout.
pub fn percent_from_millivolts(mv: u16) -> u8 {
    match mv {
        v if v >= 4200 => 100,
        v if v >= 3900 => 85 + ((v - 3900) * 15 / 300) as u8,
        v if v >= 3600 => 60 + ((v - 3600) * 25 / 300) as u8,
        v if v >= 3300 => 25 + ((v - 3300) * 35 / 300) as u8,
        v if v >= 3100 => 5 + ((v - 3100) * 20 / 200) as u8,
        v if v >= 3000 => ((v - 3000) * 5 / 100) as u8,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_classify_correctly() {
        assert_eq!(
            BatteryStatus::classify(counts_to_millivolts(0), false),
            BatteryStatus::Critical
        );
        assert_eq!(
            BatteryStatus::classify(counts_to_millivolts(ADC_MAX), false),
            BatteryStatus::Full
        );
    }

    #[test]
    fn thresholds_are_monotonic() {
        fn rank(status: BatteryStatus) -> u8 {
            match status {
                BatteryStatus::Critical => 0,
                BatteryStatus::Low => 1,
                BatteryStatus::Normal => 2,
                BatteryStatus::Full => 3,
                _ => unreachable!(),
            }
        }

        let mut last = 0;
        for mv in (0..=5000u16).step_by(10) {
            let r = rank(BatteryStatus::classify(mv, false));
            assert!(r >= last, "status rank dropped at {} mV", mv);
            last = r;
        }
    }

    #[test]
    fn charging_overrides_voltage() {
        assert_eq!(BatteryStatus::classify(0, true), BatteryStatus::Charging);
        assert_eq!(BatteryStatus::classify(4200, true), BatteryStatus::Charging);
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(
            BatteryStatus::classify(CRITICAL_BELOW_MV - 1, false),
            BatteryStatus::Critical
        );
        assert_eq!(
            BatteryStatus::classify(CRITICAL_BELOW_MV, false),
            BatteryStatus::Low
        );
        assert_eq!(
            BatteryStatus::classify(LOW_BELOW_MV, false),
            BatteryStatus::Normal
        );
        assert_eq!(
            BatteryStatus::classify(FULL_FROM_MV, false),
            BatteryStatus::Full
        );
    }

    #[test]
    fn conversion_endpoints() {
        assert_eq!(counts_to_millivolts(0), 0);
        assert_eq!(counts_to_millivolts(ADC_MAX), (VREF_MV * DIVIDER) as u16);
        // Out-of-range counts clamp to full scale
        assert_eq!(counts_to_millivolts(u16::MAX), (VREF_MV * DIVIDER) as u16);
    }

    #[test]
    fn percent_curve_endpoints_and_monotonicity() {
        assert_eq!(percent_from_millivolts(2900), 0);
        assert_eq!(percent_from_millivolts(4200), 100);
        assert_eq!(percent_from_millivolts(5000), 100);

        let mut last = 0;
        for mv in (2900..=4300u16).step_by(5) {
            let p = percent_from_millivolts(mv);
            assert!(p >= last, "percent dropped at {} mV", mv);
            assert!(p <= 100);
            last = p;
        }
    }

    #[test]
    fn charge_state_truth_table() {
        assert_eq!(ChargeState::from_sense(true, false), ChargeState::Charging);
        assert_eq!(ChargeState::from_sense(true, true), ChargeState::Charging);
        assert_eq!(ChargeState::from_sense(false, true), ChargeState::Charged);
        assert_eq!(
            ChargeState::from_sense(false, false),
            ChargeState::Discharging
        );
    }
}
