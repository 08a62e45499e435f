//! Battery monitor
//!
//! Samples the battery divider on demand and classifies the voltage.
//! Every query performs a fresh conversion; nothing is cached. A failed
//! conversion surfaces as [`BatteryStatus::Unknown`] rather than an
//! error, since callers act on the status, not on transport detail.

use kywy_core::battery::{self, BatteryStatus, ChargeState};
use kywy_core::traits::{AdcSource, InputPin};

/// Battery monitor over an ADC channel and the charger sense lines
pub struct BatteryMonitor<A, P> {
    adc: A,
    charge_detect: P,
    standby: P,
}

impl<A, P> BatteryMonitor<A, P>
where
    A: AdcSource,
    P: InputPin,
{
    /// `charge_detect` asserts while a charge cycle runs, `standby`
    /// asserts when the charger is attached and the cycle is complete.
    pub fn new(adc: A, charge_detect: P, standby: P) -> Self {
        Self {
            adc,
            charge_detect,
            standby,
        }
    }

    /// Sample once and classify
    pub async fn read(&mut self) -> BatteryStatus {
        match self.adc.sample().await {
            Ok(raw) => BatteryStatus::classify(
                battery::counts_to_millivolts(raw),
                self.charge_detect.is_active(),
            ),
            Err(_) => BatteryStatus::Unknown,
        }
    }

    /// Sample once and return battery millivolts
    pub async fn read_millivolts(&mut self) -> Result<u16, A::Error> {
        let raw = self.adc.sample().await?;
        Ok(battery::counts_to_millivolts(raw))
    }

    /// Sample once and estimate remaining charge
    pub async fn percent(&mut self) -> Result<u8, A::Error> {
        let mv = self.read_millivolts().await?;
        Ok(battery::percent_from_millivolts(mv))
    }

    /// Charger sense-line state; no conversion involved
    pub fn charge_state(&self) -> ChargeState {
        ChargeState::from_sense(self.charge_detect.is_active(), self.standby.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    struct MockAdc {
        counts: Result<u16, ()>,
        conversions: usize,
    }

    impl MockAdc {
        fn new(counts: u16) -> Self {
            Self {
                counts: Ok(counts),
                conversions: 0,
            }
        }
    }

    impl AdcSource for MockAdc {
        type Error = ();

        async fn sample(&mut self) -> Result<u16, ()> {
            self.conversions += 1;
            self.counts
        }
    }

    struct MockPin(bool);

    impl InputPin for MockPin {
        fn is_active(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn extremes_map_to_critical_and_full() {
        let mut monitor = BatteryMonitor::new(MockAdc::new(0), MockPin(false), MockPin(false));
        assert_eq!(block_on(monitor.read()), BatteryStatus::Critical);

        let mut monitor = BatteryMonitor::new(MockAdc::new(4095), MockPin(false), MockPin(false));
        assert_eq!(block_on(monitor.read()), BatteryStatus::Full);
    }

    #[test]
    fn charge_detect_overrides_voltage() {
        let mut monitor = BatteryMonitor::new(MockAdc::new(0), MockPin(true), MockPin(false));
        assert_eq!(block_on(monitor.read()), BatteryStatus::Charging);
    }

    #[test]
    fn adc_fault_reads_unknown() {
        let mut adc = MockAdc::new(0);
        adc.counts = Err(());
        let mut monitor = BatteryMonitor::new(adc, MockPin(false), MockPin(false));
        assert_eq!(block_on(monitor.read()), BatteryStatus::Unknown);
    }

    #[test]
    fn every_read_resamples() {
        let mut monitor = BatteryMonitor::new(MockAdc::new(2048), MockPin(false), MockPin(false));
        block_on(monitor.read());
        block_on(monitor.read());
        block_on(monitor.read_millivolts()).unwrap();
        assert_eq!(monitor.adc.conversions, 3);
    }

    #[test]
    fn millivolts_and_percent_track_the_divider() {
        let mut monitor = BatteryMonitor::new(MockAdc::new(4095), MockPin(false), MockPin(false));
        assert_eq!(block_on(monitor.read_millivolts()).unwrap(), 6600);
        assert_eq!(block_on(monitor.percent()).unwrap(), 100);
    }

    #[test]
    fn charge_state_follows_sense_lines() {
        let monitor = BatteryMonitor::new(MockAdc::new(0), MockPin(true), MockPin(false));
        assert_eq!(monitor.charge_state(), ChargeState::Charging);

        let monitor = BatteryMonitor::new(MockAdc::new(0), MockPin(false), MockPin(true));
        assert_eq!(monitor.charge_state(), ChargeState::Charged);

        let monitor = BatteryMonitor::new(MockAdc::new(0), MockPin(false), MockPin(false));
        assert_eq!(monitor.charge_state(), ChargeState::Discharging);
    }
}
