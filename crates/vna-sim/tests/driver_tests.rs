//! End-to-end tests: the full driver stack against the simulated device
//!
//! These cover the session contract as a caller sees it:
//! - version negotiation fixing the sweep protocol variant
//! - sweep configuration per variant, including the lazy masked path
//! - the frequency axis (device-reported vs locally derived)
//! - the multiplexed channel cache and its call-order contract
//! - screen capture, including timeout restoration and soft degradation

use std::time::Duration;

use vna_driver::{FrequencyReader, Interface, NanoVna, ValueReader};
use vna_protocol::{DataChannel, Feature, SweepMethod};
use vna_sim::{Fault, SimVna};

mod helpers {
    use super::*;

    /// Connect a driver to a simulator reporting `version`
    pub fn connect(version: &str) -> NanoVna<SimVna> {
        NanoVna::connect(SimVna::with_version(version)).expect("connect")
    }

    /// Run `f` against the simulator behind a connected driver
    pub fn with_sim<R>(driver: &NanoVna<SimVna>, f: impl FnOnce(&mut SimVna) -> R) -> R {
        let iface = driver.interface();
        let mut guard = iface.lock().unwrap();
        f(&mut guard)
    }
}

use helpers::{connect, with_sim};

#[test]
fn negotiation_per_firmware_generation() {
    assert_eq!(connect("0.1.0").sweep_method(), SweepMethod::Sweep);
    assert_eq!(connect("0.2.0").sweep_method(), SweepMethod::Scan);
    assert_eq!(connect("0.7.0").sweep_method(), SweepMethod::Scan);
    assert_eq!(connect("0.7.1").sweep_method(), SweepMethod::ScanMask);
    assert_eq!(connect("1.2.3-gdeadbee").sweep_method(), SweepMethod::ScanMask);
}

#[test]
fn features_follow_method() {
    let driver = connect("0.7.1");
    assert!(driver.features().contains(&Feature::ScanMaskCommand));
    let driver = connect("0.3.0");
    assert!(driver.features().contains(&Feature::ScanCommand));
}

#[test]
fn mute_device_fails_connect_with_timeout() {
    let mut sim = SimVna::default();
    sim.set_fault(Some(Fault::Mute));
    let err = match NanoVna::connect(sim) {
        Ok(_) => panic!("connect succeeded against a mute device"),
        Err(err) => err,
    };
    assert!(err.is_communication());
}

#[test]
fn legacy_sweep_configures_device() {
    let mut driver = connect("0.1.0");
    driver.set_sweep(1_000_000, 2_000_000).unwrap();
    let received = with_sim(&driver, |sim| sim.received().to_vec());
    assert!(received.contains(&"sweep 1000000 2000000 101".to_string()));
    assert_eq!(with_sim(&driver, |sim| sim.sweep()).start, 1_000_000);
}

#[test]
fn scan_firmware_uses_scan_command() {
    let mut driver = connect("0.4.5");
    driver.set_sweep(1_000_000, 2_000_000).unwrap();
    let received = with_sim(&driver, |sim| sim.received().to_vec());
    assert!(received.contains(&"scan 1000000 2000000 101".to_string()));
}

#[test]
fn scan_mask_defers_configuration_to_data_read() {
    let mut driver = connect("0.7.1");
    driver.set_sweep(1_000_000, 2_000_000).unwrap();
    // No sweep or scan command yet, only the connect-time version query.
    let received = with_sim(&driver, |sim| sim.received().to_vec());
    assert_eq!(received, vec!["version".to_string()]);

    driver.read_values(DataChannel::Channel0).unwrap();
    let received = with_sim(&driver, |sim| sim.received().to_vec());
    assert!(received.contains(&"scan 1000000 2000000 101 0b110".to_string()));
}

#[test]
fn reset_sweep_bypasses_method_framing() {
    let mut driver = connect("0.7.1");
    driver.reset_sweep(500_000, 600_000).unwrap();
    let received = with_sim(&driver, |sim| sim.received().to_vec());
    assert!(received.contains(&"sweep 500000 600000 101".to_string()));
    assert!(received.contains(&"resume".to_string()));
    assert!(!with_sim(&driver, |sim| sim.paused()));
}

#[test]
fn pause_resume_round_trip() {
    let driver = connect("0.7.1");
    driver.pause().unwrap();
    assert!(with_sim(&driver, |sim| sim.paused()));
    driver.resume().unwrap();
    assert!(!with_sim(&driver, |sim| sim.paused()));
}

#[test]
fn frequencies_derived_locally_under_scan_mask() {
    let mut driver = connect("0.7.1");
    driver.set_datapoints(11).unwrap();
    driver.set_sweep(1_000_000, 2_000_000).unwrap();
    let freqs = driver.read_frequencies().unwrap();
    assert_eq!(freqs.len(), 11);
    assert_eq!(freqs[0], 1_000_000);
    assert_eq!(freqs[10], 2_000_000);
    // The device was never asked.
    let received = with_sim(&driver, |sim| sim.received().to_vec());
    assert!(!received.contains(&"frequencies".to_string()));
}

#[test]
fn frequencies_queried_from_device_on_older_firmware() {
    let mut driver = connect("0.2.0");
    driver.set_datapoints(11).unwrap();
    driver.set_sweep(1_000_000, 2_000_000).unwrap();
    let freqs = driver.read_frequencies().unwrap();
    assert_eq!(freqs.len(), 11);
    let received = with_sim(&driver, |sim| sim.received().to_vec());
    assert!(received.contains(&"frequencies".to_string()));
}

#[test]
fn multiplexed_channels_line_up() {
    let mut driver = connect("0.7.1");
    driver.set_datapoints(11).unwrap();
    driver.set_sweep(1_000_000, 2_000_000).unwrap();

    let ch0 = driver.read_values(DataChannel::Channel0).unwrap();
    let ch1 = driver.read_values(DataChannel::Channel1).unwrap();
    assert_eq!(ch0.len(), 11);
    assert_eq!(ch1.len(), ch0.len());
    for (a, b) in ch0.iter().zip(&ch1) {
        assert_ne!(a, b);
        assert_eq!(a.split_whitespace().count(), 2);
        assert_eq!(b.split_whitespace().count(), 2);
    }

    // One device query served both channels.
    let scans = with_sim(&driver, |sim| {
        sim.received()
            .iter()
            .filter(|c| c.contains("0b110"))
            .count()
    });
    assert_eq!(scans, 1);
}

#[test]
fn channel1_alone_serves_stale_cache_without_traffic() {
    let mut driver = connect("0.7.1");
    driver.set_datapoints(11).unwrap();
    driver.set_sweep(1_000_000, 2_000_000).unwrap();
    driver.read_values(DataChannel::Channel0).unwrap();
    let ch1_first = driver.read_values(DataChannel::Channel1).unwrap();

    // New sweep, but channel 1 requested before channel 0: the previous
    // cycle's pairs come back and the device sees no new scan. Muting the
    // simulator proves no recomputation can even be attempted.
    driver.set_sweep(5_000_000, 6_000_000).unwrap();
    with_sim(&driver, |sim| sim.set_fault(Some(Fault::Mute)));
    let ch1_stale = driver.read_values(DataChannel::Channel1).unwrap();
    assert_eq!(ch1_stale, ch1_first);
}

#[test]
fn malformed_scan_line_preserves_previous_cache() {
    let mut driver = connect("0.7.1");
    driver.set_datapoints(11).unwrap();
    driver.set_sweep(1_000_000, 2_000_000).unwrap();
    driver.read_values(DataChannel::Channel0).unwrap();
    let ch1_before = driver.read_values(DataChannel::Channel1).unwrap();

    with_sim(&driver, |sim| sim.set_fault(Some(Fault::MalformedScanLine(4))));
    assert!(driver.read_values(DataChannel::Channel0).is_err());
    assert_eq!(driver.read_values(DataChannel::Channel1).unwrap(), ch1_before);
}

#[test]
fn screenshot_full_frame() {
    let driver = connect("0.7.1");
    let frame = driver.screenshot();
    assert_eq!(frame.width(), 320);
    assert_eq!(frame.height(), 240);
    assert_eq!(frame.pixels().len(), 76_800);
    // Simulated LCD is filled with RGB565 0x0000: opaque black ARGB.
    assert!(frame.pixels().iter().all(|&px| px == 0xFF00_0000));
}

#[test]
fn screenshot_restores_timeout() {
    let driver = connect("0.7.1");
    let before = with_sim(&driver, |sim| sim.timeout());
    driver.screenshot();
    assert_eq!(with_sim(&driver, |sim| sim.timeout()), before);
    assert_ne!(before, Duration::from_secs(4));
}

#[test]
fn short_capture_degrades_softly() {
    let driver = connect("0.7.1");
    with_sim(&driver, |sim| sim.set_fault(Some(Fault::ShortCapture(1000))));
    let frame = driver.screenshot();
    assert!(frame.is_empty());

    // The raw path propagates instead.
    with_sim(&driver, |sim| sim.set_fault(Some(Fault::ShortCapture(1000))));
    assert!(driver.capture_frame().is_err());

    // And the session is still usable afterwards.
    assert!(!driver.screenshot().is_empty());
}

#[test]
fn capture_data_propagates_on_mute_device() {
    let driver = connect("0.7.1");
    with_sim(&driver, |sim| sim.set_fault(Some(Fault::Mute)));
    let err = driver.capture_data().unwrap_err();
    assert!(err.is_communication());
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn derived_axis_spans_the_range_exactly(
            start in 50_000u64..500_000_000,
            span in 1u64..100_000_000,
            points in prop::sample::select(vec![11u32, 51, 101]),
        ) {
            let mut driver = connect("0.7.1");
            driver.set_datapoints(points).unwrap();
            driver.set_sweep(start, start + span).unwrap();
            let freqs = driver.read_frequencies().unwrap();
            prop_assert_eq!(freqs.len(), points as usize);
            prop_assert_eq!(freqs[0], start);
            prop_assert_eq!(*freqs.last().unwrap(), start + span);
            prop_assert!(freqs.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}

#[test]
fn disconnect_is_connection_error() {
    let mut driver = connect("0.7.1");
    with_sim(&driver, |sim| sim.disconnect());
    assert!(!driver.is_connected());
    let err = driver.read_values(DataChannel::Channel0).unwrap_err();
    assert!(err.is_communication());
    assert!(driver.screenshot().is_empty());
}
