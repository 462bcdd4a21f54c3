//! Ordering properties of the segmentation over random traffic-pattern flights
mod common;

use common::{FlightBuilder, reference};
use fdm_analyzer::{FlightAnalyzer, ThresholdSet};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Arrival {
    TouchAndGo,
    FullStop,
    GoAround,
}

fn arrival() -> impl Strategy<Value = Arrival> {
    prop_oneof![
        Just(Arrival::TouchAndGo),
        Just(Arrival::FullStop),
        Just(Arrival::GoAround),
    ]
}

fn build_flight(circuits: &[(Arrival, f64)]) -> Vec<fdm_analyzer::TelemetrySample> {
    let mut builder = FlightBuilder::new().takeoff();
    for &(arrival, turn_offset_ft) in circuits {
        builder = builder.pattern(turn_offset_ft, |_| 65.0);
        builder = match arrival {
            Arrival::TouchAndGo => builder.touch_and_go(),
            Arrival::FullStop => builder.full_stop(),
            Arrival::GoAround => builder.go_around(),
        };
    }
    builder.build()
}

proptest! {
    #[test]
    fn test_segments_are_ordered_and_disjoint(
        circuits in prop::collection::vec((arrival(), -150.0..150.0_f64), 1..5),
        truncate_by in 0usize..20,
    ) {
        let reference = reference(true);
        let thresholds = ThresholdSet::default();
        let analyzer = FlightAnalyzer::new(&reference, &thresholds);

        let mut samples = build_flight(&circuits);
        let keep = samples.len().saturating_sub(truncate_by);
        samples.truncate(keep);

        let analysis = analyzer
            .analyze("random", 1, &samples)
            .map_err(|e| TestCaseError::fail(format!("{e:#}")))?;

        prop_assert!(analysis.approaches.len() <= circuits.len());
        let ids: Vec<_> = analysis.approaches.keys().copied().collect();
        prop_assert_eq!(ids, (0..analysis.approaches.len()).collect::<Vec<_>>());

        let approaches: Vec<_> = analysis.approaches.values().collect();
        for approach in &approaches {
            prop_assert!(approach.approach_start <= approach.approach_end);
            prop_assert!(approach.approach_end <= approach.landing_start);
            prop_assert!(approach.landing_start <= approach.landing_end);
            prop_assert!(approach.landing_end < samples.len());
        }
        for pair in approaches.windows(2) {
            prop_assert!(
                pair[0].landing_end <= pair[1].approach_start,
                "landing {}..={} overlaps approach starting at {}",
                pair[0].landing_start,
                pair[0].landing_end,
                pair[1].approach_start
            );
        }

        let takeoffs: Vec<_> = analysis.takeoffs.values().collect();
        for pair in takeoffs.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }
}
