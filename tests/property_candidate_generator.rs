use proptest::prelude::*;
use rtstep::domain::models::{FieldEnvelope, ScheduleParams};
use rtstep::services::CandidateGenerator;

fn params(max: u32, decrement: u32, count: u32, reference: f64) -> ScheduleParams {
    ScheduleParams {
        max_time_step: max,
        decrement,
        count,
        reference_duration_fs: reference,
        min_time_points: None,
    }
}

fn envelope() -> impl Strategy<Value = FieldEnvelope> {
    prop_oneof![
        Just(FieldEnvelope::Delta),
        (0.01f64..50.0).prop_map(|fwhm| FieldEnvelope::SmoothPulse { fwhm_fs: Some(fwhm) }),
    ]
}

proptest! {
    /// Property: candidates start at the maximum and strictly decrease
    #[test]
    fn prop_candidates_strictly_decrease_from_max(
        decrement in 1u32..20,
        multiple in 1u32..8,
        count in 1u32..12,
        envelope in envelope(),
    ) {
        let max = decrement * multiple;
        let schedule = CandidateGenerator::generate(&params(max, decrement, count, 30.0), &envelope)
            .unwrap();

        prop_assert_eq!(schedule.time_steps[0].attoseconds(), max);
        prop_assert!(schedule.len() <= count as usize);
        prop_assert!(schedule
            .time_steps
            .windows(2)
            .all(|pair| pair[0].attoseconds() > pair[1].attoseconds()));
        prop_assert!(schedule
            .time_steps
            .iter()
            .all(|ts| ts.attoseconds() % decrement == 0));
    }

    /// Property: total duration is exactly lcm + settling + reference
    #[test]
    fn prop_total_duration_is_the_sum_of_its_parts(
        decrement in 1u32..20,
        multiple in 1u32..8,
        count in 1u32..8,
        reference in 1.0f64..100.0,
        envelope in envelope(),
    ) {
        let max = decrement * multiple;
        let schedule = CandidateGenerator::generate(&params(max, decrement, count, reference), &envelope)
            .unwrap();

        prop_assert_eq!(
            schedule.total_duration_fs,
            schedule.lcm_fs + schedule.field_settling_fs + reference
        );
        prop_assert_eq!(schedule.field_settling_fs, envelope.settling_time().unwrap());
    }

    /// Property: a decrement that does not divide the maximum is always rejected
    #[test]
    fn prop_non_divisible_decrement_is_rejected(
        max in 1u32..200,
        decrement in 1u32..50,
        count in 1u32..8,
    ) {
        prop_assume!(max % decrement != 0);
        prop_assert!(CandidateGenerator::generate(&params(max, decrement, count, 30.0), &FieldEnvelope::Delta).is_err());
    }
}
