//! Property-based tests for parameter derivation and report parsing

use proptest::prelude::*;
use xz_mastering::{
    adaptive_threshold, parse_report, CompressionMode, CompressionSettings, CompressorPlan,
    LoudnessMeasurement, MasteringRequest, NormalizationPlan, MAX_THRESHOLD_DB, MIN_THRESHOLD_DB,
    THRESHOLD_SLOPE,
};

fn any_mode() -> impl Strategy<Value = CompressionMode> {
    prop::sample::select(CompressionMode::ALL.to_vec())
}

fn measurement() -> impl Strategy<Value = LoudnessMeasurement> {
    (-60.0f64..-1.0, 0.0f64..25.0, -30.0f64..3.0, -10.0f64..10.0).prop_map(
        |(integrated, lra, true_peak, offset)| LoudnessMeasurement {
            integrated_lufs: integrated,
            loudness_range_lu: lra,
            true_peak_dbtp: true_peak,
            threshold_lufs: integrated - 10.0,
            offset_lu: offset,
        },
    )
}

fn json_layout(m: &LoudnessMeasurement) -> String {
    format!(
        "[Parsed_loudnorm_0 @ 0x1]\n{{\n\t\"input_i\" : \"{:.2}\",\n\t\"input_tp\" : \"{:.2}\",\n\t\"input_lra\" : \"{:.2}\",\n\t\"input_thresh\" : \"{:.2}\",\n\t\"normalization_type\" : \"dynamic\",\n\t\"target_offset\" : \"{:.2}\"\n}}\n",
        m.integrated_lufs, m.true_peak_dbtp, m.loudness_range_lu, m.threshold_lufs, m.offset_lu
    )
}

fn summary_layout(m: &LoudnessMeasurement) -> String {
    format!(
        "[Parsed_loudnorm_0 @ 0x1] \nInput Integrated:    {:.1} LUFS\nInput True Peak:     {:+.1} dBTP\nInput LRA:           {:.1} LU\nInput Threshold:     {:.1} LUFS\n\nOutput Integrated:   -14.1 LUFS\n\nNormalization Type:   Dynamic\nTarget Offset:       {:+.1} LU\n",
        m.integrated_lufs, m.true_peak_dbtp, m.loudness_range_lu, m.threshold_lufs, m.offset_lu
    )
}

fn assert_close(parsed: &LoudnessMeasurement, expected: &LoudnessMeasurement, tolerance: f64) {
    let pairs = [
        (parsed.integrated_lufs, expected.integrated_lufs),
        (parsed.loudness_range_lu, expected.loudness_range_lu),
        (parsed.true_peak_dbtp, expected.true_peak_dbtp),
        (parsed.threshold_lufs, expected.threshold_lufs),
        (parsed.offset_lu, expected.offset_lu),
    ];
    for (got, want) in pairs {
        assert!((got - want).abs() <= tolerance, "{got} vs {want}");
    }
}

proptest! {
    #[test]
    fn threshold_follows_loudness_gap(
        actual in -70.0f64..0.0,
        target in -70.0f64..0.0,
        offset in 0.0f64..10.0,
    ) {
        let threshold = adaptive_threshold(actual, target, offset);
        let expected = actual + (actual - target) * THRESHOLD_SLOPE + offset;
        prop_assert!((threshold - expected).abs() < 1e-9);

        // louder input always means a higher threshold
        let louder = adaptive_threshold(actual + 1.0, target, offset);
        prop_assert!((louder - threshold - (1.0 + THRESHOLD_SLOPE)).abs() < 1e-9);
    }

    #[test]
    fn compressor_threshold_stays_in_filter_range(
        mode in any_mode(),
        measured in -120.0f64..20.0,
        target in -70.0f64..0.0,
    ) {
        let plan = CompressorPlan::derive(&CompressionSettings::new(mode), measured, target);

        prop_assert!(plan.threshold_db >= MIN_THRESHOLD_DB);
        prop_assert!(plan.threshold_db <= MAX_THRESHOLD_DB);
        let in_range = (MIN_THRESHOLD_DB..=MAX_THRESHOLD_DB).contains(&plan.derived_threshold_db);
        if in_range {
            prop_assert_eq!(plan.threshold_db, plan.derived_threshold_db);
        }
    }

    #[test]
    fn json_report_reads_back(m in measurement()) {
        let parsed = parse_report(&json_layout(&m)).unwrap();
        assert_close(&parsed, &m, 0.005 + 1e-9);
    }

    #[test]
    fn summary_report_reads_back(m in measurement()) {
        let parsed = parse_report(&summary_layout(&m)).unwrap();
        assert_close(&parsed, &m, 0.05 + 1e-9);
    }

    #[test]
    fn linear_mode_never_exceeds_the_ceiling(
        m in measurement(),
        target in -30.0f64..-5.0,
        ceiling in -6.0f64..0.0,
    ) {
        let request = MasteringRequest {
            target_lufs: target,
            enable_peak_limiter: true,
            peak_limit_db: ceiling,
            ..Default::default()
        };
        let plan = NormalizationPlan::correct(&request, &m);

        if plan.linear {
            let passed_peak = (m.true_peak_dbtp * 100.0).round() / 100.0;
            let passed_integrated = (m.integrated_lufs * 100.0).round() / 100.0;
            prop_assert!(passed_peak + (plan.target_lufs - passed_integrated) <= ceiling);
            prop_assert!((m.loudness_range_lu * 100.0).round() != 0.0);
            prop_assert!(m.loudness_range_lu <= plan.loudness_range_lu + 0.005);
        }
    }
}
