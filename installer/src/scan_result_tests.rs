//! Unit tests for scanner report parsing.

use super::*;
use rstest::rstest;

fn counts(info: u64, low: u64, medium: u64, high: u64, critical: u64, total: u64) -> FindingCounts {
    FindingCounts {
        info_count: info,
        low_count: low,
        medium_count: medium,
        high_count: high,
        critical_count: critical,
        total_count: total,
    }
}

fn full_report() -> &'static str {
    r#"{
        "scanOriginResource": {"name": "  registry/app:1.2  "},
        "createdAt": "2025-03-01T10:15:30Z",
        "status": {"verdict": "FAILED_BY_POLICY"},
        "reportUrl": "https://app.wiz.io/reports/1",
        "result": {
            "analytics": {
                "vulnerabilities": {
                    "infoCount": 1, "lowCount": 2, "mediumCount": 3,
                    "highCount": 4, "criticalCount": 5, "totalCount": 15
                },
                "secrets": {"highCount": 1, "totalCount": 1},
                "malware": null,
                "unknownScanner": {"totalCount": 9}
            }
        }
    }"#
}

#[test]
fn parses_a_complete_report() {
    let report = ScanReport::from_json_str(full_report()).expect("valid report");

    assert_eq!(report.scanned_resource.as_deref(), Some("registry/app:1.2"));
    assert_eq!(report.scan_time.as_deref(), Some("2025-03-01T10:15:30Z"));
    assert_eq!(report.status, ScanStatus::Failed);
    assert_eq!(report.report_url.as_deref(), Some("https://app.wiz.io/reports/1"));

    let analytics = report.analytics.expect("analytics present");
    assert_eq!(analytics.len(), 2);
    assert_eq!(
        analytics[&FindingCategory::Vulnerabilities],
        counts(1, 2, 3, 4, 5, 15)
    );
    assert_eq!(analytics[&FindingCategory::Secrets], counts(0, 0, 0, 1, 0, 1));
}

#[test]
fn negative_counts_are_clamped_to_zero() {
    let json = r#"{"result": {"analytics": {"sast": {
        "infoCount": -4, "lowCount": 2, "criticalCount": -1, "totalCount": -7
    }}}}"#;
    let report = ScanReport::from_json_str(json).expect("valid report");
    let analytics = report.analytics.expect("analytics present");

    assert_eq!(analytics[&FindingCategory::Sast], counts(0, 2, 0, 0, 0, 0));
}

#[test]
fn null_counts_read_as_zero() {
    let json = r#"{"result": {"analytics": {"secrets": {"highCount": null, "totalCount": 3}}}}"#;
    let report = ScanReport::from_json_str(json).expect("valid report");
    let analytics = report.analytics.expect("analytics present");

    assert_eq!(analytics[&FindingCategory::Secrets], counts(0, 0, 0, 0, 0, 3));
}

#[rstest]
#[case::exact(counts(1, 1, 1, 1, 1, 5), true)]
#[case::total_exceeds_sum(counts(0, 1, 0, 0, 0, 4), true)]
#[case::all_zero(FindingCounts::default(), true)]
#[case::total_short(counts(1, 1, 1, 1, 1, 4), false)]
#[case::missing_total(counts(0, 0, 0, 2, 0, 0), false)]
fn validity_requires_total_to_cover_severities(#[case] counts: FindingCounts, #[case] valid: bool) {
    assert_eq!(counts.is_valid(), valid);
}

#[test]
fn clamped_negative_total_makes_a_category_inconsistent() {
    let json = r#"{"result": {"analytics": {"vulnerabilities": {"highCount": 2, "totalCount": -2}}}}"#;
    let report = ScanReport::from_json_str(json).expect("valid report");

    assert_eq!(
        report.inconsistent_categories(),
        vec![FindingCategory::Vulnerabilities]
    );
}

#[test]
fn badly_typed_category_is_skipped() {
    let json = r#"{"result": {"analytics": {
        "secrets": {"totalCount": "many"},
        "malware": {"totalCount": 1, "lowCount": 1}
    }}}"#;
    let report = ScanReport::from_json_str(json).expect("valid report");
    let analytics = report.analytics.expect("analytics present");

    assert!(!analytics.contains_key(&FindingCategory::Secrets));
    assert_eq!(analytics[&FindingCategory::Malware], counts(0, 1, 0, 0, 0, 1));
}

#[test]
fn legacy_scan_statistics_become_misconfigurations() {
    let json = r#"{"result": {"scanStatistics": {
        "infoMatches": 1, "lowMatches": 2, "mediumMatches": 0,
        "highMatches": 1, "criticalMatches": -3, "totalMatches": 4
    }}}"#;
    let report = ScanReport::from_json_str(json).expect("valid report");
    let analytics = report.analytics.expect("statistics produce analytics");

    assert_eq!(
        analytics[&FindingCategory::Misconfigurations],
        counts(1, 2, 0, 1, 0, 4)
    );
}

#[test]
fn legacy_statistics_override_analytics_entry() {
    let json = r#"{"result": {
        "analytics": {"scanStatistics": {"totalCount": 9}, "secrets": {"totalCount": 1}},
        "scanStatistics": {"totalMatches": 2, "lowMatches": 2}
    }}"#;
    let report = ScanReport::from_json_str(json).expect("valid report");
    let analytics = report.analytics.expect("analytics present");

    assert_eq!(
        analytics[&FindingCategory::Misconfigurations],
        counts(0, 2, 0, 0, 0, 2)
    );
    assert_eq!(analytics[&FindingCategory::Secrets].total_count, 1);
}

#[rstest]
#[case::passed("PASSED_BY_POLICY", ScanStatus::Passed)]
#[case::failed("FAILED_BY_POLICY", ScanStatus::Failed)]
#[case::in_progress("IN_PROGRESS", ScanStatus::InProgress)]
#[case::warned("WARN_BY_POLICY", ScanStatus::Warned)]
#[case::display_name("Passed", ScanStatus::Unknown)]
#[case::empty("", ScanStatus::Unknown)]
fn maps_verdicts(#[case] verdict: &str, #[case] expected: ScanStatus) {
    assert_eq!(ScanStatus::from_verdict(verdict), expected);
}

#[test]
fn missing_sections_yield_defaults() {
    let report = ScanReport::from_json_str("{}").expect("valid report");
    assert_eq!(report, ScanReport::default());
    assert_eq!(report.status, ScanStatus::Unknown);
    assert!(report.analytics.is_none());
}

#[test]
fn blank_fields_are_dropped() {
    let json = r#"{"scanOriginResource": {"name": "   "}, "reportUrl": ""}"#;
    let report = ScanReport::from_json_str(json).expect("valid report");
    assert!(report.scanned_resource.is_none());
    assert!(report.report_url.is_none());
}

#[rstest]
#[case::empty("")]
#[case::whitespace(" \n\t")]
fn blank_input_is_an_error(#[case] json: &str) {
    let err = ScanReport::from_json_str(json).expect_err("blank report");
    assert!(matches!(err, ScanResultError::Empty));
}

#[rstest]
#[case::syntax("{not json")]
#[case::array("[1, 2]")]
#[case::scanner_text("Scan finished with 3 findings")]
fn non_object_input_is_an_error(#[case] json: &str) {
    let err = ScanReport::from_json_str(json).expect_err("not a report");
    assert!(matches!(err, ScanResultError::Json(_)));
}

#[test]
fn summary_lists_category_totals_in_report_order() {
    let report = ScanReport::from_json_str(full_report()).expect("valid report");
    assert_eq!(
        report.summary(),
        "Scan result for registry/app:1.2: Failed; findings: Vulnerabilities=15, Secrets=1"
    );
}

#[test]
fn empty_analytics_summarise_as_none() {
    let report = ScanReport::from_json_str(r#"{"result": {"analytics": {}}}"#).expect("valid");
    assert_eq!(report.analytics, Some(BTreeMap::new()));
    assert_eq!(report.summary(), "Scan result: Unknown; findings: none");
}

#[test]
fn load_reads_the_report_from_disk() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::try_from(temp.path().join("wizcli_output")).expect("UTF-8 path");
    std::fs::write(&path, full_report()).expect("write report");

    let report = ScanReport::load(&path).expect("readable report");
    assert_eq!(report.status, ScanStatus::Failed);
}

#[test]
fn load_names_a_missing_report() {
    let err = ScanReport::load(Utf8Path::new("/nonexistent/wizcli_output")).expect_err("missing");
    match err {
        ScanResultError::Read { path, .. } => assert_eq!(path.as_str(), "/nonexistent/wizcli_output"),
        other => panic!("expected Read error, got {other:?}"),
    }
}
