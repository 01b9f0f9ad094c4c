use metrika_logs::{
    catalog::{available_metrics, validate_fields, with_required_metrics, ReportType},
    error::ValidationError,
};

#[test]
fn rejects_mixed_families() {
    let fields = ["ym:s:date", "ym:pv:URL"];
    for requested in [ReportType::Visits, ReportType::Hits] {
        let err = validate_fields(&fields, requested).unwrap_err();
        assert_eq!(err, ValidationError::MixedFamilies);
    }
}

#[test]
fn rejects_empty_fields() {
    let fields: [&str; 0] = [];
    assert_eq!(
        validate_fields(&fields, ReportType::Visits).unwrap_err(),
        ValidationError::EmptyFields
    );
}

#[test]
fn switches_report_type_to_match_fields() {
    let fields = ["ym:pv:URL", "ym:pv:title"];
    assert_eq!(validate_fields(&fields, ReportType::Visits).unwrap(), ReportType::Hits);

    let fields = ["ym:s:visitID"];
    assert_eq!(validate_fields(&fields, ReportType::Hits).unwrap(), ReportType::Visits);
}

#[test]
fn lists_unknown_metrics() {
    let fields = ["ym:s:date", "ym:s:noSuchField", "ym:s:alsoMissing"];
    match validate_fields(&fields, ReportType::Visits).unwrap_err() {
        ValidationError::UnknownMetrics { report_type, fields } => {
            assert_eq!(report_type, "visits");
            assert_eq!(fields, vec!["ym:s:noSuchField", "ym:s:alsoMissing"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn catalogs_are_single_family() {
    for rt in [ReportType::Visits, ReportType::Hits] {
        assert!(available_metrics(rt).iter().all(|m| m.starts_with(rt.prefix())));
    }
}

#[test]
fn required_metrics_are_prepended_once() {
    let fields = with_required_metrics(
        ReportType::Hits,
        vec!["ym:pv:URL".into(), "ym:pv:date".into()],
    );
    assert_eq!(fields, vec!["ym:pv:clientID", "ym:pv:URL", "ym:pv:date"]);

    let fields = with_required_metrics(ReportType::Visits, vec!["ym:s:visitID".into()]);
    assert_eq!(fields, vec!["ym:s:date", "ym:s:clientID", "ym:s:visitID"]);
}
