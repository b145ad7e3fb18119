use crate::workflows::directory::EmployeeId;
use crate::workflows::trajectory::{SignalCsvImporter, SignalImportError, SignalSentiment, SignalType};

const EXPORT: &str = "\
employee_id,company_id,signal_type,signal_value,captured_at,signal_weight,signal_sentiment,source_id,source_table
emp-1,acme,goal_progress,72.5,2025-05-20,,positive,goal-7,goals
emp-2,acme,feedback,41,2025-05-28T09:30:00Z,1.5,,,
";

#[test]
fn parses_signal_export() {
    let signals = SignalCsvImporter::from_reader(EXPORT.as_bytes()).expect("export parses");

    assert_eq!(signals.len(), 2);
    let first = &signals[0];
    assert_eq!(first.employee_id, EmployeeId::from("emp-1"));
    assert_eq!(first.signal_type, SignalType::GoalProgress);
    assert_eq!(first.signal_value, 72.5);
    assert_eq!(first.signal_weight, None);
    assert_eq!(first.signal_sentiment, Some(SignalSentiment::Positive));
    assert_eq!(first.source_table.as_deref(), Some("goals"));
    assert_eq!(
        first.captured_at.map(|at| at.to_rfc3339()),
        Some("2025-05-20T00:00:00+00:00".to_string())
    );

    let second = &signals[1];
    assert_eq!(second.signal_type, SignalType::Feedback);
    assert_eq!(second.signal_weight, Some(1.5));
    assert_eq!(second.signal_sentiment, None);
    assert_eq!(second.source_id, None);
}

#[test]
fn reports_line_of_bad_timestamp() {
    let export = "\
employee_id,company_id,signal_type,signal_value,captured_at
emp-1,acme,training,80,2025-05-20
emp-1,acme,training,80,last tuesday
";

    let err = SignalCsvImporter::from_reader(export.as_bytes()).expect_err("bad timestamp");
    match err {
        SignalImportError::InvalidRow { line, reason } => {
            assert_eq!(line, 3);
            assert!(reason.contains("last tuesday"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_signal_type_is_a_csv_error() {
    let export = "\
employee_id,company_id,signal_type,signal_value,captured_at
emp-1,acme,gossip,80,2025-05-20
";

    let err = SignalCsvImporter::from_reader(export.as_bytes()).expect_err("bad type");
    assert!(matches!(err, SignalImportError::Csv(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = SignalCsvImporter::from_path("/nonexistent/signals.csv").expect_err("missing file");
    assert!(matches!(err, SignalImportError::Io(_)));
}
