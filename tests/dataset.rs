use std::fs;

use mitoselect::data::dataset::{fetch_dataset, LongTable, WideTable};
use mitoselect::Error;

const SAMPLE: &str = "\
\"value\"\t\"id\"\t\"channel\"\t\"patient_id\"\t\"subject_group\"\t\"cell_id\"
100.0\t1\tVDAC1\tC01\tcontrol\tC01_1
50.0\t1\tNDUFB8\tC01\tcontrol\tC01_1
4.6\t1\tLOG_VDAC1\tC01\tcontrol\tC01_1
2.0\t1\tMED_NDUFB8\tC01\tcontrol\tC01_1
200.0\t2\tVDAC1\tP01\tpatient\tP01_2
10.0\t2\tNDUFB8\tP01\tpatient\tP01_2
30.0\t2\tNDUFB8\tP01\tpatient\tP01_2
80.0\t3\tVDAC1\tP01\tpatient\tP01_3
NA\t3\tNDUFB8\tP01\tpatient\tP01_3
";

fn wide() -> WideTable {
    let mut long = LongTable::parse(SAMPLE).unwrap();
    long.retain_raw_channels();
    WideTable::pivot(&long)
}

#[test]
fn parse_unquotes_and_reads_missing_values() {
    let long = LongTable::parse(SAMPLE).unwrap();
    assert_eq!(long.rows.len(), 9);
    assert_eq!(long.rows[0].key.patient_id, "C01");
    assert_eq!(long.rows[0].channel, "VDAC1");
    assert!(long.rows[8].value.is_nan());
}

#[test]
fn derived_channels_are_dropped() {
    let mut long = LongTable::parse(SAMPLE).unwrap();
    long.retain_raw_channels();
    assert_eq!(long.rows.len(), 7);
    assert!(long.rows.iter().all(|r| !r.channel.starts_with("LOG_") && !r.channel.starts_with("MED_")));
}

#[test]
fn subjects_split_into_controls_and_patients() {
    let long = LongTable::parse(SAMPLE).unwrap();
    assert_eq!(long.subject_ids(), vec!["C01".to_string(), "P01".to_string()]);
    assert_eq!(long.control_ids(), vec!["C01".to_string()]);
    assert_eq!(long.patient_ids(), vec!["P01".to_string()]);
}

#[test]
fn pivot_sorts_averages_and_marks_missing() {
    let w = wide();
    assert_eq!(w.len(), 3);
    assert_eq!(w.channels, vec!["NDUFB8".to_string(), "VDAC1".to_string()]);
    assert_eq!(w.keys[0].cell_id, "C01_1");
    assert_eq!(w.keys[1].cell_id, "P01_2");
    assert_eq!(w.column("NDUFB8").unwrap(), vec![Some(50.0), Some(20.0), None]);
    assert_eq!(w.column("VDAC1").unwrap(), vec![Some(100.0), Some(200.0), Some(80.0)]);
}

#[test]
fn log_coordinates_use_natural_log_and_nan_for_missing() {
    let w = wide();
    let coords = w.log_coordinates("VDAC1", "NDUFB8").unwrap();
    assert!((coords[0][0] - 100f64.ln()).abs() < 1e-12);
    assert!((coords[1][1] - 20f64.ln()).abs() < 1e-12);
    assert!(coords[2][1].is_nan());
}

#[test]
fn unknown_channel_is_an_error() {
    let err = wide().log_coordinates("VDAC1", "SDHA").unwrap_err();
    assert!(matches!(err, Error::MissingChannel(c) if c == "SDHA"));
}

#[test]
fn rows_for_subjects_selects_control_rows() {
    assert_eq!(wide().rows_for_subjects(&["C01".to_string()]), vec![0]);
}

#[test]
fn missing_header_column_is_reported() {
    let err = LongTable::parse("value\tid\tchannel\n1\t1\tVDAC1\n").unwrap_err();
    assert!(matches!(err, Error::MissingColumn(_)));
}

#[test]
fn malformed_rows_report_line_numbers() {
    let text = "value\tid\tchannel\tpatient_id\tsubject_group\tcell_id\n\
                1.0\t1\tVDAC1\tC01\tcontrol\tC01_1\n\
                abc\t1\tVDAC1\tC01\tcontrol\tC01_1\n";
    match LongTable::parse(text).unwrap_err() {
        Error::Parse { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected error {other:?}"),
    }

    let short = "value\tid\tchannel\tpatient_id\tsubject_group\tcell_id\n1.0\t1\n";
    assert!(matches!(LongTable::parse(short).unwrap_err(), Error::Parse { line: 2, .. }));
}

#[test]
fn cached_dataset_is_not_downloaded_again() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("dat.txt");
    fs::write(&cache, SAMPLE).unwrap();
    let path = fetch_dataset("http://127.0.0.1:9/unreachable", &cache).unwrap();
    assert_eq!(path, cache);
    assert_eq!(LongTable::load(&path).unwrap().rows.len(), 9);
}

#[test]
fn loading_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = LongTable::load(&dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn quoted_fields_keep_tabs_and_doubled_quotes() {
    let text = "value\tid\tchannel\tpatient_id\tsubject_group\tcell_id\n\
                1.5\t1\tVDAC1\tC01\t\"ctrl \"\"a\"\"\"\t\"C01\t1\"\n";
    let long = LongTable::parse(text).unwrap();
    assert_eq!(long.rows.len(), 1);
    let key = &long.rows[0].key;
    assert_eq!(key.cell_id, "C01\t1");
    assert_eq!(key.subject_group, "ctrl \"a\"");
    assert_eq!(long.rows[0].value, 1.5);
}

#[test]
fn crlf_line_endings_are_accepted() {
    let text = "value\tid\tchannel\tpatient_id\tsubject_group\tcell_id\r\n\
                2.0\t1\tVDAC1\tC01\tcontrol\tC01_1\r\n";
    let long = LongTable::parse(text).unwrap();
    assert_eq!(long.rows[0].key.cell_id, "C01_1");
    assert_eq!(long.rows[0].value, 2.0);
}

#[test]
fn pivot_drops_fibres_and_channels_without_measurements() {
    let text = "value\tid\tchannel\tpatient_id\tsubject_group\tcell_id\n\
                100\t1\tVDAC1\tC01\tcontrol\tC01_1\n\
                NA\t1\tSDHA\tC01\tcontrol\tC01_1\n\
                NA\t2\tVDAC1\tP01\tpatient\tP01_2\n\
                NaN\t2\tSDHA\tP01\tpatient\tP01_2\n";
    let w = WideTable::pivot(&LongTable::parse(text).unwrap());
    assert_eq!(w.len(), 1);
    assert_eq!(w.keys[0].cell_id, "C01_1");
    assert_eq!(w.channels, vec!["VDAC1".to_string()]);
    assert!(matches!(w.column("SDHA").unwrap_err(), Error::MissingChannel(_)));
}

#[test]
fn empty_input_is_an_empty_table() {
    assert!(LongTable::parse("").unwrap().rows.is_empty());
}
