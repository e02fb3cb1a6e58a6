use std::collections::BTreeSet;
use std::fs;

use mitoselect::app::RoundOutcome;
use mitoselect::data::classify::{ClassifiedTable, RunReport};
use mitoselect::data::dataset::{LongTable, WideTable};
use mitoselect::workflow::{classify_protein, round_colors, write_outputs, RoundKind};
use mitoselect::{Config, Error, Rgba};

const SAMPLE: &str = "\
value\tid\tchannel\tpatient_id\tsubject_group\tcell_id
100\t1\tVDAC1\tC01\tcontrol\tC01_1
50\t1\tNDUFB8\tC01\tcontrol\tC01_1
110\t2\tVDAC1\tC01\tcontrol\tC01_2
55\t2\tNDUFB8\tC01\tcontrol\tC01_2
200\t3\tVDAC1\tP01\tpatient\tP01_3
5\t3\tNDUFB8\tP01\tpatient\tP01_3
150\t4\tVDAC1\tP01\tpatient\tP01_4
400\t4\tNDUFB8\tP01\tpatient\tP01_4
";

fn prepared() -> (WideTable, Vec<String>) {
    let long = LongTable::parse(SAMPLE).unwrap();
    let controls = long.control_ids();
    (WideTable::pivot(&long), controls)
}

#[test]
fn round_colors_mark_previous_selection() {
    let colors = round_colors(3, Rgba::BLACK, Rgba::RED, &BTreeSet::from([2]));
    assert_eq!(colors, vec![Rgba::BLACK, Rgba::BLACK, Rgba::RED]);
}

#[test]
fn two_rounds_produce_down_and_up_columns() {
    let config = Config::default();
    let (wide, controls) = prepared();
    let palette = config.selector.palette.clone();
    let mut seen = Vec::new();

    let class = classify_protein(&config, &wide, &controls, "NDUFB8", |kind, round| {
        assert_eq!(round.points.count(), 4);
        assert_eq!(round.reference.len(), 2);
        assert_eq!(round.x_label, "log(VDAC1)");
        assert_eq!(round.y_label, "log(NDUFB8)");
        seen.push((kind, round.points.base_colors().to_vec(), round.selection_color));
        let selected = match kind {
            RoundKind::BelowControls => BTreeSet::from([2]),
            RoundKind::AboveControls => BTreeSet::from([3]),
        };
        Ok(RoundOutcome {
            selected,
            completions: 1,
        })
    })
    .unwrap();

    assert_eq!(class.down, vec![false, false, true, false]);
    assert_eq!(class.up, vec![false, false, false, true]);

    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, RoundKind::BelowControls);
    assert!(seen[0].1.iter().all(|c| *c == palette.base()));
    assert_eq!(seen[0].2, palette.deficient());
    assert_eq!(seen[1].0, RoundKind::AboveControls);
    assert_eq!(seen[1].1[2], palette.deficient());
    assert_eq!(seen[1].1[3], palette.base());
    assert_eq!(seen[1].2, palette.positive());
}

#[test]
fn selector_errors_abort_classification() {
    let config = Config::default();
    let (wide, controls) = prepared();
    let err = classify_protein(&config, &wide, &controls, "NDUFB8", |_, _| {
        Err(Error::Ui("window failed".to_string()))
    })
    .unwrap_err();
    assert!(matches!(err, Error::Ui(_)));
}

#[test]
fn unknown_protein_is_reported_before_any_round() {
    let config = Config::default();
    let (wide, controls) = prepared();
    let mut rounds = 0;
    let err = classify_protein(&config, &wide, &controls, "SDHA", |_, _| {
        rounds += 1;
        Ok(RoundOutcome::default())
    })
    .unwrap_err();
    assert!(matches!(err, Error::MissingChannel(_)));
    assert_eq!(rounds, 0);
}

#[test]
fn outputs_are_written_to_configured_paths() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.workflow.classified_csv = dir.path().join("wide.csv");
    config.workflow.summary_by_patient_csv = dir.path().join("by_patient.csv");
    config.workflow.summary_by_type_csv = dir.path().join("by_type.csv");
    config.workflow.report_json = dir.path().join("report.json");

    let (wide, controls) = prepared();
    let class = classify_protein(&config, &wide, &controls, "NDUFB8", |kind, _| {
        Ok(RoundOutcome {
            selected: match kind {
                RoundKind::BelowControls => BTreeSet::from([2]),
                RoundKind::AboveControls => BTreeSet::new(),
            },
            completions: 1,
        })
    })
    .unwrap();
    let mut report = RunReport::start("VDAC1");
    report.record(&class);
    report.finish();
    let mut table = ClassifiedTable::new(wide);
    table.push(class);

    write_outputs(&config, &table, &report).unwrap();

    let wide_csv = fs::read_to_string(&config.workflow.classified_csv).unwrap();
    assert!(wide_csv.starts_with(",cell_id,id,patient_id,subject_group,NDUFB8,VDAC1,NDUFB8_down,NDUFB8_up\n"));
    assert_eq!(wide_csv.lines().count(), 5);

    let by_patient = fs::read_to_string(&config.workflow.summary_by_patient_csv).unwrap();
    assert_eq!(
        by_patient,
        "patient_id,NDUFB8_down,NDUFB8_up\nC01,0.00,0.00\nP01,0.50,0.00\n"
    );
    let by_type = fs::read_to_string(&config.workflow.summary_by_type_csv).unwrap();
    assert!(by_type.starts_with("subject_group,"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.workflow.report_json).unwrap()).unwrap();
    assert_eq!(json["proteins"][0]["deficient"], 1);
}
