//! The per-protein classification workflow.
//!
//! For every protein two selection rounds are shown against the reference
//! channel: first the fibres below the control population, then the fibres
//! above it (with the first round's picks pre-coloured). The two index sets
//! become the `<protein>_down` and `<protein>_up` columns.

use std::collections::BTreeSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::app::{run_selection_round, RoundOutcome, RoundSpec};
use crate::color::Rgba;
use crate::config::Config;
use crate::data::classify::{ClassifiedTable, GroupBy, ProteinClassification, RunReport};
use crate::data::dataset::{fetch_dataset, LongTable, WideTable};
use crate::data::point_set::PointSet;
use crate::error::{Error, Result};

/// Which of the two rounds is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundKind {
    BelowControls,
    AboveControls,
}

impl RoundKind {
    pub fn title(&self) -> &'static str {
        match self {
            RoundKind::BelowControls => "Select fibres below controls",
            RoundKind::AboveControls => "Select fibres above controls",
        }
    }
}

/// Base colours for a round: the first round shows every fibre in the base
/// colour, the second marks the first round's picks as deficient.
pub fn round_colors(n: usize, base: Rgba, deficient: Rgba, marked: &BTreeSet<usize>) -> Vec<Rgba> {
    (0..n)
        .map(|i| if marked.contains(&i) { deficient } else { base })
        .collect()
}

/// Load, filter and pivot the dataset, downloading it first if needed.
pub fn prepare_table(config: &Config) -> Result<(WideTable, Vec<String>)> {
    let wf = &config.workflow;
    let path = fetch_dataset(&wf.dataset_url, &wf.cache_file)?;
    let mut long = LongTable::load(&path)?;
    long.retain_raw_channels();
    let controls = long.control_ids();
    log::info!(
        "{} subjects: {} patients, {} controls",
        long.subject_ids().len(),
        long.patient_ids().len(),
        controls.len()
    );
    Ok((WideTable::pivot(&long), controls))
}

/// Run both selection rounds for one protein through `select`, which is
/// called once per round and blocks until the user is done with it.
pub fn classify_protein<F>(
    config: &Config,
    wide: &WideTable,
    controls: &[String],
    protein: &str,
    mut select: F,
) -> Result<ProteinClassification>
where
    F: FnMut(RoundKind, RoundSpec) -> Result<RoundOutcome>,
{
    let sel = &config.selector;
    let reference = &config.workflow.reference_channel;
    let coords = wide.log_coordinates(reference, protein)?;
    let control_rows = wide.rows_for_subjects(controls);
    let control_coords: Vec<[f64; 2]> = control_rows.iter().map(|&i| coords[i]).collect();
    let n = coords.len();

    let spec = |kind: RoundKind, colors: Vec<Rgba>, selection_color: Rgba| -> Result<RoundSpec> {
        Ok(RoundSpec {
            title: format!("{} ({})", kind.title(), protein),
            x_label: format!("log({})", reference),
            y_label: format!("log({})", protein),
            points: PointSet::new(coords.clone(), colors)?,
            selection_color,
            reference: control_coords.clone(),
            config: sel.clone(),
        })
    };

    let none = BTreeSet::new();
    let below = select(
        RoundKind::BelowControls,
        spec(
            RoundKind::BelowControls,
            round_colors(n, sel.palette.base(), sel.palette.deficient(), &none),
            sel.palette.deficient(),
        )?,
    )?;
    let above = select(
        RoundKind::AboveControls,
        spec(
            RoundKind::AboveControls,
            round_colors(n, sel.palette.base(), sel.palette.deficient(), &below.selected),
            sel.palette.positive(),
        )?,
    )?;

    let class = ProteinClassification::from_selections(protein, n, &below.selected, &above.selected);
    log::info!(
        "{}: {} deficient, {} positive of {} fibres",
        protein,
        class.deficient_count(),
        class.positive_count(),
        n
    );
    Ok(class)
}

/// Run the whole interactive workflow and write every output file.
pub fn run(config: &Config) -> Result<ClassifiedTable> {
    let (wide, controls) = prepare_table(config)?;
    let mut report = RunReport::start(&config.workflow.reference_channel);
    let mut table = ClassifiedTable::new(wide);

    for protein in &config.workflow.proteins {
        let class = classify_protein(config, &table.wide, &controls, protein, |_, spec| {
            run_selection_round(spec)
        })?;
        report.record(&class);
        table.push(class);
    }
    report.finish();

    write_outputs(config, &table, &report)?;
    Ok(table)
}

/// Write the classified table, both summaries and the run report.
pub fn write_outputs(config: &Config, table: &ClassifiedTable, report: &RunReport) -> Result<()> {
    let wf = &config.workflow;
    write_file(&wf.classified_csv, |f| table.write_csv(f))?;
    write_file(&wf.summary_by_patient_csv, |f| {
        table.summarise(GroupBy::Patient).write_csv(f)
    })?;
    write_file(&wf.summary_by_type_csv, |f| {
        table.summarise(GroupBy::SubjectGroup).write_csv(f)
    })?;
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&wf.report_json, json).map_err(|e| Error::io(&wf.report_json, e))?;
    log::info!(
        "wrote {:?}, {:?}, {:?} and {:?}",
        wf.classified_csv,
        wf.summary_by_patient_csv,
        wf.summary_by_type_csv,
        wf.report_json
    );
    Ok(())
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> std::io::Result<()>,
{
    let f = fs::File::create(path).map_err(|e| Error::io(path, e))?;
    let mut w = BufWriter::new(f);
    write(&mut w)
        .and_then(|_| w.flush())
        .map_err(|e| Error::io(path, e))
}
