//! Per-protein classification columns and their CSV summaries.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::dataset::WideTable;

/// Outcome of the two selection rounds for one protein.
#[derive(Debug, Clone, PartialEq)]
pub struct ProteinClassification {
    pub protein: String,
    /// Fibres selected below the control population.
    pub down: Vec<bool>,
    /// Fibres selected above the control population.
    pub up: Vec<bool>,
}

impl ProteinClassification {
    /// Build boolean columns of length `n` from the two selected index sets.
    /// Indices outside `0..n` are ignored.
    pub fn from_selections(
        protein: &str,
        n: usize,
        deficient: &BTreeSet<usize>,
        positive: &BTreeSet<usize>,
    ) -> Self {
        let mask = |set: &BTreeSet<usize>| (0..n).map(|i| set.contains(&i)).collect::<Vec<_>>();
        Self {
            protein: protein.to_string(),
            down: mask(deficient),
            up: mask(positive),
        }
    }

    pub fn down_column(&self) -> String {
        format!("{}_down", self.protein)
    }

    pub fn up_column(&self) -> String {
        format!("{}_up", self.protein)
    }

    pub fn deficient_count(&self) -> usize {
        self.down.iter().filter(|b| **b).count()
    }

    pub fn positive_count(&self) -> usize {
        self.up.iter().filter(|b| **b).count()
    }
}

/// The wide table augmented with `_down`/`_up` columns per protein.
#[derive(Debug, Clone)]
pub struct ClassifiedTable {
    pub wide: WideTable,
    pub classes: Vec<ProteinClassification>,
}

/// Grouping key for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Patient,
    SubjectGroup,
}

impl GroupBy {
    pub fn column(&self) -> &'static str {
        match self {
            GroupBy::Patient => "patient_id",
            GroupBy::SubjectGroup => "subject_group",
        }
    }
}

impl ClassifiedTable {
    pub fn new(wide: WideTable) -> Self {
        Self {
            wide,
            classes: Vec::new(),
        }
    }

    /// Add or replace the columns of one protein.
    pub fn push(&mut self, class: ProteinClassification) {
        self.classes.retain(|c| c.protein != class.protein);
        self.classes.push(class);
    }

    /// Boolean columns in output order: `<p>_down`, `<p>_up` per protein.
    fn bool_columns(&self) -> Vec<(String, &[bool])> {
        self.classes
            .iter()
            .flat_map(|c| {
                [
                    (c.down_column(), c.down.as_slice()),
                    (c.up_column(), c.up.as_slice()),
                ]
            })
            .collect()
    }

    /// Write the full classified table. The first column is the row index.
    pub fn write_csv<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        let bools = self.bool_columns();
        let mut header = vec![String::new()];
        header.extend(super::dataset::KEY_COLUMNS.iter().map(|s| s.to_string()));
        header.extend(self.wide.channels.iter().cloned());
        header.extend(bools.iter().map(|(name, _)| name.clone()));
        writeln!(w, "{}", join_csv(header.iter().map(String::as_str)))?;

        for (i, key) in self.wide.keys.iter().enumerate() {
            let mut row = vec![
                i.to_string(),
                key.cell_id.clone(),
                key.id.clone(),
                key.patient_id.clone(),
                key.subject_group.clone(),
            ];
            row.extend(
                self.wide.values[i]
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            row.extend(bools.iter().map(|(_, col)| {
                if col.get(i).copied().unwrap_or(false) {
                    "True".to_string()
                } else {
                    "False".to_string()
                }
            }));
            writeln!(w, "{}", join_csv(row.iter().map(String::as_str)))?;
        }
        Ok(())
    }

    /// Mean of every boolean column per group, groups sorted by name.
    pub fn summarise(&self, by: GroupBy) -> Summary {
        let bools = self.bool_columns();
        let mut groups: BTreeMap<String, (Vec<usize>, usize)> = BTreeMap::new();
        for (i, key) in self.wide.keys.iter().enumerate() {
            let g = match by {
                GroupBy::Patient => &key.patient_id,
                GroupBy::SubjectGroup => &key.subject_group,
            };
            let entry = groups
                .entry(g.clone())
                .or_insert_with(|| (vec![0; bools.len()], 0));
            for (c, (_, col)) in bools.iter().enumerate() {
                if col.get(i).copied().unwrap_or(false) {
                    entry.0[c] += 1;
                }
            }
            entry.1 += 1;
        }
        Summary {
            group_column: by.column().to_string(),
            columns: bools.iter().map(|(name, _)| name.clone()).collect(),
            rows: groups
                .into_iter()
                .map(|(g, (counts, n))| {
                    let means = counts.iter().map(|&c| c as f64 / n as f64).collect();
                    (g, means)
                })
                .collect(),
        }
    }
}

/// Classification rates per group.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub group_column: String,
    pub columns: Vec<String>,
    pub rows: Vec<(String, Vec<f64>)>,
}

impl Summary {
    /// Write with every rate rounded to two decimals.
    pub fn write_csv<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        let header = std::iter::once(self.group_column.as_str())
            .chain(self.columns.iter().map(String::as_str));
        writeln!(w, "{}", join_csv(header))?;
        for (group, means) in &self.rows {
            let cells: Vec<String> = std::iter::once(group.clone())
                .chain(means.iter().map(|m| format!("{:.2}", m)))
                .collect();
            writeln!(w, "{}", join_csv(cells.iter().map(String::as_str)))?;
        }
        Ok(())
    }
}

fn join_csv<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells.map(escape_csv).collect::<Vec<_>>().join(",")
}

fn escape_csv(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Counts recorded for one protein in the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinReport {
    pub protein: String,
    pub fibres: usize,
    pub deficient: usize,
    pub positive: usize,
}

/// Summary of a classification run. Polygon geometry is not recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub reference_channel: String,
    pub proteins: Vec<ProteinReport>,
}

impl RunReport {
    pub fn start(reference_channel: &str) -> Self {
        Self {
            started_at: Local::now(),
            finished_at: None,
            reference_channel: reference_channel.to_string(),
            proteins: Vec::new(),
        }
    }

    pub fn record(&mut self, class: &ProteinClassification) {
        self.proteins.push(ProteinReport {
            protein: class.protein.clone(),
            fibres: class.down.len(),
            deficient: class.deficient_count(),
            positive: class.positive_count(),
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }
}
