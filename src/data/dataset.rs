//! Long-format fibre measurements and their wide pivot.
//!
//! The raw dataset has one row per fibre and channel. Classification works on
//! the wide form: one row per fibre, keyed by
//! `(cell_id, id, patient_id, subject_group)`, with one column per channel.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const KEY_COLUMNS: [&str; 4] = ["cell_id", "id", "patient_id", "subject_group"];

/// Download `url` into `cache` unless the file already exists.
pub fn fetch_dataset(url: &str, cache: &Path) -> Result<PathBuf> {
    if cache.is_file() {
        log::info!("using cached dataset {:?}", cache);
        return Ok(cache.to_path_buf());
    }
    log::info!("downloading dataset from {} to {:?}", url, cache);
    let body = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    let mut f = fs::File::create(cache).map_err(|e| Error::io(cache, e))?;
    f.write_all(&body).map_err(|e| Error::io(cache, e))?;
    log::debug!("wrote {} bytes to {:?}", body.len(), cache);
    Ok(cache.to_path_buf())
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    pub cell_id: String,
    pub id: String,
    pub patient_id: String,
    pub subject_group: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub key: RowKey,
    pub channel: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct LongTable {
    pub rows: Vec<LongRow>,
}

impl LongTable {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&text)
    }

    /// Parse tab-separated text with a header row. Fields may be quoted,
    /// with `""` for a literal quote. Extra columns are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Self::default());
        }
        let col = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };
        let [c_cell, c_id, c_pat, c_grp] = [
            col(KEY_COLUMNS[0])?,
            col(KEY_COLUMNS[1])?,
            col(KEY_COLUMNS[2])?,
            col(KEY_COLUMNS[3])?,
        ];
        let c_chan = col("channel")?;
        let c_val = col("value")?;
        let needed = [c_cell, c_id, c_pat, c_grp, c_chan, c_val]
            .into_iter()
            .max()
            .unwrap_or(0);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            if record.len() <= needed {
                return Err(Error::Parse {
                    line,
                    message: format!("expected at least {} fields, found {}", needed + 1, record.len()),
                });
            }
            let field = |c: usize| record.get(c).unwrap_or_default().to_string();
            let raw = record.get(c_val).unwrap_or_default();
            let value = parse_value(raw).ok_or_else(|| Error::Parse {
                line,
                message: format!("invalid value '{}'", raw),
            })?;
            rows.push(LongRow {
                key: RowKey {
                    cell_id: field(c_cell),
                    id: field(c_id),
                    patient_id: field(c_pat),
                    subject_group: field(c_grp),
                },
                channel: field(c_chan),
                value,
            });
        }
        log::debug!("parsed {} long-format rows", rows.len());
        Ok(Self { rows })
    }

    /// Drop derived channels (`LOG_*`, `MED_*`).
    pub fn retain_raw_channels(&mut self) {
        self.rows
            .retain(|r| !r.channel.contains("LOG_") && !r.channel.contains("MED_"));
    }

    /// Distinct subject ids, sorted.
    pub fn subject_ids(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.key.patient_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Subject ids that mark controls (`C` anywhere in the id).
    pub fn control_ids(&self) -> Vec<String> {
        self.subject_ids().into_iter().filter(|s| s.contains('C')).collect()
    }

    /// Subject ids that mark patients (`P` anywhere in the id).
    pub fn patient_ids(&self) -> Vec<String> {
        self.subject_ids().into_iter().filter(|s| s.contains('P')).collect()
    }
}

fn parse_value(s: &str) -> Option<f64> {
    match s {
        "" | "NA" | "NaN" | "nan" => Some(f64::NAN),
        _ => s.parse().ok(),
    }
}

/// Wide table: one row per fibre, one column per channel.
#[derive(Debug, Clone, Default)]
pub struct WideTable {
    pub keys: Vec<RowKey>,
    pub channels: Vec<String>,
    /// `values[row][channel]`, `None` where the fibre has no measurement.
    pub values: Vec<Vec<Option<f64>>>,
}

impl WideTable {
    /// Pivot long rows. Rows and channels are sorted; duplicate
    /// measurements of the same fibre and channel are averaged and NaN
    /// measurements are treated as missing. Fibres and channels without a
    /// single finite measurement are dropped.
    pub fn pivot(long: &LongTable) -> Self {
        let channels: Vec<String> = long
            .rows
            .iter()
            .filter(|r| !r.value.is_nan())
            .map(|r| r.channel.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let chan_index: BTreeMap<&str, usize> = channels
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut acc: BTreeMap<&RowKey, Vec<(f64, usize)>> = BTreeMap::new();
        for r in long.rows.iter().filter(|r| !r.value.is_nan()) {
            let cells = acc
                .entry(&r.key)
                .or_insert_with(|| vec![(0.0, 0); channels.len()]);
            let c = chan_index[r.channel.as_str()];
            cells[c].0 += r.value;
            cells[c].1 += 1;
        }

        let mut keys = Vec::with_capacity(acc.len());
        let mut values = Vec::with_capacity(acc.len());
        for (key, cells) in acc {
            keys.push(key.clone());
            values.push(
                cells
                    .into_iter()
                    .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
                    .collect(),
            );
        }
        log::info!("pivoted to {} fibres x {} channels", keys.len(), channels.len());
        Self {
            keys,
            channels,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn channel_index(&self, channel: &str) -> Result<usize> {
        self.channels
            .iter()
            .position(|c| c == channel)
            .ok_or_else(|| Error::MissingChannel(channel.to_string()))
    }

    pub fn column(&self, channel: &str) -> Result<Vec<Option<f64>>> {
        let c = self.channel_index(channel)?;
        Ok(self.values.iter().map(|row| row[c]).collect())
    }

    /// `(ln(x_channel), ln(y_channel))` per fibre. Missing or non-positive
    /// measurements give non-finite coordinates, which no polygon contains.
    pub fn log_coordinates(&self, x_channel: &str, y_channel: &str) -> Result<Vec<[f64; 2]>> {
        let cx = self.channel_index(x_channel)?;
        let cy = self.channel_index(y_channel)?;
        let ln = |v: Option<f64>| match v {
            Some(v) if v > 0.0 => v.ln(),
            _ => f64::NAN,
        };
        Ok(self
            .values
            .iter()
            .map(|row| [ln(row[cx]), ln(row[cy])])
            .collect())
    }

    /// Row indices whose subject is in `subjects`.
    pub fn rows_for_subjects(&self, subjects: &[String]) -> Vec<usize> {
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, k)| subjects.contains(&k.patient_id))
            .map(|(i, _)| i)
            .collect()
    }
}
