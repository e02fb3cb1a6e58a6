//! Configuration for the selection surface and the classification workflow.
//!
//! Everything is plain serde data so a `mitoselect.yaml` next to the dataset
//! can override any subset of the defaults.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::ClassPalette;
use crate::data::density::DensityGridSpec;
use crate::data::hotkeys::SelectorKeys;
use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "mitoselect.yaml";

// ─────────────────────────────────────────────────────────────────────────────
// Selector surface
// ─────────────────────────────────────────────────────────────────────────────

/// Appearance and interaction of the polygon selection window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Marker radius of each fibre, in points.
    pub point_radius: f32,
    /// Distance in screen pixels within which a click grabs a vertex or
    /// closes the polygon on its first vertex.
    pub vertex_grab_radius: f32,
    /// Iso-proportion levels of the control density contours.
    pub contour_levels: Vec<f64>,
    /// Density grid resolution along each axis.
    pub contour_grid: usize,
    /// Open the window maximized.
    pub maximized: bool,
    pub palette: ClassPalette,
    pub keys: SelectorKeys,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            point_radius: 2.5,
            vertex_grab_radius: 8.0,
            contour_levels: vec![0.1, 0.25, 0.5, 0.75, 0.95],
            contour_grid: 100,
            maximized: true,
            palette: ClassPalette::default(),
            keys: SelectorKeys::default(),
        }
    }
}

impl SelectorConfig {
    pub fn density_grid(&self) -> DensityGridSpec {
        DensityGridSpec {
            nx: self.contour_grid.max(2),
            ny: self.contour_grid.max(2),
            ..DensityGridSpec::default()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflow
// ─────────────────────────────────────────────────────────────────────────────

/// Inputs and outputs of a classification run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub dataset_url: String,
    /// Local cache of the dataset; downloaded only when missing.
    pub cache_file: PathBuf,
    /// Channel on the x axis of every plot.
    pub reference_channel: String,
    /// Channels classified one after another on the y axis.
    pub proteins: Vec<String>,
    pub classified_csv: PathBuf,
    pub summary_by_patient_csv: PathBuf,
    pub summary_by_type_csv: PathBuf,
    pub report_json: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            dataset_url: "https://raw.githubusercontent.com/CnrLwlss/Warren_2019/master/shiny/dat.txt"
                .to_string(),
            cache_file: PathBuf::from("dat_py.txt"),
            reference_channel: "VDAC1".to_string(),
            proteins: ["NDUFB8", "GRIM19", "SDHA", "UqCRC2", "COX4+4L2", "MTCO1", "OSCP"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            classified_csv: PathBuf::from("ClassifiedWide.csv"),
            summary_by_patient_csv: PathBuf::from("SummaryByPatient.csv"),
            summary_by_type_csv: PathBuf::from("SummaryByType.csv"),
            report_json: PathBuf::from("ClassificationReport.json"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub selector: SelectorConfig,
    pub workflow: WorkflowConfig,
}

impl Config {
    pub fn from_yaml(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml(&s)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            log::info!("loading configuration from {:?}", path);
            Self::load(path)
        } else {
            log::debug!("no configuration at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let s = serde_yaml::to_string(self)?;
        let mut f = fs::File::create(path).map_err(|e| Error::io(path, e))?;
        f.write_all(s.as_bytes()).map_err(|e| Error::io(path, e))?;
        Ok(())
    }
}
