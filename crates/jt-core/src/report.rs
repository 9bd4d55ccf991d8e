//! Reports for calibration, queries, and self-checks.
//!
//! Each report is a plain data struct that serializes to JSON and renders
//! to text. Tables list variables by display name in ascending id order
//! with the highest id varying fastest.

use chrono::{DateTime, Utc};
use jt_common::{Result, RunId, SCHEMA_VERSION};
use jt_config::{ModelSnapshot, ModelSource};
use jt_math::{Factor, VarId};
use serde::Serialize;
use std::fmt::{self, Write as _};

use crate::calibrate::CalibratedPotentials;
use crate::model::InferenceModel;

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Which model a report was computed from.
#[derive(Debug, Clone, Serialize)]
pub struct ModelProvenance {
    pub source: ModelSource,
    pub sha256: String,
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ModelProvenance {
    pub fn from_snapshot(snapshot: &ModelSnapshot) -> Self {
        Self {
            source: snapshot.source.clone(),
            sha256: snapshot.sha256.clone(),
            schema_version: snapshot.schema_version.clone(),
            description: snapshot.model.description.clone(),
        }
    }
}

/// Fields shared by every report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportHeader {
    pub schema_version: String,
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    pub model: ModelProvenance,
}

impl ReportHeader {
    pub fn new(model: ModelProvenance) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            run_id: RunId::new(),
            generated_at: Utc::now(),
            model,
        }
    }

    fn render(&self, title: &str, out: &mut String) -> fmt::Result {
        writeln!(out, "# {title} ({})", self.run_id)?;
        writeln!(out, "model: {}", self.model.source)?;
        writeln!(out, "sha256: {}", self.model.sha256)?;
        writeln!(out)
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub values: Vec<usize>,
    pub p: f64,
}

/// A factor rendered with variable names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeliefTable {
    pub variables: Vec<String>,
    pub ids: Vec<u32>,
    pub rows: Vec<TableRow>,
}

impl BeliefTable {
    pub fn from_factor(factor: &Factor, model: &InferenceModel) -> Self {
        let vars: Vec<VarId> = factor.scope().vars().collect();
        let rows = factor
            .entries()
            .map(|(assignment, p)| TableRow {
                values: assignment.iter().map(|(_, x)| x).collect(),
                p,
            })
            .collect();
        Self {
            variables: vars.iter().map(|&v| model.name(v)).collect(),
            ids: vars.iter().map(|v| v.0).collect(),
            rows,
        }
    }

    fn render(&self, out: &mut String) -> fmt::Result {
        for name in &self.variables {
            write!(out, "{name:>4}")?;
        }
        writeln!(out, " | p")?;
        for row in &self.rows {
            for x in &row.values {
                write!(out, "{x:>4}")?;
            }
            writeln!(out, " | {:.6}", row.p)?;
        }
        Ok(())
    }
}

/// One clique or sepset belief with its single-variable marginals.
#[derive(Debug, Clone, Serialize)]
pub struct BeliefSummary {
    pub label: String,
    pub joint: BeliefTable,
    pub marginals: Vec<BeliefTable>,
}

impl BeliefSummary {
    pub fn build(label: String, belief: &Factor, model: &InferenceModel) -> Result<Self> {
        let marginals = belief
            .scope()
            .vars()
            .map(|v| Ok(BeliefTable::from_factor(&belief.marginal_of(v)?, model)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            label,
            joint: BeliefTable::from_factor(belief, model),
            marginals,
        })
    }

    fn render(&self, heading: &str, out: &mut String) -> fmt::Result {
        writeln!(out, "{heading} ({}):", self.label)?;
        self.joint.render(out)?;
        writeln!(out, "corresponding marginals:")?;
        for marginal in &self.marginals {
            marginal.render(out)?;
        }
        writeln!(out)
    }
}

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CalibrationReport {
    #[serde(flatten)]
    pub header: ReportHeader,
    pub cliques: Vec<BeliefSummary>,
    pub sepsets: Vec<BeliefSummary>,
    pub max_sepset_discrepancy: f64,
}

impl CalibrationReport {
    pub fn build(
        provenance: ModelProvenance,
        model: &InferenceModel,
        potentials: &CalibratedPotentials,
    ) -> Result<Self> {
        let cliques = potentials
            .betas()
            .iter()
            .enumerate()
            .map(|(i, beta)| BeliefSummary::build(format!("clique {i}"), beta, model))
            .collect::<Result<Vec<_>>>()?;
        let sepsets = potentials
            .sepsets()
            .map(|((i, j), mu)| BeliefSummary::build(format!("sepset {i}-{j}"), mu, model))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            header: ReportHeader::new(provenance),
            cliques,
            sepsets,
            max_sepset_discrepancy: potentials.max_sepset_discrepancy()?,
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> fmt::Result {
        self.header.render("calibration", out)?;
        for clique in &self.cliques {
            clique.render("joint from clique node", out)?;
        }
        for sepset in &self.sepsets {
            sepset.render("sepset joint", out)?;
        }
        writeln!(
            out,
            "max sepset discrepancy: {:e}",
            self.max_sepset_discrepancy
        )
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    #[serde(flatten)]
    pub header: ReportHeader,
    pub variables: Vec<String>,
    pub order: Vec<String>,
    pub normalized: bool,
    /// Mass of the joint before any normalization.
    pub total: f64,
    pub joint: BeliefTable,
}

impl QueryReport {
    pub fn build(
        provenance: ModelProvenance,
        model: &InferenceModel,
        order: &[VarId],
        joint: &Factor,
        normalized: bool,
    ) -> Self {
        let total = joint.total();
        let shown = if normalized {
            joint.normalized()
        } else {
            joint.clone()
        };
        Self {
            header: ReportHeader::new(provenance),
            variables: joint.scope().vars().map(|v| model.name(v)).collect(),
            order: order.iter().map(|&v| model.name(v)).collect(),
            normalized,
            total,
            joint: BeliefTable::from_factor(&shown, model),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> fmt::Result {
        self.header.render("query", out)?;
        writeln!(out, "query: {}", self.variables.join(", "))?;
        if !self.order.is_empty() {
            writeln!(out, "order: {}", self.order.join(", "))?;
        }
        writeln!(out, "total: {:.6}", self.total)?;
        self.joint.render(out)
    }
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Failed,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Ok => write!(f, "ok"),
            CheckStatus::Failed => write!(f, "FAILED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub check: String,
    pub status: CheckStatus,
    /// Measured discrepancy.
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    #[serde(flatten)]
    pub header: ReportHeader,
    pub status: CheckStatus,
    pub tolerance: f64,
    pub checks: Vec<CheckResult>,
}

impl CheckReport {
    pub fn new(provenance: ModelProvenance, tolerance: f64, checks: Vec<CheckResult>) -> Self {
        let status = if checks.iter().all(|c| c.status == CheckStatus::Ok) {
            CheckStatus::Ok
        } else {
            CheckStatus::Failed
        };
        Self {
            header: ReportHeader::new(provenance),
            status,
            tolerance,
            checks,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Ok
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> fmt::Result {
        self.header.render("check", out)?;
        for c in &self.checks {
            writeln!(out, "{:<28} {:>6}  {:e}", c.check, c.status.to_string(), c.value)?;
        }
        writeln!(out, "\nstatus: {} (tolerance {:e})", self.status, self.tolerance)
    }
}
