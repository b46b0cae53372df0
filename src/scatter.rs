//! K-means partition over three selected tumor features, and its 3D scatter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::chart::{
    Axis, Camera, Figure, Layout, Legend, Margin, Scatter3dTrace, ScatterMarker, Scene, Trace,
};
use crate::data::{Diagnosis, TumorTable};
use crate::kmeans::KMeans;
use crate::logging::{log_cluster_fit, ProfileScope};

/// Marker symbol per cluster id, wrapping when there are more clusters.
pub const CLUSTER_SYMBOLS: [&str; 4] = ["circle", "diamond", "square", "cross"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    UnknownFeature(String),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::UnknownFeature(name) => write!(f, "unknown feature: {}", name),
        }
    }
}

impl std::error::Error for ViewError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub record_id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub diagnosis: Diagnosis,
    pub cluster_id: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterView {
    pub features: [String; 3],
    pub cluster_count: usize,
    pub inertia: f64,
    pub rows: Vec<ClusterAssignment>,
}

/// Fits `params` over the `[x, y, z]` columns and labels every record.
///
/// Any of the three names may repeat; the fit then runs on a degenerate
/// embedding and still returns one assignment per record.
pub fn compute_clusters(
    table: &TumorTable,
    x: &str,
    y: &str,
    z: &str,
    params: &KMeans,
) -> Result<ClusterView, ViewError> {
    let _scope = ProfileScope::new("compute_clusters");

    let mut idx = [0usize; 3];
    for (slot, name) in idx.iter_mut().zip([x, y, z]) {
        *slot = table
            .feature_index(name)
            .ok_or_else(|| ViewError::UnknownFeature(name.to_string()))?;
    }

    let points: Vec<[f64; 3]> = table
        .records()
        .iter()
        .map(|r| [r.values[idx[0]], r.values[idx[1]], r.values[idx[2]]])
        .collect();
    let fit = params.fit(&points);
    log_cluster_fit(&[x, y, z], points.len(), fit.inertia, fit.n_iter);

    let rows = table
        .records()
        .iter()
        .zip(&points)
        .zip(&fit.labels)
        .map(|((rec, p), &cluster_id)| ClusterAssignment {
            record_id: rec.id.clone(),
            x: p[0],
            y: p[1],
            z: p[2],
            diagnosis: rec.diagnosis,
            cluster_id,
        })
        .collect();

    Ok(ClusterView {
        features: [x.to_string(), y.to_string(), z.to_string()],
        cluster_count: params.n_clusters.max(1),
        inertia: fit.inertia,
        rows,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterStyle {
    pub malignant_color: String,
    pub benign_color: String,
    pub marker_size: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for ScatterStyle {
    fn default() -> Self {
        Self {
            malignant_color: "red".to_string(),
            benign_color: "green".to_string(),
            marker_size: 5.0,
            width: 800,
            height: 800,
        }
    }
}

impl ScatterStyle {
    pub fn color(&self, diagnosis: Diagnosis) -> &str {
        match diagnosis {
            Diagnosis::Malignant => &self.malignant_color,
            Diagnosis::Benign => &self.benign_color,
        }
    }
}

pub fn cluster_symbol(cluster_id: usize) -> &'static str {
    CLUSTER_SYMBOLS[cluster_id % CLUSTER_SYMBOLS.len()]
}

/// One trace per (diagnosis, cluster) pair present, malignant first.
/// An `Err` renders as an empty figure titled with the error.
pub fn scatter_figure(result: &Result<ClusterView, ViewError>, style: &ScatterStyle) -> Figure {
    let view = match result {
        Ok(view) => view,
        Err(err) => return Figure::empty(format!("3D Scatterplot: {}", err)),
    };
    let [fx, fy, fz] = &view.features;

    let mut groups: BTreeMap<(Diagnosis, usize), Vec<&ClusterAssignment>> = BTreeMap::new();
    for row in &view.rows {
        groups.entry((row.diagnosis, row.cluster_id)).or_default().push(row);
    }

    let hovertemplate = format!(
        "<b>%{{hovertext}}</b><br>{}=%{{x}}<br>{}=%{{y}}<br>{}=%{{z}}<br>cluster=%{{customdata[0]}}<extra></extra>",
        fx, fy, fz
    );
    let data = groups
        .into_iter()
        .map(|((diagnosis, cluster), rows)| {
            Trace::Scatter3d(Scatter3dTrace {
                name: format!("{}, {}", diagnosis.code(), cluster),
                legendgroup: format!("{}, {}", diagnosis.code(), cluster),
                mode: "markers".to_string(),
                x: rows.iter().map(|r| r.x).collect(),
                y: rows.iter().map(|r| r.y).collect(),
                z: rows.iter().map(|r| r.z).collect(),
                hovertext: rows.iter().map(|r| r.record_id.clone()).collect(),
                customdata: rows.iter().map(|r| vec![r.cluster_id as f64]).collect(),
                hovertemplate: hovertemplate.clone(),
                marker: ScatterMarker {
                    color: style.color(diagnosis).to_string(),
                    symbol: cluster_symbol(cluster).to_string(),
                    size: style.marker_size,
                },
            })
        })
        .collect();

    Figure {
        data,
        layout: Layout {
            scene: Some(Scene {
                xaxis: Axis { title: fx.clone() },
                yaxis: Axis { title: fy.clone() },
                zaxis: Axis { title: fz.clone() },
                camera: Camera::default(),
            }),
            width: Some(style.width),
            height: Some(style.height),
            margin: Some(Margin { l: 0, r: 0, b: 0, t: 50 }),
            legend: Some(Legend::horizontal_top()),
            ..Layout::titled(format!("3D Scatterplot: {} vs {} vs {}", fx, fy, fz))
        },
    }
}
