//! Chart specifications handed to the rendering layer.
//!
//! The shapes follow the plotly figure schema (`{data, layout}`), so the JSON
//! can be passed to any plotly front end unchanged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// A figure with no traces whose title carries `title`.
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout::titled(title),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Choropleth(ChoroplethTrace),
    Scatter3d(Scatter3dTrace),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethTrace {
    pub locations: Vec<String>,
    pub z: Vec<f64>,
    pub text: Vec<String>,
    pub locationmode: String,
    pub colorscale: ColorScale,
    pub autocolorscale: bool,
    pub marker: ChoroplethMarker,
    pub colorbar: ColorBar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethMarker {
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBar {
    pub title: String,
}

/// `[[position, color], ...]` stops, positions in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale(pub Vec<(f64, String)>);

impl ColorScale {
    /// Light grey to deep red ramp.
    pub fn reds() -> Self {
        Self(
            [
                (0.0, "rgb(202, 202, 202)"),
                (0.2, "rgb(253, 205, 200)"),
                (0.4, "rgb(252, 169, 161)"),
                (0.6, "rgb(247, 121, 108)"),
                (0.8, "rgb(255, 39, 39)"),
                (1.0, "rgb(219, 0, 0)"),
            ]
            .iter()
            .map(|(p, c)| (*p, c.to_string()))
            .collect(),
        )
    }

    pub fn plasma() -> Self {
        Self::evenly_spaced(&[
            "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953",
            "#fb9f3a", "#fdca26", "#f0f921",
        ])
    }

    pub fn evenly_spaced(colors: &[&str]) -> Self {
        let last = colors.len().saturating_sub(1).max(1) as f64;
        Self(
            colors
                .iter()
                .enumerate()
                .map(|(i, c)| (i as f64 / last, c.to_string()))
                .collect(),
        )
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "reds" => Some(Self::reds()),
            "plasma" => Some(Self::plasma()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scatter3dTrace {
    pub name: String,
    pub legendgroup: String,
    pub mode: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub hovertext: Vec<String>,
    pub customdata: Vec<Vec<f64>>,
    pub hovertemplate: String,
    pub marker: ScatterMarker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterMarker {
    pub color: String,
    pub symbol: String,
    pub size: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<Scene>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
}

impl Layout {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub scope: String,
    pub projection: Projection,
    pub showlakes: bool,
    pub lakecolor: String,
}

impl Geo {
    pub fn usa() -> Self {
        Self {
            scope: "usa".to_string(),
            projection: Projection {
                kind: "albers usa".to_string(),
            },
            showlakes: true,
            lakecolor: "rgb(255, 255, 255)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub zaxis: Axis,
    pub camera: Camera,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub up: Vec3,
    pub center: Vec3,
    pub eye: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            up: Vec3 { x: 0.0, y: 0.0, z: 1.0 },
            center: Vec3 { x: 0.0, y: 0.0, z: 0.0 },
            eye: Vec3 { x: -1.8, y: -1.8, z: 1.5 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub b: u32,
    pub t: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub orientation: String,
    pub yanchor: String,
    pub y: f64,
    pub xanchor: String,
    pub x: f64,
}

impl Legend {
    /// Horizontal legend above the plot area, right aligned.
    pub fn horizontal_top() -> Self {
        Self {
            orientation: "h".to_string(),
            yanchor: "bottom".to_string(),
            y: 1.02,
            xanchor: "right".to_string(),
            x: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_serializes_with_type_tag() {
        let fig = Figure {
            data: vec![Trace::Choropleth(ChoroplethTrace {
                locations: vec!["CA".into()],
                z: vec![100.0],
                text: vec!["State Code: CA".into()],
                locationmode: "USA-states".into(),
                colorscale: ColorScale::reds(),
                autocolorscale: false,
                marker: ChoroplethMarker {
                    line: Line { color: "rgb(255,255,255)".into(), width: 2.0 },
                },
                colorbar: ColorBar { title: "%".into() },
            })],
            layout: Layout::titled("t"),
        };
        let v: serde_json::Value = serde_json::from_str(&fig.to_json()).unwrap();
        assert_eq!(v["data"][0]["type"], "choropleth");
        assert_eq!(v["data"][0]["colorscale"][5][1], "rgb(219, 0, 0)");
        assert!(v["layout"].get("geo").is_none());
    }

    #[test]
    fn plasma_spans_unit_interval() {
        let ColorScale(stops) = ColorScale::plasma();
        assert_eq!(stops.first().unwrap().0, 0.0);
        assert_eq!(stops.last().unwrap().0, 1.0);
        assert!(ColorScale::by_name("Reds").is_some());
        assert!(ColorScale::by_name("jet").is_none());
    }
}
