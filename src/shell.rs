//! Event wiring between dashboard controls and the view computers.
//!
//! Each output (a chart) is bound to a set of named inputs (dropdowns) by a
//! [`Callback`]. The host calls [`Registry::dispatch`] with the current input
//! values; handlers only read the tables they were built with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::chart::Figure;
use crate::config::Config;
use crate::data::{ComplaintTable, TumorTable};
use crate::scatter::{compute_clusters, scatter_figure};
use crate::shares::{choropleth_figure, compute_share_by_state};

pub const CHOROPLETH_OUTPUT: &str = "choropleth-map";
pub const COMPANY_INPUT: &str = "company-dropdown";
pub const SCATTER_OUTPUT: &str = "scatter-plot";
pub const FEATURE_INPUTS: [&str; 3] = ["x-feature-dropdown", "y-feature-dropdown", "z-feature-dropdown"];
pub const DEFAULT_FEATURES: [&str; 3] = ["radius_mean", "texture_mean", "perimeter_mean"];

pub type Inputs = BTreeMap<String, String>;
type Handler = Box<dyn Fn(&Inputs) -> Figure + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    UnknownOutput(String),
    MissingInput { output: String, input: String },
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::UnknownOutput(id) => write!(f, "unknown output: {}", id),
            ShellError::MissingInput { output, input } => {
                write!(f, "output {} needs input {}", output, input)
            }
        }
    }
}

impl std::error::Error for ShellError {}

/// A user's current choice for one output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Company(String),
    Features([String; 3]),
}

impl Selection {
    pub fn output(&self) -> &'static str {
        match self {
            Selection::Company(_) => CHOROPLETH_OUTPUT,
            Selection::Features(_) => SCATTER_OUTPUT,
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        match self {
            Selection::Company(company) => {
                Inputs::from([(COMPANY_INPUT.to_string(), company.clone())])
            }
            Selection::Features(features) => FEATURE_INPUTS
                .iter()
                .zip(features)
                .map(|(id, f)| (id.to_string(), f.clone()))
                .collect(),
        }
    }
}

pub struct Callback {
    pub output: String,
    pub inputs: Vec<String>,
    handler: Handler,
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("output", &self.output)
            .field("inputs", &self.inputs)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    callbacks: Vec<Callback>,
}

impl Registry {
    /// Binds `output` to `inputs`. Re-registering an output replaces it.
    pub fn register<F>(&mut self, output: &str, inputs: &[&str], handler: F)
    where
        F: Fn(&Inputs) -> Figure + Send + Sync + 'static,
    {
        self.callbacks.retain(|c| c.output != output);
        self.callbacks.push(Callback {
            output: output.to_string(),
            inputs: inputs.iter().map(|i| i.to_string()).collect(),
            handler: Box::new(handler),
        });
    }

    pub fn callbacks(&self) -> &[Callback] {
        &self.callbacks
    }

    /// Runs the callback for `output` with only its declared inputs.
    pub fn dispatch(&self, output: &str, values: &Inputs) -> Result<Figure, ShellError> {
        let cb = self
            .callbacks
            .iter()
            .find(|c| c.output == output)
            .ok_or_else(|| ShellError::UnknownOutput(output.to_string()))?;

        let mut args = Inputs::new();
        for input in &cb.inputs {
            let value = values.get(input).ok_or_else(|| ShellError::MissingInput {
                output: output.to_string(),
                input: input.clone(),
            })?;
            args.insert(input.clone(), value.clone());
        }
        Ok((cb.handler)(&args))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dropdown {
    pub id: String,
    pub label: String,
    pub options: Vec<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub id: String,
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardLayout {
    pub controls: Vec<Dropdown>,
    pub outputs: Vec<OutputSpec>,
}

/// Controls plus callbacks over the injected tables.
#[derive(Debug)]
pub struct Dashboard {
    registry: Registry,
    controls: Vec<Dropdown>,
}

impl Dashboard {
    pub fn new(
        complaints: Option<Arc<ComplaintTable>>,
        tumors: Option<Arc<TumorTable>>,
        cfg: &Config,
    ) -> Self {
        let mut registry = Registry::default();
        let mut controls = Vec::new();

        if let Some(table) = complaints {
            controls.push(Dropdown {
                id: COMPANY_INPUT.to_string(),
                label: "Select a company:".to_string(),
                options: table.companies().to_vec(),
                value: table.companies().first().cloned(),
            });
            let style = cfg.choropleth_style();
            registry.register(CHOROPLETH_OUTPUT, &[COMPANY_INPUT], move |inputs| {
                let company = inputs.get(COMPANY_INPUT).map(String::as_str).unwrap_or_default();
                choropleth_figure(&compute_share_by_state(&table, company), &style)
            });
        }

        if let Some(table) = tumors {
            let defaults = default_features(table.features());
            for ((id, axis), value) in FEATURE_INPUTS.iter().zip(["X", "Y", "Z"]).zip(defaults) {
                controls.push(Dropdown {
                    id: id.to_string(),
                    label: format!("Select {}-axis feature:", axis),
                    options: table.features().to_vec(),
                    value,
                });
            }
            let style = cfg.scatter_style();
            let params = cfg.kmeans();
            registry.register(SCATTER_OUTPUT, &FEATURE_INPUTS, move |inputs| {
                let [x, y, z] = FEATURE_INPUTS.map(|id| inputs.get(id).cloned().unwrap_or_default());
                scatter_figure(&compute_clusters(&table, &x, &y, &z, &params), &style)
            });
        }

        Self { registry, controls }
    }

    pub fn layout(&self) -> DashboardLayout {
        DashboardLayout {
            controls: self.controls.clone(),
            outputs: self
                .registry
                .callbacks()
                .iter()
                .map(|c| OutputSpec {
                    id: c.output.clone(),
                    inputs: c.inputs.clone(),
                })
                .collect(),
        }
    }

    pub fn update(&self, output: &str, inputs: &Inputs) -> Result<Figure, ShellError> {
        self.registry.dispatch(output, inputs)
    }

    pub fn render(&self, selection: &Selection) -> Result<Figure, ShellError> {
        self.update(selection.output(), &selection.to_inputs())
    }
}

/// `radius_mean`/`texture_mean`/`perimeter_mean` when present, otherwise the
/// first features in order (repeating when there are fewer than three).
pub fn default_features(features: &[String]) -> [Option<String>; 3] {
    let mut out: [Option<String>; 3] = Default::default();
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = if features.iter().any(|f| f == DEFAULT_FEATURES[i]) {
            Some(DEFAULT_FEATURES[i].to_string())
        } else if features.is_empty() {
            None
        } else {
            Some(features[i % features.len()].clone())
        };
    }
    out
}
