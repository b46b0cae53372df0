//! Share of a company's disputed complaints by state, and its choropleth.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chart::{
    ChoroplethMarker, ChoroplethTrace, ColorBar, ColorScale, Figure, Geo, Layout, Line, Trace,
};
use crate::data::ComplaintTable;
use crate::logging::{log_share_view, ProfileScope};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateShare {
    pub state: String,
    /// Percent of the company's disputed complaints, rounded to 2 dp.
    pub share_percent: f64,
    pub display_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareView {
    pub company: String,
    /// False when the company never appears in the table.
    pub known_company: bool,
    pub disputed: u64,
    pub rows: Vec<StateShare>,
    pub total_percent: f64,
}

/// Count disputed complaints per state for `company` and convert to shares.
///
/// Rows are sorted by disputed count descending, then state code ascending. A
/// company with no disputed complaints yields an empty row set.
pub fn compute_share_by_state(table: &ComplaintTable, company: &str) -> ShareView {
    let _scope = ProfileScope::new("share_by_state");

    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for rec in table.records() {
        if rec.disputed && rec.company == company && !rec.state.is_empty() {
            *counts.entry(rec.state.as_str()).or_default() += 1;
        }
    }
    let disputed: u64 = counts.values().sum();

    let units = largest_remainder_units(&counts, disputed);
    let mut ranked: Vec<(u64, StateShare)> = counts
        .iter()
        .zip(units)
        .map(|((state, &n), u)| {
            // Hover text shows the plainly rounded share; z carries the adjusted one.
            let rounded = round2(n as f64 * 100.0 / disputed as f64);
            let share = StateShare {
                state: state.to_string(),
                share_percent: u as f64 / 100.0,
                display_text: format!(
                    "State Code: {}<br>Share of Complaints: {}%",
                    state,
                    format_share(rounded)
                ),
            };
            (n, share)
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.state.cmp(&b.1.state)));
    let rows: Vec<StateShare> = ranked.into_iter().map(|(_, share)| share).collect();

    let total_percent = round2(rows.iter().map(|r| r.share_percent).sum());
    let known_company = table.has_company(company);
    log_share_view(company, rows.len(), disputed, known_company);

    ShareView {
        company: company.to_string(),
        known_company,
        disputed,
        rows,
        total_percent,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethStyle {
    pub colorscale: ColorScale,
    pub colorbar_title: String,
}

impl Default for ChoroplethStyle {
    fn default() -> Self {
        Self {
            colorscale: ColorScale::plasma(),
            colorbar_title: "Share of Complaints (%)".to_string(),
        }
    }
}

pub fn choropleth_figure(view: &ShareView, style: &ChoroplethStyle) -> Figure {
    let mut title = format!("Most Complaints by State <br> {}", view.company);
    if !view.known_company {
        title.push_str(" (unknown company)");
    }

    let trace = ChoroplethTrace {
        locations: view.rows.iter().map(|r| r.state.clone()).collect(),
        z: view.rows.iter().map(|r| r.share_percent).collect(),
        text: view.rows.iter().map(|r| r.display_text.clone()).collect(),
        locationmode: "USA-states".to_string(),
        colorscale: style.colorscale.clone(),
        autocolorscale: false,
        marker: ChoroplethMarker {
            line: Line {
                color: "rgb(255,255,255)".to_string(),
                width: 2.0,
            },
        },
        colorbar: ColorBar {
            title: style.colorbar_title.clone(),
        },
    };

    Figure {
        data: vec![Trace::Choropleth(trace)],
        layout: Layout {
            geo: Some(Geo::usa()),
            ..Layout::titled(title)
        },
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Splits 100.00% into hundredths of a percent across `counts`, in key order.
///
/// Each entry gets the floor of its exact share; leftover hundredths go to
/// the largest remainders (earlier keys win ties), so the shares always sum
/// to exactly 100.00 and each is within 0.01 of the exact value.
fn largest_remainder_units(counts: &BTreeMap<&str, u64>, total: u64) -> Vec<u64> {
    const FULL: u64 = 10_000;
    if total == 0 {
        return vec![0; counts.len()];
    }
    let mut units: Vec<u64> = counts.values().map(|n| n * FULL / total).collect();
    let mut by_remainder: Vec<(usize, u64)> = counts
        .values()
        .enumerate()
        .map(|(i, n)| (i, n * FULL % total))
        .collect();
    by_remainder.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let leftover = FULL - units.iter().sum::<u64>();
    for (i, _) in by_remainder.into_iter().take(leftover as usize) {
        units[i] += 1;
    }
    units
}

/// Whole numbers keep one decimal (`75.0`), others print as rounded (`33.33`).
fn format_share(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}
