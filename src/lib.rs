//! Derived views for the complaint and tumor dashboards.
//!
//! Datasets are loaded once ([`data`]) and injected into a [`shell::Dashboard`],
//! whose callbacks recompute a chart ([`chart::Figure`]) from the full table on
//! every selection change:
//!
//! - [`shares`]: each state's share of a company's disputed complaints
//! - [`scatter`]: k-means ([`kmeans`]) over three tumor features

pub mod chart;
pub mod config;
pub mod data;
pub mod kmeans;
pub mod logging;
pub mod scatter;
pub mod server;
pub mod shares;
pub mod shell;
