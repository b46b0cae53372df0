//! Prints the figure JSON for one selection, using the env configuration.
//!
//!   render_view choropleth <company>
//!   render_view scatter <x> <y> <z>

use anyhow::{bail, Result};
use std::env;
use std::path::Path;
use std::sync::Arc;

use dispute_atlas::config::Config;
use dispute_atlas::data::{ComplaintTable, TumorTable};
use dispute_atlas::shell::{Dashboard, Selection};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cfg = Config::from_env();

    let (dashboard, selection) = match args.as_slice() {
        [view, company] if view == "choropleth" => {
            let table = ComplaintTable::load(Path::new(&cfg.complaints_csv), cfg.complaints_cleaning)?;
            (
                Dashboard::new(Some(Arc::new(table)), None, &cfg),
                Selection::Company(company.clone()),
            )
        }
        [view, x, y, z] if view == "scatter" => {
            let table = TumorTable::load(Path::new(&cfg.tumors_csv))?;
            (
                Dashboard::new(None, Some(Arc::new(table)), &cfg),
                Selection::Features([x.clone(), y.clone(), z.clone()]),
            )
        }
        _ => bail!("usage: render_view choropleth <company> | render_view scatter <x> <y> <z>"),
    };

    let figure = dashboard.render(&selection)?;
    println!("{}", serde_json::to_string_pretty(&figure)?);
    Ok(())
}
