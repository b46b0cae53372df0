use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use dispute_atlas::config::Config;
use dispute_atlas::data::{ComplaintTable, TumorTable};
use dispute_atlas::logging::{log, log_fatal, obj, v_str, Domain, Level};
use dispute_atlas::server;
use dispute_atlas::shell::Dashboard;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Nothing is served until every configured dataset has loaded.
    let complaints = match cfg.complaints_csv.as_str() {
        "" => None,
        path => Some(Arc::new(
            ComplaintTable::load(Path::new(path), cfg.complaints_cleaning)
                .inspect_err(|err| log_fatal("complaints_load_failed", &err.to_string()))?,
        )),
    };
    let tumors = match cfg.tumors_csv.as_str() {
        "" => None,
        path => Some(Arc::new(
            TumorTable::load(Path::new(path))
                .inspect_err(|err| log_fatal("tumors_load_failed", &err.to_string()))?,
        )),
    };
    if complaints.is_none() && tumors.is_none() {
        log_fatal("no_datasets", "set COMPLAINTS_CSV and/or TUMORS_CSV");
        anyhow::bail!("no datasets configured");
    }

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("complaints", v_str(&cfg.complaints_csv)),
            ("tumors", v_str(&cfg.tumors_csv)),
            ("addr", v_str(&cfg.bind_addr())),
        ]),
    );

    let dashboard = Arc::new(Dashboard::new(complaints, tumors, &cfg));
    server::serve(dashboard, &cfg.bind_addr()).await
}
