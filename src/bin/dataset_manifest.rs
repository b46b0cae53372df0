use dispute_atlas::data::{load_table, Cleaning};
use serde_json::json;
use std::env;
use std::path::PathBuf;

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/top_100_companies_complaints.csv".to_string());
    let cleaning = match env::args().nth(2) {
        Some(raw) => match Cleaning::parse(&raw) {
            Some(c) => c,
            None => {
                eprintln!("unknown cleaning mode {:?} (expected strict or none)", raw);
                std::process::exit(2);
            }
        },
        None => Cleaning::Strict,
    };

    let (table, report) = match load_table(PathBuf::from(&path).as_path(), cleaning) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("load failed: {}", err);
            std::process::exit(1);
        }
    };

    let payload = json!({
        "report": report,
        "columns": table.columns(),
    });
    match serde_json::to_string_pretty(&payload) {
        Ok(out) => println!("{}", out),
        Err(err) => {
            eprintln!("failed to encode report: {}", err);
            std::process::exit(3);
        }
    }
}
