use dispute_atlas::chart::Trace;
use dispute_atlas::data::{ComplaintRecord, ComplaintTable};
use dispute_atlas::shares::{choropleth_figure, compute_share_by_state, ChoroplethStyle};

fn repeat(out: &mut Vec<ComplaintRecord>, company: &str, state: &str, disputed: bool, n: usize) {
    for _ in 0..n {
        out.push(ComplaintRecord::new(company, state, disputed));
    }
}

fn acme_table() -> ComplaintTable {
    let mut rows = Vec::new();
    repeat(&mut rows, "Acme", "CA", true, 3);
    repeat(&mut rows, "Acme", "NY", true, 1);
    repeat(&mut rows, "Acme", "CA", false, 5);
    repeat(&mut rows, "Quiet Co", "TX", false, 4);
    ComplaintTable::from_records(rows)
}

/// Deterministic spread of companies over states with awkward ratios.
fn wide_table() -> ComplaintTable {
    let states = ["AL", "AK", "AZ", "CA", "CO", "FL", "GA", "NY", "TX", "WA", "OR"];
    let mut rows = Vec::new();
    for c in 0..12usize {
        let company = format!("Company {}", c);
        for (s, state) in states.iter().enumerate().take(c + 1) {
            let n = (c * 7 + s * 3) % 5 + 1;
            repeat(&mut rows, &company, state, true, n);
            repeat(&mut rows, &company, state, false, s % 3);
        }
    }
    ComplaintTable::from_records(rows)
}

#[test]
fn three_to_one_split() {
    let view = compute_share_by_state(&acme_table(), "Acme");
    let pairs: Vec<(&str, f64)> = view
        .rows
        .iter()
        .map(|r| (r.state.as_str(), r.share_percent))
        .collect();
    assert_eq!(pairs, vec![("CA", 75.0), ("NY", 25.0)]);
    assert_eq!(view.disputed, 4);
    assert_eq!(view.total_percent, 100.0);
    assert_eq!(view.rows[0].display_text, "State Code: CA<br>Share of Complaints: 75.0%");
}

#[test]
fn company_without_disputes_is_empty() {
    let view = compute_share_by_state(&acme_table(), "Quiet Co");
    assert!(view.rows.is_empty());
    assert!(view.known_company);
    assert_eq!(view.total_percent, 0.0);

    let fig = choropleth_figure(&view, &ChoroplethStyle::default());
    match &fig.data[0] {
        Trace::Choropleth(t) => assert!(t.locations.is_empty() && t.z.is_empty()),
        other => panic!("unexpected trace {:?}", other),
    }
}

#[test]
fn unknown_company_degrades_to_empty_chart() {
    let view = compute_share_by_state(&acme_table(), "Nobody Inc");
    assert!(view.rows.is_empty());
    assert!(!view.known_company);
    let fig = choropleth_figure(&view, &ChoroplethStyle::default());
    assert!(fig.layout.title.contains("Nobody Inc"));
    assert!(fig.layout.title.contains("unknown company"));
}

#[test]
fn shares_sum_to_one_hundred_for_every_company() {
    let table = wide_table();
    for company in table.companies() {
        let view = compute_share_by_state(&table, company);
        let sum: f64 = view.rows.iter().map(|r| r.share_percent).sum();
        assert!((sum - 100.0).abs() <= 0.01, "{}: sum {}", company, sum);
        for r in &view.rows {
            assert_eq!((r.share_percent * 100.0).round() / 100.0, r.share_percent);
        }
    }
}

#[test]
fn shares_sorted_descending() {
    let table = wide_table();
    for company in table.companies() {
        let view = compute_share_by_state(&table, company);
        for pair in view.rows.windows(2) {
            assert!(pair[0].share_percent >= pair[1].share_percent, "{:?}", pair);
        }
    }
}

#[test]
fn repeated_calls_are_identical() {
    let table = wide_table();
    let a = compute_share_by_state(&table, "Company 9");
    let b = compute_share_by_state(&table, "Company 9");
    assert_eq!(a, b);
    let bits = |v: &dispute_atlas::shares::ShareView| -> Vec<u64> {
        v.rows.iter().map(|r| r.share_percent.to_bits()).collect()
    };
    assert_eq!(bits(&a), bits(&b));
}

#[test]
fn rows_with_missing_state_are_ignored() {
    let mut rows = Vec::new();
    repeat(&mut rows, "Acme", "CA", true, 1);
    repeat(&mut rows, "Acme", "", true, 3);
    let view = compute_share_by_state(&ComplaintTable::from_records(rows), "Acme");
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].share_percent, 100.0);
}

#[test]
fn figure_encodes_states_and_shares() {
    let view = compute_share_by_state(&acme_table(), "Acme");
    let fig = choropleth_figure(&view, &ChoroplethStyle::default());
    assert_eq!(fig.layout.title, "Most Complaints by State <br> Acme");
    let geo = fig.layout.geo.as_ref().unwrap();
    assert_eq!(geo.scope, "usa");
    assert_eq!(geo.projection.kind, "albers usa");
    match &fig.data[0] {
        Trace::Choropleth(t) => {
            assert_eq!(t.locations, vec!["CA", "NY"]);
            assert_eq!(t.z, vec![75.0, 25.0]);
            assert_eq!(t.locationmode, "USA-states");
            assert_eq!(t.text.len(), 2);
        }
        other => panic!("unexpected trace {:?}", other),
    }
}
