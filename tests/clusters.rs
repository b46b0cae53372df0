use std::collections::{BTreeMap, BTreeSet};

use dispute_atlas::chart::Trace;
use dispute_atlas::data::{Diagnosis, TumorRecord, TumorTable};
use dispute_atlas::kmeans::KMeans;
use dispute_atlas::scatter::{compute_clusters, scatter_figure, ScatterStyle, ViewError};

const FEATURES: [&str; 4] = ["radius_mean", "texture_mean", "perimeter_mean", "constant"];

/// Four tight groups far apart on radius/texture/perimeter, plus a constant column.
fn tumors() -> TumorTable {
    let centers = [(10.0, 10.0, 60.0), (25.0, 10.0, 60.0), (10.0, 30.0, 60.0), (10.0, 10.0, 160.0)];
    let mut records = Vec::new();
    for (g, (r, t, p)) in centers.iter().enumerate() {
        for i in 0..8 {
            let d = i as f64 * 0.05;
            records.push(TumorRecord {
                id: format!("{}{:02}", g, i),
                diagnosis: if g % 2 == 0 { Diagnosis::Malignant } else { Diagnosis::Benign },
                values: vec![r + d, t - d, p + d, 1.0],
            });
        }
    }
    TumorTable::from_records(FEATURES.iter().map(|s| s.to_string()).collect(), records).unwrap()
}

#[test]
fn one_assignment_per_record_with_valid_ids() {
    let table = tumors();
    let view = compute_clusters(&table, "radius_mean", "texture_mean", "perimeter_mean", &KMeans::default())
        .unwrap();
    assert_eq!(view.rows.len(), table.len());
    assert_eq!(view.cluster_count, 4);
    assert!(view.rows.iter().all(|r| r.cluster_id < 4));
    for (row, rec) in view.rows.iter().zip(table.records()) {
        assert_eq!(row.record_id, rec.id);
        assert_eq!(row.diagnosis, rec.diagnosis);
        assert_eq!([row.x, row.y, row.z], [rec.values[0], rec.values[1], rec.values[2]]);
    }
}

#[test]
fn groups_share_a_cluster_and_differ_from_each_other() {
    let view = compute_clusters(&tumors(), "radius_mean", "texture_mean", "perimeter_mean", &KMeans::default())
        .unwrap();
    let mut by_group: BTreeMap<char, BTreeSet<usize>> = BTreeMap::new();
    for row in &view.rows {
        let group = row.record_id.chars().next().unwrap();
        by_group.entry(group).or_default().insert(row.cluster_id);
    }
    assert!(by_group.values().all(|ids| ids.len() == 1), "{:?}", by_group);
    let distinct: BTreeSet<usize> = by_group.values().flatten().copied().collect();
    assert_eq!(distinct.len(), 4);
}

#[test]
fn identical_features_do_not_fail() {
    let table = tumors();
    let view = compute_clusters(&table, "radius_mean", "radius_mean", "radius_mean", &KMeans::default())
        .unwrap();
    assert_eq!(view.rows.len(), table.len());
    assert!(view.rows.iter().all(|r| r.cluster_id < 4));
    assert!(view.rows.iter().all(|r| r.x == r.y && r.y == r.z));
}

#[test]
fn constant_column_does_not_fail() {
    let table = tumors();
    let view = compute_clusters(&table, "constant", "constant", "constant", &KMeans::default()).unwrap();
    let ids: BTreeSet<usize> = view.rows.iter().map(|r| r.cluster_id).collect();
    assert_eq!(ids.len(), 1);
    assert_eq!(view.inertia, 0.0);
}

#[test]
fn same_triple_and_seed_is_reproducible() {
    let table = tumors();
    let params = KMeans::default();
    let a = compute_clusters(&table, "texture_mean", "perimeter_mean", "radius_mean", &params).unwrap();
    let b = compute_clusters(&table, "texture_mean", "perimeter_mean", "radius_mean", &params).unwrap();
    assert_eq!(a, b);
}

#[test]
fn unknown_feature_surfaces_in_title() {
    let result = compute_clusters(&tumors(), "radius_mean", "bogus", "radius_mean", &KMeans::default());
    assert_eq!(result, Err(ViewError::UnknownFeature("bogus".to_string())));
    let fig = scatter_figure(&result, &ScatterStyle::default());
    assert!(fig.data.is_empty());
    assert!(fig.layout.title.contains("unknown feature: bogus"));
}

#[test]
fn empty_table_yields_empty_view() {
    let table = TumorTable::from_records(vec!["a".to_string()], Vec::new()).unwrap();
    let view = compute_clusters(&table, "a", "a", "a", &KMeans::default()).unwrap();
    assert!(view.rows.is_empty());
    assert!(scatter_figure(&Ok(view), &ScatterStyle::default()).data.is_empty());
}

#[test]
fn figure_groups_by_diagnosis_and_cluster() {
    let result = compute_clusters(&tumors(), "radius_mean", "texture_mean", "perimeter_mean", &KMeans::default());
    let view = result.clone().unwrap();
    let fig = scatter_figure(&result, &ScatterStyle::default());

    let pairs: BTreeSet<(Diagnosis, usize)> =
        view.rows.iter().map(|r| (r.diagnosis, r.cluster_id)).collect();
    assert_eq!(fig.data.len(), pairs.len());

    let mut points = 0;
    for trace in &fig.data {
        let Trace::Scatter3d(t) = trace else {
            panic!("unexpected trace {:?}", trace);
        };
        points += t.x.len();
        let expected_color = if t.name.starts_with('M') { "red" } else { "green" };
        assert_eq!(t.marker.color, expected_color);
        assert!(["circle", "diamond", "square", "cross"].contains(&t.marker.symbol.as_str()));
        assert_eq!(t.hovertext.len(), t.x.len());
    }
    assert_eq!(points, view.rows.len());
    assert_eq!(
        fig.layout.title,
        "3D Scatterplot: radius_mean vs texture_mean vs perimeter_mean"
    );
    let scene = fig.layout.scene.as_ref().unwrap();
    assert_eq!(scene.zaxis.title, "perimeter_mean");
    assert_eq!(scene.camera.eye.x, -1.8);
}
