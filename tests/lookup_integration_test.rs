//! Integration tests for forward lookups: grid modes and cross lookups.

mod fixture;

use approx::assert_relative_eq;
use gmid_lookup::lookup::{forward_lookup, lookup};
use gmid_lookup::stats::Stats;
use gmid_lookup::{
    Axes, Axis, CharacterizationTable, LookupError, LookupRequest, Method, Quantity, QuantitySpec,
};
use ndarray::Array4;

// ── Helpers ─────────────────────────────────────────────────────────

/// Compare two arrays elementwise, treating NaN == NaN.
fn assert_same(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        if x.is_nan() || y.is_nan() {
            assert!(x.is_nan() && y.is_nan(), "{x} vs {y}");
        } else {
            assert_relative_eq!(*x, *y, max_relative = 1e-12);
        }
    }
}

fn values(result: &ndarray::ArrayD<f64>) -> Vec<f64> {
    result.iter().copied().collect()
}

// ── Grid lookups ────────────────────────────────────────────────────

#[test]
fn test_every_quantity_has_default_shape() {
    let table = fixture::scenario_table();
    let n_vgs = table.axis(Axis::Vgs).len();
    for q in Quantity::ALL {
        let result = lookup(&table, q.name(), &[]).unwrap();
        assert_eq!(result.shape(), &[n_vgs], "quantity {}", q);
    }
}

#[test]
fn test_scenario_id_monotone_in_vgs() {
    let table = fixture::scenario_table();
    let id = lookup(&table, "ID", &[("L", "0.18"), ("VDS", "0.6")]).unwrap();
    assert_eq!(id.shape(), &[6]);
    let id = values(&id);
    assert!(id.iter().all(|v| v.is_finite()));
    assert!(id.windows(2).all(|w| w[1] >= w[0]), "{id:?}");
}

#[test]
fn test_grid_points_match_table() {
    let table = fixture::scenario_table();
    let gm = lookup(&table, "GM", &[("L", "0.35"), ("VDS", "0.3")]).unwrap();
    let stored = table.base(Quantity::Gm).unwrap();
    for (j, v) in gm.iter().enumerate() {
        assert_relative_eq!(*v, stored[[1, j, 0, 0]], max_relative = 1e-12);
    }
}

#[test]
fn test_ratio_identity() {
    let table = fixture::dense_table();
    let args = [("L", "0.18, 0.35"), ("VDS", "0.6"), ("VSB", "0.2")];
    let ratio = lookup(&table, "GDS_GM", &args).unwrap();
    let gds = values(&lookup(&table, "GDS", &args).unwrap());
    let gm = values(&lookup(&table, "GM", &args).unwrap());
    assert_eq!(ratio.shape(), &[21, 2]);
    let expected: Vec<f64> = gds.iter().zip(&gm).map(|(a, b)| a / b).collect();
    assert_same(&values(&ratio), &expected);
}

#[test]
fn test_zero_denominator_gives_nan() {
    let table = fixture::scenario_table();
    let result = lookup(&table, "GM_IGD", &[("L", "0.18")]).unwrap();
    assert!(result.iter().all(|v| v.is_nan()));
}

#[test]
fn test_width_substitution() {
    let table = fixture::scenario_table();
    let id_w = values(&lookup(&table, "ID_W", &[("L", "0.18")]).unwrap());
    let id = values(&lookup(&table, "ID", &[("L", "0.18")]).unwrap());
    let expected: Vec<f64> = id.iter().map(|v| v / fixture::WIDTH).collect();
    assert_same(&id_w, &expected);
}

#[test]
fn test_two_swept_axes_orientation() {
    let table = fixture::scenario_table();
    let result = lookup(&table, "ID", &[("L", "0.18,0.35")]).unwrap();
    // (L, VGS) squeezed then reversed to (VGS, L)
    assert_eq!(result.shape(), &[6, 2]);
    let stored = table.base(Quantity::Id).unwrap();
    // default VDS is half the largest VDS: 0.3, the first grid point
    assert_relative_eq!(result[[5, 1]], stored[[1, 5, 0, 0]], max_relative = 1e-12);
}

#[test]
fn test_scalar_result_is_one_element_array() {
    let table = fixture::scenario_table();
    let result = lookup(&table, "ID", &[("L", "0.18"), ("VGS", "0.5"), ("VDS", "0.6")]).unwrap();
    assert_eq!(result.shape(), &[1]);
    assert!(result[[0]].is_finite());
}

#[test]
fn test_outside_hull_is_nan_not_error() {
    let table = fixture::scenario_table();
    let result = lookup(&table, "ID", &[("VGS", "0.9, 1.2"), ("VDS", "0.6")]).unwrap();
    assert!(result[[0]].is_finite());
    assert!(result[[1]].is_nan());
}

#[test]
fn test_range_query() {
    let table = fixture::dense_table();
    let result = lookup(&table, "GM_ID", &[("VGS", "0.2:0.1:0.75"), ("VDS", "0.6")]).unwrap();
    assert_eq!(result.shape(), &[6]);
    let v = values(&result);
    assert!(v.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_unknown_quantity_rejected() {
    let table = fixture::scenario_table();
    let err = lookup(&table, "FOO_ID", &[]).unwrap_err();
    assert!(matches!(err, LookupError::UnknownQuantity(_)));
}

#[test]
fn test_missing_quantity_is_data_unavailable() {
    let table = fixture::dense_table_without(&[Quantity::Cgg]);
    let err = lookup(&table, "CGG", &[]).unwrap_err();
    assert!(matches!(err, LookupError::DataUnavailable(_)));
}

// ── Cross lookups ───────────────────────────────────────────────────

/// gm/ID and gm/Cgg at L=0.18, VDS=0.6, VSB=0 for every VGS grid point.
fn knots(table: &gmid_lookup::CharacterizationTable) -> (Vec<f64>, Vec<f64>) {
    let id = table.base(Quantity::Id).unwrap();
    let gm = table.base(Quantity::Gm).unwrap();
    let cgg = table.base(Quantity::Cgg).unwrap();
    let n = table.axis(Axis::Vgs).len();
    let gm_id = (0..n).map(|j| gm[[0, j, 2, 0]] / id[[0, j, 2, 0]]).collect();
    let gm_cgg = (0..n).map(|j| gm[[0, j, 2, 0]] / cgg[[0, j, 2, 0]]).collect();
    (gm_id, gm_cgg)
}

#[test]
fn test_cross_lookup_hits_knots() {
    let table = fixture::dense_table();
    let (gm_id, gm_cgg) = knots(&table);
    let picks = [4, 8, 12];
    let request = LookupRequest::new("GM_CGG".parse().unwrap())
        .with_input("GM_ID".parse().unwrap(), picks.iter().map(|&j| gm_id[j]).collect())
        .with_axis(Axis::L, vec![0.18])
        .with_axis(Axis::Vds, vec![0.6]);
    let result = forward_lookup(&table, &request, None).unwrap();
    assert_eq!(result.shape(), &[3]);
    for (k, &j) in picks.iter().enumerate() {
        assert_relative_eq!(result[[k]], gm_cgg[j], max_relative = 1e-9);
    }
}

#[test]
fn test_cross_lookup_between_knots_is_bracketed() {
    let table = fixture::dense_table();
    let (gm_id, gm_cgg) = knots(&table);
    let x = (0.5 * (gm_id[6] + gm_id[7])).to_string();
    let result = lookup(
        &table,
        "GM_CGG",
        &[("GM_ID", x.as_str()), ("L", "0.18"), ("VDS", "0.6")],
    )
    .unwrap();
    let (lo, hi) = (gm_cgg[6].min(gm_cgg[7]), gm_cgg[6].max(gm_cgg[7]));
    assert!(result[[0]] >= lo && result[[0]] <= hi);
}

#[test]
fn test_cross_lookup_sweep_rows() {
    let table = fixture::dense_table();
    let result = lookup(
        &table,
        "GM_CGG",
        &[("GM_ID", "5, 10, 20"), ("L", "0.18, 0.35")],
    )
    .unwrap();
    assert_eq!(result.shape(), &[2, 3]);
    assert!(result.iter().all(|v| v.is_finite()));
}

#[test]
fn test_cross_lookup_outside_curve_is_nan() {
    let table = fixture::dense_table();
    let result = lookup(&table, "GM_CGG", &[("GM_ID", "1, 10, 100")]).unwrap();
    let v = values(&result);
    assert!(v[0].is_nan());
    assert!(v[1].is_finite());
    assert!(v[2].is_nan());
}

#[test]
fn test_cross_lookup_snaps_to_nearest_grid_point() {
    let table = fixture::scenario_table();
    let snapped = lookup(&table, "GM_CGG", &[("GM_ID", "12"), ("VDS", "0.29, 0.61")]).unwrap();
    let exact = lookup(&table, "GM_CGG", &[("GM_ID", "12"), ("VDS", "0.3, 0.6")]).unwrap();
    assert_eq!(snapped.shape(), &[2]);
    assert_same(&values(&snapped), &values(&exact));
}

#[test]
fn test_cross_lookup_zero_ratio_rows_are_nan() {
    let table = fixture::scenario_table();
    // GM_IGD is NaN everywhere, so every row's curve is empty
    let result = lookup(&table, "GM_IGD", &[("GM_ID", "10, 20"), ("L", "0.18,0.35")]).unwrap();
    assert_eq!(result.shape(), &[2, 2]);
    assert!(result.iter().all(|v| v.is_nan()));
}

#[test]
fn test_cross_lookup_rows_counted() {
    let table = fixture::scenario_table();
    let request = LookupRequest::from_args("GM_CGG", &[("GM_ID", "10"), ("L", "0.18,0.35")])
        .unwrap()
        .with_method(Method::Cubic);
    let mut stats = Stats::new();
    // 6 VGS points fit a cubic, so both rows succeed
    let ok = forward_lookup(&table, &request, Some(&mut stats)).unwrap();
    assert_eq!(ok.shape(), &[2]);
    assert_eq!(stats.sweep_rows, 2);
    assert_eq!(stats.rows_failed, 0);
    assert_eq!(stats.interpolants_built, 2);
}

#[test]
fn test_cross_lookup_failed_row_does_not_spoil_siblings() {
    // L=1 has four finite ID_W points; L=2 loses one to NaN and cannot fit a cubic
    let axes = Axes::new(vec![1.0, 2.0], vec![0.0, 0.5, 1.0, 1.5], vec![0.5], None);
    let id = Array4::from_shape_vec(
        (2, 4, 1, 1),
        vec![1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 4.0, f64::NAN],
    )
    .unwrap();
    let gm = Array4::from_elem((2, 4, 1, 1), 1.0);
    let table =
        CharacterizationTable::new(axes, 1.0, vec![(Quantity::Id, id), (Quantity::Gm, gm)]).unwrap();

    let request = LookupRequest::from_args("GM_ID", &[("ID_W", "2"), ("L", "1, 2")])
        .unwrap()
        .with_method(Method::Cubic);
    let mut stats = Stats::new();
    let result = forward_lookup(&table, &request, Some(&mut stats)).unwrap();

    assert_eq!(result.shape(), &[2]);
    assert_relative_eq!(result[[0]], 0.5, max_relative = 1e-9);
    assert!(result[[1]].is_nan());
    assert_eq!(stats.sweep_rows, 2);
    assert_eq!(stats.rows_failed, 1);
    assert_eq!(stats.interpolants_built, 1);
}

#[test]
fn test_cross_lookup_missing_quantity() {
    let table = fixture::dense_table_without(&[Quantity::Cgg]);
    let err = lookup(&table, "GM_CGG", &[("GM_ID", "10")]).unwrap_err();
    assert!(matches!(err, LookupError::DataUnavailable(_)));
}

#[test]
fn test_method_changes_between_knot_values_only() {
    let table = fixture::dense_table();
    let (gm_id, gm_cgg) = knots(&table);
    for method in [Method::Pchip, Method::Linear, Method::Nearest, Method::Cubic] {
        let request = LookupRequest::new(QuantitySpec::ratio(Quantity::Gm, Quantity::Cgg))
            .with_input(QuantitySpec::ratio(Quantity::Gm, Quantity::Id), vec![gm_id[10]])
            .with_axis(Axis::L, vec![0.18])
            .with_axis(Axis::Vds, vec![0.6])
            .with_method(method);
        let result = forward_lookup(&table, &request, None).unwrap();
        assert_relative_eq!(result[[0]], gm_cgg[10], max_relative = 1e-9);
    }
}
