//! Synthetic characterization tables for integration tests.
//!
//! Drain current follows a smooth weak-to-strong inversion interpolation
//! `ID = IS * F^2 * (1 + LAMBDA * VDS)` with `F = ln(1 + exp(q))` and
//! `q = (VGS - VT) / (2 n UT)`. gm/ID is then strictly decreasing in VGS.

#![allow(dead_code)]

use gmid_lookup::{Axes, CharacterizationTable, Quantity};
use ndarray::Array4;

pub const WIDTH: f64 = 1e-6;

const UT: f64 = 0.0259;
const N: f64 = 1.3;
const VT0: f64 = 0.4;
const GAMMA: f64 = 0.4;
const PHI: f64 = 0.8;
const LAMBDA: f64 = 0.2;
/// Process transconductance times W, per unit L (A/V^2 * um).
const KP_W: f64 = 50e-6;
const COX_W: f64 = 8e-15;

/// `L=[0.18,0.35]`, `VGS=0:0.2:1.0`, `VDS=[0.3,0.6]`, `VSB=[0]`.
pub fn scenario_table() -> CharacterizationTable {
    let axes = Axes::new(
        vec![0.18, 0.35],
        (0..6).map(|i| i as f64 * 0.2).collect(),
        vec![0.3, 0.6],
        Some(vec![0.0]),
    );
    build(axes, &[])
}

/// Finer table with three VSB points.
pub fn dense_table() -> CharacterizationTable {
    build(dense_axes(), &[])
}

pub fn dense_axes() -> Axes {
    Axes::new(
        vec![0.18, 0.35, 0.5],
        (0..21).map(|i| i as f64 * 0.05).collect(),
        vec![0.1, 0.3, 0.6, 0.9, 1.2],
        Some(vec![0.0, 0.2, 0.4]),
    )
}

/// Dense table with some quantities left out.
pub fn dense_table_without(skip: &[Quantity]) -> CharacterizationTable {
    build(dense_axes(), skip)
}

pub fn vt(l: f64, vsb: f64) -> f64 {
    VT0 + GAMMA * ((PHI + vsb).sqrt() - PHI.sqrt()) - 0.01 * (0.18 / l)
}

fn sigmoid(q: f64) -> f64 {
    1.0 / (1.0 + (-q).exp())
}

#[derive(Debug, Clone, Copy)]
pub struct Point {
    pub id: f64,
    pub gm: f64,
    pub gds: f64,
    pub cgg: f64,
}

/// Model evaluation at one bias point.
pub fn model(l: f64, vgs: f64, vds: f64, vsb: f64) -> Point {
    let vt = vt(l, vsb);
    let q = (vgs - vt) / (2.0 * N * UT);
    let f = q.exp().ln_1p();
    let is = 2.0 * N * UT * UT * KP_W / l;
    let clm = 1.0 + LAMBDA * vds;
    let id = is * f * f * clm;
    let gm = is * 2.0 * f * sigmoid(q) / (2.0 * N * UT) * clm;
    let gds = is * f * f * LAMBDA;
    let cgg = COX_W * l * (0.3 + 0.7 * sigmoid(q));
    Point { id, gm, gds, cgg }
}

fn build(axes: Axes, skip: &[Quantity]) -> CharacterizationTable {
    let shape = axes.shape();
    let at = |f: &dyn Fn(Point, [f64; 4]) -> f64| {
        Array4::from_shape_fn(shape, |(i, j, k, m)| {
            let bias = [axes.l[i], axes.vgs[j], axes.vds[k], axes.vsb[m]];
            f(model(bias[0], bias[1], bias[2], bias[3]), bias)
        })
    };

    let data = vec![
        (Quantity::Id, at(&|p, _| p.id)),
        (Quantity::Vt, at(&|_, b| vt(b[0], b[3]))),
        (Quantity::Igd, at(&|_, _| 0.0)),
        (Quantity::Igs, at(&|_, _| 0.0)),
        (Quantity::Gm, at(&|p, _| p.gm)),
        (Quantity::Gmb, at(&|p, _| p.gm * (N - 1.0))),
        (Quantity::Gds, at(&|p, _| p.gds)),
        (Quantity::Cgg, at(&|p, _| p.cgg)),
        (Quantity::Cgs, at(&|p, _| 0.7 * p.cgg)),
        (Quantity::Csg, at(&|p, _| 0.7 * p.cgg)),
        (Quantity::Cgd, at(&|p, _| 0.2 * p.cgg)),
        (Quantity::Cdg, at(&|p, _| 0.2 * p.cgg)),
        (Quantity::Cgb, at(&|p, _| 0.1 * p.cgg)),
        (Quantity::Cdd, at(&|p, _| 0.25 * p.cgg)),
        (Quantity::Css, at(&|p, _| 0.8 * p.cgg)),
        (Quantity::Sth, at(&|p, _| 4.0 * 1.38e-23 * 300.0 * 0.7 * p.gm)),
        (Quantity::Sfl, at(&|p, _| 1e-25 * p.gm * p.gm / p.cgg)),
    ];
    let data: Vec<_> = data.into_iter().filter(|(q, _)| !skip.contains(q)).collect();

    CharacterizationTable::new(axes, WIDTH, data).expect("fixture table is valid")
}

/// Render a table in the text table format.
pub fn to_table_file(table: &CharacterizationTable, device: &str) -> String {
    use gmid_lookup::Axis;

    let mut out = String::new();
    out.push_str("* generated fixture\n");
    out.push_str(&format!(".DEVICE {}\n", device));
    out.push_str(&format!(".W {:e}\n", table.width()));
    for axis in Axis::ALL {
        let values: Vec<String> = table.axis(axis).iter().map(|v| format!("{:e}", v)).collect();
        out.push_str(&format!(".AXIS {} {}\n", axis, values.join(" ")));
    }
    let stored: Vec<Quantity> = table.stored().collect();
    for q in stored {
        let samples = table.base(q).expect("stored quantity");
        out.push_str(&format!(".DATA {}\n", q));
        let per_line = table.axis(Axis::Vsb).len() * table.axis(Axis::Vds).len();
        let values: Vec<String> = samples.iter().map(|v| format!("{:e}", v)).collect();
        for chunk in values.chunks(per_line) {
            out.push_str(&format!("+ {}\n", chunk.join(" ")));
        }
    }
    out.push_str(".END\n");
    out
}
