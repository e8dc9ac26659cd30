use serde_derive::Deserialize;

use gmid_lookup::inverse;
use gmid_lookup::lookup;
use gmid_lookup::CharacterizationTable;

use crate::fixture;

// ── Manifest types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub defaults: Defaults,
    #[serde(rename = "scenario")]
    pub scenarios: Vec<ScenarioEntry>,
}

#[derive(Debug, Deserialize)]
pub struct Defaults {
    pub table: String,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioEntry {
    pub name: String,
    /// "lookup" or "vgs"
    pub kind: String,
    /// Output quantity for lookups
    pub output: Option<String>,
    #[serde(default)]
    pub args: Vec<(String, String)>,
    pub table: Option<String>,
    pub shape: Option<Vec<usize>>,
    /// "increasing", "decreasing" or "non-decreasing" along the flattened result
    pub monotone: Option<String>,
    #[serde(default)]
    pub all_finite: bool,
    #[serde(default)]
    pub all_nan: bool,
    #[serde(default)]
    pub empty: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

// ── Manifest loading ────────────────────────────────────────────

pub fn load_manifest() -> Manifest {
    let content = std::fs::read_to_string("tests/scenarios/manifest.toml")
        .expect("failed to read tests/scenarios/manifest.toml");
    toml::from_str(&content).expect("failed to parse manifest.toml")
}

// ── Macro for test generation ───────────────────────────────────

macro_rules! scenario_tests {
    ($($name:ident),* $(,)?) => {
        $(
            #[test]
            fn $name() {
                $crate::scenarios::run_scenario(stringify!($name));
            }
        )*
    };
}

pub(crate) use scenario_tests;

// ── Test runner ─────────────────────────────────────────────────

fn table_named(name: &str) -> CharacterizationTable {
    match name {
        "scenario" => fixture::scenario_table(),
        "dense" => fixture::dense_table(),
        other => panic!("unknown fixture table '{}'", other),
    }
}

pub fn run_scenario(name: &str) {
    let manifest = load_manifest();
    let entry = manifest
        .scenarios
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("scenario '{}' not found in manifest", name));

    let table = table_named(entry.table.as_deref().unwrap_or(&manifest.defaults.table));
    let args: Vec<(&str, &str)> = entry
        .args
        .iter()
        .map(|(n, v)| (n.as_str(), v.as_str()))
        .collect();

    let (shape, values) = match entry.kind.as_str() {
        "lookup" => {
            let output = entry
                .output
                .as_deref()
                .unwrap_or_else(|| panic!("scenario '{}' has no output", name));
            let result = lookup::lookup(&table, output, &args)
                .unwrap_or_else(|e| panic!("lookup failed for '{}': {e}", name));
            (result.shape().to_vec(), result.iter().copied().collect::<Vec<f64>>())
        }
        "vgs" => {
            let result = inverse::vgs(&table, &args)
                .unwrap_or_else(|e| panic!("VGS lookup failed for '{}': {e}", name));
            (vec![result.len()], result.to_vec())
        }
        other => panic!("unknown scenario kind: {}", other),
    };

    check(entry, &shape, &values);
}

fn check(entry: &ScenarioEntry, shape: &[usize], values: &[f64]) {
    let mut failures = Vec::new();

    if let Some(expected) = &entry.shape {
        if expected.as_slice() != shape {
            failures.push(format!("shape {:?}, expected {:?}", shape, expected));
        }
    }
    if entry.empty && !values.is_empty() {
        failures.push(format!("expected empty result, got {} values", values.len()));
    }
    if entry.all_finite && !values.iter().all(|v| v.is_finite()) {
        failures.push("expected all finite values".to_string());
    }
    if entry.all_nan && !values.iter().all(|v| v.is_nan()) {
        failures.push("expected all NaN values".to_string());
    }
    if let Some(lo) = entry.min {
        if values.iter().any(|v| *v < lo) {
            failures.push(format!("value below {}", lo));
        }
    }
    if let Some(hi) = entry.max {
        if values.iter().any(|v| *v > hi) {
            failures.push(format!("value above {}", hi));
        }
    }
    if let Some(direction) = &entry.monotone {
        let ok = match direction.as_str() {
            "increasing" => values.windows(2).all(|w| w[1] > w[0]),
            "non-decreasing" => values.windows(2).all(|w| w[1] >= w[0]),
            "decreasing" => values.windows(2).all(|w| w[1] < w[0]),
            other => panic!("unknown monotone direction: {}", other),
        };
        if !ok {
            failures.push(format!("not {}: {:?}", direction, values));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n\nScenario '{}' FAILED:\n\n  {}\n",
            entry.name,
            failures.join("\n  ")
        );
    }
}
