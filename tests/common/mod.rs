#![allow(dead_code)]

use glaucoma_mrs::clean::{CleanConfig, CleanDataset, clean_dataset};
use glaucoma_mrs::io::parse_csv_bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

pub const HEADER: &str = "ID,Age,Gender,Severity group,Gaba/tCr,Glutamate/tCr,GABA/NAA,Glutamate/NAA,Neural specificity,Gray matter volume of visual areas,Retina Structure Index,Notes";

/// Second header line as it appears in the exported sheet.
pub const ARTIFACT_ROW: &str = ",years,,,ratio,ratio,ratio,ratio,a.u.,mm3,a.u.,";

pub const GROUPS: [&str; 3] = ["Healthy control", "Early glaucoma", "Advanced glaucoma"];

pub fn csv_text(rows: &[String], with_artifact: bool) -> String {
    let mut text = String::from(HEADER);
    text.push('\n');
    if with_artifact {
        text.push_str(ARTIFACT_ROW);
        text.push('\n');
    }
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

pub fn dataset_from_rows(rows: &[String], with_artifact: bool) -> CleanDataset {
    let raw = parse_csv_bytes(csv_text(rows, with_artifact).into_bytes(), "fixture").expect("parse");
    clean_dataset(raw, &CleanConfig::default()).expect("clean")
}

#[allow(clippy::too_many_arguments)]
pub fn row(
    id: &str,
    age: &str,
    gender: &str,
    group: &str,
    gaba: &str,
    glu: &str,
    ns: &str,
    gmv: &str,
    rsi: &str,
) -> String {
    format!("{id},{age},{gender},{group},{gaba},{glu},0.11,0.9,{ns},{gmv},{rsi},")
}

/// Subjects whose ratios depend on age and structure plus Gaussian noise.
pub fn noisy_rows(n: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();
    (0..n)
        .map(|i| {
            let group = GROUPS[i % 3];
            let age: f64 = rng.gen_range(45.0..80.0);
            let rsi = 1.0 - 0.25 * (i % 3) as f64 + 0.05 * noise.sample(&mut rng);
            let gmv = 5000.0 - 10.0 * age + 150.0 * noise.sample(&mut rng);
            let gaba = 0.12 - 0.0003 * age + 0.02 * rsi + 0.01 * noise.sample(&mut rng);
            let glu = 0.95 - 0.002 * age + 0.1 * rsi + 0.05 * noise.sample(&mut rng);
            let ns = 0.4 + 2.0 * gaba + 0.1 * rsi + 0.05 * noise.sample(&mut rng);
            let gaba_naa = 0.11 + 0.5 * (gaba - 0.1) + 0.005 * noise.sample(&mut rng);
            let glu_naa = 0.9 + 0.5 * (glu - 0.8) + 0.02 * noise.sample(&mut rng);
            let gender = if i % 2 == 0 { "F" } else { "M" };
            format!(
                "S{i:03},{age:.1},{gender},{group},{gaba:.5},{glu:.5},{gaba_naa:.5},{glu_naa:.5},{ns:.5},{gmv:.1},{rsi:.4},"
            )
        })
        .collect()
}
