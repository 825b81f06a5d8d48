use diabetes_model::table::{Column, RecordTable, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic survey table shaped like the real indicator dataset.
///
/// Values come from a seeded RNG so every run of a benchmark sees the same
/// rows.
#[derive(Debug, Clone)]
pub struct SyntheticSurvey {
    rows: usize,
    numeric_features: usize,
    seed: u64,
}

const TARGET: &str = "Diabetes_012";

impl SyntheticSurvey {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            numeric_features: 4,
            seed: 42,
        }
    }

    /// Number of numeric answer columns besides `Age` and `Sex`.
    pub fn numeric_features(mut self, n: usize) -> Self {
        self.numeric_features = n;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn target() -> &'static str {
        TARGET
    }

    /// # Panics
    ///
    /// If the generated columns disagree in length.
    pub fn table(&self) -> RecordTable {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut answers = vec![Vec::with_capacity(self.rows); self.numeric_features];
        let mut age = Vec::with_capacity(self.rows);
        let mut sex = Vec::with_capacity(self.rows);
        let mut target = Vec::with_capacity(self.rows);
        for _ in 0..self.rows {
            let mut score = 0;
            for column in answers.iter_mut() {
                let answer: i64 = rng.gen_range(0..5);
                score += answer;
                column.push(Value::Int(answer));
            }
            let a: i64 = rng.gen_range(1..=13);
            age.push(Value::Int(a));
            let s = if rng.gen_bool(0.5) { "f" } else { "m" };
            sex.push(Value::Text(s.to_string()));
            target.push(Value::Int(((score + a) / 8).min(2)));
        }

        let mut columns = vec![Column::new(TARGET, target)];
        for (i, values) in answers.into_iter().enumerate() {
            columns.push(Column::new(format!("Q{}", i + 1), values));
        }
        columns.push(Column::new("Age", age));
        columns.push(Column::new("Sex", sex));
        RecordTable::from_columns(columns).expect("Failed to build survey table")
    }
}
