use benchmarks::SyntheticSurvey;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use diabetes_model::model::InferenceModel;
use diabetes_model::preprocessing::LabelEncoding;
use diabetes_model::trainer::Trainer;
use ndarray::s;

fn bench_fit(c: &mut Criterion) {
    // Wider tables exercise the normal-equation solve more than the scan.
    for n_features in [2, 8, 21].iter() {
        let table = SyntheticSurvey::new(20_000)
            .numeric_features(*n_features)
            .table();
        let encoding = LabelEncoding::new(SyntheticSurvey::target());
        let (x, _) = encoding.fit_transform(&table).expect("Failed to encode");
        let y = encoding.target_vector(&table).expect("Failed to read target");

        c.bench_with_input(
            BenchmarkId::new("fit", n_features),
            &(x, y),
            |b, (x, y)| {
                let trainer = Trainer::new();
                b.iter(|| trainer.fit(black_box(x), black_box(y)).expect("Failed to fit"));
            },
        );
    }
}

fn bench_predict_batch(c: &mut Criterion) {
    let table = SyntheticSurvey::new(20_000).table();
    let encoding = LabelEncoding::new(SyntheticSurvey::target());
    let (x, _) = encoding.fit_transform(&table).expect("Failed to encode");
    let y = encoding.target_vector(&table).expect("Failed to read target");
    let model = Trainer::new().fit(&x, &y).expect("Failed to fit");

    for batch_size in [100, 1_000, 20_000].iter() {
        let batch = x.to_f64().slice(s![..*batch_size, ..]).to_owned();
        c.bench_with_input(
            BenchmarkId::new("predict_batch", batch_size),
            &batch,
            |b, batch| {
                b.iter(|| model.predict_batch(black_box(batch)));
            },
        );
    }
}

criterion_group!(benches, bench_fit, bench_predict_batch);
criterion_main!(benches);
