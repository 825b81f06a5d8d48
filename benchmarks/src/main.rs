fn main() {
    println!("diabetes-model benchmark suite");
    println!();
    println!("Usage:");
    println!("  cargo bench --package benchmarks");
    println!("  cargo bench --package benchmarks --bench <benchmark_name>");
    println!();
    println!("Available benchmarks:");
    println!("  - encoding: label encoding of survey tables of growing size");
    println!("  - train: least-squares fitting and batch prediction");
}
