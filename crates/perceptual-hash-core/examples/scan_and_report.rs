use std::path::PathBuf;

use perceptual_hash_core::{write_records, Config, ConfusionMatrix, Result, Scanner};

// Hash ./images (debug images under ./debug) and print the accuracy report.
// Files sharing a name prefix before `_` are expected to match.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let images = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./images"));

    let config = Config {
        debug: true,
        ..Config::default()
    };
    let scanner = Scanner::new(config)?;
    let result = scanner.run(&[images])?;

    for record in &result.records {
        println!("{}", record);
    }
    write_records(&scanner.config().output_path, &result.records)?;
    println!(
        "Hashing complete. Results saved to {}",
        scanner.config().output_path.display()
    );

    let matrix = ConfusionMatrix::evaluate(&result.records, scanner.config().similarity_threshold);
    println!("\n{}", matrix);
    Ok(())
}
