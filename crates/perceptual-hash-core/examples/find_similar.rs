use std::path::PathBuf;

use perceptual_hash_core::{find_similar, Config, HashRecord, Result, Scanner};

// Report every image in a directory that looks like a reference image.
//
//     cargo run --example find_similar -- sample/cat.png sample
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let query = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample/cat.png"));
    let directory = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample"));

    let scanner = Scanner::new(Config {
        show_progress: false,
        ..Config::default()
    })?;

    let query = HashRecord::new(&query, scanner.hasher().hash_path(&query, None)?);
    println!("Reference Image Hash: {}", query.hash);
    println!("Reference Image Path: {}", query.path.display());
    println!("-------------------------");

    let result = scanner.run(&[directory])?;
    for m in find_similar(&query, &result.records, 10) {
        println!(
            "Similar image found: {} (distance {})",
            m.record.path.display(),
            m.distance
        );
    }
    Ok(())
}
