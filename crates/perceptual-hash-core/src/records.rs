//! Plain-text result files: one `path,hash` line per hashed image.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{Error, Result};
use crate::hash::ImageHash;
use crate::logging::log_fs_modification;
use crate::types::HashRecord;

/// Write `records` to `path`, replacing any existing file
pub fn write_records(path: &Path, records: &[HashRecord]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_records_to(&mut writer, records)?;
    writer.flush()?;

    log_fs_modification(
        "write",
        path,
        Some(&format!("{} hash records", records.len())),
    );
    Ok(())
}

/// Write `records` as `path,hash` lines to any writer
pub fn write_records_to<W: Write>(writer: &mut W, records: &[HashRecord]) -> Result<()> {
    for record in records {
        writeln!(writer, "{}", record)?;
    }
    Ok(())
}

/// Read a result file written by [`write_records`]
pub fn read_records(path: &Path) -> Result<Vec<HashRecord>> {
    let file = File::open(path).map_err(|source| Error::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_record(&line).map_err(|e| {
            Error::InvalidHash(format!("{}:{}: {}", path.display(), index + 1, e))
        })?);
    }

    info!("Read {} hash records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse one `path,hash` line. The last comma separates the two fields.
pub fn parse_record(line: &str) -> Result<HashRecord> {
    let (path, hash) = line
        .trim_end()
        .rsplit_once(',')
        .ok_or_else(|| Error::InvalidHash(format!("missing ',' in line '{}'", line)))?;

    if path.is_empty() {
        return Err(Error::InvalidHash(format!("empty path in line '{}'", line)));
    }

    let hash: ImageHash = hash.trim().parse()?;
    Ok(HashRecord::new(PathBuf::from(path), hash))
}
