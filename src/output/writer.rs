//! Atomic CSV and Parquet writers.

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use polars::prelude::{DataFrame, NamedFrom, ParquetWriter, PolarsResult, Series};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::{error::EtlResult, model::Table};

/// Write `table` as UTF-8 CSV with `\n` line endings and minimal quoting.
/// Equal tables always produce identical bytes.
pub fn write_csv(table: &Table, path: &Path) -> EtlResult<()> {
    let tmp = staging_path(path)?;
    {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .quote_style(QuoteStyle::Necessary)
            .from_path(&tmp)?;
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;
    info!(path = %path.display(), rows = table.len(), "wrote csv");
    Ok(())
}

pub fn write_parquet(table: &Table, path: &Path) -> EtlResult<()> {
    let tmp = staging_path(path)?;
    let mut df = to_dataframe(table)?;
    let file = File::create(&tmp)?;
    ParquetWriter::new(file).finish(&mut df)?;
    std::fs::rename(&tmp, path)?;
    info!(path = %path.display(), rows = df.height(), "wrote parquet");
    Ok(())
}

/// All-string polars frame mirroring `table`.
pub fn to_dataframe(table: &Table) -> PolarsResult<DataFrame> {
    let series = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values: Vec<Option<String>> =
                table.rows().iter().map(|row| row[idx].clone()).collect();
            Series::new(name.as_str().into(), values)
        })
        .collect::<Vec<_>>();
    DataFrame::new(series)
}

pub fn file_sha256(path: &Path) -> EtlResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

fn staging_path(path: &Path) -> EtlResult<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    Ok(path.with_file_name(name))
}
