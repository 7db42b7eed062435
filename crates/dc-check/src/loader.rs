//! Loads CSV and spreadsheet files into database tables

use crate::context::CheckContext;
use crate::error::{ExecError, ExecResult};
use crate::result::CheckResult;
use crate::runner::Runner;
use dc_core::sql_utils::{cell_literal, quote_ident};
use dc_core::{Cell, LoadMode, TableRef};
use dc_db::{Database, TableInfo};
use dc_frame::{read_csv, read_excel, Frame, ReadOptions};
use std::path::{Path, PathBuf};

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

/// Read a load file, keeping string and date columns of the target table
pub fn read_table_file(file: &Path, options: &ReadOptions) -> ExecResult<Frame> {
    if has_extension(file, "csv") {
        Ok(read_csv(file, options)?)
    } else if has_extension(file, "xlsx") {
        Ok(read_excel(file, options)?)
    } else {
        Err(ExecError::UnsupportedFile {
            path: file.display().to_string(),
        })
    }
}

/// Table named by a file stem: `schema.table.csv` loads `schema.table`
pub fn table_for_file(file: &Path) -> ExecResult<TableRef> {
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    Ok(TableRef::parse(stem)?)
}

/// Replace directories with the `.csv`/`.xlsx` files below them
pub fn expand_load_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            log::warn!("Cannot read directory {}", dir.display());
            return;
        };
        let mut entries: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
        entries.sort();
        for entry in entries {
            if entry.is_dir() {
                walk(&entry, out);
            } else if has_extension(&entry, "csv") || has_extension(&entry, "xlsx") {
                out.push(entry);
            }
        }
    }

    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk(path, &mut out);
        } else {
            out.push(path.clone());
        }
    }
    out
}

fn create_table_sql(table: &TableRef, frame: &Frame) -> String {
    let columns: Vec<String> = frame
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.dtype.sql_type()))
        .collect();
    format!("CREATE TABLE {} ({})", table.quoted(), columns.join(", "))
}

async fn create_table(db: &dyn Database, table: &TableRef, frame: &Frame) -> ExecResult<()> {
    if let Some(schema) = &table.schema {
        db.create_schema_if_not_exists(schema).await?;
    }
    db.execute(&create_table_sql(table, frame)).await?;
    log::debug!("Created table {}", table);
    Ok(())
}

/// Make the table ready for the mode; returns the metadata to write with
async fn prepare_table(
    db: &dyn Database,
    info: TableInfo,
    frame: &Frame,
    mode: LoadMode,
) -> ExecResult<TableInfo> {
    let table = info.table.clone();
    match mode {
        LoadMode::Truncate if info.exists => {
            db.execute(&db.capabilities().truncate_sql(&table)).await?;
        }
        LoadMode::Append if info.exists => {}
        LoadMode::Truncate | LoadMode::Append => {
            create_table(db, &table, frame).await?;
            return Ok(db.table_info(&table).await?);
        }
        LoadMode::Replace => {
            db.drop_if_exists(&table).await?;
            create_table(db, &table, frame).await?;
            return Ok(db.table_info(&table).await?);
        }
        LoadMode::Upsert => {
            if !info.exists {
                return Err(ExecError::UpsertMissingTable {
                    table: table.to_string(),
                });
            }
            if info.primary_keys.is_empty() {
                return Err(ExecError::UpsertWithoutKeys {
                    table: table.to_string(),
                });
            }
        }
    }
    Ok(info)
}

/// `DELETE` the rows whose key tuple appears in `rows`
fn delete_keys_sql(table: &TableRef, columns: &[String], keys: &[String], rows: &[Vec<Cell>]) -> Option<String> {
    let positions: Vec<usize> = keys
        .iter()
        .filter_map(|k| columns.iter().position(|c| c == k))
        .collect();
    if positions.len() != keys.len() || rows.is_empty() {
        return None;
    }
    let predicates: Vec<String> = rows
        .iter()
        .map(|row| {
            let terms: Vec<String> = positions
                .iter()
                .map(|&p| match &row[p] {
                    c if c.is_na() => format!("{} IS NULL", quote_ident(&columns[p])),
                    c => format!("{} = {}", quote_ident(&columns[p]), cell_literal(c)),
                })
                .collect();
            format!("({})", terms.join(" AND "))
        })
        .collect();
    Some(format!(
        "DELETE FROM {} WHERE {}",
        table.quoted(),
        predicates.join(" OR ")
    ))
}

async fn write_rows(db: &dyn Database, info: &TableInfo, frame: &Frame, mode: LoadMode) -> ExecResult<usize> {
    let table = &info.table;
    let columns = frame.column_names();
    let rows = frame.rows();
    if mode != LoadMode::Upsert {
        return Ok(db.insert_rows(table, &columns, &rows).await?);
    }
    let keys = &info.primary_keys;
    if db.capabilities().native_upsert {
        return Ok(db.upsert_rows(table, &columns, keys, &rows).await?);
    }
    if let Some(delete) = delete_keys_sql(table, &columns, keys, &rows) {
        db.execute(&delete).await?;
    }
    Ok(db.insert_rows(table, &columns, &rows).await?)
}

/// Write a frame into a table under `mode`; returns written rows
pub async fn load_frame(db: &dyn Database, table: &TableRef, frame: &Frame, mode: LoadMode) -> ExecResult<usize> {
    let info = db.table_info(table).await?;
    load_frame_with_info(db, info, frame, mode).await
}

async fn load_frame_with_info(db: &dyn Database, info: TableInfo, frame: &Frame, mode: LoadMode) -> ExecResult<usize> {
    let info = prepare_table(db, info, frame, mode).await?;

    let identity = if info.has_identity_key() {
        db.capabilities().identity_insert_sql(&info.table)
    } else {
        None
    };
    let Some((on, off)) = identity else {
        return write_rows(db, &info, frame, mode).await;
    };

    db.execute(&on).await?;
    let written = write_rows(db, &info, frame, mode).await;
    if let Err(e) = db.execute(&off).await {
        log::warn!("Failed to reset identity insert on {}: {}", info.table, e);
    }
    written
}

/// Load one file into one table
pub async fn load_table_from_file(
    db: &dyn Database,
    table: &TableRef,
    file: &Path,
    mode: LoadMode,
) -> ExecResult<usize> {
    let info = db.table_info(table).await?;
    let columns = info.column_info();
    let options = ReadOptions::new(columns.string_columns, columns.date_columns);
    let frame = read_table_file(file, &options)?;
    let written = load_frame_with_info(db, info, &frame, mode).await?;
    log::info!(
        "Loaded {} rows from {} into {} ({})",
        written,
        file.display(),
        table,
        mode
    );
    Ok(written)
}

/// Load several files, each into the table named by its stem, in parallel.
///
/// Each file reports its own result; returns true only if all succeeded.
/// `table` overrides the stem and is only valid for a single file.
pub async fn load_tables_from_files(
    ctx: &CheckContext,
    paths: &[PathBuf],
    table: Option<&str>,
    mode: LoadMode,
) -> ExecResult<bool> {
    let files = expand_load_files(paths);
    let jobs: Vec<(PathBuf, TableRef)> = match table {
        Some(name) if files.len() == 1 => vec![(files[0].clone(), TableRef::parse(name)?)],
        Some(_) => return Err(ExecError::TableWithManyFiles { count: files.len() }),
        None => files
            .iter()
            .map(|f| Ok((f.clone(), table_for_file(f)?)))
            .collect::<ExecResult<_>>()?,
    };
    let expected = jobs.len();

    let runner = Runner::from_settings(&ctx.settings);
    let output = ctx.output.clone();
    let results = runner
        .run_jobs(
            jobs,
            ctx,
            move |(file, table): (PathBuf, TableRef), ctx: CheckContext| async move {
                match load_table_from_file(ctx.db.as_ref(), &table, &file, mode).await {
                    Ok(n) => CheckResult::passed_with_message(&file, format!("LOADED {} rows into {}", n, table)),
                    Err(e) => CheckResult::exception(&file, &e),
                }
            },
            |result| output.print_result(result),
        )
        .await;

    Ok(results.len() == expected && results.iter().all(|(_, r)| r.passed))
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
