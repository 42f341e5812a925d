use bson::{Document, doc};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use super::command::{Command, RecordOp, ScriptSource};
use crate::errors::{DbError, DbResult};
use crate::identity::normalize_identity_field;
use crate::query::{compile_filter, compile_projection, compile_query};
use crate::config::RecordsConfig;
use crate::records::{
    CountArgs, CreateArgs, DeleteArgs, FindManyArgs, FindUniqueArgs, RecordService, UpdateArgs,
    check_operators, effective_take, parse_args,
};
use crate::store::DocumentStore;
use crate::utils::json::bson_document_to_json;

#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum OutputMode {
    Plain,
    Json,
}

/// Outcome counts of a script run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub ok: usize,
    pub failed: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptLine {
    op: String,
    collection: String,
    #[serde(default)]
    args: Option<Value>,
}

fn opt_json(d: Option<Document>) -> Value {
    d.map_or(Value::Null, bson_document_to_json)
}

/// Native query documents for one request body, as JSON, under the same operator policy
/// and `take` cap the service applies.
///
/// # Errors
/// `InvalidArgument` for a malformed body, missing `data` or a rejected operator.
pub fn compile_request(config: &RecordsConfig, op: RecordOp, body: &str) -> DbResult<Value> {
    let out = match op {
        RecordOp::FindMany => {
            let a: FindManyArgs = parse_args(body)?;
            check_operators(config, a.filter.as_ref())?;
            let q = compile_query(a.filter.as_ref(), a.select.as_ref(), a.order_by.as_ref());
            json!({
                "filter": bson_document_to_json(q.filter),
                "projection": opt_json(q.projection),
                "sort": opt_json(q.sort),
                "skip": a.skip.filter(|n| *n > 0),
                "take": effective_take(config, a.take),
            })
        }
        RecordOp::FindUnique => {
            let a: FindUniqueArgs = parse_args(body)?;
            check_operators(config, a.filter.as_ref())?;
            json!({
                "filter": bson_document_to_json(compile_filter(a.filter.as_ref())),
                "projection": opt_json(compile_projection(a.select.as_ref())),
            })
        }
        RecordOp::Create => {
            let a: CreateArgs = parse_args(body)?;
            let mut data =
                a.data.ok_or_else(|| DbError::InvalidArgument("create requires data".into()))?;
            normalize_identity_field(&mut data);
            json!({ "document": bson_document_to_json(data) })
        }
        RecordOp::Update => {
            let a: UpdateArgs = parse_args(body)?;
            let mut data =
                a.data.ok_or_else(|| DbError::InvalidArgument("update requires data".into()))?;
            check_operators(config, a.filter.as_ref())?;
            normalize_identity_field(&mut data);
            json!({
                "filter": bson_document_to_json(compile_filter(a.filter.as_ref())),
                "update": bson_document_to_json(doc! { "$set": data }),
            })
        }
        RecordOp::Delete => {
            let a: DeleteArgs = parse_args(body)?;
            check_operators(config, a.filter.as_ref())?;
            json!({ "filter": bson_document_to_json(compile_filter(a.filter.as_ref())) })
        }
        RecordOp::Count => {
            let a: CountArgs = parse_args(body)?;
            check_operators(config, a.filter.as_ref())?;
            json!({ "filter": bson_document_to_json(compile_filter(a.filter.as_ref())) })
        }
    };
    Ok(out)
}

fn execute<S: DocumentStore>(svc: &RecordService<S>, op: RecordOp, collection: &str, body: &str) -> DbResult<Value> {
    Ok(match op {
        RecordOp::FindMany => {
            Value::Array(svc.find_many_json(collection, body)?.into_iter().map(bson_document_to_json).collect())
        }
        RecordOp::FindUnique => opt_json(svc.find_unique_json(collection, body)?),
        RecordOp::Create => bson_document_to_json(svc.create_json(collection, body)?),
        RecordOp::Update => opt_json(svc.update_json(collection, body)?),
        RecordOp::Delete => opt_json(svc.delete_json(collection, body)?),
        RecordOp::Count => json!(svc.count_json(collection, body)?),
    })
}

fn run_line<S: DocumentStore>(svc: &RecordService<S>, line: &str) -> DbResult<(RecordOp, Value)> {
    let parsed: ScriptLine = parse_args(line)?;
    let op = RecordOp::parse(&parsed.op)?;
    let body = parsed.args.unwrap_or_else(|| json!({})).to_string();
    Ok((op, execute(svc, op, &parsed.collection, &body)?))
}

/// Execute NDJSON request lines in order, writing one result line per request.
///
/// Blank lines and lines starting with `#` are skipped. A failing request is reported and
/// the script continues.
///
/// # Errors
/// Only reading the input or writing the output can fail the run.
pub fn run_script<S, R, W>(svc: &RecordService<S>, input: R, mode: OutputMode, out: &mut W) -> DbResult<ScriptSummary>
where
    S: DocumentStore,
    R: BufRead,
    W: Write,
{
    let mut summary = ScriptSummary::default();
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let n = idx + 1;
        match (run_line(svc, trimmed), mode) {
            (Ok((op, result)), OutputMode::Json) => {
                summary.ok += 1;
                writeln!(out, "{}", json!({"line": n, "op": op.as_str(), "ok": true, "result": result}))?;
            }
            (Ok((op, result)), OutputMode::Plain) => {
                summary.ok += 1;
                writeln!(out, "{n}: {} {result}", op.as_str())?;
            }
            (Err(e), OutputMode::Json) => {
                summary.failed += 1;
                log::warn!("script line {n} failed: {e}");
                writeln!(out, "{}", json!({"line": n, "ok": false, "error": e.to_string()}))?;
            }
            (Err(e), OutputMode::Plain) => {
                summary.failed += 1;
                log::warn!("script line {n} failed: {e}");
                writeln!(out, "{n}: error {e}")?;
            }
        }
    }
    Ok(summary)
}

/// Run one CLI command. Returns `false` when an `exec` script had failing lines.
///
/// # Errors
/// Compile errors, unreadable scripts and output failures.
pub fn run<S: DocumentStore, W: Write>(
    svc: &RecordService<S>,
    cmd: Command,
    mode: OutputMode,
    out: &mut W,
) -> DbResult<bool> {
    match cmd {
        Command::Compile { op, args_json } => {
            let compiled = compile_request(svc.config(), op, &args_json)?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::to_string_pretty(&compiled)?)?,
                OutputMode::Plain => {
                    if let Value::Object(parts) = &compiled {
                        for (k, v) in parts {
                            writeln!(out, "{k}={v}")?;
                        }
                    }
                }
            }
            Ok(true)
        }
        Command::Exec { script } => {
            let summary = match script {
                ScriptSource::Stdin => run_script(svc, std::io::stdin().lock(), mode, out)?,
                ScriptSource::File(path) => {
                    let file = File::open(&path)
                        .map_err(|e| DbError::Io(format!("{}: {e}", path.display())))?;
                    run_script(svc, BufReader::new(file), mode, out)?
                }
            };
            log::info!("script finished: {} ok, {} failed", summary.ok, summary.failed);
            Ok(summary.failed == 0)
        }
    }
}
