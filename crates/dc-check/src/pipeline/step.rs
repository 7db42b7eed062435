//! Typed pipeline steps parsed from single-key YAML maps

use crate::error::{ExecError, ExecResult};
use crate::sql::seconds;
use dc_core::LoadMode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;

/// One entry of a pipeline's `steps` list
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `load` and `append`
    Load {
        files: Vec<String>,
        table: Option<String>,
        /// `None` uses the configured default load mode
        mode: Option<LoadMode>,
    },
    /// `check` and `run`
    Check { paths: Vec<String> },
    Sql(SqlStep),
    /// `sql_files`, executed as statement scripts
    SqlFiles { files: Vec<String> },
    Cmd { commands: Vec<String>, print: bool },
    Ping {
        wait: bool,
        timeout: f64,
        retry: f64,
    },
    /// Steps that still run when an earlier sibling fails
    AlwaysRun { steps: Vec<Step> },
    Breakpoint,
    Fake { configs: Vec<String> },
}

/// What a `sql` step runs
#[derive(Debug, Clone, PartialEq)]
pub enum SqlStep {
    Query {
        query: String,
        /// CSV file receiving the result
        output: Option<String>,
        /// SQL file to create next to a CSV with the result
        write_check: Option<String>,
    },
    /// A scalar that is a file if it exists below the pipeline, else a query
    Ambiguous(String),
    Files(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LoadParams {
    #[serde(default)]
    files: Option<OneOrMany>,
    #[serde(default)]
    file: Option<OneOrMany>,
    #[serde(default)]
    table: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    load_mode: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PathParams {
    #[serde(default)]
    files: Option<OneOrMany>,
    #[serde(default)]
    file: Option<OneOrMany>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SqlParams {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    files: Option<OneOrMany>,
    #[serde(default)]
    file: Option<OneOrMany>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    write_check: Option<String>,
}

fn default_print() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CmdParams {
    commands: OneOrMany,
    #[serde(default = "default_print")]
    print: bool,
}

fn default_timeout() -> f64 {
    5.0
}

fn default_retry() -> f64 {
    1.0
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PingParams {
    #[serde(default)]
    wait: bool,
    #[serde(default = "default_timeout")]
    timeout: f64,
    #[serde(default = "default_retry")]
    retry: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FakeParams {
    configs: OneOrMany,
}

fn invalid(kind: &str, message: impl Into<String>) -> ExecError {
    ExecError::InvalidStep {
        kind: kind.to_string(),
        message: message.into(),
    }
}

fn params<T: DeserializeOwned>(kind: &str, value: Value) -> ExecResult<T> {
    serde_yaml::from_value(value).map_err(|e| invalid(kind, e.to_string()))
}

/// A scalar or list of strings; `None` for maps
fn path_list(kind: &str, value: &Value) -> ExecResult<Option<Vec<String>>> {
    match value {
        Value::Mapping(_) => Ok(None),
        Value::Null => Err(invalid(kind, "expected a path or a list of paths")),
        other => Ok(Some(params::<OneOrMany>(kind, other.clone())?.into_vec())),
    }
}

/// `files` and `file` are interchangeable; both may be given
fn merge_paths(kind: &str, files: Option<OneOrMany>, file: Option<OneOrMany>) -> ExecResult<Vec<String>> {
    let paths: Vec<String> = files
        .into_iter()
        .chain(file)
        .flat_map(OneOrMany::into_vec)
        .collect();
    if paths.is_empty() {
        return Err(invalid(kind, "no files given"));
    }
    Ok(paths)
}

fn parse_mode(kind: &str, mode: Option<String>) -> ExecResult<Option<LoadMode>> {
    mode.map(|m| m.parse::<LoadMode>().map_err(|e| invalid(kind, e.to_string())))
        .transpose()
}

impl Step {
    /// Parse a `{kind: params}` map, or a bare kind such as `- breakpoint`
    pub fn parse(value: &Value) -> ExecResult<Step> {
        match value {
            Value::String(kind) => Self::parse_kind(kind, Value::Null),
            Value::Mapping(map) if map.len() == 1 => {
                let (key, params) = map
                    .iter()
                    .next()
                    .ok_or_else(|| invalid("step", "empty step"))?;
                let kind = key
                    .as_str()
                    .ok_or_else(|| invalid("step", "step kind must be a string"))?;
                Self::parse_kind(kind, params.clone())
            }
            _ => Err(invalid("step", "each step must be a map with exactly one key")),
        }
    }

    fn parse_kind(kind: &str, value: Value) -> ExecResult<Step> {
        match kind {
            "load" | "append" => {
                let forced = (kind == "append").then_some(LoadMode::Append);
                if let Some(files) = path_list(kind, &value)? {
                    return Ok(Step::Load {
                        files,
                        table: None,
                        mode: forced,
                    });
                }
                let p: LoadParams = params(kind, value)?;
                let mode = parse_mode(kind, p.mode.or(p.load_mode))?;
                Ok(Step::Load {
                    files: merge_paths(kind, p.files, p.file)?,
                    table: p.table,
                    mode: forced.or(mode),
                })
            }
            "check" | "run" => {
                let paths = match path_list(kind, &value)? {
                    Some(paths) => paths,
                    None => {
                        let p: PathParams = params(kind, value)?;
                        merge_paths(kind, p.files, p.file)?
                    }
                };
                Ok(Step::Check { paths })
            }
            "sql" => match value {
                Value::String(s) => Ok(Step::Sql(SqlStep::Ambiguous(s))),
                Value::Sequence(_) => Ok(Step::Sql(SqlStep::Files(params::<Vec<String>>(kind, value)?))),
                _ => {
                    let p: SqlParams = params(kind, value)?;
                    match p.query {
                        Some(query) => Ok(Step::Sql(SqlStep::Query {
                            query,
                            output: p.output,
                            write_check: p.write_check,
                        })),
                        None if p.output.is_some() || p.write_check.is_some() => {
                            Err(invalid(kind, "output and write_check need a query"))
                        }
                        None => Ok(Step::Sql(SqlStep::Files(merge_paths(kind, p.files, p.file)?))),
                    }
                }
            },
            "sql_files" => {
                let files = match path_list(kind, &value)? {
                    Some(files) => files,
                    None => {
                        let p: PathParams = params(kind, value)?;
                        merge_paths(kind, p.files, p.file)?
                    }
                };
                Ok(Step::SqlFiles { files })
            }
            "cmd" => match path_list(kind, &value)? {
                Some(commands) => Ok(Step::Cmd {
                    commands,
                    print: true,
                }),
                None => {
                    let p: CmdParams = params(kind, value)?;
                    Ok(Step::Cmd {
                        commands: p.commands.into_vec(),
                        print: p.print,
                    })
                }
            },
            "ping" => {
                let p: PingParams = match value {
                    Value::Null => params(kind, Value::Mapping(Default::default()))?,
                    other => params(kind, other)?,
                };
                if seconds(p.timeout).is_none() || seconds(p.retry).is_none() {
                    return Err(invalid(kind, "timeout and retry must be finite, non-negative seconds"));
                }
                Ok(Step::Ping {
                    wait: p.wait,
                    timeout: p.timeout,
                    retry: p.retry,
                })
            }
            "always_run" => {
                let list = match value {
                    Value::Mapping(mut map) => {
                        let steps = map
                            .remove("steps")
                            .ok_or_else(|| invalid(kind, "missing 'steps'"))?;
                        if !map.is_empty() {
                            return Err(invalid(kind, "only 'steps' is allowed"));
                        }
                        steps
                    }
                    other => other,
                };
                let Value::Sequence(items) = list else {
                    return Err(invalid(kind, "'steps' must be a list"));
                };
                let steps = items.iter().map(Step::parse).collect::<ExecResult<_>>()?;
                Ok(Step::AlwaysRun { steps })
            }
            "breakpoint" => Ok(Step::Breakpoint),
            "fake" => {
                let configs = match path_list(kind, &value)? {
                    Some(configs) => configs,
                    None => params::<FakeParams>(kind, value)?.configs.into_vec(),
                };
                Ok(Step::Fake { configs })
            }
            other => Err(ExecError::UnknownStep {
                kind: other.to_string(),
            }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Step::Load { .. } => "load",
            Step::Check { .. } => "check",
            Step::Sql(_) => "sql",
            Step::SqlFiles { .. } => "sql_files",
            Step::Cmd { .. } => "cmd",
            Step::Ping { .. } => "ping",
            Step::AlwaysRun { .. } => "always_run",
            Step::Breakpoint => "breakpoint",
            Step::Fake { .. } => "fake",
        }
    }

    pub fn is_always_run(&self) -> bool {
        matches!(self, Step::AlwaysRun { .. })
    }
}

#[cfg(test)]
#[path = "step_test.rs"]
mod tests;
