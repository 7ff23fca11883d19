//! Worker invocation models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::domain::errors::WorkerFailure;

/// Structured result data produced by a successful worker.
pub type Payload = serde_json::Map<String, Value>;

/// One analysis task, ready to invoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSpec {
    /// Name, unique within a run
    pub name: String,
    /// Program (or in-process handler id) to run
    pub executable: String,
    /// Arguments derived from the input and upstream results
    #[serde(default)]
    pub args: Vec<String>,
}

impl WorkerSpec {
    pub fn new(name: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Terminal status of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Ok,
    Error,
    Skipped,
}

impl WorkerStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a worker's stdout is framed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFraming {
    /// Take the span from the first `{` to the last `}`; surrounding text is noise.
    #[default]
    Outermost,
    /// The whole trimmed output must be exactly one JSON object.
    Strict,
}

/// Tagged outcome of one worker invocation.
///
/// `payload` is present iff the status is `ok`; `message` is present iff it
/// is not. Fields are private so the only way to build one is through the
/// constructors below.
///
/// On the wire an `ok` result is `status` plus the payload keys inlined; an
/// error marker is `{status, error, details}`; every other result is
/// `{status, message}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ResultRecord", try_from = "ResultRecord")]
pub struct WorkerResult {
    status: WorkerStatus,
    payload: Option<Payload>,
    message: Option<String>,
    details: Option<String>,
}

/// Serialized form of a [`WorkerResult`].
#[derive(Serialize, Deserialize)]
struct ResultRecord {
    status: WorkerStatus,
    #[serde(flatten)]
    fields: Payload,
}

const STATUS_KEY: &str = "status";
const MESSAGE_KEY: &str = "message";
const ERROR_KEY: &str = "error";
const DETAILS_KEY: &str = "details";

impl From<WorkerResult> for ResultRecord {
    fn from(result: WorkerResult) -> Self {
        let fields = match (result.payload, result.message, result.details) {
            (Some(mut payload), _, _) => {
                // `status` belongs to the envelope
                payload.remove(STATUS_KEY);
                payload
            }
            (None, Some(message), Some(details)) => Payload::from_iter([
                (ERROR_KEY.to_string(), Value::String(message)),
                (DETAILS_KEY.to_string(), Value::String(details)),
            ]),
            (None, Some(message), None) => {
                Payload::from_iter([(MESSAGE_KEY.to_string(), Value::String(message))])
            }
            (None, None, _) => Payload::new(),
        };
        Self {
            status: result.status,
            fields,
        }
    }
}

impl TryFrom<ResultRecord> for WorkerResult {
    type Error = String;

    fn try_from(record: ResultRecord) -> Result<Self, Self::Error> {
        let ResultRecord { status, mut fields } = record;
        if status == WorkerStatus::Ok {
            return Ok(Self::ok(fields));
        }

        let mut take = |key: &str| match fields.remove(key) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text)),
            Some(_) => Err(format!("`{key}` must be a string in a {status} result")),
        };
        let message = take(MESSAGE_KEY)?;
        let error = take(ERROR_KEY)?;
        let details = take(DETAILS_KEY)?;

        if let Some(key) = fields.keys().next() {
            return Err(format!("unexpected field `{key}` in a {status} result"));
        }

        match (status, message, error, details) {
            (WorkerStatus::Error, None, Some(error), Some(details)) => {
                Ok(Self::error_with_details(error, details))
            }
            (WorkerStatus::Error, Some(message), None, None) => Ok(Self::error(message)),
            (WorkerStatus::Skipped, Some(message), None, None) => Ok(Self::skipped(message)),
            _ => Err(format!(
                "a {status} result needs either `message` or both `error` and `details`"
            )),
        }
    }
}

impl WorkerResult {
    /// A payload key named `status` is dropped when the result is serialized.
    pub fn ok(payload: Payload) -> Self {
        Self {
            status: WorkerStatus::Ok,
            payload: Some(payload),
            message: None,
            details: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: WorkerStatus::Error,
            payload: None,
            message: Some(message.into()),
            details: None,
        }
    }

    /// Error marker with an extra diagnostic string; serialized with an
    /// `error` key instead of `message`.
    pub fn error_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::error(message)
        }
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            status: WorkerStatus::Skipped,
            payload: None,
            message: Some(message.into()),
            details: None,
        }
    }

    pub fn from_failure(failure: &WorkerFailure) -> Self {
        Self::error(failure.to_string())
    }

    pub const fn status(&self) -> WorkerStatus {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == WorkerStatus::Ok
    }

    pub const fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// A top-level payload field, treating `null` as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload
            .as_ref()?
            .get(name)
            .filter(|value| !value.is_null())
    }

    /// Resolve a JSON pointer (`/detections/0/label`) inside the payload.
    ///
    /// Returns `None` for non-ok results and for paths that do not resolve.
    pub fn resolve(&self, pointer: &str) -> Option<&Value> {
        let payload = self.payload.as_ref()?;
        let path = pointer.strip_prefix('/')?;
        let (head, rest) = match path.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = payload.get(head)?;
        match rest {
            Some(rest) => value.pointer(&format!("/{rest}")),
            None => Some(value),
        }
    }
}
