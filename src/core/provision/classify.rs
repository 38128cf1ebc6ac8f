//! Classification of Atlas errors into provisioning outcomes
//!
//! Each stream processing call site has its own classifier. Anything not recognised here
//! is fatal and aborts the run.

use crate::domain::AtlasApiError;
use serde::Deserialize;

/// `errorCode` returned when a connection name is taken
pub const CONNECTION_ALREADY_EXISTS_CODE: &str = "STREAM_CONNECTION_NAME_ALREADY_EXISTS";

/// `errorCode` returned when a processor name is taken
pub const PROCESSOR_ALREADY_EXISTS_CODE: &str = "STREAM_PROCESSOR_NAME_ALREADY_EXISTS";

/// `errorCode` returned when a stream instance name is taken
pub const INSTANCE_ALREADY_EXISTS_CODE: &str = "STREAM_TENANT_NAME_ALREADY_EXISTS";

/// Free-text fragment of `detail` for a taken stream instance name
///
/// Atlas does not always send a stable code for this case, so the detail text is
/// matched as well. Watch this when bumping the streams API version.
pub const INSTANCE_ALREADY_EXISTS_DETAIL: &str = "with this name already exists";

/// Fragment of the error text when starting a running processor
pub const PROCESSOR_ALREADY_STARTED_TEXT: &str = "already been started";

const CONFLICT: u16 = 409;

/// Closed set of outcomes for a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    AlreadyExists,
    AlreadyStarted,
    Fatal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_code: Option<String>,
    detail: Option<String>,
}

fn error_body(body: &str) -> ErrorBody {
    serde_json::from_str(body).unwrap_or_default()
}

fn conflict_body(err: &AtlasApiError) -> Option<ErrorBody> {
    match err {
        AtlasApiError::Status { status, body } if *status == CONFLICT => Some(error_body(body)),
        _ => None,
    }
}

fn conflict_with_code(err: &AtlasApiError, code: &str) -> RemoteOutcome {
    match conflict_body(err) {
        Some(body) if body.error_code.as_deref() == Some(code) => RemoteOutcome::AlreadyExists,
        _ => RemoteOutcome::Fatal,
    }
}

pub fn classify_stream_instance_error(err: &AtlasApiError) -> RemoteOutcome {
    let Some(body) = conflict_body(err) else {
        return RemoteOutcome::Fatal;
    };
    let code_matches = body.error_code.as_deref() == Some(INSTANCE_ALREADY_EXISTS_CODE);
    let detail_matches = body
        .detail
        .as_deref()
        .map(|d| d.to_lowercase().contains(INSTANCE_ALREADY_EXISTS_DETAIL))
        .unwrap_or(false);
    if code_matches || detail_matches {
        RemoteOutcome::AlreadyExists
    } else {
        RemoteOutcome::Fatal
    }
}

pub fn classify_connection_error(err: &AtlasApiError) -> RemoteOutcome {
    conflict_with_code(err, CONNECTION_ALREADY_EXISTS_CODE)
}

pub fn classify_processor_error(err: &AtlasApiError) -> RemoteOutcome {
    conflict_with_code(err, PROCESSOR_ALREADY_EXISTS_CODE)
}

pub fn classify_processor_start_error(err: &AtlasApiError) -> RemoteOutcome {
    match err {
        AtlasApiError::Status { body, .. } if body.contains(PROCESSOR_ALREADY_STARTED_TEXT) => {
            RemoteOutcome::AlreadyStarted
        }
        _ => RemoteOutcome::Fatal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn status(status: u16, body: &str) -> AtlasApiError {
        AtlasApiError::Status {
            status,
            body: body.to_string(),
        }
    }

    #[test_case(409, r#"{"errorCode":"STREAM_CONNECTION_NAME_ALREADY_EXISTS"}"#, RemoteOutcome::AlreadyExists ; "matching code")]
    #[test_case(409, r#"{"errorCode":"DUPLICATE_KEY"}"#, RemoteOutcome::Fatal ; "other code")]
    #[test_case(400, r#"{"errorCode":"STREAM_CONNECTION_NAME_ALREADY_EXISTS"}"#, RemoteOutcome::Fatal ; "not a conflict")]
    #[test_case(409, "not json", RemoteOutcome::Fatal ; "unparseable body")]
    fn test_classify_connection(code: u16, body: &str, expected: RemoteOutcome) {
        assert_eq!(classify_connection_error(&status(code, body)), expected);
    }

    #[test]
    fn test_classify_processor() {
        let err = status(409, r#"{"errorCode":"STREAM_PROCESSOR_NAME_ALREADY_EXISTS"}"#);
        assert_eq!(classify_processor_error(&err), RemoteOutcome::AlreadyExists);
        let err = status(409, r#"{"errorCode":"STREAM_CONNECTION_NAME_ALREADY_EXISTS"}"#);
        assert_eq!(classify_processor_error(&err), RemoteOutcome::Fatal);
    }

    #[test]
    fn test_classify_stream_instance_by_detail() {
        let err = status(
            409,
            r#"{"detail":"A stream instance with this name already exists.","errorCode":"SOMETHING"}"#,
        );
        assert_eq!(classify_stream_instance_error(&err), RemoteOutcome::AlreadyExists);
    }

    #[test]
    fn test_classify_stream_instance_by_code() {
        let err = status(409, r#"{"errorCode":"STREAM_TENANT_NAME_ALREADY_EXISTS"}"#);
        assert_eq!(classify_stream_instance_error(&err), RemoteOutcome::AlreadyExists);
        let err = status(409, r#"{"detail":"quota exceeded"}"#);
        assert_eq!(classify_stream_instance_error(&err), RemoteOutcome::Fatal);
    }

    #[test]
    fn test_classify_processor_start() {
        let err = status(400, r#"{"detail":"Processor has already been started"}"#);
        assert_eq!(classify_processor_start_error(&err), RemoteOutcome::AlreadyStarted);
        let err = status(404, r#"{"detail":"Processor not found"}"#);
        assert_eq!(classify_processor_start_error(&err), RemoteOutcome::Fatal);
        let err = AtlasApiError::Transport("reset".to_string());
        assert_eq!(classify_processor_start_error(&err), RemoteOutcome::Fatal);
    }
}
