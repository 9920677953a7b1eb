use serde::Deserialize;

/// Return codes the backend documents. Anything else fails the check.
pub const ALLOWED_RETURN_CODES: [&str; 17] = [
    "SUCCESS",
    "NOT_AUTHORIZED",
    "INTERNAL_SERVER_ERROR",
    "USER_NOT_FOUND",
    "PAGE_REQUEST_FAIL",
    "INVALID_ACCOUNT_ID",
    "MEMBER_ALREADY_EXISTS",
    "INVALID_ROLE",
    "GRADE_NOT_FOUND",
    "INVALID_SUBJECT",
    "ATTENDANCE_NOT_FOUND",
    "FEEDBACK_NOT_FOUND",
    "COUNSEL_NOT_FOUND",
    "SPECIALTY_NOT_FOUND",
    "INVALID_SEMESTER",
    "CLASSID_NOT_FOUND",
    "NOTIFICATION_NOT_FOUND",
];

/// Placeholder reported when a body has no `returnCode`.
pub const NO_RETURN_CODE: &str = "NO_CODE";

const FILTER_SEGMENT: &str = "filter";

/// How a step's response is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCheck {
    /// HTTP status must equal the value.
    Status(u16),
    /// Body must be JSON whose `returnCode` is in [`ALLOWED_RETURN_CODES`].
    KnownReturnCode,
    /// Fire and forget.
    None,
}

#[derive(Debug, Deserialize)]
struct ReturnCodeBody {
    #[serde(rename = "returnCode")]
    return_code: Option<serde_json::Value>,
}

#[must_use]
pub fn is_known_return_code(code: &str) -> bool {
    ALLOWED_RETURN_CODES.contains(&code)
}

/// Reads `returnCode` from a JSON body. `Ok(None)` when the field is absent,
/// null, or empty; `Err` when the body is not JSON.
///
/// # Errors
///
/// Returns the JSON error when the body cannot be parsed.
pub fn extract_return_code(body: &[u8]) -> Result<Option<String>, serde_json::Error> {
    let parsed: ReturnCodeBody = serde_json::from_slice(body)?;
    let code = match parsed.return_code {
        Some(serde_json::Value::String(code)) if !code.is_empty() => Some(code),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        Some(
            serde_json::Value::Null
            | serde_json::Value::Bool(_)
            | serde_json::Value::String(_)
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_),
        )
        | None => None,
    };
    Ok(code)
}

/// Metric tag for a URL: query strings and path ids after `filter` are cut so
/// `/grade/filter/17?year=1` and `/grade/filter/18?year=1` group together.
/// The cut keeps the first `/` or `?` after `filter`.
#[must_use]
pub fn metric_tag(url: &str) -> &str {
    let Some(filter_idx) = url.find(FILTER_SEGMENT) else {
        return url;
    };
    let after_start = filter_idx.saturating_add(FILTER_SEGMENT.len());
    let Some(after) = url.get(after_start..) else {
        return url;
    };
    let Some(next_idx) = after.find(['?', '/']) else {
        return url;
    };
    let end = after_start.saturating_add(next_idx).saturating_add(1);
    url.get(..end).unwrap_or(url)
}
