use data_encoding::HEXLOWER;
use serde_json::{Map, Value};

/// Verdict of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitVerdict {
    pub accepted: bool,
    pub detail: String,
}

impl SubmitVerdict {
    pub fn success() -> Self {
        Self {
            accepted: true,
            detail: String::new(),
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            accepted: false,
            detail: detail.into(),
        }
    }
}

/// Field names scanned in a JSON object response, in match order.
const RESULT_FIELDS: [&str; 5] = ["data", "code", "message", "info", "msg"];

/// Tokens scoring servers use to acknowledge a flag.
const SUCCESS_TOKENS: [&str; 3] = ["ok", "success", "成功"];

/// Tokens marking an explicit rejection.
const FAILURE_TOKENS: [&str; 4] = ["error", "错误", "重新提交", "失败"];

const UNPARSED: &str = "[unparsed result]";

/// Classify a scoring-server response body into a submission verdict.
///
/// Rules are tried in order: JSON object field scan, text token scan,
/// hex-encoded byte scan; the first match wins. The field names and token
/// tables are a compatibility contract with deployed scoring servers and
/// must not be extended ad hoc.
pub fn classify_response(body: &[u8]) -> SubmitVerdict {
    match std::str::from_utf8(body) {
        Ok(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => classify_object(&object),
            Ok(Value::String(inner)) => classify_text(&inner),
            _ => classify_text(text),
        },
        Err(_) => classify_bytes(body),
    }
}

fn classify_object(object: &Map<String, Value>) -> SubmitVerdict {
    for field in RESULT_FIELDS {
        let value = object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(field))
            .map(|(_, value)| value);
        let Some(value) = value else { continue };

        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let lowered = text.to_lowercase();
        if SUCCESS_TOKENS.iter().any(|token| lowered == *token) {
            return SubmitVerdict::success();
        }
        if FAILURE_TOKENS.iter().any(|token| lowered == *token) {
            return SubmitVerdict::failure(Value::Object(object.clone()).to_string());
        }
    }
    SubmitVerdict::failure(format!(
        "{}: {}",
        UNPARSED,
        Value::Object(object.clone())
    ))
}

fn classify_text(text: &str) -> SubmitVerdict {
    let lowered = text.to_lowercase();
    if SUCCESS_TOKENS.iter().any(|token| lowered.contains(token)) {
        return SubmitVerdict::success();
    }
    if FAILURE_TOKENS.iter().any(|token| lowered.contains(token)) {
        return SubmitVerdict::failure(text.to_string());
    }
    SubmitVerdict::failure(format!("{}: {}", UNPARSED, text))
}

fn classify_bytes(body: &[u8]) -> SubmitVerdict {
    let hex = HEXLOWER.encode(body);
    let hex_of = |token: &str| HEXLOWER.encode(token.as_bytes());
    if SUCCESS_TOKENS.iter().any(|token| hex.contains(&hex_of(token))) {
        return SubmitVerdict::success();
    }
    if FAILURE_TOKENS.iter().any(|token| hex.contains(&hex_of(token))) {
        return SubmitVerdict::failure(hex);
    }
    SubmitVerdict::failure(format!("{}: {}", UNPARSED, hex))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_object_success_field() {
        let verdict = classify_response(br#"{"data": "success"}"#);
        assert_eq!(verdict, SubmitVerdict::success());
    }

    #[test]
    fn test_json_object_success_is_case_insensitive() {
        let verdict = classify_response(br#"{"Code": "OK"}"#);
        assert_eq!(verdict, SubmitVerdict::success());
    }

    #[test]
    fn test_json_object_explicit_failure_carries_json() {
        let verdict = classify_response(br#"{"code": "error"}"#);
        assert!(!verdict.accepted);
        assert!(verdict.detail.contains("\"code\""));
        assert!(!verdict.detail.starts_with(UNPARSED));
    }

    #[test]
    fn test_json_object_cjk_failure_token() {
        let verdict = classify_response("{\"msg\": \"重新提交\"}".as_bytes());
        assert!(!verdict.accepted);
    }

    #[test]
    fn test_json_object_no_matching_field_is_unparsed() {
        let verdict = classify_response(br#"{"status": "fine"}"#);
        assert!(!verdict.accepted);
        assert!(verdict.detail.starts_with(UNPARSED));
    }

    #[test]
    fn test_json_object_field_scan_is_exact_not_substring() {
        // "okay" is not the token "ok".
        let verdict = classify_response(br#"{"data": "okay"}"#);
        assert!(!verdict.accepted);
        assert!(verdict.detail.starts_with(UNPARSED));
    }

    #[test]
    fn test_plain_text_success_substring() {
        let verdict = classify_response("提交成功".as_bytes());
        assert_eq!(verdict, SubmitVerdict::success());
    }

    #[test]
    fn test_plain_text_mixed_case_substring() {
        let verdict = classify_response(b"Submission OK!");
        assert_eq!(verdict, SubmitVerdict::success());
    }

    #[test]
    fn test_json_string_value_is_scanned_as_text() {
        let verdict = classify_response(br#""flag accepted: success""#);
        assert_eq!(verdict, SubmitVerdict::success());
    }

    #[test]
    fn test_plain_text_failure_carries_text() {
        let verdict = classify_response("提交失败".as_bytes());
        assert!(!verdict.accepted);
        assert_eq!(verdict.detail, "提交失败");
    }

    #[test]
    fn test_plain_text_unmatched_is_unparsed() {
        let verdict = classify_response(b"nothing to see here");
        assert!(!verdict.accepted);
        assert!(verdict.detail.starts_with(UNPARSED));
    }

    #[test]
    fn test_raw_bytes_hex_success() {
        // Invalid UTF-8, but the hex encoding contains 6f6b ("ok").
        let verdict = classify_response(&[0xff, 0x6f, 0x6b]);
        assert_eq!(verdict, SubmitVerdict::success());
    }

    #[test]
    fn test_raw_bytes_hex_failure() {
        // 0xff followed by "error".
        let mut body = vec![0xff];
        body.extend_from_slice(b"error");
        let verdict = classify_response(&body);
        assert!(!verdict.accepted);
        assert_eq!(verdict.detail, HEXLOWER.encode(&body));
    }

    #[test]
    fn test_raw_bytes_unmatched_is_unparsed_hex() {
        let verdict = classify_response(&[0xff, 0x00, 0x01]);
        assert!(!verdict.accepted);
        assert_eq!(verdict.detail, format!("{}: ff0001", UNPARSED));
    }
}
