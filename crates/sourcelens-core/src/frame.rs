//! Stack frame and service records.

use serde::{Deserialize, Serialize};

/// One entry of a stack trace.
///
/// `line_content`, `lines_before` and `lines_after` are filled in by
/// enrichment; the location fields are never invented by it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// 1-based line number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_content: Option<String>,
    /// Up to five preceding lines, newline-joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_before: Option<String>,
    /// Up to five following lines, newline-joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_after: Option<String>,
}

impl StackFrame {
    pub fn new(file_path: &str, line_number: i64) -> Self {
        StackFrame {
            file_path: Some(file_path.to_string()),
            line_number: Some(line_number),
            ..Default::default()
        }
    }

    pub fn with_column(mut self, column_number: i64) -> Self {
        self.column_number = Some(column_number);
        self
    }

    pub fn with_function(mut self, function_name: &str) -> Self {
        self.function_name = Some(function_name.to_string());
        self
    }

    /// Whether source context has been attached.
    pub fn is_enriched(&self) -> bool {
        self.line_content.is_some()
    }
}

/// The deployed service a trace belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRef {
    /// `owner/repo`
    #[serde(default)]
    pub repo_path: Option<String>,
}

impl ServiceRef {
    pub fn new(repo_path: &str) -> Self {
        ServiceRef {
            repo_path: Some(repo_path.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_json_uses_camel_case() {
        let frame = StackFrame::new("/build/file.js", 634)
            .with_column(4)
            .with_function("handler");
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "filePath": "/build/file.js",
                "lineNumber": 634,
                "columnNumber": 4,
                "functionName": "handler"
            })
        );
    }

    #[test]
    fn test_frame_deserializes_without_optional_fields() {
        let frame: StackFrame = serde_json::from_str(r#"{"filePath": "/file.js"}"#).unwrap();
        assert_eq!(frame.file_path.as_deref(), Some("/file.js"));
        assert!(frame.line_number.is_none());
        assert!(!frame.is_enriched());
    }
}
