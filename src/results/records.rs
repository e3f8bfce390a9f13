// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Wire types of the Results REST API and payload decoding

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::Result;

/// Payload type tag stored in `Record.data.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    PipelineRun,
    TaskRun,
    Log,
}

impl DataType {
    // TODO: move to tekton.dev/v1 once the Results API serves it
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::PipelineRun => "tekton.dev/v1beta1.PipelineRun",
            DataType::TaskRun => "tekton.dev/v1beta1.TaskRun",
            DataType::Log => "results.tekton.dev/v1alpha2.Log",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordData {
    #[serde(rename = "type")]
    pub data_type: String,
    /// Base64 encoded JSON document
    #[serde(default)]
    pub value: String,
}

/// A single stored entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Full resource path, e.g. `ns/results/<uid>/records/<uid>`
    pub name: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub etag: String,
    pub data: RecordData,
}

impl Record {
    /// Decode the payload into a JSON value (null when empty)
    pub fn decode(&self) -> Result<serde_json::Value> {
        decode_value_json(&self.data.value)
    }
}

/// One page of records, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsList {
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl RecordsList {
    /// Keep at most `limit` records and drop the continuation token
    pub fn truncate(&mut self, limit: usize) {
        self.records.truncate(limit);
        self.next_page_token = None;
    }

    /// The continuation token, ignoring the empty string some servers send
    pub fn next_page(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogResult {
    pub name: String,
    /// Base64 encoded log text
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogResponse {
    pub result: LogResult,
}

/// Decode base64 text into a string
pub fn decode_value(value: &str) -> Result<String> {
    let bytes = general_purpose::STANDARD.decode(value)?;
    Ok(String::from_utf8(bytes)?)
}

/// Decode base64 then parse JSON; an empty value decodes to null
pub fn decode_value_json(value: &str) -> Result<serde_json::Value> {
    if value.is_empty() {
        return Ok(serde_json::Value::Null);
    }
    let text = decode_value(value)?;
    Ok(serde_json::from_str(&text)?)
}

/// Decode base64 log content; invalid UTF-8 becomes U+FFFD
pub fn decode_log(value: &str) -> Result<String> {
    let bytes = general_purpose::STANDARD.decode(value)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(text: &str) -> String {
        general_purpose::STANDARD.encode(text)
    }

    #[test]
    fn test_data_type_tags() {
        assert_eq!(DataType::PipelineRun.to_string(), "tekton.dev/v1beta1.PipelineRun");
        assert_eq!(DataType::TaskRun.to_string(), "tekton.dev/v1beta1.TaskRun");
        assert_eq!(DataType::Log.to_string(), "results.tekton.dev/v1alpha2.Log");
    }

    #[test]
    fn test_decode_value() {
        assert_eq!(decode_value(&encode("hello\nworld")).unwrap(), "hello\nworld");
        assert!(decode_value("not base64!").is_err());
    }

    #[test]
    fn test_decode_value_json_empty_is_null() {
        assert_eq!(decode_value_json("").unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn test_decode_value_json() {
        let value = encode(r#"{"metadata": {"name": "build-1"}}"#);
        assert_eq!(
            decode_value_json(&value).unwrap(),
            json!({"metadata": {"name": "build-1"}})
        );
        assert!(decode_value_json(&encode("{not json")).is_err());
    }

    #[test]
    fn test_records_list_deserialize() {
        let json = json!({
            "nextPageToken": "tok",
            "records": [{
                "name": "ns/results/r1/records/r1",
                "uid": "u1",
                "createTime": "2024-03-01T10:00:00.123456Z",
                "updateTime": "2024-03-01T10:05:00Z",
                "etag": "u1-1",
                "data": {"type": "tekton.dev/v1beta1.PipelineRun", "value": encode("{}")}
            }]
        });
        let list: RecordsList = serde_json::from_value(json).unwrap();
        assert_eq!(list.next_page(), Some("tok"));
        assert_eq!(list.records.len(), 1);
        let record = &list.records[0];
        assert_eq!(record.data.data_type, DataType::PipelineRun.as_str());
        assert!(record.create_time.is_some());
        assert_eq!(record.decode().unwrap(), json!({}));
    }

    #[test]
    fn test_records_list_missing_fields() {
        let list: RecordsList = serde_json::from_str("{}").unwrap();
        assert!(list.records.is_empty());
        assert_eq!(list.next_page(), None);

        let list: RecordsList = serde_json::from_str(r#"{"nextPageToken": ""}"#).unwrap();
        assert_eq!(list.next_page(), None);
    }

    #[test]
    fn test_truncate_clears_token() {
        let record = Record {
            name: "r".to_string(),
            uid: String::new(),
            create_time: None,
            update_time: None,
            etag: String::new(),
            data: RecordData {
                data_type: DataType::TaskRun.to_string(),
                value: String::new(),
            },
        };
        let mut list = RecordsList {
            next_page_token: Some("more".to_string()),
            records: vec![record; 5],
        };
        list.truncate(2);
        assert_eq!(list.records.len(), 2);
        assert_eq!(list.next_page_token, None);
    }

    #[test]
    fn test_decode_log_replaces_invalid_utf8() {
        let data = general_purpose::STANDARD.encode(b"ok\n\xff\xfe\n");
        assert_eq!(decode_log(&data).unwrap(), "ok\n\u{fffd}\u{fffd}\n");
        assert!(decode_value(&data).is_err());
        assert!(decode_log("not base64!").is_err());
    }
}
