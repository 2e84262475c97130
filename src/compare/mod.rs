//! Proofreading: ask an LLM to diff recognized text against a reference.
//!
//! The model answers in free form; the first-to-last brace span is parsed as
//! a `ComparisonReport` and anything unparseable is kept verbatim as a single
//! "分析" entry so the user still sees what the model said.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm::{LlmClient, LlmError};

/// Greedy, multi-line brace span.
static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{.*\}").expect("JSON span pattern is valid")
});

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("缺少比对文本")]
    MissingText,

    #[error("{0}")]
    Llm(#[from] LlmError),
}

/// One textual difference between source and target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    /// 错字, 漏字, 多字, 异体字...
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub original: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub current: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunctuationIssue {
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue: String,
}

/// Structured proofreading result.
///
/// Models answer with `null` for a missing character and numbers for
/// positions, so every text field accepts any JSON scalar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub differences: Vec<Difference>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub punctuation: Vec<PunctuationIssue>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub suggestions: Vec<String>,
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(scalar_to_string)
}

fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(scalar_to_string).collect(),
        Value::Null => Vec::new(),
        other => vec![scalar_to_string(other)],
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ComparisonReport {
    /// Report carrying only the raw model output.
    pub fn raw(content: &str) -> Self {
        Self {
            differences: vec![Difference {
                kind: "分析".to_string(),
                original: String::new(),
                current: String::new(),
                position: content.to_string(),
            }],
            punctuation: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Report shown when the analysis itself failed.
    pub fn from_error(message: &str) -> Self {
        Self {
            differences: Vec::new(),
            punctuation: Vec::new(),
            suggestions: vec![format!("分析出错: {}", message)],
        }
    }

    pub fn is_clean(&self) -> bool {
        self.differences.is_empty() && self.punctuation.is_empty()
    }
}

/// Build the proofreading prompt. `source` is treated as the standard text.
pub fn build_compare_prompt(source: &str, target: &str) -> String {
    format!(
        "你是一位专业的古籍研究专家。请仔细比对以下两段清代古籍文本的差异：

【原图识别文本（标准版本）】
{source}

【待校对文本】
{target}

请进行专业的文献校对分析，包括：
1. 逐字比对，找出所有文字差异（错字、漏字、多字）
2. 标点符号使用的差异
3. 繁简体、异体字使用情况
4. 给出专业的修改建议

请严格按照以下JSON格式输出：
{{
  \"differences\": [
    {{\"type\": \"错字\", \"original\": \"原文字\", \"current\": \"现文字\", \"position\": \"位置说明\"}}
  ],
  \"punctuation\": [
    {{\"issue\": \"标点问题说明\"}}
  ],
  \"suggestions\": [\"建议1\", \"建议2\"]
}}"
    )
}

/// Span from the first `{` to the last `}`, if any.
pub fn extract_json(content: &str) -> Option<&str> {
    JSON_OBJECT.find(content).map(|m| m.as_str())
}

/// Parse model output, falling back to a raw report.
pub fn parse_report(content: &str) -> ComparisonReport {
    let Some(json) = extract_json(content) else {
        debug!("No JSON object in model output");
        return ComparisonReport::raw(content);
    };

    match serde_json::from_str(json) {
        Ok(report) => report,
        Err(e) => {
            debug!("Model output is not a report: {}", e);
            ComparisonReport::raw(content)
        }
    }
}

/// Runs proofreading through an LLM.
pub struct TextComparer {
    llm: LlmClient,
}

impl TextComparer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub fn llm(&self) -> &LlmClient {
        &self.llm
    }

    /// Compare `target` against `source`.
    pub async fn compare(
        &self,
        source: &str,
        target: &str,
    ) -> Result<ComparisonReport, CompareError> {
        if source.trim().is_empty() || target.trim().is_empty() {
            return Err(CompareError::MissingText);
        }

        let prompt = build_compare_prompt(source, target);
        let content = self.llm.complete(&prompt).await.map_err(|e| {
            warn!("Comparison failed: {}", e);
            e
        })?;

        let report = parse_report(&content);
        info!(
            "Comparison done: {} differences, {} punctuation issues",
            report.differences.len(),
            report.punctuation.len()
        );
        Ok(report)
    }
}
