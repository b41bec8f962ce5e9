use crate::domain::model::{NegativeReviewRow, StructuredAnalysis};
use crate::utils::error::{Result, ReviewError};

const OVERALL_MARKER: &str = "Overall Sentiment:";
const NEGATIVE_SECTION_MARKER: &str = "Negative Reviews:";
const ISSUE_MARKER: &str = "Issue Summary:";

pub const CSV_HEADER: [&str; 5] = [
    "Username",
    "Review",
    "Issue Summary",
    "Business Name",
    "Overall Sentiment",
];

/// 從模型的自由文字回覆中擷取整體情緒與負評清單
///
/// 沒有 `Negative Reviews:` 區段時回傳 `ParseError`，呼叫端改為只顯示原文。
pub fn parse_analysis(raw_text: &str) -> Result<StructuredAnalysis> {
    let overall_sentiment = raw_text
        .lines()
        .find_map(|line| line.split_once(OVERALL_MARKER))
        .map(|(_, rest)| rest.trim().to_string());

    let mut in_negative_section = false;
    let mut open_entry: Option<(String, String)> = None;
    let mut negative_reviews = Vec::new();

    for line in raw_text.lines() {
        let line = line.trim();

        if line.contains(NEGATIVE_SECTION_MARKER) {
            in_negative_section = true;
            continue;
        }

        if !in_negative_section || line.is_empty() {
            continue;
        }

        if let Some(summary) = line.strip_prefix(ISSUE_MARKER) {
            if let Some((username, review_text)) = open_entry.take() {
                negative_reviews.push(NegativeReviewRow {
                    username,
                    review_text,
                    issue_summary: summary.trim().to_string(),
                });
            }
        } else if open_entry.is_none() {
            if let Some((username, review_text)) = line.split_once(':') {
                open_entry = Some((username.trim().to_string(), review_text.trim().to_string()));
            }
        }
    }

    if !in_negative_section {
        return Err(ReviewError::ParseError {
            message: format!("response has no '{}' section", NEGATIVE_SECTION_MARKER),
        });
    }

    if let Some((username, _)) = open_entry {
        tracing::debug!("Dropping entry for '{}' without an issue summary", username);
    }

    Ok(StructuredAnalysis {
        overall_sentiment,
        negative_reviews,
    })
}

/// 分段請求時逐一解析每段回覆再合併
///
/// 第一個有 `Overall Sentiment:` 的回覆決定整體情緒，負評依回覆順序串接。
/// 沒有 `Negative Reviews:` 區段的回覆不貢獻任何列；全部都沒有時回傳 `ParseError`。
pub fn parse_responses<T: AsRef<str>>(responses: &[T]) -> Result<StructuredAnalysis> {
    let mut merged: Option<StructuredAnalysis> = None;

    for (index, response) in responses.iter().enumerate() {
        let parsed = match parse_analysis(response.as_ref()) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Response {}/{}: {}", index + 1, responses.len(), e);
                continue;
            }
        };

        match merged.as_mut() {
            None => merged = Some(parsed),
            Some(acc) => {
                if acc.overall_sentiment.is_none() {
                    acc.overall_sentiment = parsed.overall_sentiment;
                }
                acc.negative_reviews.extend(parsed.negative_reviews);
            }
        }
    }

    merged.ok_or_else(|| ReviewError::ParseError {
        message: format!("no response has a '{}' section", NEGATIVE_SECTION_MARKER),
    })
}

/// One CSV row per parsed negative review, header always present.
pub fn render_csv(analysis: &StructuredAnalysis, business_name: Option<&str>) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    let business_name = business_name.unwrap_or("");
    let overall = analysis.overall_sentiment.as_deref().unwrap_or("");

    for row in &analysis.negative_reviews {
        writer.write_record([
            row.username.as_str(),
            row.review_text.as_str(),
            row.issue_summary.as_str(),
            business_name,
            overall,
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReviewError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ReviewError::ParseError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

/// 商家名稱來自外部 API，只保留 `[A-Za-z0-9_-]`，其餘字元換成底線
pub fn export_filename(business_name: Option<&str>) -> String {
    let sanitized = business_name
        .map(|name| {
            name.trim()
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .filter(|name| name.chars().any(|c| c.is_ascii_alphanumeric()));

    match sanitized {
        Some(name) => format!("negative_reviews_{}.csv", name),
        None => "negative_reviews.csv".to_string(),
    }
}
