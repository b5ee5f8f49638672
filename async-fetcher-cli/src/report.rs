//! Run summary
//!
//! Printed after every scenario as plain text or JSON.

use crate::config::ReportFormat;
use anyhow::Result;
use async_fetcher::{DelayOutcome, DispatchMode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;

/// One delivered result
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub label: String,
    pub payload: String,
    /// Milliseconds from scenario start to callback invocation
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<DelayOutcome>,
    pub callback_panicked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub started_at: String,
    pub dispatch: DispatchMode,
    pub delay_ms: u64,
    pub requested: usize,
    pub entries: Vec<ReportEntry>,
}

impl RunReport {
    pub fn new(
        scenario: &str,
        started_at: DateTime<Utc>,
        dispatch: DispatchMode,
        delay_ms: u64,
    ) -> Self {
        Self {
            scenario: scenario.to_string(),
            started_at: started_at.to_rfc3339(),
            dispatch,
            delay_ms,
            requested: 0,
            entries: Vec::new(),
        }
    }

    pub fn delivered(&self) -> usize {
        self.entries.len()
    }

    pub fn interrupted(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.delay == Some(DelayOutcome::Interrupted))
            .count()
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ReportFormat::Txt => Ok(self.render_txt()),
        }
    }

    fn render_txt(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== RUN SUMMARY ({}) ===", self.scenario);
        let _ = writeln!(out, "Started:     {}", self.started_at);
        let _ = writeln!(out, "Dispatch:    {}", self.dispatch);
        let _ = writeln!(out, "Delay:       {} ms", self.delay_ms);
        let _ = writeln!(out, "Requested:   {}", self.requested);
        let _ = writeln!(out, "Delivered:   {}", self.delivered());
        let _ = writeln!(out, "Interrupted: {}", self.interrupted());

        for entry in &self.entries {
            let delay = entry.delay.map(|d| format!(" [{}]", d)).unwrap_or_default();
            let panicked = if entry.callback_panicked { " (callback panicked)" } else { "" };
            let _ = writeln!(
                out,
                "  {:>8}: {} after {} ms{}{}",
                entry.label, entry.payload, entry.latency_ms, delay, panicked
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunReport {
        let mut report = RunReport::new("fetch", Utc::now(), DispatchMode::Pool, 1000);
        report.requested = 2;
        report.entries.push(ReportEntry {
            label: "#0".to_string(),
            payload: "Async Data".to_string(),
            latency_ms: 1001,
            delay: Some(DelayOutcome::Elapsed),
            callback_panicked: false,
        });
        report.entries.push(ReportEntry {
            label: "#1".to_string(),
            payload: "Async Data".to_string(),
            latency_ms: 120,
            delay: Some(DelayOutcome::Interrupted),
            callback_panicked: false,
        });
        report
    }

    #[test]
    fn test_counts() {
        let report = sample();
        assert_eq!(report.delivered(), 2);
        assert_eq!(report.interrupted(), 1);
    }

    #[test]
    fn test_txt_report() {
        let text = sample().render(ReportFormat::Txt).unwrap();
        assert!(text.contains("Dispatch:    pool"));
        assert!(text.contains("Interrupted: 1"));
        assert!(text.contains("Async Data after 120 ms [interrupted]"));
    }

    #[test]
    fn test_json_report() {
        let json = sample().render(ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["dispatch"], "pool");
        assert_eq!(value["entries"].as_array().unwrap().len(), 2);
        assert_eq!(value["entries"][1]["delay"], "interrupted");
    }
}
