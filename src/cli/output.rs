//! Output formatting for CLI

use crate::models::IngestResult;
use crate::session::SessionState;

/// Format the persisted session as a configuration summary
pub fn format_state(state: &SessionState, backend: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Data Source: {}\n", state.data_source));
    output.push_str(&format!(
        "Connection: {}\n",
        state.connection_config.summary(state.data_source)
    ));
    output.push_str(&format!(
        "Selected Columns ({}): {}\n",
        state.selected_columns.len(),
        state.selected_columns.join(", ")
    ));
    output.push_str(&format!("Backend: {}\n", backend));

    output
}

/// Format the available columns, marking the selected ones
pub fn format_columns(available: &[String], selected: &[String]) -> String {
    if available.is_empty() {
        return "No columns found for this data source\n".to_string();
    }

    let mut output = String::new();
    for column in available {
        let mark = if selected.contains(column) { "x" } else { " " };
        output.push_str(&format!("  [{}] {}\n", mark, column));
    }
    output.push_str(&format!(
        "{} of {} column(s) selected\n",
        selected.len(),
        available.len()
    ));
    output
}

/// Format a completed ingestion
pub fn format_result(result: &IngestResult) -> String {
    format!(
        "Ingestion Complete\n  Records Processed: {}\n  Message: {}\n  Timestamp: {}\n",
        result.records_count, result.message, result.timestamp
    )
}
