use crate::core::articles::models::{PipelineError, WorkItem};

/// Positional indices of the logical columns within the sheet, resolved once
/// per run from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub topic: usize,
    pub description: usize,
    pub status: Option<usize>,
    pub link: Option<usize>,
}

impl ColumnSchema {
    /// Status index, required for write-back.
    pub fn status_required(&self) -> Result<usize, PipelineError> {
        self.status.ok_or(PipelineError::MissingColumn("status"))
    }

    /// Link index, required for write-back.
    pub fn link_required(&self) -> Result<usize, PipelineError> {
        self.link.ok_or(PipelineError::MissingColumn("link"))
    }
}

/// Maps header cells to column indices. Matching is case-insensitive and
/// whitespace-trimmed; the first occurrence wins if a header name repeats.
///
/// `topic` and `description` must resolve. `status` and `link` may be absent
/// here; the reconciler demands them before any write-back.
pub fn resolve_schema(header: &[String]) -> Result<ColumnSchema, PipelineError> {
    let mut topic = None;
    let mut description = None;
    let mut status = None;
    let mut link = None;

    for (i, cell) in header.iter().enumerate() {
        let name = cell.trim().to_lowercase();
        let slot = match name.as_str() {
            "topic" => &mut topic,
            "description" => &mut description,
            "status" => &mut status,
            "link" => &mut link,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(i);
        }
    }

    let topic = topic.ok_or(PipelineError::MissingColumn("topic"))?;
    let description = description.ok_or(PipelineError::MissingColumn("description"))?;

    Ok(ColumnSchema {
        topic,
        description,
        status,
        link,
    })
}

/// Returns the cell at `idx`, or an empty string when the row is shorter.
/// Rows in the sheets API drop trailing empty cells, so a short row means
/// "blank", not "malformed".
pub fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Filters rows down to the ones that still need work: topic and description
/// present, and status or link still blank. This predicate is what makes
/// re-running the pipeline safe; completed rows never come back as work.
pub fn list_work_items(rows: &[Vec<String>], schema: &ColumnSchema) -> Vec<WorkItem> {
    rows.iter()
        .filter_map(|row| {
            let topic = cell(row, schema.topic);
            let description = cell(row, schema.description);
            if topic.is_empty() || description.is_empty() {
                return None;
            }

            let status = schema.status.map(|i| cell(row, i)).unwrap_or("");
            let link = schema.link.map(|i| cell(row, i)).unwrap_or("");
            if !status.is_empty() && !link.is_empty() {
                return None;
            }

            Some(WorkItem {
                topic: topic.to_string(),
                description: description.to_string(),
            })
        })
        .collect()
}
