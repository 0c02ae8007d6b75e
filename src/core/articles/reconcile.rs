use std::collections::HashMap;

use crate::core::articles::models::{Outcome, PipelineError};
use crate::core::articles::schema::{cell, ColumnSchema};

/// Merges per-topic outcomes back into the original row set.
///
/// Rows are matched to outcomes by normalized topic (trimmed, lowercased).
/// Matched rows get exactly two cells rewritten, status and link; everything
/// else passes through untouched, in the original order, with the original
/// row count. The result is what a single bulk range update writes back.
///
/// A topic that differs only in whitespace or case still matches; a topic
/// that differs in any other byte silently does not, and its row is left
/// alone. Duplicate outcomes for one normalized topic resolve to the first
/// outcome in the list.
pub fn reconcile(
    rows: &[Vec<String>],
    outcomes: &[Outcome],
    schema: &ColumnSchema,
) -> Result<Vec<Vec<String>>, PipelineError> {
    let status_idx = schema.status_required()?;
    let link_idx = schema.link_required()?;

    let mut by_topic: HashMap<String, &Outcome> = HashMap::new();
    for outcome in outcomes {
        by_topic.entry(normalize(&outcome.topic)).or_insert(outcome);
    }

    let updated = rows
        .iter()
        .map(|row| {
            let key = normalize(cell(row, schema.topic));
            let outcome = match by_topic.get(key.as_str()) {
                Some(outcome) if !key.is_empty() => outcome,
                _ => return row.clone(),
            };

            let mut row = row.clone();
            // Short rows must be padded before the target cells exist.
            let width = status_idx.max(link_idx) + 1;
            while row.len() < width {
                row.push(String::new());
            }
            row[status_idx] = outcome.status.as_cell_text().to_string();
            row[link_idx] = outcome.link.clone().unwrap_or_default();
            row
        })
        .collect();

    Ok(updated)
}

fn normalize(topic: &str) -> String {
    topic.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::articles::models::StoredArtifact;
    use crate::core::articles::schema::resolve_schema;

    fn schema() -> ColumnSchema {
        let header: Vec<String> = ["Topic", "Description", "Status", "Link"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        resolve_schema(&header).unwrap()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn success(topic: &str, file_id: &str) -> Outcome {
        Outcome::success(
            topic,
            StoredArtifact {
                file_id: file_id.to_string(),
                link: format!("https://drive.google.com/file/d/{}/view", file_id),
            },
        )
    }

    #[test]
    fn matches_case_insensitively_and_writes_status_and_link() {
        let rows = vec![row(&["Cats", "About cats", "", ""])];
        let outcomes = vec![success("cats", "y")];

        let updated = reconcile(&rows, &outcomes, &schema()).unwrap();

        assert_eq!(
            updated,
            vec![row(&[
                "Cats",
                "About cats",
                "Success",
                "https://drive.google.com/file/d/y/view",
            ])]
        );
    }

    #[test]
    fn empty_outcome_list_is_identity() {
        let rows = vec![
            row(&["Cats", "About cats", "", ""]),
            row(&["Dogs", "About dogs", "Done", "http://x"]),
        ];

        let updated = reconcile(&rows, &[], &schema()).unwrap();
        assert_eq!(updated, rows);
    }

    #[test]
    fn preserves_row_count_and_order() {
        let rows = vec![
            row(&["C", "c", "", ""]),
            row(&["A", "a", "", ""]),
            row(&["B", "b", "", ""]),
        ];
        let outcomes = vec![success("A", "1"), success("B", "2")];

        let updated = reconcile(&rows, &outcomes, &schema()).unwrap();

        assert_eq!(updated.len(), rows.len());
        assert_eq!(updated[0][0], "C");
        assert_eq!(updated[1][0], "A");
        assert_eq!(updated[2][0], "B");
    }

    #[test]
    fn never_touches_cells_outside_status_and_link() {
        let rows = vec![row(&["Cats", "About cats", "old", "old-link", "extra"])];
        let outcomes = vec![Outcome::failure("Cats")];

        let updated = reconcile(&rows, &outcomes, &schema()).unwrap();

        assert_eq!(updated[0][0], "Cats");
        assert_eq!(updated[0][1], "About cats");
        assert_eq!(updated[0][2], "Failure");
        assert_eq!(updated[0][3], "");
        assert_eq!(updated[0][4], "extra");
    }

    #[test]
    fn pads_short_rows_so_target_cells_are_addressable() {
        let rows = vec![row(&["Cats", "About cats"])];
        let outcomes = vec![success("Cats", "z")];

        let updated = reconcile(&rows, &outcomes, &schema()).unwrap();

        assert_eq!(updated[0].len(), 4);
        assert_eq!(updated[0][2], "Success");
    }

    #[test]
    fn unmatched_rows_pass_through_unchanged() {
        let rows = vec![row(&["Birds", "About birds", "", ""])];
        let outcomes = vec![success("Cats", "y")];

        let updated = reconcile(&rows, &outcomes, &schema()).unwrap();
        assert_eq!(updated, rows);
    }

    #[test]
    fn trailing_whitespace_in_the_row_topic_still_matches() {
        // Both sides are trim-normalized before comparison.
        let rows = vec![row(&["Cats  ", "About cats", "", ""])];
        let outcomes = vec![success("cats", "y")];

        let updated = reconcile(&rows, &outcomes, &schema()).unwrap();
        assert_eq!(updated[0][2], "Success");
    }

    #[test]
    fn duplicate_outcomes_resolve_to_the_first_one() {
        let rows = vec![row(&["Cats", "About cats", "", ""])];
        let outcomes = vec![success("Cats", "first"), success("cats", "second")];

        let updated = reconcile(&rows, &outcomes, &schema()).unwrap();
        assert_eq!(updated[0][3], "https://drive.google.com/file/d/first/view");
    }

    #[test]
    fn blank_topic_rows_never_match() {
        let rows = vec![row(&["", "desc", "", ""])];
        let outcomes = vec![success("", "y")];

        let updated = reconcile(&rows, &outcomes, &schema()).unwrap();
        assert_eq!(updated, rows);
    }

    #[test]
    fn missing_status_or_link_column_is_a_hard_failure() {
        let header: Vec<String> = ["Topic", "Description"].iter().map(|c| c.to_string()).collect();
        let schema = resolve_schema(&header).unwrap();

        let err = reconcile(&[], &[], &schema).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn("status")));
    }

    #[test]
    fn failure_outcome_clears_the_link_cell() {
        let rows = vec![row(&["Cats", "About cats", "", "stale-link"])];
        let outcomes = vec![Outcome::failure("Cats")];

        let updated = reconcile(&rows, &outcomes, &schema()).unwrap();
        assert_eq!(updated[0][2], "Failure");
        assert_eq!(updated[0][3], "");
    }
}
