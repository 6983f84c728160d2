//! Batch result summary and exit status

use crate::batch::{BatchAction, ResourceBatchResult};

pub const EXIT_SUCCESS: u8 = 0;
/// Unreadable or undecodable input, bad configuration, or nothing to do
pub const EXIT_INVALID_INPUT: u8 = 1;
/// The datastore rejected some or all resources
pub const EXIT_APPLY_FAILED: u8 = 2;

/// What to print and how to exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub lines: Vec<String>,
    pub exit_code: u8,
}

impl Report {
    fn new(exit_code: u8, lines: Vec<String>) -> Self {
        Self { lines, exit_code }
    }
}

/// Summarise a batch for the user.
pub fn summarize(result: &ResourceBatchResult, action: BatchAction) -> Report {
    let verb = action.verb();
    let done = action.past_tense();
    let err = result
        .err
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    // "'ipPool' " or nothing
    let kind = result
        .single_kind
        .map(|k| format!("'{}' ", k))
        .unwrap_or_default();

    if result.file_invalid {
        return Report::new(
            EXIT_INVALID_INPUT,
            vec![format!("Failed to execute command: {}", err)],
        );
    }

    if result.num_handled == 0 {
        if result.num_resources == 0 {
            return Report::new(
                EXIT_INVALID_INPUT,
                vec!["No resources specified in file".to_string()],
            );
        }
        let line = match (result.num_resources, result.single_kind) {
            (1, Some(k)) => format!("Failed to {} '{}' resource: {}", verb, k, err),
            (_, Some(k)) => format!("Failed to {} any '{}' resources: {}", verb, k, err),
            (_, None) => format!("Failed to {} any resources: {}", verb, err),
        };
        return Report::new(EXIT_APPLY_FAILED, vec![line]);
    }

    if result.err.is_none() {
        return Report::new(
            EXIT_SUCCESS,
            vec![format!("Successfully {} {} {}resource(s)", done, result.num_handled, kind)],
        );
    }

    Report::new(
        EXIT_APPLY_FAILED,
        vec![
            format!(
                "Partial success: {} the first {} out of {} {}resources:",
                done, result.num_handled, result.num_resources, kind
            ),
            format!("Hit error: {}", err),
        ],
    )
}
