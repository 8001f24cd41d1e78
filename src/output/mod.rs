//! Output formatting for CLI display
//!
//! Turns session notices, selections and outcomes into lines for an
//! [`OutputWriter`].

mod writer;

pub use writer::{BufferedWriter, MessageLevel, OutputWriter, StdoutWriter};

use crate::flow::FlowKind;
use crate::media::{MediaItem, MediaKind};
use crate::session::{MergeReport, SelectionOutcome, SessionNotice};
use colored::Colorize;

/// Format a media item for a listing
///
/// In quiet mode only the locator is printed.
#[must_use]
pub fn format_item(index: usize, item: &MediaItem, quiet: bool) -> String {
    if quiet {
        return item.locator().to_string();
    }

    let kind = match item.kind() {
        MediaKind::Image => "image".normal(),
        MediaKind::Gif => "gif".magenta(),
        MediaKind::Video => "video".cyan(),
    };
    format!("  {:>2}. {} [{kind}]", index + 1, item.locator())
}

/// Format a whole selection, one item per line
#[must_use]
pub fn format_selection(items: &[MediaItem], quiet: bool) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format_item(i, item, quiet))
        .collect()
}

/// Level and text for a notice
#[must_use]
pub fn describe_notice(notice: &SessionNotice) -> (MessageLevel, String) {
    match notice {
        SessionNotice::Started { seeded, rejected: 0 } => (
            MessageLevel::Info,
            format!("Picking started with {seeded} item(s) pre-selected"),
        ),
        SessionNotice::Started { seeded, rejected } => (
            MessageLevel::Warning,
            format!(
                "Picking started with {seeded} item(s) pre-selected, {rejected} not allowed"
            ),
        ),
        SessionNotice::Resumed(state) => {
            (MessageLevel::Info, format!("Resumed session ({state})"))
        }
        SessionNotice::CandidatesLoaded { count, folders } => (
            MessageLevel::Info,
            format!(
                "Loaded {count} candidate(s) in {} folder(s)",
                folders.saturating_sub(1)
            ),
        ),
        SessionNotice::FolderShown { index, name, count } => (
            MessageLevel::Info,
            format!("Showing folder {index} \"{name}\" ({count} item(s))"),
        ),
        SessionNotice::Merged(report) => merge_summary(report),
        SessionNotice::Previewed { removed, report } => {
            let (level, summary) = merge_summary(report);
            let message = if *removed > 0 {
                format!("Preview applied, {removed} unchecked. {summary}")
            } else {
                format!("Preview applied. {summary}")
            };
            (level, message)
        }
        SessionNotice::Added(locator) => (MessageLevel::Success, format!("Selected {locator}")),
        SessionNotice::Removed(locator) => (MessageLevel::Normal, format!("Deselected {locator}")),
        SessionNotice::NotSelected(locator) => {
            (MessageLevel::Info, format!("{locator} was not selected"))
        }
        SessionNotice::AlreadySelected(locator) => {
            (MessageLevel::Info, format!("{locator} is already selected"))
        }
        SessionNotice::ThresholdReached { threshold } => (
            MessageLevel::Warning,
            format!("You can select at most {threshold} item(s)"),
        ),
        SessionNotice::KindNotAllowed(kind) => (
            MessageLevel::Warning,
            format!("Selecting a {kind} is not allowed here"),
        ),
        SessionNotice::Replaced {
            index,
            previous,
            current,
        } => (
            MessageLevel::Success,
            format!("Cropped #{}: {previous} → {current}", index + 1),
        ),
        SessionNotice::SubFlowCancelled(kind) => {
            (MessageLevel::Info, format!("{} cancelled", flow_title(*kind)))
        }
        SessionNotice::SubFlowFailed { kind, reason } => (
            MessageLevel::Warning,
            format!("{} failed: {reason}", flow_title(*kind)),
        ),
        SessionNotice::NothingSelected => (
            MessageLevel::Warning,
            "Nothing selected yet, pick something or abort".to_string(),
        ),
        SessionNotice::Resolved { count } => (
            MessageLevel::Success,
            format!("Confirmed {count} item(s)"),
        ),
        SessionNotice::Cancelled => (MessageLevel::Warning, "Selection cancelled".to_string()),
    }
}

fn merge_summary(report: &MergeReport) -> (MessageLevel, String) {
    let mut message = format!("Added {} item(s)", report.added);
    if report.duplicates > 0 {
        message.push_str(&format!(", {} already selected", report.duplicates));
    }
    if report.dropped > 0 {
        message.push_str(&format!(", {} over the limit", report.dropped));
    }
    if report.rejected > 0 {
        message.push_str(&format!(", {} not allowed", report.rejected));
    }
    let level = if report.dropped > 0 {
        MessageLevel::Warning
    } else {
        MessageLevel::Success
    };
    (level, message)
}

/// Write a notice to the output
pub fn report_notice(output: &dyn OutputWriter, notice: &SessionNotice) {
    let (level, message) = describe_notice(notice);
    output.emit(level, &message);
}

/// Write the final outcome to the output
pub fn report_outcome(output: &dyn OutputWriter, outcome: &SelectionOutcome, quiet: bool) {
    match outcome {
        SelectionOutcome::Selected(items) => {
            for line in format_selection(items, quiet) {
                output.write(&line);
            }
        }
        SelectionOutcome::Cancelled => output.warning("No selection (cancelled)"),
        SelectionOutcome::Failed(reason) => output.error(&format!("Selection failed: {reason}")),
    }
}

const fn flow_title(kind: FlowKind) -> &'static str {
    match kind {
        FlowKind::Picking => "Picking",
        FlowKind::Capture => "Capture",
        FlowKind::Crop => "Crop",
        FlowKind::Preview => "Preview",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::Locator;
    use crate::testing::{image, video};

    #[test]
    fn test_format_item_quiet() {
        assert_eq!(format_item(0, &image("a"), true), "a.jpg");
    }

    #[test]
    fn test_format_item_is_one_based() {
        colored::control::set_override(false);
        assert_eq!(format_item(1, &video("v"), false), "   2. v.mp4 [video]");
    }

    #[test]
    fn test_merge_with_drops_is_warning() {
        let notice = SessionNotice::Merged(MergeReport {
            added: 1,
            duplicates: 0,
            dropped: 2,
            rejected: 0,
        });

        let (level, message) = describe_notice(&notice);

        assert_eq!(level, MessageLevel::Warning);
        assert_eq!(message, "Added 1 item(s), 2 over the limit");
    }

    #[test]
    fn test_preview_notice_mentions_unchecked() {
        let notice = SessionNotice::Previewed {
            removed: 2,
            report: MergeReport::default(),
        };

        let (level, message) = describe_notice(&notice);

        assert_eq!(level, MessageLevel::Success);
        assert_eq!(
            message,
            "Preview applied, 2 unchecked. Added 0 item(s)"
        );
    }

    #[test]
    fn test_start_with_rejected_seeds_is_warning() {
        let (level, message) = describe_notice(&SessionNotice::Started {
            seeded: 1,
            rejected: 2,
        });
        assert_eq!(level, MessageLevel::Warning);
        assert!(message.ends_with("2 not allowed"));

        let (level, _) = describe_notice(&SessionNotice::Started {
            seeded: 1,
            rejected: 0,
        });
        assert_eq!(level, MessageLevel::Info);
    }

    #[test]
    fn test_folder_notices() {
        let (_, loaded) = describe_notice(&SessionNotice::CandidatesLoaded {
            count: 5,
            folders: 3,
        });
        assert_eq!(loaded, "Loaded 5 candidate(s) in 2 folder(s)");

        let (_, shown) = describe_notice(&SessionNotice::FolderShown {
            index: 1,
            name: "Camera".into(),
            count: 4,
        });
        assert_eq!(shown, "Showing folder 1 \"Camera\" (4 item(s))");
    }

    #[test]
    fn test_nothing_selected_is_warning() {
        let (level, _) = describe_notice(&SessionNotice::NothingSelected);
        assert_eq!(level, MessageLevel::Warning);
        assert_eq!(flow_title(FlowKind::Preview), "Preview");
    }

    #[test]
    fn test_threshold_notice() {
        let (level, message) = describe_notice(&SessionNotice::ThresholdReached { threshold: 9 });
        assert_eq!(level, MessageLevel::Warning);
        assert!(message.contains('9'));
    }

    #[test]
    fn test_report_outcome() {
        let output = BufferedWriter::new();

        report_notice(&output, &SessionNotice::Added(Locator::new("a.jpg")));
        report_outcome(
            &output,
            &SelectionOutcome::Selected(vec![image("a"), image("b")]),
            true,
        );
        report_outcome(&output, &SelectionOutcome::Cancelled, true);

        assert_eq!(output.at(MessageLevel::Normal), vec!["a.jpg", "b.jpg"]);
        assert_eq!(output.at(MessageLevel::Success), vec!["Selected a.jpg"]);
        assert_eq!(output.at(MessageLevel::Warning).len(), 1);
    }
}
