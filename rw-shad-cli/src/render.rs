//! Step progress output

use colored::Colorize;

use rw_shad_core::pipeline::{PipelineObserver, StepReport, StepState};

/// Prints one line per finished step, followed by the step's output
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl PipelineObserver for TerminalRenderer {
    fn on_transition(&mut self, _index: usize, report: &StepReport) {
        if let Some(line) = render_step(report) {
            println!("{line}");
        }
    }
}

fn render_step(report: &StepReport) -> Option<String> {
    // Steps without a title only exist to show something after they ran
    if report.title.is_empty() {
        return None;
    }

    let head = match report.state {
        StepState::Pending | StepState::Running => return None,
        StepState::Succeeded => format!("{} {}", "✔".green(), report.title),
        StepState::Skipped => format!("{} {} {}", "↓".yellow(), report.title, "[SKIPPED]".dimmed()),
        StepState::Failed => format!("{} {}", "✖".red(), report.title),
        StepState::Tolerated => format!("{} {}", "⚠".yellow(), report.title),
    };

    let mut lines = vec![head];
    lines.extend(
        report
            .output
            .iter()
            .map(|line| format!("  {} {}", "→".dimmed(), line)),
    );
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(title: &str, state: StepState, output: &[&str]) -> StepReport {
        StepReport {
            title: title.to_string(),
            state,
            output: output.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_running_and_untitled_steps_are_silent() {
        assert!(render_step(&report("Fetching registry...", StepState::Running, &[])).is_none());
        assert!(render_step(&report("", StepState::Skipped, &[])).is_none());
    }

    #[test]
    fn test_output_follows_title() {
        colored::control::set_override(false);

        let rendered = render_step(&report(
            "Adding component(s)...",
            StepState::Succeeded,
            &["Skipping existing component:", "button"],
        ))
        .unwrap();

        assert_eq!(
            rendered,
            "✔ Adding component(s)...\n  → Skipping existing component:\n  → button"
        );
    }
}
