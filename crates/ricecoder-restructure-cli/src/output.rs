// Output formatting and styling

use colored::Colorize;
use ricecoder_restructuring::{ChangeKind, RestructuringPreview, TransformationOutcome};

/// Output styling configuration
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl OutputStyle {
    /// Style without colors, for piped output and tests
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg)
        } else {
            format!("⚠ {}", msg)
        }
    }

    /// Format info message
    pub fn info(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "ℹ".blue(), msg)
        } else {
            format!("ℹ {}", msg)
        }
    }

    /// Format header
    pub fn header(&self, title: &str) -> String {
        if self.use_colors {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format one line of a unified diff
    pub fn diff_line(&self, line: &str) -> String {
        if !self.use_colors {
            return line.to_string();
        }
        if line.starts_with("+++") || line.starts_with("---") {
            line.bold().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else {
            line.to_string()
        }
    }

    /// Summary of one applied transformation
    pub fn outcome(&self, outcome: &TransformationOutcome) -> String {
        let mut lines = vec![self.success(&outcome.description)];
        for path in &outcome.added {
            lines.push(format!("    + {}", path.display()));
        }
        for path in &outcome.modified {
            lines.push(format!("    ~ {}", path.display()));
        }
        for (from, to) in &outcome.relocated {
            lines.push(format!("    {} -> {}", from.display(), to.display()));
        }
        lines.join("\n")
    }

    /// File list of a preview, with diffs when `with_diffs` is set
    pub fn preview(&self, preview: &RestructuringPreview, with_diffs: bool) -> String {
        if preview.is_empty() {
            return self.info("No changes");
        }

        let mut lines = vec![self.header("Pending changes:")];
        for change in &preview.changes {
            let marker = match change.kind {
                ChangeKind::Added => "A",
                ChangeKind::Modified => "M",
                ChangeKind::Deleted => "D",
            };
            lines.push(format!(
                "  {} {} (+{} -{})",
                marker,
                change.path.display(),
                change.insertions,
                change.deletions
            ));
            if with_diffs {
                lines.extend(change.diff.lines().map(|line| self.diff_line(line)));
            }
        }
        lines.join("\n")
    }
}

/// Print an error to stderr
pub fn print_error(msg: &str) {
    eprintln!("{}", OutputStyle::default().error(msg));
}

/// Print a warning to stderr
pub fn print_warning(msg: &str) {
    eprintln!("{}", OutputStyle::default().warning(msg));
}
