use colored::Colorize;
use reqkit::Comparison;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a step indicator
pub fn step(num: usize, total: usize, msg: &str) {
    println!("{} {}", format!("[{num}/{total}]").blue().bold(), msg);
}

/// Colored one-word status for a comparison
pub fn comparison_status(comparison: &Comparison) -> String {
    match comparison {
        Comparison::Unchanged => "unchanged".dimmed().to_string(),
        Comparison::Added => "added".green().to_string(),
        Comparison::Changed { .. } => "changed".yellow().to_string(),
        Comparison::Coarse { .. } if comparison.is_changed() => "changed*".yellow().to_string(),
        Comparison::Coarse { .. } => "unchanged*".dimmed().to_string(),
    }
}

/// Print the requirement tokens added and removed by a comparison
pub fn comparison_details(comparison: &Comparison) {
    match comparison {
        Comparison::Changed { added, removed } => {
            for token in removed {
                println!("    {} {}", "-".red(), token.red());
            }
            for token in added {
                println!("    {} {}", "+".green(), token.green());
            }
        }
        Comparison::Coarse {
            insertions,
            deletions,
        } => dim(&format!(
            "  could not parse, {insertions} line(s) added, {deletions} removed"
        )),
        Comparison::Unchanged | Comparison::Added => {}
    }
}
