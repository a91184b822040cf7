//! Markdown text shown in the output panel

use research_types::Analyst;

/// Marker every error message starts with
pub const ERROR_MARKER: &str = "❌";

/// Numbered analyst summaries, one entry per analyst in engine order
pub fn format_analysts(analysts: &[Analyst]) -> String {
    analysts
        .iter()
        .enumerate()
        .map(|(i, analyst)| {
            format!(
                "**{}. {}**\n   - Role: {}\n   - Affiliation: {}\n   - Description: {}\n",
                i + 1,
                analyst.name,
                analyst.role,
                analyst.affiliation,
                analyst.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Analyst summary followed by instructions for the feedback box
pub fn feedback_prompt(topic: &str, analysts: &[Analyst]) -> String {
    format!(
        "## Analysts Generated for: '{}'\n\n\
         {}\n\n\
         **Please provide your feedback:**\n\
         - Type 'approve' to continue with these analysts\n\
         - Or provide specific feedback to regenerate analysts\n\
         - Example: 'Add a cybersecurity expert, remove the marketing analyst'",
        topic,
        format_analysts(analysts)
    )
}

pub fn final_report(report: &str) -> String {
    format!("## 📄 Final Research Report\n\n{}", report)
}
