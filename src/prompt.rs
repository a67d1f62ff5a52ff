//! Prompt assembly

/// Placeholder replaced by the natal summary in the default template
const NATAL_PLACEHOLDER: &str = "{natal}";

pub const DEFAULT_PROMPT_TEMPLATE: &str = "
根据我的星盘介绍我的 情感 婚姻 和家庭生活

星盘:

{natal}
";

/// Build the final prompt for a natal summary.
///
/// An empty custom template selects the built-in one. A custom template
/// replaces the instructions entirely and the summary follows on its own line.
pub fn build_prompt(custom_template: &str, natal: &str) -> String {
    if custom_template.is_empty() {
        DEFAULT_PROMPT_TEMPLATE
            .replacen(NATAL_PLACEHOLDER, natal, 1)
            .trim()
            .to_string()
    } else {
        format!("{}\n{}", custom_template, natal)
    }
}
