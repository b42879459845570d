//! Prompt construction for the text-generation model

use std::fmt::Write;

use super::types::ClassificationContext;
use crate::taxonomy::Topic;

/// Build the classification prompt.
///
/// The output depends only on the arguments, so identical requests produce
/// identical prompts.
pub fn build_prompt(topic: Topic, context: &ClassificationContext, force_create_new: bool) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(
        "You classify citizen reports for a city operations team. \
         Assign the report below to one subcategory of its topic.\n\n",
    );

    prompt.push_str("REPORT\n");
    let _ = writeln!(prompt, "Topic: {}", topic);
    let _ = writeln!(prompt, "Title: {}", context.title.trim());
    let _ = writeln!(prompt, "Description: {}", context.description.trim());
    if let Some(location) = context.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        let _ = writeln!(prompt, "Location: {}", location);
    }
    if !context.media_hints.is_empty() {
        let _ = writeln!(prompt, "Attached media: {}", context.media_hints.join("; "));
    }

    let _ = write!(prompt, "\nKNOWN SUBCATEGORIES FOR {}\n", topic.as_str().to_uppercase());
    if context.existing_subcategories.is_empty() {
        prompt.push_str("(none yet)\n");
    } else {
        for name in &context.existing_subcategories {
            let _ = writeln!(prompt, "- {}", name);
        }
    }

    prompt.push_str("\nRULES\n");
    if force_create_new {
        prompt.push_str(
            "1. Propose a new, more specific subcategory even if a known one is close.\n",
        );
    } else {
        prompt.push_str(
            "1. Reuse a known subcategory whenever one fits; \
             propose a new one only when none does.\n",
        );
    }
    prompt.push_str(
        "2. Names are short lowercase tokens joined with underscores, e.g. signal_issue.\n\
         3. confidence_score is a number between 0 and 1.\n\
         4. Give up to three alternative names, most likely first.\n\
         5. Keep the reasoning to one sentence.\n",
    );

    prompt.push_str(
        "\nANSWER FORMAT\n\
         {\n  \"subcategory_name\": \"...\",\n  \"confidence_score\": 0.0,\n  \
         \"is_new_subcategory\": false,\n  \"reasoning\": \"...\",\n  \
         \"alternative_suggestions\": [\"...\"]\n}\n\n\
         Reply with the JSON object and nothing else.",
    );

    prompt
}
