//! System prompt construction.
//!
//! Renders a form configuration into the instruction text handed to the
//! language model. Output depends on the configuration alone, so the same
//! config always produces the same prompt.

use std::fmt::Write;

use super::config::{ConversationalFormConfig, Persona, PersonaStyle};
use super::schema::ExtractionSchemaField;
use super::topic::ConversationTopic;

/// Appended to the seeded system message of a new conversation.
pub const OPENING_INSTRUCTION: &str =
    "Begin the conversation with a brief, warm greeting, then ask about the first topic.";

/// Tone guidance for the preset persona styles.
fn style_guidance(style: PersonaStyle) -> &'static str {
    match style {
        PersonaStyle::Professional => {
            "You are a professional, courteous assistant. Be clear and efficient, \
             keep questions focused, and avoid slang."
        }
        PersonaStyle::Friendly => {
            "You are a friendly, approachable assistant. Be warm and encouraging, \
             and acknowledge what the user shares before moving on."
        }
        PersonaStyle::Casual => {
            "You are a relaxed, conversational assistant. Keep the tone light and \
             the questions short, like a chat between colleagues."
        }
        PersonaStyle::Formal => {
            "You are a formal assistant. Use complete sentences and precise wording, \
             and address the user respectfully."
        }
        PersonaStyle::Custom => "",
    }
}

fn render_persona(out: &mut String, persona: &Persona) {
    out.push_str("## Persona\n");
    match (persona.style, persona.custom_prompt.as_deref()) {
        (PersonaStyle::Custom, Some(prompt)) => out.push_str(prompt.trim()),
        (style, _) => out.push_str(style_guidance(style)),
    }
    out.push('\n');

    if !persona.behaviors.is_empty() {
        out.push_str("\nAlways:\n");
        for behavior in &persona.behaviors {
            let _ = writeln!(out, "- {}", behavior);
        }
    }

    if !persona.restrictions.is_empty() {
        out.push_str("\nNever:\n");
        for restriction in &persona.restrictions {
            let _ = writeln!(out, "- {}", restriction);
        }
    }
}

fn render_topic(out: &mut String, index: usize, topic: &ConversationTopic) {
    let _ = writeln!(
        out,
        "{}. {} [{}, depth: {}]: {} ({})",
        index + 1,
        topic.name,
        topic.priority.as_str(),
        topic.depth.as_str(),
        topic.description,
        topic.depth.guidance(),
    );
}

fn render_field(out: &mut String, field: &ExtractionSchemaField) {
    let _ = write!(
        out,
        "- {} ({}, {}): {}",
        field.field,
        field.field_type.as_str(),
        if field.required { "required" } else { "optional" },
        field.description,
    );
    if let Some(options) = &field.options {
        let _ = write!(out, " Options: {}.", options.join(", "));
    }
    out.push('\n');
}

/// Renders the system-level instruction for a form configuration.
pub fn build_system_prompt(config: &ConversationalFormConfig) -> String {
    let mut out = String::new();

    render_persona(&mut out, &config.persona);

    out.push_str("\n## Objective\n");
    out.push_str(config.objective.trim());
    out.push('\n');

    if let Some(context) = config.context.as_deref().filter(|c| !c.trim().is_empty()) {
        out.push_str("\n## Context\n");
        out.push_str(context.trim());
        out.push('\n');
    }

    if !config.topics.is_empty() {
        out.push_str("\n## Topics to cover\n");
        out.push_str(
            "Cover every required topic. Ask about important topics when the user is willing, \
             and optional topics only if time allows. Ask one question at a time.\n",
        );
        for (index, topic) in config.topics.iter().enumerate() {
            render_topic(&mut out, index, topic);
        }
    }

    if !config.extraction_schema.is_empty() {
        out.push_str("\n## Information to collect\n");
        for field in &config.extraction_schema {
            render_field(&mut out, field);
        }
    }

    out.push_str(
        "\n## Guidelines\n\
         - Keep responses concise and conversational.\n\
         - Do not ask for information the user has already given.\n\
         - When every required topic is covered, summarize what you collected and ask the user to confirm.\n",
    );

    out
}

/// Content of the system message that seeds a new conversation.
pub fn initial_system_message(config: &ConversationalFormConfig) -> String {
    format!("{}\n{}", build_system_prompt(config), OPENING_INSTRUCTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::schema::FieldType;
    use crate::domain::conversation::topic::{TargetDepth, TopicPriority};

    fn config() -> ConversationalFormConfig {
        ConversationalFormConfig::new(
            "Collect details about a broken device",
            vec![
                ConversationTopic::new("t1", "Device", "Which device is affected", TopicPriority::Required)
                    .with_depth(TargetDepth::Deep),
                ConversationTopic::new("t2", "Workarounds", "What they already tried", TopicPriority::Optional),
            ],
        )
        .with_context("Internal helpdesk for ACME staff")
        .with_schema(vec![ExtractionSchemaField::new(
            "deviceType",
            FieldType::Enum,
            true,
            "Type of device",
        )
        .with_options(["laptop", "printer"])
        .with_topic("t1")])
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(build_system_prompt(&config()), build_system_prompt(&config()));
    }

    #[test]
    fn includes_objective_and_context() {
        let prompt = build_system_prompt(&config());
        assert!(prompt.contains("## Objective\nCollect details about a broken device"));
        assert!(prompt.contains("Internal helpdesk for ACME staff"));
    }

    #[test]
    fn enumerates_topics_with_priority_and_depth() {
        let prompt = build_system_prompt(&config());
        assert!(prompt.contains("1. Device [required, depth: deep]: Which device is affected"));
        assert!(prompt.contains("2. Workarounds [optional, depth: moderate]"));
    }

    #[test]
    fn lists_schema_fields_with_options() {
        let prompt = build_system_prompt(&config());
        assert!(prompt.contains("- deviceType (enum, required): Type of device Options: laptop, printer."));
    }

    #[test]
    fn uses_custom_prompt_verbatim() {
        let config = config().with_persona(Persona::custom("You are Max, the ACME help bot."));
        let prompt = build_system_prompt(&config);
        assert!(prompt.starts_with("## Persona\nYou are Max, the ACME help bot.\n"));
    }

    #[test]
    fn appends_behaviors_and_restrictions_as_bullets() {
        let config = config().with_persona(
            Persona::new(PersonaStyle::Friendly)
                .with_behavior("Thank the user for details")
                .with_restriction("Promise repair dates"),
        );
        let prompt = build_system_prompt(&config);
        assert!(prompt.contains("friendly"));
        assert!(prompt.contains("Always:\n- Thank the user for details\n"));
        assert!(prompt.contains("Never:\n- Promise repair dates\n"));
    }

    #[test]
    fn omits_empty_sections() {
        let config = ConversationalFormConfig::new("Just chat", vec![]);
        let prompt = build_system_prompt(&config);
        assert!(!prompt.contains("## Context"));
        assert!(!prompt.contains("## Topics to cover"));
        assert!(!prompt.contains("## Information to collect"));
    }

    #[test]
    fn initial_message_adds_opening_instruction() {
        let message = initial_system_message(&config());
        assert!(message.starts_with(&build_system_prompt(&config())));
        assert!(message.ends_with(OPENING_INSTRUCTION));
    }
}
