//! Prompt templates for chunk summarization.

use huddle_llm::CompletionRequest;

/// Heading placed before caller-supplied instructions.
pub const CUSTOM_INSTRUCTIONS_HEADING: &str =
    "Additionally, please follow these specific instructions for this summary:";

/// System prompt for summarizing a reverse-chronological chat log.
pub fn system_prompt(language: &str) -> String {
    format!(
        "You're a highly capable summarization expert who provides succinct summaries of chat logs.\n\
         The chat log format consists of one line per message in the format \"Speaker: Message\".\n\
         The chat log lists the most recent messages first. Place more emphasis on recent messages.\n\
         The `\\n` within the message represents a line break.\n\
         Consider your summary as a whole and avoid repeating yourself unnecessarily.\n\
         The user understands {language} only.\n\
         So, the assistant needs to speak in {language}.\n"
    )
}

/// User prompt wrapping one chunk of chat text.
pub fn user_prompt(chunk_text: &str, custom_instructions: Option<&str>) -> String {
    let custom = custom_instructions
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("\n\n{CUSTOM_INSTRUCTIONS_HEADING}\n{s}"))
        .unwrap_or_default();

    format!(
        "Please summarize the following chat log to a flat markdown formatted bullet list.\n\
         Do not write a line by line summary. Instead, summarize the overall conversation.\n\
         Do not include greeting/salutation/polite expressions in summary.\n\
         Make the summary easy to read while maintaining a conversational tone and retaining meaning.\n\
         Write in a conversational register.{custom}\n\
         \n\
         {chunk_text}\n"
    )
}

/// Full request for one chunk.
pub fn chunk_request(
    chunk_text: &str,
    language: &str,
    custom_instructions: Option<&str>,
) -> CompletionRequest {
    CompletionRequest::new(
        system_prompt(language),
        user_prompt(chunk_text, custom_instructions),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_names_language() {
        let p = system_prompt("japanese");
        assert!(p.contains("understands japanese only"));
        assert!(p.contains("most recent messages first"));
    }

    #[test]
    fn user_prompt_embeds_chunk_last() {
        let p = user_prompt("Alice: hi\nBob: hello", None);
        assert!(p.trim_end().ends_with("Alice: hi\nBob: hello"));
        assert!(!p.contains(CUSTOM_INSTRUCTIONS_HEADING));
    }

    #[test]
    fn custom_instructions_appended_verbatim() {
        let p = user_prompt("Alice: hi", Some("Focus on action items."));
        assert!(p.contains(&format!(
            "{CUSTOM_INSTRUCTIONS_HEADING}\nFocus on action items."
        )));
        let heading_at = p.find(CUSTOM_INSTRUCTIONS_HEADING).unwrap();
        let chunk_at = p.find("Alice: hi").unwrap();
        assert!(heading_at < chunk_at);
    }

    #[test]
    fn blank_custom_instructions_ignored() {
        assert_eq!(user_prompt("x", Some("   ")), user_prompt("x", None));
    }
}
