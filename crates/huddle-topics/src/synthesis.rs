//! Rendering extracted topics for the model and tidying its answer.

use huddle_llm::CompletionRequest;

use crate::extract::TopicReport;

/// Render every method's topics as one bullet block.
///
/// Topics without terms are skipped. Method headings appear only when
/// `with_labels` is set.
pub fn render_block(channel: &str, report: &TopicReport, with_labels: bool) -> String {
    let mut block = format!("*Topic Analysis of #{channel}:*\n\n");
    for (method, set) in report {
        if with_labels {
            block.push_str(&format!("\n*{} Results:*\n", method.label()));
        }
        for terms in set.topics.iter().filter(|t| !t.is_empty()) {
            block.push_str(&format!(" • {}\n", terms.join(", ")));
        }
    }
    block
}

/// System prompt for the synthesis call.
pub fn system_prompt(language: &str) -> String {
    format!(
        "You are a topic analysis expert, you are synthesizing the results of various topic analysis \
         methods conducted on a chat channel's message history. You write conversationally and \
         never use technical terms like KMeans, LDA, clustering, or LSA. You always respond in \
         markdown formatting ready for chat. Use - for bullets, not *. \
         Respond in {language}."
    )
}

/// User prompt wrapping the rendered topic block.
pub fn user_prompt(channel: &str, block: &str) -> String {
    format!(
        "For the provided results from topic analyses on the entire history of the \"{channel}\" channel, \
         please provide a conversational summary and interpretation. Each bullet is a cluster under the \
         methodology heading; do not mention the methodology. When analyzing each cluster, please conflate \
         duplicates and ignore meaningless clusters. Do not include this prompt in your response. Please \
         provide a direct bullet-point analysis of the provided results. Avoid introductory or transitional \
         sentences. Focus directly on the content. Please do not split up your response based on the \
         analysis methodology; you should give one set of takeaways.\n\n{block}\n"
    )
}

/// Full synthesis request.
pub fn synthesis_request(channel: &str, block: &str, language: &str) -> CompletionRequest {
    CompletionRequest::new(system_prompt(language), user_prompt(channel, block))
}

/// Normalize bullets to `-`, bold to single `*`, and add the overview heading.
///
/// Each line is inspected on its own, so CRLF endings and indented `*` or
/// `•` markers are rewritten too. Bullet lines lose their indentation.
pub fn post_process(channel: &str, response: &str) -> String {
    let body = response
        .split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
        .replace("**", "*");
    format!("*Channel Overview: #{channel}*\n\n{body}")
}

fn normalize_line(line: &str) -> String {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let trimmed = line.trim_start();
    ["* ", "• ", "- "]
        .iter()
        .find_map(|bullet| trimmed.strip_prefix(bullet))
        .map_or_else(|| line.to_string(), |rest| format!("- {rest}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{MethodKind, TopicSet};

    fn set(method: MethodKind, topics: &[&[&str]]) -> TopicSet {
        TopicSet {
            method,
            topics: topics
                .iter()
                .map(|t| t.iter().map(|s| (*s).to_string()).collect())
                .collect(),
        }
    }

    fn report() -> TopicReport {
        [
            (MethodKind::Centroid, set(MethodKind::Centroid, &[&["deploy", "build"], &[]])),
            (MethodKind::Generative, set(MethodKind::Generative, &[&["lunch", "pizza"]])),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn block_without_labels() {
        let block = render_block("eng", &report(), false);
        assert_eq!(
            block,
            "*Topic Analysis of #eng:*\n\n • deploy, build\n • lunch, pizza\n"
        );
    }

    #[test]
    fn block_with_labels() {
        let block = render_block("eng", &report(), true);
        assert_eq!(
            block,
            "*Topic Analysis of #eng:*\n\n\n*Centroid Results:*\n • deploy, build\n\n*Generative Results:*\n • lunch, pizza\n"
        );
    }

    #[test]
    fn prompts_carry_channel_block_and_language() {
        let request = synthesis_request("eng", "BLOCK", "german");
        assert!(request.system.contains("Use - for bullets"));
        assert!(request.system.contains("Respond in german."));
        assert!(request.user.contains("\"eng\" channel"));
        assert!(request.user.ends_with("\n\nBLOCK\n"));
    }

    #[test]
    fn post_process_normalizes_markdown() {
        let out = post_process("eng", "* **Deploys** keep failing\n* Lunch is pizza\n• Reviews");
        assert_eq!(
            out,
            "*Channel Overview: #eng*\n\n- *Deploys* keep failing\n- Lunch is pizza\n- Reviews"
        );
    }

    #[test]
    fn post_process_leaves_dash_bullets() {
        let out = post_process("eng", "- one\n- two");
        assert_eq!(out, "*Channel Overview: #eng*\n\n- one\n- two");
    }

    #[test]
    fn post_process_handles_crlf_and_indented_bullets() {
        let out = post_process(
            "eng",
            "Summary:\r\n* Deploys kept breaking\r\n  • Rollbacks helped\r\n  * **Lunch** was tacos",
        );
        assert_eq!(
            out,
            "*Channel Overview: #eng*\n\nSummary:\n- Deploys kept breaking\n- Rollbacks helped\n- *Lunch* was tacos"
        );
    }

    #[test]
    fn post_process_keeps_bold_lines_that_are_not_bullets() {
        let out = post_process("eng", "**Takeaways**\n* one");
        assert_eq!(out, "*Channel Overview: #eng*\n\n*Takeaways*\n- one");
    }
}
