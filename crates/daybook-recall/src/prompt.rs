//! Prompt assembly for retrieval-augmented answering.
//!
//! Pure string building, kept separate from the engine so the exact prompt
//! shape is testable without I/O.

use daybook_core::RetrievalHit;

/// System instruction framing the assistant and its grounding requirement.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant with access to the user's journal \
entries. Use the provided context to answer questions about past events, meetings, and notes. \
Only rely on the journal entries you are given; if they do not contain the answer, say so.";

/// Literal marker the model is instructed to end its answer with.
pub const CITATION_MARKER: &str = "CITATIONS:";

/// Render retrieved entries as a 1-based ordinal context block.
pub fn context_block(hits: &[RetrievalHit]) -> String {
    if hits.is_empty() {
        return String::new();
    }
    let mut out = String::from("Here are some relevant journal entries:\n\n");
    for (i, hit) in hits.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} (Date: {})\n{}\n\n",
            i + 1,
            hit.title,
            hit.day,
            hit.body_text
        ));
    }
    out
}

/// Assemble the user-turn prompt: the context block (if any), the user's
/// verbatim question, and the trailing citation directive.
pub fn answer_prompt(question: &str, context: &str) -> String {
    let mut prompt = String::new();
    if !context.is_empty() {
        prompt.push_str(context);
    }
    prompt.push_str("User Question: ");
    prompt.push_str(question);
    prompt.push_str(
        "\n\nIMPORTANT: After your answer, on a new line, add 'CITATIONS: ' followed by ONLY the \
         numbers of the journal entries you actually used (e.g., 'CITATIONS: 1, 3'), or \
         'CITATIONS: none' if you used none.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::EntryDay;
    use uuid::Uuid;

    fn hit(title: &str, body: &str) -> RetrievalHit {
        RetrievalHit {
            entry_id: Uuid::new_v4(),
            title: title.to_string(),
            day: EntryDay::new(2026, 8, 7),
            body_text: body.to_string(),
            distance: 0.1,
        }
    }

    #[test]
    fn context_block_numbers_from_one() {
        let block = context_block(&[hit("First", "alpha"), hit("Second", "beta")]);
        assert!(block.contains("1. First (Date: 2026-08-07)\nalpha"));
        assert!(block.contains("2. Second (Date: 2026-08-07)\nbeta"));
    }

    #[test]
    fn context_block_empty_for_no_hits() {
        assert_eq!(context_block(&[]), "");
    }

    #[test]
    fn prompt_keeps_question_verbatim_and_demands_citations() {
        let prompt = answer_prompt("what did I discuss with Bob?", "CONTEXT\n");
        assert!(prompt.starts_with("CONTEXT\n"));
        assert!(prompt.contains("User Question: what did I discuss with Bob?"));
        assert!(prompt.contains("'CITATIONS: none'"));
    }

    #[test]
    fn prompt_without_context_has_no_leading_block() {
        let prompt = answer_prompt("anything?", "");
        assert!(prompt.starts_with("User Question: anything?"));
    }
}
