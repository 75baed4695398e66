//! Prompt construction for the answer synthesizer.
//!
//! Retrieved fragments are rendered as `Source:`/`Content:` blocks and
//! embedded, together with the user's question, into a fixed instruction
//! template that restricts the model to the supplied context and requires
//! inline `[Source: <name>]` citations.

use crate::models::ScoredFragment;

/// Sentence the model must reply with when the context has no answer.
pub const REFUSAL: &str =
    "Based on the provided documents, I could not find an answer to this question.";

/// First assistant message of every conversation.
pub const GREETING: &str =
    "Hello! I am your personal research assistant. Please upload some documents to get started.";

/// Reply when a question arrives before any document has been indexed.
pub const NO_DOCUMENTS: &str = "Please upload a document before asking questions.";

/// Reply when no fragment shares a keyword with the question.
pub const NO_RELEVANT_CONTEXT: &str = "I couldn't find any relevant information in your documents to answer that question. Please try rephrasing or asking something else.";

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Renders retrieved fragments as the context block of the prompt.
pub fn build_context(fragments: &[ScoredFragment]) -> String {
    fragments
        .iter()
        .map(|sf| {
            format!(
                "Source: {}\nContent: {}",
                sf.fragment.source, sf.fragment.content
            )
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Embeds the context and question into the research-assistant template.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        r#"You are a Personal Research Assistant. Your sole purpose is to answer questions based ONLY on the provided document excerpts.

Follow these rules STRICTLY:
1. Synthesize your answer from the provided "CONTEXT" below. Do not use any external knowledge.
2. After a sentence or paragraph that uses information from a document, you MUST add a citation in the format `[Source: document_name.pdf]`.
3. If the answer is not in the context, you MUST reply with: "{refusal}"

Here is an example of how to answer:
---EXAMPLE CONTEXT---
Source: science-report.pdf
Content: The mitochondria is the powerhouse of the cell.
---END EXAMPLE CONTEXT---

QUESTION: "What is the mitochondria?"

CORRECT ANSWER:
The mitochondria is the powerhouse of the cell [Source: science-report.pdf].

---
Now, use the REAL context below to answer the user's question.
---

---CONTEXT---
{context}
---END OF CONTEXT---

QUESTION: "{question}"

ANSWER:
"#,
        refusal = REFUSAL,
        context = context,
        question = question,
    )
}
