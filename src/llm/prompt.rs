use crate::retrieval::Hit;
use std::fmt::Write;

/// Numbered source blocks, one per ranked section
pub fn build_context(documents: &[Hit]) -> String {
    let mut context = String::new();
    for (idx, doc) in documents.iter().enumerate() {
        let meta = &doc.metadata;
        let act = non_empty_or(&meta.act_name, "Unknown Act");
        let section = non_empty_or(&meta.section_number, "Unknown");

        if idx > 0 {
            context.push('\n');
        }
        let _ = writeln!(
            context,
            "[Source {}] {} - Section {}\n{}",
            idx + 1,
            act,
            section,
            meta.text_preview
        );
    }
    context
}

pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a helpful legal assistant specializing in Indian law. Your role is to provide \
         clear, accurate guidance based on the provided legal documents.\n\
         **Context from Indian Legal Acts:**\n\
         {context}\n\
         **User Question:**\n\
         {question}\n\
         **Instructions:**\n\
         1. Answer the question based ONLY on the provided context\n\
         2. Cite specific sections and act names when providing information\n\
         3. If the context doesn't contain enough information, clearly state that\n\
         4. Use simple language while maintaining legal accuracy\n\
         5. Provide practical guidance where appropriate\n\
         6. Do not make up information not present in the context\n\
         **Answer:**"
    )
}

pub(crate) fn non_empty_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}
