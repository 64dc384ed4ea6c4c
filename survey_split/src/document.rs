use crate::config::QualitativeDocument;

/// Turns the blocks of a document into the bytes of a file.
pub trait DocumentRenderer: Sync {
    fn render(&self, document: &QualitativeDocument) -> String;

    /// The file extension of the rendered documents, without the dot.
    fn extension(&self) -> &'static str;
}

/// Each block is a bold heading line, the answer on the next line, and a blank line.
pub struct MarkdownRenderer;

impl DocumentRenderer for MarkdownRenderer {
    fn render(&self, document: &QualitativeDocument) -> String {
        let mut out = String::new();
        for block in document.blocks.iter() {
            out.push_str(&format!("**{}**\n{}\n\n", block.label, block.answer));
        }
        out
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualitativeBlock;

    #[test]
    fn markdown_blocks() {
        let doc = QualitativeDocument {
            respondent: 0,
            identifier: "A1".to_string(),
            name: "Survey A1".to_string(),
            blocks: vec![
                QualitativeBlock {
                    label: "Q1".to_string(),
                    answer: "yes".to_string(),
                },
                QualitativeBlock {
                    label: "Detail".to_string(),
                    answer: "No Response".to_string(),
                },
            ],
        };
        assert_eq!(
            MarkdownRenderer.render(&doc),
            "**Q1**\nyes\n\n**Detail**\nNo Response\n\n"
        );
    }
}
