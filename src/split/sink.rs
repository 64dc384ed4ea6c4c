use std::io::{self, Write};

use tempfile::NamedTempFile;

use crate::split::io_common::sanitize_file_name;
use crate::split::*;

/// Writes the artifacts of a run into a directory.
pub struct FsSink {
    directory: PathBuf,
    structured_path: PathBuf,
    renderer: MarkdownRenderer,
}

impl FsSink {
    pub fn new(directory: &Path, structured_file_name: &str) -> FsSink {
        FsSink {
            directory: directory.to_path_buf(),
            structured_path: directory.join(sanitize_file_name(structured_file_name)),
            renderer: MarkdownRenderer,
        }
    }

    pub fn document_path(&self, document: &QualitativeDocument) -> PathBuf {
        let file_name = format!(
            "{}.{}",
            sanitize_file_name(&document.name),
            self.renderer.extension()
        );
        self.directory.join(file_name)
    }
}

impl FsSink {
    // Respondents may share a name and be written by several workers at once.
    // The content goes to a temporary file that is then renamed over the target,
    // so the target always holds one complete artifact.
    fn replace_file(&self, path: &Path, content: &str) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.directory)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path)?;
        Ok(())
    }
}

impl ArtifactSink for FsSink {
    fn write_structured(&self, text: &str) -> io::Result<()> {
        debug!("write_structured: {:?}", self.structured_path);
        self.replace_file(&self.structured_path, text)
    }

    fn write_document(&self, document: &QualitativeDocument) -> io::Result<()> {
        let p = self.document_path(document);
        debug!("write_document: {:?}", p);
        self.replace_file(&p, &self.renderer.render(document))
    }
}
