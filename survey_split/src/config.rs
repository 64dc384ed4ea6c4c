// ********* Input data structures ***********

use snafu::prelude::*;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

/// How a column of the survey export is treated.
///
/// Demographic columns are kept in the structured table like Structured ones,
/// but they are never suppressed from the qualitative documents.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub enum Classification {
    Demographic,
    #[default]
    Structured,
    Qualitative,
}

impl FromStr for Classification {
    type Err = SplitError;

    /// Accepts the one-letter codes (`D`, `S`, `Q`) as well as the full names, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "demographic" => Ok(Classification::Demographic),
            "s" | "structured" => Ok(Classification::Structured),
            "q" | "qualitative" => Ok(Classification::Qualitative),
            _ => UnknownClassificationSnafu { value: s }.fail(),
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Classification::Demographic => "Demographic",
            Classification::Structured => "Structured",
            Classification::Qualitative => "Qualitative",
        };
        write!(f, "{}", s)
    }
}

/// The set of columns that a question links to.
///
/// Only built through `parse` or `from_indices`, so the indices are always
/// within the bounds of the survey.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct LinkTargets(pub(crate) BTreeSet<usize>);

impl LinkTargets {
    /// Parses a comma-separated list of column indices (0-based).
    ///
    /// An empty list is a link to the previous column. Every token must be a column index
    /// of the survey: a malformed token is an error, it is never read as column 0.
    pub fn parse(question: usize, link: &str, num_questions: usize) -> SplitResult<LinkTargets> {
        if link.trim().is_empty() {
            ensure!(
                question > 0,
                LinkParseSnafu {
                    question,
                    link,
                    token: ""
                }
            );
            return LinkTargets::from_indices(question, &[question - 1], num_questions);
        }
        let mut targets: Vec<usize> = Vec::new();
        for token in link.split(',') {
            let target = token.trim().parse::<usize>().ok().context(LinkParseSnafu {
                question,
                link,
                token: token.trim(),
            })?;
            targets.push(target);
        }
        LinkTargets::from_indices(question, &targets, num_questions)
    }

    pub fn from_indices(
        question: usize,
        targets: &[usize],
        num_questions: usize,
    ) -> SplitResult<LinkTargets> {
        for target in targets {
            ensure!(
                *target < num_questions,
                LinkOutOfRangeSnafu {
                    question,
                    target: *target,
                    num_questions
                }
            );
        }
        Ok(LinkTargets(targets.iter().cloned().collect()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &usize> {
        self.0.iter()
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.0.contains(&idx)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// One column of the survey.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    pub label: String,
    pub classification: Classification,
    pub(crate) has_link: bool,
    pub(crate) link_targets: LinkTargets,
    // Filled in once by the link resolution.
    pub(crate) linked_from: BTreeSet<usize>,
}

impl Question {
    pub fn new(label: &str) -> Question {
        Question {
            label: label.to_string(),
            classification: Classification::Structured,
            has_link: false,
            link_targets: LinkTargets::default(),
            linked_from: BTreeSet::new(),
        }
    }

    pub fn has_link(&self) -> bool {
        self.has_link
    }

    pub fn link_targets(&self) -> &LinkTargets {
        &self.link_targets
    }

    /// The questions that link to this one.
    pub fn linked_from(&self) -> &BTreeSet<usize> {
        &self.linked_from
    }

    pub fn is_timestamp(&self) -> bool {
        self.label.to_lowercase() == "timestamp"
    }
}

/// The classification and link of one question, as provided by the user.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionSpec {
    pub index: usize,
    pub classification: Classification,
    pub has_link: bool,
    /// Comma-separated column indices. Empty means the previous column.
    pub link: Option<String>,
}

/// The resolved questions of a survey.
///
/// It can only be obtained through `QuestionModel::resolve` (or the builder),
/// which computes `linked_from` for every question. It is not modified afterwards.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionModel {
    pub(crate) questions: Vec<Question>,
}

/// Options for one run.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Options {
    pub hide_timestamp: bool,
    /// The column that identifies a respondent. It may not be a Structured column.
    pub pic_index: usize,
    pub qualitative_prefix: String,
}

/// The answers of all the respondents, one row per respondent.
///
/// Invariant: every row has as many answers as there are columns in the header.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResponseTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResponseTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> SplitResult<ResponseTable> {
        ensure!(!header.is_empty(), EmptyHeaderSnafu {});
        for (idx, row) in rows.iter().enumerate() {
            ensure!(
                row.len() == header.len(),
                IngestionShapeSnafu {
                    // The header is the first line.
                    lineno: idx + 2,
                    expected: header.len(),
                    found: row.len()
                }
            );
        }
        Ok(ResponseTable { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn num_questions(&self) -> usize {
        self.header.len()
    }

    pub fn num_respondents(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, respondent: usize) -> Option<&[String]> {
        self.rows.get(respondent).map(|r| r.as_slice())
    }
}

// ******** Output data structures *********

/// The filtered table, before serialization.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StructuredTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QualitativeBlock {
    pub label: String,
    pub answer: String,
}

/// The content of the document of one respondent.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QualitativeDocument {
    /// Position of the respondent in the table (0-based).
    pub respondent: usize,
    pub identifier: String,
    /// `{prefix} {identifier}`
    pub name: String,
    pub blocks: Vec<QualitativeBlock>,
}

/// What happened to the document of one respondent.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub respondent: usize,
    pub name: String,
    pub result: SplitResult<()>,
}

#[derive(Debug)]
pub struct SplitReport {
    /// The number of data rows in the structured table.
    pub structured_rows: usize,
    /// In respondent order.
    pub documents: Vec<DocumentOutcome>,
}

impl SplitReport {
    pub fn failures(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.documents.iter().filter(|d| d.result.is_err())
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

// ********* Errors **********

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SplitError {
    #[snafu(display("The survey does not have any column"))]
    EmptyHeader {},

    #[snafu(display("Line {lineno}: expected {expected} answers but found {found}"))]
    IngestionShape {
        lineno: usize,
        expected: usize,
        found: usize,
    },

    #[snafu(display(
        "The questions describe {questions} columns but the responses have {columns} columns"
    ))]
    ModelMismatch { questions: usize, columns: usize },

    #[snafu(display("Question {question}: cannot read link {link:?}: {token:?} is not a column index"))]
    LinkParse {
        question: usize,
        link: String,
        token: String,
    },

    #[snafu(display(
        "Question {question}: link to column {target}, but the survey only has {num_questions} columns"
    ))]
    LinkOutOfRange {
        question: usize,
        target: usize,
        num_questions: usize,
    },

    #[snafu(display(
        "Question index {index} is out of range (the survey has {num_questions} columns)"
    ))]
    QuestionIndexOutOfRange { index: usize, num_questions: usize },

    #[snafu(display("Unknown question type {value:?}, expected one of D, S or Q"))]
    UnknownClassification { value: String },

    #[snafu(display(
        "The PIC column {index} ({label:?}) is Structured, choose a Demographic or Qualitative column"
    ))]
    PicIndexStructured { index: usize, label: String },

    #[snafu(display(
        "The PIC column {index} is out of range (the survey has {num_questions} columns)"
    ))]
    PicIndexOutOfRange { index: usize, num_questions: usize },

    #[snafu(display("Failed to write {name:?}: {source}"))]
    ArtifactWrite {
        name: String,
        source: std::io::Error,
    },

    #[snafu(display("Failed to start the worker pool"))]
    WorkerPool { source: rayon::ThreadPoolBuildError },
}

pub type SplitResult<T> = Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_codes() {
        assert_eq!(
            "Q".parse::<Classification>().unwrap(),
            Classification::Qualitative
        );
        assert_eq!(
            " demographic ".parse::<Classification>().unwrap(),
            Classification::Demographic
        );
        assert_eq!(
            "s".parse::<Classification>().unwrap(),
            Classification::Structured
        );
        assert!(matches!(
            "X".parse::<Classification>(),
            Err(SplitError::UnknownClassification { .. })
        ));
        assert_eq!(Classification::default(), Classification::Structured);
    }

    #[test]
    fn link_list() {
        let targets = LinkTargets::parse(1, "2, 4,3", 5).unwrap();
        let v: Vec<usize> = targets.iter().cloned().collect();
        assert_eq!(v, vec![2, 3, 4]);
    }

    #[test]
    fn link_empty_is_previous_column() {
        let targets = LinkTargets::parse(3, " ", 5).unwrap();
        let v: Vec<usize> = targets.iter().cloned().collect();
        assert_eq!(v, vec![2]);
        assert!(matches!(
            LinkTargets::parse(0, "", 5),
            Err(SplitError::LinkParse { question: 0, .. })
        ));
    }

    #[test]
    fn link_malformed() {
        match LinkTargets::parse(0, "1,x,3", 5) {
            Err(SplitError::LinkParse { token, .. }) => assert_eq!(token, "x"),
            x => panic!("unexpected {:?}", x),
        }
        assert!(matches!(
            LinkTargets::parse(0, "1,,3", 5),
            Err(SplitError::LinkParse { .. })
        ));
        assert!(matches!(
            LinkTargets::parse(0, "-1", 5),
            Err(SplitError::LinkParse { .. })
        ));
    }

    #[test]
    fn link_out_of_range() {
        assert!(matches!(
            LinkTargets::parse(0, "1,5", 5),
            Err(SplitError::LinkOutOfRange { target: 5, .. })
        ));
    }

    #[test]
    fn table_shape() {
        let header = vec!["a".to_string(), "b".to_string()];
        let ok = ResponseTable::new(header.clone(), vec![vec!["1".into(), "2".into()]]);
        assert_eq!(ok.unwrap().num_respondents(), 1);

        let bad = ResponseTable::new(
            header,
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
        );
        match bad {
            Err(SplitError::IngestionShape {
                lineno,
                expected,
                found,
            }) => {
                assert_eq!((lineno, expected, found), (3, 2, 1));
            }
            x => panic!("unexpected {:?}", x),
        }

        assert!(matches!(
            ResponseTable::new(vec![], vec![]),
            Err(SplitError::EmptyHeader {})
        ));
    }

    #[test]
    fn timestamp_label() {
        assert!(Question::new("TimeStamp").is_timestamp());
        assert!(!Question::new("Timestamp of visit").is_timestamp());
    }
}
