use log::{debug, warn};
use snafu::prelude::*;

pub use crate::config::*;

/// A builder for the question model.
///
/// All the columns start as Structured questions without links.
///
/// ```
/// pub use survey_split::builder::Builder;
/// pub use survey_split::Classification;
/// # use survey_split::SplitError;
///
/// let model = Builder::new(&["Timestamp".to_string(), "Q1".to_string(), "Detail".to_string()])?
///     .classify(1, Classification::Qualitative)?
///     .link(1, "2")?
///     .build()?;
///
/// assert!(model.questions()[2].linked_from().contains(&1));
/// # Ok::<(), SplitError>(())
/// ```
pub struct Builder {
    _questions: Vec<Question>,
    // Raw link strings, parsed in build() once the classifications are final.
    _links: Vec<Option<String>>,
}

impl Builder {
    pub fn new(labels: &[String]) -> SplitResult<Builder> {
        ensure!(!labels.is_empty(), EmptyHeaderSnafu {});
        Ok(Builder {
            _questions: labels.iter().map(|l| Question::new(l)).collect(),
            _links: vec![None; labels.len()],
        })
    }

    pub fn classify(mut self, index: usize, classification: Classification) -> SplitResult<Builder> {
        let q = self.question_mut(index)?;
        q.classification = classification;
        Ok(self)
    }

    /// Declares a link from the question at `index` to the columns in `link`.
    ///
    /// link: comma-separated column indices. If empty, the previous column is used.
    /// The link is only read when the model is built, and only if the question is
    /// then Qualitative.
    pub fn link(mut self, index: usize, link: &str) -> SplitResult<Builder> {
        self.question_mut(index)?;
        self._links[index] = Some(link.to_string());
        Ok(self)
    }

    /// Removes the link of the question, if any.
    pub fn unlink(mut self, index: usize) -> SplitResult<Builder> {
        self.question_mut(index)?;
        self._links[index] = None;
        Ok(self)
    }

    pub fn apply(self, spec: &QuestionSpec) -> SplitResult<Builder> {
        let b = self.classify(spec.index, spec.classification)?;
        if spec.has_link {
            b.link(spec.index, spec.link.as_deref().unwrap_or(""))
        } else {
            b.unlink(spec.index)
        }
    }

    pub fn build(self) -> SplitResult<QuestionModel> {
        let mut questions = self._questions;
        let num_questions = questions.len();
        for (idx, (q, link)) in questions.iter_mut().zip(self._links).enumerate() {
            let link = match link {
                Some(l) => l,
                None => continue,
            };
            match q.classification {
                Classification::Qualitative => {
                    q.link_targets = LinkTargets::parse(idx, &link, num_questions)?;
                    q.has_link = true;
                }
                Classification::Structured | Classification::Demographic => {
                    warn!(
                        "Question {} ({:?}) is {} and cannot link to other questions, dropping its link {:?}",
                        idx, q.label, q.classification, link
                    );
                }
            }
        }
        debug!("build: {:?} questions", questions.len());
        QuestionModel::resolve(questions)
    }

    fn question_mut(&mut self, index: usize) -> SplitResult<&mut Question> {
        let num_questions = self._questions.len();
        self._questions
            .get_mut(index)
            .context(QuestionIndexOutOfRangeSnafu {
                index,
                num_questions,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(ls: &[&str]) -> Vec<String> {
        ls.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_structured() {
        let model = Builder::new(&labels(&["a", "b"])).unwrap().build().unwrap();
        assert!(model
            .questions()
            .iter()
            .all(|q| q.classification == Classification::Structured && !q.has_link()));
    }

    #[test]
    fn link_on_structured_is_dropped() {
        let model = Builder::new(&labels(&["a", "b", "c"]))
            .unwrap()
            .link(1, "2")
            .unwrap()
            .build()
            .unwrap();
        assert!(!model.questions()[1].has_link());
        assert!(model.questions()[2].linked_from().is_empty());
    }

    #[test]
    fn apply_spec_with_default_link() {
        let spec = QuestionSpec {
            index: 2,
            classification: Classification::Qualitative,
            has_link: true,
            link: None,
        };
        let model = Builder::new(&labels(&["a", "b", "c"]))
            .unwrap()
            .apply(&spec)
            .unwrap()
            .build()
            .unwrap();
        assert!(model.questions()[1].linked_from().contains(&2));
    }

    #[test]
    fn apply_spec_without_link_clears_previous_link() {
        let b = Builder::new(&labels(&["a", "b"]))
            .unwrap()
            .classify(1, Classification::Qualitative)
            .unwrap()
            .link(1, "0")
            .unwrap();
        let spec = QuestionSpec {
            index: 1,
            classification: Classification::Qualitative,
            has_link: false,
            link: Some("0".to_string()),
        };
        let model = b.apply(&spec).unwrap().build().unwrap();
        assert!(model.questions()[0].linked_from().is_empty());
    }

    #[test]
    fn index_out_of_range() {
        let res = Builder::new(&labels(&["a"]))
            .unwrap()
            .classify(3, Classification::Qualitative);
        assert!(matches!(
            res,
            Err(SplitError::QuestionIndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn malformed_link() {
        let res = Builder::new(&labels(&["a", "b", "c", "d"]))
            .unwrap()
            .classify(0, Classification::Qualitative)
            .unwrap()
            .link(0, "1,x,3")
            .unwrap()
            .build();
        assert!(matches!(res, Err(SplitError::LinkParse { .. })));
    }

    #[test]
    fn link_on_structured_is_not_parsed() {
        // An empty link on column 0 has no previous column to point to.
        let spec = QuestionSpec {
            index: 0,
            classification: Classification::Structured,
            has_link: true,
            link: None,
        };
        let model = Builder::new(&labels(&["a", "b"]))
            .unwrap()
            .apply(&spec)
            .unwrap()
            .link(1, "x")
            .unwrap()
            .build()
            .unwrap();
        assert!(model.questions().iter().all(|q| !q.has_link()));
    }

    #[test]
    fn link_is_read_with_final_classification() {
        let model = Builder::new(&labels(&["a", "b", "c"]))
            .unwrap()
            .link(1, "2")
            .unwrap()
            .classify(1, Classification::Qualitative)
            .unwrap()
            .build()
            .unwrap();
        assert!(model.questions()[2].linked_from().contains(&1));
    }

    #[test]
    fn link_index_out_of_range() {
        let res = Builder::new(&labels(&["a"])).unwrap().link(2, "0");
        assert!(matches!(
            res,
            Err(SplitError::QuestionIndexOutOfRange { index: 2, .. })
        ));
    }
}
