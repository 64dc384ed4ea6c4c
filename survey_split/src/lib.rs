pub mod builder;
mod config;
pub mod document;
pub mod manual;
pub mod progress;

use log::{debug, info, warn};
use rayon::prelude::*;
use snafu::prelude::*;

use std::collections::BTreeSet;

pub use crate::config::*;
pub use crate::document::{DocumentRenderer, MarkdownRenderer};
pub use crate::progress::{NoProgress, ProgressReporter, RecordingProgress};

use crate::progress::ProgressTracker;

/// Placeholder for a follow-up question left blank while its linking question was answered.
pub const NO_RESPONSE: &str = "No Response";

/// Missing answers and answers made only of whitespace are empty.
pub fn is_blank(answer: &str) -> bool {
    answer.trim().is_empty()
}

/// Where the artifacts of a run are stored.
///
/// Implementations must accept concurrent calls to `write_document`.
pub trait ArtifactSink: Sync {
    fn write_structured(&self, text: &str) -> std::io::Result<()>;

    fn write_document(&self, document: &QualitativeDocument) -> std::io::Result<()>;
}

impl QuestionModel {
    /// Computes for every question the set of questions linking to it.
    ///
    /// For each question Q that has a link, Q is added to the `linked_from` set of each of
    /// its targets. The link targets are checked against the number of questions.
    pub fn resolve(questions: Vec<Question>) -> SplitResult<QuestionModel> {
        ensure!(!questions.is_empty(), EmptyHeaderSnafu {});
        let num_questions = questions.len();
        let mut linked_from: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); num_questions];
        for (idx, q) in questions.iter().enumerate() {
            if !q.has_link {
                continue;
            }
            for target in q.link_targets.iter() {
                let lf = linked_from.get_mut(*target).context(LinkOutOfRangeSnafu {
                    question: idx,
                    target: *target,
                    num_questions,
                })?;
                lf.insert(idx);
            }
        }
        let questions: Vec<Question> = questions
            .into_iter()
            .zip(linked_from)
            .map(|(q, lf)| Question {
                linked_from: lf,
                ..q
            })
            .collect();
        for (idx, q) in questions.iter().enumerate() {
            debug!(
                "resolve: question {} {:?}: {} links_to: {:?} linked_from: {:?}",
                idx, q.label, q.classification, q.link_targets, q.linked_from
            );
        }
        Ok(QuestionModel { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// True if none of the questions linking to `question` was answered in `row`.
    ///
    /// A question that nothing links to has all its linkers empty.
    pub fn all_linkers_empty(&self, question: usize, row: &[String]) -> bool {
        match self.questions.get(question) {
            Some(q) => q
                .linked_from
                .iter()
                .all(|l| is_blank(row.get(*l).map(|s| s.as_str()).unwrap_or(""))),
            None => true,
        }
    }

    fn in_structured_table(&self, question: &Question, options: &Options) -> bool {
        if options.hide_timestamp && question.is_timestamp() {
            return false;
        }
        match question.classification {
            Classification::Qualitative => false,
            Classification::Structured | Classification::Demographic => true,
        }
    }
}

/// Checks that the options can be used with this model.
pub fn check_options(model: &QuestionModel, options: &Options) -> SplitResult<()> {
    let q = model
        .questions
        .get(options.pic_index)
        .context(PicIndexOutOfRangeSnafu {
            index: options.pic_index,
            num_questions: model.len(),
        })?;
    match q.classification {
        Classification::Structured => PicIndexStructuredSnafu {
            index: options.pic_index,
            label: q.label.clone(),
        }
        .fail(),
        Classification::Demographic | Classification::Qualitative => Ok(()),
    }
}

fn check_table(model: &QuestionModel, table: &ResponseTable) -> SplitResult<()> {
    ensure!(
        model.len() == table.num_questions(),
        ModelMismatchSnafu {
            questions: model.len(),
            columns: table.num_questions()
        }
    );
    Ok(())
}

/// The table of all the non-qualitative columns, in the original order.
pub fn project_structured(
    model: &QuestionModel,
    table: &ResponseTable,
    options: &Options,
) -> StructuredTable {
    let kept: Vec<usize> = model
        .questions
        .iter()
        .enumerate()
        .filter(|(_, q)| model.in_structured_table(q, options))
        .map(|(idx, _)| idx)
        .collect();
    debug!("project_structured: kept columns: {:?}", kept);
    let pick = |row: &[String]| -> Vec<String> {
        kept.iter()
            .map(|idx| row.get(*idx).cloned().unwrap_or_default())
            .collect()
    };
    StructuredTable {
        header: pick(table.header()),
        rows: table.rows().iter().map(|r| pick(r)).collect(),
    }
}

/// Serializes the structured table.
///
/// Every cell is put between double quotes. Quotes inside a cell are kept as they
/// are, the downstream tools expect this exact format.
pub fn structured_text(st: &StructuredTable) -> String {
    let quote_row = |row: &Vec<String>| -> String {
        row.iter()
            .map(|cell| format!("\"{}\"", cell))
            .collect::<Vec<String>>()
            .join(",")
    };
    let mut lines: Vec<String> = vec![quote_row(&st.header)];
    lines.extend(st.rows.iter().map(quote_row));
    lines.join("\n")
}

/// The (label, answer) pairs to put in the document of the respondent with these answers.
pub fn qualitative_blocks(
    model: &QuestionModel,
    row: &[String],
    options: &Options,
) -> Vec<QualitativeBlock> {
    let mut blocks: Vec<QualitativeBlock> = Vec::new();
    for (idx, question) in model.questions.iter().enumerate() {
        if options.hide_timestamp && question.is_timestamp() {
            continue;
        }

        let all_linkers_empty = model.all_linkers_empty(idx, row);

        // Structured questions only show up when one of their linkers was answered.
        let suppressed = match question.classification {
            Classification::Structured => all_linkers_empty,
            Classification::Demographic | Classification::Qualitative => false,
        };
        if suppressed {
            continue;
        }

        let answer = row.get(idx).map(|s| s.as_str()).unwrap_or("");
        let answer = if !is_blank(answer) {
            answer.to_string()
        } else if all_linkers_empty {
            continue;
        } else {
            NO_RESPONSE.to_string()
        };

        blocks.push(QualitativeBlock {
            label: question.label.clone(),
            answer,
        });
    }
    blocks
}

/// The answer in the PIC column, or `NoPIC{n}` with n the 1-based position of the respondent.
pub fn respondent_identifier(table: &ResponseTable, options: &Options, respondent: usize) -> String {
    let pic = table
        .row(respondent)
        .and_then(|r| r.get(options.pic_index))
        .map(|s| s.as_str())
        .unwrap_or("");
    if is_blank(pic) {
        format!("NoPIC{}", respondent + 1)
    } else {
        pic.to_string()
    }
}

pub fn document_name(options: &Options, identifier: &str) -> String {
    format!("{} {}", options.qualitative_prefix, identifier)
}

/// Builds the document of one respondent.
pub fn render_respondent(
    model: &QuestionModel,
    table: &ResponseTable,
    options: &Options,
    respondent: usize,
) -> QualitativeDocument {
    let empty: Vec<String> = Vec::new();
    let row = table.row(respondent).unwrap_or(&empty);
    let identifier = respondent_identifier(table, options, respondent);
    let name = document_name(options, &identifier);
    let blocks = qualitative_blocks(model, row, options);
    debug!(
        "render_respondent: {} {:?}: {} blocks",
        respondent,
        name,
        blocks.len()
    );
    QualitativeDocument {
        respondent,
        identifier,
        name,
        blocks,
    }
}

/// Renders and writes the document of one respondent.
///
/// Each call is independent from the others and may be retried.
pub fn process_respondent(
    model: &QuestionModel,
    table: &ResponseTable,
    options: &Options,
    respondent: usize,
    sink: &dyn ArtifactSink,
) -> DocumentOutcome {
    let document = render_respondent(model, table, options, respondent);
    let result = sink
        .write_document(&document)
        .context(ArtifactWriteSnafu {
            name: document.name.clone(),
        });
    if let Err(e) = &result {
        warn!("process_respondent: respondent {}: {}", respondent + 1, e);
    }
    DocumentOutcome {
        respondent,
        name: document.name,
        result,
    }
}

/// Runs the whole split: writes the structured table, then one document per respondent.
///
/// Configuration errors are reported before anything is written. A failure to write the
/// structured table stops the run. A failure to write a document is recorded in the
/// report and does not stop the other documents.
///
/// Arguments:
/// * `jobs` the number of workers for the documents, 0 for one per CPU.
pub fn run_split(
    model: &QuestionModel,
    table: &ResponseTable,
    options: &Options,
    sink: &dyn ArtifactSink,
    reporter: &dyn ProgressReporter,
    jobs: usize,
) -> SplitResult<SplitReport> {
    check_table(model, table)?;
    check_options(model, options)?;
    let num_respondents = table.num_respondents();
    info!(
        "Processing {:?} respondents, {:?} questions, options: {:?}",
        num_respondents,
        model.len(),
        options
    );
    let tracker = ProgressTracker::new(reporter, num_respondents);

    let st = project_structured(model, table, options);
    tracker.checkpoint(progress::STRUCTURED_PROJECTED);
    let text = structured_text(&st);
    tracker.checkpoint(progress::STRUCTURED_SERIALIZED);
    sink.write_structured(&text).context(ArtifactWriteSnafu {
        name: "structured table",
    })?;
    tracker.checkpoint(progress::STRUCTURED_WRITTEN);
    info!(
        "Structured table written: {} columns, {} rows",
        st.header.len(),
        st.rows.len()
    );

    tracker.checkpoint(progress::QUALITATIVE_START);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context(WorkerPoolSnafu {})?;
    let documents: Vec<DocumentOutcome> = pool.install(|| {
        (0..num_respondents)
            .into_par_iter()
            .map(|respondent| {
                let outcome = process_respondent(model, table, options, respondent, sink);
                tracker.respondent_done();
                outcome
            })
            .collect()
    });
    tracker.checkpoint(progress::DONE);

    let report = SplitReport {
        structured_rows: st.rows.len(),
        documents,
    };
    info!(
        "Wrote {} of {} documents",
        report.documents.len() - report.failures().count(),
        report.documents.len()
    );
    Ok(report)
}
