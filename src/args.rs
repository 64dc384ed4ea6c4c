use clap::Parser;

/// This program splits a survey export into a structured table and qualitative documents.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the run: the input, the outputs and the type
    /// of each question. All the other options override the content of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The survey export, in CSV or Excel (.xlsx) format. Overrides the source
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. If not given, it is guessed from the extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// Prints the index and the label of each column of the input, then exits.
    #[clap(long, takes_value = false)]
    pub list_columns: bool,

    /// (directory) Where the structured table and the documents are written. It is created if needed.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// The prefix of the names of all the generated files.
    #[clap(short, long, value_parser)]
    pub prefix: Option<String>,

    /// The index of the column that identifies each respondent (the PIC column).
    /// This column cannot be a structured column.
    #[clap(long, value_parser)]
    pub pic_index: Option<usize>,

    /// Removes the column named "Timestamp" from all the outputs.
    #[clap(long, takes_value = false)]
    pub hide_timestamp: bool,

    /// (list of comma-separated column indices) The qualitative questions.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub qualitative: Vec<usize>,

    /// (list of comma-separated column indices) The demographic questions.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub demographic: Vec<usize>,

    /// (QUESTION:COLUMNS, repeatable) Links a qualitative question to other columns, for example
    /// `--link 4:5,6`. With `--link 4`, the question links to the previous column.
    #[clap(long, value_parser)]
    pub link: Vec<String>,

    /// (default: number of CPUs) The number of documents written in parallel.
    #[clap(short, long, value_parser)]
    pub jobs: Option<usize>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
