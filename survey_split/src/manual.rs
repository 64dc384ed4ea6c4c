/*!

This is the long-form manual for `survey_split` and `qualsplit`.

## What it does

A survey export has one row per respondent and one column per question.
`qualsplit` splits it in two:

* a structured table (CSV) with all the columns that are not qualitative,
* one document per respondent with the answers to the qualitative questions,
  each answer under the label of its question.

## Question types

Every column has a type. Columns that are not configured are **Structured**.

* `S` **Structured**: categorical answers. They go to the structured table only.
* `D` **Demographic**: they go to the structured table, and their answers also
  appear in the documents (for example the name or the age of the respondent).
* `Q` **Qualitative**: free text. They go to the documents only.

## Links

A qualitative question may link to other columns. A linked column appears in
the document of a respondent only if at least one of the questions linking to
it was answered. This is useful for follow-up fields: "If yes, give details".

When a linked column was left blank although a question linking to it was
answered, the document shows `No Response` under its label.

Links are written as comma-separated column indices, starting at 0, as
printed by `qualsplit --list-columns`. A link without any index refers to the
previous column. Any other content is an error, and nothing is written.

## Documents

The document of a respondent is named `{prefix} {PIC}` where PIC is the answer
of the respondent in the PIC column. This column may not be Structured. When
the answer is empty, `NoPIC{n}` is used, where n is the position of the
respondent, starting at 1. Two respondents with the same PIC answer share the
same document name, and the last one written is kept.

For each question, in the order of the columns:
- the timestamp column is skipped if `hideTimestamp` is set,
- Structured questions are skipped, unless a question linking to them was answered,
- empty answers are skipped, unless a question linking to them was answered,
  in which case `No Response` is shown.

Documents are written as Markdown: the label in bold on one line, the answer
on the next line, then a blank line.

## Structured table

All the columns except the Qualitative ones (and the timestamp if
`hideTimestamp` is set), in their original order. Each cell is written
between double quotes. Double quotes inside a cell are written as they are.

## Configuration

The program accepts a configuration file in JSON:

```json
{
  "outputSettings": {
    "outputDirectory": "output",
    "qualitativePrefix": "Wave 1",
    "hideTimestamp": true
  },
  "source": {
    "provider": "csv",
    "filePath": "responses.csv"
  },
  "picIndex": 1,
  "questions": [
    { "index": 1, "type": "D" },
    { "index": 2, "type": "Q", "hasLink": true, "link": "3" },
    { "index": 4, "type": "Q" }
  ]
}
```

Options for `outputSettings`:
 - `outputDirectory` (string, optional): where to write the outputs. Relative paths are
   read from the directory of the configuration file. Defaults to the current directory.
 - `qualitativePrefix` (string, optional): the prefix of all the file names.
 - `hideTimestamp` (boolean, optional): drops the `Timestamp` column from both outputs.
 - `structuredFileName` (string, optional): the name of the structured table. Defaults to
   `{prefix} StructuredData.csv`.

Options for `source`:
 - `provider` (string, optional): `csv` or `xlsx`. Guessed from the file extension if missing.
 - `filePath` (string): the survey export.
 - `excelWorksheetName` (string, optional): for Excel files, the worksheet to read.
   The first worksheet is read otherwise.

Options for `questions`:
 - `index` (string or number): the column, starting at 0.
 - `type` (string): `D`, `S`, `Q` or the full names.
 - `hasLink` (boolean, optional): only used for qualitative questions.
 - `link` (string or number, optional): the linked columns.

All the options can also be passed on the command line. See `qualsplit --help`.

 */
