use crate::split::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "qualitativePrefix")]
    pub qualitative_prefix: Option<String>,
    #[serde(rename = "hideTimestamp")]
    pub hide_timestamp: Option<bool>,
    #[serde(rename = "structuredFileName")]
    pub structured_file_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionConfig {
    index: JSValue,
    #[serde(rename = "type")]
    pub question_type: String,
    #[serde(rename = "hasLink")]
    pub has_link: Option<bool>,
    link: Option<JSValue>,
}

impl QuestionConfig {
    pub fn index(&self) -> QsResult<usize> {
        read_js_int(&Some(self.index.clone()), "index")
    }

    /// The link as a comma-separated string, whatever the JSON type was.
    pub fn link(&self) -> QsResult<Option<String>> {
        match &self.link {
            None | Some(JSValue::Null) => Ok(None),
            Some(JSValue::String(s)) => Ok(Some(s.clone())),
            Some(JSValue::Number(n)) => Ok(Some(n.to_string())),
            Some(JSValue::Array(l)) => {
                let mut parts: Vec<String> = Vec::new();
                for x in l.iter() {
                    match x {
                        JSValue::Number(n) => parts.push(n.to_string()),
                        JSValue::String(s) => parts.push(s.clone()),
                        _ => whatever!("cannot read link element {:?}", x),
                    }
                }
                Ok(Some(parts.join(",")))
            }
            Some(x) => whatever!("cannot read link {:?}", x),
        }
    }

    pub fn to_spec(&self) -> QsResult<QuestionSpec> {
        Ok(QuestionSpec {
            index: self.index()?,
            classification: self.question_type.parse::<Classification>()?,
            has_link: self.has_link.unwrap_or(false),
            link: self.link()?,
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SplitConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    pub source: Option<FileSource>,
    #[serde(rename = "picIndex")]
    pic_index: Option<JSValue>,
    #[serde(default)]
    pub questions: Vec<QuestionConfig>,
}

impl SplitConfig {
    pub fn pic_index(&self) -> QsResult<Option<usize>> {
        match &self.pic_index {
            None | Some(JSValue::Null) => Ok(None),
            x => read_js_int(x, "picIndex").map(Some),
        }
    }
}

pub fn read_config(path: &str) -> QsResult<SplitConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> QsResult<SplitConfig> {
    let config: SplitConfig = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    debug!("parse_config: {:?}", config);
    Ok(config)
}

// Numbers may be written as JSON numbers or as strings.
fn read_js_int(x: &Option<JSValue>, field: &str) -> QsResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu { field }),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .context(ParsingJsonNumberSnafu { field }),
        _ => None.context(ParsingJsonNumberSnafu { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let config = parse_config(
            r#"{
            "outputSettings": {
                "outputDirectory": "out",
                "qualitativePrefix": "Wave 1",
                "hideTimestamp": true
            },
            "source": { "provider": "csv", "filePath": "responses.csv" },
            "picIndex": "1",
            "questions": [
                { "index": 1, "type": "D" },
                { "index": "2", "type": "qualitative", "hasLink": true, "link": 3 },
                { "index": 4, "type": "Q", "hasLink": true, "link": [5, "6"] },
                { "index": 7, "type": "Q", "hasLink": true }
            ]
        }"#,
        )
        .unwrap();
        assert_eq!(config.pic_index().unwrap(), Some(1));
        assert_eq!(config.output_settings.hide_timestamp, Some(true));
        assert_eq!(
            config.source.as_ref().map(|s| s.file_path.as_str()),
            Some("responses.csv")
        );
        let specs: Vec<QuestionSpec> = config
            .questions
            .iter()
            .map(|q| q.to_spec().unwrap())
            .collect();
        assert_eq!(specs[0].classification, Classification::Demographic);
        assert!(!specs[0].has_link);
        assert_eq!(specs[1].index, 2);
        assert_eq!(specs[1].link.as_deref(), Some("3"));
        assert_eq!(specs[2].link.as_deref(), Some("5,6"));
        assert_eq!(specs[3].link, None);
    }

    #[test]
    fn minimal_config() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.pic_index().unwrap(), None);
        assert!(config.questions.is_empty());
        assert!(config.source.is_none());
    }

    #[test]
    fn bad_type() {
        let config = parse_config(r#"{"questions": [{"index": 0, "type": "X"}]}"#).unwrap();
        assert!(matches!(
            config.questions[0].to_spec(),
            Err(QualsplitError::Split {
                source: SplitError::UnknownClassification { .. }
            })
        ));
    }

    #[test]
    fn bad_index() {
        let config = parse_config(r#"{"picIndex": "two"}"#).unwrap();
        assert!(matches!(
            config.pic_index(),
            Err(QualsplitError::ParsingJsonNumber { .. })
        ));
    }
}
