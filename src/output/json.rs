use serde::Serialize;

use super::{Formatter, SurveyReport, iso8601_timestamp};
use crate::error::Result;

pub struct JsonFormatter;

#[derive(Serialize)]
struct Document<'a> {
    generated: String,
    surveys: &'a [SurveyReport],
}

impl Formatter for JsonFormatter {
    fn format(&self, reports: &[SurveyReport]) -> Result<String> {
        let document = Document {
            generated: iso8601_timestamp(),
            surveys: reports,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}
