use super::{Formatter, SurveyReport};
use crate::error::Result;

pub struct CsvFormatter;

const HEADER: &str = "filename,format,antenna,traces,samples,max_time_ns,max_distance_m,acquisition_step,dual_channel,channel,relative_permittivity,depth_max_m,acquired_at,amplitude_mean,amplitude_std,amplitude_min,amplitude_max,error";

impl Formatter for CsvFormatter {
    fn format(&self, reports: &[SurveyReport]) -> Result<String> {
        let mut out = String::from(HEADER);
        out.push('\n');
        for report in reports {
            let format = report.format.map(|f| f.to_string()).unwrap_or_default();
            let channel = report
                .channel
                .map(|c| format!("{:?}", c))
                .unwrap_or_default();
            let (mean, std_dev, min, max) = match &report.amplitude {
                Some(a) => (
                    format!("{:.4}", a.mean),
                    format!("{:.4}", a.std_dev),
                    format!("{}", a.min),
                    format!("{}", a.max),
                ),
                None => Default::default(),
            };
            let line = [
                quote(&report.filename),
                format,
                quote(&report.antenna),
                report.traces.to_string(),
                report.samples.to_string(),
                format!("{:.3}", report.max_time_ns),
                format!("{:.3}", report.max_distance_m),
                format!("{}", report.acquisition_step),
                report.dual_channel.to_string(),
                channel,
                format!("{}", report.relative_permittivity),
                format!("{:.4}", report.depth_max_m),
                report.acquired_at.clone().unwrap_or_default(),
                mean,
                std_dev,
                min,
                max,
                quote(report.error.as_deref().unwrap_or("")),
            ]
            .join(",");
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
