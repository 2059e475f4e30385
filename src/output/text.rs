use super::{Formatter, SurveyReport};
use crate::error::Result;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, reports: &[SurveyReport]) -> Result<String> {
        let mut lines = vec![
            format!(
                "{:<40} {:>4} {:>7} {:>7} {:>9} {:>9} {:>8}",
                "File", "Fmt", "Traces", "Samples", "Time(ns)", "Dist(m)", "Depth(m)"
            ),
            "-".repeat(90),
        ];
        lines.extend(reports.iter().map(table_row));

        if self.verbose {
            for report in reports.iter().filter(|r| r.error.is_none()) {
                lines.push(String::new());
                lines.extend(details(report));
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }
}

fn table_row(report: &SurveyReport) -> String {
    if let Some(err) = &report.error {
        return format!("{:<40} ERROR: {}", report.filename, err);
    }
    let format = report.format.map(|f| f.to_string()).unwrap_or_default();
    format!(
        "{:<40} {:>4} {:>7} {:>7} {:>9.1} {:>9.2} {:>8.2}",
        report.filename,
        format,
        report.traces,
        report.samples,
        report.max_time_ns,
        report.max_distance_m,
        report.depth_max_m
    )
}

fn details(report: &SurveyReport) -> Vec<String> {
    let mut lines = vec![
        format!("{}:", report.filename),
        format!("  Antenna: {}", report.antenna),
        format!("  Acquisition step: {}", report.acquisition_step),
    ];
    if report.dual_channel {
        let channel = report.channel.map_or("both".to_string(), |c| format!("{:?}", c));
        lines.push(format!("  Dual channel, showing: {}", channel));
    }
    lines.push(format!("  Relative permittivity: {}", report.relative_permittivity));
    if let Some(at) = &report.acquired_at {
        lines.push(format!("  Acquired: {}", at));
    }
    if let Some(a) = &report.amplitude {
        lines.push(format!(
            "  Amplitude: mean {:.2}, std {:.2}, range [{}, {}]",
            a.mean, a.std_dev, a.min, a.max
        ));
    }
    lines
}
