use crate::error::StatsError;
use crate::stats;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

pub const NAME_WIDTH: usize = 20;
pub const REPORT_HEADER: &str = "Task                R       Err     Pts";
pub const REPORT_RULE: &str = "-----------------------------------------";

/// One named evaluation unit inside a [`TaskResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Measure {
    Boolean {
        name: String,
        passed: bool,
    },
    Fit {
        name: String,
        correlation: f64,
        normalized_error: f64,
        rmse: f64,
        sample_count: usize,
    },
}

impl Measure {
    /// Fit statistics for a model series against its reference series.
    pub fn fit(name: impl Into<String>, model: &[f64], human: &[f64]) -> Self {
        let name = name.into();
        if model.len() != human.len() {
            warn!(
                measure = %name,
                model = model.len(),
                human = human.len(),
                "series lengths differ, fit statistics fall back to 0"
            );
        }
        Measure::Fit {
            name,
            correlation: stats::correlation(model, human),
            normalized_error: stats::normalized_error(model, human),
            rmse: stats::rmse(model, human),
            sample_count: model.len(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Measure::Boolean { name, .. } | Measure::Fit { name, .. } => name,
        }
    }

    pub fn render(&self, options: RenderOptions) -> String {
        match self {
            Measure::Boolean { name, passed } => {
                let token = if *passed { "-ok-" } else { "XXXX" };
                format!("{:<width$}{}", name, token, width = NAME_WIDTH)
            }
            Measure::Fit {
                name,
                correlation,
                normalized_error,
                rmse,
                sample_count,
            } => {
                let r = if *correlation > 0.99 {
                    ">.99".to_string()
                } else {
                    format!("{correlation:.2}")
                };
                let mut line = format!(
                    "{:<width$}{}    {:.2}    {}",
                    name,
                    r,
                    normalized_error,
                    sample_count,
                    width = NAME_WIDTH
                );
                if options.show_rmse {
                    line.push_str(&format!("   (RMSE = {rmse:.3})"));
                }
                line
            }
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(RenderOptions::default()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Append `(RMSE = ..)` to every fit line.
    pub show_rmse: bool,
}

/// Ordered measures produced by one analysis call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    measures: Vec<Measure>,
}

impl TaskResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_boolean(&mut self, name: impl Into<String>, passed: bool) {
        self.measures.push(Measure::Boolean {
            name: name.into(),
            passed,
        });
    }

    /// Appends fit statistics. Mismatched lengths are tolerated and produce
    /// zero statistics.
    pub fn add_fit(&mut self, name: impl Into<String>, model: &[f64], human: &[f64]) {
        self.measures.push(Measure::fit(name, model, human));
    }

    /// Appends fit statistics over two row-major flattened grids.
    ///
    /// Unlike [`add_fit`](Self::add_fit) a shape mismatch is an error: it
    /// means the task reduced its data into the wrong layout.
    pub fn add_fit_2d<R, S>(
        &mut self,
        name: impl Into<String>,
        model: &[R],
        human: &[S],
    ) -> Result<(), StatsError>
    where
        R: AsRef<[f64]>,
        S: AsRef<[f64]>,
    {
        let (m, h) = stats::flatten_pair(model, human)?;
        self.measures.push(Measure::fit(name, &m, &h));
        Ok(())
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    /// True when every boolean measure passed.
    pub fn passed(&self) -> bool {
        self.measures.iter().all(|m| match m {
            Measure::Boolean { passed, .. } => *passed,
            Measure::Fit { .. } => true,
        })
    }

    pub fn render(&self, options: RenderOptions) -> String {
        self.measures
            .iter()
            .map(|m| m.render(options))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(RenderOptions::default()))
    }
}

impl Extend<Measure> for TaskResult {
    fn extend<I: IntoIterator<Item = Measure>>(&mut self, iter: I) {
        self.measures.extend(iter);
    }
}

/// Header, rule, then every measure of every result in order.
pub fn render_report(results: &[TaskResult], options: RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(REPORT_HEADER);
    out.push('\n');
    out.push_str(REPORT_RULE);
    out.push('\n');
    for result in results {
        for measure in result.measures() {
            out.push_str(&measure.render(options));
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(name: &str, correlation: f64, normalized_error: f64, n: usize) -> Measure {
        Measure::Fit {
            name: name.to_string(),
            correlation,
            normalized_error,
            rmse: 0.0123,
            sample_count: n,
        }
    }

    #[test]
    fn ceiling_correlation_renders_token() {
        let line = fit("PRP RT2", 0.995, 0.034, 5).to_string();
        assert_eq!(line, "PRP RT2             >.99    0.03    5");
    }

    #[test]
    fn ordinary_correlation_renders_two_decimals() {
        let line = fit("Subitizing RT", 0.5, 0.2, 8).to_string();
        assert_eq!(line, "Subitizing RT       0.50    0.20    8");
    }

    #[test]
    fn exactly_point_nine_nine_is_not_ceiling() {
        assert!(fit("x", 0.99, 0.0, 2).to_string().contains("0.99"));
    }

    #[test]
    fn rmse_suffix_when_enabled() {
        let line = fit("PRP RT1", 0.5, 0.2, 3).render(RenderOptions { show_rmse: true });
        assert_eq!(line, "PRP RT1             0.50    0.20    3   (RMSE = 0.012)");
    }

    #[test]
    fn boolean_tokens() {
        let mut r = TaskResult::new();
        r.add_boolean("Accuracy", true);
        r.add_boolean("Learning", false);
        assert_eq!(
            r.to_string(),
            "Accuracy            -ok-\nLearning            XXXX"
        );
        assert!(!r.passed());
    }

    #[test]
    fn add_fit_records_sample_count_and_stats() {
        let mut r = TaskResult::new();
        r.add_fit("RT", &[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        match &r.measures()[0] {
            Measure::Fit {
                correlation,
                normalized_error,
                sample_count,
                ..
            } => {
                assert_eq!(*correlation, 1.0);
                assert_eq!(*normalized_error, 0.0);
                assert_eq!(*sample_count, 3);
            }
            other => panic!("expected fit, got {other:?}"),
        }
    }

    #[test]
    fn add_fit_tolerates_length_mismatch() {
        let mut r = TaskResult::new();
        r.add_fit("RT", &[1.0, 2.0, 3.0], &[1.0]);
        assert_eq!(
            r.measures()[0],
            Measure::Fit {
                name: "RT".into(),
                correlation: 0.0,
                normalized_error: 0.0,
                rmse: 0.0,
                sample_count: 3,
            }
        );
    }

    #[test]
    fn add_fit_2d_flattens_and_rejects_mismatch() {
        let mut r = TaskResult::new();
        let model = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let human = [[1.0, 2.0], [3.0, 4.0]];
        r.add_fit_2d("grid", &model, &human).unwrap();
        match &r.measures()[0] {
            Measure::Fit { sample_count, .. } => assert_eq!(*sample_count, 4),
            other => panic!("expected fit, got {other:?}"),
        }

        let wrong = [[1.0, 2.0, 3.0]];
        assert!(r.add_fit_2d("bad", &model, &wrong).is_err());
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn report_has_header_and_rule() {
        let mut a = TaskResult::new();
        a.add_fit("A", &[1.0, 2.0], &[1.0, 2.0]);
        let mut b = TaskResult::new();
        b.add_boolean("B", true);
        let report = render_report(&[a, b], RenderOptions::default());
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines[0], REPORT_HEADER);
        assert_eq!(lines[1], REPORT_RULE);
        assert_eq!(lines[1].len(), 41);
        assert_eq!(lines[2], "A                   >.99    0.00    2");
        assert_eq!(lines[3], "B                   -ok-");
    }

    #[test]
    fn columns_line_up_with_header() {
        let line = fit("X", 0.5, 0.25, 7).to_string();
        assert_eq!(REPORT_HEADER.find('R'), Some(20));
        assert_eq!(&line[20..24], "0.50");
        assert_eq!(REPORT_HEADER.find("Err"), Some(28));
        assert_eq!(&line[28..32], "0.25");
        assert_eq!(REPORT_HEADER.find("Pts"), Some(36));
        assert_eq!(&line[36..], "7");
    }

    #[test]
    fn measures_serialize_with_type_tag() {
        let mut r = TaskResult::new();
        r.add_boolean("ok", true);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"type\":\"boolean\""));
        let back: TaskResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
