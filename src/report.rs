use crate::pairwise::{PairwiseResult, TTestMethod};
use crate::residual::PartialCorrelation;
use crate::summary::GroupStats;
use crate::types::Measure;

pub fn format_num(value: f64) -> String {
    if value.is_nan() {
        "NA".to_string()
    } else {
        format!("{value:.4}")
    }
}

pub fn format_p(p: f64) -> String {
    if p.is_nan() {
        "NA".to_string()
    } else if p < 0.001 {
        format!("{p:.2e}")
    } else {
        format!("{p:.4}")
    }
}

pub fn describe_summary(measure: Measure, stats: &[GroupStats]) -> Vec<String> {
    let width = stats.iter().map(|s| s.group.len()).max().unwrap_or(5).max(5);
    let mut lines = vec![
        format!("{measure} by severity group"),
        format!(
            "{:<width$} {:>4} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "group", "n", "mean", "median", "sd", "mean-sd", "mean+sd"
        ),
    ];
    for s in stats {
        lines.push(format!(
            "{:<width$} {:>4} {:>10} {:>10} {:>10} {:>10} {:>10}",
            s.group,
            s.n,
            format_num(s.mean),
            format_num(s.median),
            format_num(s.sd),
            format_num(s.lower()),
            format_num(s.upper()),
        ));
    }

    let ranked: Vec<&GroupStats> = stats.iter().filter(|s| s.mean.is_finite()).collect();
    if let (Some(hi), Some(lo)) = (
        ranked.iter().max_by(|a, b| a.mean.total_cmp(&b.mean)),
        ranked.iter().min_by(|a, b| a.mean.total_cmp(&b.mean)),
    ) && hi.group != lo.group
    {
        lines.push(format!(
            "Mean {measure} is highest in {} ({}) and lowest in {} ({}).",
            hi.group,
            format_num(hi.mean),
            lo.group,
            format_num(lo.mean)
        ));
    }
    for s in stats.iter().filter(|s| s.n < 2) {
        lines.push(format!(
            "{} has {} non-missing value(s); its standard deviation is undefined.",
            s.group, s.n
        ));
    }
    lines
}

pub fn describe_pairwise(result: &PairwiseResult, alpha: f64) -> Vec<String> {
    let method = match result.method {
        TTestMethod::PooledSd => "t tests with pooled SD",
        TTestMethod::Welch => "Welch t tests",
    };
    let mut lines = vec![format!(
        "Pairwise comparisons of {} using {method}, Bonferroni adjusted",
        result.measure
    )];
    let width = result.groups.iter().map(|g| g.len()).max().unwrap_or(0);
    let k = result.groups.len();
    if k > 1 {
        let header: Vec<String> = result.groups[..k - 1]
            .iter()
            .map(|g| format!("{g:>w$}", w = g.len().max(10)))
            .collect();
        lines.push(format!("{:<width$} {}", "", header.join(" ")));
        for (i, row) in result.adjusted_matrix().iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .zip(&result.groups)
                .map(|(p, g)| format!("{:>w$}", format_p(*p), w = g.len().max(10)))
                .collect();
            lines.push(format!("{:<width$} {}", result.groups[i + 1], cells.join(" ")));
        }
    }

    let significant: Vec<String> = result
        .comparisons
        .iter()
        .filter(|c| c.p_adjusted < alpha)
        .map(|c| format!("{} vs {} (p = {})", c.first, c.second, format_p(c.p_adjusted)))
        .collect();
    if significant.is_empty() {
        lines.push(format!(
            "No pair of severity groups differs in {} at alpha = {alpha} after correction.",
            result.measure
        ));
    } else {
        lines.push(format!(
            "{} differs significantly at alpha = {alpha} between: {}.",
            result.measure,
            significant.join("; ")
        ));
    }
    lines
}

pub fn describe_partial(result: &PartialCorrelation, alpha: f64) -> Vec<String> {
    let spec = &result.spec;
    let mut lines = vec![
        format!(
            "{} vs {}, controlling for {}",
            spec.a,
            spec.b,
            spec.covariate_names()
        ),
        format!(
            "n = {} ({} row(s) excluded for missing values), r = {}, p = {}",
            result.n,
            result.rows_removed,
            format_num(result.coefficient),
            format_p(result.p_value)
        ),
    ];
    if result.degenerate || result.coefficient.is_nan() {
        lines.push(
            "The residuals carry no variance, so the partial correlation is undefined.".to_string(),
        );
    } else {
        let direction = if result.coefficient > 0.0 {
            "positive"
        } else {
            "negative"
        };
        let verdict = if result.p_value < alpha {
            format!("a significant {direction} association")
        } else {
            format!("no significant association (the estimate is {direction})")
        };
        lines.push(format!(
            "After removing {}, {} and {} show {verdict} at alpha = {alpha}.",
            spec.covariate_names(),
            spec.a,
            spec.b
        ));
    }
    lines
}
