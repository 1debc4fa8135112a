use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotly::box_plot::{BoxMean, BoxPoints};
use plotly::common::color::{NamedColor, Rgb};
use plotly::common::{Line, Marker, MarkerSymbol, Mode};
use plotly::layout::Axis;
use plotly::{BoxPlot, Layout, Plot, Scatter};

use crate::residual::PartialCorrelation;
use crate::types::Measure;

pub fn ensure_plots_dir(out_dir: &Path) -> Result<PathBuf> {
    let dir = out_dir.join("Plots");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn plot_path(out_dir: &Path, prefix: Option<&str>, name: &str) -> PathBuf {
    let file_name = match prefix {
        Some(pfx) => format!("{pfx}_{name}.html"),
        None => format!("{name}.html"),
    };
    out_dir.join("Plots").join(file_name)
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

pub fn write_group_boxplot(
    out_dir: &Path,
    measure: Measure,
    groups: &[(String, Vec<f64>)],
) -> Result<PathBuf> {
    ensure_plots_dir(out_dir)?;
    let mut plot = Plot::new();
    for (group, values) in groups {
        let trace = BoxPlot::new(values.clone())
            .name(group.as_str())
            .box_points(BoxPoints::Outliers)
            .box_mean(BoxMean::StandardDeviation)
            .marker(Marker::new().color(NamedColor::Red).size(7))
            .line(Line::new().color(NamedColor::Black));
        plot.add_trace(trace);
    }
    let layout = Layout::new()
        .title(format!("{measure} by severity group"))
        .x_axis(Axis::new().title("Severity group"))
        .y_axis(Axis::new().title(measure.column_name()));
    plot.set_layout(layout);

    let path = plot_path(out_dir, Some("boxplot"), measure.slug());
    plot.write_html(&path);
    Ok(path)
}

pub fn write_residual_plot(out_dir: &Path, result: &PartialCorrelation) -> Result<PathBuf> {
    ensure_plots_dir(out_dir)?;
    let x_vals = result.residuals_b();
    let y_vals = result.residuals_a();

    let mut plot = Plot::new();
    let points = Scatter::new(x_vals.clone(), y_vals)
        .mode(Mode::Markers)
        .marker(
            Marker::new()
                .color(Rgb::new(0x2C, 0x6E, 0xA8))
                .size(8)
                .symbol(MarkerSymbol::Circle),
        )
        .name("Residuals");
    plot.add_trace(points);

    if result.slope.is_finite()
        && result.intercept.is_finite()
        && let Some((min_x, max_x)) = min_max(&x_vals)
    {
        let fit = Scatter::new(
            vec![min_x, max_x],
            vec![
                result.intercept + result.slope * min_x,
                result.intercept + result.slope * max_x,
            ],
        )
        .mode(Mode::Lines)
        .line(Line::new().color(NamedColor::DarkRed).width(2.0))
        .name(format!("Fit (slope {:.3})", result.slope));
        plot.add_trace(fit);
    }

    let spec = &result.spec;
    let title = format!(
        "{} vs {} controlling for {} (r = {:.3}, p = {:.4})",
        spec.a,
        spec.b,
        spec.covariate_names(),
        result.coefficient,
        result.p_value
    );
    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title(format!("Residual {}", spec.b)))
        .y_axis(Axis::new().title(format!("Residual {}", spec.a)));
    plot.set_layout(layout);

    let path = plot_path(out_dir, Some("residuals"), &spec.label);
    plot.write_html(&path);
    Ok(path)
}
