//! Bar chart of message-type frequencies.
//!
//! The chart is built once from the type counts and can be drawn in the
//! terminal with block characters or exported as SVG.

use colored::{Color, Colorize};
use serde::Serialize;

use crate::stats::TypeCount;
use crate::styles::{parse_hex_color, Styles};

pub const CHART_TITLE: &str = "DHCP message type distribution";
const X_LABEL: &str = "Message type";
const Y_LABEL: &str = "Count";

/// Rows used for the tallest bar in the terminal rendering.
pub const DEFAULT_HEIGHT: usize = 10;
const MIN_COLUMN: usize = 7;
const MAX_COLUMN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub label: String,
    pub count: usize,
    /// `#RRGGBB`
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// One bar per entry, colored from the palette in order.
    pub fn from_counts(counts: &[TypeCount], styles: &Styles) -> Self {
        let bars = counts
            .iter()
            .enumerate()
            .map(|(idx, entry)| Bar {
                label: entry.label.clone(),
                count: entry.count,
                color: styles.bar_color(idx).to_string(),
            })
            .collect();
        Self {
            title: CHART_TITLE.to_string(),
            bars,
        }
    }

    fn max_count(&self) -> usize {
        self.bars.iter().map(|bar| bar.count).max().unwrap_or(0)
    }
}

/// Draw the chart with block characters, counts above each bar.
pub fn render_terminal(chart: &BarChart, height: usize) -> String {
    let mut out = vec![String::new(), chart.title.bold().to_string()];
    if chart.bars.is_empty() {
        out.push("(no data)".to_string());
        return out.join("\n");
    }

    let height = height.max(1);
    let max = chart.max_count().max(1);
    let column = chart
        .bars
        .iter()
        .map(|bar| bar.label.chars().count() + 2)
        .max()
        .unwrap_or(MIN_COLUMN)
        .clamp(MIN_COLUMN, MAX_COLUMN);
    let bar_width = column - 2;
    let levels: Vec<usize> = chart
        .bars
        .iter()
        .map(|bar| scaled_height(bar.count, max, height))
        .collect();

    out.push(Y_LABEL.dimmed().to_string());
    for row in (1..=height + 1).rev() {
        let mut line = String::from("  │");
        for (bar, &level) in chart.bars.iter().zip(&levels) {
            let cell = if level >= row {
                let block = "█".repeat(bar_width);
                center(&paint(&block, &bar.color), bar_width, column)
            } else if level + 1 == row {
                let count = bar.count.to_string();
                let width = count.chars().count();
                center(&count.bold().to_string(), width, column)
            } else {
                " ".repeat(column)
            };
            line.push_str(&cell);
        }
        out.push(line.trim_end().to_string());
    }

    out.push(format!("  └{}", "─".repeat(column * chart.bars.len())));
    let mut labels = String::from("   ");
    for bar in &chart.bars {
        let label = fit(&bar.label, column - 1);
        let width = label.chars().count();
        labels.push_str(&center(&label, width, column));
    }
    out.push(labels.trim_end().to_string());
    out.push(format!("   {}", X_LABEL.dimmed()));
    out.join("\n")
}

/// Standalone SVG document for the chart.
pub fn render_svg(chart: &BarChart) -> String {
    const BAR: usize = 60;
    const GAP: usize = 30;
    const LEFT: usize = 70;
    const TOP: usize = 60;
    const PLOT_HEIGHT: usize = 300;
    const BOTTOM: usize = 110;

    let max = chart.max_count().max(1);
    let width = LEFT + GAP + chart.bars.len().max(1) * (BAR + GAP);
    let height = TOP + PLOT_HEIGHT + BOTTOM;
    let baseline = TOP + PLOT_HEIGHT;

    let mut svg = Vec::new();
    svg.push(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif">"#
    ));
    svg.push(format!(
        r#"<rect width="{width}" height="{height}" fill="white"/>"#
    ));
    svg.push(format!(
        r#"<text x="{}" y="30" font-size="18" text-anchor="middle">{}</text>"#,
        width / 2,
        escape_xml(&chart.title)
    ));

    for step in 1..=4 {
        let y = baseline - PLOT_HEIGHT * step / 4;
        let value = max as f64 * step as f64 / 4.0;
        svg.push(format!(
            r##"<line x1="{LEFT}" y1="{y}" x2="{}" y2="{y}" stroke="#cccccc" stroke-dasharray="4 3"/>"##,
            width - GAP / 2
        ));
        svg.push(format!(
            r#"<text x="{}" y="{}" font-size="11" text-anchor="end">{}</text>"#,
            LEFT - 6,
            y + 4,
            trim_float(value)
        ));
    }

    for (idx, bar) in chart.bars.iter().enumerate() {
        let x = LEFT + GAP + idx * (BAR + GAP);
        let bar_height = PLOT_HEIGHT * bar.count / max;
        let y = baseline - bar_height;
        let center_x = x + BAR / 2;
        svg.push(format!(
            r#"<rect x="{x}" y="{y}" width="{BAR}" height="{bar_height}" fill="{}" stroke="black"/>"#,
            escape_xml(&bar.color)
        ));
        svg.push(format!(
            r#"<text x="{center_x}" y="{}" font-size="13" font-weight="bold" text-anchor="middle">{}</text>"#,
            y.saturating_sub(6),
            bar.count
        ));
        svg.push(format!(
            r#"<text x="{center_x}" y="{}" font-size="12" text-anchor="end" transform="rotate(-45 {center_x} {})">{}</text>"#,
            baseline + 16,
            baseline + 16,
            escape_xml(&bar.label)
        ));
    }

    svg.push(format!(
        r#"<line x1="{LEFT}" y1="{baseline}" x2="{}" y2="{baseline}" stroke="black"/>"#,
        width - GAP / 2
    ));
    svg.push(format!(
        r#"<line x1="{LEFT}" y1="{TOP}" x2="{LEFT}" y2="{baseline}" stroke="black"/>"#
    ));
    svg.push(format!(
        r#"<text x="{}" y="{}" font-size="13" text-anchor="middle">{X_LABEL}</text>"#,
        width / 2,
        height - 12
    ));
    svg.push(format!(
        r#"<text x="18" y="{}" font-size="13" text-anchor="middle" transform="rotate(-90 18 {})">{Y_LABEL}</text>"#,
        TOP + PLOT_HEIGHT / 2,
        TOP + PLOT_HEIGHT / 2
    ));
    svg.push("</svg>".to_string());
    svg.join("\n")
}

/// Rows for a bar; any non-zero count gets at least one row.
fn scaled_height(count: usize, max: usize, height: usize) -> usize {
    if count == 0 {
        return 0;
    }
    ((count * height + max - 1) / max).clamp(1, height)
}

fn paint(text: &str, hex: &str) -> String {
    match parse_hex_color(hex) {
        Some((r, g, b)) => text.color(Color::TrueColor { r, g, b }).to_string(),
        None => text.to_string(),
    }
}

/// Center `text`, whose visible width is `width`, in a cell of `column` characters.
fn center(text: &str, width: usize, column: usize) -> String {
    let free = column.saturating_sub(width);
    let left = free / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(free - left))
}

fn fit(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    let mut cut: String = label.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn trim_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{fit, render_svg, render_terminal, scaled_height, BarChart};
    use crate::stats::TypeCount;
    use crate::styles::default_styles;

    fn counts(entries: &[(&str, usize)]) -> Vec<TypeCount> {
        entries
            .iter()
            .map(|(label, count)| TypeCount {
                label: label.to_string(),
                count: *count,
            })
            .collect()
    }

    #[test]
    fn one_bar_per_type_with_cycled_palette() {
        let entries: Vec<(String, usize)> = (0..9).map(|i| (format!("Type {i}"), 1)).collect();
        let refs: Vec<(&str, usize)> = entries.iter().map(|(l, c)| (l.as_str(), *c)).collect();
        let chart = BarChart::from_counts(&counts(&refs), &default_styles());

        assert_eq!(chart.bars.len(), 9);
        assert_eq!(chart.bars[0].color, "#4CAF50");
        assert_eq!(chart.bars[6].color, "#9E9E9E");
        assert_eq!(chart.bars[7].color, "#4CAF50");
    }

    #[test]
    fn heights_scale_to_tallest_bar() {
        assert_eq!(scaled_height(10, 10, 10), 10);
        assert_eq!(scaled_height(1, 10, 10), 1);
        assert_eq!(scaled_height(1, 1000, 10), 1);
        assert_eq!(scaled_height(5, 10, 10), 5);
        assert_eq!(scaled_height(0, 10, 10), 0);
    }

    #[test]
    fn terminal_chart_annotates_counts() {
        colored::control::set_override(false);
        let chart = BarChart::from_counts(
            &counts(&[("Discover", 2), ("Offer", 1)]),
            &default_styles(),
        );
        let text = render_terminal(&chart, 4);
        let lines: Vec<&str> = text.lines().collect();

        // title, y label, 5 plot rows, axis, labels, x label
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[3].trim(), "│    2");
        assert!(lines[4].contains('█'));
        assert!(lines[5].contains('1'));
        assert!(lines[9].contains("Discover") && lines[9].contains("Offer"));
        assert_eq!(text.matches("Discover").count(), 1);
    }

    #[test]
    fn svg_has_one_rect_per_bar_plus_background() {
        let chart = BarChart::from_counts(
            &counts(&[("Discover", 3), ("<odd & label>", 1)]),
            &default_styles(),
        );
        let svg = render_svg(&chart);

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains("&lt;odd &amp; label&gt;"));
        assert!(svg.contains(r##"fill="#2196F3""##));
    }

    #[test]
    fn long_labels_are_shortened() {
        assert_eq!(fit("Discover", 10), "Discover");
        assert_eq!(fit("an extremely long label", 8), "an extr…");
    }
}
