use crate::types::{PriceSeries, ResultRecord};

/// All charts share the matplotlib-ish palette of the HTML report
const PRICE_COLOR: &str = "#2E86AB";
const ROLLING_PALETTE: [&str; 4] = ["#A23B72", "#F18F01", "#C73E1D", "#6A994E"];

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 40.0;

/// Price polyline over volume bars, stacked in one document.
pub fn price_history(series: &PriceSeries) -> String {
    let width = 1400.0;
    let height = 1000.0;
    let mut svg = open_svg(width, height);

    let Some(stats) = series.stats() else {
        svg.push_str(&text(
            width / 2.0,
            height / 2.0,
            "middle",
            24.0,
            "#666",
            "no price data",
        ));
        svg.push_str("</svg>\n");
        return svg;
    };

    let points = series.points();
    let n = points.len();
    let x = Axis::new(0.0, (n.max(2) - 1) as f64, MARGIN_LEFT, width - MARGIN_RIGHT);

    // Price panel
    svg.push_str(&text(width / 2.0, 36.0, "middle", 24.0, "#333", "Price History"));
    let pad = (stats.max - stats.min) * 0.02;
    let y_price = Axis::new(stats.min - pad, stats.max + pad, 520.0, 60.0);
    for frac in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let value = stats.min + (stats.max - stats.min) * frac;
        let y = y_price.map(value);
        svg.push_str(&hline(
            MARGIN_LEFT,
            width - MARGIN_RIGHT,
            y,
            "stroke:#cccccc;stroke-width:1",
        ));
        svg.push_str(&text(
            MARGIN_LEFT - 8.0,
            y + 5.0,
            "end",
            14.0,
            "#666",
            &format!("{value:.0}"),
        ));
    }
    let path: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (x.map(i as f64), y_price.map(p.close)))
        .collect();
    svg.push_str(&polyline(
        &path,
        &format!("fill:none;stroke:{PRICE_COLOR};stroke-width:1.5"),
    ));
    date_labels(&mut svg, series, &x, 545.0);

    // Volume panel
    svg.push_str(&text(width / 2.0, 596.0, "middle", 20.0, "#333", "Trading Volume"));
    let max_volume = points.iter().map(|p| p.volume).fold(0.0, f64::max);
    let y_volume = Axis::new(0.0, max_volume.max(1.0), 940.0, 620.0);
    svg.push_str(&hline(
        MARGIN_LEFT,
        width - MARGIN_RIGHT,
        940.0,
        "stroke:#999999;stroke-width:1",
    ));
    svg.push_str(&text(
        MARGIN_LEFT - 8.0,
        y_volume.map(max_volume) + 5.0,
        "end",
        14.0,
        "#666",
        &format!("{:.1}B", max_volume / 1.0e9),
    ));
    let slot = (width - MARGIN_LEFT - MARGIN_RIGHT) / n as f64;
    let bar_width = (slot * 0.8).max(0.5);
    for (i, p) in points.iter().enumerate() {
        let x0 = MARGIN_LEFT + slot * i as f64 + slot * 0.1;
        let top = y_volume.map(p.volume);
        svg.push_str(&rect(
            x0,
            top,
            bar_width,
            940.0 - top,
            &format!("fill:{PRICE_COLOR};fill-opacity:0.5"),
        ));
    }
    date_labels(&mut svg, series, &x, 968.0);

    svg.push_str("</svg>\n");
    svg
}

/// Bar chart of the record's rolling volatilities next to the full-history
/// figure, annotated with regime and percentile. Everything drawn here is
/// already in the record; no analyzer internals are consulted.
pub fn volatility_profile(record: &ResultRecord) -> String {
    let width = 1400.0;
    let height = 600.0;
    let vol = &record.volatility;
    let mut svg = open_svg(width, height);
    svg.push_str(&text(
        width / 2.0,
        40.0,
        "middle",
        24.0,
        "#333",
        "Historical Volatility (Annualized)",
    ));

    let mut bars: Vec<(String, f64, &str)> = vol
        .rolling
        .iter()
        .enumerate()
        .map(|(i, r)| {
            (
                format!("{}d", r.window),
                r.annualized,
                ROLLING_PALETTE[i % ROLLING_PALETTE.len()],
            )
        })
        .collect();
    bars.push(("Full History".to_string(), vol.annualized, PRICE_COLOR));

    let max_vol = bars.iter().map(|b| b.1).fold(0.0, f64::max);
    let y = Axis::new(0.0, (max_vol * 1.2).max(0.01), 500.0, 80.0);
    let slot = (width - MARGIN_LEFT - MARGIN_RIGHT) / bars.len() as f64;
    for (i, (label, value, color)) in bars.iter().enumerate() {
        let x0 = MARGIN_LEFT + slot * i as f64 + slot * 0.2;
        let bar_width = slot * 0.6;
        let top = y.map(*value);
        svg.push_str(&rect(
            x0,
            top,
            bar_width,
            500.0 - top,
            &format!("fill:{color};fill-opacity:0.85"),
        ));
        let center = x0 + bar_width / 2.0;
        svg.push_str(&text(
            center,
            top - 8.0,
            "middle",
            16.0,
            "#333",
            &format!("{:.2}%", value * 100.0),
        ));
        svg.push_str(&text(center, 524.0, "middle", 16.0, "#333", label));
    }
    svg.push_str(&hline(
        MARGIN_LEFT,
        width - MARGIN_RIGHT,
        500.0,
        "stroke:#999999;stroke-width:1",
    ));

    let percentile = match vol.percentile {
        Some(p) => format!("{p:.1}%"),
        None => "n/a".to_string(),
    };
    svg.push_str(&text(
        MARGIN_LEFT,
        566.0,
        "start",
        16.0,
        "#333",
        &format!("Regime: {}    Percentile: {percentile}", vol.regime),
    ));

    svg.push_str("</svg>\n");
    svg
}

/// Expiration payoff diagram: the piecewise-linear condor profile with
/// strike and breakeven markers and shaded profit/loss zones. The shape is
/// fully determined by the four strikes, the credit and the max loss.
pub fn payoff_diagram(record: &ResultRecord) -> String {
    let width = 1400.0;
    let height = 800.0;
    let strikes = &record.strikes;
    let payoff = &record.payoff;
    let credit = payoff.credit_received;
    let max_loss = payoff.max_loss;

    let mut svg = open_svg(width, height);
    svg.push_str(&text(
        width / 2.0,
        40.0,
        "middle",
        24.0,
        "#333",
        "Iron Condor Payoff Diagram",
    ));

    let x_lo = strikes.long_put - 100.0;
    let x_hi = strikes.long_call + 100.0;
    let x = Axis::new(x_lo, x_hi, MARGIN_LEFT, width - MARGIN_RIGHT);
    let span = (credit + max_loss).max(1e-9);
    let y = Axis::new(-max_loss - span * 0.25, credit + span * 0.25, 720.0, 80.0);
    let y_zero = y.map(0.0);

    // Shaded zones between the profile and the zero line
    svg.push_str(&polygon(
        &[
            (x.map(payoff.breakeven_lower), y_zero),
            (x.map(strikes.short_put), y.map(credit)),
            (x.map(strikes.short_call), y.map(credit)),
            (x.map(payoff.breakeven_upper), y_zero),
        ],
        "fill:#2ca02c;fill-opacity:0.15",
    ));
    svg.push_str(&polygon(
        &[
            (x.map(x_lo), y_zero),
            (x.map(payoff.breakeven_lower), y_zero),
            (x.map(strikes.long_put), y.map(-max_loss)),
            (x.map(x_lo), y.map(-max_loss)),
        ],
        "fill:#d62728;fill-opacity:0.15",
    ));
    svg.push_str(&polygon(
        &[
            (x.map(payoff.breakeven_upper), y_zero),
            (x.map(x_hi), y_zero),
            (x.map(x_hi), y.map(-max_loss)),
            (x.map(strikes.long_call), y.map(-max_loss)),
        ],
        "fill:#d62728;fill-opacity:0.15",
    ));

    svg.push_str(&hline(
        MARGIN_LEFT,
        width - MARGIN_RIGHT,
        y_zero,
        "stroke:#999999;stroke-width:1;stroke-dasharray:6,4",
    ));

    // The profile itself: flat loss, rising wing, flat credit, falling wing
    let profile = [
        (x.map(x_lo), y.map(-max_loss)),
        (x.map(strikes.long_put), y.map(-max_loss)),
        (x.map(strikes.short_put), y.map(credit)),
        (x.map(strikes.short_call), y.map(credit)),
        (x.map(strikes.long_call), y.map(-max_loss)),
        (x.map(x_hi), y.map(-max_loss)),
    ];
    svg.push_str(&polyline(
        &profile,
        &format!("fill:none;stroke:{PRICE_COLOR};stroke-width:2.5"),
    ));

    let markers: [(f64, &str); 7] = [
        (
            record.current_price,
            "stroke:#2ca02c;stroke-width:2;stroke-dasharray:8,4",
        ),
        (
            strikes.long_put,
            "stroke:#d62728;stroke-width:1.5;stroke-dasharray:2,4;stroke-opacity:0.7",
        ),
        (
            strikes.short_put,
            "stroke:#ff7f0e;stroke-width:1.5;stroke-dasharray:2,4;stroke-opacity:0.7",
        ),
        (
            strikes.short_call,
            "stroke:#ff7f0e;stroke-width:1.5;stroke-dasharray:2,4;stroke-opacity:0.7",
        ),
        (
            strikes.long_call,
            "stroke:#d62728;stroke-width:1.5;stroke-dasharray:2,4;stroke-opacity:0.7",
        ),
        (
            payoff.breakeven_lower,
            "stroke:#9467bd;stroke-width:2;stroke-dasharray:8,4;stroke-opacity:0.7",
        ),
        (
            payoff.breakeven_upper,
            "stroke:#9467bd;stroke-width:2;stroke-dasharray:8,4;stroke-opacity:0.7",
        ),
    ];
    for (value, style) in &markers {
        svg.push_str(&vline(x.map(*value), 80.0, 720.0, style));
    }

    // Legend, top right
    let legend: [(String, &str); 8] = [
        ("Iron Condor Payoff".to_string(), PRICE_COLOR),
        (
            format!("Current Price: ${:.2}", record.current_price),
            "#2ca02c",
        ),
        (format!("Long Put: ${:.0}", strikes.long_put), "#d62728"),
        (format!("Short Put: ${:.0}", strikes.short_put), "#ff7f0e"),
        (format!("Short Call: ${:.0}", strikes.short_call), "#ff7f0e"),
        (format!("Long Call: ${:.0}", strikes.long_call), "#d62728"),
        (
            format!("Lower BE: ${:.2}", payoff.breakeven_lower),
            "#9467bd",
        ),
        (
            format!("Upper BE: ${:.2}", payoff.breakeven_upper),
            "#9467bd",
        ),
    ];
    for (i, (label, color)) in legend.iter().enumerate() {
        let row_y = 100.0 + 22.0 * i as f64;
        svg.push_str(&hline(
            1020.0,
            1052.0,
            row_y - 4.0,
            &format!("stroke:{color};stroke-width:2.5"),
        ));
        svg.push_str(&text(1060.0, row_y, "start", 13.0, "#333", label));
    }

    // Metrics box, top left
    svg.push_str(&rect(
        92.0,
        94.0,
        270.0,
        86.0,
        "fill:#f5deb3;fill-opacity:0.6;stroke:#999999;stroke-width:1",
    ));
    svg.push_str(&text(
        104.0,
        118.0,
        "start",
        14.0,
        "#333",
        &format!("Max Profit: ${:.2}", payoff.max_profit),
    ));
    svg.push_str(&text(
        104.0,
        142.0,
        "start",
        14.0,
        "#333",
        &format!("Max Loss: ${:.2}", payoff.max_loss),
    ));
    let ror = match payoff.return_on_risk {
        Some(r) => format!("Return on Risk: {:.1}%", r * 100.0),
        None => "Return on Risk: n/a".to_string(),
    };
    svg.push_str(&text(104.0, 166.0, "start", 14.0, "#333", &ror));

    // Axes annotation
    for (value, anchor) in [
        (x_lo, "start"),
        (record.current_price, "middle"),
        (x_hi, "end"),
    ] {
        svg.push_str(&text(
            x.map(value),
            748.0,
            anchor,
            14.0,
            "#666",
            &format!("{value:.0}"),
        ));
    }
    for value in [-max_loss, 0.0, credit] {
        svg.push_str(&text(
            MARGIN_LEFT - 8.0,
            y.map(value) + 5.0,
            "end",
            14.0,
            "#666",
            &format!("{value:.2}"),
        ));
    }
    svg.push_str(&text(
        width / 2.0,
        780.0,
        "middle",
        16.0,
        "#333",
        "Price at Expiration ($)",
    ));

    svg.push_str("</svg>\n");
    svg
}

// ── SVG primitives ──

/// Linear data-to-pixel mapping for one axis. A degenerate domain maps
/// everything to the middle of the pixel range instead of dividing by zero.
#[derive(Clone, Copy)]
struct Axis {
    d0: f64,
    d1: f64,
    p0: f64,
    p1: f64,
}

impl Axis {
    fn new(d0: f64, d1: f64, p0: f64, p1: f64) -> Self {
        Self { d0, d1, p0, p1 }
    }

    fn map(&self, value: f64) -> f64 {
        let span = self.d1 - self.d0;
        if span.abs() < 1e-12 {
            return (self.p0 + self.p1) / 2.0;
        }
        self.p0 + (value - self.d0) / span * (self.p1 - self.p0)
    }
}

fn open_svg(width: f64, height: f64) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {width:.0} {height:.0}\" \
         width=\"{width:.0}\" height=\"{height:.0}\" font-family=\"Helvetica, Arial, sans-serif\">\n\
         <rect width=\"{width:.0}\" height=\"{height:.0}\" fill=\"white\"/>\n"
    )
}

fn polyline(points: &[(f64, f64)], style: &str) -> String {
    let pts: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
    format!("<polyline points=\"{}\" style=\"{style}\"/>\n", pts.join(" "))
}

fn polygon(points: &[(f64, f64)], style: &str) -> String {
    let pts: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
    format!("<polygon points=\"{}\" style=\"{style}\"/>\n", pts.join(" "))
}

fn rect(x: f64, y: f64, w: f64, h: f64, style: &str) -> String {
    format!(
        "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{w:.1}\" height=\"{h:.1}\" style=\"{style}\"/>\n"
    )
}

fn hline(x0: f64, x1: f64, y: f64, style: &str) -> String {
    format!(
        "<line x1=\"{x0:.1}\" y1=\"{y:.1}\" x2=\"{x1:.1}\" y2=\"{y:.1}\" style=\"{style}\"/>\n"
    )
}

fn vline(x: f64, y0: f64, y1: f64, style: &str) -> String {
    format!(
        "<line x1=\"{x:.1}\" y1=\"{y0:.1}\" x2=\"{x:.1}\" y2=\"{y1:.1}\" style=\"{style}\"/>\n"
    )
}

fn text(x: f64, y: f64, anchor: &str, size: f64, fill: &str, content: &str) -> String {
    format!(
        "<text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"{anchor}\" font-size=\"{size:.0}\" \
         fill=\"{fill}\">{content}</text>\n"
    )
}

/// First, middle and last dates under a time axis
fn date_labels(svg: &mut String, series: &PriceSeries, x: &Axis, y: f64) {
    let points = series.points();
    let n = points.len();
    let picks = [(0usize, "start"), (n / 2, "middle"), (n - 1, "end")];
    for (idx, anchor) in picks {
        if idx >= n {
            continue;
        }
        svg.push_str(&text(
            x.map(idx as f64),
            y,
            anchor,
            14.0,
            "#666",
            &points[idx].date.format("%Y-%m-%d").to_string(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sample_record;
    use crate::types::PricePoint;
    use chrono::NaiveDate;

    fn small_series() -> PriceSeries {
        let base = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let closes = [100.0, 102.0, 101.0, 104.0, 103.5];
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: base + chrono::Days::new(i as u64),
                close,
                volume: 1.0e9 + i as f64 * 1.0e8,
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn test_price_chart_draws_line_and_bars() {
        let svg = price_history(&small_series());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("Trading Volume"));
        assert!(svg.contains("2026-03-02"), "first date label missing");
        assert!(svg.contains("2026-03-06"), "last date label missing");
    }

    #[test]
    fn test_empty_series_renders_placeholder() {
        let series = PriceSeries::new(Vec::new()).unwrap();
        let svg = price_history(&series);
        assert!(svg.contains("no price data"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_volatility_chart_labels_every_bar() {
        let svg = volatility_profile(&sample_record());
        for label in ["10d", "30d", "60d", "Full History"] {
            assert!(svg.contains(label), "missing bar label {label}");
        }
        assert!(svg.contains("18.00%"), "annualized value label missing");
        assert!(svg.contains("Regime: MODERATE"));
        assert!(svg.contains("Percentile: 62.5%"));
    }

    #[test]
    fn test_payoff_chart_marks_breakevens() {
        let record = sample_record();
        let svg = payoff_diagram(&record);
        assert!(svg.contains(&format!(
            "Lower BE: ${:.2}",
            record.payoff.breakeven_lower
        )));
        assert!(svg.contains(&format!(
            "Upper BE: ${:.2}",
            record.payoff.breakeven_upper
        )));
        assert!(svg.contains(&format!("Max Profit: ${:.2}", record.payoff.max_profit)));
        assert!(svg.contains("Iron Condor Payoff Diagram"));
        assert!(svg.contains("fill:#2ca02c"), "profit shading missing");
        assert!(svg.contains("fill:#d62728"), "loss shading missing");
    }

    #[test]
    fn test_axis_maps_endpoints_and_degenerate_domain() {
        let axis = Axis::new(0.0, 10.0, 100.0, 200.0);
        assert!((axis.map(0.0) - 100.0).abs() < 1e-9);
        assert!((axis.map(10.0) - 200.0).abs() < 1e-9);
        assert!((axis.map(5.0) - 150.0).abs() < 1e-9);

        let flat = Axis::new(3.0, 3.0, 0.0, 50.0);
        assert!((flat.map(3.0) - 25.0).abs() < 1e-9);
    }
}
