//! ==============================================================================
//! chart.rs - inline svg line charts with fixed axes
//! ==============================================================================
//!
//! each sensor page plots its series against a fixed y range so the charts
//! do not rescale between refreshes. temperature and humidity also shade a
//! comfort band.
//!
//! ==============================================================================

use crate::domain::SensorKind;

const WIDTH: f64 = 480.0;
const HEIGHT: f64 = 240.0;
const PAD_LEFT: f64 = 48.0;
const PAD_RIGHT: f64 = 12.0;
const PAD_TOP: f64 = 28.0;
const PAD_BOTTOM: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSpec {
    pub range: AxisRange,
    /// shaded "normal" band, if the quantity has one
    pub band: Option<AxisRange>,
}

impl ChartSpec {
    pub fn for_kind(kind: SensorKind) -> Self {
        let r = |min, max| AxisRange { min, max };
        match kind {
            SensorKind::Temperature => Self { range: r(10.0, 35.0), band: Some(r(22.0, 28.0)) },
            SensorKind::Humidity => Self { range: r(40.0, 100.0), band: Some(r(60.0, 80.0)) },
            SensorKind::Pressure => Self { range: r(900.0, 1100.0), band: None },
            SensorKind::Distance => Self { range: r(10.0, 90.0), band: None },
        }
    }

    /// svg y coordinate for a value, clamped to the plot area
    pub fn y_for(&self, value: f64) -> f64 {
        let AxisRange { min, max } = self.range;
        let clamped = value.clamp(min, max);
        let plot_h = HEIGHT - PAD_TOP - PAD_BOTTOM;
        PAD_TOP + (max - clamped) / (max - min) * plot_h
    }
}

/// svg x coordinate of point `i` out of `n`
fn x_for(i: usize, n: usize) -> f64 {
    let plot_w = WIDTH - PAD_LEFT - PAD_RIGHT;
    if n <= 1 {
        PAD_LEFT + plot_w / 2.0
    } else {
        PAD_LEFT + i as f64 / (n - 1) as f64 * plot_w
    }
}

/// "HH:MM" from a "YYYY-MM-DD HH:MM:SS" timestamp
pub fn clock_label(timestamp: &str) -> &str {
    timestamp.get(11..16).unwrap_or(timestamp)
}

/// render a series as an svg line chart
///
/// `labels` are the sample timestamps; the first and last are printed under
/// the x axis. returns `None` for an empty series.
pub fn render_svg(title: &str, kind: SensorKind, values: &[f64], labels: &[String]) -> Option<String> {
    if values.is_empty() {
        return None;
    }

    let spec = ChartSpec::for_kind(kind);
    let n = values.len();
    let mut svg = String::new();

    svg.push_str(&format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" class="chart" style="background:#262f40">"##
    ));
    svg.push_str(&format!(
        r##"<rect x="{PAD_LEFT}" y="{PAD_TOP}" width="{}" height="{}" fill="#0e1117" stroke="gray"/>"##,
        WIDTH - PAD_LEFT - PAD_RIGHT,
        HEIGHT - PAD_TOP - PAD_BOTTOM
    ));

    if let Some(band) = spec.band {
        let top = spec.y_for(band.max);
        let bottom = spec.y_for(band.min);
        svg.push_str(&format!(
            r##"<rect x="{PAD_LEFT}" y="{top:.1}" width="{}" height="{:.1}" fill="#2e7d32" fill-opacity="0.25"/>"##,
            WIDTH - PAD_LEFT - PAD_RIGHT,
            bottom - top
        ));
    }

    // y axis ticks at the range ends
    for v in [spec.range.min, spec.range.max] {
        svg.push_str(&format!(
            r#"<text x="{}" y="{:.1}" fill="gray" font-size="10" text-anchor="end">{}</text>"#,
            PAD_LEFT - 4.0,
            spec.y_for(v) + 3.0,
            v
        ));
    }

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{:.1},{:.1}", x_for(i, n), spec.y_for(*v)))
        .collect();
    svg.push_str(&format!(
        r#"<polyline points="{}" fill="none" stroke="cyan" stroke-width="1.5"/>"#,
        points.join(" ")
    ));
    for (i, v) in values.iter().enumerate() {
        svg.push_str(&format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="2.5" fill="cyan"/>"#,
            x_for(i, n),
            spec.y_for(*v)
        ));
    }

    if let (Some(first), Some(last)) = (labels.first(), labels.last()) {
        let y = HEIGHT - 10.0;
        svg.push_str(&format!(
            r#"<text x="{PAD_LEFT}" y="{y}" fill="gray" font-size="10">{}</text>"#,
            html_escape(clock_label(first))
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{y}" fill="gray" font-size="10" text-anchor="end">{}</text>"#,
            WIDTH - PAD_RIGHT,
            html_escape(clock_label(last))
        ));
    }

    svg.push_str(&format!(
        r#"<text x="{}" y="18" fill="white" font-size="13" text-anchor="middle">{}</text>"#,
        WIDTH / 2.0,
        html_escape(title)
    ));
    svg.push_str("</svg>");
    Some(svg)
}

/// escape html special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_ranges() {
        let t = ChartSpec::for_kind(SensorKind::Temperature);
        assert_eq!(t.range, AxisRange { min: 10.0, max: 35.0 });
        assert_eq!(t.band, Some(AxisRange { min: 22.0, max: 28.0 }));

        let h = ChartSpec::for_kind(SensorKind::Humidity);
        assert_eq!(h.range, AxisRange { min: 40.0, max: 100.0 });
        assert_eq!(h.band, Some(AxisRange { min: 60.0, max: 80.0 }));

        let p = ChartSpec::for_kind(SensorKind::Pressure);
        assert_eq!(p.range, AxisRange { min: 900.0, max: 1100.0 });
        assert_eq!(p.band, None);
    }

    #[test]
    fn test_y_mapping_and_clamping() {
        let spec = ChartSpec::for_kind(SensorKind::Temperature);
        assert_eq!(spec.y_for(35.0), PAD_TOP);
        assert_eq!(spec.y_for(10.0), HEIGHT - PAD_BOTTOM);
        assert_eq!(spec.y_for(50.0), spec.y_for(35.0));
        assert_eq!(spec.y_for(-5.0), spec.y_for(10.0));
        assert!(spec.y_for(25.0) < spec.y_for(20.0));
    }

    #[test]
    fn test_render_empty_is_none() {
        assert!(render_svg("t", SensorKind::Humidity, &[], &[]).is_none());
    }

    #[test]
    fn test_render_has_points_band_and_labels() {
        let labels = vec!["2026-10-18 08:00:00".to_string(), "2026-10-18 08:30:00".to_string()];
        let svg = render_svg("Humidity", SensorKind::Humidity, &[61.0, 63.5], &labels).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("fill-opacity"));
        assert!(svg.contains(">08:00<"));
        assert!(svg.contains(">08:30<"));
    }

    #[test]
    fn test_clock_label_fallback() {
        assert_eq!(clock_label("2026-10-18 23:59:01"), "23:59");
        assert_eq!(clock_label("n/a"), "n/a");
    }
}
