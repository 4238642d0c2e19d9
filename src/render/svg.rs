//! SVG generation

use super::{Background, Cross, RenderSvg, STROKE_WIDTH, Segment, frame_marks};
use crate::scene::Frame;

/// Render one frame as a standalone SVG document.
pub fn render_svg(frame: &Frame<'_>) -> String {
    let w = fmt_num(frame.viewport.width());
    let h = fmt_num(frame.viewport.height());
    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\" data-tick=\"{}\">\n",
        frame.tick
    );
    for mark in frame_marks(frame) {
        mark.render_svg(&mut out);
    }
    out.push_str("</svg>\n");
    out
}

impl RenderSvg for Background {
    fn render_svg(&self, out: &mut String) {
        out.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            fmt_num(self.width),
            fmt_num(self.height),
            self.color.to_hex()
        ));
    }
}

impl RenderSvg for Segment {
    fn render_svg(&self, out: &mut String) {
        out.push_str(&format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
            fmt_num(self.from.x),
            fmt_num(self.from.y),
            fmt_num(self.to.x),
            fmt_num(self.to.y),
            self.color.to_hex(),
            fmt_num(self.width)
        ));
    }
}

impl RenderSvg for Cross {
    fn render_svg(&self, out: &mut String) {
        let [(a, b), (c, d)] = self.arms();
        out.push_str(&format!(
            "<path class=\"{}\" d=\"M{},{}L{},{}M{},{}L{},{}\" stroke=\"{}\" stroke-width=\"{}\" fill=\"none\"/>\n",
            if self.hovered { "marker hovered" } else { "marker" },
            fmt_num(a.x),
            fmt_num(a.y),
            fmt_num(b.x),
            fmt_num(b.y),
            fmt_num(c.x),
            fmt_num(c.y),
            fmt_num(d.x),
            fmt_num(d.y),
            self.color.to_hex(),
            fmt_num(STROKE_WIDTH)
        ));
    }
}

/// Format a number with 6 significant figures, trailing zeros trimmed.
pub(crate) fn fmt_num(value: f64) -> String {
    fmt_num_precision(value, 6)
}

fn fmt_num_precision(value: f64, sig_figs: i32) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(sig_figs - 1 - magnitude);
    let rounded = (value * scale).round() / scale;

    let decimals = (sig_figs - 1 - magnitude).max(0) as usize;
    let s = format!("{:.prec$}", rounded, prec = decimals);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        &s
    };
    // "-0" after rounding a tiny negative
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
