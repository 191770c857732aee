//! A plotters drawing backend that records PDF content-stream operations.
//!
//! Every drawing call is appended to a borrowed `Vec<Operation>` which the
//! [`ReportDocument`](super::ReportDocument) later wraps into a page stream.
//! Backend coordinates are treated as PDF points; the y axis is flipped so
//! plotters can keep its top-left origin.

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};
use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
    FontStyle, FontTransform,
};
use thiserror::Error;

/// Resource name of the regular text font.
pub const REGULAR_FONT: &str = "F1";
/// Resource name of the bold text font.
pub const BOLD_FONT: &str = "F2";

/// Bezier control distance for a quarter circle.
const KAPPA: f64 = 0.552_284_75;

/// Error raised while recording drawing operations.
#[derive(Debug, Error)]
#[error("PDF drawing failed: {0}")]
pub struct PdfBackendError(String);

/// Drawing backend writing into a page's operation list.
pub struct PdfBackend<'a> {
    operations: &'a mut Vec<Operation>,
    size: (u32, u32),
}

impl<'a> PdfBackend<'a> {
    /// Create a backend for a page of `size` points.
    pub fn new(operations: &'a mut Vec<Operation>, size: (u32, u32)) -> Self {
        Self { operations, size }
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn flip(&self, (x, y): BackendCoord) -> (f64, f64) {
        (x as f64, self.size.1 as f64 - y as f64)
    }

    fn set_fill(&mut self, color: BackendColor) -> bool {
        match blend_over_white(color) {
            Some([r, g, b]) => {
                self.push("rg", vec![real(r), real(g), real(b)]);
                true
            }
            None => false,
        }
    }

    fn set_stroke<S: BackendStyle>(&mut self, style: &S) -> bool {
        match blend_over_white(style.color()) {
            Some([r, g, b]) => {
                self.push("RG", vec![real(r), real(g), real(b)]);
                self.push("w", vec![real(style.stroke_width().max(1) as f64)]);
                true
            }
            None => false,
        }
    }

    fn trace(&mut self, points: &[BackendCoord]) {
        for (i, point) in points.iter().enumerate() {
            let (x, y) = self.flip(*point);
            let op = if i == 0 { "m" } else { "l" };
            self.push(op, vec![real(x), real(y)]);
        }
    }
}

impl DrawingBackend for PdfBackend<'_> {
    type ErrorType = PdfBackendError;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<PdfBackendError>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<PdfBackendError>> {
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<PdfBackendError>> {
        if self.set_fill(color) {
            let (x, y) = self.flip(point);
            self.push("re", vec![real(x), real(y - 1.0), real(1.0), real(1.0)]);
            self.push("f", vec![]);
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<PdfBackendError>> {
        if self.set_stroke(style) {
            self.trace(&[from, to]);
            self.push("S", vec![]);
        }
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<PdfBackendError>> {
        let visible = if fill {
            self.set_fill(style.color())
        } else {
            self.set_stroke(style)
        };
        if !visible {
            return Ok(());
        }

        let (x0, top) = self.flip(upper_left);
        let (x1, bottom) = self.flip(bottom_right);
        self.push(
            "re",
            vec![
                real(x0.min(x1)),
                real(bottom.min(top)),
                real((x1 - x0).abs()),
                real((top - bottom).abs()),
            ],
        );
        self.push(if fill { "f" } else { "S" }, vec![]);
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<PdfBackendError>> {
        let points: Vec<BackendCoord> = path.into_iter().collect();
        if points.len() < 2 || !self.set_stroke(style) {
            return Ok(());
        }
        self.trace(&points);
        self.push("S", vec![]);
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<PdfBackendError>> {
        let visible = if fill {
            self.set_fill(style.color())
        } else {
            self.set_stroke(style)
        };
        if !visible {
            return Ok(());
        }

        let (cx, cy) = self.flip(center);
        let r = radius as f64;
        let k = r * KAPPA;
        self.push("m", vec![real(cx + r), real(cy)]);
        let quarters = [
            [cx + r, cy + k, cx + k, cy + r, cx, cy + r],
            [cx - k, cy + r, cx - r, cy + k, cx - r, cy],
            [cx - r, cy - k, cx - k, cy - r, cx, cy - r],
            [cx + k, cy - r, cx + r, cy - k, cx + r, cy],
        ];
        for quarter in quarters {
            self.push("c", quarter.iter().map(|v| real(*v)).collect());
        }
        self.push("h", vec![]);
        self.push(if fill { "f" } else { "S" }, vec![]);
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<PdfBackendError>> {
        let points: Vec<BackendCoord> = vert.into_iter().collect();
        if points.len() < 3 || !self.set_fill(style.color()) {
            return Ok(());
        }
        self.trace(&points);
        self.push("h", vec![]);
        self.push("f", vec![]);
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<PdfBackendError>> {
        let size = style.size();
        if !size.is_finite() || size <= 0.0 {
            return Err(DrawingErrorKind::DrawingError(PdfBackendError(format!(
                "invalid font size {size} for text '{text}'"
            ))));
        }
        if text.is_empty() {
            return Ok(());
        }
        let Some([r, g, b]) = blend_over_white(style.color()) else {
            return Ok(());
        };

        let bold = matches!(style.style(), FontStyle::Bold);
        let width = text_width(text, size, bold);
        let anchor = style.anchor();
        let dx = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => -width / 2.0,
            HPos::Right => -width,
        };
        let dy = match anchor.v_pos {
            VPos::Top => -0.8 * size,
            VPos::Center => -0.35 * size,
            VPos::Bottom => 0.2 * size,
        };

        // (ta, tb) is the text direction, (tc, td) the glyph "up" direction
        let (ta, tb, tc, td) = match style.transform() {
            FontTransform::Rotate90 => (0.0, -1.0, 1.0, 0.0),
            FontTransform::Rotate180 => (-1.0, 0.0, 0.0, -1.0),
            FontTransform::Rotate270 => (0.0, 1.0, -1.0, 0.0),
            _ => (1.0, 0.0, 0.0, 1.0),
        };
        let (x, y) = self.flip(pos);
        let origin_x = x + dx * ta + dy * tc;
        let origin_y = y + dx * tb + dy * td;

        let font = if bold { BOLD_FONT } else { REGULAR_FONT };
        self.push("rg", vec![real(r), real(g), real(b)]);
        self.push("BT", vec![]);
        self.push("Tf", vec![font.into(), real(size)]);
        self.push(
            "Tm",
            vec![
                real(ta),
                real(tb),
                real(tc),
                real(td),
                real(origin_x),
                real(origin_y),
            ],
        );
        self.push(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Hexadecimal)],
        );
        self.push("ET", vec![]);
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<PdfBackendError>> {
        let size = style.size();
        let bold = matches!(style.style(), FontStyle::Bold);
        Ok((
            text_width(text, size, bold).ceil() as u32,
            size.ceil() as u32,
        ))
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Composite a translucent colour over a white page; `None` when invisible.
fn blend_over_white(color: BackendColor) -> Option<[f64; 3]> {
    let alpha = color.alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return None;
    }
    let (r, g, b) = color.rgb;
    let channel = |c: u8| (255.0 - alpha * (255.0 - c as f64)) / 255.0;
    Some([channel(r), channel(g), channel(b)])
}

/// Encode text for a WinAnsi simple font; unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0x7e | code @ 0xa0..=0xff => code as u8,
            _ => b'?',
        })
        .collect()
}

/// Glyph advance widths of Helvetica for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Default advance for characters outside the table.
const DEFAULT_WIDTH: u16 = 556;

/// Width in points of `text` set in Helvetica at `size`.
pub fn text_width(text: &str, size: f64, bold: bool) -> f64 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|byte| match byte {
            0x20..=0x7e => HELVETICA_WIDTHS[(byte - 0x20) as usize],
            _ => DEFAULT_WIDTH,
        } as u32)
        .sum();
    let width = units as f64 * size / 1000.0;
    if bold { width * 1.05 } else { width }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::prelude::*;
    use plotters::style::text_anchor::Pos;
    use pretty_assertions::assert_eq;

    fn operators(operations: &[Operation]) -> Vec<&str> {
        operations.iter().map(|op| op.operator.as_str()).collect()
    }

    fn numbers(operation: &Operation) -> Vec<f32> {
        operation
            .operands
            .iter()
            .map(|operand| match operand {
                Object::Real(value) => *value,
                Object::Integer(value) => *value as f32,
                other => panic!("expected a number, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_text_width_uses_helvetica_metrics() {
        assert!((text_width("Hi", 10.0, false) - (0.722 + 0.222) * 10.0).abs() < 1e-9);
        assert!((text_width(" ", 12.0, false) - 0.278 * 12.0).abs() < 1e-9);
        assert!(text_width("Hi", 10.0, true) > text_width("Hi", 10.0, false));
        assert_eq!(text_width("", 10.0, false), 0.0);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Abc"), b"Abc".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_blend_over_white() {
        let opaque = BackendColor { alpha: 1.0, rgb: (255, 0, 0) };
        assert_eq!(blend_over_white(opaque), Some([1.0, 0.0, 0.0]));

        let half = BackendColor { alpha: 0.5, rgb: (0, 0, 0) };
        assert_eq!(blend_over_white(half), Some([0.5, 0.5, 0.5]));

        let clear = BackendColor { alpha: 0.0, rgb: (0, 0, 0) };
        assert_eq!(blend_over_white(clear), None);
    }

    #[test]
    fn test_line_flips_y_axis() {
        let mut operations = Vec::new();
        {
            let mut backend = PdfBackend::new(&mut operations, (100, 200));
            backend.draw_line((10, 20), (30, 40), &BLACK).unwrap();
        }

        assert_eq!(operators(&operations), vec!["RG", "w", "m", "l", "S"]);
        assert_eq!(numbers(&operations[2]), vec![10.0, 180.0]);
        assert_eq!(numbers(&operations[3]), vec![30.0, 160.0]);
    }

    #[test]
    fn test_filled_rect() {
        let mut operations = Vec::new();
        {
            let mut backend = PdfBackend::new(&mut operations, (100, 100));
            backend
                .draw_rect((10, 10), (30, 40), &RED.filled(), true)
                .unwrap();
        }

        assert_eq!(operators(&operations), vec!["rg", "re", "f"]);
        assert_eq!(numbers(&operations[1]), vec![10.0, 60.0, 20.0, 30.0]);
    }

    #[test]
    fn test_transparent_shapes_are_skipped() {
        let mut operations = Vec::new();
        {
            let mut backend = PdfBackend::new(&mut operations, (100, 100));
            backend
                .draw_rect((0, 0), (10, 10), &TRANSPARENT, true)
                .unwrap();
            backend.draw_circle((50, 50), 5, &TRANSPARENT, false).unwrap();
        }

        assert!(operations.is_empty());
    }

    #[test]
    fn test_circle_is_four_curves() {
        let mut operations = Vec::new();
        {
            let mut backend = PdfBackend::new(&mut operations, (100, 100));
            backend.draw_circle((50, 50), 5, &BLUE, false).unwrap();
        }

        let curves = operators(&operations).iter().filter(|op| **op == "c").count();
        assert_eq!(curves, 4);
        assert_eq!(operators(&operations).last(), Some(&"S"));
    }

    #[test]
    fn test_text_through_drawing_area() {
        let mut operations = Vec::new();
        {
            let root = PdfBackend::new(&mut operations, (200, 100)).into_drawing_area();
            let style = TextStyle::from(("sans-serif", 12).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center));
            root.draw_text("Hello", &style, (100, 50)).unwrap();
        }

        let ops = operators(&operations);
        assert_eq!(ops, vec!["rg", "BT", "Tf", "Tm", "Tj", "ET"]);
        assert!(matches!(&operations[2].operands[0], Object::Name(name) if name == b"F1"));
        assert!(matches!(&operations[4].operands[0], Object::String(bytes, _) if bytes == b"Hello"));
    }

    #[test]
    fn test_text_fill_color_survives_rotation() {
        let mut operations = Vec::new();
        {
            let mut backend = PdfBackend::new(&mut operations, (200, 100));
            let white = TextStyle::from(("sans-serif", 10).into_font()).color(&WHITE);
            let blue = TextStyle::from(("sans-serif", 10).into_font())
                .color(&BLUE)
                .transform(FontTransform::Rotate270);
            backend.draw_text("0.95", &white, (50, 50)).unwrap();
            backend.draw_text("income", &blue, (20, 80)).unwrap();
        }

        let fills: Vec<&Operation> = operations.iter().filter(|op| op.operator == "rg").collect();
        assert_eq!(fills.len(), 2);
        assert_eq!(numbers(fills[0]), vec![1.0, 1.0, 1.0]);
        assert_eq!(numbers(fills[1]), vec![0.0, 0.0, 1.0]);

        let matrices: Vec<&Operation> = operations.iter().filter(|op| op.operator == "Tm").collect();
        assert_eq!(&numbers(matrices[1])[..4], &[0.0, 1.0, -1.0, 0.0]);
    }

    #[test]
    fn test_estimate_text_size() {
        let mut operations = Vec::new();
        let root = PdfBackend::new(&mut operations, (200, 100)).into_drawing_area();
        let style = TextStyle::from(("sans-serif", 10).into_font());

        let (width, height) = root.estimate_text_size("Hi", &style).unwrap();
        assert_eq!((width, height), (10, 10));
    }
}
