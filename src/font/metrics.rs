//! Advance widths for the standard PDF fonts.
//!
//! Widths are in 1/1000 em for the printable ASCII range (0x20..=0x7E), taken
//! from the Adobe core font metrics. Characters outside that range use a
//! per-font average. Oblique/italic faces reuse the upright widths; Times
//! Bold is approximated from Times Roman. Close enough for line breaking.

/// Helvetica, 0x20..=0x7E.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold, 0x20..=0x7E.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Times-Roman, 0x20..=0x7E.
const TIMES: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

/// Metrics for one standard font face.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    widths: Option<&'static [u16; 95]>,
    /// Width used outside the table, and for every glyph when there is none.
    default_width: u16,
    /// Multiplier applied to table widths (synthetic bold).
    scale: f64,
}

impl StandardFontMetrics {
    pub const HELVETICA: Self = Self {
        widths: Some(&HELVETICA),
        default_width: 556,
        scale: 1.0,
    };
    pub const HELVETICA_BOLD: Self = Self {
        widths: Some(&HELVETICA_BOLD),
        default_width: 611,
        scale: 1.0,
    };
    pub const TIMES: Self = Self {
        widths: Some(&TIMES),
        default_width: 500,
        scale: 1.0,
    };
    pub const TIMES_BOLD: Self = Self {
        widths: Some(&TIMES),
        default_width: 520,
        scale: 1.04,
    };
    /// Courier is monospaced.
    pub const COURIER: Self = Self {
        widths: None,
        default_width: 600,
        scale: 1.0,
    };

    /// Advance width of `ch` in points at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let code = ch as u32;
        let units = match self.widths {
            Some(table) if (0x20..=0x7E).contains(&code) => {
                table[(code - 0x20) as usize] as f64 * self.scale
            }
            _ => self.default_width as f64,
        };
        units / 1000.0 * font_size
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_space() {
        let w = StandardFontMetrics::HELVETICA.char_width(' ', 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn table_lookup_is_aligned() {
        // 'A' = 667, 'a' = 556, '~' = 584 in Helvetica
        let m = StandardFontMetrics::HELVETICA;
        assert!((m.char_width('A', 1000.0) - 667.0).abs() < 1e-9);
        assert!((m.char_width('a', 1000.0) - 556.0).abs() < 1e-9);
        assert!((m.char_width('~', 1000.0) - 584.0).abs() < 1e-9);
        assert!((m.char_width('W', 1000.0) - 944.0).abs() < 1e-9);
    }

    #[test]
    fn courier_is_monospaced() {
        let m = StandardFontMetrics::COURIER;
        assert_eq!(m.measure_string("iii", 10.0), m.measure_string("WWW", 10.0));
    }

    #[test]
    fn non_ascii_uses_default() {
        let m = StandardFontMetrics::HELVETICA;
        assert!((m.char_width('é', 1000.0) - 556.0).abs() < 1e-9);
    }
}
