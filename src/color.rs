//! Resolves color tokens from drawing strings and attributes.
//!
//! Accepted forms: a name from the X11 palette, `#rrggbb`, `#rrggbbaa`, an HSV triple
//! (`h,s,v` or `h s v`, components in 0..1), and the `none`/`transparent` keywords.
//! Gradients (`[...]`, `(...)`) degrade to their first stop.

use crate::diagnostics::Diagnostics;
use crate::error::Error;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components as fractions, as used by `\definecolor{..}{rgb}{..}`.
    pub fn fractions(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }

    fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let h = (h.clamp(0.0, 1.0) * 6.0) % 6.0;
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        let byte = |c: f64| (c * 255.0).round() as u8;

        Rgb::new(byte(r), byte(g), byte(b))
    }
}

/// A color as the dialects need it: the rgb value, and the palette name if it had one.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// Paints nothing ("none", "transparent", or a zero alpha).
    None,
    Known { name: Option<String>, rgb: Rgb },
}

impl Color {
    pub fn black() -> Self {
        Color::Known {
            name: Some("black".to_string()),
            rgb: Rgb::BLACK,
        }
    }

    pub fn rgb(&self) -> Option<Rgb> {
        match self {
            Color::None => None,
            Color::Known { rgb, .. } => Some(*rgb),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Color::None => None,
            Color::Known { name, .. } => name.as_deref(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Color::None)
    }
}

/// Resolve a color token, substituting black with an `UnresolvedColor` warning when the
/// token is not understood.
pub fn resolve(token: &str, diagnostics: &mut Diagnostics) -> Color {
    let token = token.trim();

    if token.starts_with('[') || token.starts_with('(') {
        return resolve_gradient(token, diagnostics);
    }
    match parse(token) {
        Some(color) => color,
        None => {
            diagnostics.warn(Error::UnresolvedColor {
                token: token.to_string(),
                substitute: "black".to_string(),
            });
            Color::black()
        }
    }
}

/// Parse a color token, without any fallback.
pub fn parse(token: &str) -> Option<Color> {
    let token = token.trim();
    let lower = token.to_ascii_lowercase();

    if lower == "none" || lower == "transparent" || lower == "invis" {
        return Some(Color::None);
    }
    if let Some(hex) = token.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(rgb) = parse_hsv(token) {
        return Some(Color::Known { name: None, rgb });
    }
    // Names may carry a color scheme prefix such as "/x11/red".
    let name = lower.rsplit('/').next().unwrap_or(&lower);

    palette_lookup(name).map(|rgb| Color::Known {
        name: Some(name.to_string()),
        rgb,
    })
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let rgb = Rgb::new(byte(0)?, byte(2)?, byte(4)?);
    let alpha = if hex.len() == 8 { byte(6)? } else { 255 };

    if alpha == 0 {
        return Some(Color::None);
    }
    let name = palette_name(rgb).map(str::to_string);

    Some(Color::Known { name, rgb })
}

fn parse_hsv(token: &str) -> Option<Rgb> {
    let parts = token
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;

    match parts[..] {
        [h, s, v] => Some(Rgb::from_hsv(h, s, v)),
        _ => None,
    }
}

/// Gradients are not drawn: the first color stop is used instead.
fn resolve_gradient(token: &str, diagnostics: &mut Diagnostics) -> Color {
    let first_stop = token
        .split_whitespace()
        .filter_map(|word| {
            let word = word.trim_matches(|c| c == '[' || c == ']' || c == '(' || c == ')');
            // Stops are written as length prefixed strings: "n -color".
            word.strip_prefix('-')
        })
        .find_map(parse);

    diagnostics.warn(Error::UnsupportedPrimitive {
        dialect: "LaTeX",
        primitive: "gradient fill",
        fallback: "using the first color stop".to_string(),
    });
    match first_stop {
        Some(color) => color,
        None => {
            diagnostics.warn(Error::UnresolvedColor {
                token: token.to_string(),
                substitute: "black".to_string(),
            });
            Color::black()
        }
    }
}

fn palette_lookup(name: &str) -> Option<Rgb> {
    PALETTE
        .iter()
        .find(|(palette_name, _)| *palette_name == name)
        .map(|(_, rgb)| *rgb)
}

fn palette_name(rgb: Rgb) -> Option<&'static str> {
    PALETTE
        .iter()
        .find(|(_, palette_rgb)| *palette_rgb == rgb)
        .map(|(name, _)| *name)
}

/// The X11 colors most often used with graphviz.  All of them are known to xcolor with the
/// `x11names` and `svgnames` options.
const PALETTE: [(&str, Rgb); 48] = [
    ("black", Rgb::new(0, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("gray", Rgb::new(192, 192, 192)),
    ("grey", Rgb::new(192, 192, 192)),
    ("lightgray", Rgb::new(211, 211, 211)),
    ("lightgrey", Rgb::new(211, 211, 211)),
    ("darkgray", Rgb::new(169, 169, 169)),
    ("dimgray", Rgb::new(105, 105, 105)),
    ("orange", Rgb::new(255, 165, 0)),
    ("darkorange", Rgb::new(255, 140, 0)),
    ("purple", Rgb::new(160, 32, 240)),
    ("violet", Rgb::new(238, 130, 238)),
    ("pink", Rgb::new(255, 192, 203)),
    ("brown", Rgb::new(165, 42, 42)),
    ("gold", Rgb::new(255, 215, 0)),
    ("navy", Rgb::new(0, 0, 128)),
    ("navyblue", Rgb::new(0, 0, 128)),
    ("skyblue", Rgb::new(135, 206, 235)),
    ("lightblue", Rgb::new(173, 216, 230)),
    ("steelblue", Rgb::new(70, 130, 180)),
    ("royalblue", Rgb::new(65, 105, 225)),
    ("darkblue", Rgb::new(0, 0, 139)),
    ("turquoise", Rgb::new(64, 224, 208)),
    ("darkgreen", Rgb::new(0, 100, 0)),
    ("forestgreen", Rgb::new(34, 139, 34)),
    ("lightgreen", Rgb::new(144, 238, 144)),
    ("limegreen", Rgb::new(50, 205, 50)),
    ("olivedrab", Rgb::new(107, 142, 35)),
    ("darkred", Rgb::new(139, 0, 0)),
    ("firebrick", Rgb::new(178, 34, 34)),
    ("crimson", Rgb::new(220, 20, 60)),
    ("salmon", Rgb::new(250, 128, 114)),
    ("tomato", Rgb::new(255, 99, 71)),
    ("coral", Rgb::new(255, 127, 80)),
    ("khaki", Rgb::new(240, 230, 140)),
    ("beige", Rgb::new(245, 245, 220)),
    ("ivory", Rgb::new(255, 255, 240)),
    ("lightyellow", Rgb::new(255, 255, 224)),
    ("lavender", Rgb::new(230, 230, 250)),
    ("orchid", Rgb::new(218, 112, 214)),
    ("tan", Rgb::new(210, 180, 140)),
    ("wheat", Rgb::new(245, 222, 179)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_hex() {
        assert_eq!(
            parse("red"),
            Some(Color::Known {
                name: Some("red".to_string()),
                rgb: Rgb::new(255, 0, 0)
            })
        );
        assert_eq!(parse("/x11/Navy").and_then(|c| c.rgb()), Some(Rgb::new(0, 0, 128)));
        // Hex colors that match a palette entry keep its name.
        assert_eq!(parse("#000000").unwrap().name(), Some("black"));
        assert_eq!(parse("#123456").unwrap().name(), None);
        assert_eq!(parse("#fffffe00"), Some(Color::None));
        assert_eq!(parse("#12345"), None);
    }

    #[test]
    fn test_hsv() {
        assert_eq!(parse("0.000 1.000 1.000").and_then(|c| c.rgb()), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse("0.5,0,1").and_then(|c| c.rgb()), Some(Rgb::WHITE));
    }

    #[test]
    fn test_unresolved_degrades_to_black() {
        let mut diagnostics = Diagnostics::new();

        assert_eq!(resolve("blurple", &mut diagnostics), Color::black());
        assert_eq!(diagnostics.count_kind("UnresolvedColor"), 1);
    }

    #[test]
    fn test_gradient_uses_first_stop() {
        let mut diagnostics = Diagnostics::new();
        let color = resolve("[0 0 0 100 0 0 2 0 3 -red 1 4 -blue]", &mut diagnostics);

        assert_eq!(color.name(), Some("red"));
        assert_eq!(diagnostics.count_kind("UnsupportedPrimitive"), 1);
    }
}
