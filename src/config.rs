use palette::Srgb;

/// Number of days used for the calculation of the average incidence.
pub const DAYS: usize = 7;

pub const NEUTRAL: Srgb<u8> = Srgb::new(0xc0, 0xc0, 0xc0);
pub const RISING: Srgb<u8> = Srgb::new(0xc0, 0x00, 0x00);
pub const FALLING: Srgb<u8> = Srgb::new(0x00, 0xc0, 0x00);

/// The color a map region starts with and the two colors it can be switched to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendColors {
    pub neutral: Srgb<u8>,
    pub rising: Srgb<u8>,
    pub falling: Srgb<u8>,
}

impl Default for TrendColors {
    fn default() -> Self {
        TrendColors {
            neutral: NEUTRAL,
            rising: RISING,
            falling: FALLING,
        }
    }
}

/// Formats a color the way it appears in an SVG style attribute, e.g. `#c0c0c0`.
pub fn color_token(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Accepts `#rrggbb`, `rrggbb` and the three digit short forms.
pub fn parse_color(s: &str) -> Result<Srgb<u8>, String> {
    s.parse::<Srgb<u8>>()
        .map_err(|e| format!("invalid color {:?}: {:?}", s, e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending canonical country code.
    #[default]
    Catalog,
    /// Strongest rise first.
    ChangeDescending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub days: usize,
    pub colors: TrendColors,
    pub sort: SortOrder,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            days: DAYS,
            colors: TrendColors::default(),
            sort: SortOrder::Catalog,
        }
    }
}
