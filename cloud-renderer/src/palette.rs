use cloudword_core::RenderError;
use image::Rgb;

/// Named color ramps, sampled at a position in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Cividis,
    Cool,
    Hot,
    Spring,
    Summer,
    Autumn,
    Winter,
    Rainbow,
    Blues,
    Greens,
    Reds,
    Greys,
}

const VIRIDIS: &[u32] = &[
    0x440154, 0x472d7b, 0x3b528b, 0x2c728e, 0x21918c, 0x28ae80, 0x5ec962, 0xaddc30, 0xfde725,
];
const PLASMA: &[u32] = &[
    0x0d0887, 0x4c02a1, 0x7e03a8, 0xa92395, 0xcc4778, 0xe56b5d, 0xf89540, 0xfdc328, 0xf0f921,
];
const INFERNO: &[u32] = &[
    0x000004, 0x1f0c48, 0x550f6d, 0x88226a, 0xba3655, 0xe35933, 0xf98e09, 0xf9cb35, 0xfcffa4,
];
const MAGMA: &[u32] = &[
    0x000004, 0x1c1044, 0x4f127b, 0x812581, 0xb5367a, 0xe55964, 0xfb8761, 0xfec287, 0xfcfdbf,
];
const CIVIDIS: &[u32] = &[
    0x00224e, 0x123570, 0x3b496c, 0x575d6d, 0x707173, 0x8a8779, 0xa69d75, 0xc4b56c, 0xfee838,
];
const COOL: &[u32] = &[0x00ffff, 0xff00ff];
const HOT: &[u32] = &[0x0b0000, 0xff0000, 0xffff00, 0xffffff];
const SPRING: &[u32] = &[0xff00ff, 0xffff00];
const SUMMER: &[u32] = &[0x008066, 0xffff66];
const AUTUMN: &[u32] = &[0xff0000, 0xffff00];
const WINTER: &[u32] = &[0x0000ff, 0x00ff80];
const RAINBOW: &[u32] = &[0x8000ff, 0x00b5eb, 0x80ffb4, 0xffb360, 0xff0000];
const BLUES: &[u32] = &[
    0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b,
];
const GREENS: &[u32] = &[
    0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c, 0x00441b,
];
const REDS: &[u32] = &[
    0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15, 0x67000d,
];
const GREYS: &[u32] = &[
    0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525, 0x000000,
];

impl Colormap {
    pub const ALL: [Colormap; 16] = [
        Colormap::Viridis,
        Colormap::Plasma,
        Colormap::Inferno,
        Colormap::Magma,
        Colormap::Cividis,
        Colormap::Cool,
        Colormap::Hot,
        Colormap::Spring,
        Colormap::Summer,
        Colormap::Autumn,
        Colormap::Winter,
        Colormap::Rainbow,
        Colormap::Blues,
        Colormap::Greens,
        Colormap::Reds,
        Colormap::Greys,
    ];

    /// Case-insensitive lookup by name (`viridis`, `Blues`, ...).
    pub fn from_name(name: &str) -> Result<Self, RenderError> {
        let wanted = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|colormap| colormap.name() == wanted)
            .ok_or_else(|| RenderError::UnknownColormap {
                name: name.to_string(),
            })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Viridis => "viridis",
            Colormap::Plasma => "plasma",
            Colormap::Inferno => "inferno",
            Colormap::Magma => "magma",
            Colormap::Cividis => "cividis",
            Colormap::Cool => "cool",
            Colormap::Hot => "hot",
            Colormap::Spring => "spring",
            Colormap::Summer => "summer",
            Colormap::Autumn => "autumn",
            Colormap::Winter => "winter",
            Colormap::Rainbow => "rainbow",
            Colormap::Blues => "blues",
            Colormap::Greens => "greens",
            Colormap::Reds => "reds",
            Colormap::Greys => "greys",
        }
    }

    fn stops(&self) -> &'static [u32] {
        match self {
            Colormap::Viridis => VIRIDIS,
            Colormap::Plasma => PLASMA,
            Colormap::Inferno => INFERNO,
            Colormap::Magma => MAGMA,
            Colormap::Cividis => CIVIDIS,
            Colormap::Cool => COOL,
            Colormap::Hot => HOT,
            Colormap::Spring => SPRING,
            Colormap::Summer => SUMMER,
            Colormap::Autumn => AUTUMN,
            Colormap::Winter => WINTER,
            Colormap::Rainbow => RAINBOW,
            Colormap::Blues => BLUES,
            Colormap::Greens => GREENS,
            Colormap::Reds => REDS,
            Colormap::Greys => GREYS,
        }
    }

    /// Linear interpolation between the ramp's evenly spaced stops.
    pub fn sample(&self, position: f32) -> Rgb<u8> {
        let stops = self.stops();
        let position = if position.is_finite() {
            position.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let scaled = position * (stops.len() - 1) as f32;
        let lower = (scaled.floor() as usize).min(stops.len() - 1);
        let upper = (lower + 1).min(stops.len() - 1);
        let fraction = scaled - lower as f32;

        let from = hex_to_rgb(stops[lower]);
        let to = hex_to_rgb(stops[upper]);
        Rgb(std::array::from_fn(|i| {
            let value = from[i] as f32 + (to[i] as f32 - from[i] as f32) * fraction;
            value.round().clamp(0.0, 255.0) as u8
        }))
    }
}

fn hex_to_rgb(hex: u32) -> [u8; 3] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

/// Background color from a name or a `#rgb` / `#rrggbb` literal.
pub fn parse_color(value: &str) -> Result<Rgb<u8>, RenderError> {
    let invalid = || RenderError::InvalidColor {
        value: value.to_string(),
    };
    let trimmed = value.trim().to_ascii_lowercase();

    if let Some(hex) = trimmed.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => hex.to_string(),
            _ => return Err(invalid()),
        };
        let packed = u32::from_str_radix(&expanded, 16).map_err(|_| invalid())?;
        return Ok(Rgb(hex_to_rgb(packed)));
    }

    let packed = match trimmed.as_str() {
        "white" => 0xffffff,
        "black" => 0x000000,
        "red" => 0xff0000,
        "green" => 0x008000,
        "blue" => 0x0000ff,
        "yellow" => 0xffff00,
        "orange" => 0xffa500,
        "purple" => 0x800080,
        "pink" => 0xffc0cb,
        "navy" => 0x000080,
        "gray" | "grey" => 0x808080,
        "lightgray" | "lightgrey" => 0xd3d3d3,
        "darkgray" | "darkgrey" => 0xa9a9a9,
        "beige" => 0xf5f5dc,
        "ivory" => 0xfffff0,
        _ => return Err(invalid()),
    };
    Ok(Rgb(hex_to_rgb(packed)))
}
