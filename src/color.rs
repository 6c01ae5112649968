//! Human-readable names for raw color tokens on variant values.
//!
//! Curated palettes cover the colors merchandising actually sells per
//! variant-group family; anything else falls back to a perceptual
//! hue/saturation/lightness namer. Total: every input maps to some label.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorBucket {
    Base,
    Strap,
    Accessory,
    Trim,
}

const BASE_PALETTE: &[(&str, &str)] = &[
    ("#000000", "Black"),
    ("#FFFFFF", "White"),
    ("#808080", "Gray"),
    ("#C0C0C0", "Silver"),
    ("#36454F", "Charcoal"),
    ("#F5F5DC", "Beige"),
    ("#FFFDD0", "Cream"),
    ("#000080", "Navy"),
    ("#4169E1", "Blue"),
    ("#87CEEB", "Sky blue"),
    ("#008080", "Teal"),
    ("#228B22", "Green"),
    ("#006400", "Forest green"),
    ("#808000", "Olive"),
    ("#FFFF00", "Yellow"),
    ("#FFD700", "Gold"),
    ("#FFA500", "Orange"),
    ("#FF0000", "Red"),
    ("#800000", "Maroon"),
    ("#FFC0CB", "Pink"),
    ("#FF00FF", "Magenta"),
    ("#800080", "Purple"),
    ("#E6E6FA", "Lavender"),
    ("#A52A2A", "Brown"),
    ("#D2B48C", "Tan"),
];

const STRAP_PALETTE: &[(&str, &str)] = &[
    ("#000000", "Black"),
    ("#FFFFFF", "White"),
    ("#8B4513", "Saddle brown"),
    ("#A52A2A", "Brown"),
    ("#000080", "Navy"),
    ("#808080", "Gray"),
    ("#D2B48C", "Tan"),
    ("#FF0000", "Red"),
];

const ACCESSORY_PALETTE: &[(&str, &str)] = &[
    ("#000000", "Black"),
    ("#FFFFFF", "White"),
    ("#FFD700", "Gold"),
    ("#C0C0C0", "Silver"),
    ("#B87333", "Copper"),
    ("#808080", "Gray"),
];

const TRIM_PALETTE: &[(&str, &str)] = &[
    ("#000000", "Black"),
    ("#FFFFFF", "White"),
    ("#FFD700", "Gold"),
    ("#C0C0C0", "Silver"),
    ("#FF0000", "Red"),
    ("#000080", "Navy"),
];

/// Map a raw color token (hex or `rgb(r,g,b)`) to a display label for the
/// given variant group. Non-color groups and unparseable values pass
/// through; this never fails.
pub fn name_color(group_label: &str, raw_value: &str) -> String {
    let trimmed = raw_value.trim();
    let parsed = normalize_hex(trimmed).or_else(|| parse_rgb_call(trimmed));

    match parsed {
        Some(hex) => {
            if let Some(bucket) = classify_group(group_label) {
                if let Some(name) = curated_name(bucket, &hex) {
                    return name.to_string();
                }
            }
            let (r, g, b) = hex_channels(&hex);
            descriptive_name(r, g, b)
        }
        None => {
            if classify_group(group_label).is_some() {
                trimmed.to_string()
            } else {
                raw_value.to_string()
            }
        }
    }
}

fn classify_group(label: &str) -> Option<ColorBucket> {
    let label = label.to_lowercase();
    if label.contains("strap color") {
        Some(ColorBucket::Strap)
    } else if label.contains("accessories color") {
        Some(ColorBucket::Accessory)
    } else if label.contains("trim color") {
        Some(ColorBucket::Trim)
    } else if label.contains("color") {
        Some(ColorBucket::Base)
    } else {
        None
    }
}

fn curated_name(bucket: ColorBucket, hex: &str) -> Option<&'static str> {
    let palette = match bucket {
        ColorBucket::Base => BASE_PALETTE,
        ColorBucket::Strap => STRAP_PALETTE,
        ColorBucket::Accessory => ACCESSORY_PALETTE,
        ColorBucket::Trim => TRIM_PALETTE,
    };
    palette
        .iter()
        .find(|(candidate, _)| *candidate == hex)
        .map(|(_, name)| *name)
}

/// Normalize a 3- or 6-digit hex string (with or without `#`) to
/// `#RRGGBB` uppercase.
fn normalize_hex(raw: &str) -> Option<String> {
    let digits = raw.strip_prefix('#').unwrap_or(raw);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        3 => {
            let expanded: String = digits
                .chars()
                .flat_map(|c| [c, c])
                .collect::<String>()
                .to_uppercase();
            Some(format!("#{expanded}"))
        }
        6 => Some(format!("#{}", digits.to_uppercase())),
        _ => None,
    }
}

fn parse_rgb_call(raw: &str) -> Option<String> {
    let inner = raw
        .trim()
        .to_lowercase()
        .strip_prefix("rgb(")?
        .strip_suffix(')')?
        .to_string();
    let mut channels = inner.split(',').map(|part| part.trim().parse::<u8>());
    let r = channels.next()?.ok()?;
    let g = channels.next()?.ok()?;
    let b = channels.next()?.ok()?;
    if channels.next().is_some() {
        return None;
    }
    Some(format!("#{r:02X}{g:02X}{b:02X}"))
}

fn hex_channels(hex: &str) -> (u8, u8, u8) {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let channel = |range| u8::from_str_radix(&digits[range], 16).unwrap_or(0);
    (channel(0..2), channel(2..4), channel(4..6))
}

fn descriptive_name(r: u8, g: u8, b: u8) -> String {
    let (h, s, l) = rgb_to_hsl(r, g, b);
    if s < 0.1 {
        return achromatic_name(l).to_string();
    }
    let hue = hue_name(h);
    let prefix = if l < 0.30 {
        Some("dark")
    } else if l > 0.78 {
        Some("light")
    } else if s >= 0.90 {
        Some("vivid")
    } else {
        None
    };
    match prefix {
        Some(prefix) => format!("{prefix} {hue}"),
        None => hue.to_string(),
    }
}

fn achromatic_name(l: f64) -> &'static str {
    if l < 0.08 {
        "black"
    } else if l < 0.20 {
        "very dark gray"
    } else if l < 0.35 {
        "dark gray"
    } else if l < 0.65 {
        "gray"
    } else if l < 0.90 {
        "light gray"
    } else {
        "white"
    }
}

// Red wraps across 0/360.
fn hue_name(h: f64) -> &'static str {
    if !(20.0..345.0).contains(&h) {
        "red"
    } else if h < 45.0 {
        "orange"
    } else if h < 70.0 {
        "yellow"
    } else if h < 100.0 {
        "lime"
    } else if h < 150.0 {
        "green"
    } else if h < 200.0 {
        "cyan"
    } else if h < 260.0 {
        "blue"
    } else if h < 290.0 {
        "purple"
    } else {
        "magenta"
    }
}

fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    if delta == 0.0 {
        return (0.0, 0.0, l);
    }

    let s = delta / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    (h, s, l)
}
