use crate::error::{LogexportError, Result};
use crate::model::ColorToken;

/// Named colors usable for authors, with the CSS color each one renders as.
pub const CSS_COLORS: &[(&str, &str)] = &[
    ("white", "Beige"),
    ("black", "DarkSlateGrey"),
    ("blue", "DarkSlateBlue"),
    ("green", "ForestGreen"),
    ("lightred", "Tomato"),
    ("red", "Crimson"),
    ("magenta", "MediumVioletRed"),
    ("brown", "Chocolate"),
    ("yellow", "GoldenRod"),
    ("lightgreen", "LightGreen"),
    ("cyan", "LightSeaGreen"),
    ("lightcyan", "LightSkyBlue"),
    ("lightblue", "RoyalBlue"),
    ("lightmagenta", "HotPink"),
    ("darkgray", "DimGrey"),
    ("gray", "LightSlateGrey"),
];

/// WeeChat's default `weechat.color.chat_nick_colors`.
pub const DEFAULT_NICK_COLORS: &[&str] = &[
    "cyan",
    "magenta",
    "green",
    "brown",
    "lightblue",
    "default",
    "lightcyan",
    "lightmagenta",
    "lightgreen",
    "blue",
];

pub fn is_known_color(name: &str) -> bool {
    name == ColorToken::DEFAULT || CSS_COLORS.iter().any(|(known, _)| *known == name)
}

/// Display color of an author.
pub trait ColorLookup {
    fn color_of(&self, author: &str) -> ColorToken;
}

/// Picks a palette entry from a hash of the nick, like WeeChat does.
#[derive(Debug, Clone)]
pub struct NickHashColors {
    palette: Vec<ColorToken>,
}

impl NickHashColors {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut palette = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !is_known_color(name) {
                return Err(LogexportError::UnknownColor(name.to_string()));
            }
            palette.push(ColorToken::new(name));
        }
        Ok(Self { palette })
    }
}

impl Default for NickHashColors {
    fn default() -> Self {
        Self {
            palette: DEFAULT_NICK_COLORS.iter().copied().map(ColorToken::new).collect(),
        }
    }
}

impl ColorLookup for NickHashColors {
    fn color_of(&self, author: &str) -> ColorToken {
        if self.palette.is_empty() {
            return ColorToken::default_color();
        }
        let index = nick_hash(author) % self.palette.len() as u64;
        self.palette[index as usize].clone()
    }
}

fn nick_hash(nick: &str) -> u64 {
    nick.chars().fold(5381_u64, |hash, ch| {
        hash ^ (hash << 5).wrapping_add(hash >> 2).wrapping_add(u64::from(ch))
    })
}

#[cfg(test)]
mod tests {
    use crate::colors::{ColorLookup, NickHashColors, is_known_color};
    use crate::model::ColorToken;

    #[test]
    fn lookup_is_deterministic_and_in_palette() {
        let colors = NickHashColors::default();
        let first = colors.color_of("alice");
        assert_eq!(first, colors.color_of("alice"));
        assert!(is_known_color(first.as_str()));
    }

    #[test]
    fn single_color_palette_always_matches() {
        let colors = NickHashColors::new(["red"]).expect("palette");
        assert_eq!(colors.color_of("alice"), ColorToken::new("red"));
        assert_eq!(colors.color_of("bob"), ColorToken::new("red"));
    }

    #[test]
    fn unknown_palette_entry_is_rejected() {
        let err = NickHashColors::new(["cyan", "chartreuse"]).expect_err("must fail");
        assert!(format!("{err}").contains("unknown color: chartreuse"));
    }

    #[test]
    fn empty_palette_falls_back_to_default() {
        let colors = NickHashColors::new(Vec::<String>::new()).expect("palette");
        assert_eq!(colors.color_of("alice"), ColorToken::default_color());
    }
}
