//! Icon registry: named vendor icons and their style variants.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Visual style variant of a registry icon.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum IconStyle {
    #[default]
    Color,
    Text,
    Outlined,
    Glyph,
}

impl IconStyle {
    pub const ALL: [IconStyle; 4] = [
        IconStyle::Color,
        IconStyle::Text,
        IconStyle::Outlined,
        IconStyle::Glyph,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IconStyle::Color => "Color",
            IconStyle::Text => "Text",
            IconStyle::Outlined => "Outlined",
            IconStyle::Glyph => "Glyph",
        }
    }
}

impl fmt::Display for IconStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IconStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IconStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown icon style '{s}'. Valid: Color, Text, Outlined, Glyph")
            })
    }
}

/// An icon chosen from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRender {
    pub name: String,
    /// `None` means the entry's unstyled default rendering.
    pub style: Option<IconStyle>,
}

/// Case-sensitive mapping from icon names to their available styles.
#[derive(Debug, Clone, Default)]
pub struct IconRegistry {
    entries: HashMap<String, BTreeSet<IconStyle>>,
}

/// Common vendor icons and the variants they ship.
const BUILTIN_ICONS: &[(&str, &[IconStyle])] = &[
    ("OpenAI", &[IconStyle::Text]),
    ("Anthropic", &[IconStyle::Text]),
    ("Claude", &[IconStyle::Color, IconStyle::Text]),
    ("DeepSeek", &[IconStyle::Color, IconStyle::Text]),
    ("Gemini", &[IconStyle::Color, IconStyle::Text]),
    ("Google", &[IconStyle::Color, IconStyle::Text]),
    ("Groq", &[IconStyle::Text]),
    ("Mistral", &[IconStyle::Color, IconStyle::Text]),
    ("Moonshot", &[IconStyle::Text]),
    ("Ollama", &[IconStyle::Text]),
    ("Qwen", &[IconStyle::Color, IconStyle::Text]),
    ("Zhipu", &[IconStyle::Color, IconStyle::Text]),
    ("Doubao", &[IconStyle::Color, IconStyle::Text]),
    ("SiliconCloud", &[IconStyle::Color, IconStyle::Text]),
    ("OpenRouter", &[IconStyle::Text]),
    ("Cohere", &[IconStyle::Color, IconStyle::Text]),
];

impl IconRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with common model vendors.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (name, styles) in BUILTIN_ICONS {
            registry.register(name, styles.iter().copied());
        }
        registry
    }

    /// Add or replace an entry.
    pub fn register(&mut self, name: &str, styles: impl IntoIterator<Item = IconStyle>) {
        self.entries
            .insert(name.to_string(), styles.into_iter().collect());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Look up `name` in the requested style.
    ///
    /// Returns `None` when the name is unknown. When the name is known but
    /// the style variant is not, the unstyled default rendering is returned.
    pub fn lookup(&self, name: &str, style: IconStyle) -> Option<IconRender> {
        let styles = self.entries.get(name)?;
        Some(IconRender {
            name: name.to_string(),
            style: styles.contains(&style).then_some(style),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
