//! Provider logo resolution.
//!
//! A provider's `logo` is either an icon registry name (`"DeepSeek"`) or an
//! image URL. Resolution follows a fixed fallback order:
//!
//! 1. registry icon in the requested style
//! 2. the same icon's unstyled default
//! 3. candidate images: the logo URL itself, then favicons derived from the
//!    provider's base URL
//! 4. the static [`DEFAULT_LOGO`]
//!
//! [`resolve_candidates`] is pure. [`LogoResolver`] adds the cursor the
//! rendering side advances every time an image fails to load.
//!
//! # Example
//!
//! ```
//! use relay_models::identity::{resolve_candidates, LogoResolver, DEFAULT_LOGO};
//!
//! let candidates = resolve_candidates("", Some("https://api.acme.ai/v1"));
//! assert_eq!(candidates[0], "https://api.acme.ai/favicon.ico");
//!
//! let mut resolver = LogoResolver::new("", Some("https://api.acme.ai/v1"));
//! while !resolver.is_exhausted() {
//!     resolver.on_load_error();
//! }
//! assert_eq!(resolver.current_image(), DEFAULT_LOGO);
//! ```

mod registry;

use std::collections::HashSet;

use url::Url;

pub use registry::{IconRegistry, IconRender, IconStyle};

/// Static image shown when nothing else resolves.
pub const DEFAULT_LOGO: &str = "assets/custom-ai.png";

/// Logo value meaning "no specific icon".
const GENERIC_LOGO: &str = "custom";

/// What the rendering side should draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    /// Registry icon; `style: None` is the unstyled default.
    Icon(IconRender),
    /// Candidate image URL.
    Image(String),
    /// [`DEFAULT_LOGO`].
    Fallback,
}

impl LogoSource {
    /// Image source to load, if this is not a registry icon.
    pub fn image_src(&self) -> Option<&str> {
        match self {
            LogoSource::Icon(_) => None,
            LogoSource::Image(src) => Some(src),
            LogoSource::Fallback => Some(DEFAULT_LOGO),
        }
    }
}

fn is_image_url(name: &str) -> bool {
    name.starts_with("http://") || name.starts_with("https://") || name.starts_with("data:")
}

/// Ordered, de-duplicated image candidates for a logo.
///
/// `name` comes first when it is itself an image URL or data URI. When
/// `base_url` parses, favicons at its origin follow, then favicons at its
/// root domain (last two host labels). An unparsable `base_url` contributes
/// nothing.
pub fn resolve_candidates(name: &str, base_url: Option<&str>) -> Vec<String> {
    let name = name.trim();
    let mut candidates = Vec::new();

    if is_image_url(name) {
        candidates.push(name.to_string());
    }
    if let Some(base_url) = base_url {
        candidates.extend(favicon_candidates(base_url.trim()));
    }

    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.clone()));
    candidates
}

fn favicon_candidates(base_url: &str) -> Vec<String> {
    let Ok(url) = Url::parse(base_url) else {
        return Vec::new();
    };
    let origin = url.origin();
    if !origin.is_tuple() {
        return Vec::new();
    }

    let origin = origin.ascii_serialization();
    let mut favicons = vec![
        format!("{origin}/favicon.ico"),
        format!("{origin}/favicon.png"),
    ];

    if let Some(host) = url.host_str() {
        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() >= 2 {
            let root = labels[labels.len() - 2..].join(".");
            favicons.push(format!("{}://{root}/favicon.ico", url.scheme()));
            favicons.push(format!("{}://{root}/favicon.png", url.scheme()));
        }
    }
    favicons
}

/// Stateful logo resolution with sequential image fallback.
#[derive(Debug, Clone)]
pub struct LogoResolver {
    name: String,
    base_url: Option<String>,
    candidates: Vec<String>,
    cursor: usize,
}

impl LogoResolver {
    pub fn new(name: &str, base_url: Option<&str>) -> Self {
        Self {
            name: name.trim().to_string(),
            base_url: base_url.map(str::to_string),
            candidates: resolve_candidates(name, base_url),
            cursor: 0,
        }
    }

    /// Resolver for a provider's `logo` and `base_url`.
    pub fn for_provider(provider: &crate::Provider) -> Self {
        Self::new(
            provider.logo.as_deref().unwrap_or_default(),
            Some(&provider.base_url),
        )
    }

    /// Replace the inputs and start over from the first candidate.
    pub fn reset(&mut self, name: &str, base_url: Option<&str>) {
        *self = Self::new(name, base_url);
    }

    /// Replace the inputs only if they changed; returns whether a reset happened.
    pub fn update(&mut self, name: &str, base_url: Option<&str>) -> bool {
        if self.name == name.trim() && self.base_url.as_deref() == base_url {
            return false;
        }
        self.reset(name, base_url);
        true
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// All candidates have failed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    /// Image to load now: the candidate under the cursor, or [`DEFAULT_LOGO`].
    pub fn current_image(&self) -> &str {
        self.candidates
            .get(self.cursor)
            .map(String::as_str)
            .unwrap_or(DEFAULT_LOGO)
    }

    /// Record that the current image failed to load and move to the next one.
    ///
    /// Once every candidate has failed this keeps returning [`DEFAULT_LOGO`].
    pub fn on_load_error(&mut self) -> &str {
        if self.cursor < self.candidates.len() {
            self.cursor += 1;
        }
        self.current_image()
    }

    /// Decide what to draw, consulting `registry` for named icons.
    pub fn resolve(&self, registry: &IconRegistry, style: IconStyle) -> LogoSource {
        let name = self.name.as_str();
        if name.is_empty() || name == GENERIC_LOGO || is_image_url(name) {
            return self.image_source();
        }

        match registry.lookup(name, style) {
            Some(icon) => LogoSource::Icon(icon),
            None if !self.candidates.is_empty() => self.image_source(),
            None => LogoSource::Fallback,
        }
    }

    fn image_source(&self) -> LogoSource {
        match self.candidates.get(self.cursor) {
            Some(src) => LogoSource::Image(src.clone()),
            None => LogoSource::Fallback,
        }
    }
}
