//! # Preferences
//!
//! User-tunable defaults, kept as TOML in the platform preferences directory. Missing or malformed files fall back
//! to defaults rather than failing.

use crate::{
    color::Rgba,
    state::{
        background::{Background, Ruling},
        layout::VIEW_CONTINUOUS_SKIP,
        page::PageTemplate,
    },
    util::GeometryError,
};

const DOCUMENTATION: &str = r#"# inkjournal preferences. You may edit this file, but be aware that formatting and comments will not
# be preserved.

# Lengths are in points (1/72 inch). Colors are 0xRRGGBBAA integers.
# [page]       Shape of new documents and of pages added to them.
# [view]       Page arrangement and background rendering.

"#;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(Clone, PartialEq, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub page: PagePreferences,
    pub view: ViewPreferences,
}

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PagePreferences {
    pub width: f64,
    pub height: f64,
    pub paper_color: Rgba,
    pub ruling: Ruling,
}
impl PagePreferences {
    /// Template for pages of a new document.
    pub fn template(&self) -> Result<PageTemplate, GeometryError> {
        PageTemplate::new(
            self.width,
            self.height,
            Background::solid(self.paper_color, self.ruling),
        )
    }
}
impl Default for PagePreferences {
    fn default() -> Self {
        // US Letter.
        Self {
            width: 612.0,
            height: 792.0,
            paper_color: Rgba::WHITE,
            ruling: Ruling::Lined,
        }
    }
}

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewPreferences {
    /// Show every page stacked, rather than one at a time.
    pub continuous: bool,
    pub page_gap: f64,
    /// Only re-render backgrounds of visible pages.
    pub progressive_backgrounds: bool,
    /// Cap on background render resolution, in dots per inch.
    pub max_render_dpi: f64,
}
impl Default for ViewPreferences {
    fn default() -> Self {
        Self {
            continuous: true,
            page_gap: VIEW_CONTINUOUS_SKIP,
            progressive_backgrounds: true,
            max_render_dpi: 720.0,
        }
    }
}

impl Preferences {
    const FILENAME: &'static str = "preferences.toml";
    /// Load from the user's preferences directory, or defaults if unavailable.
    #[must_use]
    pub fn load() -> Self {
        match preferences_dir() {
            Some(mut path) => {
                path.push(Self::FILENAME);
                Self::load_or_default(&path)
            }
            None => {
                log::warn!("No preferences directory, defaulting.");
                Self::default()
            }
        }
    }
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        let preferences: anyhow::Result<Self> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let preferences: Self = toml::from_str(&string)?;
            Ok(preferences)
        };
        match preferences {
            Ok(preferences) => preferences,
            Err(err) => {
                log::warn!("Preferences at {} weren't available, defaulting: {err}", path.display());
                Self::default()
            }
        }
    }
    /// Save to the user's preferences directory.
    pub fn save(&self) -> anyhow::Result<()> {
        let mut path =
            preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Not recursive. Errors surface from the write below.
        let _ = std::fs::DirBuilder::new().create(&path);
        path.push(Self::FILENAME);
        self.save_to(&path)
    }
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(self)?;
        std::fs::write(path, string)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("{}-{}-{name}", env!("CARGO_PKG_NAME"), std::process::id()));
        path
    }

    #[test]
    fn partial_file_fills_defaults() {
        let preferences: Preferences = toml::from_str("[page]\nwidth = 595.0\n").unwrap();
        assert_eq!(preferences.page.width, 595.0);
        assert_eq!(preferences.page.height, 792.0);
        assert_eq!(preferences.view, ViewPreferences::default());
    }
    #[test]
    fn missing_or_malformed_defaults() {
        let path = scratch("malformed.toml");
        assert_eq!(Preferences::load_or_default(&path), Preferences::default());
        std::fs::write(&path, "page = 4").unwrap();
        assert_eq!(Preferences::load_or_default(&path), Preferences::default());
        std::fs::remove_file(&path).unwrap();
    }
    #[test]
    fn saved_file_loads_back() {
        let path = scratch("saved.toml");
        let mut preferences = Preferences::default();
        preferences.view.continuous = false;
        preferences.page.ruling = Ruling::Graph;
        preferences.save_to(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# inkjournal preferences"));
        assert_eq!(Preferences::load_or_default(&path), preferences);
        std::fs::remove_file(&path).unwrap();
    }
    #[test]
    fn template_from_preferences() {
        let template = PagePreferences::default().template().unwrap();
        assert_eq!([template.width, template.height], [612.0, 792.0]);
        assert_eq!(template.background.color(), Some(Rgba::WHITE));
        assert_eq!(template.background.ruling, Ruling::Lined);
        let bad = PagePreferences {
            width: -1.0,
            ..PagePreferences::default()
        };
        assert!(bad.template().is_err());
    }
}
