//! Diagnostic severity classes and the theme color keys they own.

/// Fully transparent color used to suppress a decoration.
pub const TRANSPARENT_COLOR: &str = "#00000000";

/// Diagnostic class whose squiggles can be hidden.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    pub fn name(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }

    /// Theme color key for one rendering attribute, e.g. `editorError.border`.
    pub fn key(self, attribute: Attribute) -> String {
        format!("editor{}.{}", self.name(), attribute.name())
    }

    /// All three attribute keys owned by this class.
    pub fn keys(self) -> impl Iterator<Item = String> {
        Attribute::ALL.into_iter().map(move |attribute| self.key(attribute))
    }
}

/// Rendering attribute of a squiggle decoration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Attribute {
    Border,
    Background,
    Foreground,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Border, Attribute::Background, Attribute::Foreground];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Border => "border",
            Attribute::Background => "background",
            Attribute::Foreground => "foreground",
        }
    }
}

/// True when `value` is the transparent sentinel, ignoring ASCII case.
pub fn is_transparent(value: &str) -> bool {
    value.eq_ignore_ascii_case(TRANSPARENT_COLOR)
}
