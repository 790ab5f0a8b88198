//! Validated identifier types shared across the Zenpic crates.

/// Errors that can occur when validating a path component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// The input was empty or contained only whitespace
    #[error("identifier cannot be empty")]
    Empty,

    /// The input contained `/` or `\`
    #[error("identifier contains a path separator: {0:?}")]
    Separator(String),

    /// The input was `.` or `..`
    #[error("identifier is a relative directory reference: {0:?}")]
    RelativeReference(String),

    /// The input contained a NUL byte
    #[error("identifier contains a NUL byte")]
    Nul,
}

/// A single, validated path component supplied by a client.
///
/// A `PathComponent` names exactly one directory entry: it is never empty, never `.` or `..`,
/// and contains no path separators. The input is **not** trimmed: collection names must
/// match directory names byte-for-byte (`"Sunny Day"` and `"Sunny Day "` are different
/// collections).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathComponent(String);

impl PathComponent {
    /// Validates `input` as a single path component.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentifierError`] describing the first rule the input breaks.
    pub fn new(input: impl AsRef<str>) -> Result<Self, IdentifierError> {
        let input = input.as_ref();

        if input.trim().is_empty() {
            return Err(IdentifierError::Empty);
        }
        if input.contains('\0') {
            return Err(IdentifierError::Nul);
        }
        if input.contains(['/', '\\']) {
            return Err(IdentifierError::Separator(input.to_owned()));
        }
        if input == "." || input == ".." {
            return Err(IdentifierError::RelativeReference(input.to_owned()));
        }

        Ok(Self(input.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PathComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PathComponent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for PathComponent {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl std::str::FromStr for PathComponent {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for PathComponent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PathComponent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PathComponent::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_names_with_spaces_and_dots() {
        assert_eq!(PathComponent::new("Sunny Day").unwrap().as_str(), "Sunny Day");
        assert_eq!(PathComponent::new("photo.v2.jpg").unwrap().as_str(), "photo.v2.jpg");
        assert_eq!(PathComponent::new("...").unwrap().as_str(), "...");
    }

    #[test]
    fn keeps_surrounding_whitespace() {
        assert_eq!(PathComponent::new(" a ").unwrap().as_str(), " a ");
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert_eq!(PathComponent::new(""), Err(IdentifierError::Empty));
        assert_eq!(PathComponent::new("   "), Err(IdentifierError::Empty));
    }

    #[test]
    fn rejects_separators() {
        assert!(matches!(
            PathComponent::new("../etc"),
            Err(IdentifierError::Separator(_))
        ));
        assert!(matches!(
            PathComponent::new("a\\b"),
            Err(IdentifierError::Separator(_))
        ));
    }

    #[test]
    fn rejects_relative_references() {
        assert!(matches!(
            PathComponent::new(".."),
            Err(IdentifierError::RelativeReference(_))
        ));
        assert!(matches!(
            PathComponent::new("."),
            Err(IdentifierError::RelativeReference(_))
        ));
    }

    #[test]
    fn rejects_nul() {
        assert_eq!(PathComponent::new("a\0b"), Err(IdentifierError::Nul));
    }

    #[test]
    fn deserialize_validates() {
        let ok: PathComponent = serde_json::from_str("\"Rainy Day\"").unwrap();
        assert_eq!(ok.as_str(), "Rainy Day");
        assert!(serde_json::from_str::<PathComponent>("\"../x\"").is_err());
    }
}
