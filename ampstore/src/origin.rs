//! Storage origin: scheme and host of the context's location

use std::fmt;

/// Errors that can occur deriving an origin
#[derive(Debug)]
pub enum OriginError {
    /// The location is not a valid absolute URL
    InvalidUrl(url::ParseError),
    /// The URL has an opaque origin (`data:`, `file:`, ...)
    Opaque(String),
}

impl fmt::Display for OriginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl(e) => write!(f, "Invalid location URL: {e}"),
            Self::Opaque(location) => write!(f, "Location '{location}' has no usable origin"),
        }
    }
}

impl std::error::Error for OriginError {}

/// Namespace of one store, e.g. `https://example.com`
///
/// Path, query and fragment never take part; a non-default port does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin(String);

impl Origin {
    /// Derive the origin from a location URL
    pub fn from_location(location: &str) -> Result<Self, OriginError> {
        let url = url::Url::parse(location).map_err(OriginError::InvalidUrl)?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(OriginError::Opaque(location.to_string()));
        }
        Ok(Self(origin.ascii_serialization()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_query_are_dropped() {
        let origin = Origin::from_location("https://example.com/a/b?c=d#e").unwrap();
        assert_eq!(origin.as_str(), "https://example.com");
    }

    #[test]
    fn test_port_is_kept_unless_default() {
        assert_eq!(
            Origin::from_location("http://example.com:8080/x").unwrap().as_str(),
            "http://example.com:8080"
        );
        assert_eq!(
            Origin::from_location("https://example.com:443/").unwrap().as_str(),
            "https://example.com"
        );
    }

    #[test]
    fn test_bad_locations() {
        assert!(matches!(
            Origin::from_location("not a url"),
            Err(OriginError::InvalidUrl(_))
        ));
        assert!(matches!(
            Origin::from_location("data:text/plain,hi"),
            Err(OriginError::Opaque(_))
        ));
    }
}
