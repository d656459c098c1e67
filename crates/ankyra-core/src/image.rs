//! Repository name composition for application images.
//!
//! ECR repository names are derived from the application image name: any
//! tag suffix is trimmed, an optional organisation prefix is prepended and
//! the result is lower-cased. Uniqueness is by this composed name within a
//! registry account and region.

use crate::error::{Error, Result};

/// Composes the ECR repository name for an application image.
///
/// The image name has any `:tag` suffix trimmed, is prefixed with the
/// organisation when one is given, and is lower-cased. An empty
/// organisation means no prefix.
///
/// # Errors
///
/// Returns [`Error::InvalidImageName`] if the image name is shorter than
/// three characters after tag trimming.
///
/// # Examples
///
/// ```
/// use ankyra_core::repository_name;
///
/// let name = repository_name("acme", "MyApp:1.2.3")?;
/// assert_eq!(name, "acme/myapp");
///
/// let name = repository_name("", "myapp")?;
/// assert_eq!(name, "myapp");
/// # Ok::<(), ankyra_core::Error>(())
/// ```
pub fn repository_name(organisation: &str, image: &str) -> Result<String> {
    let app = strip_tag(image);
    if app.len() <= 2 {
        return Err(Error::InvalidImageName {
            name: app.to_string(),
        });
    }
    let composed = if organisation.is_empty() {
        app.to_string()
    } else {
        format!("{organisation}/{app}")
    };
    Ok(composed.to_lowercase())
}

/// Trims any tag or version suffix from an image name.
///
/// A colon in the first position is kept as-is.
fn strip_tag(image: &str) -> &str {
    match image.find(':') {
        Some(idx) if idx > 0 => &image[..idx],
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_name_plain() {
        assert_eq!(repository_name("", "myapp").unwrap(), "myapp");
    }

    #[test]
    fn test_repository_name_with_organisation() {
        assert_eq!(repository_name("acme", "myapp").unwrap(), "acme/myapp");
    }

    #[test]
    fn test_repository_name_strips_tag() {
        assert_eq!(repository_name("", "myapp:0.0.0-pr1").unwrap(), "myapp");
    }

    #[test]
    fn test_repository_name_lowercases() {
        assert_eq!(repository_name("Acme", "MyApp").unwrap(), "acme/myapp");
    }

    #[test]
    fn test_repository_name_rejects_short_names() {
        assert!(matches!(
            repository_name("", "ab"),
            Err(Error::InvalidImageName { .. })
        ));
    }

    #[test]
    fn test_repository_name_rejects_short_name_after_trim() {
        // The length check applies to the trimmed name, not the raw input.
        assert!(matches!(
            repository_name("", "ab:1.0.0"),
            Err(Error::InvalidImageName { .. })
        ));
    }

    #[test]
    fn test_strip_tag_keeps_leading_colon() {
        assert_eq!(strip_tag(":odd"), ":odd");
    }

    #[test]
    fn test_strip_tag_first_colon_wins() {
        assert_eq!(strip_tag("myapp:v1:v2"), "myapp");
    }
}
