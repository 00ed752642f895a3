use crate::domain::Version;

/// A git tag whose name parses as a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub version: Version,
}

impl Tag {
    /// Build a tag from its name, or `None` if the name is not a version
    pub fn from_name(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let version = Version::parse(&name).ok()?;
        Some(Tag { name, version })
    }
}

/// Keep the tags that parse as versions, sorted ascending by version.
///
/// Ties (e.g. `1.2.3` and `v1.2.3`) are broken by name so the result is stable.
pub fn sorted_version_tags<I, S>(names: I) -> Vec<Tag>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tags: Vec<Tag> = names.into_iter().filter_map(Tag::from_name).collect();
    tags.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.name.cmp(&b.name)));
    tags
}

/// The tag immediately before `current` in an ascending tag list
pub fn previous_tag<'a>(tags: &'a [Tag], current: &Tag) -> Option<&'a Tag> {
    tags.iter().rev().find(|t| t.version < current.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        let tag = Tag::from_name("v1.2.3").unwrap();
        assert_eq!(tag.version, Version::new(1, 2, 3));
        assert!(Tag::from_name("release-1").is_none());
    }

    #[test]
    fn test_sorted_version_tags_numeric_order() {
        let tags = sorted_version_tags(vec!["v1.10.0", "v1.9.0", "nightly", "v0.1.0", "v2.0.0"]);
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["v0.1.0", "v1.9.0", "v1.10.0", "v2.0.0"]);
    }

    #[test]
    fn test_previous_tag() {
        let tags = sorted_version_tags(vec!["v1.0.0", "v1.1.0", "v2.0.0"]);
        let last = tags.last().unwrap();
        assert_eq!(previous_tag(&tags, last).unwrap().name, "v1.1.0");
        assert!(previous_tag(&tags, &tags[0]).is_none());
    }
}
