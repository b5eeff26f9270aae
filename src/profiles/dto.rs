use serde::Deserialize;

/// Partial profile update. An absent field keeps its stored value; a present
/// one overwrites it, including an explicit empty string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub show_email: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_are_distinct() {
        let patch: ProfilePatch = serde_json::from_str(r#"{"bio": ""}"#).unwrap();
        assert_eq!(patch.bio.as_deref(), Some(""));
        assert!(patch.title.is_none());
        assert!(patch.show_email.is_none());
    }
}
