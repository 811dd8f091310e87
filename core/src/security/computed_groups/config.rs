//! Computed groups configuration.

use serde::Deserialize;

/// Configuration for directory-backed computed groups.
///
/// Every field has a default, so a partial settings document is enough:
///
/// ```
/// use computed_groups_core::security::computed_groups::ComputedGroupsConfig;
///
/// let config = ComputedGroupsConfig::new()
///     .group_directory("shibbGroup")
///     .expression_field("expression");
///
/// assert_eq!(config.get_group_directory(), "shibbGroup");
/// assert_eq!(config.get_group_name_field(), "groupName");
/// assert_eq!(config.get_current_user_binding(), "currentUser");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComputedGroupsConfig {
    /// Directory holding user profiles.
    user_directory: String,
    /// Directory holding computed group definitions.
    group_directory: String,
    /// Field of a group entry holding the group name.
    group_name_field: String,
    /// Field of a group entry holding the membership expression.
    expression_field: String,
    /// Variable name the user record is bound to in expressions.
    current_user_binding: String,
}

impl Default for ComputedGroupsConfig {
    fn default() -> Self {
        Self {
            user_directory: "userDirectory".to_string(),
            group_directory: "computedGroup".to_string(),
            group_name_field: "groupName".to_string(),
            expression_field: "expressionLanguage".to_string(),
            current_user_binding: "currentUser".to_string(),
        }
    }
}

impl ComputedGroupsConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user directory name.
    pub fn user_directory(mut self, name: impl Into<String>) -> Self {
        self.user_directory = name.into();
        self
    }

    /// Sets the group directory name.
    pub fn group_directory(mut self, name: impl Into<String>) -> Self {
        self.group_directory = name.into();
        self
    }

    /// Sets the field holding the group name.
    pub fn group_name_field(mut self, field: impl Into<String>) -> Self {
        self.group_name_field = field.into();
        self
    }

    /// Sets the field holding the membership expression.
    pub fn expression_field(mut self, field: impl Into<String>) -> Self {
        self.expression_field = field.into();
        self
    }

    /// Sets the variable the user record is bound to.
    pub fn current_user_binding(mut self, name: impl Into<String>) -> Self {
        self.current_user_binding = name.into();
        self
    }

    pub fn get_user_directory(&self) -> &str {
        &self.user_directory
    }

    pub fn get_group_directory(&self) -> &str {
        &self.group_directory
    }

    pub fn get_group_name_field(&self) -> &str {
        &self.group_name_field
    }

    pub fn get_expression_field(&self) -> &str {
        &self.expression_field
    }

    pub fn get_current_user_binding(&self) -> &str {
        &self.current_user_binding
    }
}
