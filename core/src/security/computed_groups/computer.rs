//! Group computers.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::config::ComputedGroupsConfig;
use super::error::ComputedGroupsError;
use super::helper::GroupExpressionHelper;
use super::GroupDefinition;
use crate::directory::{qualify, DirectoryService, Record, ScopedSession};
use crate::security::UserPrincipal;

/// Computes group memberships on the fly instead of storing them.
///
/// Implementations are stateless: every call reflects the backing data at
/// call time.
pub trait GroupComputer: Send + Sync {
    /// Returns the names of every group this computer can produce.
    fn get_all_group_ids(&self) -> Result<BTreeSet<String>, ComputedGroupsError>;

    /// Returns the names of the groups `user` belongs to.
    fn get_groups_for_user(
        &self,
        user: &UserPrincipal,
    ) -> Result<BTreeSet<String>, ComputedGroupsError>;

    /// Returns true if a group named `name` exists.
    fn has_group(&self, name: &str) -> Result<bool, ComputedGroupsError> {
        Ok(self.get_all_group_ids()?.contains(name))
    }

    /// Returns the sorted group names matching `pattern`.
    ///
    /// `*` matches any run of characters and `?` exactly one, ignoring
    /// case. A pattern without wildcards matches as a substring.
    fn search_groups(&self, pattern: &str) -> Result<Vec<String>, ComputedGroupsError> {
        let matcher = glob_matcher(pattern)
            .map_err(|_| ComputedGroupsError::InvalidName(pattern.to_string()))?;
        Ok(self
            .get_all_group_ids()?
            .into_iter()
            .filter(|name| matcher.is_match(name))
            .collect())
    }
}

/// Computes groups from expression-based definitions stored in a directory.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use computed_groups_core::directory::{InMemoryDirectoryService, Record};
/// use computed_groups_core::security::computed_groups::{
///     ComputedGroupsConfig, DirectoryGroupComputer, GroupComputer, GroupDefinitions,
/// };
/// use computed_groups_core::security::UserPrincipal;
///
/// let directories = Arc::new(
///     InMemoryDirectoryService::new().with_directory("computedGroup", "group", "groupName"),
/// );
/// let config = ComputedGroupsConfig::default();
///
/// GroupDefinitions::new(directories.clone(), config.clone())
///     .create_group("acme", "currentUser.user.company == 'acme'")
///     .unwrap();
///
/// let mut profile = Record::new("jdoe");
/// profile.set_property("user", "company", "acme");
/// let principal = UserPrincipal::new("jdoe").with_model(profile);
///
/// let computer = DirectoryGroupComputer::new(directories, config);
/// assert!(computer.get_groups_for_user(&principal).unwrap().contains("acme"));
/// ```
#[derive(Clone)]
pub struct DirectoryGroupComputer {
    directories: Arc<dyn DirectoryService>,
    config: ComputedGroupsConfig,
    helper: GroupExpressionHelper,
}

impl DirectoryGroupComputer {
    /// Creates a computer reading definitions through `directories`.
    pub fn new(directories: Arc<dyn DirectoryService>, config: ComputedGroupsConfig) -> Self {
        let helper = GroupExpressionHelper::with_binding(config.get_current_user_binding());
        DirectoryGroupComputer {
            directories,
            config,
            helper,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ComputedGroupsConfig {
        &self.config
    }

    /// Loads every group definition, keyed by name.
    ///
    /// Entries sharing a name collapse to the last one read.
    pub fn load_definitions(
        &self,
    ) -> Result<BTreeMap<String, GroupDefinition>, ComputedGroupsError> {
        let session =
            ScopedSession::open(self.directories.as_ref(), self.config.get_group_directory())?;
        let schema = session.schema().to_string();

        let mut definitions = BTreeMap::new();
        for entry in session.get_entries()? {
            let definition = GroupDefinition::from_record(&entry, &schema, &self.config);
            definitions.insert(definition.name.clone(), definition);
        }
        session.release()?;

        Ok(definitions)
    }

    /// Returns the profile record of a user from the user directory.
    pub fn get_user_model(&self, username: &str) -> Result<Option<Record>, ComputedGroupsError> {
        let session =
            ScopedSession::open(self.directories.as_ref(), self.config.get_user_directory())?;
        let user = session.get_entry(username)?;
        session.release()?;
        Ok(user)
    }
}

impl GroupComputer for DirectoryGroupComputer {
    fn get_all_group_ids(&self) -> Result<BTreeSet<String>, ComputedGroupsError> {
        Ok(self.load_definitions()?.into_keys().collect())
    }

    fn get_groups_for_user(
        &self,
        user: &UserPrincipal,
    ) -> Result<BTreeSet<String>, ComputedGroupsError> {
        let model = match user.get_model() {
            Some(model) => model,
            None => {
                debug!(user = user.get_name(), "principal has no profile, no computed groups");
                return Ok(BTreeSet::new());
            }
        };

        let definitions = self.load_definitions()?;
        let groups: BTreeSet<String> = definitions
            .into_values()
            .filter(|definition| match definition.expression.as_deref() {
                Some(expr) if !expr.trim().is_empty() => self.helper.is_user_in_group(model, expr),
                _ => false,
            })
            .map(|definition| definition.name)
            .collect();

        debug!(user = user.get_name(), count = groups.len(), "computed groups resolved");
        Ok(groups)
    }
}

impl GroupDefinition {
    pub(crate) fn from_record(record: &Record, schema: &str, config: &ComputedGroupsConfig) -> Self {
        let name = record
            .get(&qualify(schema, config.get_group_name_field()))
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| record.id())
            .to_string();
        let expression = record
            .get(&qualify(schema, config.get_expression_field()))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        GroupDefinition { name, expression }
    }
}

/// Builds a case-insensitive matcher for a group search pattern.
fn glob_matcher(pattern: &str) -> Result<Regex, regex::Error> {
    let mut source = String::from("^");
    if !pattern.contains(|c: char| c == '*' || c == '?') {
        source.push_str(".*");
        source.push_str(&regex::escape(pattern));
        source.push_str(".*");
    } else {
        for c in pattern.chars() {
            match c {
                '*' => source.push_str(".*"),
                '?' => source.push('.'),
                other => source.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
    }
    source.push('$');

    RegexBuilder::new(&source).case_insensitive(true).build()
}
