//! Management of computed group definitions.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use super::config::ComputedGroupsConfig;
use super::error::ComputedGroupsError;
use super::helper::GroupExpressionHelper;
use super::GroupDefinition;
use crate::directory::{qualify, DirectoryService, Record, ScopedSession, Value};

/// Creates, updates and deletes computed group definitions.
///
/// Expressions are validated before they are stored. An empty expression is
/// accepted: the group exists but nobody belongs to it.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use computed_groups_core::directory::InMemoryDirectoryService;
/// use computed_groups_core::security::computed_groups::{ComputedGroupsConfig, GroupDefinitions};
///
/// let directories = Arc::new(
///     InMemoryDirectoryService::new().with_directory("computedGroup", "group", "groupName"),
/// );
/// let groups = GroupDefinitions::new(directories, ComputedGroupsConfig::default());
///
/// groups.create_group("staff", "currentUser.user.company == 'acme'").unwrap();
/// assert!(groups.create_group("broken", "fdsfds ! fdsf^6").is_err());
/// assert_eq!(groups.list_groups().unwrap().len(), 1);
/// ```
#[derive(Clone)]
pub struct GroupDefinitions {
    directories: Arc<dyn DirectoryService>,
    config: ComputedGroupsConfig,
    helper: GroupExpressionHelper,
}

impl GroupDefinitions {
    /// Creates a manager writing through `directories`.
    pub fn new(directories: Arc<dyn DirectoryService>, config: ComputedGroupsConfig) -> Self {
        let helper = GroupExpressionHelper::with_binding(config.get_current_user_binding());
        GroupDefinitions {
            directories,
            config,
            helper,
        }
    }

    fn session(&self) -> Result<ScopedSession, ComputedGroupsError> {
        Ok(ScopedSession::open(
            self.directories.as_ref(),
            self.config.get_group_directory(),
        )?)
    }

    fn validate(&self, name: &str, expression: &str) -> Result<(), ComputedGroupsError> {
        if name.trim().is_empty() {
            return Err(ComputedGroupsError::InvalidName(name.to_string()));
        }
        if !expression.trim().is_empty() && !self.helper.is_valid_el(Some(expression)) {
            return Err(ComputedGroupsError::InvalidExpression {
                name: name.to_string(),
                expression: expression.to_string(),
            });
        }
        Ok(())
    }

    fn find_record(
        &self,
        session: &ScopedSession,
        name: &str,
    ) -> Result<Option<Record>, ComputedGroupsError> {
        let schema = session.schema().to_string();
        Ok(session
            .get_entries()?
            .into_iter()
            .find(|entry| GroupDefinition::from_record(entry, &schema, &self.config).name == name))
    }

    /// Stores a new group definition.
    pub fn create_group(
        &self,
        name: &str,
        expression: &str,
    ) -> Result<GroupDefinition, ComputedGroupsError> {
        self.validate(name, expression)?;

        let mut session = self.session()?;
        let mut fields = BTreeMap::new();
        fields.insert(session.id_field().to_string(), Value::from(name));
        fields.insert(
            self.config.get_group_name_field().to_string(),
            Value::from(name),
        );
        fields.insert(
            self.config.get_expression_field().to_string(),
            Value::from(expression),
        );

        session.create_entry(fields)?;
        session.commit()?;
        session.release()?;

        info!(group = name, "computed group created");
        Ok(GroupDefinition::new(name, expression))
    }

    /// Replaces the expression of an existing group.
    pub fn update_expression(
        &self,
        name: &str,
        expression: &str,
    ) -> Result<GroupDefinition, ComputedGroupsError> {
        self.validate(name, expression)?;

        let mut session = self.session()?;
        let mut record = self
            .find_record(&session, name)?
            .ok_or_else(|| ComputedGroupsError::GroupNotFound(name.to_string()))?;

        let field = qualify(session.schema(), self.config.get_expression_field());
        record.set(field, expression);
        session.update_entry(record)?;
        session.commit()?;
        session.release()?;

        info!(group = name, "computed group updated");
        Ok(GroupDefinition::new(name, expression))
    }

    /// Deletes a group definition.
    pub fn delete_group(&self, name: &str) -> Result<(), ComputedGroupsError> {
        let mut session = self.session()?;
        let record = self
            .find_record(&session, name)?
            .ok_or_else(|| ComputedGroupsError::GroupNotFound(name.to_string()))?;

        session.delete_entry(record.id())?;
        session.commit()?;
        session.release()?;

        info!(group = name, "computed group deleted");
        Ok(())
    }

    /// Returns one group definition.
    pub fn get_group(&self, name: &str) -> Result<Option<GroupDefinition>, ComputedGroupsError> {
        let session = self.session()?;
        let schema = session.schema().to_string();
        let definition = self
            .find_record(&session, name)?
            .map(|record| GroupDefinition::from_record(&record, &schema, &self.config));
        session.release()?;
        Ok(definition)
    }

    /// Returns every group definition, in directory order.
    pub fn list_groups(&self) -> Result<Vec<GroupDefinition>, ComputedGroupsError> {
        let session = self.session()?;
        let schema = session.schema().to_string();
        let definitions = session
            .get_entries()?
            .iter()
            .map(|record| GroupDefinition::from_record(record, &schema, &self.config))
            .collect();
        session.release()?;
        Ok(definitions)
    }
}
