//! Reusable step handler kinds
//!
//! Every catalog step is one of these, configured with the collection it
//! lists and the entity and relationship types it writes.

use crate::client::Pager;
use crate::core::{DeclaredTypes, StepContext, StepError, StepHandler, ACCOUNT_ENTITY_KEY};
use crate::graph::{
    create_arm_entity, create_direct_relationship, create_resource_entity, parse_resource_id,
    select_values, Entity, EntityMeta, RelationshipClass, RelationshipMeta, WebLinker,
};
use crate::steps::account::ACCOUNT;
use crate::steps::resource_manager::monitor::{
    DIAGNOSTIC_SETTING, DIAGNOSTIC_SETTINGS_API_VERSION, DIAGNOSTIC_SETTINGS_PATH,
};
use crate::steps::resource_manager::resources::RESOURCE_GROUP;
use crate::store::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Add a relationship unless one with the same key already exists
async fn relate(
    ctx: &StepContext,
    class: RelationshipClass,
    from: &Entity,
    to: &Entity,
) -> Result<bool, StepError> {
    let relationship = create_direct_relationship(class, from, to);
    if ctx.job_state.has_key(&relationship.key).await? {
        return Ok(false);
    }
    ctx.job_state.add_relationship(relationship).await?;
    Ok(true)
}

/// Builds the root account entity and publishes it for dependents
pub struct AccountStep;

#[async_trait]
impl StepHandler for AccountStep {
    async fn execute(&self, ctx: &StepContext) -> Result<(), StepError> {
        let config = &ctx.config;
        let directory = config.directory_id.as_deref().unwrap_or("default");

        let mut properties = Map::new();
        if let Some(directory_id) = &config.directory_id {
            properties.insert("directoryId".to_string(), Value::String(directory_id.clone()));
        }
        if let Some(domain) = &config.default_domain {
            properties.insert("defaultDomain".to_string(), Value::String(domain.clone()));
        }
        if let Some(subscription_id) = config.subscription_id.as_deref().filter(|s| !s.is_empty()) {
            properties.insert(
                "subscriptionId".to_string(),
                Value::String(subscription_id.to_string()),
            );
        }

        let entity = Entity {
            key: format!("{}:{}", ACCOUNT.entity_type, directory),
            entity_type: ACCOUNT.entity_type.to_string(),
            class: ACCOUNT.class.to_string(),
            display_name: config
                .default_domain
                .clone()
                .unwrap_or_else(|| directory.to_string()),
            properties,
            raw_data: Value::Null,
        };

        let entity = ctx.job_state.add_entity(entity).await?;
        let value = serde_json::to_value(&entity).map_err(StoreError::from)?;
        ctx.job_state.set_data(ACCOUNT_ENTITY_KEY, value).await?;
        info!("Account entity {} published", entity.key);
        Ok(())
    }

    fn declared_types(&self) -> DeclaredTypes {
        DeclaredTypes {
            entities: vec![&ACCOUNT],
            relationships: vec![],
        }
    }
}

/// Lists a graph collection; the account HAS every object
pub struct GraphListStep {
    path: &'static str,
    meta: &'static EntityMeta,
}

impl GraphListStep {
    pub fn new(path: &'static str, meta: &'static EntityMeta) -> Self {
        Self { path, meta }
    }
}

#[async_trait]
impl StepHandler for GraphListStep {
    async fn execute(&self, ctx: &StepContext) -> Result<(), StepError> {
        let account = ctx.account_entity().await?;
        let mut pager = ctx.client.list_graph(self.path);
        let mut count = 0;

        while let Some(page) = pager.next_page().await? {
            for item in page {
                let entity = ctx
                    .job_state
                    .add_entity(create_resource_entity(self.meta, &item)?)
                    .await?;
                relate(ctx, RelationshipClass::Has, &account, &entity).await?;
                count += 1;
            }
        }

        info!("Ingested {} {} objects", count, self.meta.resource_name);
        Ok(())
    }

    fn declared_types(&self) -> DeclaredTypes {
        DeclaredTypes {
            entities: vec![self.meta],
            relationships: vec![RelationshipMeta::new(&ACCOUNT, RelationshipClass::Has, self.meta)],
        }
    }
}

/// Relates each stored group to the members already ingested
pub struct GroupMembersStep {
    group: &'static EntityMeta,
    members: Vec<&'static EntityMeta>,
}

impl GroupMembersStep {
    pub fn new(group: &'static EntityMeta, members: Vec<&'static EntityMeta>) -> Self {
        Self { group, members }
    }
}

#[async_trait]
impl StepHandler for GroupMembersStep {
    async fn execute(&self, ctx: &StepContext) -> Result<(), StepError> {
        let groups = ctx.job_state.entities_of_type(self.group.entity_type).await?;

        for group in groups {
            let mut pager = ctx.client.list_graph(&format!("/groups/{}/members", group.key));
            while let Some(page) = pager.next_page().await? {
                for member in page {
                    let Some(id) = member.get("id").and_then(Value::as_str) else {
                        continue;
                    };
                    match ctx.job_state.find_entity(id).await? {
                        Some(entity)
                            if self
                                .members
                                .iter()
                                .any(|meta| meta.entity_type == entity.entity_type) =>
                        {
                            relate(ctx, RelationshipClass::Has, &group, &entity).await?;
                        }
                        _ => debug!("Member {} of group {} was not ingested", id, group.key),
                    }
                }
            }
        }
        Ok(())
    }

    fn declared_types(&self) -> DeclaredTypes {
        DeclaredTypes {
            entities: vec![],
            relationships: self
                .members
                .iter()
                .map(|member| RelationshipMeta::new(self.group, RelationshipClass::Has, *member))
                .collect(),
        }
    }
}

/// Where an [`ArmListStep`] lists its items
#[derive(Debug, Clone, Copy)]
pub enum ListSource {
    /// An absolute path, e.g. `/subscriptions`; the account is the parent
    Root(&'static str),
    /// A path under `/subscriptions/{configured id}/`; the account is the parent
    Subscription(&'static str),
    /// A path under every stored parent entity's id
    Children {
        parent: &'static EntityMeta,
        path: &'static str,
    },
}

/// Child objects embedded in an item's document
#[derive(Debug, Clone, Copy)]
pub struct Embedded {
    pub path: &'static str,
    pub meta: &'static EntityMeta,
    pub class: RelationshipClass,
}

/// Child collection listed under each item
#[derive(Debug, Clone, Copy)]
pub struct Nested {
    pub path: &'static str,
    pub api_version: &'static str,
    pub meta: &'static EntityMeta,
    pub class: RelationshipClass,
}

/// Lists a resource-manager collection and relates each item to its parent
pub struct ArmListStep {
    source: ListSource,
    api_version: &'static str,
    meta: &'static EntityMeta,
    class: RelationshipClass,
    resource_group: bool,
    embedded: Vec<Embedded>,
    nested: Vec<Nested>,
}

impl ArmListStep {
    pub fn new(source: ListSource, api_version: &'static str, meta: &'static EntityMeta) -> Self {
        Self {
            source,
            api_version,
            meta,
            class: RelationshipClass::Has,
            resource_group: false,
            embedded: Vec::new(),
            nested: Vec::new(),
        }
    }

    /// Items under an absolute path
    pub fn root(path: &'static str, api_version: &'static str, meta: &'static EntityMeta) -> Self {
        Self::new(ListSource::Root(path), api_version, meta)
    }

    /// Items under `/subscriptions/{id}/{path}`
    pub fn subscription(path: &'static str, api_version: &'static str, meta: &'static EntityMeta) -> Self {
        Self::new(ListSource::Subscription(path), api_version, meta)
    }

    /// Items under `{parent id}/{path}` for every stored parent
    pub fn children(
        parent: &'static EntityMeta,
        path: &'static str,
        api_version: &'static str,
        meta: &'static EntityMeta,
    ) -> Self {
        Self::new(ListSource::Children { parent, path }, api_version, meta)
    }

    /// Relationship class from parent to item (default HAS)
    pub fn class(mut self, class: RelationshipClass) -> Self {
        self.class = class;
        self
    }

    /// Also relate the owning resource group HAS item
    pub fn with_resource_group(mut self) -> Self {
        self.resource_group = true;
        self
    }

    pub fn embedded(mut self, path: &'static str, meta: &'static EntityMeta, class: RelationshipClass) -> Self {
        self.embedded.push(Embedded { path, meta, class });
        self
    }

    pub fn nested(
        mut self,
        path: &'static str,
        api_version: &'static str,
        meta: &'static EntityMeta,
        class: RelationshipClass,
    ) -> Self {
        self.nested.push(Nested {
            path,
            api_version,
            meta,
            class,
        });
        self
    }

    /// Also list each item's diagnostic settings
    pub fn with_diagnostic_settings(self) -> Self {
        self.nested(
            DIAGNOSTIC_SETTINGS_PATH,
            DIAGNOSTIC_SETTINGS_API_VERSION,
            &DIAGNOSTIC_SETTING,
            RelationshipClass::Has,
        )
    }

    fn parent_meta(&self) -> &'static EntityMeta {
        match self.source {
            ListSource::Root(_) | ListSource::Subscription(_) => &ACCOUNT,
            ListSource::Children { parent, .. } => parent,
        }
    }

    /// Parents paired with the collection URL path to list under each
    async fn parents(&self, ctx: &StepContext) -> Result<Vec<(Entity, String)>, StepError> {
        match self.source {
            ListSource::Root(path) => Ok(vec![(ctx.account_entity().await?, path.to_string())]),
            ListSource::Subscription(path) => {
                let subscription_id = ctx.subscription_id()?;
                Ok(vec![(
                    ctx.account_entity().await?,
                    format!("/subscriptions/{}/{}", subscription_id, path.trim_start_matches('/')),
                )])
            }
            ListSource::Children { parent, path } => Ok(ctx
                .job_state
                .entities_of_type(parent.entity_type)
                .await?
                .into_iter()
                .map(|entity| {
                    let url = format!("{}/{}", entity.key.trim_end_matches('/'), path.trim_start_matches('/'));
                    (entity, url)
                })
                .collect()),
        }
    }

    async fn store_item(
        &self,
        ctx: &StepContext,
        linker: &WebLinker,
        parent: &Entity,
        item: &Value,
    ) -> Result<(), StepError> {
        let entity = ctx
            .job_state
            .add_entity(create_arm_entity(self.meta, item, linker)?)
            .await?;
        relate(ctx, self.class, parent, &entity).await?;

        if self.resource_group {
            let group_key = parse_resource_id(&entity.key).and_then(|id| id.resource_group_key());
            if let Some(group_key) = group_key {
                match ctx.job_state.find_entity(&group_key).await? {
                    Some(group) => {
                        relate(ctx, RelationshipClass::Has, &group, &entity).await?;
                    }
                    None => debug!("Resource group {} not ingested", group_key),
                }
            }
        }

        for embedded in &self.embedded {
            for child in select_values(&entity.raw_data, embedded.path) {
                let child = ctx
                    .job_state
                    .add_entity(create_arm_entity(embedded.meta, child, linker)?)
                    .await?;
                relate(ctx, embedded.class, &entity, &child).await?;
            }
        }

        for nested in &self.nested {
            let path = format!("{}/{}", entity.key, nested.path);
            let mut pager = ctx.client.list_arm(&path, nested.api_version);
            while let Some(page) = next_page(&mut pager, &path, true).await? {
                for child in page {
                    let child = ctx
                        .job_state
                        .add_entity(create_arm_entity(nested.meta, &child, linker)?)
                        .await?;
                    relate(ctx, nested.class, &entity, &child).await?;
                }
            }
        }

        Ok(())
    }
}

/// Next page of a collection. When `lenient`, a 403/404 on the first page
/// reads as an empty collection.
async fn next_page(
    pager: &mut Pager,
    path: &str,
    lenient: bool,
) -> Result<Option<Vec<Value>>, StepError> {
    match pager.next_page().await {
        Ok(page) => Ok(page),
        Err(e) if lenient && e.is_unavailable() && pager.pages() == 0 => {
            warn!("Skipping unavailable collection {}: {}", path, e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl StepHandler for ArmListStep {
    async fn execute(&self, ctx: &StepContext) -> Result<(), StepError> {
        let linker = ctx.web_linker().await?;
        let mut count = 0;

        for (parent, path) in self.parents(ctx).await? {
            let mut pager = ctx.client.list_arm(&path, self.api_version);
            let lenient = matches!(self.source, ListSource::Children { .. });

            while let Some(page) = next_page(&mut pager, &path, lenient).await? {
                for item in page {
                    self.store_item(ctx, &linker, &parent, &item).await?;
                    count += 1;
                }
            }
        }

        info!("Ingested {} {} resources", count, self.meta.resource_name);
        Ok(())
    }

    fn declared_types(&self) -> DeclaredTypes {
        let mut declared = DeclaredTypes {
            entities: vec![self.meta],
            relationships: vec![RelationshipMeta::new(self.parent_meta(), self.class, self.meta)],
        };
        if self.resource_group {
            declared
                .relationships
                .push(RelationshipMeta::new(&RESOURCE_GROUP, RelationshipClass::Has, self.meta));
        }
        for embedded in &self.embedded {
            declared.merge(DeclaredTypes {
                entities: vec![embedded.meta],
                relationships: vec![RelationshipMeta::new(self.meta, embedded.class, embedded.meta)],
            });
        }
        for nested in &self.nested {
            declared.merge(DeclaredTypes {
                entities: vec![nested.meta],
                relationships: vec![RelationshipMeta::new(self.meta, nested.class, nested.meta)],
            });
        }
        declared
    }
}

/// One rule of a [`LinkStep`]
#[derive(Debug, Clone)]
pub struct LinkRule {
    /// Entities whose raw data is searched
    pub from: &'static EntityMeta,
    /// Dotted path to referenced ids; `*` fans out
    pub path: &'static str,
    pub class: RelationshipClass,
    /// Entity types a referenced id may resolve to
    pub targets: Vec<&'static EntityMeta>,
    /// Relate target -> from instead of from -> target
    pub reverse: bool,
}

impl LinkRule {
    pub fn new(
        from: &'static EntityMeta,
        path: &'static str,
        class: RelationshipClass,
        targets: Vec<&'static EntityMeta>,
    ) -> Self {
        Self {
            from,
            path,
            class,
            targets,
            reverse: false,
        }
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    fn relationship_metas(&self) -> Vec<RelationshipMeta> {
        self.targets
            .iter()
            .map(|&target| {
                if self.reverse {
                    RelationshipMeta::new(target, self.class, self.from)
                } else {
                    RelationshipMeta::new(self.from, self.class, target)
                }
            })
            .collect()
    }
}

/// Relationship-only step: links stored entities by ids found in raw data
pub struct LinkStep {
    rules: Vec<LinkRule>,
}

impl LinkStep {
    pub fn new(rules: Vec<LinkRule>) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl StepHandler for LinkStep {
    async fn execute(&self, ctx: &StepContext) -> Result<(), StepError> {
        let mut linked = 0;

        for rule in &self.rules {
            for source in ctx.job_state.entities_of_type(rule.from.entity_type).await? {
                let ids: Vec<String> = select_values(&source.raw_data, rule.path)
                    .into_iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();

                for id in ids {
                    let Some(target) = ctx.job_state.find_entity(&id).await? else {
                        debug!("{} references {} which was not ingested", source.key, id);
                        continue;
                    };
                    if !rule
                        .targets
                        .iter()
                        .any(|meta| meta.entity_type == target.entity_type)
                    {
                        continue;
                    }
                    let added = if rule.reverse {
                        relate(ctx, rule.class, &target, &source).await?
                    } else {
                        relate(ctx, rule.class, &source, &target).await?
                    };
                    if added {
                        linked += 1;
                    }
                }
            }
        }

        info!("Created {} relationships", linked);
        Ok(())
    }

    fn declared_types(&self) -> DeclaredTypes {
        DeclaredTypes {
            entities: vec![],
            relationships: self
                .rules
                .iter()
                .flat_map(LinkRule::relationship_metas)
                .collect(),
        }
    }
}

/// Runs several handlers in order as one step
pub struct ChainStep {
    handlers: Vec<Arc<dyn StepHandler>>,
}

impl ChainStep {
    pub fn new(handlers: Vec<Arc<dyn StepHandler>>) -> Self {
        Self { handlers }
    }
}

#[async_trait]
impl StepHandler for ChainStep {
    async fn execute(&self, ctx: &StepContext) -> Result<(), StepError> {
        for handler in &self.handlers {
            handler.execute(ctx).await?;
        }
        Ok(())
    }

    fn declared_types(&self) -> DeclaredTypes {
        let mut declared = DeclaredTypes::default();
        for handler in &self.handlers {
            declared.merge(handler.declared_types());
        }
        declared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::resource_manager::key_vault::{KEY, KEY_VAULT};
    use crate::steps::resource_manager::network::{NETWORK_INTERFACE, SUBNET, VIRTUAL_NETWORK};

    fn relationship_types(declared: &DeclaredTypes) -> Vec<String> {
        declared
            .relationships
            .iter()
            .map(RelationshipMeta::relationship_type)
            .collect()
    }

    #[test]
    fn test_provider_listing_declares_parents() {
        let declared =
            ArmListStep::subscription("providers/Microsoft.KeyVault/vaults", "2019-09-01", &KEY_VAULT)
                .with_resource_group()
                .declared_types();

        assert_eq!(declared.entities, vec![&KEY_VAULT]);
        assert_eq!(
            relationship_types(&declared),
            vec![
                "azure_account_has_keyvault_service",
                "azure_resource_group_has_keyvault_service",
            ]
        );
    }

    #[test]
    fn test_children_and_embedded_declare_their_types() {
        let keys = ArmListStep::children(&KEY_VAULT, "keys", "2019-09-01", &KEY)
            .class(RelationshipClass::Contains)
            .declared_types();
        assert_eq!(relationship_types(&keys), vec!["azure_keyvault_service_contains_key"]);

        let vnets = ArmListStep::subscription(
            "providers/Microsoft.Network/virtualNetworks",
            "2020-05-01",
            &VIRTUAL_NETWORK,
        )
        .embedded("properties.subnets.*", &SUBNET, RelationshipClass::Contains)
        .declared_types();
        assert_eq!(vnets.entities, vec![&VIRTUAL_NETWORK, &SUBNET]);
        assert!(relationship_types(&vnets).contains(&"azure_vnet_contains_subnet".to_string()));
    }

    #[test]
    fn test_reversed_link_declares_target_first() {
        let link = LinkStep::new(vec![LinkRule::new(
            &NETWORK_INTERFACE,
            "properties.ipConfigurations.*.properties.subnet.id",
            RelationshipClass::Has,
            vec![&SUBNET],
        )
        .reversed()]);

        assert_eq!(relationship_types(&link.declared_types()), vec!["azure_subnet_has_nic"]);
    }

    #[test]
    fn test_chain_merges_declarations() {
        let chain = ChainStep::new(vec![
            Arc::new(GraphListStep::new("/users", &crate::steps::active_directory::USER)),
            Arc::new(GraphListStep::new("/users", &crate::steps::active_directory::USER)),
        ]);
        let declared = chain.declared_types();
        assert_eq!(declared.entities.len(), 1);
        assert_eq!(relationship_types(&declared), vec!["azure_account_has_user"]);
    }
}
