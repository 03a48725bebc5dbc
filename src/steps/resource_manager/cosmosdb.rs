use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::{EntityMeta, RelationshipClass};
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_COSMOSDB_SQL_DATABASES: StepId = StepId::new("rm-cosmosdb-sql-databases");

const API_VERSION: &str = "2020-04-01";

pub static COSMOSDB_ACCOUNT: EntityMeta =
    EntityMeta::new("Cosmos DB Account", "azure_cosmosdb_account", "Account");
pub static COSMOSDB_SQL_DATABASE: EntityMeta =
    EntityMeta::new("Cosmos DB SQL Database", "azure_cosmosdb_sql_database", "Database");

pub fn family() -> StepFamily {
    StepFamily::new(
        "cosmosdb",
        StepGroup::ResourceScope,
        vec![Step::new(
            STEP_RM_COSMOSDB_SQL_DATABASES,
            "CosmosDB Accounts and SQL Databases",
            provider(
                "providers/Microsoft.DocumentDB/databaseAccounts",
                API_VERSION,
                &COSMOSDB_ACCOUNT,
            )
            .nested("sqlDatabases", API_VERSION, &COSMOSDB_SQL_DATABASE, RelationshipClass::Has),
        )
        .depends_on(scoped_deps(&[]))],
    )
}
