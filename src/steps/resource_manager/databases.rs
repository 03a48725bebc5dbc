//! Database servers and the databases they host

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::{EntityMeta, RelationshipClass};
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_DATABASE_MARIADB_DATABASES: StepId = StepId::new("rm-database-mariadb-databases");
pub const STEP_RM_DATABASE_MYSQL_DATABASES: StepId = StepId::new("rm-database-mysql-databases");
pub const STEP_RM_DATABASE_POSTGRESQL_DATABASES: StepId =
    StepId::new("rm-database-postgresql-databases");
pub const STEP_RM_DATABASE_SQL_DATABASES: StepId = StepId::new("rm-database-sql-databases");

pub static MARIADB_SERVER: EntityMeta = EntityMeta::new("MariaDB Server", "azure_mariadb_server", "Database");
pub static MARIADB_DATABASE: EntityMeta =
    EntityMeta::new("MariaDB Database", "azure_mariadb_database", "Database");
pub static MYSQL_SERVER: EntityMeta = EntityMeta::new("MySQL Server", "azure_mysql_server", "Database");
pub static MYSQL_DATABASE: EntityMeta = EntityMeta::new("MySQL Database", "azure_mysql_database", "Database");
pub static POSTGRESQL_SERVER: EntityMeta =
    EntityMeta::new("PostgreSQL Server", "azure_postgresql_server", "Database");
pub static POSTGRESQL_DATABASE: EntityMeta =
    EntityMeta::new("PostgreSQL Database", "azure_postgresql_database", "Database");
pub static SQL_SERVER: EntityMeta = EntityMeta::new("SQL Server", "azure_sql_server", "Database");
pub static SQL_DATABASE: EntityMeta = EntityMeta::new("SQL Database", "azure_sql_database", "Database");

fn servers_and_databases(
    id: StepId,
    name: &str,
    path: &'static str,
    api_version: &'static str,
    server: &'static EntityMeta,
    database: &'static EntityMeta,
) -> Step {
    Step::new(
        id,
        name,
        provider(path, api_version, server).nested(
            "databases",
            api_version,
            database,
            RelationshipClass::Has,
        ),
    )
    .depends_on(scoped_deps(&[]))
}

pub fn family() -> StepFamily {
    StepFamily::new(
        "databases",
        StepGroup::ResourceScope,
        vec![
            servers_and_databases(
                STEP_RM_DATABASE_MARIADB_DATABASES,
                "MariaDB Databases",
                "providers/Microsoft.DBforMariaDB/servers",
                "2018-06-01",
                &MARIADB_SERVER,
                &MARIADB_DATABASE,
            ),
            servers_and_databases(
                STEP_RM_DATABASE_MYSQL_DATABASES,
                "MySQL Databases",
                "providers/Microsoft.DBforMySQL/servers",
                "2017-12-01",
                &MYSQL_SERVER,
                &MYSQL_DATABASE,
            ),
            servers_and_databases(
                STEP_RM_DATABASE_POSTGRESQL_DATABASES,
                "PostgreSQL Databases",
                "providers/Microsoft.DBforPostgreSQL/servers",
                "2017-12-01",
                &POSTGRESQL_SERVER,
                &POSTGRESQL_DATABASE,
            ),
            servers_and_databases(
                STEP_RM_DATABASE_SQL_DATABASES,
                "SQL Databases",
                "providers/Microsoft.Sql/servers",
                "2019-06-01-preview",
                &SQL_SERVER,
                &SQL_DATABASE,
            ),
        ],
    )
}
