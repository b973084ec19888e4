//! SQL migrations compiled into the binary

/// One schema step
pub struct Migration {
    /// Stable id recorded in `schema_version`; never rename an applied one
    pub id: &'static str,
    pub sql: &'static str,
}

/// Every migration, oldest first
pub fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_orders_schema",
        sql: include_str!("../../migrations/001_orders_schema.sql"),
    }]
}
