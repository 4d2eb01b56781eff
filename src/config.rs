use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_database_url: String,
    pub order_database_url: String,
    pub identity: IdentityConfig,
}

/// Connection settings for the Keycloak admin API.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub base_url: String,
    pub realm: String,
    pub admin_username: String,
    pub admin_password: String,
    pub client_id: String,
    /// Realm role attached to newly provisioned accounts. Must already
    /// exist in the realm.
    pub client_role: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let catalog_database_url = env::var("CATALOG_DATABASE_URL")
            .unwrap_or_else(|_| "mysql://root@localhost:3306/productdb".to_string());
        let order_database_url = env::var("ORDER_DATABASE_URL")
            .unwrap_or_else(|_| "mysql://root@localhost:3306/commanddb".to_string());

        let identity = IdentityConfig {
            base_url: env::var("KEYCLOAK_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            realm: env::var("KEYCLOAK_REALM").unwrap_or_else(|_| "trustmart".to_string()),
            admin_username: env::var("KEYCLOAK_ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("KEYCLOAK_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin".to_string()),
            client_id: env::var("KEYCLOAK_CLIENT_ID").unwrap_or_else(|_| "admin-cli".to_string()),
            client_role: env::var("SEED_CLIENT_ROLE").unwrap_or_else(|_| "CLIENT".to_string()),
        };

        Ok(Self {
            catalog_database_url,
            order_database_url,
            identity,
        })
    }
}
