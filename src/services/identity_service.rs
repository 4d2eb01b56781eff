//! Idempotent account provisioning against the Keycloak admin API.
//!
//! The identity provider has no transaction boundary, so "create or
//! reuse" is built from explicit conflict detection: a create that
//! reports a duplicate username falls back to a lookup of the existing
//! account. Re-running provisioning never errors and never duplicates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::IdentityConfig;
use crate::data::DesiredAccount;
use crate::error::{SeedError, SeedResult};
use crate::models::Account;

/// Bearer credential for the admin API, obtained once per run.
#[derive(Debug, Clone)]
pub struct AdminToken {
    access_token: String,
}

/// A realm role as represented by the admin API. The full
/// representation is echoed back verbatim on assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealmRole {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest<'a> {
    username: &'a str,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    enabled: bool,
    email_verified: bool,
    credentials: Vec<CredentialRepresentation<'a>>,
}

#[derive(Serialize)]
struct CredentialRepresentation<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
    temporary: bool,
}

/// Result of a single create-user call.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(Uuid),
    /// The provider rejected the create with a duplicate-username
    /// conflict; the account already exists.
    Conflict,
    /// Validation or other non-conflict rejection.
    Rejected(String),
}

/// Result of provisioning one desired account end to end.
#[derive(Debug, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created(Uuid),
    AlreadyExists(Uuid),
    /// The account is unusable downstream (create rejected, conflict
    /// lookup came up empty, or role assignment failed after create).
    Failed(String),
}

pub struct IdentityClient {
    http: reqwest::Client,
    config: IdentityConfig,
}

impl IdentityClient {
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn client_role_name(&self) -> &str {
        &self.config.client_role
    }

    /// Password-grant authentication with the operator credentials.
    /// Any transport or status failure here is fatal for provisioning:
    /// no accounts can be resolved without a bearer credential.
    pub async fn authenticate(&self) -> SeedResult<AdminToken> {
        let url = format!(
            "{}/realms/master/protocol/openid-connect/token",
            self.config.base_url
        );
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", self.config.client_id.as_str()),
                ("username", self.config.admin_username.as_str()),
                ("password", self.config.admin_password.as_str()),
            ])
            .send()
            .await
            .map_err(|err| SeedError::Auth(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SeedError::Auth(format!("token endpoint returned {status}: {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| SeedError::Auth(err.to_string()))?;
        Ok(AdminToken {
            access_token: token.access_token,
        })
    }

    /// Look up a realm role by name. The role must be pre-provisioned;
    /// a missing role is a configuration error that aborts the stage.
    pub async fn realm_role(&self, token: &AdminToken, name: &str) -> SeedResult<RealmRole> {
        let url = format!(
            "{}/admin/realms/{}/roles/{}",
            self.config.base_url, self.config.realm, name
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SeedError::Config(format!(
                "realm role '{name}' does not exist in realm '{}'",
                self.config.realm
            )));
        }
        let role = response.error_for_status()?.json().await?;
        Ok(role)
    }

    pub async fn create_user(
        &self,
        token: &AdminToken,
        desired: &DesiredAccount,
    ) -> SeedResult<CreateOutcome> {
        let url = format!(
            "{}/admin/realms/{}/users",
            self.config.base_url, self.config.realm
        );
        let payload = CreateUserRequest {
            username: desired.username,
            email: desired.email,
            first_name: desired.first_name,
            last_name: desired.last_name,
            enabled: true,
            email_verified: true,
            credentials: vec![CredentialRepresentation {
                kind: "password",
                value: desired.password,
                temporary: false,
            }],
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token.access_token)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::CREATED => {
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(user_id_from_location);
                match location {
                    Some(id) => Ok(CreateOutcome::Created(id)),
                    None => Ok(CreateOutcome::Rejected(
                        "created but response carried no usable Location header".to_string(),
                    )),
                }
            }
            reqwest::StatusCode::CONFLICT => Ok(CreateOutcome::Conflict),
            status => {
                let body = response.text().await.unwrap_or_default();
                Ok(CreateOutcome::Rejected(format!("{status}: {body}")))
            }
        }
    }

    /// Find a user by exact username. The admin search endpoint does
    /// prefix matching, so the results are filtered client-side.
    pub async fn find_user_by_username(
        &self,
        token: &AdminToken,
        username: &str,
    ) -> SeedResult<Option<UserRepresentation>> {
        let url = format!(
            "{}/admin/realms/{}/users",
            self.config.base_url, self.config.realm
        );
        let users: Vec<UserRepresentation> = self
            .http
            .get(&url)
            .bearer_auth(&token.access_token)
            .query(&[("username", username)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(exact_username_match(users, username))
    }

    pub async fn assign_realm_role(
        &self,
        token: &AdminToken,
        user_id: Uuid,
        role: &RealmRole,
    ) -> SeedResult<()> {
        let url = format!(
            "{}/admin/realms/{}/users/{}/role-mappings/realm",
            self.config.base_url, self.config.realm, user_id
        );
        self.http
            .post(&url)
            .bearer_auth(&token.access_token)
            .json(&[role])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Resolve the desired accounts against the identity provider.
///
/// Auth and missing-role failures abort the whole stage; everything
/// else is per-account: a failed account is logged and left out of the
/// resolved list, siblings proceed. Existing accounts are reused as-is
/// and their role assignment is not retried.
pub async fn provision_accounts(
    client: &IdentityClient,
    desired: &[DesiredAccount],
) -> SeedResult<Vec<Account>> {
    let token = client.authenticate().await?;
    let role = client.realm_role(&token, client.client_role_name()).await?;

    let mut resolved = Vec::with_capacity(desired.len());
    for account in desired {
        match provision_one(client, &token, &role, account).await {
            Ok(ProvisionOutcome::Created(id)) => {
                tracing::info!(username = account.username, %id, "provisioned new account");
                resolved.push(resolved_account(id, account));
            }
            Ok(ProvisionOutcome::AlreadyExists(id)) => {
                tracing::info!(username = account.username, %id, "reusing existing account");
                resolved.push(resolved_account(id, account));
            }
            Ok(ProvisionOutcome::Failed(reason)) => {
                tracing::warn!(username = account.username, %reason, "skipping account");
            }
            Err(err) => {
                tracing::warn!(username = account.username, error = %err, "skipping account");
            }
        }
    }

    tracing::info!(
        resolved = resolved.len(),
        desired = desired.len(),
        "provisioning finished"
    );
    Ok(resolved)
}

async fn provision_one(
    client: &IdentityClient,
    token: &AdminToken,
    role: &RealmRole,
    desired: &DesiredAccount,
) -> SeedResult<ProvisionOutcome> {
    match client.create_user(token, desired).await? {
        CreateOutcome::Created(id) => {
            let role_attach = client
                .assign_realm_role(token, id, role)
                .await
                .map_err(|err| err.to_string());
            Ok(created_outcome(id, role_attach))
        }
        CreateOutcome::Conflict => {
            let existing = client.find_user_by_username(token, desired.username).await?;
            Ok(conflict_outcome(existing.map(|user| user.id)))
        }
        CreateOutcome::Rejected(reason) => Ok(ProvisionOutcome::Failed(reason)),
    }
}

/// A freshly created account is only usable once the client role is
/// attached; downstream authorization depends on it, so a failed
/// attach excludes the account from the resolved list.
fn created_outcome(id: Uuid, role_attach: Result<(), String>) -> ProvisionOutcome {
    match role_attach {
        Ok(()) => ProvisionOutcome::Created(id),
        Err(err) => {
            ProvisionOutcome::Failed(format!("created but role assignment failed: {err}"))
        }
    }
}

/// A duplicate-username conflict resolves through the lookup result.
/// The existing account is reused as-is; note the signature carries no
/// role information, existing accounts never get a role retry.
fn conflict_outcome(existing: Option<Uuid>) -> ProvisionOutcome {
    match existing {
        Some(id) => ProvisionOutcome::AlreadyExists(id),
        None => ProvisionOutcome::Failed(
            "duplicate reported but username lookup found no account".to_string(),
        ),
    }
}

/// Resolve only accounts that already exist, without creating any.
/// Used by the databases-only run; the caller falls back to full
/// provisioning when nothing is found.
pub async fn lookup_accounts(
    client: &IdentityClient,
    desired: &[DesiredAccount],
) -> SeedResult<Vec<Account>> {
    let token = client.authenticate().await?;

    let mut found = Vec::new();
    for account in desired {
        match client.find_user_by_username(&token, account.username).await {
            Ok(Some(existing)) => found.push(resolved_account(existing.id, account)),
            Ok(None) => {
                tracing::debug!(username = account.username, "no existing account");
            }
            Err(err) => {
                tracing::warn!(username = account.username, error = %err, "lookup failed");
            }
        }
    }
    Ok(found)
}

fn resolved_account(external_id: Uuid, desired: &DesiredAccount) -> Account {
    Account {
        external_id,
        username: desired.username.to_string(),
        email: desired.email.to_string(),
        first_name: desired.first_name.to_string(),
        last_name: desired.last_name.to_string(),
    }
}

/// The create-user endpoint returns the new id only as the last path
/// segment of the Location header.
fn user_id_from_location(location: &str) -> Option<Uuid> {
    location
        .rsplit('/')
        .next()
        .and_then(|segment| Uuid::parse_str(segment).ok())
}

fn exact_username_match(
    users: Vec<UserRepresentation>,
    username: &str,
) -> Option<UserRepresentation> {
    users.into_iter().find(|user| user.username == username)
}
