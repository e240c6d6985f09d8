//! Service wiring: storage backends, codec, hasher and the authorization guard.

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use bazaar_auth::{
    Argon2Hasher, AuthorizationGuard, EncodeError, Hs256TokenCodec, NewUser,
    PasswordHasher, PermissionCache, PermissionCatalog, TokenCodec, UserDirectory, roles,
};
use bazaar_companies::Company;
use bazaar_infra::{InMemoryCatalog, InMemoryRepository, InMemoryUserDirectory, Repository};
use bazaar_items::Item;
use bazaar_products::Product;

use crate::config::{BootstrapAdmin, Settings};

pub type Repo<E> = Arc<dyn Repository<E>>;

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub struct AppServices {
    pub directory: Arc<dyn UserDirectory>,
    pub catalog: Arc<dyn PermissionCatalog>,
    pub companies: Repo<Company>,
    pub products: Repo<Product>,
    pub items: Repo<Item>,
    pub codec: Arc<dyn TokenCodec>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub guard: Arc<AuthorizationGuard>,
    pub token_ttl: chrono::Duration,
}

impl AppServices {
    /// In-memory backends with the default roles seeded.
    pub fn in_memory(settings: &Settings) -> anyhow::Result<Self> {
        let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryUserDirectory::new());
        let catalog: Arc<dyn PermissionCatalog> =
            Arc::new(InMemoryCatalog::seeded().context("seeding permission catalog")?);
        let codec: Arc<dyn TokenCodec> = Arc::new(Hs256TokenCodec::new(settings.secret_key.as_bytes()));
        let cache = Arc::new(PermissionCache::new(settings.permission_cache_capacity));

        let guard = Arc::new(AuthorizationGuard::new(
            codec.clone(),
            directory.clone(),
            catalog.clone(),
            cache,
        ));

        Ok(Self {
            directory,
            catalog,
            companies: Arc::new(InMemoryRepository::<Company>::new()),
            products: Arc::new(InMemoryRepository::<Product>::new()),
            items: Arc::new(InMemoryRepository::<Item>::new()),
            codec,
            hasher: Arc::new(Argon2Hasher::new()),
            guard,
            token_ttl: settings.token_ttl,
        })
    }

    pub fn cache(&self) -> &Arc<PermissionCache> {
        self.guard.cache()
    }

    pub fn issue_token(&self, email: &str) -> Result<TokenResponse, EncodeError> {
        Ok(TokenResponse {
            access_token: self.codec.issue(email, self.token_ttl)?,
            token_type: "bearer",
        })
    }

    /// Hash on the blocking pool; Argon2 is CPU-bound for tens of milliseconds.
    pub async fn hash_password(&self, password: String) -> anyhow::Result<String> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("password hashing task failed")??;
        Ok(hash)
    }

    pub async fn verify_password(&self, password: String, hash: String) -> anyhow::Result<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .context("password verification task failed")
    }

    /// Create the bootstrap admin unless a user with that email already exists.
    pub fn ensure_admin(&self, admin: &BootstrapAdmin) -> anyhow::Result<()> {
        if let Some(existing) = self.directory.find_by_email(&admin.email)? {
            tracing::info!(user_id = %existing.id, "bootstrap admin already present");
            return Ok(());
        }

        let hashed_password = self
            .hasher
            .hash(&admin.password)
            .context("hashing bootstrap admin password")?;

        let created = self
            .directory
            .create(NewUser {
                email: admin.email.clone(),
                username: admin.username.clone(),
                hashed_password,
                role: Some(roles::ADMIN),
            })
            .context("creating bootstrap admin")?;

        tracing::info!(user_id = %created.id, email = %created.email, "bootstrap admin created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::thread::ThreadId;

    use bazaar_auth::HashError;

    use super::*;

    fn settings() -> Settings {
        Settings::from_lookup(|k| (k == "SECRET_KEY").then(|| "unit-secret".to_string())).unwrap()
    }

    #[test]
    fn ensure_admin_is_idempotent() {
        let services = AppServices::in_memory(&settings()).unwrap();
        let admin = BootstrapAdmin {
            email: "Root@Example.com".into(),
            username: "root".into(),
            password: "pw".into(),
        };

        services.ensure_admin(&admin).unwrap();
        services.ensure_admin(&admin).unwrap();

        let page = bazaar_core::Page::default();
        let users = services.directory.list(page).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Some(roles::ADMIN));
        assert!(services.hasher.verify("pw", &users[0].hashed_password));
    }

    #[test]
    fn issued_tokens_decode_to_the_subject() {
        let services = AppServices::in_memory(&settings()).unwrap();
        let token = services.issue_token("a@example.com").unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(services.codec.decode(&token.access_token).unwrap().sub, "a@example.com");
    }

    #[derive(Default)]
    struct RecordingHasher {
        threads: Mutex<Vec<ThreadId>>,
    }

    impl PasswordHasher for RecordingHasher {
        fn hash(&self, password: &str) -> Result<String, HashError> {
            self.threads.lock().unwrap().push(std::thread::current().id());
            Ok(format!("hashed:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            self.threads.lock().unwrap().push(std::thread::current().id());
            hash == format!("hashed:{password}")
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn password_work_runs_on_the_blocking_pool() {
        let recorder = Arc::new(RecordingHasher::default());
        let mut services = AppServices::in_memory(&settings()).unwrap();
        services.hasher = recorder.clone();

        let hash = services.hash_password("pw".into()).await.unwrap();
        assert!(services.verify_password("pw".into(), hash.clone()).await.unwrap());
        assert!(!services.verify_password("nope".into(), hash).await.unwrap());

        let runtime_thread = std::thread::current().id();
        let threads = recorder.threads.lock().unwrap();
        assert_eq!(threads.len(), 3);
        assert!(threads.iter().all(|t| *t != runtime_thread));
    }
}
