use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Duration, Utc};

use bazaar_auth::permissions::*;
use bazaar_auth::{
    AuthorizationGuard, DirectoryError, GuardError, Hs256TokenCodec, NewUser, PermissionCache,
    Requirement, Role, TimeBucket, TokenCodec, User, UserDirectory, UserPatch, roles,
};
use bazaar_core::{Page, UserId};
use bazaar_infra::{InMemoryCatalog, InMemoryUserDirectory};

const SECRET: &str = "guard-test-secret";

struct Fixture {
    guard: AuthorizationGuard,
    codec: Arc<Hs256TokenCodec>,
    directory: Arc<InMemoryUserDirectory>,
    cache: Arc<PermissionCache>,
}

impl Fixture {
    fn new() -> Self {
        let codec = Arc::new(Hs256TokenCodec::new(SECRET));
        let directory = Arc::new(InMemoryUserDirectory::new());
        let catalog = Arc::new(InMemoryCatalog::seeded().unwrap());
        let cache = Arc::new(PermissionCache::new(64));
        let guard = AuthorizationGuard::new(
            codec.clone(),
            directory.clone(),
            catalog,
            cache.clone(),
        );
        Self {
            guard,
            codec,
            directory,
            cache,
        }
    }

    fn user(&self, email: &str, role: Option<Role>) -> User {
        self.directory
            .create(NewUser {
                email: email.to_string(),
                username: email.split('@').next().unwrap().to_string(),
                hashed_password: "unused".to_string(),
                role,
            })
            .unwrap()
    }

    fn bearer(&self, email: &str, now: DateTime<Utc>) -> String {
        let token = self.codec.issue_at(email, Duration::minutes(30), now).unwrap();
        format!("Bearer {token}")
    }
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[test]
fn admin_with_manage_roles_is_authorized() {
    let fx = Fixture::new();
    let admin = fx.user("admin@example.com", Some(roles::ADMIN));
    let header = fx.bearer("admin@example.com", now());

    let ctx = fx
        .guard
        .check_at(Some(&header), &Requirement::all([MANAGE_ROLES]), now())
        .unwrap();

    assert_eq!(ctx.user_id(), admin.id);
    assert_eq!(ctx.email(), "admin@example.com");
    assert!(ctx.has(&MANAGE_ROLES));
    assert_eq!(ctx.permissions().len(), DEFAULT_PERMISSIONS.len());
}

#[test]
fn manager_cannot_delete_products() {
    let fx = Fixture::new();
    fx.user("manager@example.com", Some(roles::MANAGER));
    let header = fx.bearer("manager@example.com", now());

    let err = fx
        .guard
        .check_at(Some(&header), &Requirement::all([DELETE_PRODUCT]), now())
        .unwrap_err();

    match err {
        GuardError::Forbidden { message, missing } => {
            assert!(message.contains("delete_product"), "message: {message}");
            assert_eq!(missing, vec![DELETE_PRODUCT]);
        }
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[test]
fn all_mode_reports_exact_difference() {
    let fx = Fixture::new();
    fx.user("manager@example.com", Some(roles::MANAGER));
    let header = fx.bearer("manager@example.com", now());

    let req = Requirement::all([READ_PRODUCT, DELETE_USER, MANAGE_TABLES, READ_USER]);
    let err = fx.guard.check_at(Some(&header), &req, now()).unwrap_err();

    assert!(matches!(
        err,
        GuardError::Forbidden { ref missing, .. } if *missing == vec![DELETE_USER, MANAGE_TABLES]
    ));
}

#[test]
fn any_mode_needs_one_held_permission() {
    let fx = Fixture::new();
    fx.user("user@example.com", Some(roles::USER));
    let header = fx.bearer("user@example.com", now());

    assert!(fx
        .guard
        .check_at(Some(&header), &Requirement::any([MANAGE_ROLES, READ_PRODUCT]), now())
        .is_ok());
    assert!(matches!(
        fx.guard
            .check_at(Some(&header), &Requirement::any([MANAGE_ROLES, READ_USER]), now()),
        Err(GuardError::Forbidden { .. })
    ));
}

#[test]
fn missing_header_is_unauthenticated_even_without_requirements() {
    let fx = Fixture::new();
    assert!(matches!(
        fx.guard.check_at(None, &Requirement::authenticated(), now()),
        Err(GuardError::Unauthenticated(_))
    ));
}

#[test]
fn expired_token_is_unauthenticated() {
    let fx = Fixture::new();
    fx.user("admin@example.com", Some(roles::ADMIN));
    let header = fx.bearer("admin@example.com", now());

    let later = now() + Duration::minutes(31);
    assert!(matches!(
        fx.guard.check_at(Some(&header), &Requirement::authenticated(), later),
        Err(GuardError::Unauthenticated(_))
    ));
}

#[test]
fn token_from_another_key_is_unauthenticated() {
    let fx = Fixture::new();
    fx.user("admin@example.com", Some(roles::ADMIN));
    let forged = Hs256TokenCodec::new("attacker")
        .issue_at("admin@example.com", Duration::minutes(5), now())
        .unwrap();

    assert!(matches!(
        fx.guard
            .check_at(Some(&format!("Bearer {forged}")), &Requirement::authenticated(), now()),
        Err(GuardError::Unauthenticated(_))
    ));
}

#[test]
fn unknown_or_inactive_subject_is_unauthenticated() {
    let fx = Fixture::new();
    let header = fx.bearer("ghost@example.com", now());
    assert_eq!(
        fx.guard.check_at(Some(&header), &Requirement::authenticated(), now()),
        Err(GuardError::Unauthenticated("user not found".into()))
    );

    let user = fx.user("sleepy@example.com", Some(roles::ADMIN));
    fx.directory
        .update(user.id, UserPatch { is_active: Some(false), ..Default::default() })
        .unwrap();
    let header = fx.bearer("sleepy@example.com", now());
    assert_eq!(
        fx.guard.check_at(Some(&header), &Requirement::authenticated(), now()),
        Err(GuardError::Unauthenticated("inactive user".into()))
    );
}

#[test]
fn user_without_role_is_forbidden() {
    let fx = Fixture::new();
    fx.user("norole@example.com", None);
    let header = fx.bearer("norole@example.com", now());

    match fx.guard.check_at(Some(&header), &Requirement::authenticated(), now()) {
        Err(GuardError::Forbidden { message, .. }) => assert_eq!(message, "no role assigned"),
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[test]
fn permissions_are_cached_per_bucket_until_invalidated() {
    let fx = Fixture::new();
    let user = fx.user("u@example.com", Some(roles::USER));
    let header = fx.bearer("u@example.com", now());
    let req = Requirement::all([READ_USER]);

    assert!(fx.guard.check_at(Some(&header), &req, now()).is_err());
    assert!(fx.cache.contains(user.id, TimeBucket::containing(now())));

    fx.directory
        .update(user.id, UserPatch::assign_role(Some(roles::MANAGER)))
        .unwrap();

    // Still the cached `user` permissions within the same bucket.
    assert!(fx.guard.check_at(Some(&header), &req, now()).is_err());

    fx.cache.invalidate(user.id);
    assert!(fx.guard.check_at(Some(&header), &req, now()).is_ok());
}

#[test]
fn next_bucket_picks_up_role_changes() {
    let fx = Fixture::new();
    let user = fx.user("u@example.com", Some(roles::USER));
    let header = fx.bearer("u@example.com", now());
    let req = Requirement::all([READ_USER]);

    assert!(fx.guard.check_at(Some(&header), &req, now()).is_err());
    fx.directory
        .update(user.id, UserPatch::assign_role(Some(roles::MANAGER)))
        .unwrap();

    let next_minute = now() + Duration::seconds(TimeBucket::WIDTH_SECS);
    assert!(fx.guard.check_at(Some(&header), &req, next_minute).is_ok());
    assert!(!fx.cache.contains(user.id, TimeBucket::containing(now())));
}

#[test]
fn dangling_role_is_an_internal_fault() {
    let fx = Fixture::new();
    fx.user("odd@example.com", Some(Role::new("ghost")));
    let header = fx.bearer("odd@example.com", now());

    assert_eq!(
        fx.guard.check_at(Some(&header), &Requirement::authenticated(), now()),
        Err(GuardError::Internal)
    );
}

struct UnavailableDirectory;

impl UserDirectory for UnavailableDirectory {
    fn find_by_email(&self, _email: &str) -> Result<Option<User>, DirectoryError> {
        Err(DirectoryError::Unavailable("connection refused".into()))
    }

    fn find_by_id(&self, _id: UserId) -> Result<Option<User>, DirectoryError> {
        Err(DirectoryError::Unavailable("connection refused".into()))
    }

    fn create(&self, _user: NewUser) -> Result<User, DirectoryError> {
        Err(DirectoryError::Unavailable("connection refused".into()))
    }

    fn update(&self, _id: UserId, _patch: UserPatch) -> Result<Option<User>, DirectoryError> {
        Err(DirectoryError::Unavailable("connection refused".into()))
    }

    fn delete(&self, _id: UserId) -> Result<bool, DirectoryError> {
        Err(DirectoryError::Unavailable("connection refused".into()))
    }

    fn list(&self, _page: Page) -> Result<Vec<User>, DirectoryError> {
        Err(DirectoryError::Unavailable("connection refused".into()))
    }
}

#[test]
fn directory_failure_is_internal_and_not_leaked() {
    let codec = Arc::new(Hs256TokenCodec::new(SECRET));
    let guard = AuthorizationGuard::new(
        codec.clone(),
        Arc::new(UnavailableDirectory),
        Arc::new(InMemoryCatalog::seeded().unwrap()),
        Arc::new(PermissionCache::default()),
    );
    let token = codec.issue_at("a@example.com", Duration::minutes(5), now()).unwrap();

    let err = guard
        .check_at(Some(&format!("Bearer {token}")), &Requirement::authenticated(), now())
        .unwrap_err();
    assert_eq!(err, GuardError::Internal);
    assert!(!err.to_string().contains("connection refused"));
}

/// Directory whose next lookup returns the caller's current record, then demotes
/// that user to `user` (and drops their cached permissions) before the guard
/// gets to resolve permissions.
struct DemotedMidRequest {
    inner: Arc<InMemoryUserDirectory>,
    cache: Arc<PermissionCache>,
    armed: AtomicBool,
}

impl UserDirectory for DemotedMidRequest {
    fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let snapshot = self.inner.find_by_email(email)?;
        if let Some(user) = &snapshot {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.inner
                    .update(user.id, UserPatch::assign_role(Some(roles::USER)))?;
                self.cache.invalidate(user.id);
            }
        }
        Ok(snapshot)
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, DirectoryError> {
        self.inner.find_by_id(id)
    }

    fn create(&self, user: NewUser) -> Result<User, DirectoryError> {
        self.inner.create(user)
    }

    fn update(&self, id: UserId, patch: UserPatch) -> Result<Option<User>, DirectoryError> {
        self.inner.update(id, patch)
    }

    fn delete(&self, id: UserId) -> Result<bool, DirectoryError> {
        self.inner.delete(id)
    }

    fn list(&self, page: Page) -> Result<Vec<User>, DirectoryError> {
        self.inner.list(page)
    }
}

#[test]
fn demotion_during_an_in_flight_check_is_not_cached() {
    let codec = Arc::new(Hs256TokenCodec::new(SECRET));
    let inner = Arc::new(InMemoryUserDirectory::new());
    let cache = Arc::new(PermissionCache::new(16));
    let admin = inner
        .create(NewUser {
            email: "boss@example.com".into(),
            username: "boss".into(),
            hashed_password: "unused".into(),
            role: Some(roles::ADMIN),
        })
        .unwrap();
    let directory = Arc::new(DemotedMidRequest {
        inner: inner.clone(),
        cache: cache.clone(),
        armed: AtomicBool::new(true),
    });
    let guard = AuthorizationGuard::new(
        codec.clone(),
        directory,
        Arc::new(InMemoryCatalog::seeded().unwrap()),
        cache.clone(),
    );
    let token = codec.issue_at("boss@example.com", Duration::minutes(5), now()).unwrap();
    let header = format!("Bearer {token}");
    let req = Requirement::all([MANAGE_ROLES]);

    // The in-flight request read the admin record before the demotion landed.
    assert!(guard.check_at(Some(&header), &req, now()).is_ok());
    assert_eq!(
        inner.find_by_id(admin.id).unwrap().unwrap().role,
        Some(roles::USER)
    );

    // Same bucket: the admin permissions it loaded must not be served again.
    match guard.check_at(Some(&header), &req, now()) {
        Err(GuardError::Forbidden { missing, .. }) => assert_eq!(missing, vec![MANAGE_ROLES]),
        other => panic!("expected forbidden after demotion, got {other:?}"),
    }
    assert!(guard
        .check_at(Some(&header), &Requirement::all([READ_PRODUCT]), now())
        .is_ok());
}
