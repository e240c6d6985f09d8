use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use parking_lot::RwLock;

use bazaar_auth::user::normalize_email;
use bazaar_auth::{DirectoryError, NewUser, User, UserDirectory, UserPatch};
use bazaar_core::{DomainError, Page, UserId};

#[derive(Default)]
struct Users {
    next_seq: u64,
    by_seq: BTreeMap<u64, User>,
    seq_of: HashMap<UserId, u64>,
}

impl Users {
    fn find(&self, pred: impl Fn(&User) -> bool) -> Option<&User> {
        self.by_seq.values().find(|u| pred(u))
    }

    fn ensure_unique(&self, email: &str, username: &str, except: Option<UserId>) -> Result<(), DomainError> {
        let others = |u: &&User| Some(u.id) != except;
        if self.by_seq.values().filter(others).any(|u| u.email == email) {
            return Err(DomainError::conflict("email already registered"));
        }
        if self.by_seq.values().filter(others).any(|u| u.username == username) {
            return Err(DomainError::conflict("username already taken"));
        }
        Ok(())
    }
}

/// In-memory user directory for tests/dev.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    inner: RwLock<Users>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let email = normalize_email(email);
        Ok(self.inner.read().find(|u| u.email == email).cloned())
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, DirectoryError> {
        let users = self.inner.read();
        Ok(users
            .seq_of
            .get(&id)
            .and_then(|seq| users.by_seq.get(seq))
            .cloned())
    }

    fn create(&self, user: NewUser) -> Result<User, DirectoryError> {
        let user = user.normalized()?;

        let mut users = self.inner.write();
        users.ensure_unique(&user.email, &user.username, None)?;

        let now = Utc::now();
        let record = User {
            id: UserId::new(),
            email: user.email,
            username: user.username,
            hashed_password: user.hashed_password,
            is_active: true,
            role: user.role,
            created_at: now,
            updated_at: now,
        };

        let seq = users.next_seq;
        users.next_seq += 1;
        users.seq_of.insert(record.id, seq);
        users.by_seq.insert(seq, record.clone());
        tracing::info!(user_id = %record.id, "created user");
        Ok(record)
    }

    fn update(&self, id: UserId, patch: UserPatch) -> Result<Option<User>, DirectoryError> {
        let mut users = self.inner.write();
        let Some(seq) = users.seq_of.get(&id).copied() else {
            return Ok(None);
        };
        let Some(current) = users.by_seq.get(&seq) else {
            return Ok(None);
        };

        let next = patch.apply_to(current, Utc::now())?;
        users.ensure_unique(&next.email, &next.username, Some(id))?;
        users.by_seq.insert(seq, next.clone());
        Ok(Some(next))
    }

    fn delete(&self, id: UserId) -> Result<bool, DirectoryError> {
        let mut users = self.inner.write();
        Ok(match users.seq_of.remove(&id) {
            Some(seq) => users.by_seq.remove(&seq).is_some(),
            None => false,
        })
    }

    fn list(&self, page: Page) -> Result<Vec<User>, DirectoryError> {
        Ok(page.slice(self.inner.read().by_seq.values().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_auth::roles;

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            hashed_password: "hash".to_string(),
            role: Some(roles::USER),
        }
    }

    #[test]
    fn email_lookup_is_case_insensitive() {
        let dir = InMemoryUserDirectory::new();
        let created = dir.create(new_user("Alice@Example.com", "alice")).unwrap();

        let found = dir.find_by_email("  alice@EXAMPLE.com").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(found.is_active);
    }

    #[test]
    fn duplicate_email_or_username_conflicts() {
        let dir = InMemoryUserDirectory::new();
        dir.create(new_user("a@example.com", "alice")).unwrap();

        let err = dir.create(new_user("A@example.com", "other")).unwrap_err();
        assert!(matches!(err, DirectoryError::Domain(DomainError::Conflict(_))));

        let err = dir.create(new_user("b@example.com", "alice")).unwrap_err();
        assert!(matches!(err, DirectoryError::Domain(DomainError::Conflict(_))));
    }

    #[test]
    fn update_checks_uniqueness_against_other_users_only() {
        let dir = InMemoryUserDirectory::new();
        let a = dir.create(new_user("a@example.com", "alice")).unwrap();
        dir.create(new_user("b@example.com", "bob")).unwrap();

        // Re-saving own email is fine.
        let same = UserPatch {
            email: Some("a@example.com".into()),
            ..Default::default()
        };
        assert!(dir.update(a.id, same).unwrap().is_some());

        let taken = UserPatch {
            username: Some("bob".into()),
            ..Default::default()
        };
        assert!(dir.update(a.id, taken).is_err());
        assert_eq!(dir.find_by_id(a.id).unwrap().unwrap().username, "alice");
    }

    #[test]
    fn role_can_be_assigned_and_cleared() {
        let dir = InMemoryUserDirectory::new();
        let a = dir.create(new_user("a@example.com", "alice")).unwrap();

        let updated = dir.update(a.id, UserPatch::assign_role(Some(roles::MANAGER))).unwrap().unwrap();
        assert_eq!(updated.role, Some(roles::MANAGER));

        let cleared = dir.update(a.id, UserPatch::assign_role(None)).unwrap().unwrap();
        assert_eq!(cleared.role, None);
    }
}
