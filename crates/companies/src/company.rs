use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{CompanyId, DomainResult, Entity, Resource, error::require_non_blank};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    /// Business code (e.g. tax code).
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyDraft {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl Entity for Company {
    type Id = CompanyId;

    fn id(&self) -> &CompanyId {
        &self.id
    }
}

impl Resource for Company {
    type Draft = CompanyDraft;
    type Patch = CompanyPatch;

    const KIND: &'static str = "company";

    fn create(id: CompanyId, draft: CompanyDraft, now: DateTime<Utc>) -> DomainResult<Self> {
        require_non_blank("code", &draft.code)?;
        require_non_blank("name", &draft.name)?;
        Ok(Self {
            id,
            code: draft.code.trim().to_string(),
            name: draft.name.trim().to_string(),
            address: draft.address,
            phone: draft.phone,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, patch: CompanyPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(code) = &patch.code {
            require_non_blank("code", code)?;
        }
        if let Some(name) = &patch.name {
            require_non_blank("name", name)?;
        }

        if let Some(code) = patch.code {
            self.code = code.trim().to_string();
        }
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if patch.address.is_some() {
            self.address = patch.address;
        }
        if patch.phone.is_some() {
            self.phone = patch.phone;
        }
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected_without_mutation() {
        let now = Utc::now();
        let mut company = Company::create(
            CompanyId::new(),
            CompanyDraft {
                code: "0101".into(),
                name: "Acme".into(),
                address: None,
                phone: None,
            },
            now,
        )
        .unwrap();

        let patch = CompanyPatch {
            code: Some("0202".into()),
            name: Some("   ".into()),
            ..Default::default()
        };
        assert!(company.apply(patch, now).is_err());
        assert_eq!(company.code, "0101");
    }
}
