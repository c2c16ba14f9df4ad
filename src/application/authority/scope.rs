// src/application/authority/scope.rs
use super::TokenAuthority;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::ScopeSet;

impl TokenAuthority {
    /// Absent or blank scope resolves to the default scope set; an explicit
    /// scope is honored only if every name exists.
    pub(super) async fn resolve_scope(&self, requested: Option<&str>) -> ApplicationResult<String> {
        let requested = requested.map(ScopeSet::parse).filter(|set| !set.is_empty());
        match requested {
            None => self.storage.get_default_scope().await,
            Some(set) => {
                self.ensure_scopes_exist(&set).await?;
                Ok(set.to_string())
            }
        }
    }

    pub(super) async fn ensure_scopes_exist(&self, set: &ScopeSet) -> ApplicationResult<()> {
        for name in set.iter() {
            if self.storage.get_scope(name).await?.is_none() {
                return Err(ApplicationError::invalid_scope(format!(
                    "unknown scope: {name}"
                )));
            }
        }
        Ok(())
    }
}
