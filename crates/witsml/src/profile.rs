// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server profiles and the store they are kept in.
//!
//! A [`ServerProfile`] is what the transport needs to reach a WITSML store:
//! the endpoint URL and optional basic-auth credentials. Profiles are kept
//! by an external [`ProfileStore`]; [`MemoryProfileStore`] is the in-process
//! implementation.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, WitsmlResult};

// =============================================================================
// ServerProfile
// =============================================================================

/// Connection details of one WITSML store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProfile {
    /// Opaque identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Store endpoint (`https://host/witsml/store`).
    pub url: String,
    /// Basic-auth user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Basic-auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ServerProfile {
    /// Creates a profile without credentials.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets basic-auth credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Host part of the URL, used as the `host` metric label.
    pub fn host(&self) -> WitsmlResult<String> {
        let url = reqwest::Url::parse(&self.url)
            .map_err(|e| ConfigurationError::invalid_value("server.url", e.to_string()))?;
        url.host_str()
            .map(|h| match url.port() {
                Some(port) => format!("{}:{}", h, port),
                None => h.to_string(),
            })
            .ok_or_else(|| ConfigurationError::invalid_value("server.url", "URL has no host").into())
    }

    /// Validates the profile.
    pub fn validate(&self) -> WitsmlResult<()> {
        if self.url.is_empty() {
            return Err(ConfigurationError::missing_field("server.url").into());
        }
        let scheme = self.url.split("://").next().unwrap_or_default();
        if scheme != "http" && scheme != "https" {
            return Err(
                ConfigurationError::invalid_value("server.url", "scheme must be http or https").into(),
            );
        }
        self.host()?;
        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigurationError::missing_field("server.username").into());
        }
        Ok(())
    }
}

impl fmt::Debug for ServerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerProfile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

// =============================================================================
// ProfileStore
// =============================================================================

/// Storage of server profiles keyed by id.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetches a profile.
    async fn get(&self, id: &str) -> WitsmlResult<Option<ServerProfile>>;

    /// Adds a profile. Fails if the id is taken.
    async fn create(&self, profile: ServerProfile) -> WitsmlResult<()>;

    /// Replaces a profile. Fails if the id is unknown.
    async fn update(&self, profile: ServerProfile) -> WitsmlResult<()>;

    /// Removes a profile, returning whether it existed.
    async fn delete(&self, id: &str) -> WitsmlResult<bool>;
}

/// In-process profile store.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, ServerProfile>>,
}

impl MemoryProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of profiles.
    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    /// Returns `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, id: &str) -> WitsmlResult<Option<ServerProfile>> {
        Ok(self.profiles.read().get(id).cloned())
    }

    async fn create(&self, profile: ServerProfile) -> WitsmlResult<()> {
        profile.validate()?;
        let mut profiles = self.profiles.write();
        if profiles.contains_key(&profile.id) {
            return Err(ConfigurationError::invalid_value(
                "profile.id",
                format!("profile '{}' already exists", profile.id),
            )
            .into());
        }
        profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn update(&self, profile: ServerProfile) -> WitsmlResult<()> {
        profile.validate()?;
        let mut profiles = self.profiles.write();
        match profiles.get_mut(&profile.id) {
            Some(existing) => {
                *existing = profile;
                Ok(())
            }
            None => Err(ConfigurationError::invalid_value(
                "profile.id",
                format!("profile '{}' does not exist", profile.id),
            )
            .into()),
        }
    }

    async fn delete(&self, id: &str) -> WitsmlResult<bool> {
        Ok(self.profiles.write().remove(id).is_some())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_includes_explicit_port() {
        let profile = ServerProfile::new("a", "https://store.example.com:8443/witsml/store");
        assert_eq!(profile.host().unwrap(), "store.example.com:8443");
        let profile = ServerProfile::new("b", "http://store.example.com/witsml");
        assert_eq!(profile.host().unwrap(), "store.example.com");
    }

    #[test]
    fn test_debug_redacts_password() {
        let profile = ServerProfile::new("a", "https://h/s").with_credentials("user", "secret");
        let debug = format!("{:?}", profile);
        assert!(debug.contains("user"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_validate() {
        assert!(ServerProfile::new("a", "ftp://h/s").validate().is_err());
        assert!(ServerProfile::new("a", "").validate().is_err());
        assert!(ServerProfile::new("a", "https://h/s").validate().is_ok());
    }

    #[tokio::test]
    async fn test_memory_store_crud() {
        let store = MemoryProfileStore::new();
        let profile = ServerProfile::new("rig-7", "https://h/s");
        store.create(profile.clone()).await.unwrap();
        assert!(store.create(profile.clone()).await.is_err());

        store
            .update(profile.clone().with_name("Rig 7"))
            .await
            .unwrap();
        assert_eq!(store.get("rig-7").await.unwrap().unwrap().name, "Rig 7");

        assert!(store.delete("rig-7").await.unwrap());
        assert!(!store.delete("rig-7").await.unwrap());
        assert!(store.update(profile).await.is_err());
        assert!(store.is_empty());
    }
}
