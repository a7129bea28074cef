//! API-key storage in the OS keychain, plus the provider -> service
//! mapping shared by the identify, models, and health commands.

use keyring::Entry;
use tracing::{info, warn};

const KEYRING_USER: &str = "floralens";

/// Keyring service id for a provider. `None` for unknown providers.
pub(crate) fn provider_service(provider: &str) -> Option<&'static str> {
    match provider {
        "zhipu" => Some("floralens-zhipu-api"),
        "claude" => Some("floralens-claude-api"),
        "openai" => Some("floralens-openai-api"),
        "openrouter" => Some("floralens-openrouter-api"),
        _ => None,
    }
}

/// Read the API key for a provider, with a settings hint when missing.
pub(crate) fn lookup_api_key(provider: &str) -> Result<String, String> {
    let service = provider_service(provider)
        .ok_or_else(|| format!("Unknown AI provider: {provider}"))?;
    let entry = Entry::new(service, KEYRING_USER).map_err(|e| e.to_string())?;
    match entry.get_password() {
        Ok(key) => Ok(key),
        Err(keyring::Error::NoEntry) => Err(format!(
            "No API key configured for '{provider}'. Please set it in Settings."
        )),
        Err(e) => Err(format!("Failed to read API key for '{provider}': {e}")),
    }
}

/// Whether a key is present for a provider (health check).
pub(crate) fn api_key_set(provider: &str) -> bool {
    provider_service(provider)
        .and_then(|service| Entry::new(service, KEYRING_USER).ok())
        .and_then(|entry| entry.get_password().ok())
        .is_some()
}

#[tauri::command]
pub fn set_api_key(service: &str, key: &str) -> Result<(), String> {
    info!("Setting API key for service: {}", service);
    let entry = Entry::new(service, KEYRING_USER).map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", service, e);
        e.to_string()
    })?;
    entry.set_password(key).map_err(|e| {
        warn!("Failed to set password for {}: {}", service, e);
        e.to_string()
    })
}

#[tauri::command]
pub fn get_api_key(service: &str) -> Result<Option<String>, String> {
    info!("Getting API key for service: {}", service);
    let entry = Entry::new(service, KEYRING_USER).map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", service, e);
        e.to_string()
    })?;
    match entry.get_password() {
        Ok(password) => Ok(Some(password)),
        Err(keyring::Error::NoEntry) => {
            info!("No API key found for service: {}", service);
            Ok(None)
        }
        Err(e) => {
            warn!("Failed to get password for {}: {}", service, e);
            Err(e.to_string())
        }
    }
}

#[tauri::command]
pub fn delete_api_key(service: &str) -> Result<(), String> {
    info!("Deleting API key for service: {}", service);
    let entry = Entry::new(service, KEYRING_USER).map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", service, e);
        e.to_string()
    })?;
    entry.delete_credential().map_err(|e| {
        warn!("Failed to delete credential for {}: {}", service, e);
        e.to_string()
    })
}
