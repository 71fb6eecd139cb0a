//! End-to-end flow: register a provider, construct it through the registry,
//! and browse vaults/secrets through the capability trait.

use polyvault_core::{
    CancellationToken, MockProvider, Provider, ProviderError, ProviderRegistry, ProviderSettings,
};

#[tokio::test]
async fn registered_mock_round_trips_through_the_trait() {
    let registry = ProviderRegistry::new();
    registry.register("mock", |_settings| {
        Ok(Box::new(MockProvider::new("mock").with_secret("v1", "s1", "hello"))
            as Box<dyn Provider>)
    });

    let provider = registry
        .get_provider("mock", &ProviderSettings::new())
        .unwrap();
    let cancel = CancellationToken::new();

    let vaults = provider.list_vaults(&cancel).await.unwrap();
    assert_eq!(vaults.len(), 1);
    assert_eq!(vaults[0].name, "v1");

    let secrets = provider.list_secrets(&cancel, "v1").await.unwrap();
    assert_eq!(secrets.len(), 1);
    assert_eq!(secrets[0].name, "s1");
    assert!(secrets[0].enabled);

    let secret = provider.get_secret(&cancel, "v1", "s1").await.unwrap();
    assert_eq!(secret.name, "s1");
    assert_eq!(secret.value, "hello");
}

#[tokio::test]
async fn settings_bag_reaches_the_constructor() {
    let registry = ProviderRegistry::new();
    registry.register("echo", |settings: &ProviderSettings| {
        let name = settings.require("echo", "name")?.to_string();
        Ok(Box::new(MockProvider::new(name)) as Box<dyn Provider>)
    });

    let provider = registry
        .get_provider("echo", &ProviderSettings::new().with("name", "configured"))
        .unwrap();
    assert_eq!(provider.name(), "configured");

    let err = registry
        .get_provider("echo", &ProviderSettings::new())
        .unwrap_err();
    assert!(matches!(err, ProviderError::Config(_)));
}
