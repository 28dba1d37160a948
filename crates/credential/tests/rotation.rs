//! Integration tests for the rotation coordinator against in-memory seams

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use keygate_credential::core::{AuthMode, SecretString, Slot, StoreError, TenantConfig, TenantId};
use keygate_credential::providers::{MemoryGateway, MemorySecretStore, StaticTenantDirectory};
use keygate_credential::rotation::{
    RotatedSlot, RotationConfig, RotationCoordinator, RotationError, RotationMetadata,
    RotationOutcome,
};
use keygate_credential::traits::{GatewayCredentials, SecretStore};

fn tenant(slug: &str) -> TenantId {
    TenantId::new(slug).unwrap()
}

struct Fixture {
    store: Arc<MemorySecretStore>,
    gateway: Arc<MemoryGateway>,
    coordinator: RotationCoordinator,
}

fn fixture_with_config(slugs: &[&str], config: RotationConfig) -> Fixture {
    let store = Arc::new(MemorySecretStore::new());
    let gateway = Arc::new(MemoryGateway::new());
    let mut directory = StaticTenantDirectory::new();
    for slug in slugs {
        let id = tenant(slug);
        gateway.register(id.clone());
        directory.insert(id, TenantConfig::subscription_key());
    }
    let coordinator = RotationCoordinator::new(
        store.clone(),
        gateway.clone(),
        Arc::new(directory),
        config,
    );
    Fixture {
        store,
        gateway,
        coordinator,
    }
}

fn fixture(slugs: &[&str]) -> Fixture {
    fixture_with_config(slugs, RotationConfig::default())
}

async fn stored_key(store: &MemorySecretStore, tenant: &TenantId, slot: Slot) -> String {
    store
        .get_secret(&tenant.key_secret_name(slot))
        .await
        .unwrap()
        .expect("key secret should exist")
        .expose_secret(str::to_owned)
}

#[tokio::test]
async fn first_rotation_initializes_metadata_and_rotates_secondary() {
    let fx = fixture(&["acme"]);
    let acme = tenant("acme");

    let outcome = fx.coordinator.rotate_tenant(&acme, false).await.unwrap();
    let meta = outcome.metadata();

    assert!(outcome.rotated());
    assert_eq!(meta.last_rotated_slot, RotatedSlot::Secondary);
    assert_eq!(meta.safe_slot, Slot::Primary);
    assert_eq!(meta.rotation_number, 1);
    assert!(meta.last_rotation_at.is_some());
    assert!(meta.next_rotation_at.is_some());

    // Store now holds the key the gateway serves for the rotated slot.
    let persisted = stored_key(&fx.store, &acme, Slot::Secondary).await;
    let live = fx.gateway.keys(&acme).await.unwrap();
    assert!(live.secondary.ct_eq(&persisted));
}

#[tokio::test]
async fn worked_example_from_number_five_to_six() {
    let fx = fixture(&["acme"]);
    let acme = tenant("acme");

    // Seed metadata: safe slot primary, five rotations behind us, cooldown
    // already expired.
    let mut meta = RotationMetadata::initial();
    meta.rotation_number = 5;
    meta.last_rotated_slot = RotatedSlot::Secondary;
    fx.store
        .put_secret(
            &acme.metadata_secret_name(),
            &SecretString::new(serde_json::to_string(&meta).unwrap()),
        )
        .await
        .unwrap();

    let outcome = fx.coordinator.rotate_tenant(&acme, false).await.unwrap();
    let after = outcome.metadata();
    assert_eq!(after.last_rotated_slot, RotatedSlot::Secondary);
    assert_eq!(after.safe_slot, Slot::Primary);
    assert_eq!(after.rotation_number, 6);
}

#[tokio::test]
async fn safe_slot_differs_from_target_across_many_cycles() {
    let fx = fixture(&["acme"]);
    let acme = tenant("acme");

    let mut previous_number = 0;
    for _ in 0..8 {
        let outcome = fx.coordinator.rotate_tenant(&acme, true).await.unwrap();
        let meta = outcome.metadata();
        let rotated = match meta.last_rotated_slot {
            RotatedSlot::Primary => Slot::Primary,
            RotatedSlot::Secondary => Slot::Secondary,
            RotatedSlot::None => panic!("cycle must record a rotated slot"),
        };
        assert_ne!(meta.safe_slot, rotated);
        assert_eq!(meta.rotation_number, previous_number + 1);
        previous_number = meta.rotation_number;
    }
}

#[tokio::test]
async fn forced_retry_rekeys_same_slot_with_distinct_values() {
    let fx = fixture(&["acme"]);
    let acme = tenant("acme");

    let first = fx.coordinator.rotate_tenant(&acme, true).await.unwrap();
    let key_one = stored_key(&fx.store, &acme, Slot::Secondary).await;

    let second = fx.coordinator.rotate_tenant(&acme, true).await.unwrap();
    let key_two = stored_key(&fx.store, &acme, Slot::Secondary).await;

    // Same target slot both times, two distinct key values, counter moved
    // by exactly one per call.
    assert_eq!(
        first.metadata().last_rotated_slot,
        second.metadata().last_rotated_slot
    );
    assert_ne!(key_one, key_two);
    assert_eq!(first.metadata().rotation_number, 1);
    assert_eq!(second.metadata().rotation_number, 2);
}

#[tokio::test]
async fn unforced_rotation_inside_cooldown_is_a_noop() {
    let fx = fixture(&["acme"]);
    let acme = tenant("acme");

    let first = fx.coordinator.rotate_tenant(&acme, false).await.unwrap();
    assert!(first.rotated());
    let key_after_first = stored_key(&fx.store, &acme, Slot::Secondary).await;

    let second = fx.coordinator.rotate_tenant(&acme, false).await.unwrap();
    assert!(matches!(second, RotationOutcome::Skipped(_)));
    assert_eq!(second.metadata().rotation_number, 1);
    assert_eq!(
        stored_key(&fx.store, &acme, Slot::Secondary).await,
        key_after_first
    );
}

#[tokio::test]
async fn distinct_tenants_rotate_independently_and_never_share_keys() {
    let fx = fixture(&["acme", "globex"]);
    let acme = tenant("acme");
    let globex = tenant("globex");

    let (a, b) = tokio::join!(
        fx.coordinator.rotate_tenant(&acme, true),
        fx.coordinator.rotate_tenant(&globex, true),
    );
    a.unwrap();
    b.unwrap();

    let acme_keys = fx.gateway.keys(&acme).await.unwrap();
    let globex_keys = fx.gateway.keys(&globex).await.unwrap();
    for acme_key in [&acme_keys.primary, &acme_keys.secondary] {
        let value = acme_key.expose_secret(str::to_owned);
        assert!(!globex_keys.primary.ct_eq(&value));
        assert!(!globex_keys.secondary.ct_eq(&value));
    }
}

#[tokio::test]
async fn concurrent_cycles_for_one_tenant_are_serialized() {
    let fx = fixture(&["acme"]);
    let acme = tenant("acme");

    let (a, b) = tokio::join!(
        fx.coordinator.rotate_tenant(&acme, true),
        fx.coordinator.rotate_tenant(&acme, true),
    );
    let mut numbers = vec![
        a.unwrap().metadata().rotation_number,
        b.unwrap().metadata().rotation_number,
    ];
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2]);
}

#[tokio::test]
async fn ineligible_tenants_are_refused() {
    let store = Arc::new(MemorySecretStore::new());
    let gateway = Arc::new(MemoryGateway::new());
    let jwt = tenant("jwt-tenant");
    let off = tenant("rotation-off");
    gateway.register(jwt.clone());
    gateway.register(off.clone());
    let directory = StaticTenantDirectory::new()
        .with_tenant(
            jwt.clone(),
            TenantConfig {
                auth_mode: AuthMode::Jwt,
                rotation_enabled: true,
            },
        )
        .with_tenant(
            off.clone(),
            TenantConfig {
                auth_mode: AuthMode::SubscriptionKey,
                rotation_enabled: false,
            },
        );
    let coordinator = RotationCoordinator::new(
        store,
        gateway,
        Arc::new(directory),
        RotationConfig::default(),
    );

    assert!(matches!(
        coordinator.rotate_tenant(&jwt, true).await,
        Err(RotationError::Ineligible { .. })
    ));
    assert!(matches!(
        coordinator.rotate_tenant(&off, true).await,
        Err(RotationError::Ineligible { .. })
    ));
    assert!(matches!(
        coordinator.rotate_tenant(&tenant("ghost"), true).await,
        Err(RotationError::UnknownTenant { .. })
    ));
}

#[tokio::test]
async fn globally_disabled_rotation_refuses_every_cycle() {
    let config = RotationConfig {
        enabled: false,
        ..RotationConfig::default()
    };
    let fx = fixture_with_config(&["acme"], config);
    assert!(matches!(
        fx.coordinator.rotate_tenant(&tenant("acme"), true).await,
        Err(RotationError::Disabled)
    ));
}

#[tokio::test]
async fn sweep_reports_per_tenant_outcomes_and_skips_ineligible() {
    let store = Arc::new(MemorySecretStore::new());
    let gateway = Arc::new(MemoryGateway::new());
    let acme = tenant("acme");
    let jwt = tenant("jwt-tenant");
    gateway.register(acme.clone());
    gateway.register(jwt.clone());
    let directory = StaticTenantDirectory::new()
        .with_tenant(acme.clone(), TenantConfig::subscription_key())
        .with_tenant(
            jwt,
            TenantConfig {
                auth_mode: AuthMode::Jwt,
                rotation_enabled: true,
            },
        );
    let coordinator = RotationCoordinator::new(
        store,
        gateway,
        Arc::new(directory),
        RotationConfig::default(),
    );

    let results = coordinator.rotate_all(false).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, acme);
    assert!(results[0].1.as_ref().unwrap().rotated());
}

/// Store wrapper that fails writes on demand, for the partial-failure window
struct FlakyStore {
    inner: MemorySecretStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemorySecretStore::new(),
            fail_writes: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl SecretStore for FlakyStore {
    async fn get_secret(&self, name: &str) -> Result<Option<SecretString>, StoreError> {
        self.inner.get_secret(name).await
    }

    async fn put_secret(&self, name: &str, value: &SecretString) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout {
                duration: std::time::Duration::from_secs(5),
            });
        }
        self.inner.put_secret(name, value).await
    }

    async fn delete_secret(&self, name: &str) -> Result<(), StoreError> {
        self.inner.delete_secret(name).await
    }

    fn uri(&self) -> &str {
        self.inner.uri()
    }
}

#[tokio::test]
async fn partial_failure_is_recovered_by_retrying_the_cycle() {
    let store = Arc::new(FlakyStore::new());
    let gateway = Arc::new(MemoryGateway::new());
    let acme = tenant("acme");
    gateway.register(acme.clone());
    let directory =
        StaticTenantDirectory::new().with_tenant(acme.clone(), TenantConfig::subscription_key());
    let coordinator = RotationCoordinator::new(
        store.clone(),
        gateway.clone(),
        Arc::new(directory),
        RotationConfig::default(),
    );

    // First attempt: gateway re-keys, store write fails.
    store.fail_writes.store(true, Ordering::SeqCst);
    let err = coordinator.rotate_tenant(&acme, true).await.unwrap_err();
    assert!(matches!(err, RotationError::KeyPersist { .. }));
    assert!(err.is_recoverable());

    // Metadata was never advanced, so the retry recomputes the same target.
    store.fail_writes.store(false, Ordering::SeqCst);
    let outcome = coordinator.rotate_tenant(&acme, true).await.unwrap();
    let meta = outcome.metadata();
    assert_eq!(meta.rotation_number, 1);
    assert_eq!(meta.last_rotated_slot, RotatedSlot::Secondary);

    // Store and gateway agree again after the retry.
    let persisted = store
        .get_secret(&acme.key_secret_name(Slot::Secondary))
        .await
        .unwrap()
        .unwrap()
        .expose_secret(str::to_owned);
    let live = gateway.keys(&acme).await.unwrap();
    assert!(live.secondary.ct_eq(&persisted));
}
