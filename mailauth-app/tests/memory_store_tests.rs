#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `InMemoryStore`.

use mailauth_app::adapters::InMemoryStore;
use mailauth_core::error::CoreError;
use mailauth_core::traits::{DomainRepository, SenderRepository};
use mailauth_core::types::{
    DnsOwnership, Domain, DomainName, DomainStatus, ProviderBindingUpdate, SenderIdentity,
};

fn domain(name: &str) -> Domain {
    Domain::new("acc-1", DomainName::parse(name).unwrap(), DnsOwnership::Manual)
}

#[tokio::test]
async fn duplicate_domain_per_account_is_rejected() {
    let store = InMemoryStore::new();
    store.create_domain(&domain("example.com")).await.unwrap();

    let err = store.create_domain(&domain("example.com")).await.unwrap_err();
    assert!(matches!(err, CoreError::DomainAlreadyExists { .. }));

    let other_account = Domain::new(
        "acc-2",
        DomainName::parse("example.com").unwrap(),
        DnsOwnership::Manual,
    );
    store.create_domain(&other_account).await.unwrap();
    assert_eq!(store.domain_count().await, 2);
}

#[tokio::test]
async fn terminal_domains_are_not_pending() {
    let store = InMemoryStore::new();
    let a = domain("a.example");
    let b = domain("b.example");
    store.create_domain(&a).await.unwrap();
    store.create_domain(&b).await.unwrap();
    store
        .set_domain_status(&b.id, DomainStatus::Failed)
        .await
        .unwrap();

    let pending = store.list_domains_pending_verification().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, a.id);
}

#[tokio::test]
async fn enabled_sender_blocks_domain_deletion() {
    let store = InMemoryStore::new();
    let d = domain("example.com");
    store.create_domain(&d).await.unwrap();
    let sender = SenderIdentity::new(d.id.as_str(), "news@example.com");
    store.create_sender(&sender).await.unwrap();

    let err = store.delete_domain(&d.id).await.unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(_)));

    assert!(store.disable_sender(&sender.id, "manual").await.unwrap());
    store.delete_domain(&d.id).await.unwrap();
    assert!(store.get_domain(&d.id).await.unwrap().is_none());
    assert!(store
        .find_sender_by_email("news@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn complaint_counter_and_disable_are_idempotent() {
    let store = InMemoryStore::new();
    let d = domain("example.com");
    store.create_domain(&d).await.unwrap();
    let sender = SenderIdentity::new(d.id.as_str(), "news@example.com");
    store.create_sender(&sender).await.unwrap();

    for expected in 1..=3 {
        let outcome = store.increment_sender_complaint(&sender.id).await.unwrap();
        assert_eq!(outcome.new_count, expected);
    }
    assert!(store.disable_sender(&sender.id, "first").await.unwrap());
    assert!(!store.disable_sender(&sender.id, "second").await.unwrap());

    let stored = store
        .find_sender_by_email("news@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.disabled_reason.as_deref(), Some("first"));
    assert!(store.increment_sender_complaint(&sender.id).await.unwrap().disabled);

    let err = store.increment_sender_complaint("missing").await.unwrap_err();
    assert!(matches!(err, CoreError::SenderNotFound(_)));
}

#[tokio::test]
async fn provider_binding_is_created_once_and_updated_partially() {
    let store = InMemoryStore::new();
    let d = domain("example.com");
    store.create_domain(&d).await.unwrap();

    let binding = store.get_or_create_provider_binding(&d.id).await.unwrap();
    assert!(binding.reference.is_none());

    store
        .update_provider_binding(
            &d.id,
            &ProviderBindingUpdate {
                reference: Some("brevo-1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    store
        .update_provider_binding(
            &d.id,
            &ProviderBindingUpdate {
                provider_verified: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let binding = store.get_or_create_provider_binding(&d.id).await.unwrap();
    assert_eq!(binding.reference.as_deref(), Some("brevo-1"));
    assert!(binding.provider_verified);

    let err = store
        .get_or_create_provider_binding("missing")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DomainNotFound(_)));
}
