//! End-to-end ledger scenarios over the in-process store and auth provider.

use std::sync::Arc;
use std::time::Duration;

use debtbook_client::{LocalAuthProvider, MemoryLedgerStore};
use debtbook_core::ledger::{
    ControllerSettings, Direction, EntryStatus, LedgerController, LedgerError, ReconcilePolicy,
    StoreError, ValidationError,
};
use debtbook_core::session::{AuthError, Subscription};
use debtbook_shared::TokenConfig;
use rstest::rstest;
use rust_decimal_macros::dec;

const ANNA: (&str, &str) = ("anna@example.com", "hunter2");
const BEN: (&str, &str) = ("ben@example.com", "correct horse");

struct Harness {
    controller: LedgerController,
    store: Arc<MemoryLedgerStore>,
    auth: LocalAuthProvider,
    subscription: Option<Subscription>,
}

impl Harness {
    async fn signed_in(reconcile: ReconcilePolicy) -> Self {
        Self::with_ttl(reconcile, 3600).await
    }

    async fn with_ttl(reconcile: ReconcilePolicy, ttl: i64) -> Self {
        let store = Arc::new(MemoryLedgerStore::new());
        let auth = LocalAuthProvider::new(TokenConfig {
            secret: "scenario-secret".to_string(),
            session_ttl_secs: ttl,
        });
        auth.register(ANNA.0, ANNA.1).unwrap();
        auth.register(BEN.0, BEN.1).unwrap();

        let controller = LedgerController::new(
            store.clone(),
            ControllerSettings {
                reconcile,
                ..ControllerSettings::default()
            },
        );
        let subscription = Some(controller.bind(&auth));
        controller.sign_in(&auth, ANNA.0, ANNA.1).await.unwrap();

        Self {
            controller,
            store,
            auth,
            subscription,
        }
    }
}

#[rstest]
#[case(ReconcilePolicy::LocalPatch)]
#[case(ReconcilePolicy::FullReload)]
#[tokio::test]
async fn test_partial_payments_settle_entry(#[case] reconcile: ReconcilePolicy) {
    let h = Harness::signed_in(reconcile).await;

    let entry = h
        .controller
        .add_entry("Anna", dec!(100), Direction::OwedToUser)
        .await
        .unwrap();
    assert_eq!(entry.paid_amount, dec!(0));
    assert_eq!(entry.status, EntryStatus::Open);
    assert_eq!(h.controller.totals().owed_to_user, dec!(100));

    let entry = h.controller.add_payment(entry.id, dec!(40)).await.unwrap();
    assert_eq!(entry.paid_amount, dec!(40));
    assert_eq!(entry.status, EntryStatus::Open);
    assert_eq!(h.controller.totals().owed_to_user, dec!(60));

    let entry = h.controller.add_payment(entry.id, dec!(60)).await.unwrap();
    assert_eq!(entry.paid_amount, dec!(100));
    assert_eq!(entry.status, EntryStatus::Paid);
    assert_eq!(h.controller.totals().owed_to_user, dec!(0));

    assert_eq!(h.store.rows(), h.controller.entries());
}

#[rstest]
#[case(ReconcilePolicy::LocalPatch)]
#[case(ReconcilePolicy::FullReload)]
#[tokio::test]
async fn test_mark_paid_twice(#[case] reconcile: ReconcilePolicy) {
    let h = Harness::signed_in(reconcile).await;
    let entry = h
        .controller
        .add_entry("Carl", dec!(50), Direction::OwedByUser)
        .await
        .unwrap();
    assert_eq!(h.controller.totals().owed_by_user, dec!(50));

    let first = h.controller.mark_paid(entry.id).await.unwrap();
    let snapshot = h.controller.entries();
    let second = h.controller.mark_paid(entry.id).await.unwrap();

    assert_eq!(first.paid_amount, dec!(50));
    assert_eq!(first.status, EntryStatus::Paid);
    assert_eq!(first, second);
    assert_eq!(h.controller.entries(), snapshot);
    assert_eq!(h.controller.totals().owed_by_user, dec!(0));
}

#[rstest]
#[case(ReconcilePolicy::LocalPatch)]
#[case(ReconcilePolicy::FullReload)]
#[tokio::test]
async fn test_entries_newest_first(#[case] reconcile: ReconcilePolicy) {
    let h = Harness::signed_in(reconcile).await;
    for name in ["first", "second", "third"] {
        h.controller
            .add_entry(name, dec!(1), Direction::OwedToUser)
            .await
            .unwrap();
    }

    let names: Vec<String> = h
        .controller
        .entries()
        .into_iter()
        .map(|e| e.counterparty)
        .collect();
    assert_eq!(names, ["third", "second", "first"]);

    h.controller.load().await.unwrap();
    let reloaded: Vec<String> = h
        .controller
        .entries()
        .into_iter()
        .map(|e| e.counterparty)
        .collect();
    assert_eq!(reloaded, names);
}

#[tokio::test]
async fn test_sign_out_clears_state() {
    let h = Harness::signed_in(ReconcilePolicy::LocalPatch).await;
    let entry = h
        .controller
        .add_entry("Anna", dec!(10), Direction::OwedToUser)
        .await
        .unwrap();

    h.controller.sign_out(&h.auth).await.unwrap();

    assert!(!h.controller.is_authenticated());
    assert!(h.controller.entries().is_empty());
    assert_eq!(
        h.controller
            .add_entry("Ben", dec!(5), Direction::OwedToUser)
            .await,
        Err(LedgerError::Unauthenticated)
    );
    assert_eq!(h.controller.load().await, Err(LedgerError::Unauthenticated));

    h.controller.sign_in(&h.auth, ANNA.0, ANNA.1).await.unwrap();
    assert_eq!(h.controller.entries(), vec![entry]);
}

#[tokio::test]
async fn test_invalid_credentials_keep_gate() {
    let h = Harness::signed_in(ReconcilePolicy::LocalPatch).await;
    let before = h.controller.session();

    let result = h.controller.sign_in(&h.auth, ANNA.0, "wrong").await;

    assert_eq!(result, Err(LedgerError::Auth(AuthError::InvalidCredentials)));
    assert_eq!(h.controller.session(), before);
}

#[tokio::test]
async fn test_switching_owner_isolates_entries() {
    let h = Harness::signed_in(ReconcilePolicy::LocalPatch).await;
    let annas = h
        .controller
        .add_entry("Dora", dec!(30), Direction::OwedToUser)
        .await
        .unwrap();

    h.controller.sign_in(&h.auth, BEN.0, BEN.1).await.unwrap();
    assert!(h.controller.entries().is_empty());

    h.controller.delete_entry(annas.id).await.unwrap();
    assert_eq!(h.store.rows(), vec![annas.clone()]);
    assert_eq!(
        h.controller.mark_paid(annas.id).await,
        Err(ValidationError::EntryNotFound(annas.id).into())
    );
}

#[tokio::test]
async fn test_revocation_clears_bound_controller() {
    let h = Harness::signed_in(ReconcilePolicy::LocalPatch).await;
    h.controller
        .add_entry("Anna", dec!(10), Direction::OwedToUser)
        .await
        .unwrap();

    h.auth.revoke_current();

    assert!(!h.controller.is_authenticated());
    assert!(h.controller.entries().is_empty());
}

#[tokio::test]
async fn test_unsubscribed_controller_ignores_revocation() {
    let mut h = Harness::signed_in(ReconcilePolicy::LocalPatch).await;
    if let Some(subscription) = h.subscription.take() {
        subscription.unsubscribe();
    }

    h.auth.revoke_current();

    assert!(h.controller.is_authenticated());
}

#[tokio::test]
async fn test_expiry_clears_bound_controller() {
    let h = Harness::with_ttl(ReconcilePolicy::LocalPatch, 1).await;
    assert!(h.controller.is_authenticated());

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(!h.controller.is_authenticated());
    assert!(h.controller.entries().is_empty());
}

#[tokio::test]
async fn test_invalid_input_leaves_store_untouched() {
    let h = Harness::signed_in(ReconcilePolicy::LocalPatch).await;

    assert!(matches!(
        h.controller.add_entry("", dec!(10), Direction::OwedToUser).await,
        Err(LedgerError::Validation(ValidationError::EmptyCounterparty))
    ));
    assert!(matches!(
        h.controller.add_entry("Anna", dec!(0), Direction::OwedToUser).await,
        Err(LedgerError::Validation(ValidationError::NonPositivePrincipal(_)))
    ));
    assert!(h.store.rows().is_empty());
    assert!(h.controller.entries().is_empty());
}

#[tokio::test]
async fn test_delete_twice() {
    let h = Harness::signed_in(ReconcilePolicy::LocalPatch).await;
    let entry = h
        .controller
        .add_entry("Anna", dec!(10), Direction::OwedToUser)
        .await
        .unwrap();

    h.controller.delete_entry(entry.id).await.unwrap();
    h.controller.delete_entry(entry.id).await.unwrap();

    assert!(h.controller.entries().is_empty());
    assert!(h.store.rows().is_empty());
}

#[rstest]
#[case(ReconcilePolicy::LocalPatch)]
#[case(ReconcilePolicy::FullReload)]
#[tokio::test]
async fn test_failing_store_changes_nothing(#[case] reconcile: ReconcilePolicy) {
    let h = Harness::signed_in(reconcile).await;
    let entry = h
        .controller
        .add_entry("Anna", dec!(100), Direction::OwedToUser)
        .await
        .unwrap();
    let local = h.controller.entries();
    let remote = h.store.rows();
    let down = || StoreError::Transport("connection reset".to_string());

    h.store.fail_next(down());
    assert!(h.controller.add_entry("Ben", dec!(5), Direction::OwedByUser).await.is_err());
    h.store.fail_next(down());
    assert!(h.controller.add_payment(entry.id, dec!(10)).await.is_err());
    h.store.fail_next(down());
    assert!(h.controller.mark_paid(entry.id).await.is_err());
    h.store.fail_next(down());
    assert!(h.controller.delete_entry(entry.id).await.is_err());
    h.store.fail_next(down());
    assert!(h.controller.load().await.is_err());

    assert_eq!(h.controller.entries(), local);
    assert_eq!(h.store.rows(), remote);
}

#[tokio::test]
async fn test_restore_reloads_entries() {
    let h = Harness::signed_in(ReconcilePolicy::LocalPatch).await;
    let entry = h
        .controller
        .add_entry("Anna", dec!(10), Direction::OwedToUser)
        .await
        .unwrap();

    let fresh = LedgerController::new(h.store.clone(), ControllerSettings::default());
    let restored = fresh.restore(&h.auth).await.unwrap();

    assert_eq!(restored, h.controller.session());
    assert_eq!(fresh.entries(), vec![entry]);
}

#[tokio::test]
async fn test_overpayment_goes_negative() {
    let h = Harness::signed_in(ReconcilePolicy::LocalPatch).await;
    let entry = h
        .controller
        .add_entry("Anna", dec!(20), Direction::OwedToUser)
        .await
        .unwrap();

    let entry = h.controller.add_payment(entry.id, dec!(25)).await.unwrap();

    assert_eq!(entry.paid_amount, dec!(25));
    assert_eq!(entry.status, EntryStatus::Paid);
    assert_eq!(h.controller.totals().owed_to_user, dec!(-5));
    assert_eq!(h.controller.totals().net(), dec!(-5));
}
