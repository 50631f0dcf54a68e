//! # Scenario Isolation
//!
//! Snapshots capture the whole ledger so one scenario can be rolled back
//! before the next begins.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Deployment, ADMIN, ALICE, BOB};
    use did_registry::prelude::*;

    #[tokio::test]
    async fn test_revert_restores_routes_documents_and_nonces() {
        let fx = Deployment::wired().await;
        let id = DocId::from(500);
        fx.did().create_did(ALICE, ALICE, id, "test").await.unwrap();

        let routes = fx.routes().await;
        let documents = fx.service.storage(fx.registry).await.unwrap().documents;
        let alice_nonce = fx.service.nonce(ALICE).await;
        let admin_nonce = fx.service.nonce(ADMIN).await;

        let snapshot = fx.service.snapshot().await;

        fx.did().update_did_info(ALICE, id, "changed").await.unwrap();
        fx.did()
            .create_did(BOB, BOB, DocId::from(501), "bob")
            .await
            .unwrap();
        fx.admin()
            .update_module(
                ADMIN,
                fx.did_v1,
                fx.did_v2,
                &DidModuleV1.selectors(),
                &DidModuleV2.selectors(),
            )
            .await
            .unwrap();
        assert_ne!(fx.routes().await, routes);

        fx.service.revert_to_snapshot(snapshot).await.unwrap();

        assert_eq!(fx.routes().await, routes);
        assert_eq!(
            fx.service.storage(fx.registry).await.unwrap().documents,
            documents
        );
        assert_eq!(fx.service.nonce(ALICE).await, alice_nonce);
        assert_eq!(fx.service.nonce(ADMIN).await, admin_nonce);
        assert_eq!(fx.service.nonce(BOB).await, 0);
    }

    #[tokio::test]
    async fn test_reverted_deployment_disappears() {
        let fx = Deployment::wired().await;
        let snapshot = fx.service.snapshot().await;

        let extra = fx.service.deploy_registry(ADMIN).await.unwrap();
        assert!(fx.service.storage(extra).await.is_some());

        fx.service.revert_to_snapshot(snapshot).await.unwrap();
        assert!(fx.service.storage(extra).await.is_none());

        // the deployer's nonce rolled back, so the address is reproduced
        let again = fx.service.deploy_registry(ADMIN).await.unwrap();
        assert_eq!(again, extra);
    }

    #[tokio::test]
    async fn test_nested_snapshots() {
        let fx = Deployment::wired().await;
        let outer = fx.service.snapshot().await;
        fx.did()
            .create_did(ALICE, ALICE, DocId::from(1), "one")
            .await
            .unwrap();
        let inner = fx.service.snapshot().await;
        fx.did()
            .create_did(ALICE, ALICE, DocId::from(2), "two")
            .await
            .unwrap();

        fx.service.revert_to_snapshot(inner).await.unwrap();
        let documents = fx.service.storage(fx.registry).await.unwrap().documents;
        assert!(documents.contains(DocId::from(1)));
        assert!(!documents.contains(DocId::from(2)));

        fx.service.revert_to_snapshot(outer).await.unwrap();
        assert!(fx
            .service
            .storage(fx.registry)
            .await
            .unwrap()
            .documents
            .is_empty());

        // reverting discards the snapshot and everything taken after it
        assert_eq!(
            fx.service.revert_to_snapshot(inner).await.unwrap_err(),
            RegistryError::SnapshotNotFound(inner)
        );
        assert_eq!(
            fx.service.revert_to_snapshot(outer).await.unwrap_err(),
            RegistryError::SnapshotNotFound(outer)
        );
    }

    #[tokio::test]
    async fn test_scenarios_do_not_leak() {
        let fx = Deployment::wired().await;
        let id = DocId::from(500);
        let mut previous = None;

        for round in 0..3u64 {
            let baseline = fx.service.snapshot().await;
            if let Some(previous) = previous {
                assert!(baseline > previous);
            }
            previous = Some(baseline);

            // every round can reuse the same document id
            fx.did()
                .create_did(ALICE, ALICE, id, &format!("round {round}"))
                .await
                .unwrap();
            assert_eq!(
                fx.documents().document_version(fx.registry, id).await.unwrap(),
                U256::one()
            );
            fx.service.revert_to_snapshot(baseline).await.unwrap();
        }
        assert!(fx
            .service
            .storage(fx.registry)
            .await
            .unwrap()
            .documents
            .is_empty());
    }
}
