//! # DID Lifecycle
//!
//! The reference flow: create, update, swap v1 for v2, upgrade.
//!
//! 1. Admin deploys the registry, the documents module and DID v1.
//! 2. Alice creates document 500 with content "test".
//! 3. Alice rewrites it to "test2"; Mallory's rewrite is refused.
//! 4. Admin swaps DID v1 for DID v2 with `updateModule`.
//! 5. Alice upgrades document 500 to version 2.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Deployment, ADMIN, ALICE, BOB, MALLORY};
    use did_registry::prelude::*;

    const DOC: u64 = 500;

    #[tokio::test]
    async fn test_reference_flow() {
        let fx = Deployment::wired().await;
        let did = fx.did();
        let documents = fx.documents();
        let id = DocId::from(DOC);

        // Step 2: create
        let receipt = did.create_did(ALICE, ALICE, id, "test").await.unwrap();
        assert!(receipt.emitted(&RegistryEvent::DidCreated {
            owner: ALICE,
            doc_id: id,
        }));
        assert_eq!(documents.document_owner(fx.registry, id).await.unwrap(), ALICE);
        assert_eq!(
            documents.document_version(fx.registry, id).await.unwrap(),
            U256::one()
        );

        // Step 3: update, owner only
        let receipt = did.update_did_info(ALICE, id, "test2").await.unwrap();
        assert!(receipt.emitted(&RegistryEvent::DidUpdatedInfo { doc_id: id }));
        assert_eq!(
            documents.document_version(fx.registry, id).await.unwrap(),
            U256::one()
        );

        let err = did.update_did_info(MALLORY, id, "pwned").await.unwrap_err();
        assert_eq!(err.to_string(), "Only document owner");

        // Step 4: swap modules
        let receipt = fx
            .admin()
            .update_module(
                ADMIN,
                fx.did_v1,
                fx.did_v2,
                &DidModuleV1.selectors(),
                &DidModuleV2.selectors(),
            )
            .await
            .unwrap();
        assert!(receipt.emitted(&RegistryEvent::ModuleUpdated {
            old_module: fx.did_v1,
            new_module: fx.did_v2,
            old_selectors: DidModuleV1.selectors(),
            new_selectors: DidModuleV2.selectors(),
        }));

        // Step 5: upgrade through v2
        let receipt = did.upgrade_did_version(ALICE, id).await.unwrap();
        assert!(receipt.emitted(&RegistryEvent::DidVersionUpgraded { doc_id: id }));
        assert_eq!(
            documents.document_version(fx.registry, id).await.unwrap(),
            U256::from(2)
        );
        assert_eq!(documents.document_owner(fx.registry, id).await.unwrap(), ALICE);

        let storage = fx.service.storage(fx.registry).await.unwrap();
        assert_eq!(storage.documents.require(id).unwrap().content, "test2");
    }

    #[tokio::test]
    async fn test_storage_address_is_registry() {
        let fx = Deployment::wired().await;
        assert_eq!(fx.did().storage_address().await.unwrap(), fx.registry);

        // the module's own address answers with itself
        let direct = DidHandle::new(&fx.service, fx.did_v1);
        assert_eq!(direct.storage_address().await.unwrap(), fx.did_v1);
    }

    #[tokio::test]
    async fn test_registries_share_module_code() {
        let fx = Deployment::wired().await;
        let id = DocId::from(DOC);

        // Bob runs a second registry on the same DID and documents code
        let other = fx.service.deploy_registry(BOB).await.unwrap();
        let other_admin = RegistryAdminHandle::new(&fx.service, other);
        other_admin
            .add_module(BOB, fx.documents, &DocumentsModule.selectors())
            .await
            .unwrap();
        other_admin
            .add_module(BOB, fx.did_v1, &DidModuleV1.selectors())
            .await
            .unwrap();
        let other_did = DidHandle::new(&fx.service, other);

        assert_eq!(fx.did().storage_address().await.unwrap(), fx.registry);
        assert_eq!(other_did.storage_address().await.unwrap(), other);

        fx.did().create_did(ALICE, ALICE, id, "in a").await.unwrap();
        other_did.create_did(BOB, BOB, id, "in b").await.unwrap();

        let documents = fx.documents();
        assert_eq!(documents.document_owner(fx.registry, id).await.unwrap(), ALICE);
        assert_eq!(documents.document_owner(other, id).await.unwrap(), BOB);

        // same doc id, separate owners
        assert!(other_did
            .update_did_info(ALICE, id, "cross-registry")
            .await
            .unwrap_err()
            .is_authorization());
        let storage = fx.service.storage(other).await.unwrap();
        assert_eq!(storage.documents.require(id).unwrap().content, "in b");
        assert!(fx.service.storage(fx.did_v1).await.unwrap().documents.is_empty());
    }

    #[tokio::test]
    async fn test_documents_live_in_registry_storage() {
        let fx = Deployment::wired().await;
        fx.did()
            .create_did(ALICE, ALICE, DocId::from(DOC), "test")
            .await
            .unwrap();

        let module_storage = fx.service.storage(fx.did_v1).await.unwrap();
        assert!(module_storage.documents.is_empty());

        let err = fx
            .documents()
            .document_owner(fx.did_v1, DocId::from(DOC))
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::DocumentNotFound(DocId::from(DOC)));
    }

    #[tokio::test]
    async fn test_owner_may_differ_from_creator() {
        let fx = Deployment::wired().await;
        let id = DocId::from(7);
        fx.did().create_did(ADMIN, ALICE, id, "delegated").await.unwrap();

        assert_eq!(fx.documents().document_owner(fx.registry, id).await.unwrap(), ALICE);
        assert!(fx
            .did()
            .update_did_info(ADMIN, id, "creator is not owner")
            .await
            .unwrap_err()
            .is_authorization());
        fx.did().update_did_info(ALICE, id, "owner").await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_and_missing_documents() {
        let fx = Deployment::wired().await;
        let id = DocId::from(DOC);
        fx.did().create_did(ALICE, ALICE, id, "test").await.unwrap();

        assert_eq!(
            fx.did().create_did(MALLORY, MALLORY, id, "squat").await.unwrap_err(),
            RegistryError::DocumentExists(id)
        );
        assert_eq!(
            fx.documents()
                .document_owner(fx.registry, DocId::from(501))
                .await
                .unwrap_err(),
            RegistryError::DocumentNotFound(DocId::from(501))
        );
    }
}
