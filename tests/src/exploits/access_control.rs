//! # Access Control
//!
//! Table mutations are admin-only; document mutations are owner-only.
//! Randomized callers test both gates.

#[cfg(test)]
mod tests {
    use crate::fixtures::{random_address, random_selectors, Deployment, ADMIN, ALICE, MALLORY};
    use did_registry::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ATTEMPTS: usize = 25;

    #[tokio::test]
    async fn test_random_callers_cannot_cut_table() {
        let fx = Deployment::wired().await;
        let mut rng = StdRng::seed_from_u64(0xD1D);
        let before = fx.routes().await;
        let admin = fx.admin();

        for _ in 0..ATTEMPTS {
            let caller = random_address(&mut rng);
            if caller == ADMIN {
                continue;
            }
            let selectors = random_selectors(&mut rng, 3);

            let err = admin.add_module(caller, fx.did_v2, &selectors).await.unwrap_err();
            assert_eq!(err, RegistryError::Unauthorized { caller });

            let err = admin
                .remove_module(caller, fx.did_v1, &DidModuleV1.selectors())
                .await
                .unwrap_err();
            assert!(err.is_authorization());

            let err = admin
                .update_module(
                    caller,
                    fx.did_v1,
                    fx.did_v2,
                    &DidModuleV1.selectors(),
                    &DidModuleV2.selectors(),
                )
                .await
                .unwrap_err();
            assert!(err.is_authorization());
        }

        assert_eq!(fx.routes().await, before);
        assert_eq!(admin.admin().await.unwrap(), ADMIN);
    }

    #[tokio::test]
    async fn test_authorization_checked_before_validation() {
        let fx = Deployment::wired().await;

        // malformed cuts from a non-admin still fail on authorization
        assert!(fx
            .admin()
            .add_module(MALLORY, Address::ZERO, &[])
            .await
            .unwrap_err()
            .is_authorization());
    }

    #[tokio::test]
    async fn test_random_callers_cannot_touch_documents() {
        let fx = Deployment::wired().await;
        let mut rng = StdRng::seed_from_u64(500);
        let id = DocId::from(500);
        fx.did().create_did(ALICE, ALICE, id, "test").await.unwrap();
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

        for _ in 0..ATTEMPTS {
            let caller = random_address(&mut rng);
            if caller == ALICE {
                continue;
            }
            assert_eq!(
                fx.did().update_did_info(caller, id, "pwned").await.unwrap_err(),
                RegistryError::NotDocumentOwner {
                    doc_id: id,
                    caller
                }
            );
            assert!(fx
                .did()
                .upgrade_did_version(caller, id)
                .await
                .unwrap_err()
                .is_authorization());
        }

        let document = fx
            .service
            .storage(fx.registry)
            .await
            .unwrap()
            .documents
            .require(id)
            .unwrap()
            .clone();
        assert_eq!(document.owner, ALICE);
        assert_eq!(document.content, "test");
        assert_eq!(document.version, 1);
    }

    #[tokio::test]
    async fn test_admin_gets_no_document_privileges() {
        let fx = Deployment::wired().await;
        let id = DocId::from(1);
        fx.did().create_did(ALICE, ALICE, id, "mine").await.unwrap();

        assert!(fx
            .did()
            .update_did_info(ADMIN, id, "admin override")
            .await
            .unwrap_err()
            .is_authorization());
    }

    #[tokio::test]
    async fn test_module_admin_is_not_registry_admin() {
        // deploying a module makes Mallory admin of that account only
        let fx = Deployment::wired().await;
        let own = fx
            .service
            .deploy_code(MALLORY, std::sync::Arc::new(DidModuleV2))
            .await
            .unwrap();

        assert_eq!(fx.service.storage(own).await.unwrap().admin, MALLORY);
        assert!(fx
            .admin()
            .add_module(MALLORY, own, &[Selector::new([7; 4])])
            .await
            .unwrap_err()
            .is_authorization());
    }
}
