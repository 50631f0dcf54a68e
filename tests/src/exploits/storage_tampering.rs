//! # Storage Tampering
//!
//! Module code runs with full write access to the registry's storage. A
//! module that abuses it (seizing the admin slot, deleting documents,
//! reassigning owners, rolling back versions) must be reverted by the
//! ledger's post-execution checks.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::fixtures::{Deployment, ADMIN, ALICE, MALLORY};
    use did_registry::prelude::*;

    const SEIZE_ADMIN: Function = Function {
        name: "seizeAdmin",
        inputs: &[],
        outputs: &[],
    };

    const WIPE_DOCUMENTS: Function = Function {
        name: "wipeDocuments",
        inputs: &[],
        outputs: &[],
    };

    const HIJACK_DOCUMENT: Function = Function {
        name: "hijackDocument",
        inputs: &[ParamType::Uint256],
        outputs: &[],
    };

    const RESET_VERSION: Function = Function {
        name: "resetVersion",
        inputs: &[ParamType::Uint256],
        outputs: &[],
    };

    struct TamperModule;

    impl Module for TamperModule {
        fn name(&self) -> &'static str {
            "tamper"
        }

        fn interface(&self) -> &'static [Function] {
            &[SEIZE_ADMIN, WIPE_DOCUMENTS, HIJACK_DOCUMENT, RESET_VERSION]
        }

        fn execute(
            &self,
            frame: &mut CallFrame<'_>,
            selector: Selector,
            args: &[u8],
        ) -> Result<Bytes, RegistryError> {
            if selector == SEIZE_ADMIN.selector() {
                frame.storage.admin = frame.caller;
            } else if selector == WIPE_DOCUMENTS.selector() {
                frame.storage.documents = DocumentStore::new();
            } else {
                let function = if selector == HIJACK_DOCUMENT.selector() {
                    HIJACK_DOCUMENT
                } else {
                    RESET_VERSION
                };
                let doc_id = function
                    .decode_input(args)?
                    .remove(0)
                    .into_uint()?;
                let existing = frame.storage.documents.require(doc_id)?.clone();
                let owner = if function == HIJACK_DOCUMENT {
                    frame.caller
                } else {
                    existing.owner
                };

                // rebuild the store with a fresh copy of the document
                let mut rebuilt = DocumentStore::new();
                for (id, document) in frame.storage.documents.iter() {
                    if id != doc_id {
                        rebuilt.create(document.owner, id, document.content.clone())?;
                    }
                }
                rebuilt.create(owner, doc_id, existing.content)?;
                frame.storage.documents = rebuilt;
            }
            Ok(Bytes::new())
        }
    }

    /// Registry with a document at v2 and the tamper module (mistakenly) routed.
    async fn compromised() -> (Deployment, Address) {
        let fx = Deployment::wired().await;
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
        fx.did().upgrade_did_version(ALICE, id).await.unwrap();

        let tamper = fx
            .service
            .deploy_code(MALLORY, Arc::new(TamperModule))
            .await
            .unwrap();
        fx.admin()
            .add_module(ADMIN, tamper, &TamperModule.selectors())
            .await
            .unwrap();
        (fx, tamper)
    }

    async fn attack(fx: &Deployment, function: &Function, args: &[Token]) -> RegistryError {
        let data = function.encode_call(args).unwrap();
        fx.service
            .transact(CallRequest::new(MALLORY, fx.registry, data))
            .await
            .unwrap_err()
    }

    async fn assert_untouched(fx: &Deployment) {
        let storage = fx.service.storage(fx.registry).await.unwrap();
        assert_eq!(storage.admin, ADMIN);
        let document = storage.documents.require(DocId::from(500)).unwrap();
        assert_eq!(document.owner, ALICE);
        assert_eq!(document.version, 2);
    }

    #[tokio::test]
    async fn test_admin_seizure_reverted() {
        let (fx, _) = compromised().await;
        let err = attack(&fx, &SEIZE_ADMIN, &[]).await;
        assert!(matches!(err, RegistryError::InvariantViolated(_)));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_untouched(&fx).await;
    }

    #[tokio::test]
    async fn test_document_wipe_reverted() {
        let (fx, _) = compromised().await;
        let err = attack(&fx, &WIPE_DOCUMENTS, &[]).await;
        assert!(matches!(err, RegistryError::InvariantViolated(_)));
        assert_untouched(&fx).await;
    }

    #[tokio::test]
    async fn test_owner_reassignment_reverted() {
        let (fx, _) = compromised().await;
        let err = attack(&fx, &HIJACK_DOCUMENT, &[Token::Uint(DocId::from(500))]).await;
        assert!(matches!(err, RegistryError::InvariantViolated(_)));
        assert_untouched(&fx).await;
    }

    #[tokio::test]
    async fn test_version_rollback_reverted() {
        let (fx, _) = compromised().await;
        let err = attack(&fx, &RESET_VERSION, &[Token::Uint(DocId::from(500))]).await;
        assert!(matches!(err, RegistryError::InvariantViolated(_)));
        assert_untouched(&fx).await;
    }

    #[tokio::test]
    async fn test_tampering_own_account_is_also_checked() {
        let (fx, tamper) = compromised().await;
        let data = SEIZE_ADMIN.encode_call(&[]).unwrap();
        let err = fx
            .service
            .transact(CallRequest::new(ALICE, tamper, data))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvariantViolated(_)));
        assert_eq!(fx.service.storage(tamper).await.unwrap().admin, MALLORY);
    }

    #[tokio::test]
    async fn test_reverted_attack_consumes_nonce_only() {
        let (fx, _) = compromised().await;
        let nonce = fx.service.nonce(MALLORY).await;
        let mut rx = fx.service.subscribe();

        attack(&fx, &SEIZE_ADMIN, &[]).await;

        assert_eq!(fx.service.nonce(MALLORY).await, nonce + 1);
        assert!(rx.try_recv().is_err());
        assert_untouched(&fx).await;
    }
}
