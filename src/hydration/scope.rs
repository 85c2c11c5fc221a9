//! Per-render client memoization

use super::PageProps;
use crate::provisioner::ClientProvisioner;
use crate::snapshot::CacheSnapshot;
use gql_client::Client;
use std::sync::Arc;

/// Memo of the client handed out during one render
///
/// Repeated lookups with props carrying a deep-equal snapshot return the same
/// client without touching its cache. A different snapshot provisions again.
#[derive(Debug)]
pub struct HydrationScope<'a> {
    provisioner: &'a ClientProvisioner,
    memo: Option<Memo>,
}

#[derive(Debug)]
struct Memo {
    snapshot: Option<CacheSnapshot>,
    client: Arc<Client>,
}

impl<'a> HydrationScope<'a> {
    pub fn new(provisioner: &'a ClientProvisioner) -> Self {
        Self {
            provisioner,
            memo: None,
        }
    }

    /// Client for a page, hydrated from the snapshot in its props
    pub fn client_for_page(&mut self, props: &PageProps) -> Arc<Client> {
        let snapshot = props.snapshot();

        if let Some(memo) = &self.memo {
            if memo.snapshot == snapshot {
                tracing::trace!("Reusing memoized client");
                return Arc::clone(&memo.client);
            }
        }

        let client = self.provisioner.initialize(snapshot.as_ref());
        self.memo = Some(Memo {
            snapshot,
            client: Arc::clone(&client),
        });

        client
    }

    /// Drop the memo; the next lookup provisions again
    pub fn reset(&mut self) {
        self.memo = None;
    }
}

/// Client for `props` within `scope`
pub fn use_client_for_page(scope: &mut HydrationScope<'_>, props: &PageProps) -> Arc<Client> {
    scope.client_for_page(props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioner::ExecutionMode;
    use serde_json::json;

    fn props_with(state: serde_json::Value) -> PageProps {
        PageProps::from_value(json!({ "__APOLLO_STRAPI__": state })).unwrap()
    }

    #[test]
    fn test_same_snapshot_reuses_client() {
        let provisioner = ClientProvisioner::new(ExecutionMode::Server, None);
        let mut scope = provisioner.scope();

        let first = use_client_for_page(&mut scope, &props_with(json!({"A": {"id": 1}})));
        let second = use_client_for_page(&mut scope, &props_with(json!({"A": {"id": 1}})));

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_memo_skips_remerge() {
        let provisioner = ClientProvisioner::new(ExecutionMode::Browser, None);
        let mut scope = provisioner.scope();
        let props = props_with(json!({"ROOT_QUERY": {"nav": [1]}}));

        let client = scope.client_for_page(&props);
        client.cache().write_root_field("nav", json!([2]));

        scope.client_for_page(&props);
        assert_eq!(client.cache().read_root_field("nav"), Some(json!([2])));
    }

    #[test]
    fn test_changed_snapshot_reprovisions() {
        let provisioner = ClientProvisioner::new(ExecutionMode::Server, None);
        let mut scope = provisioner.scope();

        let first = scope.client_for_page(&props_with(json!({"A": {"id": 1}})));
        let second = scope.client_for_page(&props_with(json!({"B": {"id": 2}})));

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.extract().len(), 1);
        assert!(second.extract().contains_key("B"));
    }

    #[test]
    fn test_changed_snapshot_in_browser_merges_into_singleton() {
        let provisioner = ClientProvisioner::new(ExecutionMode::Browser, None);
        let mut scope = provisioner.scope();

        let first = scope.client_for_page(&props_with(json!({"A": {"id": 1}})));
        let second = scope.client_for_page(&props_with(json!({"B": {"id": 2}})));

        assert!(Arc::ptr_eq(&first, &second));
        let cache = second.extract();
        assert!(cache.contains_key("A"));
        assert!(cache.contains_key("B"));
    }

    #[test]
    fn test_props_without_state() {
        let provisioner = ClientProvisioner::new(ExecutionMode::Server, None);
        let mut scope = provisioner.scope();

        let first = scope.client_for_page(&PageProps::new());
        let second = scope.client_for_page(&PageProps::new());

        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.extract().is_empty());
    }

    #[test]
    fn test_reset() {
        let provisioner = ClientProvisioner::new(ExecutionMode::Server, None);
        let mut scope = provisioner.scope();

        let first = scope.client_for_page(&PageProps::new());
        scope.reset();
        let second = scope.client_for_page(&PageProps::new());

        assert!(!Arc::ptr_eq(&first, &second));
    }
}
