use std::collections::BTreeMap;
use std::sync::Mutex;

use kcpcore_types::ClusterPath;

use crate::{ObjectStore, StoreError};

/// Objects stored via [`FakeStore`] must be able to report their own name,
/// since the trait's `create`/`update` take ownership of the object rather
/// than a separate name argument. Kubernetes resource types satisfy this
/// via `ObjectMeta::name`; test fixtures implement it directly.
pub trait FakeName {
    fn fake_name(&self) -> String;
}

/// Every `kube::Resource` already carries its own name in `metadata.name`,
/// so real wire types (our `CustomResource`-derived ones and the upstream
/// `CustomResourceDefinition`) get `FakeName` for free.
impl<T: kube::Resource> FakeName for T {
    fn fake_name(&self) -> String {
        self.meta().name.clone().unwrap_or_default()
    }
}

/// In-memory double for [`crate::ObjectStore`], keyed by `(cluster, name)`.
/// Mirrors real `create`/`update` semantics closely enough to exercise the
/// conflict paths reconcilers depend on: `create` rejects an existing key,
/// `update` rejects a missing one.
pub struct FakeStore<T> {
    kind: &'static str,
    objects: Mutex<BTreeMap<(String, String), T>>,
}

impl<T> FakeStore<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn seed(
        kind: &'static str,
        items: impl IntoIterator<Item = (ClusterPath, String, T)>,
    ) -> Self {
        let store = Self::new(kind);
        {
            let mut guard = store.objects.lock().expect("fake store mutex poisoned");
            for (cluster, name, obj) in items {
                guard.insert((cluster.to_string(), name), obj);
            }
        }
        store
    }

    fn key(cluster: &ClusterPath, name: &str) -> (String, String) {
        (cluster.to_string(), name.to_string())
    }
}

#[async_trait::async_trait]
impl<T> ObjectStore<T> for FakeStore<T>
where
    T: FakeName + Clone + Send + Sync,
{
    async fn get(&self, cluster: &ClusterPath, name: &str) -> Result<Option<T>, StoreError> {
        let guard = self.objects.lock().expect("fake store mutex poisoned");
        Ok(guard.get(&Self::key(cluster, name)).cloned())
    }

    async fn list(&self, cluster: &ClusterPath) -> Result<Vec<T>, StoreError> {
        let guard = self.objects.lock().expect("fake store mutex poisoned");
        let prefix = cluster.to_string();
        Ok(guard
            .iter()
            .filter(|((c, _), _)| *c == prefix)
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn create(&self, cluster: &ClusterPath, obj: T) -> Result<T, StoreError> {
        let name = obj.fake_name();
        let mut guard = self.objects.lock().expect("fake store mutex poisoned");
        let key = Self::key(cluster, &name);
        if guard.contains_key(&key) {
            return Err(StoreError::Conflict {
                cluster: cluster.to_string(),
                name,
            });
        }
        guard.insert(key, obj.clone());
        Ok(obj)
    }

    async fn update(&self, cluster: &ClusterPath, obj: T) -> Result<T, StoreError> {
        let name = obj.fake_name();
        let mut guard = self.objects.lock().expect("fake store mutex poisoned");
        let key = Self::key(cluster, &name);
        if !guard.contains_key(&key) {
            return Err(StoreError::NotFound {
                kind: self.kind,
                cluster: cluster.to_string(),
                name,
            });
        }
        guard.insert(key, obj.clone());
        Ok(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Widget {
        name: String,
        value: u32,
    }

    impl FakeName for Widget {
        fn fake_name(&self) -> String {
            self.name.clone()
        }
    }

    fn cluster(path: &str) -> ClusterPath {
        ClusterPath::from(path.to_string())
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = FakeStore::<Widget>::new("Widget");
        let root = cluster("root:org");
        store
            .create(
                &root,
                Widget {
                    name: "a".into(),
                    value: 1,
                },
            )
            .await
            .expect("create");

        let got = store.get(&root, "a").await.expect("get");
        assert_eq!(
            got,
            Some(Widget {
                name: "a".into(),
                value: 1
            })
        );
    }

    #[tokio::test]
    async fn create_twice_conflicts() {
        let store = FakeStore::<Widget>::new("Widget");
        let root = cluster("root:org");
        let widget = Widget {
            name: "a".into(),
            value: 1,
        };
        store.create(&root, widget.clone()).await.expect("first create");
        let err = store.create(&root, widget).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = FakeStore::<Widget>::new("Widget");
        let root = cluster("root:org");
        let err = store
            .update(
                &root,
                Widget {
                    name: "missing".into(),
                    value: 9,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_is_scoped_to_cluster() {
        let store = FakeStore::<Widget>::new("Widget");
        let a = cluster("root:org-a");
        let b = cluster("root:org-b");
        store
            .create(
                &a,
                Widget {
                    name: "a".into(),
                    value: 1,
                },
            )
            .await
            .unwrap();
        store
            .create(
                &b,
                Widget {
                    name: "b".into(),
                    value: 2,
                },
            )
            .await
            .unwrap();

        let in_a = store.list(&a).await.unwrap();
        assert_eq!(in_a.len(), 1);
        assert_eq!(in_a[0].name, "a");
    }
}
