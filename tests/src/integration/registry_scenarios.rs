//! # Registry Scenarios
//!
//! The remote registry over the bundled fragments of the shell:
//!
//! 1. **Single flight**: rapid resolves of one remote share one fetch
//! 2. **Unknown remotes**: rejected before any fetch
//! 3. **Retry**: a failed load is retried by the next resolve
//! 4. **Isolation**: one remote's failure leaves the others untouched

#[cfg(test)]
mod tests {
    use futures::future::join_all;
    use std::sync::Arc;
    use std::time::Duration;

    use pf_01_remote_registry::{
        BundledFetcher, LoadStatus, RemoteModuleRegistry, RemoteRegistryApi,
    };
    use shared_types::{FragmentName, RegistryError, RemoteDescriptor};
    use shell_runtime::fragments;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn descriptors() -> Vec<RemoteDescriptor> {
        vec![
            RemoteDescriptor::new(
                "workout",
                "http://localhost:4001/remoteEntry.json",
                fragments::WORKOUT_EXPORT,
            ),
            RemoteDescriptor::new(
                "food",
                "http://localhost:4002/remoteEntry.json",
                fragments::FOOD_EXPORT,
            ),
        ]
    }

    fn registry(latency: Duration) -> (RemoteModuleRegistry, Arc<BundledFetcher>) {
        let fetcher = Arc::new(BundledFetcher::new(fragments::catalog()).with_latency(latency));
        (RemoteModuleRegistry::new(descriptors(), fetcher.clone()), fetcher)
    }

    // =============================================================================
    // SINGLE FLIGHT
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_rapid_resolves_share_one_fetch() {
        let (registry, fetcher) = registry(Duration::from_millis(250));
        let workout = FragmentName::from("workout");

        let (first, second) = tokio::join!(registry.resolve(&workout), registry.resolve(&workout));
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(fetcher.fetch_count(&workout), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.status(&workout), Some(LoadStatus::Ready));

        // Later resolves come from the cache.
        let third = registry.resolve(&workout).await.unwrap();
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(fetcher.fetch_count(&workout), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_concurrent_callers_one_fetch() {
        let (registry, fetcher) = registry(Duration::from_millis(100));
        let food = FragmentName::from("food");

        let results = join_all((0..16).map(|_| registry.resolve(&food))).await;

        let modules: Vec<_> = results.into_iter().map(Result::unwrap).collect();
        assert!(modules.iter().all(|m| Arc::ptr_eq(m, &modules[0])));
        assert_eq!(fetcher.fetch_count(&food), 1);
    }

    // =============================================================================
    // UNKNOWN REMOTES
    // =============================================================================

    #[tokio::test]
    async fn test_nonexistent_remote_is_unknown_without_fetch() {
        let (registry, fetcher) = registry(Duration::ZERO);
        let ghost = FragmentName::from("nonexistent");

        let err = registry.resolve(&ghost).await.unwrap_err();

        assert!(matches!(err, RegistryError::UnknownRemote { ref name } if name == &ghost));
        assert!(!err.is_retryable());
        assert_eq!(fetcher.fetch_count(&ghost), 0);
        assert_eq!(registry.status(&ghost), None);
    }

    // =============================================================================
    // RETRY AND ISOLATION
    // =============================================================================

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let (registry, fetcher) = registry(Duration::ZERO);
        let workout = FragmentName::from("workout");
        fetcher.fail_next("workout", 1);

        let err = registry.resolve(&workout).await.unwrap_err();
        assert!(matches!(err, RegistryError::RemoteLoad { .. }));
        assert!(matches!(registry.status(&workout), Some(LoadStatus::Failed(_))));

        let module = registry.resolve(&workout).await.unwrap();
        assert_eq!(module.name(), &workout);
        assert_eq!(fetcher.fetch_count(&workout), 2);
    }

    #[tokio::test]
    async fn test_failure_does_not_touch_other_remotes() {
        let (registry, fetcher) = registry(Duration::ZERO);
        let workout = FragmentName::from("workout");
        let food = FragmentName::from("food");

        let before = registry.resolve(&food).await.unwrap();
        fetcher.fail_next("workout", 3);
        assert!(registry.resolve(&workout).await.is_err());

        let after = registry.resolve(&food).await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(fetcher.fetch_count(&food), 1);
        assert_eq!(registry.status(&food), Some(LoadStatus::Ready));
    }
}
