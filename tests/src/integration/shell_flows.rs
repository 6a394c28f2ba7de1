//! # Shell Flows
//!
//! The wired shell (bus, state store, registry, host, bundled fragments)
//! driven purely through navigation and state actions.
//!
//! ## Flows Tested:
//!
//! 1. **Workout → Analytics**: events logged on one route are counted by
//!    the background analytics fragment
//! 2. **Recovery**: a route whose remote failed to load mounts once the
//!    remote recovers
//! 3. **Lifecycle**: subscriptions are released on shutdown
//! 4. **Contracts**: every payload the shell publishes satisfies its topic's
//!    contract

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use pf_01_remote_registry::BundledFetcher;
    use pf_02_composition_host::{CompositionApi, RouteErrorKind, RouteView};
    use shared_bus::{validate_payload, ContractViolation, Subscription, Topic};
    use shared_types::{StateAction, StateChange, Theme, Units, UserProfile};
    use shell_runtime::{
        fragments, ConfigError, ContainerError, ShellConfig, ShellContainer, ShellRuntime,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn shell() -> ShellRuntime {
        ShellRuntime::new(ShellConfig::default()).unwrap()
    }

    fn shell_with_fetcher(fetcher: Arc<BundledFetcher>) -> ShellRuntime {
        ShellRuntime::from_container(
            ShellContainer::with_fetcher(ShellConfig::default(), fetcher).unwrap(),
        )
    }

    fn validate_everything(
        runtime: &ShellRuntime,
    ) -> (Arc<Mutex<Vec<ContractViolation>>>, Vec<Subscription>) {
        let violations = Arc::new(Mutex::new(Vec::new()));
        let bus = &runtime.container().bus;
        let subscriptions = Topic::ALL
            .into_iter()
            .map(|topic| {
                let sink = violations.clone();
                bus.subscribe(topic, move |payload| {
                    if let Err(violation) = validate_payload(topic, payload) {
                        sink.lock().push(violation);
                    }
                    Ok(())
                })
            })
            .collect();
        (violations, subscriptions)
    }

    // =============================================================================
    // WORKOUT → ANALYTICS
    // =============================================================================

    #[tokio::test]
    async fn test_analytics_counts_while_in_background() {
        let runtime = shell();
        assert_eq!(runtime.start().await, RouteView::Home);

        runtime.navigate("/analytics").await;
        runtime.navigate("/workout/new/Squats/3/10").await;
        runtime.navigate("/workout/new/Bench%20Press/5/5/80").await;
        runtime.navigate("/workout/delete/1").await;
        runtime.navigate("/food/new/Oatmeal/350").await;
        runtime.navigate("/food/new/Salad/200").await;

        let view = runtime.navigate("/analytics").await;
        assert!(
            view.to_string()
                .contains("1 workouts (5 sets), 2 meals (550 kcal)"),
            "{view}"
        );
    }

    #[tokio::test]
    async fn test_same_route_keeps_instance_state() {
        let runtime = shell();
        runtime.navigate("/workout/new/Rows/3/12").await;

        let view = runtime.navigate("/workout").await;
        match view {
            RouteView::Mounted { sub_path, view, .. } => {
                assert_eq!(sub_path, "/");
                assert!(view.contains("1 logged (Rows 3x12)"), "{view}");
            }
            other => panic!("expected mounted workout, got {other:?}"),
        }
        assert_eq!(runtime.container().host.active_route().as_deref(), Some("/workout"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let runtime = shell();
        runtime.navigate("/food").await;

        let view = runtime.navigate("/settings").await;

        assert_eq!(
            view,
            RouteView::NotFound {
                path: "/settings".into()
            }
        );
        assert_eq!(runtime.container().host.active_route(), None);
    }

    // =============================================================================
    // RECOVERY
    // =============================================================================

    #[tokio::test]
    async fn test_failed_route_mounts_after_remote_recovers() {
        let fetcher = Arc::new(BundledFetcher::new(fragments::catalog()));
        fetcher.fail_next("food", 1);
        let runtime = shell_with_fetcher(fetcher.clone());

        match runtime.navigate("/food").await {
            RouteView::Error { kind, retry, .. } => {
                assert_eq!(kind, RouteErrorKind::RemoteLoad);
                assert!(retry);
            }
            other => panic!("expected error placeholder, got {other:?}"),
        }

        // Other routes are unaffected by the failure.
        assert!(runtime.navigate("/workout").await.is_mounted());

        assert!(runtime.navigate("/food").await.is_mounted());
        assert_eq!(fetcher.fetch_count(&"food".into()), 2);
    }

    // =============================================================================
    // STATE
    // =============================================================================

    #[tokio::test]
    async fn test_theme_toggle_publishes_once_and_rerenders() {
        let runtime = shell();
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = changes.clone();
        let _sub = runtime
            .container()
            .bus
            .subscribe(Topic::ThemeChanged, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        runtime.navigate("/analytics").await;
        assert_eq!(
            runtime.dispatch(StateAction::ToggleTheme),
            StateChange::Theme(Theme::Dark)
        );

        assert_eq!(changes.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.state().version, 1);
        assert!(runtime.view().to_string().starts_with("[dark]"));

        // Units do not go over the bus.
        runtime.dispatch(StateAction::SetUnits(Units::Imperial));
        assert_eq!(changes.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.state().version, 2);
    }

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_background_listeners_survive_navigation_until_shutdown() {
        let runtime = shell();
        let bus = runtime.container().bus.clone();
        let baseline = bus.subscriber_count(Topic::MealLogged);

        runtime.navigate("/analytics").await;
        assert_eq!(bus.subscriber_count(Topic::MealLogged), baseline + 1);

        runtime.navigate("/food").await;
        assert_eq!(bus.subscriber_count(Topic::MealLogged), baseline + 1);
        assert_eq!(runtime.container().host.retained_subscriptions(), 4);

        // Re-mounting does not duplicate the retained listeners.
        runtime.navigate("/analytics").await;
        assert_eq!(bus.subscriber_count(Topic::MealLogged), baseline + 1);

        runtime.shutdown();
        for topic in Topic::ALL {
            assert_eq!(bus.subscriber_count(topic), 0, "{topic}");
        }
    }

    // =============================================================================
    // CONTRACTS AND CONFIGURATION
    // =============================================================================

    #[tokio::test]
    async fn test_shell_payloads_satisfy_contracts() {
        let runtime = shell();
        let (violations, _subs) = validate_everything(&runtime);

        runtime.navigate("/analytics").await;
        runtime.navigate("/workout/new/Squats/3/10").await;
        runtime.navigate("/workout/delete/1").await;
        runtime.navigate("/food/new/Oatmeal/350").await;
        runtime.navigate("/food/delete/1").await;
        runtime.dispatch(StateAction::ToggleTheme);
        runtime.dispatch(StateAction::UpdateUser(UserProfile::new("2", "Asha")));

        assert!(violations.lock().is_empty(), "{:?}", violations.lock());
        assert_eq!(runtime.container().bus.listener_failures(), 0);
    }

    #[test]
    fn test_route_to_unconfigured_remote_is_rejected() {
        let mut config = ShellConfig::default();
        config.routes.insert("/sleep".into(), "sleep".into());
        let fetcher = Arc::new(BundledFetcher::new(fragments::catalog()));

        let err = ShellContainer::with_fetcher(config, fetcher).err().unwrap();

        assert!(matches!(
            err,
            ContainerError::Config(ConfigError::UnknownRouteTarget { ref remote, .. })
                if remote == "sleep"
        ));
    }
}
