//! # Bus Scenarios
//!
//! Delivery guarantees of the shared bus as seen by independent fragments:
//!
//! 1. **Topic isolation**: a publish reaches only the subscribers of its topic
//! 2. **Failure isolation**: a throwing or panicking listener is reported,
//!    the remaining listeners still run, the publisher never notices
//! 3. **Payload contracts**: every reference payload satisfies its topic's
//!    contract when checked by a validating listener

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use shared_bus::{
        validate_payload, CollectingReporter, ContractViolation, EventBus, EventPublisher,
        ListenerError, Payload, Subscription, Topic,
    };
    use shared_types::{
        MealDeleted, MealLogged, Theme, ThemeChanged, UserProfile, UserUpdated, WorkoutDeleted,
        WorkoutLogged,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn collecting_bus() -> (Arc<EventBus>, Arc<CollectingReporter>) {
        let reporter = Arc::new(CollectingReporter::new());
        (Arc::new(EventBus::with_reporter(reporter.clone())), reporter)
    }

    /// Subscribe a contract-checking listener on every topic.
    fn validate_everything(
        bus: &EventBus,
    ) -> (Arc<Mutex<Vec<ContractViolation>>>, Vec<Subscription>) {
        let violations = Arc::new(Mutex::new(Vec::new()));
        let subscriptions = Topic::ALL
            .into_iter()
            .map(|topic| {
                let sink = violations.clone();
                bus.subscribe(topic, move |payload| {
                    if let Err(violation) = validate_payload(topic, payload) {
                        sink.lock().push(violation.clone());
                        return Err(ListenerError::Rejected(violation.to_string()));
                    }
                    Ok(())
                })
            })
            .collect();
        (violations, subscriptions)
    }

    // =============================================================================
    // TOPIC ISOLATION
    // =============================================================================

    #[test]
    fn test_workout_payload_reaches_only_workout_subscriber() {
        let (bus, reporter) = collecting_bus();
        let workouts: Arc<Mutex<Vec<Payload>>> = Arc::new(Mutex::new(Vec::new()));
        let meals = Arc::new(AtomicUsize::new(0));

        let sink = workouts.clone();
        let _w = bus.subscribe(Topic::WorkoutLogged, move |payload| {
            sink.lock().push(payload.clone());
            Ok(())
        });
        let counter = meals.clone();
        let _m = bus.subscribe(Topic::MealLogged, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let payload = json!({ "exercise": "Squats", "sets": 3, "reps": 10 });
        bus.publish(Topic::WorkoutLogged, &payload);

        assert_eq!(*workouts.lock(), vec![payload]);
        assert_eq!(meals.load(Ordering::SeqCst), 0);
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_typed_publish_matches_untyped_subscriber() {
        let (bus, _reporter) = collecting_bus();
        let received = Arc::new(Mutex::new(None));
        let sink = received.clone();
        let _sub = bus.subscribe(Topic::MealLogged, move |payload| {
            *sink.lock() = payload.get("calories").and_then(|c| c.as_u64());
            Ok(())
        });

        bus.publish_typed(Topic::MealLogged, &MealLogged::new("Oatmeal", 350))
            .unwrap();

        assert_eq!(*received.lock(), Some(350));
    }

    // =============================================================================
    // FAILURE ISOLATION
    // =============================================================================

    #[test]
    fn test_throwing_theme_listener_does_not_stop_second() {
        let (bus, reporter) = collecting_bus();
        let second = Arc::new(AtomicUsize::new(0));

        let failing = bus.subscribe(Topic::ThemeChanged, |_| {
            Err(ListenerError::Rejected("theme renderer crashed".into()))
        });
        let counter = second.clone();
        let _second = bus.subscribe(Topic::ThemeChanged, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        // Returns normally: the failure is never re-thrown to the publisher.
        bus.publish(Topic::ThemeChanged, &json!({ "theme": "dark" }));

        assert_eq!(second.load(Ordering::SeqCst), 1);
        let failures = reporter.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].topic, Topic::ThemeChanged);
        assert_eq!(failures[0].subscription_id, failing.id());
        assert_eq!(bus.listener_failures(), 1);
    }

    #[test]
    fn test_panicking_listener_is_isolated_like_an_error() {
        let (bus, reporter) = collecting_bus();
        let after = Arc::new(AtomicUsize::new(0));

        let _boom = bus.subscribe(Topic::UserUpdated, |_| panic!("profile widget exploded"));
        let counter = after.clone();
        let _after = bus.subscribe(Topic::UserUpdated, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.publish(Topic::UserUpdated, &json!({ "id": "1" }));
        bus.publish(Topic::UserUpdated, &json!({ "id": "1" }));

        assert_eq!(after.load(Ordering::SeqCst), 2);
        let failures = reporter.failures();
        assert_eq!(failures.len(), 2);
        assert!(matches!(&failures[0].error, ListenerError::Panicked(msg) if msg.contains("exploded")));
    }

    #[test]
    fn test_undecodable_payload_reports_decode_failure() {
        let (bus, reporter) = collecting_bus();
        let decoded = Arc::new(AtomicUsize::new(0));
        let raw = Arc::new(AtomicUsize::new(0));

        let counter = decoded.clone();
        let _typed = bus.subscribe_typed(Topic::WorkoutLogged, move |_: WorkoutLogged| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let counter = raw.clone();
        let _raw = bus.subscribe(Topic::WorkoutLogged, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.publish(Topic::WorkoutLogged, &json!({ "exercise": "Squats" }));

        assert_eq!(decoded.load(Ordering::SeqCst), 0);
        assert_eq!(raw.load(Ordering::SeqCst), 1);
        assert!(matches!(
            reporter.failures()[0].error,
            ListenerError::Decode { .. }
        ));
    }

    #[test]
    fn test_subscribe_once_across_publishes() {
        let (bus, _reporter) = collecting_bus();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let _once = bus.subscribe_once(Topic::MealDeleted, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        for _ in 0..5 {
            bus.publish(Topic::MealDeleted, &json!({ "id": "m-1" }));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(Topic::MealDeleted), 0);
    }

    // =============================================================================
    // PAYLOAD CONTRACTS
    // =============================================================================

    #[test]
    fn test_reference_payloads_satisfy_contracts() {
        let (bus, reporter) = collecting_bus();
        let (violations, _subs) = validate_everything(&bus);

        let workout = WorkoutLogged::new("Deadlift", 5, 5).with_weight(120.0);
        let meal = MealLogged::new("Rice", 400);
        bus.publish_typed(Topic::WorkoutLogged, &workout).unwrap();
        bus.publish_typed(Topic::WorkoutDeleted, &WorkoutDeleted { id: workout.id })
            .unwrap();
        bus.publish_typed(Topic::MealLogged, &meal).unwrap();
        bus.publish_typed(Topic::MealDeleted, &MealDeleted { id: meal.id })
            .unwrap();
        let user = UserUpdated {
            user: UserProfile::new("1", "Venkatesh"),
            logged_in: true,
            version: 1,
        };
        bus.publish_typed(Topic::UserUpdated, &user).unwrap();
        let theme = ThemeChanged {
            theme: Theme::Dark,
            version: 2,
        };
        bus.publish_typed(Topic::ThemeChanged, &theme).unwrap();

        assert!(violations.lock().is_empty(), "{:?}", violations.lock());
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_contract_drift_is_caught_by_validator() {
        let (bus, reporter) = collecting_bus();
        let (violations, _subs) = validate_everything(&bus);

        // A fragment that renamed `calories` to `kcal`.
        bus.publish(Topic::MealLogged, &json!({ "id": "m-1", "name": "Soup", "kcal": 120 }));

        let violations = violations.lock();
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            &violations[0],
            ContractViolation::MissingFields { missing, .. } if missing.contains(&"calories")
        ));
        assert_eq!(reporter.len(), 1);
    }
}
