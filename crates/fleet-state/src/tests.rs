//! Unit tests for fleet-state.

use fleet_core::{DriverId, DriverStatus, DriverUpdate, EtaRange, GeoPoint, LngLat, RollbackPolicy, SimRng, Timestamp};

use crate::{
    ActionKind, DeliveryAction, Driver, DriverStateStore, MovementModel, OptimisticUpdateManager,
    PopulationGenerator, SortField, SortOrder, StatusFilter, ROLLBACK_ERROR,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const NOW: Timestamp = Timestamp(1_700_000_000_000);

fn driver(name: &str, status: DriverStatus, lat: f64, lon: f64) -> Driver {
    Driver::new(DriverId::new_v4(), name, GeoPoint::new(lat, lon), status, NOW.plus_minutes(10), NOW)
}

fn store_of(drivers: Vec<Driver>) -> DriverStateStore {
    DriverStateStore::from_drivers(drivers)
}

fn update_for(d: &Driver, status: DriverStatus, lat: f64, lon: f64) -> DriverUpdate {
    DriverUpdate {
        driver_id: d.id,
        latitude:  lat,
        longitude: lon,
        status,
        eta:       NOW.plus_minutes(33),
    }
}

// ── Driver ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod driver_entity {
    use super::*;

    #[test]
    fn history_seeded_with_initial_position() {
        let d = driver("Ava Chen", DriverStatus::Idle, 47.5, -52.7);
        assert_eq!(d.route_history, vec![LngLat::new(-52.7, 47.5)]);
        assert_eq!(d.last_updated, NOW);
    }

    #[test]
    fn serializes_camel_case() {
        let d = driver("Ava Chen", DriverStatus::Paused, 47.5, -52.7);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["status"], "paused");
        assert_eq!(json["routeHistory"][0][0], -52.7);
        assert!(json.get("lastUpdated").is_some());
        let back: Driver = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }
}

// ── Confirmed updates ─────────────────────────────────────────────────────────

#[cfg(test)]
mod confirmed_updates {
    use super::*;

    #[test]
    fn overwrites_fields_exactly() {
        let d = driver("Ben", DriverStatus::Idle, 47.5, -52.7);
        let mut store = store_of(vec![d.clone()]);
        let u = update_for(&d, DriverStatus::Paused, 47.51, -52.71);

        assert!(store.apply_confirmed_update(&u, NOW + 2_000));
        let got = store.get(d.id).unwrap();
        assert_eq!(got.latitude, u.latitude);
        assert_eq!(got.longitude, u.longitude);
        assert_eq!(got.status, u.status);
        assert_eq!(got.eta, u.eta);
        assert_eq!(got.last_updated, NOW + 2_000);
    }

    #[test]
    fn last_updated_strictly_increases_with_frozen_clock() {
        let d = driver("Ben", DriverStatus::Idle, 47.5, -52.7);
        let mut store = store_of(vec![d.clone()]);
        let mut prev = store.get(d.id).unwrap().last_updated;
        for _ in 0..5 {
            store.apply_confirmed_update(&update_for(&d, DriverStatus::Idle, 47.5, -52.7), NOW);
            let now = store.get(d.id).unwrap().last_updated;
            assert!(now > prev);
            prev = now;
        }
    }

    #[test]
    fn history_appended_only_when_delivering_and_moved() {
        let d = driver("Chloe", DriverStatus::Delivering, 47.5, -52.7);
        let mut store = store_of(vec![d.clone()]);

        // Paused: no append even though position moved.
        store.apply_confirmed_update(&update_for(&d, DriverStatus::Paused, 47.6, -52.6), NOW);
        assert_eq!(store.get(d.id).unwrap().route_history.len(), 1);

        // Delivering and moved: append.
        store.apply_confirmed_update(&update_for(&d, DriverStatus::Delivering, 47.7, -52.5), NOW);
        assert_eq!(store.get(d.id).unwrap().route_history.len(), 2);

        // Delivering, same position: no append.
        store.apply_confirmed_update(&update_for(&d, DriverStatus::Delivering, 47.7, -52.5), NOW);
        let history = &store.get(d.id).unwrap().route_history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], LngLat::new(-52.7, 47.5));
    }

    #[test]
    fn unknown_driver_is_dropped() {
        let d = driver("Daniel", DriverStatus::Idle, 47.5, -52.7);
        let mut store = store_of(vec![]);
        assert!(!store.apply_confirmed_update(&update_for(&d, DriverStatus::Idle, 1.0, 1.0), NOW));
        assert!(store.get(d.id).is_none());
        assert!(store.is_empty());
    }
}

// ── advance / movement ────────────────────────────────────────────────────────

#[cfg(test)]
mod advance {
    use super::*;

    #[test]
    fn non_delivering_drivers_unchanged() {
        let idle   = driver("Elena", DriverStatus::Idle, 47.5, -52.7);
        let paused = driver("Farah", DriverStatus::Paused, 47.5, -52.7);
        let mut store = store_of(vec![idle.clone(), paused.clone()]);
        let mut rng = SimRng::new(1);

        assert!(!store.advance(idle.id, NOW, &mut rng));
        assert!(!store.advance(paused.id, NOW, &mut rng));
        assert!(!store.advance(DriverId::new_v4(), NOW, &mut rng));
        assert_eq!(store.get(idle.id).unwrap(), &idle);
        assert_eq!(store.get(paused.id).unwrap(), &paused);
    }

    #[test]
    fn delivering_driver_walks_and_records() {
        let d = driver("Gavin", DriverStatus::Delivering, 47.5, -52.7);
        let mut store = store_of(vec![d.clone()]);
        let mut rng = SimRng::new(2);

        for i in 0..10 {
            assert!(store.advance(d.id, NOW + i, &mut rng));
        }
        let got = store.get(d.id).unwrap();
        assert_eq!(got.route_history.len(), 11);
        assert_eq!(got.route_history[0], LngLat::new(-52.7, 47.5));
        let last = got.last_point().unwrap();
        assert_eq!(last, got.position().to_lng_lat());
    }

    #[test]
    fn step_length_within_bounds() {
        let model = MovementModel::default();
        let mut rng = SimRng::new(3);
        let mut d = driver("Hana", DriverStatus::Delivering, 47.5, -52.7);
        d.route_history.push(LngLat::new(-52.6999, 47.5001));
        for _ in 0..200 {
            let next = model.next_position(&d, &mut rng);
            let last = d.last_point().unwrap();
            let step = ((next.lat - last.lat).powi(2) + (next.lon - last.lng).powi(2)).sqrt();
            assert!(step >= 0.0001 - 1e-12 && step <= 0.0003 + 1e-12, "step {step}");
        }
    }

    #[test]
    fn heading_persists_within_turn_limit() {
        let model = MovementModel::default();
        let mut rng = SimRng::new(4);
        let mut d = driver("Isaac", DriverStatus::Delivering, 0.0, 0.0);
        // Heading due east in (lng, lat) space.
        d.route_history = vec![LngLat::new(0.0, 0.0), LngLat::new(0.001, 0.0)];
        for _ in 0..200 {
            let next = model.next_position(&d, &mut rng);
            let heading = (next.lat - 0.0).atan2(next.lon - 0.001);
            assert!(heading.abs() <= 0.2 + 1e-9, "heading {heading}");
        }
    }

    #[test]
    fn seeded_walk_is_reproducible() {
        let d = driver("Jade", DriverStatus::Delivering, 47.5, -52.7);
        let mut a = store_of(vec![d.clone()]);
        let mut b = store_of(vec![d.clone()]);
        let (mut ra, mut rb) = (SimRng::new(5), SimRng::new(5));
        for _ in 0..5 {
            a.advance(d.id, NOW, &mut ra);
            b.advance(d.id, NOW, &mut rb);
        }
        assert_eq!(a.get(d.id), b.get(d.id));
    }
}

// ── Population / reset ────────────────────────────────────────────────────────

#[cfg(test)]
mod population {
    use super::*;

    #[test]
    fn reset_twenty_unique_fresh_drivers() {
        let mut store = store_of(vec![driver("Old", DriverStatus::Idle, 0.0, 0.0)]);
        let mut rng = SimRng::new(6);
        let generator = PopulationGenerator::default();
        store.reset(&generator, 20, NOW, &mut rng);

        assert_eq!(store.len(), 20);
        let unique: std::collections::HashSet<_> = store.ids().iter().collect();
        assert_eq!(unique.len(), 20);
        for d in store.iter() {
            assert_eq!(d.route_history.len(), 1);
            assert_eq!(d.route_history[0], d.position().to_lng_lat());
            let minutes = d.eta.millis_since(NOW) / 60_000;
            assert!(d.eta > NOW && (5..=50).contains(&minutes));
            assert_eq!(d.last_updated, NOW);
            assert!(d.position().within_bbox(generator.base, 0.05 + 1e-12));
            assert!(!d.name.is_empty());
        }
    }

    #[test]
    fn reset_clears_stale_selection() {
        let old = driver("Old", DriverStatus::Idle, 0.0, 0.0);
        let mut store = store_of(vec![old.clone()]);
        store.select_driver(Some(old.id));
        store.reset(&PopulationGenerator::default(), 20, NOW, &mut SimRng::new(7));
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn seeded_population_reproducible() {
        let g = PopulationGenerator::default();
        let a = g.generate(5, NOW, &mut SimRng::new(8));
        let b = g.generate(5, NOW, &mut SimRng::new(8));
        assert_eq!(a, b);
    }
}

// ── Optimistic actions ────────────────────────────────────────────────────────

#[cfg(test)]
mod optimistic {
    use super::*;

    fn setup(status: DriverStatus) -> (DriverStateStore, OptimisticUpdateManager, Driver, SimRng) {
        let d = driver("Kofi", status, 47.5, -52.7);
        (store_of(vec![d.clone()]), OptimisticUpdateManager::new(), d, SimRng::new(9))
    }

    #[test]
    fn action_to_status_mapping() {
        assert_eq!(ActionKind::Paused.target_status(), DriverStatus::Paused);
        assert_eq!(ActionKind::Resume.target_status(), DriverStatus::Delivering);
        assert_eq!(ActionKind::Reassign.target_status(), DriverStatus::Delivering);
        assert_eq!(ActionKind::Complete.target_status(), DriverStatus::Idle);
    }

    #[test]
    fn apply_is_visible_immediately() {
        let (mut store, mut mgr, d, mut rng) = setup(DriverStatus::Delivering);
        let action = DeliveryAction::new(ActionKind::Paused, d.id);
        assert!(mgr.apply(d.id, action, &mut store, EtaRange::DEFAULT, NOW, &mut rng));
        assert_eq!(store.get(d.id).unwrap().status, DriverStatus::Paused);
        assert_eq!(store.get(d.id).unwrap().eta, d.eta);
        assert_eq!(mgr.get(d.id), Some(&action));
    }

    #[test]
    fn resume_draws_new_eta() {
        let (mut store, mut mgr, d, mut rng) = setup(DriverStatus::Paused);
        let later = NOW + 3_600_000;
        mgr.apply(d.id, DeliveryAction::new(ActionKind::Resume, d.id), &mut store, EtaRange::DEFAULT, later, &mut rng);
        let got = store.get(d.id).unwrap();
        assert_eq!(got.status, DriverStatus::Delivering);
        let minutes = got.eta.millis_since(later) / 60_000;
        assert!((5..=50).contains(&minutes));
    }

    #[test]
    fn confirm_keeps_mutation() {
        let (mut store, mut mgr, d, mut rng) = setup(DriverStatus::Delivering);
        mgr.apply(d.id, DeliveryAction::new(ActionKind::Complete, d.id), &mut store, EtaRange::DEFAULT, NOW, &mut rng);
        assert!(mgr.confirm(d.id).is_some());
        assert!(mgr.is_empty());
        assert_eq!(store.get(d.id).unwrap().status, DriverStatus::Idle);
        assert!(store.error().is_none());
        assert!(mgr.confirm(d.id).is_none());
    }

    #[test]
    fn rollback_keep_optimistic_leaves_fields() {
        let (mut store, mut mgr, d, mut rng) = setup(DriverStatus::Delivering);
        mgr.apply(d.id, DeliveryAction::new(ActionKind::Paused, d.id), &mut store, EtaRange::DEFAULT, NOW, &mut rng);
        assert!(mgr.rollback(d.id, RollbackPolicy::KeepOptimistic, &mut store).is_some());
        assert!(!mgr.is_pending(d.id));
        assert_eq!(store.error(), Some(ROLLBACK_ERROR));
        assert_eq!(store.get(d.id).unwrap().status, DriverStatus::Paused);

        store.clear_error();
        assert!(store.error().is_none());
    }

    #[test]
    fn rollback_restore_pre_image_reverts_status_and_eta() {
        let (mut store, mut mgr, d, mut rng) = setup(DriverStatus::Paused);
        mgr.apply(d.id, DeliveryAction::new(ActionKind::Resume, d.id), &mut store, EtaRange::DEFAULT, NOW, &mut rng);
        mgr.apply(d.id, DeliveryAction::new(ActionKind::Complete, d.id), &mut store, EtaRange::DEFAULT, NOW, &mut rng);
        assert_eq!(mgr.len(), 1);
        assert_eq!(mgr.get(d.id).unwrap().kind, ActionKind::Complete);

        mgr.rollback(d.id, RollbackPolicy::RestorePreImage, &mut store);
        let got = store.get(d.id).unwrap();
        assert_eq!(got.status, DriverStatus::Paused);
        assert_eq!(got.eta, d.eta);
        assert!(store.error().is_some());
    }

    #[test]
    fn unknown_driver_records_nothing() {
        let (mut store, mut mgr, _, mut rng) = setup(DriverStatus::Idle);
        let ghost = DriverId::new_v4();
        assert!(!mgr.apply(ghost, DeliveryAction::new(ActionKind::Paused, ghost), &mut store, EtaRange::DEFAULT, NOW, &mut rng));
        assert!(mgr.is_empty());
    }

    #[test]
    fn wire_shape() {
        let id = DriverId::new_v4();
        let action = DeliveryAction::new(ActionKind::Reassign, id);
        let json = serde_json::to_value(action).unwrap();
        assert_eq!(json["type"], "reassign");
        assert_eq!(json["driverId"], id.to_string());
        assert!(json.get("targetDriverId").is_none());

        let parsed: DeliveryAction = serde_json::from_str(&format!(
            r#"{{"type":"complete","driverId":"{id}","targetDriverId":"{id}"}}"#
        ))
        .unwrap();
        assert_eq!(parsed.kind, ActionKind::Complete);
        assert_eq!(parsed.target_driver_id, Some(id));
    }
}

// ── Presentation state and queries ────────────────────────────────────────────

#[cfg(test)]
mod queries {
    use super::*;

    fn sample() -> DriverStateStore {
        let mut a = driver("Marco Reid", DriverStatus::Delivering, 47.55, -52.75);
        let mut b = driver("ava singh", DriverStatus::Idle, 47.56, -52.74);
        let mut c = driver("Lena Walsh", DriverStatus::Paused, 10.0, 10.0);
        a.eta = NOW.plus_minutes(30);
        b.eta = NOW.plus_minutes(10);
        c.eta = NOW.plus_minutes(20);
        store_of(vec![a, b, c])
    }

    fn names(list: &[&Driver]) -> Vec<String> {
        list.iter().map(|d| d.name.clone()).collect()
    }

    #[test]
    fn search_matches_name_or_status_case_insensitive() {
        let store = sample();
        assert_eq!(names(&store.search_and_sort("AVA", SortField::Name, SortOrder::Asc)), ["ava singh"]);
        assert_eq!(names(&store.search_and_sort("deliv", SortField::Name, SortOrder::Asc)), ["Marco Reid"]);
        assert_eq!(store.search_and_sort("", SortField::Name, SortOrder::Asc).len(), 3);
        assert!(store.search_and_sort("zzz", SortField::Name, SortOrder::Asc).is_empty());
    }

    #[test]
    fn sort_by_each_field() {
        let store = sample();
        assert_eq!(
            names(&store.search_and_sort("", SortField::Eta, SortOrder::Asc)),
            ["ava singh", "Lena Walsh", "Marco Reid"],
        );
        assert_eq!(
            names(&store.search_and_sort("", SortField::Eta, SortOrder::Desc)),
            ["Marco Reid", "Lena Walsh", "ava singh"],
        );
        assert_eq!(
            names(&store.search_and_sort("", SortField::Status, SortOrder::Asc)),
            ["Marco Reid", "ava singh", "Lena Walsh"],
        );
        assert_eq!(SortOrder::Asc.toggled(), SortOrder::Desc);
    }

    #[test]
    fn counts_active_and_total() {
        let c = sample().counts();
        assert_eq!((c.active, c.total), (1, 3));
    }

    #[test]
    fn geofence_excludes_far_drivers() {
        let store = sample();
        let center = GeoPoint::new(47.548, -52.747);
        assert_eq!(store.within_geofence(center, 1_000.0).len(), 2);
        assert_eq!(store.within_geofence(center, 20_000.0).len(), 3);
    }

    #[test]
    fn filter_by_status() {
        let mut store = sample();
        assert_eq!(store.filtered().count(), 3);
        store.set_filter(StatusFilter::Paused);
        let hits: Vec<_> = store.filtered().map(|d| d.name.as_str()).collect();
        assert_eq!(hits, ["Lena Walsh"]);
    }

    #[test]
    fn selection_requires_known_driver() {
        let mut store = sample();
        let id = store.ids()[1];
        store.select_driver(Some(id));
        assert_eq!(store.selected().map(|d| d.id), Some(id));
        store.select_driver(Some(DriverId::new_v4()));
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn loading_flag() {
        let mut store = sample();
        assert!(!store.is_loading());
        store.set_loading(true);
        assert!(store.is_loading());
    }
}
