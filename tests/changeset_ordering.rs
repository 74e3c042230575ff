#![cfg(feature = "arch")]
#![allow(clippy::unwrap_used, clippy::pedantic)]
//! Change-set ordering through the single-phase backend

mod common;

use ordo::backends::{PacmanBackend, SorterBackend, plan_transaction};
use ordo::core::{ChangeSet, LoopError, PackageOp, PackageStep};
use ordo::model::Pool;
use ordo::sorter::RelationGraph;

#[test]
fn test_already_installed_provider_leaves_install_unconstrained() {
    common::init_test_env();
    // ===== ARRANGE =====
    let mut pool = Pool::new();
    let app = pool.add_package("app", "1.0");
    // Installed provider, not part of the change-set.
    common::installed(&mut pool, "lib", "1.0");
    pool.add_requires(app, "lib", false);

    let mut changes = ChangeSet::new();
    changes.set(app, PackageOp::Install);

    // ===== ACT =====
    let plan = plan_transaction(&PacmanBackend::new(), &pool, &changes).unwrap();

    // ===== ASSERT =====
    assert_eq!(plan, vec![PackageStep::install(app)]);
}

#[test]
fn test_provider_installs_before_dependent() {
    common::init_test_env();
    let mut pool = Pool::new();
    let app = pool.add_package("app", "1.0");
    let dep = common::available(&mut pool, "dep", "1.0");
    pool.add_requires(app, "dep", true);

    let mut changes = ChangeSet::new();
    changes.set(app, PackageOp::Install);
    changes.set(dep, PackageOp::Install);

    let plan = plan_transaction(&PacmanBackend::new(), &pool, &changes).unwrap();
    assert_eq!(
        plan,
        vec![PackageStep::install(dep), PackageStep::install(app)]
    );
}

#[test]
fn test_requirement_cycle_breaks_the_ordinary_edge() {
    common::init_test_env();
    // app needs dep (ordinary); dep pre-needs app. Only the pre-requirement
    // can survive the loop.
    let mut pool = Pool::new();
    let app = common::available(&mut pool, "app", "1.0");
    let dep = common::available(&mut pool, "dep", "1.0");
    pool.add_requires(app, "dep", false);
    pool.add_requires(dep, "app", true);

    let mut changes = ChangeSet::new();
    changes.set(app, PackageOp::Install);
    changes.set(dep, PackageOp::Install);

    let backend = PacmanBackend::new();
    let mut graph = RelationGraph::new();
    backend.populate(&pool, &changes, &mut graph).unwrap();
    let order = graph.linearize().unwrap();

    assert_eq!(
        order,
        vec![PackageStep::install(app), PackageStep::install(dep)]
    );
    assert_eq!(
        graph.disabled_relations(),
        vec![(PackageStep::install(dep), PackageStep::install(app))]
    );
}

#[test]
fn test_upgraded_package_is_removed_first() {
    common::init_test_env();
    let mut pool = Pool::new();
    let new = pool.add_package("tool", "2.0");
    let old = common::installed(&mut pool, "tool-old", "1.0");
    pool.add_upgrades(new, "tool-old");

    let mut changes = ChangeSet::new();
    changes.set(new, PackageOp::Install);
    changes.set(old, PackageOp::Remove);

    let plan = plan_transaction(&PacmanBackend::new(), &pool, &changes).unwrap();
    assert_eq!(
        plan,
        vec![PackageStep::remove(old), PackageStep::install(new)]
    );
}

#[test]
fn test_conflicting_package_is_removed_first() {
    common::init_test_env();
    let mut pool = Pool::new();
    let new = pool.add_package("mta-b", "1.0");
    let old = common::installed(&mut pool, "mta-a", "1.0");
    pool.add_provides(old, "mta");
    pool.add_conflicts(new, "mta");

    let mut changes = ChangeSet::new();
    changes.set(new, PackageOp::Install);
    changes.set(old, PackageOp::Remove);

    let plan = plan_transaction(&PacmanBackend::new(), &pool, &changes).unwrap();
    assert_eq!(
        plan,
        vec![PackageStep::remove(old), PackageStep::install(new)]
    );
}

#[test]
fn test_plan_serializes_for_the_executor() {
    common::init_test_env();
    let mut pool = Pool::new();
    let app = pool.add_package("app", "1.0");
    let mut changes = ChangeSet::new();
    changes.set(app, PackageOp::Install);

    let plan = plan_transaction(&PacmanBackend::new(), &pool, &changes).unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json, serde_json::json!([{ "package": 0, "op": "install" }]));
}

#[test]
fn test_plan_is_a_permutation_of_the_changeset() {
    common::init_test_env();
    let mut pool = Pool::new();
    let mut changes = ChangeSet::new();
    let mut scheduled = Vec::new();
    for (at, name) in ["a", "b", "c", "d"].iter().enumerate() {
        let id = common::available(&mut pool, name, "1.0");
        let op = if at % 2 == 0 {
            PackageOp::Install
        } else {
            PackageOp::Remove
        };
        changes.set(id, op);
        scheduled.push(PackageStep { package: id, op });
    }

    let mut plan = plan_transaction(&PacmanBackend::new(), &pool, &changes).unwrap();
    assert_eq!(plan.len(), changes.len());
    plan.sort_by_key(|step| step.package);
    scheduled.sort_by_key(|step| step.package);
    assert_eq!(plan, scheduled);
}

#[test]
fn test_loop_error_renders_step_cycles() {
    let err = LoopError {
        loops: vec![vec![
            "install a".to_string(),
            "install b".to_string(),
            "install a".to_string(),
        ]],
    };
    let rendered = err.to_string();
    assert!(rendered.contains("unresolvable"));
    assert!(rendered.contains("install a -> install b -> install a"));
}
