//! Airlock Headless Simulation Harness
//!
//! Validates the door traversal coordinator end to end without any
//! rendering or host engine. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p airlock-simtest
//!   cargo run -p airlock-simtest -- --verbose

use airlock_core::components::{AirlockDoor, SECONDS_TO_OPEN};
use airlock_core::engine::SimulationEngine;
use airlock_core::generation::{build_layout, LayoutManifest};
use airlock_logic::grid::{CellOffset, GridCell};
use airlock_logic::nav::NavMode;
use airlock_logic::request::{classify, DoorRequest, DoorRequestKind, RequestState};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Layout manifest (same JSON a host would use) ────────────────────────
const MANIFEST_JSON: &str = include_str!("../../../data/door_manifest.json");

const TICK: f32 = 0.2;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Airlock Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Layout manifest validation
    results.extend(validate_manifest(verbose));

    // 2. Classification sweep
    results.extend(validate_classification(verbose));

    // 3. Request state machine
    results.extend(validate_request_lifecycle(verbose));

    // 4. End-to-end traversal through a door
    results.extend(validate_traversal(verbose));

    // 5. Demolition and cancellation cleanup
    results.extend(validate_cleanup(verbose));

    // 6. Generated layout sanity
    results.extend(validate_generated_layout(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Layout manifest ──────────────────────────────────────────────────

fn validate_manifest(_verbose: bool) -> Vec<TestResult> {
    println!("--- Layout Manifest ---");
    let mut results = Vec::new();

    let manifest = match LayoutManifest::from_json(MANIFEST_JSON) {
        Ok(m) => m,
        Err(e) => {
            results.push(TestResult {
                name: "manifest_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "manifest_has_doors".into(),
        passed: !manifest.doors.is_empty(),
        detail: format!("{} doors declared", manifest.doors.len()),
    });

    // Door footprints (base ± 1) must fit the grid.
    let out_of_bounds: Vec<_> = manifest
        .doors
        .iter()
        .filter(|d| d.x - 1 < 0 || d.x + 1 >= manifest.columns || d.y < 0 || d.y >= manifest.rows)
        .collect();
    results.push(TestResult {
        name: "manifest_doors_in_bounds".into(),
        passed: out_of_bounds.is_empty(),
        detail: if out_of_bounds.is_empty() {
            "all door footprints inside the grid".into()
        } else {
            format!("{} doors out of bounds", out_of_bounds.len())
        },
    });

    // Footprints must not overlap.
    let mut claimed = std::collections::HashSet::new();
    let mut overlapping = 0;
    for d in &manifest.doors {
        for dx in -1..=1 {
            if !claimed.insert((d.x + dx, d.y)) {
                overlapping += 1;
            }
        }
    }
    results.push(TestResult {
        name: "manifest_doors_disjoint".into(),
        passed: overlapping == 0,
        detail: format!("{} overlapping door cells", overlapping),
    });

    results
}

// ── 2. Classification sweep ─────────────────────────────────────────────

fn validate_classification(verbose: bool) -> Vec<TestResult> {
    println!("--- Request Classification ---");
    let mut results = Vec::new();

    let table = [
        (1, 1, Some(DoorRequestKind::EnterRight)),
        (1, 0, Some(DoorRequestKind::ExitRight)),
        (1, -1, Some(DoorRequestKind::ExitRight)),
        (-1, 1, Some(DoorRequestKind::ExitLeft)),
        (-1, 0, Some(DoorRequestKind::EnterLeft)),
        (-1, -1, Some(DoorRequestKind::EnterLeft)),
        (0, 1, None),
        (0, -1, None),
    ];

    let mut mismatches = Vec::new();
    for (door_dx, nav_dx, expected) in table {
        let got = classify(door_dx, nav_dx);
        if verbose {
            println!("  classify({:2}, {:2}) = {:?}", door_dx, nav_dx, got);
        }
        if got != expected {
            mismatches.push(format!(
                "classify({}, {}) = {:?}, expected {:?}",
                door_dx, nav_dx, got, expected
            ));
        }
    }
    results.push(TestResult {
        name: "classification_table".into(),
        passed: mismatches.is_empty(),
        detail: if mismatches.is_empty() {
            "all 8 geometry cases classified correctly".into()
        } else {
            mismatches.join("; ")
        },
    });

    // Side mapping is consistent with the kind names.
    let sides_ok = DoorRequestKind::EnterLeft.uses_left_side()
        && DoorRequestKind::ExitLeft.uses_left_side()
        && DoorRequestKind::EnterRight.uses_right_side()
        && DoorRequestKind::ExitRight.uses_right_side();
    results.push(TestResult {
        name: "classification_sides".into(),
        passed: sides_ok,
        detail: "kinds map to their door halves".into(),
    });

    results
}

// ── 3. Request state machine ────────────────────────────────────────────

fn validate_request_lifecycle(_verbose: bool) -> Vec<TestResult> {
    println!("--- Request Lifecycle ---");
    let mut results = Vec::new();

    let mut request = DoorRequest::new();
    request.queue();
    let queued = request.state() == RequestState::Queued;
    request.finish();
    let done = request.state() == RequestState::Done;
    request.finish();
    let still_done = request.state() == RequestState::Done;
    results.push(TestResult {
        name: "request_queue_finish".into(),
        passed: queued && done && still_done,
        detail: "Idle -> Queued -> Done, finish repeatable".into(),
    });

    let mut untouched = DoorRequest::new();
    untouched.finish();
    results.push(TestResult {
        name: "request_finish_idle_noop".into(),
        passed: untouched.state() == RequestState::Idle,
        detail: format!("finish on idle leaves {:?}", untouched.state()),
    });

    results
}

// ── 4. End-to-end traversal ─────────────────────────────────────────────

fn validate_traversal(verbose: bool) -> Vec<TestResult> {
    println!("--- Door Traversal ---");
    let mut results = Vec::new();

    // Door base (5,5), agent on its center cell stepping onto the right
    // sub-cell: EnterRight, wait for the right half, then pass.
    let mut engine = SimulationEngine::new();
    let door = engine.spawn_door(GridCell::new(5, 5));
    engine.complete_construction(door);
    let agent = engine.spawn_agent(GridCell::new(5, 5), NavMode::Tube);
    engine.request_move(agent, CellOffset::new(1, 0), Vec::new());

    results.push(TestResult {
        name: "traversal_gated".into(),
        passed: engine.is_waiting(agent),
        detail: "agent held while the right half opens".into(),
    });

    let mut ticks = 0u32;
    while engine.is_moving(agent) && ticks < 200 {
        engine.update(TICK);
        ticks += 1;
    }
    if verbose {
        println!("  crossed after {} ticks", ticks);
    }
    results.push(TestResult {
        name: "traversal_completes".into(),
        passed: engine.agent_cell(agent) == Some(GridCell::new(6, 5)),
        detail: format!(
            "agent at {:?} after {} ticks",
            engine.agent_cell(agent),
            ticks
        ),
    });

    // Minimum wall-clock: the door cannot open faster than its swing.
    let min_ticks = (SECONDS_TO_OPEN / TICK) as u32;
    results.push(TestResult {
        name: "traversal_waited_for_swing".into(),
        passed: ticks >= min_ticks,
        detail: format!("{} ticks >= {} swing ticks", ticks, min_ticks),
    });

    // The request was finished on arrival.
    let right_requested = engine
        .world
        .get::<&AirlockDoor>(door)
        .map(|d| d.right_requested())
        .unwrap_or(true);
    results.push(TestResult {
        name: "traversal_request_finished".into(),
        passed: !right_requested,
        detail: "no queued request left after arrival".into(),
    });

    // Center cell from the other direction is never gated.
    let mut engine = SimulationEngine::new();
    let door = engine.spawn_door(GridCell::new(6, 5));
    engine.complete_construction(door);
    let walker = engine.spawn_agent(GridCell::new(6, 7), NavMode::Tube);
    engine.request_move(walker, CellOffset::new(0, -2), Vec::new());
    results.push(TestResult {
        name: "traversal_center_passable".into(),
        passed: !engine.is_waiting(walker),
        detail: "center cell needs no request".into(),
    });

    results
}

// ── 5. Demolition & cancellation ────────────────────────────────────────

fn validate_cleanup(_verbose: bool) -> Vec<TestResult> {
    println!("--- Cleanup Paths ---");
    let mut results = Vec::new();

    // Demolition mid-wait: the vanished door is vacuously open.
    let mut engine = SimulationEngine::new();
    let door = engine.spawn_door(GridCell::new(5, 5));
    engine.complete_construction(door);
    if let Ok(mut d) = engine.world.get::<&mut AirlockDoor>(door) {
        d.stored_energy = 0.0; // can never open
    }
    let agent = engine.spawn_agent(GridCell::new(5, 5), NavMode::Tube);
    engine.request_move(agent, CellOffset::new(1, 0), Vec::new());
    for _ in 0..50 {
        engine.update(TICK);
    }
    let stuck = engine.is_waiting(agent);
    engine.demolish_door(door);
    engine.update(TICK);
    results.push(TestResult {
        name: "cleanup_demolition_releases".into(),
        passed: stuck && engine.agent_cell(agent) == Some(GridCell::new(6, 5)),
        detail: "agent released once the blocking door was demolished".into(),
    });

    // Cancellation mid-wait: requests finished, mapping empty.
    let mut engine = SimulationEngine::new();
    let door = engine.spawn_door(GridCell::new(5, 5));
    engine.complete_construction(door);
    let agent = engine.spawn_agent(GridCell::new(5, 5), NavMode::Tube);
    engine.request_move(agent, CellOffset::new(1, 0), Vec::new());
    engine.cancel_transition(agent);
    let no_request = engine
        .world
        .get::<&AirlockDoor>(door)
        .map(|d| !d.right_requested() && !d.left_requested())
        .unwrap_or(false);
    results.push(TestResult {
        name: "cleanup_cancel_finishes".into(),
        passed: no_request && !engine.is_moving(agent),
        detail: "cancel finished the queued request".into(),
    });

    // Despawn mid-wait behaves like cancel.
    let mut engine = SimulationEngine::new();
    let door = engine.spawn_door(GridCell::new(5, 5));
    engine.complete_construction(door);
    let agent = engine.spawn_agent(GridCell::new(5, 5), NavMode::Tube);
    engine.request_move(agent, CellOffset::new(1, 0), Vec::new());
    engine.despawn_agent(agent);
    let no_request = engine
        .world
        .get::<&AirlockDoor>(door)
        .map(|d| !d.right_requested())
        .unwrap_or(false);
    results.push(TestResult {
        name: "cleanup_despawn_finishes".into(),
        passed: no_request && engine.agent_count() == 0,
        detail: "agent teardown finished its requests".into(),
    });

    results
}

// ── 6. Generated layout ─────────────────────────────────────────────────

fn validate_generated_layout(verbose: bool) -> Vec<TestResult> {
    println!("--- Generated Layout ---");
    let mut results = Vec::new();

    let manifest = match LayoutManifest::from_json(MANIFEST_JSON) {
        Ok(m) => m,
        Err(_) => return results, // reported by validate_manifest
    };

    let mut engine = SimulationEngine::new();
    let mut rng = StdRng::seed_from_u64(42);
    let layout = build_layout(&mut engine, &manifest, &mut rng);

    results.push(TestResult {
        name: "layout_counts".into(),
        passed: layout.doors.len() == manifest.doors.len()
            && layout.agents.len() == manifest.agents as usize,
        detail: format!(
            "{} doors, {} agents spawned",
            layout.doors.len(),
            layout.agents.len()
        ),
    });

    // Walk each agent one column right, one at a time; every step must
    // complete, doored or not.
    let mut settled = 0;
    let mut total_ticks = 0u32;
    for &agent in &layout.agents {
        engine.request_move(agent, CellOffset::new(1, 0), Vec::new());
        let mut ticks = 0u32;
        while engine.is_moving(agent) && ticks < 200 {
            engine.update(TICK);
            ticks += 1;
        }
        total_ticks += ticks;
        if !engine.is_moving(agent) {
            settled += 1;
        }
    }
    if verbose {
        println!("  {} agents settled in {} ticks total", settled, total_ticks);
    }
    results.push(TestResult {
        name: "layout_all_agents_settle".into(),
        passed: settled == layout.agents.len(),
        detail: format!(
            "{}/{} agents completed their step",
            settled,
            layout.agents.len()
        ),
    });

    // After settling, no door half should still be requested.
    let lingering = layout
        .doors
        .iter()
        .filter(|&&d| {
            engine
                .world
                .get::<&AirlockDoor>(d)
                .map(|door| door.left_requested() || door.right_requested())
                .unwrap_or(false)
        })
        .count();
    results.push(TestResult {
        name: "layout_no_lingering_requests".into(),
        passed: lingering == 0,
        detail: format!("{} doors with lingering requests", lingering),
    });

    results
}
