//! OpenCare: an interactive medical-training simulation.
//!
//! The binary drives a deterministic walkthrough of all three scenes (lobby,
//! instrument showcase, patient examination) using the same input paths an
//! embedder would wire to a window and an XR session: desktop keyboard/mouse
//! state and tracked controller poses. Useful as a smoke run and as a living
//! description of the whole interaction flow; the transcript lands in the log.

mod app;
mod assets;
mod catalog;
mod config;
mod dialogue;
mod grab;
mod info_panel;
mod mascot;
mod overlay;
mod player;
mod props;
mod scenes;
mod targets;
mod ui;

use app::App;
use config::SimConfig;
use engine_core::Vec3;
use glam::Quat;
use input::{ElementState, Handedness, KeyCode, MouseButton, SourceId};
use scenes::exam::{ARM_TARGET_CENTER, CHEST_TARGET_CENTER, HEAD_TARGET_CENTER};
use scenes::SceneKind;
use std::time::Duration;
use ui::UiAction;

const FRAME: Duration = Duration::from_nanos(16_666_667);

fn main() {
    env_logger::init();
    let cfg = SimConfig::load();
    let mut app = App::new(cfg);
    app.load_scene(SceneKind::Menu);
    walkthrough(&mut app);
    log::info!("walkthrough finished");
}

/// Step the app for a stretch of simulated time. Returns false on quit.
fn run(app: &mut App, seconds: f32) -> bool {
    let frames = (seconds / FRAME.as_secs_f32()).ceil() as usize;
    for _ in 0..frames {
        if !app.update(FRAME) {
            return false;
        }
    }
    true
}

/// Step until a predicate holds. Returns false on quit or timeout.
fn wait_until(app: &mut App, timeout: f32, pred: impl Fn(&App) -> bool) -> bool {
    let frames = (timeout / FRAME.as_secs_f32()).ceil() as usize;
    for _ in 0..frames {
        if pred(app) {
            return true;
        }
        if !app.update(FRAME) {
            return false;
        }
    }
    log::warn!("walkthrough wait timed out");
    false
}

/// Wait out the typewriter, print the narration line, and click Continue.
fn continue_dialogue(app: &mut App) {
    wait_until(app, 30.0, |a| {
        a.scene().map(|s| s.dialogue.continue_enabled()).unwrap_or(false)
    });
    if let Some(scene) = app.scene_mut() {
        log::info!("narrator: {}", scene.dialogue.body_visible_text());
        scene.dialogue.advance();
    }
}

fn wait_for_choice(app: &mut App) {
    wait_until(app, 30.0, |a| {
        a.scene().map(|s| s.dialogue.choice_visible()).unwrap_or(false)
    });
}

/// Park the camera so its forward ray (and pointer hold point) meets `focus`.
fn face(app: &mut App, focus: Vec3, distance: f32) {
    if let Some(scene) = app.scene_mut() {
        let camera_pos = focus + Vec3::new(0.0, 0.0, distance);
        scene.camera.set_pose(&mut scene.graph, camera_pos, 0.0, 0.0);
    }
}

/// Carry one instrument onto its target with the right-hand controller and
/// let the measurement sequence play out.
fn measure_with_controller(app: &mut App, id: &str, target: Vec3) {
    let Some(position) = app.scene().and_then(|s| s.prop_position(id)) else {
        log::warn!("{id} not present, skipping measurement");
        return;
    };
    let hand = app.sources.add_controller(Handedness::Right);
    let dt = FRAME.as_secs_f32();
    app.sources.set_pose(hand, position, Quat::IDENTITY, dt);
    app.sources.press(hand);
    run(app, 0.1);
    // Lift clear of the table, carry over, then lower onto the target; a
    // straight-line drag would stop at the table edge on the raycast guard.
    let lift = Vec3::new(0.0, 0.6, 0.0);
    app.sources.set_pose(hand, position + lift, Quat::IDENTITY, dt);
    run(app, 0.6);
    app.sources.set_pose(hand, target + lift, Quat::IDENTITY, dt);
    run(app, 0.8);
    app.sources.set_pose(hand, target, Quat::IDENTITY, dt);
    if !wait_until(app, 5.0, |a| {
        a.scene().map(|s| s.sequencer.is_processing()).unwrap_or(false)
    }) {
        log::warn!("{id} never reached its target");
    }
    // Reading lands after 1 s, clears after another 2 s.
    run(app, 3.5);
    app.sources.release(hand);
    run(app, 0.2);
}

fn walkthrough(app: &mut App) {
    // ── Lobby ───────────────────────────────────────────────────────────
    continue_dialogue(app);
    continue_dialogue(app);
    if let Some(scene) = app.scene_mut() {
        if let Some(credits) = &mut scene.credits {
            credits.show();
            log::info!("credits:\n{}", credits.text);
            credits.hide();
        }
    }
    wait_for_choice(app);
    if let Some(scene) = app.scene_mut() {
        scene.dialogue.choose_ready();
    }
    wait_until(app, 30.0, |a| {
        a.scene().map(|s| s.kind == SceneKind::Showcase).unwrap_or(false)
    });

    // ── Showcase ────────────────────────────────────────────────────────
    // Open the stethoscope's info button with the interact key.
    if let Some(def) = catalog::find(catalog::SHOWCASE_PROPS, "stethoscope") {
        if let Some(position) = app.scene().and_then(|s| s.prop_position("stethoscope")) {
            let button = position + Vec3::new(0.0, def.half_extents.y + 0.3, 0.0);
            face(app, button, 1.2);
            app.input.process_keyboard(KeyCode::KeyE, ElementState::Pressed);
            run(app, 0.05);
            app.input.process_keyboard(KeyCode::KeyE, ElementState::Released);
        }
    }
    if let Some(scene) = app.scene_mut() {
        if let Some(body) = scene.info_panel.body_text() {
            log::info!("info panel: {body}");
        }
        scene.info_panel.advance();
        scene.info_panel.select_question(0);
        if let Some(answer) = scene.info_panel.body_text() {
            log::info!("answer: {answer}");
        }
        scene.info_panel.ask_again();
        scene.info_panel.close(&mut scene.graph);
    }

    // Pick up the reflex hammer with the desktop pointer and toss it.
    let reach = app.cfg.pointer_reach;
    if let Some(position) = app.scene().and_then(|s| s.prop_position("reflex_hammer")) {
        face(app, position, reach);
        app.input
            .process_mouse_button(MouseButton::Left, ElementState::Pressed);
        run(app, 0.3);
        face(app, position + Vec3::new(0.5, 0.5, 0.0), reach);
        run(app, 0.5);
        app.input
            .process_mouse_button(MouseButton::Left, ElementState::Released);
        run(app, 0.5);
        if app
            .scene()
            .and_then(|s| s.grab.held_by(SourceId::Pointer))
            .is_some()
        {
            log::warn!("reflex hammer still held after release");
        }
    }

    // A question for the mascot, then the ready check, with a detour
    // through "not ready" to show the loop.
    app.dispatch(UiAction::AskMascot);
    continue_dialogue(app);
    continue_dialogue(app);
    wait_for_choice(app);
    if let Some(scene) = app.scene_mut() {
        scene.dialogue.choose_not_ready();
    }
    wait_for_choice(app);
    if let Some(scene) = app.scene_mut() {
        scene.dialogue.choose_ready();
    }
    wait_until(app, 30.0, |a| {
        a.scene().map(|s| s.kind == SceneKind::Exam).unwrap_or(false)
    });

    // ── Examination ─────────────────────────────────────────────────────
    for _ in 0..4 {
        continue_dialogue(app);
    }
    measure_with_controller(app, "stethoscope", CHEST_TARGET_CENTER);
    continue_dialogue(app);
    measure_with_controller(app, "tensimeter", ARM_TARGET_CENTER);
    continue_dialogue(app);

    // The thermometer goes the desktop route, as on machines without VR.
    if let Some(position) = app.scene().and_then(|s| s.prop_position("thermometer")) {
        face(app, position, reach);
        app.input
            .process_mouse_button(MouseButton::Left, ElementState::Pressed);
        run(app, 0.1);
        face(app, HEAD_TARGET_CENTER, reach);
        wait_until(app, 5.0, |a| {
            a.scene().map(|s| s.sequencer.is_processing()).unwrap_or(false)
        });
        run(app, 3.5);
        app.input
            .process_mouse_button(MouseButton::Left, ElementState::Released);
    }

    // Tidy the table with the reset shortcut, then close out the script.
    app.input.process_keyboard(KeyCode::KeyR, ElementState::Pressed);
    run(app, 0.05);
    app.input.process_keyboard(KeyCode::KeyR, ElementState::Released);
    continue_dialogue(app);
    continue_dialogue(app);
    wait_until(app, 30.0, |a| {
        a.scene().map(|s| s.kind == SceneKind::Menu).unwrap_or(false)
    });

    // ── Back in the lobby: leave ────────────────────────────────────────
    continue_dialogue(app);
    continue_dialogue(app);
    wait_for_choice(app);
    if let Some(scene) = app.scene_mut() {
        scene.dialogue.choose_exit();
    }
    run(app, 1.0);
}
