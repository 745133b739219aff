//! Application shell: owns the process-lifetime systems (clock, input, audio,
//! asset registry) and exactly one loaded scene at a time.

use crate::assets::AssetLibrary;
use crate::config::SimConfig;
use crate::dialogue::SceneRequest;
use crate::scenes::{self, Scene, SceneKind};
use audio::AudioSystem;
use engine_core::Time;
use input::{InputState, SourceRegistry};
use std::path::Path;
use std::time::Duration;

pub struct App {
    pub cfg: SimConfig,
    pub time: Time,
    pub input: InputState,
    pub sources: SourceRegistry,
    pub audio: Option<AudioSystem>,
    pub assets: AssetLibrary,
    scene: Option<Scene>,
}

impl App {
    /// Build the shell. A missing audio device or missing cue files degrade
    /// to silence with a warning; they never fail startup.
    pub fn new(cfg: SimConfig) -> Self {
        let audio = match AudioSystem::new() {
            Ok(mut audio) => {
                for (name, file) in [
                    ("beep", "assets/audio/beep.ogg"),
                    ("heartbeat", "assets/audio/heartbeat.ogg"),
                ] {
                    if let Err(e) = audio.load_sound(name, Path::new(file)) {
                        log::warn!("audio cue '{name}' unavailable: {e}");
                    }
                }
                Some(audio)
            }
            Err(e) => {
                log::warn!("audio unavailable, running silent: {e}");
                None
            }
        };
        Self {
            cfg,
            time: Time::new(),
            input: InputState::new(),
            sources: SourceRegistry::new(),
            audio,
            assets: AssetLibrary::with_standard_assets(),
            scene: None,
        }
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Perform a UI action against the active scene.
    pub fn dispatch(&mut self, action: crate::ui::UiAction) {
        if let Some(scene) = &mut self.scene {
            scene.dispatch(action, &mut self.audio, &self.cfg);
        }
    }

    /// Tear down the current scene completely, then build the next one. The
    /// old scene's world, bodies, nodes, and timers are gone before the new
    /// builder runs.
    pub fn load_scene(&mut self, kind: SceneKind) {
        if let Some(mut old) = self.scene.take() {
            old.dispose(&mut self.audio);
        }
        log::info!("loading scene {:?}", kind);
        let scene = match kind {
            SceneKind::Menu => scenes::menu::build(&self.assets, &self.cfg),
            SceneKind::Showcase => scenes::showcase::build(&self.assets, &self.cfg),
            SceneKind::Exam => scenes::exam::build(&self.assets, &self.cfg),
        };
        self.scene = Some(scene);
    }

    /// Advance the whole application by one frame. Returns false once a quit
    /// has been requested.
    pub fn update(&mut self, delta: Duration) -> bool {
        self.time.advance(delta);
        let dt = delta.as_secs_f32();

        let mut request = None;
        if let Some(scene) = &mut self.scene {
            scene.update(dt, &self.input, &mut self.sources, &mut self.audio, &self.cfg);
            request = scene.take_transition();
        }
        self.input.begin_frame();
        self.sources.begin_frame();

        match request {
            Some(SceneRequest::Quit) => {
                log::info!("quit requested");
                false
            }
            Some(SceneRequest::Menu) => {
                self.load_scene(SceneKind::Menu);
                true
            }
            Some(SceneRequest::Showcase) => {
                self.load_scene(SceneKind::Showcase);
                true
            }
            Some(SceneRequest::Exam) => {
                self.load_scene(SceneKind::Exam);
                true
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::Grabbable;
    use crate::scenes::exam::HEAD_TARGET_CENTER;
    use engine_core::Vec3;
    use input::{ElementState, MouseButton, SourceId};

    const FRAME: Duration = Duration::from_nanos(16_666_667);

    fn run_seconds(app: &mut App, seconds: f32) {
        let frames = (seconds / FRAME.as_secs_f32()).ceil() as usize;
        for _ in 0..frames {
            app.update(FRAME);
        }
    }

    #[test]
    fn scene_switch_disposes_everything_from_the_previous_scene() {
        let mut app = App::new(SimConfig::default());
        app.load_scene(SceneKind::Exam);
        run_seconds(&mut app, 0.1);
        let scene = app.scene().unwrap();
        assert_eq!(scene.kind, SceneKind::Exam);
        assert!(scene.ticks > 0);
        assert_eq!(scene.physics.body_count(), 3);

        app.load_scene(SceneKind::Menu);
        let scene = app.scene().unwrap();
        assert_eq!(scene.kind, SceneKind::Menu);
        // Fresh scene: no surviving bodies, entities, or tick history.
        assert_eq!(scene.ticks, 0);
        assert_eq!(scene.physics.body_count(), 0);
        assert_eq!(scene.world.len(), 0);
        app.update(FRAME);
        assert_eq!(app.scene().unwrap().ticks, 1);
    }

    #[test]
    fn showcase_builds_every_catalog_item_with_info_buttons() {
        let mut app = App::new(SimConfig::default());
        app.load_scene(SceneKind::Showcase);
        let scene = app.scene().unwrap();
        let prop_count = scene
            .world
            .query::<&crate::props::Prop>()
            .iter()
            .count();
        assert_eq!(prop_count, crate::catalog::SHOWCASE_PROPS.len());
        // One info button per item, plus the mascot's talk zone.
        assert_eq!(scene.ui.len(), crate::catalog::SHOWCASE_PROPS.len() + 1);
    }

    #[test]
    fn thermometer_end_to_end_scenario() {
        let mut app = App::new(SimConfig::default());
        app.load_scene(SceneKind::Exam);
        let reach = app.cfg.pointer_reach;

        // Park the camera so the desktop pointer's hold point sits on the
        // thermometer, then press.
        let start = app.scene().unwrap().prop_position("thermometer").unwrap();
        {
            let scene = app.scene_mut().unwrap();
            let camera_pos = start + Vec3::new(0.0, 0.0, reach);
            scene.camera.set_pose(&mut scene.graph, camera_pos, 0.0, 0.0);
        }
        app.input
            .process_mouse_button(MouseButton::Left, ElementState::Pressed);
        app.update(FRAME);
        let held = app.scene().unwrap().grab.held_by(SourceId::Pointer);
        assert!(held.is_some(), "pointer should grab the thermometer");

        // Walk the hold point over the patient's head and wait for the
        // instrument to arrive.
        {
            let scene = app.scene_mut().unwrap();
            let camera_pos = HEAD_TARGET_CENTER + Vec3::new(0.0, 0.0, reach);
            scene.camera.set_pose(&mut scene.graph, camera_pos, 0.0, 0.0);
        }
        let mut frames = 0;
        while !app.scene().unwrap().sequencer.is_processing() {
            app.update(FRAME);
            frames += 1;
            assert!(frames < 600, "measurement never started");
        }
        assert!(!app.scene().unwrap().overlay.is_reading_visible("head"));

        // Reading lands 1.0 s after entry…
        run_seconds(&mut app, 0.9);
        assert!(!app.scene().unwrap().overlay.is_reading_visible("head"));
        run_seconds(&mut app, 0.2);
        let scene = app.scene().unwrap();
        assert!(scene.overlay.is_reading_visible("head"));
        assert_eq!(scene.overlay.reading("head").unwrap().text, "36.4°C");

        // …and clears 2.0 s later, returning the thermometer to rest.
        run_seconds(&mut app, 2.2);
        let scene = app.scene().unwrap();
        assert!(!scene.overlay.is_reading_visible("head"));
        assert!(!scene.sequencer.is_processing());

        // After the cooldown the thermometer is grabbable again.
        run_seconds(&mut app, 1.6);
        let scene = app.scene().unwrap();
        let entity = scene.prop_entity("thermometer").unwrap();
        let grabbable = *scene.world.get::<&Grabbable>(entity).unwrap();
        assert!(grabbable.is_pickable());
    }

    #[test]
    fn lobby_button_requests_the_menu_scene() {
        let mut app = App::new(SimConfig::default());
        app.load_scene(SceneKind::Exam);
        {
            let scene = app.scene_mut().unwrap();
            // Face the lobby button head-on from inside UI ray range.
            scene
                .camera
                .set_pose(&mut scene.graph, Vec3::new(-13.5, 1.8, 30.0), 0.0, 0.0);
        }
        app.input
            .process_keyboard(input::KeyCode::KeyE, ElementState::Pressed);
        app.update(FRAME);
        assert_eq!(app.scene().unwrap().kind, SceneKind::Menu);
    }
}
