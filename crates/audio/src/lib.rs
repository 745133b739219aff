//! Audio system using Kira for measurement feedback cues.
//!
//! The simulation uses flat 2D cues only: a one-shot beep when a reading
//! appears, and a heartbeat loop while the stethoscope rests on the chest.
//! Construction can fail on machines without an audio device; callers hold an
//! `Option<AudioSystem>` and degrade to silence rather than failing the scene.

use anyhow::Result;
use kira::{
    manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings},
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    tween::Tween,
};
use std::collections::HashMap;
use std::path::Path;

/// Main audio system managing one-shot cues and named loops.
pub struct AudioSystem {
    manager: AudioManager,
    sounds: HashMap<String, StaticSoundData>,
    active_sounds: Vec<StaticSoundHandle>,
    loops: HashMap<String, StaticSoundHandle>,
}

impl AudioSystem {
    /// Create a new audio system.
    pub fn new() -> Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())?;
        Ok(Self {
            manager,
            sounds: HashMap::new(),
            active_sounds: Vec::new(),
            loops: HashMap::new(),
        })
    }

    /// Load a sound from a file. A missing cue file is reported to the caller;
    /// playing an unloaded cue later is a silent no-op.
    pub fn load_sound(&mut self, name: &str, path: &Path) -> Result<()> {
        let sound_data = StaticSoundData::from_file(path)?;
        self.sounds.insert(name.to_string(), sound_data);
        Ok(())
    }

    /// Whether a cue with this name has been loaded.
    pub fn has_sound(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    /// Play a one-shot cue.
    pub fn play(&mut self, name: &str) -> Result<()> {
        if let Some(sound_data) = self.sounds.get(name) {
            let handle = self.manager.play(sound_data.clone())?;
            self.active_sounds.push(handle);
        }
        Ok(())
    }

    /// Play a one-shot cue with volume control.
    pub fn play_with_volume(&mut self, name: &str, volume: f64) -> Result<()> {
        if let Some(sound_data) = self.sounds.get(name) {
            let settings = StaticSoundSettings::new().volume(volume);
            let modified = sound_data.clone().with_settings(settings);
            let handle = self.manager.play(modified)?;
            self.active_sounds.push(handle);
        }
        Ok(())
    }

    /// Start a named loop (e.g. the heartbeat). Starting an already-running
    /// loop is a no-op.
    pub fn play_loop(&mut self, name: &str) -> Result<()> {
        if self.loops.contains_key(name) {
            return Ok(());
        }
        if let Some(sound_data) = self.sounds.get(name) {
            let settings = StaticSoundSettings::new().loop_region(0.0..);
            let modified = sound_data.clone().with_settings(settings);
            let handle = self.manager.play(modified)?;
            self.loops.insert(name.to_string(), handle);
        }
        Ok(())
    }

    /// Stop a named loop. Stopping a loop that isn't running is a no-op.
    pub fn stop_loop(&mut self, name: &str) {
        if let Some(mut handle) = self.loops.remove(name) {
            let _ = handle.stop(Tween::default());
        }
    }

    /// Whether a named loop is currently running.
    pub fn is_looping(&self, name: &str) -> bool {
        self.loops.contains_key(name)
    }

    /// Clean up finished one-shot sounds.
    pub fn cleanup(&mut self) {
        self.active_sounds
            .retain(|handle| handle.state() != kira::sound::PlaybackState::Stopped);
    }

    /// Stop everything, loops included. Called on scene teardown.
    pub fn stop_all(&mut self) {
        for handle in &mut self.active_sounds {
            let _ = handle.stop(Tween::default());
        }
        self.active_sounds.clear();
        let names: Vec<String> = self.loops.keys().cloned().collect();
        for name in names {
            self.stop_loop(&name);
        }
    }

    /// Set master volume (0.0 to 1.0).
    pub fn set_master_volume(&mut self, volume: f64) {
        let _ = self
            .manager
            .main_track()
            .set_volume(volume, Tween::default());
    }
}

// Re-export for convenience
pub use kira;
