//! Fire-and-forget side effects requested by contact handlers.
//!
//! The resolver never plays audio or spawns entities itself. It hands
//! requests to a [`ContactEffects`] sink supplied by the caller for the tick.

use rebound_body::entity::EntityId;
use rebound_body::geometry::Vec2;
use serde::{Deserialize, Serialize};

use crate::events::ContactEvent;

/// Request to play a sound asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundRequest {
    /// Asset id.
    pub sound: String,
    /// Whether the sound loops.
    pub looped: bool,
}

/// Request to spawn a cosmetic decoration (e.g. a splash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorationRequest {
    /// Decoration kind.
    pub kind: String,
    /// World-space spawn point.
    pub position: Vec2,
    /// Entity whose body the decoration belongs to.
    pub owner: EntityId,
}

/// Sink for contact side effects.
pub trait ContactEffects {
    /// Play a sound.
    fn play_sound(&mut self, request: SoundRequest);

    /// Spawn a decoration.
    fn spawn_decoration(&mut self, request: DecorationRequest);

    /// Submit an event to the game's event bus.
    fn submit_event(&mut self, event: ContactEvent);
}

/// Discards every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEffects;

impl ContactEffects for NullEffects {
    fn play_sound(&mut self, _request: SoundRequest) {}
    fn spawn_decoration(&mut self, _request: DecorationRequest) {}
    fn submit_event(&mut self, _event: ContactEvent) {}
}

/// Keeps every request in order. Drain it once per frame, or inspect it in
/// tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingEffects {
    /// Sounds requested.
    pub sounds: Vec<SoundRequest>,
    /// Decorations requested.
    pub decorations: Vec<DecorationRequest>,
    /// Events submitted.
    pub events: Vec<ContactEvent>,
}

impl RecordingEffects {
    /// Whether nothing has been requested.
    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty() && self.decorations.is_empty() && self.events.is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.sounds.clear();
        self.decorations.clear();
        self.events.clear();
    }

    /// Events of one type.
    pub fn events_of(&self, event_type: &str) -> impl Iterator<Item = &ContactEvent> + '_ {
        let wanted = event_type.to_owned();
        self.events.iter().filter(move |e| e.event_type == wanted)
    }
}

impl ContactEffects for RecordingEffects {
    fn play_sound(&mut self, request: SoundRequest) {
        self.sounds.push(request);
    }

    fn spawn_decoration(&mut self, request: DecorationRequest) {
        self.decorations.push(request);
    }

    fn submit_event(&mut self, event: ContactEvent) {
        self.events.push(event);
    }
}
