//! Animation frame change notifications for the (external) renderer.

use bevy::prelude::*;

use crate::ids::StructureId;

/// Receives "this structure's image changed" notices from `step`.
pub trait FrameObserver {
    fn frame_changed(&mut self, structure: StructureId, frame: u16);
}

/// Frames marked dirty during the current fixed step.
#[derive(Resource, Debug, Default)]
pub struct DirtyFrames {
    pub marks: Vec<(StructureId, u16)>,
}

impl FrameObserver for DirtyFrames {
    fn frame_changed(&mut self, structure: StructureId, frame: u16) {
        self.marks.push((structure, frame));
    }
}

/// Observer that drops every notice.
pub struct IgnoreFrames;

impl FrameObserver for IgnoreFrames {
    fn frame_changed(&mut self, _structure: StructureId, _frame: u16) {}
}

pub fn clear_dirty_frames(mut frames: ResMut<DirtyFrames>) {
    frames.marks.clear();
}
