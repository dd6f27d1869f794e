use rand::Rng;

use super::{Binding, Structure, StructureEnv};
use crate::config::CONSTRUCTION_DURATION_TICKS;
use crate::frame_events::FrameObserver;
use crate::structure_catalog::TileRef;

/// Answer to the per-step driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncResult {
    Continue,
    /// Drop this structure from the per-step update list.
    RemoveMe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    UnderConstruction,
    Idle,
    Animating,
}

impl Structure {
    pub fn animation_state(&self) -> AnimationState {
        if self.show_construction {
            AnimationState::UnderConstruction
        } else if self.sync {
            AnimationState::Animating
        } else {
            AnimationState::Idle
        }
    }

    pub fn is_under_construction(&self) -> bool {
        self.show_construction
    }

    pub fn is_synced(&self) -> bool {
        self.sync
    }

    pub fn construction_start(&self) -> i64 {
        self.construction_start
    }

    /// Calendar month of the most recent construction.
    pub fn purchase_time(&self) -> i64 {
        self.purchase_time
    }

    pub fn anim_frame(&self) -> u16 {
        self.anim_frame
    }

    fn factory_idle(&self, env: &StructureEnv) -> bool {
        match self.binding {
            Binding::Factory(f) => !env.factories.is_producing(f),
            _ => false,
        }
    }

    /// Switches to `new_tile`, restarting construction when requested and
    /// the descriptor has a construction pit. Registers with or leaves the
    /// per-step update list as the new tile requires.
    pub fn set_tile(
        &mut self,
        new_tile: TileRef,
        start_with_construction: bool,
        env: &StructureEnv,
        rng: &mut impl Rng,
    ) {
        self.construction_start = env.now;
        self.purchase_time = env.params.month_at(env.now);
        self.show_construction = start_with_construction && !new_tile.desc().no_construction_pit;

        let phases = new_tile.phases();
        if self.sync {
            if phases <= 1 && !self.show_construction {
                env.animated.remove(self.id);
                self.sync = false;
                self.anim_frame = 0;
            }
        } else if (phases > 1 && !self.factory_idle(env)) || self.show_construction {
            self.anim_frame = rng.gen_range(0..phases.max(1));
            self.anim_time = 0;
            env.animated.add(self.id);
            self.sync = true;
        }
        self.tile = new_tile;
    }

    /// Advances construction and animation by one simulation step.
    pub fn step(
        &mut self,
        delta_t: u32,
        env: &StructureEnv,
        frames: &mut dyn FrameObserver,
    ) -> SyncResult {
        if self.construction_start > env.now {
            self.construction_start = env.now - CONSTRUCTION_DURATION_TICKS;
        }

        if self.show_construction {
            if env.now - self.construction_start > CONSTRUCTION_DURATION_TICKS {
                frames.frame_changed(self.id, self.anim_frame);
                self.show_construction = false;
                if self.tile.phases() <= 1 {
                    self.sync = false;
                    return SyncResult::RemoveMe;
                }
            }
        } else if !self.factory_idle(env) {
            let period = self.desc().animation_time;
            self.anim_time = self.anim_time.saturating_add(delta_t);
            if self.anim_time > period {
                self.anim_time -= period;
                frames.frame_changed(self.id, self.anim_frame);
                self.anim_frame += 1;
                if self.anim_frame >= self.tile.phases() {
                    self.anim_frame = 0;
                }
                frames.frame_changed(self.id, self.anim_frame);
            }
        }
        SyncResult::Continue
    }

    /// Ages the structure by `ticks` so it reads as long finished.
    pub fn add_age(&mut self, ticks: i64) {
        self.construction_start -= ticks.min(self.construction_start);
    }

    /// Yearly statistics rollover.
    pub fn new_year(&mut self) {
        let residential = self.is_residential();
        self.trips.roll_over(residential);
    }
}
