//! The mount as seen by the POI selector: a command sink plus an idle query.

use std::ops::BitOr;

/// Bit mask of axis directions, as used by stop and slew commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Directions(u8);

impl Directions {
    pub const NORTH: Directions = Directions(0b0000_0001);
    pub const EAST: Directions = Directions(0b0000_0010);
    pub const SOUTH: Directions = Directions(0b0000_0100);
    pub const WEST: Directions = Directions(0b0000_1000);
    pub const TRACKING: Directions = Directions(0b0001_0000);
    pub const ALL_DIRECTIONS: Directions = Directions(0b0000_1111);

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, other: Directions) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Directions {
    type Output = Directions;

    fn bitor(self, rhs: Directions) -> Directions {
        Directions(self.0 | rhs.0)
    }
}

/// Motion-control operations the selector relies on.
///
/// Every command returns immediately; the mount carries out the motion in the
/// background. Failures stay inside the implementation.
pub trait Mount {
    /// Halt motion on the given axes. Safe to call when already stopped.
    fn stop_slewing(&mut self, directions: Directions);
    fn start_slewing_to_home(&mut self);
    fn park(&mut self);
    /// Start motion in the given directions; `Directions::TRACKING` resumes sidereal tracking.
    fn start_slewing(&mut self, directions: Directions);
    fn set_target_ra(&mut self, hour: u8, minute: u8, second: u8);
    /// Target declination as signed total arc-seconds.
    fn set_target_dec(&mut self, total_seconds: i32);
    /// Begin slewing to the target set through `set_target_ra`/`set_target_dec`.
    fn start_slewing_to_target(&mut self);
    /// True when no slew is in progress.
    fn is_slewing_idle(&self) -> bool;
}

impl<M: Mount + ?Sized> Mount for Box<M> {
    fn stop_slewing(&mut self, directions: Directions) {
        (**self).stop_slewing(directions)
    }

    fn start_slewing_to_home(&mut self) {
        (**self).start_slewing_to_home()
    }

    fn park(&mut self) {
        (**self).park()
    }

    fn start_slewing(&mut self, directions: Directions) {
        (**self).start_slewing(directions)
    }

    fn set_target_ra(&mut self, hour: u8, minute: u8, second: u8) {
        (**self).set_target_ra(hour, minute, second)
    }

    fn set_target_dec(&mut self, total_seconds: i32) {
        (**self).set_target_dec(total_seconds)
    }

    fn start_slewing_to_target(&mut self) {
        (**self).start_slewing_to_target()
    }

    fn is_slewing_idle(&self) -> bool {
        (**self).is_slewing_idle()
    }
}
