//! A mount that lives in memory.
//!
//! Slews take time proportional to the larger of the two axis moves at a fixed
//! rate. Completion is evaluated lazily against the wall clock.

use poi_selector::{Declination, Directions, Mount, RightAscension};
use std::time::{Duration, Instant};

/// Home and park both point at the celestial pole.
const HOME_POSITION: Position = Position {
    ra_hours: 0.0,
    dec_deg: 90.0,
};
const PARK_POSITION: Position = HOME_POSITION;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub ra_hours: f64,
    pub dec_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Idle,
    Tracking,
    Slewing,
    Parked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arrival {
    Target,
    Home,
    Park,
}

#[derive(Debug, Clone, Copy)]
struct Slew {
    from: Position,
    to: Position,
    started: Instant,
    duration: Duration,
    arrival: Arrival,
}

impl Slew {
    fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.started.elapsed().as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn is_done(&self) -> bool {
        self.started.elapsed() >= self.duration
    }

    fn position(&self) -> Position {
        let t = self.progress();
        Position {
            ra_hours: self.from.ra_hours + (self.to.ra_hours - self.from.ra_hours) * t,
            dec_deg: self.from.dec_deg + (self.to.dec_deg - self.from.dec_deg) * t,
        }
    }
}

pub struct SimulatedMount {
    slew_rate_deg_per_sec: f64,
    position: Position,
    target_ra: RightAscension,
    target_dec: Declination,
    slew: Option<Slew>,
    tracking: bool,
    parked: bool,
}

impl SimulatedMount {
    pub fn new(slew_rate_deg_per_sec: f64) -> Self {
        Self {
            slew_rate_deg_per_sec,
            position: HOME_POSITION,
            target_ra: RightAscension::new(0, 0, 0),
            target_dec: Declination::from_seconds(0),
            slew: None,
            tracking: false,
            parked: false,
        }
    }

    pub fn state(&self) -> SimState {
        match &self.slew {
            Some(slew) if !slew.is_done() => SimState::Slewing,
            Some(slew) if slew.arrival == Arrival::Park => SimState::Parked,
            _ if self.parked => SimState::Parked,
            _ if self.tracking => SimState::Tracking,
            _ => SimState::Idle,
        }
    }

    pub fn position(&self) -> Position {
        match &self.slew {
            Some(slew) => slew.position(),
            None => self.position,
        }
    }

    pub fn status(&self) -> String {
        let pos = self.position();
        let ra = pos.ra_hours.rem_euclid(24.0);
        let dec = Declination::from_seconds((pos.dec_deg * 3600.0).round() as i32);
        format!(
            "{:?} RA {:02}h{:02}m DEC {}",
            self.state(),
            ra.trunc() as u32,
            (ra.fract() * 60.0).trunc() as u32,
            dec
        )
    }

    /// Fold a finished slew into the resting state.
    fn settle(&mut self) {
        let Some(slew) = self.slew else {
            return;
        };
        if !slew.is_done() {
            return;
        }
        self.position = slew.to;
        self.slew = None;
        if slew.arrival == Arrival::Park {
            self.parked = true;
            self.tracking = false;
        }
    }

    fn begin_slew(&mut self, to: Position, arrival: Arrival) {
        self.settle();
        let from = self.position();
        let distance_deg = ((to.ra_hours - from.ra_hours) * 15.0)
            .abs()
            .max((to.dec_deg - from.dec_deg).abs());
        let seconds = distance_deg / self.slew_rate_deg_per_sec;
        // NaN folds to zero through `max`; anything too long never arrives.
        let duration = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX);
        tracing::debug!(
            "sim mount: slewing {:.2} deg over {:.1}s ({:?})",
            distance_deg,
            duration.as_secs_f64(),
            arrival
        );
        self.slew = Some(Slew {
            from,
            to,
            started: Instant::now(),
            duration,
            arrival,
        });
    }
}

impl Mount for SimulatedMount {
    fn stop_slewing(&mut self, directions: Directions) {
        self.settle();
        if directions.bits() & Directions::ALL_DIRECTIONS.bits() != 0 {
            if let Some(slew) = self.slew.take() {
                self.position = slew.position();
                tracing::info!("sim mount: slew stopped");
            }
        }
        if directions.contains(Directions::TRACKING) {
            self.tracking = false;
        }
    }

    fn start_slewing_to_home(&mut self) {
        if self.parked {
            tracing::warn!("sim mount: parked, ignoring home request");
            return;
        }
        self.begin_slew(HOME_POSITION, Arrival::Home);
    }

    fn park(&mut self) {
        self.tracking = false;
        self.begin_slew(PARK_POSITION, Arrival::Park);
    }

    fn start_slewing(&mut self, directions: Directions) {
        self.settle();
        if directions.contains(Directions::TRACKING) {
            self.parked = false;
            self.tracking = true;
            tracing::info!("sim mount: tracking");
        }
    }

    fn set_target_ra(&mut self, hour: u8, minute: u8, second: u8) {
        self.target_ra = RightAscension::new(hour, minute, second);
    }

    fn set_target_dec(&mut self, total_seconds: i32) {
        self.target_dec = Declination::from_seconds(total_seconds);
    }

    fn start_slewing_to_target(&mut self) {
        self.settle();
        if self.parked {
            tracing::warn!("sim mount: parked, ignoring slew to target");
            return;
        }
        let to = Position {
            ra_hours: self.target_ra.to_hours(),
            dec_deg: self.target_dec.to_degrees(),
        };
        self.begin_slew(to, Arrival::Target);
    }

    fn is_slewing_idle(&self) -> bool {
        self.slew.map_or(true, |slew| slew.is_done())
    }
}
