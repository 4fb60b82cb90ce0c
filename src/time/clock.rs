//! Clock sources
//!
//! Everything that needs "now" reads it through the [`Clock`] trait so the
//! orientation model can run against the wall clock, a fixed instant, or a
//! user-controlled time-travel clock.

use crate::constants::{DAY_MS, HOUR_MS, MINUTE_MS, SECOND_MS, WEEK_MS};
use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// A source of the current time in milliseconds since the Unix epoch
pub trait Clock: Send + Sync {
    fn time_in_millis_since_epoch(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn time_in_millis_since_epoch(&self) -> i64 {
        (**self).time_in_millis_since_epoch()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn time_in_millis_since_epoch(&self) -> i64 {
        (**self).time_in_millis_since_epoch()
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_in_millis_since_epoch(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to
#[derive(Debug, Default)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub fn new(millis: i64) -> Self {
        FixedClock {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_millis: i64) {
        self.millis.fetch_add(delta_millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn time_in_millis_since_epoch(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Playback rates for [`TimeTravelClock`], slowest (fastest backwards) first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelSpeed {
    WeekBack,
    DayBack,
    HourBack,
    TenMinutesBack,
    MinuteBack,
    SecondBack,
    Stopped,
    Second,
    Minute,
    TenMinutes,
    Hour,
    Day,
    Week,
}

impl TravelSpeed {
    pub const ALL: [TravelSpeed; 13] = [
        TravelSpeed::WeekBack,
        TravelSpeed::DayBack,
        TravelSpeed::HourBack,
        TravelSpeed::TenMinutesBack,
        TravelSpeed::MinuteBack,
        TravelSpeed::SecondBack,
        TravelSpeed::Stopped,
        TravelSpeed::Second,
        TravelSpeed::Minute,
        TravelSpeed::TenMinutes,
        TravelSpeed::Hour,
        TravelSpeed::Day,
        TravelSpeed::Week,
    ];

    /// Simulated milliseconds per wall-clock millisecond
    pub fn rate(&self) -> i64 {
        let per_second = match self {
            TravelSpeed::WeekBack => -WEEK_MS,
            TravelSpeed::DayBack => -DAY_MS,
            TravelSpeed::HourBack => -HOUR_MS,
            TravelSpeed::TenMinutesBack => -10 * MINUTE_MS,
            TravelSpeed::MinuteBack => -MINUTE_MS,
            TravelSpeed::SecondBack => -SECOND_MS,
            TravelSpeed::Stopped => 0,
            TravelSpeed::Second => SECOND_MS,
            TravelSpeed::Minute => MINUTE_MS,
            TravelSpeed::TenMinutes => 10 * MINUTE_MS,
            TravelSpeed::Hour => HOUR_MS,
            TravelSpeed::Day => DAY_MS,
            TravelSpeed::Week => WEEK_MS,
        };
        per_second / SECOND_MS
    }

    pub fn description(&self) -> &'static str {
        match self {
            TravelSpeed::WeekBack => "1 week/sec backwards",
            TravelSpeed::DayBack => "1 day/sec backwards",
            TravelSpeed::HourBack => "1 hour/sec backwards",
            TravelSpeed::TenMinutesBack => "10 min/sec backwards",
            TravelSpeed::MinuteBack => "1 min/sec backwards",
            TravelSpeed::SecondBack => "1 sec/sec backwards",
            TravelSpeed::Stopped => "stopped",
            TravelSpeed::Second => "1 sec/sec",
            TravelSpeed::Minute => "1 min/sec",
            TravelSpeed::TenMinutes => "10 min/sec",
            TravelSpeed::Hour => "1 hour/sec",
            TravelSpeed::Day => "1 day/sec",
            TravelSpeed::Week => "1 week/sec",
        }
    }

    fn index(&self) -> usize {
        TravelSpeed::ALL
            .iter()
            .position(|s| s == self)
            .unwrap_or(TravelSpeed::ALL.len() / 2)
    }
}

#[derive(Debug)]
struct TravelState {
    speed: TravelSpeed,
    wall_last_read: i64,
    simulated: i64,
}

/// A user-controlled clock that plays through time at a chosen speed
///
/// Simulated time advances by `speed × elapsed wall time` on every read. At
/// a day per second or faster it moves only in whole days, so the sky steps
/// through the year at a fixed time of night instead of spinning.
pub struct TimeTravelClock<W: Clock = SystemClock> {
    wall: W,
    state: Mutex<TravelState>,
}

impl TimeTravelClock<SystemClock> {
    pub fn new(start_millis: i64) -> Self {
        TimeTravelClock::with_wall_clock(SystemClock, start_millis)
    }
}

impl<W: Clock> TimeTravelClock<W> {
    /// Creates a stopped clock at `start_millis`, driven by `wall`.
    pub fn with_wall_clock(wall: W, start_millis: i64) -> Self {
        let now = wall.time_in_millis_since_epoch();
        TimeTravelClock {
            wall,
            state: Mutex::new(TravelState {
                speed: TravelSpeed::Stopped,
                wall_last_read: now,
                simulated: start_millis,
            }),
        }
    }

    /// Jumps to `millis` and stops.
    pub fn travel_to(&self, millis: i64) {
        let now = self.wall.time_in_millis_since_epoch();
        let mut state = self.state.lock();
        state.speed = TravelSpeed::Stopped;
        state.wall_last_read = now;
        state.simulated = millis;
    }

    /// Jumps back to the present and stops.
    pub fn return_to_now(&self) {
        let now = self.wall.time_in_millis_since_epoch();
        self.travel_to(now);
    }

    /// Moves one step toward faster forward travel.
    pub fn accelerate(&self) {
        self.step_speed(1);
    }

    /// Moves one step toward faster backward travel.
    pub fn decelerate(&self) {
        self.step_speed(-1);
    }

    pub fn pause(&self) {
        self.settle();
        self.state.lock().speed = TravelSpeed::Stopped;
        debug!("Time travel paused");
    }

    pub fn speed(&self) -> TravelSpeed {
        self.state.lock().speed
    }

    pub fn current_speed_description(&self) -> &'static str {
        self.speed().description()
    }

    fn step_speed(&self, step: isize) {
        // Bank the time travelled at the old speed first
        self.settle();
        let mut state = self.state.lock();
        let index = state.speed.index() as isize + step;
        if index < 0 || index >= TravelSpeed::ALL.len() as isize {
            debug!("Already at the limit speed {}", state.speed.description());
            return;
        }
        state.speed = TravelSpeed::ALL[index as usize];
        debug!("Time travel speed now {}", state.speed.description());
    }

    fn settle(&self) {
        let _ = self.time_in_millis_since_epoch();
    }
}

impl<W: Clock> Clock for TimeTravelClock<W> {
    fn time_in_millis_since_epoch(&self) -> i64 {
        let now = self.wall.time_in_millis_since_epoch();
        let mut state = self.state.lock();
        let rate = state.speed.rate();
        let mut delta = rate.saturating_mul(now.saturating_sub(state.wall_last_read));

        if rate.abs() >= DAY_MS / SECOND_MS {
            let days = delta / DAY_MS;
            if days == 0 {
                return state.simulated;
            }
            delta = days * DAY_MS;
        }

        state.wall_last_read = now;
        state.simulated = state.simulated.saturating_add(delta);
        state.simulated
    }
}
