//! Periodic open/run cycle.
//!
//! Every period the runner asks the controller to begin a cycle. If the
//! cycle is enabled, the valve opens and the pump runs for the configured
//! open duration, then both shut off. Ticks that would land inside an active
//! hold are dropped: the next tick is one full period after the cycle ends.
//!
//! # Usage
//!
//! ```ignore
//! use pumpctl::services::{spawn_cycle, SharedPumpState};
//!
//! let state = Arc::new(SharedPumpState::new(controller));
//! let handle = spawn_cycle(Arc::clone(&state), config.cycle);
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::CycleConfig;
use crate::controller::CycleStart;
use crate::traits::Relay;

use super::shared::SharedPumpState;

/// Runner for the periodic cycle.
pub struct CycleRunner<R: Relay> {
    state: Arc<SharedPumpState<R>>,
    config: CycleConfig,
}

impl<R: Relay + Send + 'static> CycleRunner<R> {
    /// Create a runner over shared state.
    pub fn new(state: Arc<SharedPumpState<R>>, config: CycleConfig) -> Self {
        Self { state, config }
    }

    /// Run cycles forever.
    ///
    /// The first tick fires one period after this is called.
    ///
    /// # Panics
    ///
    /// Panics if the period is zero; [`Config::validate`] rejects that.
    ///
    /// [`Config::validate`]: crate::Config::validate
    pub async fn run(self) {
        let period = self.config.period();
        let hold = self.config.open_duration();

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            period_secs = self.config.period_secs,
            open_duration_secs = self.config.open_duration_secs,
            "periodic cycle running"
        );

        loop {
            ticker.tick().await;

            match self.state.begin_cycle() {
                CycleStart::Skipped => {
                    debug!("tick skipped, cycle disabled");
                    continue;
                }
                CycleStart::Started(_) => {}
            }

            // Not cancellable: the valve always closes after a started hold.
            time::sleep(hold).await;
            self.state.end_cycle();

            ticker.reset();
        }
    }
}

/// Spawn the periodic cycle on the current tokio runtime.
pub fn spawn_cycle<R: Relay + Send + 'static>(
    state: Arc<SharedPumpState<R>>,
    config: CycleConfig,
) -> JoinHandle<()> {
    tokio::spawn(CycleRunner::new(state, config).run())
}
