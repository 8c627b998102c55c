/// Tunable limits of the plan executor.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlanConfig {
    /// How many queued actions may be tried (startup) within one tick before
    /// the component gives up until the next tick.
    pub max_startups_per_tick: usize,
    /// How many rounds of deferred plan requests are applied after a hook
    /// before further requests are dropped.
    pub max_request_rounds: usize,
}

impl PlanConfig {
    pub const DEFAULT_MAX_STARTUPS_PER_TICK: usize = 8;
    pub const DEFAULT_MAX_REQUEST_ROUNDS: usize = 4;

    pub const fn new() -> Self {
        Self {
            max_startups_per_tick: Self::DEFAULT_MAX_STARTUPS_PER_TICK,
            max_request_rounds: Self::DEFAULT_MAX_REQUEST_ROUNDS,
        }
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self::new()
    }
}
