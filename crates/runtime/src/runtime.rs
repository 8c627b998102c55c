//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive the simulation.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::warn;

use game_content::builtin_registry;
use game_core::{ActionRegistry, PlanConfig};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::repository::{FileSnapshotRepository, SnapshotRepository};
use crate::simulation::Simulation;
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub plan: PlanConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Step automatically at this interval; `None` steps only on request.
    pub tick_interval: Option<Duration>,
    /// Directory of the file snapshot repository; `None` disables saving
    /// unless a repository is injected through the builder.
    pub save_dir: Option<PathBuf>,
    pub max_settle_rounds: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            plan: PlanConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            tick_interval: None,
            save_dir: None,
            max_settle_rounds: Simulation::DEFAULT_MAX_SETTLE_ROUNDS,
        }
    }
}

impl RuntimeConfig {
    pub const TICK_MS_ENV: &'static str = "ACTION_TICK_MS";
    pub const EVENT_BUFFER_ENV: &'static str = "ACTION_EVENT_BUFFER";
    pub const COMMAND_BUFFER_ENV: &'static str = "ACTION_COMMAND_BUFFER";
    pub const SAVE_DIR_ENV: &'static str = "SAVE_DATA_DIR";

    /// Defaults overridden by environment variables.
    ///
    /// `ACTION_TICK_MS=0` keeps manual stepping. Unparsable values are
    /// logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>(Self::TICK_MS_ENV) {
            config.tick_interval = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(size) = read_env::<usize>(Self::EVENT_BUFFER_ENV) {
            config.event_buffer_size = size.max(1);
        }
        if let Some(size) = read_env::<usize>(Self::COMMAND_BUFFER_ENV) {
            config.command_buffer_size = size.max(1);
        }
        if let Ok(dir) = std::env::var(Self::SAVE_DIR_ENV)
            && !dir.is_empty()
        {
            config.save_dir = Some(PathBuf::from(dir));
        }

        config
    }

    /// Platform data directory for snapshots.
    ///
    /// - Linux: `~/.local/share/action-plans/snapshots`
    /// - macOS: `~/Library/Application Support/action-plans/snapshots`
    /// - Fallback: `./save_data/snapshots`
    pub fn default_save_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "action-plans")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./save_data"))
            .join("snapshots")
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

/// Main runtime that orchestrates the simulation
///
/// Runtime owns the worker task; [`RuntimeHandle`] is the cloneable façade
/// for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to one event topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every other handle clone has been dropped too.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    registry: Option<ActionRegistry>,
    simulation: Option<Simulation>,
    repository: Option<Arc<dyn SnapshotRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            registry: None,
            simulation: None,
            repository: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Action types known to snapshot loading (default: the builtin set)
    pub fn registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Start from a prepared simulation instead of an empty world
    pub fn simulation(mut self, simulation: Simulation) -> Self {
        self.simulation = Some(simulation);
        self
    }

    /// Snapshot storage; overrides `save_dir` from the config
    pub fn repository(mut self, repository: Arc<dyn SnapshotRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let simulation = match self.simulation {
            Some(simulation) => simulation,
            None => {
                let registry = match self.registry {
                    Some(registry) => registry,
                    None => builtin_registry()?,
                };
                Simulation::with_plan_config(registry, self.config.plan.clone())
                    .with_max_settle_rounds(self.config.max_settle_rounds)
            }
        };

        let repository = match (self.repository, &self.config.save_dir) {
            (Some(repository), _) => Some(repository),
            (None, Some(dir)) => {
                Some(Arc::new(FileSnapshotRepository::new(dir)?) as Arc<dyn SnapshotRepository>)
            }
            (None, None) => None,
        };

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let sim_worker = SimulationWorker::new(
            simulation,
            command_rx,
            event_bus,
            repository,
            self.config.tick_interval,
        );

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
