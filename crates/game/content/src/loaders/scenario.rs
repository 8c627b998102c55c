//! Scenario file format.
//!
//! ```toml
//! frames = 40
//! delta_ms = 100
//!
//! [[entity]]
//! id = 1
//! components = ["actor"]
//!
//! [[entity]]
//! id = 10
//! components = ["workable"]
//!
//! [[push]]
//! entity = 1
//! priority = 50
//! action = { kind = "work_on_target", target = 10, prepare_ms = 500, work_ms = 2000 }
//!
//! [[destroy]]
//! entity = 10
//! frame = 12
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use anyhow::bail;
use game_core::{Action, ComponentKind, EntityId, InsertionPolicy, Message, MessageId, Priority};
use serde::Deserialize;

use crate::actions::{SignalAction, WaitAction, WorkOnTargetAction};
use crate::kinds::{components, messages};
use crate::loaders::{LoadResult, read_file};

fn default_frames() -> u64 {
    100
}

fn default_delta_ms() -> u64 {
    100
}

/// A complete simulation setup.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_frames")]
    pub frames: u64,
    #[serde(default = "default_delta_ms")]
    pub delta_ms: u64,
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntitySpec>,
    #[serde(default, rename = "push")]
    pub pushes: Vec<PushSpec>,
    #[serde(default, rename = "destroy")]
    pub destroys: Vec<DestroySpec>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySpec {
    pub id: u64,
    #[serde(default)]
    pub components: Vec<String>,
}

impl EntitySpec {
    pub fn entity(&self) -> EntityId {
        EntityId(self.id)
    }

    /// Resolved component kinds; unknown names are skipped.
    pub fn component_kinds(&self) -> Vec<ComponentKind> {
        self.components
            .iter()
            .filter_map(|name| components::by_name(name))
            .collect()
    }
}

/// An action pushed onto an entity's plan before the given frame.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PushSpec {
    pub entity: u64,
    #[serde(default)]
    pub frame: u64,
    pub priority: u8,
    #[serde(default)]
    pub policy: InsertionPolicy,
    pub action: ActionSpec,
}

impl PushSpec {
    pub fn priority(&self) -> Priority {
        Priority(self.priority)
    }
}

/// An entity destroyed before the given frame.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestroySpec {
    pub entity: u64,
    pub frame: u64,
}

/// Constructor parameters of a builtin action.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionSpec {
    Wait {
        duration_ms: u64,
    },
    WorkOnTarget {
        target: u64,
        #[serde(default)]
        prepare_ms: u64,
        work_ms: u64,
    },
    Signal {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        params: Vec<u64>,
    },
}

impl ActionSpec {
    pub fn build(&self) -> Box<dyn Action> {
        match self {
            ActionSpec::Wait { duration_ms } => {
                Box::new(WaitAction::new(Duration::from_millis(*duration_ms)))
            }
            ActionSpec::WorkOnTarget {
                target,
                prepare_ms,
                work_ms,
            } => Box::new(WorkOnTargetAction::new(
                EntityId(*target),
                Duration::from_millis(*prepare_ms),
                Duration::from_millis(*work_ms),
            )),
            ActionSpec::Signal { message, params } => {
                let id = message
                    .as_deref()
                    .map_or(messages::SIGNAL, MessageId::from_name);
                let message = params
                    .iter()
                    .fold(Message::new(id), |message, param| message.with_param(*param));
                Box::new(SignalAction::new(message))
            }
        }
    }
}

impl Scenario {
    pub fn delta(&self) -> Duration {
        Duration::from_millis(self.delta_ms)
    }

    /// Pushes scheduled for `frame`, in file order.
    pub fn pushes_at(&self, frame: u64) -> impl Iterator<Item = &PushSpec> {
        self.pushes.iter().filter(move |push| push.frame == frame)
    }

    /// Destructions scheduled for `frame`, in file order.
    pub fn destroys_at(&self, frame: u64) -> impl Iterator<Item = &DestroySpec> {
        self.destroys.iter().filter(move |destroy| destroy.frame == frame)
    }

    /// Checks references between sections.
    pub fn validate(&self) -> LoadResult<()> {
        let mut ids = BTreeSet::new();
        for entity in &self.entities {
            if entity.id == EntityId::NONE.0 {
                bail!("entity id {} is reserved", entity.id);
            }
            if !ids.insert(entity.id) {
                bail!("entity {} is declared twice", entity.id);
            }
            if let Some(name) = entity
                .components
                .iter()
                .find(|name| components::by_name(name).is_none())
            {
                bail!("entity {} has unknown component `{}`", entity.id, name);
            }
        }
        for push in &self.pushes {
            if !ids.contains(&push.entity) {
                bail!("push targets undeclared entity {}", push.entity);
            }
            if let ActionSpec::Signal { params, .. } = &push.action {
                if params.len() > game_core::env::MAX_MESSAGE_PARAMS {
                    bail!("signal for entity {} has too many params", push.entity);
                }
            }
        }
        for destroy in &self.destroys {
            if !ids.contains(&destroy.entity) {
                bail!("destroy targets undeclared entity {}", destroy.entity);
            }
        }
        if self.delta_ms == 0 {
            bail!("delta_ms must be positive");
        }
        Ok(())
    }
}

/// Loader for scenario files (TOML, or RON by `.ron` extension).
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        let scenario = match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => ron::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON at {:?}: {}", path, e))?,
            _ => Self::from_toml_str(&content)?,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_toml_str(content: &str) -> LoadResult<Scenario> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario TOML: {}", e))
    }
}
