//! Instrumented action and collaborator harness for unit tests.
use std::sync::{Arc, Mutex};

use crate::action::{Action, ActionContext, ActionResult, ActionType, Services};
use crate::codec::{BinarySerializer, CodecError};
use crate::env::{EntitySet, Message, MessageHub, ReservationRegistry, WorldCommands};
use crate::plan::InsertionPolicy;
use crate::state::{ActionTypeId, Priority};

/// Shared, ordered record of hook calls across probes.
#[derive(Clone, Debug, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn record(&self, name: &str, hook: &str) {
        self.0.lock().unwrap().push(format!("{name}:{hook}"));
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}

/// Action that records every hook call into a [`Journal`].
#[derive(Debug)]
pub struct Probe {
    pub name: &'static str,
    pub journal: Journal,
    pub accept: bool,
    /// Updates until `Done`; `None` runs forever.
    pub ticks: Option<u32>,
    pub updates: u32,
    /// Pushed through the context from `on_startup`.
    pub push_on_startup: Option<(&'static str, Priority, InsertionPolicy)>,
}

impl Default for Probe {
    fn default() -> Self {
        Self {
            name: "probe",
            journal: Journal::default(),
            accept: true,
            ticks: None,
            updates: 0,
            push_on_startup: None,
        }
    }
}

impl Probe {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn logging(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            ..Self::default()
        }
    }

    pub fn finishing_after(mut self, ticks: u32) -> Self {
        self.ticks = Some(ticks);
        self
    }

    pub fn rejecting(mut self) -> Self {
        self.accept = false;
        self
    }
}

impl Action for Probe {
    fn action_type(&self) -> ActionTypeId {
        Self::TYPE_ID
    }

    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn on_startup(&mut self, ctx: &mut ActionContext<'_, '_>) -> bool {
        self.journal.record(self.name, "startup");
        if let Some((name, priority, policy)) = self.push_on_startup.take() {
            ctx.push_action(Probe::logging(name, &self.journal), priority, policy);
        }
        self.accept
    }

    fn update(&mut self, _ctx: &mut ActionContext<'_, '_>) -> ActionResult {
        self.journal.record(self.name, "update");
        self.updates += 1;
        match self.ticks {
            Some(ticks) if self.updates >= ticks => ActionResult::Done,
            _ => ActionResult::Continue,
        }
    }

    fn on_shutdown(&mut self, _ctx: &mut ActionContext<'_, '_>) {
        self.journal.record(self.name, "shutdown");
    }

    fn on_message(&mut self, _message: &Message, _ctx: &mut ActionContext<'_, '_>) {
        self.journal.record(self.name, "message");
    }

    fn serialize(&mut self, serializer: &mut BinarySerializer<'_>) -> Result<(), CodecError> {
        serializer.value(&mut self.ticks)?;
        serializer.value(&mut self.updates)
    }
}

impl ActionType for Probe {
    const NAME: &'static str = "test.probe";
}

/// Owns one of every collaborator and lends them out as [`Services`].
#[derive(Default)]
pub struct Harness {
    pub world: EntitySet,
    pub reservations: ReservationRegistry,
    pub messages: MessageHub,
    pub commands: WorldCommands,
}

impl Harness {
    pub fn services(&mut self) -> Services<'_> {
        Services::new(
            &self.world,
            &mut self.reservations,
            &mut self.messages,
            &mut self.commands,
        )
    }
}
