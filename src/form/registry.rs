//! Name to controller registry.
//!
//! Controllers live in an arena keyed by a generated [`ControllerId`]. The
//! name mapping is last-write-wins: registering a second controller under an
//! existing name shadows the first. The registry never owns a controller; it
//! keeps weak references and treats a torn-down controller as absent.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

use super::controller::{SharedController, WeakController};

/// Stable identifier handed out on each registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(u64);

struct Slot {
    name: String,
    controller: WeakController,
}

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    slots: BTreeMap<ControllerId, Slot>,
    by_name: HashMap<String, ControllerId>,
    declared: Vec<String>,
}

impl RegistryState {
    fn insert(&mut self, name: &str, controller: WeakController) -> ControllerId {
        self.slots.retain(|_, slot| slot.controller.strong_count() > 0);

        let id = ControllerId(self.next_id);
        self.next_id += 1;

        if let Some(previous) = self.by_name.insert(name.to_string(), id) {
            self.slots.remove(&previous);
            tracing::debug!(field = name, ?previous, ?id, "controller shadowed");
        } else {
            tracing::debug!(field = name, ?id, "controller registered");
        }

        self.slots.insert(
            id,
            Slot {
                name: name.to_string(),
                controller,
            },
        );
        id
    }

    fn remove(&mut self, id: ControllerId) {
        let Some(slot) = self.slots.remove(&id) else {
            return;
        };
        if self.by_name.get(&slot.name) == Some(&id) {
            self.by_name.remove(&slot.name);
        }
        tracing::debug!(field = %slot.name, ?id, "controller released");
    }

    fn live(&self, name: &str) -> Option<SharedController> {
        let id = self.by_name.get(name)?;
        self.slots.get(id)?.controller.upgrade()
    }

    fn ordered(&self) -> Vec<(String, SharedController)> {
        let declared: HashSet<&str> = self.declared.iter().map(String::as_str).collect();
        let mut seen: HashSet<&str> = HashSet::with_capacity(declared.len());
        let mut entries: Vec<(String, SharedController)> = Vec::with_capacity(self.slots.len());
        for name in &self.declared {
            if !seen.insert(name.as_str()) {
                continue;
            }
            if let Some(controller) = self.live(name) {
                entries.push((name.clone(), controller));
            }
        }
        for slot in self.slots.values() {
            if declared.contains(slot.name.as_str()) {
                continue;
            }
            if let Some(controller) = slot.controller.upgrade() {
                entries.push((slot.name.clone(), controller));
            }
        }
        entries
    }
}

/// Ordered registry of the controllers currently mounted for a form.
#[derive(Default)]
pub struct ControllerRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that iterates `names` first, in the given order.
    pub fn with_declaration_order<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        registry.set_declaration_order(names);
        registry
    }

    /// Replaces the declaration order used for iteration.
    pub fn set_declaration_order<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.borrow_mut().declared = names.into_iter().map(Into::into).collect();
    }

    /// Stores `controller` under `name`, shadowing any previous registration.
    ///
    /// The returned handle removes the entry when released or dropped.
    pub fn register(&self, name: &str, controller: &SharedController) -> Registration {
        let id = self
            .state
            .borrow_mut()
            .insert(name, Rc::downgrade(controller));
        Registration {
            state: Rc::downgrade(&self.state),
            id,
            name: name.to_string(),
        }
    }

    pub fn get(&self, name: &str) -> Option<SharedController> {
        self.state.borrow().live(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Id currently bound to `name`, if its controller is still alive.
    pub fn id_of(&self, name: &str) -> Option<ControllerId> {
        let state = self.state.borrow();
        let id = *state.by_name.get(name)?;
        state.live(name).map(|_| id)
    }

    /// Live entries in declaration order, followed by undeclared names in
    /// registration order. The result is a snapshot: controllers visited from
    /// it may release their registrations freely.
    pub fn ordered_entries(&self) -> Vec<(String, SharedController)> {
        self.state.borrow().ordered()
    }

    pub fn ordered_names(&self) -> Vec<String> {
        self.ordered_entries()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    pub fn for_each_in_order<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &SharedController),
    {
        for (name, controller) in self.ordered_entries() {
            visit(&name, &controller);
        }
    }

    pub fn len(&self) -> usize {
        self.ordered_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("fields", &self.ordered_names())
            .finish()
    }
}

/// Scoped registration of one controller.
///
/// Dropping the handle removes the controller from the registry unless the
/// name has been registered again in the meantime.
#[must_use = "dropping a Registration unregisters the controller"]
pub struct Registration {
    state: Weak<RefCell<RegistryState>>,
    id: ControllerId,
    name: String,
}

impl Registration {
    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this handle still owns the name's mapping.
    pub fn is_active(&self) -> bool {
        self.state
            .upgrade()
            .is_some_and(|state| state.borrow().by_name.get(&self.name) == Some(&self.id))
    }

    /// Removes the controller from the registry now.
    pub fn release(self) {}

    /// Gives up the handle and leaves the controller registered until it is
    /// torn down.
    pub fn detach(mut self) {
        self.state = Weak::new();
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().remove(self.id);
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
