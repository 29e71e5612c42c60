//! Name table for level callbacks.
//!
//! Maps a stable mnemonic to each update callback so dumps can print a name
//! instead of an address and patches can rebind a record by name.

use indexmap::IndexMap;
use rove_think::action::ThinkFn;
use rove_think::Action;

use crate::level::Level;
use crate::think;

/// Mnemonic ↔ callback table, in registration order.
pub struct ActionRegistry {
    by_name: IndexMap<&'static str, ThinkFn<Level>>,
}

impl ActionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            by_name: IndexMap::new(),
        }
    }

    /// A registry holding every built-in level callback.
    pub fn standard() -> Self {
        let mut r = Self::new();
        r.register("MobjThinker", think::mobj_thinker);
        r.register("MoveCeiling", think::move_ceiling);
        r.register("VerticalDoor", think::vertical_door);
        r.register("MoveFloor", think::move_floor);
        r.register("PlatRaise", think::plat_raise);
        r.register("LightFlash", think::light_flash);
        r.register("StrobeFlash", think::strobe_flash);
        r.register("Glow", think::glow);
        r.register("FireFlicker", think::fire_flicker);
        r
    }

    /// Bind `name` to `f`, replacing any earlier binding for that name.
    pub fn register(&mut self, name: &'static str, f: ThinkFn<Level>) -> Option<ThinkFn<Level>> {
        self.by_name.insert(name, f)
    }

    /// The callback bound to `name`.
    pub fn lookup(&self, name: &str) -> Option<ThinkFn<Level>> {
        self.by_name.get(name).copied()
    }

    /// The first name bound to `f`.
    pub fn name_of(&self, f: ThinkFn<Level>) -> Option<&'static str> {
        self.by_name
            .iter()
            .find(|(_, g)| std::ptr::fn_addr_eq(f, **g))
            .map(|(&name, _)| name)
    }

    /// Display name for a dispatch value: the mnemonic, or a placeholder
    /// for the non-callback states.
    pub fn describe(&self, action: &Action<Level>) -> &'static str {
        match action {
            Action::Empty => "(parked)",
            Action::Removed => "(removed)",
            Action::Input(_) => "(input)",
            Action::Think(f) => self.name_of(*f).unwrap_or("(unknown)"),
        }
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_name.keys().copied()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.by_name.keys()).finish()
    }
}
