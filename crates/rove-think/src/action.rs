//! Dispatch values: what a thinker does when the scheduler reaches it.

use std::fmt;

use rove_core::ThinkerId;

use crate::host::ThinkerHost;

/// Per-record update callback.
pub type ThinkFn<H> = fn(&mut H, ThinkerId);

/// Update callback that also receives the record's input bundle.
pub type InputFn<H> = fn(&mut H, ThinkerId, <H as ThinkerHost>::Input);

/// The dispatch value of a thinker.
///
/// `Empty` and `Removed` are both inactive. `Empty` is also how a record is
/// parked: a ceiling in stasis keeps its body and table slot but has no
/// update to run.
pub enum Action<H: ThinkerHost> {
    /// No update.
    Empty,
    /// Run the callback with the record's id.
    Think(ThinkFn<H>),
    /// Run the callback with the record's id and its host-supplied input.
    Input(InputFn<H>),
    /// Marked for removal; never invoked again.
    Removed,
}

impl<H: ThinkerHost> Action<H> {
    /// Whether invoking this value would call something.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Think(_) | Self::Input(_))
    }

    /// Whether the record has been marked for removal.
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed)
    }

    /// Mark for removal.
    pub fn mark_removed(&mut self) {
        *self = Self::Removed;
    }

    /// Whether this holds exactly `f` as its `Think` callback.
    pub fn is_think(&self, f: ThinkFn<H>) -> bool {
        matches!(self, Self::Think(g) if std::ptr::fn_addr_eq(*g, f))
    }

    /// Call the held callback, if any. Returns whether a call was made.
    ///
    /// `Input` callbacks are skipped when the host has no input for `id`.
    pub fn invoke(self, host: &mut H, id: ThinkerId) -> bool {
        match self {
            Self::Think(f) => {
                f(host, id);
                true
            }
            Self::Input(f) => match host.input_for(id) {
                Some(input) => {
                    f(host, id, input);
                    true
                }
                None => false,
            },
            Self::Empty | Self::Removed => false,
        }
    }
}

impl<H: ThinkerHost> Default for Action<H> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<H: ThinkerHost> Clone for Action<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: ThinkerHost> Copy for Action<H> {}

impl<H: ThinkerHost> PartialEq for Action<H> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) | (Self::Removed, Self::Removed) => true,
            (Self::Think(a), Self::Think(b)) => std::ptr::fn_addr_eq(*a, *b),
            (Self::Input(a), Self::Input(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl<H: ThinkerHost> Eq for Action<H> {}

impl<H: ThinkerHost> PartialEq<ThinkFn<H>> for Action<H> {
    fn eq(&self, other: &ThinkFn<H>) -> bool {
        self.is_think(*other)
    }
}

impl<H: ThinkerHost> fmt::Debug for Action<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Think(g) => write!(f, "Think({:p})", *g as *const ()),
            Self::Input(g) => write!(f, "Input({:p})", *g as *const ()),
            Self::Removed => write!(f, "Removed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ThinkerList;
    use rove_zone::MemoryResource;

    struct Host {
        calls: Vec<(ThinkerId, u8)>,
        input: Option<u8>,
        list: ThinkerList<Host>,
        mem: MemoryResource,
    }

    impl ThinkerHost for Host {
        type Body = ();
        type Input = u8;

        fn thinkers(&self) -> &ThinkerList<Self> {
            &self.list
        }

        fn thinkers_mut(&mut self) -> &mut ThinkerList<Self> {
            &mut self.list
        }

        fn split_mut(&mut self) -> (&mut ThinkerList<Self>, &mut MemoryResource) {
            (&mut self.list, &mut self.mem)
        }

        fn input_for(&self, _id: ThinkerId) -> Option<u8> {
            self.input
        }
    }

    fn host() -> Host {
        Host {
            calls: Vec::new(),
            input: None,
            list: ThinkerList::new(),
            mem: MemoryResource::init(&rove_zone::ZoneConfig::new(4096)).unwrap(),
        }
    }

    fn tick(host: &mut Host, id: ThinkerId) {
        host.calls.push((id, 0));
    }

    fn other(host: &mut Host, id: ThinkerId) {
        host.calls.push((id, 1));
    }

    fn with_input(host: &mut Host, id: ThinkerId, input: u8) {
        host.calls.push((id, input));
    }

    #[test]
    fn default_is_empty_and_inactive() {
        let action = Action::<Host>::default();
        assert_eq!(action, Action::Empty);
        assert!(!action.is_active());
        assert!(!action.is_removed());
    }

    #[test]
    fn equality_distinguishes_callbacks() {
        let a = Action::<Host>::Think(tick);
        assert!(a.is_think(tick));
        assert!(!a.is_think(other));
        assert_eq!(a, tick as ThinkFn<Host>);
        assert_ne!(a, Action::Think(other));
        assert_ne!(a, Action::Empty);
    }

    #[test]
    fn removed_is_never_invoked() {
        let mut h = host();
        let mut action = Action::<Host>::Think(tick);
        action.mark_removed();
        assert!(action.is_removed());
        assert!(!action.invoke(&mut h, ThinkerId::new(0, 0)));
        assert!(h.calls.is_empty());
    }

    #[test]
    fn input_callbacks_need_host_input() {
        let mut h = host();
        let id = ThinkerId::new(1, 0);
        let action = Action::<Host>::Input(with_input);
        assert!(!action.invoke(&mut h, id));
        h.input = Some(9);
        assert!(action.invoke(&mut h, id));
        assert_eq!(h.calls, vec![(id, 9)]);
    }
}
