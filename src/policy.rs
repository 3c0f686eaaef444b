use crate::{
    list::Alternatives,
    tag::{Tag, Vacancy},
};
use allele_internal::Capabilities;
use core::{any::type_name, marker::PhantomData, ptr};

/// Which strategy the copy-or-move policy used to put a value into a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Assigned over the live value in place.
    Assign,
    /// Constructed the value in the slot, dropping any live value first.
    Construct,
    /// Default-constructed a value, assigned into it, then placed it.
    DefaultAssign,
    /// Nothing applied; the slot was not touched.
    Unviable,
}

/// Where a value comes from: borrowed (copy) or owned (move).
pub(crate) trait Source<T>: Sized {
    const CONSTRUCTS: bool;
    const ASSIGNS: bool;

    /// Gives the source back if the hook turned out to be unsupported.
    fn assign_to(self, target: &mut T) -> Result<(), Self>;

    fn construct(self) -> Result<T, Self>;
}

pub(crate) struct ByCopy<'a, T>(pub(crate) &'a T);

pub(crate) struct ByMove<T>(pub(crate) T);

impl<'a, T> Source<T> for ByCopy<'a, T>
where
    T: Capabilities,
{
    const CONSTRUCTS: bool = T::COPY_CONSTRUCTIBLE;
    const ASSIGNS: bool = T::COPY_ASSIGNABLE;

    fn assign_to(self, target: &mut T) -> Result<(), Self> {
        target.copy_assign(self.0).map_err(|_| self)
    }

    fn construct(self) -> Result<T, Self> {
        self.0.copy_construct().map_err(|_| self)
    }
}

impl<T> Source<T> for ByMove<T>
where
    T: Capabilities,
{
    const CONSTRUCTS: bool = T::MOVE_CONSTRUCTIBLE;
    const ASSIGNS: bool = T::MOVE_ASSIGNABLE;

    fn assign_to(self, target: &mut T) -> Result<(), Self> {
        target.move_assign(self.0);
        Ok(())
    }

    fn construct(self) -> Result<T, Self> {
        Ok(self.0)
    }
}

/// Compile-time checks on what a slot can accept.
pub(crate) struct Viable<T>(PhantomData<T>);

impl<T> Viable<T>
where
    T: Capabilities,
{
    /// A moved-in `T` always fills a vacant slot.
    pub(crate) const BY_MOVE: () = assert!(
        T::MOVE_CONSTRUCTIBLE,
        "alternative cannot be moved into a vacant slot"
    );
}

/// The cell of alternative `T` at `position`, together with the tag that says
/// whether it is live.
pub(crate) struct Slot<'a, L, T> {
    cell: *mut T,
    tag: &'a mut Tag<L>,
    position: usize,
}

impl<'a, L, T> Slot<'a, L, T>
where
    L: Alternatives,
{
    /// # Safety
    /// `cell` must be the cell `tag` describes at `position`, valid for writes,
    /// and must not be live unless the tag says so.
    pub(crate) unsafe fn new(cell: *mut T, tag: &'a mut Tag<L>, position: usize) -> Self {
        Slot {
            cell,
            tag,
            position,
        }
    }

    fn is_live(&self) -> bool {
        self.tag.position() == Some(self.position)
    }

    // **Note**: the slot must be live.
    // The tag is vacated before the drop, so a panicking destructor can't
    // lead to a second drop.
    unsafe fn vacate(&mut self) {
        self.tag.vacate(Vacancy::Failed);
        ptr::drop_in_place(self.cell);
    }

    // **Note**: the slot must not be live.
    unsafe fn fill(&mut self, value: T) {
        self.cell.write(value);
        self.tag.occupy(self.position);
    }

    /// Places `value`, dropping the old value first if there is one.
    fn replace(&mut self, value: T) {
        // # Safety
        // `is_live` comes from the tag, which `new` requires to be accurate
        unsafe {
            if self.is_live() {
                self.vacate();
            }
            self.fill(value);
        }
    }
}

/// Puts `source` into `slot` using the first strategy that applies:
/// assign over a live value, construct, default-construct then assign.
///
/// Returns the strategy used. [`Action::Unviable`] means nothing applied and
/// the slot is exactly as it was.
pub(crate) fn initialize<L, T, S>(mut slot: Slot<'_, L, T>, source: S) -> Action
where
    L: Alternatives,
    T: Capabilities,
    S: Source<T>,
{
    let action = decide(&mut slot, source);
    tracing::trace!(
        position = slot.position,
        ty = type_name::<T>(),
        ?action,
        "initialized alternative"
    );
    action
}

fn decide<L, T, S>(slot: &mut Slot<'_, L, T>, mut source: S) -> Action
where
    L: Alternatives,
    T: Capabilities,
    S: Source<T>,
{
    if S::ASSIGNS && slot.is_live() {
        // # Safety
        // The tag says the cell holds a live `T`
        let live = unsafe { &mut *slot.cell };
        match source.assign_to(live) {
            Ok(()) => return Action::Assign,
            Err(unused) => source = unused,
        }
    }

    if S::CONSTRUCTS {
        match source.construct() {
            Ok(value) => {
                slot.replace(value);
                return Action::Construct;
            }
            Err(unused) => source = unused,
        }
    }

    if T::DEFAULT_CONSTRUCTIBLE && S::ASSIGNS {
        if let Ok(mut fresh) = T::default_construct() {
            if source.assign_to(&mut fresh).is_ok() {
                slot.replace(fresh);
                return Action::DefaultAssign;
            }
        }
    }

    Action::Unviable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        list::Locate,
        fixtures::{journal, Event, NoCopy, OnlyAssign, Tracked},
        Alts,
    };
    use core::mem::MaybeUninit;

    type List = Alts![Tracked, OnlyAssign, NoCopy];

    struct Harness {
        tag: Tag<List>,
        storage: MaybeUninit<List>,
    }

    impl Harness {
        fn new() -> Self {
            Harness {
                tag: Tag::vacant(Vacancy::Unset),
                storage: MaybeUninit::uninit(),
            }
        }

        fn slot<T, I>(&mut self) -> Slot<'_, List, T>
        where
            List: Locate<T, I>,
        {
            unsafe {
                let cell = <List as Locate<T, I>>::cell(self.storage.as_mut_ptr());
                Slot::new(cell, &mut self.tag, <List as Locate<T, I>>::POSITION)
            }
        }

        fn get<T, I>(&mut self) -> &T
        where
            List: Locate<T, I>,
        {
            assert_eq!(self.tag.position(), Some(<List as Locate<T, I>>::POSITION));
            unsafe { &*<List as Locate<T, I>>::cell(self.storage.as_mut_ptr()) }
        }
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            if let Some(index) = self.tag.position() {
                unsafe { List::drop_at(self.storage.as_mut_ptr(), index) }
            }
        }
    }

    #[test]
    fn vacant_copy_constructs() {
        let mut h = Harness::new();
        let source = Tracked(1);
        journal::clear();
        let action = initialize(h.slot::<Tracked, _>(), ByCopy(&source));
        assert_eq!(action, Action::Construct);
        assert_eq!(journal::take(), [Event::CopyConstruct]);
        assert_eq!(h.get::<Tracked, _>().0, 1);
    }

    #[test]
    fn live_copy_assigns_in_place() {
        let mut h = Harness::new();
        initialize(h.slot::<Tracked, _>(), ByMove(Tracked(1)));
        journal::clear();
        let action = initialize(h.slot::<Tracked, _>(), ByCopy(&Tracked(2)));
        assert_eq!(action, Action::Assign);
        // The temporary source drops; the stored value never does
        assert_eq!(journal::take(), [Event::CopyAssign, Event::Drop(2)]);
        assert_eq!(h.get::<Tracked, _>().0, 2);
    }

    #[test]
    fn vacant_move_constructs_without_hooks() {
        let mut h = Harness::new();
        journal::clear();
        let action = initialize(h.slot::<Tracked, _>(), ByMove(Tracked(5)));
        assert_eq!(action, Action::Construct);
        assert!(journal::take().is_empty());
    }

    #[test]
    fn falls_back_to_default_then_assign() {
        let mut h = Harness::new();
        journal::clear();
        let action = initialize(h.slot::<OnlyAssign, _>(), ByCopy(&OnlyAssign(9)));
        assert_eq!(action, Action::DefaultAssign);
        assert_eq!(
            journal::take(),
            [Event::DefaultConstruct, Event::CopyAssign, Event::Drop(9)]
        );
        assert_eq!(h.get::<OnlyAssign, _>().0, 9);
    }

    #[test]
    fn live_only_assign_assigns() {
        let mut h = Harness::new();
        initialize(h.slot::<OnlyAssign, _>(), ByCopy(&OnlyAssign(1)));
        journal::clear();
        let action = initialize(h.slot::<OnlyAssign, _>(), ByCopy(&OnlyAssign(2)));
        assert_eq!(action, Action::Assign);
        assert_eq!(h.get::<OnlyAssign, _>().0, 2);
    }

    #[test]
    fn nothing_applies() {
        let mut h = Harness::new();
        let action = initialize(h.slot::<NoCopy, _>(), ByCopy(&NoCopy(3)));
        assert_eq!(action, Action::Unviable);
        assert_eq!(h.tag.position(), None);
    }

    #[test]
    fn unviable_leaves_a_live_slot_alone() {
        let mut h = Harness::new();
        assert_eq!(
            initialize(h.slot::<NoCopy, _>(), ByMove(NoCopy(3))),
            Action::Construct
        );
        let action = initialize(h.slot::<NoCopy, _>(), ByCopy(&NoCopy(4)));
        assert_eq!(action, Action::Unviable);
        assert_eq!(h.get::<NoCopy, _>().0, 3);
    }
}
