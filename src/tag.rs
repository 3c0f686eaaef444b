use crate::list::Alternatives;
use bitvec::{field::BitField, prelude::*};
use core::{fmt, marker::PhantomData};

const WORD: usize = u16::BITS as usize;
const VACANCY_BITS: usize = 2;

/// Why a [`Variant`](crate::Variant) holds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vacancy {
    /// Never given a value, or explicitly reset.
    Unset,
    /// Its value was moved out.
    MovedOut,
    /// Initialization found no viable strategy.
    Failed,
}

impl Vacancy {
    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Vacancy::Unset,
            1 => Vacancy::MovedOut,
            _ => Vacancy::Failed,
        }
    }

    fn bits(self) -> u8 {
        match self {
            Vacancy::Unset => 0,
            Vacancy::MovedOut => 1,
            Vacancy::Failed => 2,
        }
    }
}

/// Bits needed to tell `states` values apart, at least one.
const fn bits_for(states: usize) -> usize {
    let bits = (usize::BITS - (states - 1).leading_zeros()) as usize;
    if bits == 0 {
        1
    } else {
        bits
    }
}

/// The active-alternative state of a variant of `L`, packed into one word.
///
/// The low `BITS` bits hold a position in `0..=L::LEN`, where `L::LEN` is the
/// vacant sentinel. The next two bits hold the [`Vacancy`] while the position
/// is the sentinel, and are zero otherwise.
pub(crate) struct Tag<L> {
    bits: BitArray<[u16; 1], Lsb0>,
    _list: PhantomData<fn() -> L>,
}

impl<L> Tag<L>
where
    L: Alternatives,
{
    /// The number of bits needed to represent every position and the sentinel.
    pub(crate) const BITS: usize = bits_for(L::LEN + 1);

    const FITS: () = assert!(
        Self::BITS + VACANCY_BITS <= WORD,
        "too many alternatives to tag in one word"
    );

    pub(crate) fn vacant(reason: Vacancy) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS;
        let mut tag = Tag {
            bits: BitArray::ZERO,
            _list: PhantomData,
        };
        tag.vacate(reason);
        tag
    }

    /// The live position, `None` when vacant.
    pub(crate) fn position(&self) -> Option<usize> {
        let raw: usize = self.bits[..Self::BITS].load();
        (raw != L::LEN).then_some(raw)
    }

    pub(crate) fn vacancy(&self) -> Option<Vacancy> {
        match self.position() {
            Some(_) => None,
            None => Some(self.reason()),
        }
    }

    // Only meaningful while vacant
    fn reason(&self) -> Vacancy {
        Vacancy::from_bits(self.bits[Self::BITS..Self::BITS + VACANCY_BITS].load())
    }

    // **Note**: position must be in range
    pub(crate) fn occupy(&mut self, position: usize) {
        debug_assert!(position < L::LEN);
        self.bits[..Self::BITS].store(position);
        self.bits[Self::BITS..Self::BITS + VACANCY_BITS].store(0u8);
    }

    pub(crate) fn vacate(&mut self, reason: Vacancy) {
        self.bits[..Self::BITS].store(L::LEN);
        self.bits[Self::BITS..Self::BITS + VACANCY_BITS].store(reason.bits());
    }
}

impl<L> fmt::Debug for Tag<L>
where
    L: Alternatives,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position() {
            Some(position) => f.debug_tuple("Active").field(&position).finish(),
            None => f.debug_tuple("Vacant").field(&self.reason()).finish(),
        }
    }
}
