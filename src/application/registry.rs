// Dataset registry - fixed slots holding the most recently loaded series
use crate::domain::series::{ScatterSeries, Series};

/// `N` slots that are only ever replaced together.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRegistry<T, const N: usize> {
    slots: [T; N],
}

/// Vessel A / vessel B.
pub type HovmollerRegistry = DatasetRegistry<ScatterSeries, 2>;
/// Dependent series 1..4.
pub type TimeseriesRegistry = DatasetRegistry<Series, 4>;

impl<T: Default, const N: usize> Default for DatasetRegistry<T, N> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T, const N: usize> DatasetRegistry<T, N> {
    pub fn new() -> Self
    where
        T: Default,
    {
        Self::default()
    }

    /// Swap every slot at once.
    pub fn replace_all(&mut self, slots: [T; N]) {
        self.slots = slots;
    }

    pub fn slots(&self) -> &[T; N] {
        &self.slots
    }
}
