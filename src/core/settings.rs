//! Tunables for descriptor pool sizing.

/// Maximum number of descriptor sets that can be bound to a single pipeline at once.
pub const MAX_DESCRIPTOR_SET_SLOTS: usize = 4;

/// Maximum number of bindings in one descriptor set layout. Each binding takes one bit in a
/// [`LayoutBitmask`](crate::LayoutBitmask).
pub const MAX_BINDINGS: u32 = 32;

static_assertions::const_assert!(MAX_DESCRIPTOR_SET_SLOTS <= u8::BITS as usize);

/// Settings that control how the descriptor pools of a [`DescriptorSetManager`](crate::DescriptorSetManager) grow.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DescriptorSettings {
    /// Number of sets the first pool of every descriptor shape can hold.
    pub initial_pool_capacity: u16,
    /// Factor by which a new pool is larger than the largest pool of the same shape. The result is rounded up.
    pub pool_growth_factor: f32,
}

impl Default for DescriptorSettings {
    fn default() -> Self {
        Self {
            initial_pool_capacity: 10,
            pool_growth_factor: 1.5,
        }
    }
}

impl DescriptorSettings {
    /// Capacity of the next pool, given the capacity of the largest existing pool with the same shape.
    /// The result is always strictly larger than `previous` unless it is already `u16::MAX`.
    pub fn grow(&self, previous: u16) -> u16 {
        let grown = (previous as f32 * self.pool_growth_factor).ceil();
        let grown = if grown >= u16::MAX as f32 { u16::MAX } else { grown as u16 };
        grown.max(previous.saturating_add(1))
    }
}

/// Convenience builder for [`DescriptorSettings`].
/// # Example
/// ```
/// # use deimos::*;
/// let settings = DescriptorSettingsBuilder::new()
///     .initial_pool_capacity(32)
///     .pool_growth_factor(2.0)
///     .build();
/// assert_eq!(settings.grow(32), 64);
/// ```
pub struct DescriptorSettingsBuilder {
    inner: DescriptorSettings,
}

impl DescriptorSettingsBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        DescriptorSettingsBuilder {
            inner: DescriptorSettings::default(),
        }
    }

    /// Sets the capacity of the first pool created for each descriptor shape. Clamped to at least one set.
    pub fn initial_pool_capacity(mut self, capacity: u16) -> Self {
        self.inner.initial_pool_capacity = capacity.max(1);
        self
    }

    /// Sets the pool growth factor.
    pub fn pool_growth_factor(mut self, factor: f32) -> Self {
        self.inner.pool_growth_factor = factor;
        self
    }

    /// Build the resulting settings.
    pub fn build(self) -> DescriptorSettings {
        self.inner
    }
}

impl Default for DescriptorSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
