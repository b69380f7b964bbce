use anyhow::Result;
use ash::vk;

use deimos::{DescriptorKind, DescriptorPool, DescriptorPoolSet, DescriptorSettings, DescriptorSettingsBuilder, Error};

mod framework;

#[test]
pub fn pool_is_sized_for_shape_times_capacity() -> Result<()> {
    let context = framework::make_context();
    let layout = context.layout(&[
        (0, DescriptorKind::UniformBuffer),
        (1, DescriptorKind::Sampler),
        (2, DescriptorKind::Sampler),
    ])?;
    let pool = DescriptorPool::new(context.device.clone(), layout.count(), 10)?;

    let recording = context.recorder.recording();
    assert_eq!(recording.pools.len(), 1);
    let created = &recording.pools[0];
    assert_eq!(created.handle, pool.handle());
    assert_eq!(created.max_sets, 10);
    assert_eq!(
        created.sizes,
        vec![
            (vk::DescriptorType::UNIFORM_BUFFER, 10),
            (vk::DescriptorType::COMBINED_IMAGE_SAMPLER, 20),
        ],
        "Only kinds used by the shape should get a pool size"
    );
    Ok(())
}

#[test]
pub fn pool_allocates_up_to_capacity() -> Result<()> {
    let context = framework::make_context();
    let layout = context.ubo_sampler_layout()?;
    let mut pool = DescriptorPool::new(context.device.clone(), layout.count(), 3)?;

    for expected_size in 1..=3 {
        assert!(pool.obtain_set(&layout)?.is_some());
        assert_eq!(pool.size(), expected_size);
        assert!(pool.size() <= pool.capacity());
    }
    assert!(pool.obtain_set(&layout)?.is_none(), "A full pool with no recycled sets should not allocate");
    assert_eq!(pool.size(), 3);
    assert_eq!(context.recorder.recording().allocations.len(), 3);
    Ok(())
}

#[test]
pub fn pool_only_accepts_exact_shape() -> Result<()> {
    let context = framework::make_context();
    let small = context.layout(&[(0, DescriptorKind::UniformBuffer)])?;
    let large = context.layout(&[(0, DescriptorKind::UniformBuffer), (1, DescriptorKind::UniformBuffer)])?;
    let pool = DescriptorPool::new(context.device.clone(), large.count(), 4)?;
    assert!(pool.can_allocate(&large.count()));
    assert!(!pool.can_allocate(&small.count()), "A pool with a larger shape should not serve a smaller one");
    Ok(())
}

#[test]
pub fn recycled_sets_are_reused_lifo() -> Result<()> {
    let context = framework::make_context();
    let layout = context.ubo_sampler_layout()?;
    let mut pool = DescriptorPool::new(context.device.clone(), layout.count(), 2)?;

    let first = pool.obtain_set(&layout)?.unwrap();
    let second = pool.obtain_set(&layout)?.unwrap();
    pool.recycle(*layout.bitmask(), first);
    pool.recycle(*layout.bitmask(), second);
    assert_eq!(pool.free_count(layout.bitmask()), 2);

    assert_eq!(pool.obtain_set(&layout)?, Some(second));
    assert_eq!(pool.obtain_set(&layout)?, Some(first));
    assert_eq!(pool.obtain_set(&layout)?, None);
    assert_eq!(pool.size(), 2, "Recycling should not change the pool size");
    assert_eq!(context.recorder.recording().allocations.len(), 2);
    Ok(())
}

#[test]
pub fn recycled_sets_are_keyed_by_bitmask() -> Result<()> {
    let context = framework::make_context();
    let a = context.layout(&[(0, DescriptorKind::UniformBuffer), (1, DescriptorKind::Sampler)])?;
    let b = context.layout(&[(0, DescriptorKind::Sampler), (1, DescriptorKind::UniformBuffer)])?;
    assert_eq!(a.count(), b.count());
    assert_ne!(a.bitmask(), b.bitmask());

    let mut pool = DescriptorPool::new(context.device.clone(), a.count(), 2)?;
    let set = pool.obtain_set(&a)?.unwrap();
    pool.recycle(*a.bitmask(), set);

    let other = pool.obtain_set(&b)?.unwrap();
    assert_ne!(other, set, "A set must not be handed to a layout with a different bitmask");
    assert_eq!(pool.free_count(a.bitmask()), 1);
    assert_eq!(pool.obtain_set(&a)?, Some(set));
    Ok(())
}

#[test]
pub fn pool_reports_allocation_failure() -> Result<()> {
    let context = framework::make_context();
    let layout = context.ubo_sampler_layout()?;
    let mut pool = DescriptorPool::new(context.device.clone(), layout.count(), 10)?;
    context.recorder.fail_allocations(true);

    let error = pool.obtain_set(&layout).unwrap_err();
    match error.downcast_ref::<Error>() {
        Some(Error::DescriptorSetAllocation {
            size,
            capacity,
            result,
            ..
        }) => {
            assert_eq!(*size, 0);
            assert_eq!(*capacity, 10);
            assert_eq!(*result, vk::Result::ERROR_OUT_OF_POOL_MEMORY);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(pool.size(), 0);
    Ok(())
}

#[test]
pub fn pool_is_destroyed_on_drop() -> Result<()> {
    let context = framework::make_context();
    let layout = context.ubo_sampler_layout()?;
    let handle = DescriptorPool::new(context.device.clone(), layout.count(), 1)?.handle();
    assert_eq!(context.recorder.recording().destroyed_pools, vec![handle]);
    Ok(())
}

#[test]
pub fn pool_set_starts_at_initial_capacity() -> Result<()> {
    let context = framework::make_context();
    let layout = context.ubo_sampler_layout()?;
    let mut pools = DescriptorPoolSet::new(context.device.clone(), DescriptorSettings::default());
    assert!(pools.pools().is_empty());

    pools.obtain_set(&layout)?;
    assert_eq!(pools.pools().len(), 1);
    assert_eq!(pools.pools()[0].capacity(), 10);
    assert_eq!(pools.pools()[0].size(), 1);
    Ok(())
}

#[test]
pub fn pool_set_grows_geometrically() -> Result<()> {
    let context = framework::make_context();
    let layout = context.ubo_sampler_layout()?;
    let mut pools = DescriptorPoolSet::new(context.device.clone(), DescriptorSettings::default());

    for _ in 0..10 {
        pools.obtain_set(&layout)?;
    }
    assert_eq!(pools.pools().len(), 1, "The first pool should hold ten sets");

    pools.obtain_set(&layout)?;
    assert_eq!(pools.pools().len(), 2);
    assert_eq!(pools.pools()[1].capacity(), 15);

    // 10 + 15 + 23 + 35 sets fill four pools
    for _ in 11..(10 + 15 + 23 + 35) {
        pools.obtain_set(&layout)?;
    }
    let capacities = pools.pools().iter().map(|pool| pool.capacity()).collect::<Vec<_>>();
    assert_eq!(capacities, vec![10, 15, 23, 35]);
    assert!(pools.pools().iter().all(|pool| pool.size() == pool.capacity()));

    pools.obtain_set(&layout)?;
    assert_eq!(pools.pools()[4].capacity(), 53);
    Ok(())
}

#[test]
pub fn pool_set_separates_shapes() -> Result<()> {
    let context = framework::make_context();
    let a = context.ubo_sampler_layout()?;
    let b = context.layout(&[(0, DescriptorKind::DynamicUniformBuffer)])?;
    let mut pools = DescriptorPoolSet::new(context.device.clone(), DescriptorSettings::default());

    pools.obtain_set(&a)?;
    pools.obtain_set(&b)?;
    assert_eq!(pools.pools().len(), 2);
    assert_eq!(pools.pools_with_shape(&a.count()).count(), 1);
    assert_eq!(pools.pools_with_shape(&b.count()).count(), 1);
    assert_eq!(pools.pools()[1].capacity(), 10, "A new shape starts at the initial capacity again");
    Ok(())
}

#[test]
pub fn pool_set_prefers_recycled_sets_over_growth() -> Result<()> {
    let context = framework::make_context();
    let layout = context.ubo_sampler_layout()?;
    let settings = DescriptorSettingsBuilder::new().initial_pool_capacity(2).build();
    let mut pools = DescriptorPoolSet::new(context.device.clone(), settings);

    let first = pools.obtain_set(&layout)?;
    pools.obtain_set(&layout)?;
    pools.recycle(&layout.count(), *layout.bitmask(), first);

    assert_eq!(pools.obtain_set(&layout)?, first);
    assert_eq!(pools.pools().len(), 1, "No pool should be created while a recycled set is available");

    pools.obtain_set(&layout)?;
    assert_eq!(pools.pools().len(), 2);
    assert_eq!(pools.pools()[1].capacity(), 3);
    Ok(())
}

#[test]
pub fn pool_set_reports_pool_creation_failure() -> Result<()> {
    let context = framework::make_context();
    let layout = context.ubo_sampler_layout()?;
    let mut pools = DescriptorPoolSet::new(context.device.clone(), DescriptorSettings::default());
    context.recorder.fail_pool_creation(true);

    let error = pools.obtain_set(&layout).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<Error>(),
        Some(Error::DescriptorPoolCreation { capacity: 10, .. })
    ));
    assert!(pools.pools().is_empty());
    Ok(())
}

#[test]
pub fn growth_rounds_up_and_saturates() {
    let settings = DescriptorSettings::default();
    assert_eq!(settings.grow(10), 15);
    assert_eq!(settings.grow(15), 23);
    assert_eq!(settings.grow(1), 2);
    assert_eq!(settings.grow(u16::MAX - 1), u16::MAX);
    assert_eq!(settings.grow(u16::MAX), u16::MAX);

    let flat = DescriptorSettingsBuilder::new().pool_growth_factor(1.0).build();
    assert_eq!(flat.grow(10), 11, "Growth should always add at least one set");
}
