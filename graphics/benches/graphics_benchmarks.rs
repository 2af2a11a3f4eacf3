use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::{Mat4, Vec3};

use ripple_core::mesh::create_grid;
use ripple_core::time::FrameTime;
use ripple_graphics::{
    BackendType, CommandList, DeviceCapabilities, FrameResource, FrameResourceDesc, FrameScene,
    FrameScheduler, GraphicsDevice, GraphicsError, Handle, MaterialDesc, MeshGeometry,
    ObjectConstants, PassConstants, RenderItem, RenderItemDesc, RenderLayer, SceneRegistry,
    SchedulerConfig, create_queue,
};

const ITEMS: usize = 64;

struct BenchScene {
    registry: SceneRegistry,
    items: Vec<Handle<RenderItem>>,
    /// Move one item per frame so the dirty path stays busy.
    next_moved: usize,
}

impl BenchScene {
    fn new(device: &std::sync::Arc<GraphicsDevice>, frame_count: usize) -> Self {
        let mut registry = SceneRegistry::new(frame_count);
        let mesh = create_grid(10.0, 10.0, 8, 8);
        let geometry = MeshGeometry::from_mesh(device, "grid", "grid", &mesh).expect("geometry");
        let submesh = *geometry.submesh("grid").expect("submesh");
        let geometry = registry.add_geometry("grid", geometry).expect("add geometry");
        let material = registry
            .add_material("default", MaterialDesc::default())
            .expect("add material");
        let items = (0..ITEMS)
            .map(|i| {
                registry
                    .add_render_item(
                        format!("item{i}"),
                        RenderItemDesc::new(geometry, material, submesh),
                    )
                    .expect("add item")
            })
            .collect();
        Self {
            registry,
            items,
            next_moved: 0,
        }
    }
}

impl FrameScene for BenchScene {
    fn refresh_dirty_state(
        &mut self,
        frame: &mut FrameResource,
        time: &FrameTime,
    ) -> Result<(), GraphicsError> {
        let handle = self.items[self.next_moved % ITEMS];
        self.next_moved += 1;
        let offset = time.total;
        self.registry.update_item(handle, |desc| {
            desc.world = Mat4::from_translation(Vec3::new(offset, 0.0, 0.0));
        })?;

        self.registry.refresh_object_constants(frame)?;
        self.registry.refresh_material_constants(frame)?;
        let pass = PassConstants {
            total_time: time.total,
            delta_time: time.delta,
            ..Default::default()
        };
        frame.pass_constants.copy_data(0, &pass)
    }

    fn record_draws(
        &self,
        frame: &FrameResource,
        list: &mut CommandList,
    ) -> Result<(), GraphicsError> {
        list.set_pass_constants(frame.pass_constants.id(), 0)?;
        self.registry.record_layer(RenderLayer::Opaque, frame, list)?;
        Ok(())
    }
}

fn scheduler(desc: FrameResourceDesc) -> FrameScheduler {
    let device = GraphicsDevice::new(DeviceCapabilities::default());
    let queue = create_queue(BackendType::Dummy).expect("queue");
    FrameScheduler::new(device, queue, SchedulerConfig::default(), desc).expect("scheduler")
}

fn bench_desc() -> FrameResourceDesc {
    FrameResourceDesc {
        pass_count: 1,
        max_objects: ITEMS,
        max_materials: 1,
        max_dynamic_vertices: 0,
    }
}

// ---------------------------------------------------------------------------
// Frame scheduling
// ---------------------------------------------------------------------------

fn bench_render_frame_dummy(c: &mut Criterion) {
    let mut scheduler = scheduler(bench_desc());
    let mut scene = BenchScene::new(scheduler.device(), scheduler.ring().len());
    let mut frame = 0u64;
    c.bench_function("render_frame_64_items_dummy", |b| {
        b.iter(|| {
            let report = scheduler
                .render_frame(&mut scene, &FrameTime::fixed(0.016, frame))
                .expect("frame");
            frame += 1;
            black_box(report);
        });
    });
}

// ---------------------------------------------------------------------------
// Constant uploads
// ---------------------------------------------------------------------------

fn bench_refresh_all_dirty(c: &mut Criterion) {
    let device = GraphicsDevice::new(DeviceCapabilities::default());
    let mut ring = ripple_graphics::FrameRing::new(&device, 3, &bench_desc()).expect("ring");
    c.bench_function("refresh_object_constants_64_dirty", |b| {
        b.iter(|| {
            // A fresh scene starts with every item dirty.
            let mut scene = BenchScene::new(&device, 3);
            let written = scene
                .registry
                .refresh_object_constants(ring.current_mut())
                .expect("refresh");
            black_box(written);
        });
    });
}

fn bench_upload_copy_data(c: &mut Criterion) {
    let device = GraphicsDevice::new(DeviceCapabilities::default());
    let mut buffer = device
        .create_upload_buffer::<ObjectConstants>("objects", 256, true)
        .expect("upload buffer");
    let constants = ObjectConstants::default();
    c.bench_function("upload_copy_data_256_objects", |b| {
        b.iter(|| {
            for i in 0..256 {
                buffer.copy_data(i, black_box(&constants)).expect("copy");
            }
        });
    });
}

criterion_group!(scheduling, bench_render_frame_dummy);
criterion_group!(uploads, bench_refresh_all_dirty, bench_upload_copy_data);
criterion_main!(scheduling, uploads);
