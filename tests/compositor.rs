use std::sync::Arc;

use glam::{uvec2, vec2, Vec2};
use nameplate::{
    thread_pool::Task, BasicThreadPool, Compositor, DirectorySink, InlinePool, MemoryAssets,
    MemorySink, RenderOutcome, RenderState, ThreadPool, Variant, ViewportState,
};
use parking_lot::Mutex;

fn background_png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_fn(width, height, |x, _| {
        image::Rgb([30, 60 + (x % 2) as u8, 120])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .unwrap();
    bytes
}

fn assets_for(variant: &Variant) -> Arc<MemoryAssets> {
    let assets = Arc::new(MemoryAssets::new());
    assets.insert(variant.background.clone(), background_png(400, 100));
    assets
}

fn compositor(variant: Variant) -> (Compositor, Arc<MemoryAssets>) {
    let assets = assets_for(&variant);
    let compositor = Compositor::builder(variant)
        .shared_loader(assets.clone())
        .thread_pool(InlinePool)
        .build()
        .unwrap();
    (compositor, assets)
}

fn render(variant: Variant, text: &str, viewport: ViewportState) -> Vec<u8> {
    let (mut compositor, _) = compositor(variant);
    let ticket = compositor.render(text, viewport);
    assert_eq!(compositor.wait(), Some(RenderOutcome::Rendered(ticket)));
    compositor.pixels().unwrap()
}

/// Center of the pixels that differ between two renders, in physical pixels.
fn ink_center(pixels: &[u8], blank: &[u8], width: u32) -> Option<Vec2> {
    let mut sum = Vec2::ZERO;
    let mut count = 0.;
    for (i, (a, b)) in pixels.chunks(4).zip(blank.chunks(4)).enumerate() {
        if a != b {
            let i = i as u32;
            sum += vec2((i % width) as f32, (i / width) as f32);
            count += 1.;
        }
    }
    (count > 0.).then(|| sum / count)
}

const DESKTOP: ViewportState = ViewportState {
    display_width: 800.,
    display_height: 200.,
};

#[test]
fn latin_names_are_drawn_upper_case() {
    let lower = render(Variant::jersey_banner(), "sara", DESKTOP);
    let upper = render(Variant::jersey_banner(), "SARA", DESKTOP);
    assert!(lower == upper);
}

#[test]
fn arabic_names_are_drawn() {
    let blank = render(Variant::jersey_banner(), "", DESKTOP);
    let arabic = render(Variant::jersey_banner(), "سارة", DESKTOP);
    let latin = render(Variant::jersey_banner(), "SARA", DESKTOP);

    assert!(ink_center(&arabic, &blank, 1600).is_some());
    assert!(arabic != latin);
}

#[test]
fn text_is_centered_on_the_anchor() {
    let blank = render(Variant::jersey_banner(), "", DESKTOP);
    let text = render(Variant::jersey_banner(), "OMAR", DESKTOP);
    let center = ink_center(&text, &blank, 1600).unwrap();

    // anchor (230, 100) logical at 2x density
    assert!((center.x - 460.).abs() < 25., "{:?}", center);
    assert!((center.y - 200.).abs() < 25., "{:?}", center);
}

#[test]
fn renders_are_deterministic() {
    let a = render(Variant::jersey_banner(), "Layla", DESKTOP);
    let b = render(Variant::jersey_banner(), "Layla", DESKTOP);
    assert!(a == b);
}

#[test]
fn mobile_viewports_nudge_the_text_down() {
    let mobile = ViewportState::new(360., 257.);
    let desktop = ViewportState::new(800., 571.);

    let blank = render(Variant::holiday_card(), "", desktop);
    let on_desktop = render(Variant::holiday_card(), "NOOR", desktop);
    let on_mobile = render(Variant::holiday_card(), "NOOR", mobile);

    let desktop_center = ink_center(&on_desktop, &blank, 400).unwrap();
    let mobile_center = ink_center(&on_mobile, &blank, 400).unwrap();
    // 3% of a 100 pixel tall surface
    let nudge = mobile_center.y - desktop_center.y;
    assert!((nudge - 3.).abs() < 0.5, "{}", nudge);
    assert!((mobile_center.x - desktop_center.x).abs() < 0.5);
}

#[test]
fn download_before_render_does_nothing() {
    let (compositor, _) = compositor(Variant::jersey_banner());
    let mut sink = MemorySink::default();
    assert!(!compositor.download(&mut sink).unwrap());
    assert!(sink.downloads.is_empty());
    assert!(compositor.export_png().unwrap().is_none());
}

#[test]
fn download_writes_the_variant_filename() {
    let (mut compositor, _) = compositor(Variant::jersey_banner());
    compositor.render_text("sara");
    compositor.wait();

    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path());
    assert!(compositor.download(&mut sink).unwrap());

    let path = dir.path().join("falcon-header.png");
    assert_eq!(sink.saved(), &[path.clone()]);
    let written = image::open(&path).unwrap().into_rgba8();
    assert_eq!(written.dimensions(), (1600, 400));
    assert_eq!(written.into_raw(), compositor.pixels().unwrap());
}

#[test]
fn data_url_contains_png() {
    let (mut compositor, _) = compositor(Variant::holiday_card());
    compositor.render_text("noor");
    compositor.wait();

    let export = compositor.export_png().unwrap().unwrap();
    assert_eq!(export.filename(), "greeting-card.png");
    assert!(export.to_data_url().starts_with("data:image/png;base64,iVBORw0KGgo"));
}

#[test]
fn failed_load_keeps_previous_render() {
    let (mut compositor, assets) = compositor(Variant::jersey_banner());
    compositor.render_text("sara");
    compositor.wait();
    let before = compositor.pixels().unwrap();

    assets.remove(&compositor.variant().background);
    let ticket = compositor.render_text("omar");
    assert_eq!(compositor.wait(), Some(RenderOutcome::Failed(ticket)));
    assert_eq!(compositor.state(), RenderState::Rendered);
    assert!(compositor.pixels().unwrap() == before);
}

#[test]
fn undecodable_background_fails() {
    let variant = Variant::jersey_banner();
    let assets = MemoryAssets::new();
    assets.insert(variant.background.clone(), b"not an image".to_vec());
    let mut compositor = Compositor::builder(variant)
        .loader(assets)
        .thread_pool(InlinePool)
        .build()
        .unwrap();

    let ticket = compositor.render_text("sara");
    assert_eq!(compositor.wait(), Some(RenderOutcome::Failed(ticket)));
    assert!(compositor.pixels().is_none());
}

/// Holds spawned tasks until the test runs them.
#[derive(Clone, Default)]
struct ManualPool {
    tasks: Arc<Mutex<Vec<Task>>>,
}

impl ManualPool {
    fn take(&self) -> Vec<Task> {
        std::mem::take(&mut *self.tasks.lock())
    }
}

impl ThreadPool for ManualPool {
    fn spawn(&self, task: Task) {
        self.tasks.lock().push(task);
    }
}

#[test]
fn superseded_render_is_discarded() {
    let variant = Variant::jersey_banner();
    let pool = ManualPool::default();
    let mut compositor = Compositor::builder(variant.clone())
        .shared_loader(assets_for(&variant))
        .thread_pool(pool.clone())
        .build()
        .unwrap();

    let first = compositor.render("FIRST", DESKTOP);
    let second = compositor.render("second", DESKTOP);
    assert!(first < second);
    assert_eq!(compositor.state(), RenderState::Loading { generation: 2 });

    let mut tasks = pool.take();
    assert_eq!(tasks.len(), 2);
    let stale = tasks.remove(0);

    // the newer load finishes first
    (tasks.remove(0))();
    assert_eq!(compositor.wait(), Some(RenderOutcome::Rendered(second)));
    let latest = compositor.pixels().unwrap();

    stale();
    assert_eq!(compositor.poll(), None);
    assert_eq!(compositor.stale_completions(), 1);
    assert_eq!(compositor.state(), RenderState::Rendered);
    assert!(compositor.pixels().unwrap() == latest);
    assert!(latest == render(variant, "second", DESKTOP));
}

#[test]
fn overlapping_renders_on_worker_threads_apply_the_latest() {
    let variant = Variant::jersey_banner();
    let mut compositor = Compositor::builder(variant.clone())
        .shared_loader(assets_for(&variant))
        .thread_pool(BasicThreadPool::new(1))
        .build()
        .unwrap();

    compositor.render("first", DESKTOP);
    let second = compositor.render("second", DESKTOP);
    assert_eq!(compositor.wait(), Some(RenderOutcome::Rendered(second)));
    assert_eq!(compositor.stale_completions(), 1);
    assert!(compositor.pixels().unwrap() == render(variant, "second", DESKTOP));
}

#[test]
fn resize_keeps_surface_pixels() {
    let (mut compositor, _) = compositor(Variant::jersey_banner());
    compositor.render("sara", DESKTOP);
    compositor.wait();
    let before = compositor.pixels().unwrap();

    let viewport = compositor.resize(vec2(375., 667.));
    assert!((viewport.display_width - 337.5).abs() < 1e-3);
    assert!((viewport.display_height - 84.375).abs() < 1e-3);

    let info = compositor.surface_info().unwrap();
    assert_eq!(info.display_size(), viewport.size());
    assert_eq!(info.physical_size(), uvec2(1600, 400));
    assert!(compositor.pixels().unwrap() == before);
}

#[test]
fn resize_during_load_is_kept() {
    let variant = Variant::jersey_banner();
    let pool = ManualPool::default();
    let mut compositor = Compositor::builder(variant.clone())
        .shared_loader(assets_for(&variant))
        .thread_pool(pool.clone())
        .window_size(vec2(1920., 1080.))
        .build()
        .unwrap();
    assert_eq!(compositor.viewport(), ViewportState::new(800., 200.));

    compositor.render_text("sara");
    let resized = compositor.resize(vec2(400., 800.));
    assert_eq!(resized, ViewportState::new(360., 90.));

    for task in pool.take() {
        task();
    }
    compositor.wait();

    assert_eq!(compositor.viewport(), resized);
    let info = compositor.surface_info().unwrap();
    assert_eq!(info.display_size(), resized.size());
    assert_eq!(info.physical_size(), uvec2(1600, 400));
}
