use glam::Vec2;
use voidmaw::config::SimConfig;
use voidmaw::context::SimContext;
use voidmaw::sandbox::Executor;

#[test]
fn bundled_volley_script_executes() {
    let source =
        std::fs::read_to_string("assets/scripts/volley.rhai").expect("bundled script present");
    let config = SimConfig::default();
    let mut ctx = SimContext::new(&config);
    let mut executor = Executor::new(&config.sandbox);

    executor
        .execute(&mut ctx, &source, Vec2::new(240.0, 360.0), None, Vec2::new(920.0, 400.0))
        .expect("volley.rhai should execute");
    assert_eq!(ctx.registry.len(), 6, "the opening volley registers six balls");
    assert_eq!(executor.task_count(), 1, "the volley leaves one updater task behind");
}
