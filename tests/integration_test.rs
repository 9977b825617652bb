use auto_take_exam::config::Config;
use auto_take_exam::logger;
use auto_take_exam::models::loaders::load_answer_plan;
use auto_take_exam::orchestrator::App;
use std::path::Path;

#[tokio::test]
#[ignore] // 默认忽略，需要真实后端手动运行：cargo test -- --ignored
async fn test_full_exam_run() {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用（需要 EXAM_AUTH_TOKEN 与答题方案文件就位）
    let app = App::initialize(config).await.expect("初始化应用失败");

    app.run().await.expect("答卷应该成功完成");
}

#[tokio::test]
#[ignore]
async fn test_load_answer_plan() {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 测试加载答题方案文件
    let result = load_answer_plan(Path::new(&config.answer_plan_file)).await;

    assert!(result.is_ok(), "应该能够加载答题方案文件");

    let plan = result.unwrap();
    println!("考试 {} / {} 个小节有预置答案", plan.exam_id, plan.sections.len());
}
