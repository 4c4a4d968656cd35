/// 日志工具模块
///
/// 提供日志初始化以及运行过程中的格式化输出
use anyhow::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::ToolMode;
use crate::orchestrator::BatchReport;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `mode`: 本次运行的处理模式
pub fn init_log_file(log_file_path: &str, mode: ToolMode) -> Result<()> {
    let log_header = format!(
        "{}\n图片处理日志 ({}) - {}\n{}\n\n",
        "=".repeat(60),
        mode,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {} 去除模式", config.mode);
    info!("🤖 模型: {}", config.gemini_model_name);
    info!("📂 输入目录: {}", config.input_folder);
    info!("📦 输出目录: {}", config.output_folder);
    info!("{}", "=".repeat(60));
}

/// 记录文件加载信息
///
/// # 参数
/// - `accepted`: 成功加入队列的图片数量
/// - `dropped`: 超出容量被丢弃的数量
/// - `capacity`: 分区容量上限
pub fn log_files_loaded(accepted: usize, dropped: usize, capacity: usize) {
    info!("✓ 已加入 {} 张图片 (上限 {})", accepted, capacity);
    if dropped > 0 {
        info!("💡 超出容量的 {} 张图片未加入，需要腾出空间后重新上传", dropped);
    }
}

/// 记录批量处理开始
pub fn log_batch_start(mode: ToolMode, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量处理 [{}]: 共 {} 张待处理", mode, total);
    info!("📋 逐张处理，每次只有一个请求在进行");
    info!("{}", "=".repeat(60));
}

/// 记录批量处理完成
pub fn log_batch_complete(mode: ToolMode, report: &BatchReport) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ [{}] 批量处理完成: 成功 {}/{}",
        mode, report.succeeded, report.attempted
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `report`: 批量处理结果
/// - `downloaded`: 已导出的文件数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(report: &BatchReport, downloaded: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.succeeded, report.attempted);
    info!("❌ 失败: {}", report.failed);
    info!("💾 已导出: {}", downloaded);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
