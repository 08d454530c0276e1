// ============================================================================
// 构建流水线：前置校验 → 补全脚手架 → 结构校验 → 打包
// ✅ 只能做：驱动状态机、记录带时间戳的日志、向观察者汇报进度
// ⛔ 禁止：重试失败阶段（任何阶段失败都直接进入 Aborted）
// ============================================================================

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use time::OffsetDateTime;

use crate::config::PipelineSettings;
use crate::models::dtos::{Analysis, BuildResult};
use crate::services::packer::assemble;
use crate::services::scaffolder::synthesize_missing;
use crate::services::validator::{validate_requirements, validate_structure};

// ============================================================================
// 状态与进度
// ============================================================================

/// 构建阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Idle,
    ValidatingRequirements,
    SynthesizingScaffold,
    ValidatingStructure,
    Packaging,
    Completed,
    Aborted,
}

impl BuildStage {
    /// 进入该阶段时汇报的进度百分比
    pub fn progress(&self) -> u8 {
        match self {
            BuildStage::Idle => 5,
            BuildStage::ValidatingRequirements => 10,
            BuildStage::SynthesizingScaffold => 30,
            BuildStage::ValidatingStructure => 50,
            BuildStage::Packaging => 70,
            BuildStage::Completed | BuildStage::Aborted => 100,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildStage::Completed | BuildStage::Aborted)
    }
}

/// 进度观察者：同步调用，百分比 0..=100 + 说明文字
pub trait ProgressObserver {
    fn on_progress(&self, percent: u8, message: &str);
}

impl<F> ProgressObserver for F
where
    F: Fn(u8, &str),
{
    fn on_progress(&self, percent: u8, message: &str) {
        self(percent, message)
    }
}

/// 不关心进度时使用
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_progress(&self, _percent: u8, _message: &str) {}
}

// ============================================================================
// 单次构建
// ============================================================================

/// 一次构建的运行时状态，只在 run_build 内部存在
struct BuildRun<'a> {
    stage: BuildStage,
    result: BuildResult,
    observer: &'a dyn ProgressObserver,
}

impl<'a> BuildRun<'a> {
    fn new(observer: &'a dyn ProgressObserver) -> Self {
        Self {
            stage: BuildStage::Idle,
            result: BuildResult::default(),
            observer,
        }
    }

    /// 追加带时间戳的日志，同时写入 log 门面
    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.result.logs.push(format!("[{}] {}", timestamp(), message));
    }

    /// 观察者 panic 只记录，不影响构建
    fn notify(&self, percent: u8, message: &str) {
        let observer = self.observer;
        if catch_unwind(AssertUnwindSafe(|| observer.on_progress(percent, message))).is_err() {
            log::error!("进度回调发生 panic（{}%：{}），已忽略", percent, message);
        }
    }

    fn enter(&mut self, stage: BuildStage, message: &str) {
        self.stage = stage;
        self.log(message);
        self.notify(stage.progress(), message);
    }

    /// 进入 Aborted：记录错误并发出终止进度
    fn abort(mut self, errors: Vec<String>) -> BuildResult {
        let summary = errors.join("；");
        self.stage = BuildStage::Aborted;
        for error in &errors {
            log::error!("{}", error);
        }
        self.result.errors.extend(errors);
        self.result.success = false;
        self.result.apk_path = None;
        self.result.apk_size = None;
        self.log(format!("构建中止：{}", summary));
        self.notify(
            BuildStage::Aborted.progress(),
            &format!("构建失败：{}", summary),
        );
        self.result
    }
}

/// 当前时间 HH:MM:SS，本地时区不可用时退回 UTC
fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second())
}

/// 执行一次完整构建
///
/// 按 Idle → ValidatingRequirements → SynthesizingScaffold → ValidatingStructure
/// → Packaging → Completed 推进，任一阶段失败进入 Aborted。
/// 进度节点：5 开始、10 前置校验、30 脚手架、50 结构校验、70 打包、100 结束。
/// 失败时同样发出 100 的终止信号，携带失败原因。
pub fn run_build(
    project_path: &Path,
    analysis: &Analysis,
    settings: &PipelineSettings,
    observer: &dyn ProgressObserver,
) -> BuildResult {
    let mut run = BuildRun::new(observer);
    run.log(format!(
        "开始构建 {}（{}）",
        project_path.display(),
        analysis.framework
    ));
    run.notify(BuildStage::Idle.progress(), "开始构建");

    if !project_path.is_dir() {
        return run.abort(vec![format!("项目目录不存在：{}", project_path.display())]);
    }
    if let Err(e) = settings.validate() {
        return run.abort(e.into_messages());
    }

    // 1. 前置校验：失败时不写入任何文件
    run.enter(BuildStage::ValidatingRequirements, "校验必需文件");
    if let Err(e) = validate_requirements(&analysis.build_config) {
        return run.abort(e.into_messages());
    }

    // 2. 补全缺失的脚手架文件
    run.enter(BuildStage::SynthesizingScaffold, "补全缺失的项目文件");
    match synthesize_missing(project_path, analysis) {
        Ok(written) if written.is_empty() => run.log("没有需要补全的文件"),
        Ok(written) => {
            for path in written {
                run.log(format!("已生成 {}", path));
            }
        }
        Err(e) => return run.abort(e.into_messages()),
    }

    // 3. 结构校验：重新检查磁盘
    run.enter(BuildStage::ValidatingStructure, "校验项目结构");
    if let Err(e) = validate_structure(project_path, analysis.framework) {
        return run.abort(e.into_messages());
    }

    // 4. 打包
    run.enter(BuildStage::Packaging, "打包 APK");
    let apk = match assemble(project_path, analysis, settings) {
        Ok(apk) => apk,
        Err(e) => return run.abort(e.into_messages()),
    };
    for note in &apk.notes {
        run.log(note.clone());
    }
    if apk.fallback {
        run.log("已写出回退包（仅包含项目根目录文件）");
    }

    let apk_path = apk.path.to_string_lossy().to_string();
    run.result.success = true;
    run.result.apk_path = Some(apk_path.clone());
    run.result.apk_size = Some(apk.size);
    run.enter(
        BuildStage::Completed,
        &format!("构建完成：{}（{} 字节）", apk_path, apk.size),
    );
    debug_assert!(run.stage.is_terminal());
    run.result
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dtos::{BuildConfig, Framework};
    use crate::services::analyzer::analyze_project;
    use std::fs;
    use std::io::Read;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn read_manifest(apk_path: &str) -> String {
        let file = fs::File::open(apk_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut entry = archive.by_name("AndroidManifest.xml").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_react_native_without_package_json_aborts_before_writing() {
        let dir = TempDir::new().unwrap();
        let settings = PipelineSettings::default();
        let mut analysis = analyze_project(dir.path(), &settings).unwrap();
        analysis.framework = Framework::ReactNative;
        analysis.build_config = BuildConfig::default_for(Framework::ReactNative);
        analysis.missing_files = vec!["package.json".to_string(), "index.js".to_string()];

        let progress = Mutex::new(Vec::new());
        let observer = |p: u8, m: &str| progress.lock().unwrap().push((p, m.to_string()));
        let result = run_build(dir.path(), &analysis, &settings, &observer);

        assert!(!result.success);
        assert!(result.apk_path.is_none());
        assert!(result.errors[0].contains("package.json"));
        // 没有写入任何文件
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        let progress = progress.into_inner().unwrap();
        let percents: Vec<u8> = progress.iter().map(|(p, _)| *p).collect();
        assert_eq!(percents, vec![5, 10, 100]);
        assert!(progress[2].1.contains("package.json"));
    }

    #[test]
    fn test_generic_index_html_builds() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("index.html"),
            "<html><body>hi</body></html>",
        )
        .unwrap();
        let settings = PipelineSettings::default();
        let analysis = analyze_project(dir.path(), &settings).unwrap();

        let progress = Mutex::new(Vec::new());
        let observer = |p: u8, _: &str| progress.lock().unwrap().push(p);
        let result = run_build(dir.path(), &analysis, &settings, &observer);

        assert!(result.success, "{:?}", result.errors);
        assert!(result.errors.is_empty());
        assert!(result.apk_size.unwrap() > 0);
        let apk_path = result.apk_path.unwrap();
        assert!(read_manifest(&apk_path).contains(&analysis.build_config.meta().app_name));
        assert_eq!(progress.into_inner().unwrap(), vec![5, 10, 30, 50, 70, 100]);
        assert!(result.logs.iter().all(|l| l.starts_with('[')));
    }

    #[test]
    fn test_flutter_project_scaffolds_then_builds() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("pubspec.yaml"),
            "name: shop_app\nversion: 2.1.0+7\n",
        )
        .unwrap();
        let settings = PipelineSettings::default();
        let analysis = analyze_project(dir.path(), &settings).unwrap();
        assert!(analysis.missing_files.contains(&"lib/main.dart".to_string()));

        let result = run_build(dir.path(), &analysis, &settings, &NoopProgress);
        assert!(result.success, "{:?}", result.errors);
        assert!(dir.path().join("lib/main.dart").is_file());
        let manifest = read_manifest(result.apk_path.as_deref().unwrap());
        assert!(manifest.contains("android:versionName=\"2.1.0\""));
        assert!(manifest.contains("android:versionCode=\"7\""));
    }

    #[test]
    fn test_asset_deleted_after_analysis_still_succeeds() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html/>").unwrap();
        fs::write(dir.path().join("index.js"), "// app").unwrap();
        let settings = PipelineSettings::default();
        let analysis = analyze_project(dir.path(), &settings).unwrap();

        fs::remove_file(dir.path().join("index.html")).unwrap();
        fs::remove_file(dir.path().join("index.js")).unwrap();
        let result = run_build(dir.path(), &analysis, &settings, &NoopProgress);
        assert!(result.success, "{:?}", result.errors);
    }

    #[test]
    fn test_missing_root_aborts() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let analysis = Analysis::failed(Vec::new());
        let result = run_build(
            &missing,
            &analysis,
            &PipelineSettings::default(),
            &NoopProgress,
        );
        assert!(!result.success);
        assert!(!missing.exists());
    }

    #[test]
    fn test_panicking_observer_does_not_abort() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html/>").unwrap();
        let settings = PipelineSettings::default();
        let analysis = analyze_project(dir.path(), &settings).unwrap();

        let observer = |p: u8, _: &str| {
            if p == 30 {
                panic!("observer failure");
            }
        };
        let result = run_build(dir.path(), &analysis, &settings, &observer);
        assert!(result.success, "{:?}", result.errors);
    }

    #[test]
    fn test_concurrent_builds_stay_separate() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("index.html"), "<title>first</title>").unwrap();
        fs::create_dir_all(second.path().join("www")).unwrap();
        fs::write(
            second.path().join("config.xml"),
            "<widget><name>Second</name></widget>",
        )
        .unwrap();
        fs::write(
            second.path().join("www/index.html"),
            "<title>second</title>",
        )
        .unwrap();

        let settings = PipelineSettings::default();
        let build = |root: &Path| {
            let analysis = analyze_project(root, &settings).unwrap();
            run_build(root, &analysis, &settings, &NoopProgress)
        };
        let (a, b) = std::thread::scope(|s| {
            let ha = s.spawn(|| build(first.path()));
            let hb = s.spawn(|| build(second.path()));
            (ha.join().unwrap(), hb.join().unwrap())
        });

        assert!(a.success && b.success);
        let path_a = a.apk_path.unwrap();
        let path_b = b.apk_path.unwrap();
        assert!(Path::new(&path_a).starts_with(first.path()));
        assert!(Path::new(&path_b).starts_with(second.path()));
        assert!(read_manifest(&path_b).contains("android:label=\"Second\""));
        assert!(!read_manifest(&path_a).contains("Second"));
    }
}
