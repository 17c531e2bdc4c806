//! 测试替身：内存 Juju 实现和临时脚本目录

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::action::ActionResult;
use crate::domain::secret::SecretMeta;
use crate::domain::status::StatusSnapshot;
use crate::error::{HarnessError, HarnessResult};
use crate::infra::juju::{DeploySpec, Juju};

type StatusFn = Box<dyn Fn() -> HarnessResult<StatusSnapshot> + Send + Sync>;
type SecretsFn = Box<dyn Fn() -> HarnessResult<BTreeMap<String, SecretMeta>> + Send + Sync>;
type RevealFn =
    Box<dyn Fn(&str) -> HarnessResult<Option<BTreeMap<String, String>>> + Send + Sync>;
type ActionFn = Box<dyn Fn(&str, &str) -> HarnessResult<ActionResult> + Send + Sync>;

/// 可编排的 Juju 替身
///
/// 未设置的查询返回空结果；写操作只记录到 `calls`
#[derive(Default)]
pub struct FakeJuju {
    status: Option<StatusFn>,
    secrets: Option<SecretsFn>,
    reveal: Option<RevealFn>,
    action: Option<ActionFn>,
    /// 以该前缀开头的写操作返回 `CommandFailed`
    fail_prefix: Option<String>,
    calls: Mutex<Vec<String>>,
    status_calls: AtomicU32,
}

impl FakeJuju {
    pub fn with_status(
        mut self,
        f: impl Fn() -> HarnessResult<StatusSnapshot> + Send + Sync + 'static,
    ) -> Self {
        self.status = Some(Box::new(f));
        self
    }

    pub fn with_secrets(
        mut self,
        f: impl Fn() -> HarnessResult<BTreeMap<String, SecretMeta>> + Send + Sync + 'static,
    ) -> Self {
        self.secrets = Some(Box::new(f));
        self
    }

    pub fn with_reveal(
        mut self,
        f: impl Fn(&str) -> HarnessResult<Option<BTreeMap<String, String>>> + Send + Sync + 'static,
    ) -> Self {
        self.reveal = Some(Box::new(f));
        self
    }

    pub fn with_action(
        mut self,
        f: impl Fn(&str, &str) -> HarnessResult<ActionResult> + Send + Sync + 'static,
    ) -> Self {
        self.action = Some(Box::new(f));
        self
    }

    pub fn failing_on(mut self, prefix: &str) -> Self {
        self.fail_prefix = Some(prefix.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) -> HarnessResult<()> {
        let failed = self
            .fail_prefix
            .as_deref()
            .map(|prefix| call.starts_with(prefix))
            .unwrap_or(false);
        self.calls.lock().unwrap().push(call.clone());
        if failed {
            return Err(HarnessError::CommandFailed {
                command: format!("juju {}", call),
                code: Some(1),
                stderr: format!("ERROR cannot {}\n", call),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Juju for FakeJuju {
    async fn add_model(&self, model: &str) -> HarnessResult<()> {
        self.record(format!("add-model {}", model))
    }

    async fn deploy(&self, model: &str, spec: &DeploySpec) -> HarnessResult<()> {
        self.record(format!("deploy {} {} {}", model, spec.entity, spec.application_name()))
    }

    async fn integrate(&self, model: &str, first: &str, second: &str) -> HarnessResult<()> {
        self.record(format!("integrate {} {} {}", model, first, second))
    }

    async fn offer(&self, model: &str, endpoint: &str, offer_name: &str) -> HarnessResult<()> {
        self.record(format!("offer {} {} {}", model, endpoint, offer_name))
    }

    async fn consume(&self, model: &str, offer_url: &str) -> HarnessResult<()> {
        self.record(format!("consume {} {}", model, offer_url))
    }

    async fn status(&self, _model: &str) -> HarnessResult<StatusSnapshot> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        match self.status {
            Some(ref f) => f(),
            None => Ok(StatusSnapshot::new(BTreeMap::new())),
        }
    }

    async fn secrets(&self, _model: &str) -> HarnessResult<BTreeMap<String, SecretMeta>> {
        match self.secrets {
            Some(ref f) => f(),
            None => Ok(BTreeMap::new()),
        }
    }

    async fn reveal_secret(
        &self,
        _model: &str,
        secret_id: &str,
    ) -> HarnessResult<Option<BTreeMap<String, String>>> {
        match self.reveal {
            Some(ref f) => f(secret_id),
            None => Ok(None),
        }
    }

    async fn run_action(
        &self,
        model: &str,
        unit: &str,
        action: &str,
        _params: &BTreeMap<String, String>,
        _wait: Duration,
    ) -> HarnessResult<ActionResult> {
        self.record(format!("run {} {} {}", model, unit, action))?;
        match self.action {
            Some(ref f) => f(unit, action),
            None => Err(HarnessError::lookup(format!("no results for {} on {}", action, unit))),
        }
    }

    async fn set_model_config(
        &self,
        model: &str,
        config: &BTreeMap<String, String>,
    ) -> HarnessResult<()> {
        self.record(format!("model-config {} {:?}", model, config))
    }

    async fn set_config(
        &self,
        model: &str,
        application: &str,
        config: &BTreeMap<String, String>,
    ) -> HarnessResult<()> {
        self.record(format!("config {} {} {:?}", model, application, config))
    }
}

/// 每个测试独占的临时目录，drop 时连同内容一起删除
pub struct ScriptDir {
    path: PathBuf,
}

impl ScriptDir {
    pub fn new(name: &str) -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        let path = std::env::temp_dir().join(format!(
            "sdcore-e2e-{}-{}-{}",
            name,
            std::process::id(),
            NEXT.fetch_add(1, Ordering::SeqCst)
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入可执行的 sh 脚本
    ///
    /// 文件由子进程 `sh` 写入，本进程从不持有它的可写 fd，
    /// 其他测试线程 fork 时不会让随后的 exec 撞上 ETXTBSY
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path.join(name);
        let mut child = Command::new("sh")
            .arg("-c")
            .arg("cat > \"$0\" && chmod 755 \"$0\"")
            .arg(&path)
            .stdin(Stdio::piped())
            .spawn()
            .unwrap();
        {
            let mut stdin = child.stdin.take().unwrap();
            write!(stdin, "#!/bin/sh\n{}\n", body).unwrap();
        }
        assert!(child.wait().unwrap().success());
        path
    }
}

impl Drop for ScriptDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_runs_while_other_threads_spawn() {
        // 其他线程持续 fork 子进程，脚本写完后应能立即执行
        let stop = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let spawner = {
            let stop = stop.clone();
            std::thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let _ = Command::new("true").status();
                }
            })
        };

        let dir = ScriptDir::new("script-busy");
        for i in 0..20 {
            let script = dir.script(&format!("s{}", i), &format!("echo {}", i));
            let output = Command::new(&script).output().unwrap();
            assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{}\n", i));
        }

        stop.store(true, Ordering::SeqCst);
        spawner.join().unwrap();
    }

    #[test]
    fn test_dir_removed_on_panic() {
        let path = std::sync::Arc::new(Mutex::new(PathBuf::new()));
        let seen = path.clone();
        let result = std::panic::catch_unwind(move || {
            let dir = ScriptDir::new("script-panic");
            dir.script("juju", "exit 0");
            *seen.lock().unwrap() = dir.path().to_path_buf();
            panic!("assertion failed inside a test");
        });

        assert!(result.is_err());
        let path = path.lock().unwrap().clone();
        assert!(!path.as_os_str().is_empty());
        assert!(!path.exists());
    }
}
