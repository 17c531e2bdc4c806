//! Terraform 驱动
//!
//! 在指定的 root module 目录中执行 `terraform init` / `terraform apply`

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::{HarnessError, HarnessResult};
use crate::infra::command::CommandRunner;

/// 变量文件名
pub const TFVARS_FILE: &str = "terraform.tfvars";

/// Terraform 客户端
#[derive(Clone, Debug)]
pub struct TerraformClient {
    binary: String,
    work_dir: PathBuf,
    timeout: Duration,
}

impl TerraformClient {
    /// 创建客户端
    ///
    /// 可执行文件不存在或目录不存在时返回 `Lookup` 错误
    pub fn new(
        binary: impl Into<String>,
        work_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> HarnessResult<Self> {
        let binary = binary.into();
        let work_dir = work_dir.into();
        if !CommandRunner::is_available(&binary) {
            return Err(HarnessError::lookup(format!(
                "{} executable not found, please install Terraform",
                binary
            )));
        }
        if !work_dir.is_dir() {
            return Err(HarnessError::lookup(format!(
                "terraform work dir {} does not exist",
                work_dir.display()
            )));
        }
        Ok(Self {
            binary,
            work_dir,
            timeout,
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// 写入 `terraform.tfvars`
    pub async fn write_vars(&self, contents: &str) -> HarnessResult<PathBuf> {
        let path = self.work_dir.join(TFVARS_FILE);
        tokio::fs::write(&path, contents).await?;
        info!(path = %path.display(), "Wrote terraform variables");
        Ok(path)
    }

    /// `terraform init`
    pub async fn init(&self) -> HarnessResult<()> {
        self.run(&["init", "-input=false"]).await
    }

    /// `terraform apply`
    pub async fn apply(&self, auto_approve: bool) -> HarnessResult<()> {
        let mut args = vec!["apply", "-input=false"];
        if auto_approve {
            args.push("-auto-approve");
        }
        self.run(&args).await
    }

    async fn run(&self, args: &[&str]) -> HarnessResult<()> {
        info!(
            work_dir = %self.work_dir.display(),
            "Running: {}",
            crate::infra::command::render_command(&self.binary, args)
        );
        CommandRunner::run_checked(&self.binary, args, Some(&self.work_dir), self.timeout)
            .await
            .map(|_| ())
    }
}
