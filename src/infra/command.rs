//! 命令执行器
//!
//! 提供统一的外部命令执行接口，支持：
//! - 超时控制（超时后终止子进程）
//! - stdout/stderr 分离
//! - 非零退出码转换为 `CommandFailed`，stderr 原样保留

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error};

use crate::error::{HarnessError, HarnessResult};

/// 命令执行器
pub struct CommandRunner;

impl CommandRunner {
    /// 执行命令并返回原始输出（不检查退出码）
    ///
    /// # Arguments
    /// * `program` - 要执行的程序
    /// * `args` - 命令行参数
    /// * `work_dir` - 工作目录（`None` 表示继承当前目录）
    /// * `timeout` - 超时时间
    pub async fn run_simple<S: AsRef<str>>(
        program: &str,
        args: &[S],
        work_dir: Option<&Path>,
        timeout: Duration,
    ) -> HarnessResult<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args.iter().map(AsRef::as_ref))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = work_dir {
            cmd.current_dir(dir);
        }

        debug!(command = %render_command(program, args), "Running command");

        let child = cmd.output();

        tokio::select! {
            result = child => {
                result.map_err(|source| HarnessError::Spawn {
                    program: program.to_string(),
                    source,
                })
            }
            _ = tokio::time::sleep(timeout) => {
                error!("Command timed out after {:?}", timeout);
                Err(HarnessError::CommandTimeout {
                    command: render_command(program, args),
                    timeout,
                })
            }
        }
    }

    /// 执行命令，非零退出时返回 `CommandFailed`
    ///
    /// 成功时返回 stdout 文本
    pub async fn run_checked<S: AsRef<str>>(
        program: &str,
        args: &[S],
        work_dir: Option<&Path>,
        timeout: Duration,
    ) -> HarnessResult<String> {
        let output = Self::run_simple(program, args, work_dir, timeout).await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            let command = render_command(program, args);
            error!(command = %command, code = ?output.status.code(), %stderr, "Command failed");
            Err(HarnessError::CommandFailed {
                command,
                code: output.status.code(),
                stderr,
            })
        }
    }

    /// 检查可执行文件是否在 PATH 中
    pub fn is_available(program: &str) -> bool {
        if program.contains('/') {
            return Path::new(program).is_file();
        }
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
            .unwrap_or(false)
    }
}

/// 拼接命令行，用于日志和错误信息
pub fn render_command<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(AsRef::as_ref))
        .collect::<Vec<_>>()
        .join(" ")
}
