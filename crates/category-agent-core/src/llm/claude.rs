//! Claude CLI Backend
//!
//! `claude --print`にプロンプトを標準入力で渡し、標準出力を回答として受け取る。
//!
//! ```rust,ignore
//! use category_agent_core::llm::{check_claude_cli, execute_claude};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! if check_claude_cli() {
//!     let output = execute_claude(Path::new("."), "Your prompt here", None, Duration::from_secs(60))?;
//!     println!("{}", output);
//! }
//! ```

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{CategoryAgentError, Result};

const CLAUDE_BIN: &str = "claude";

/// Claude CLIが利用可能かチェック
///
/// `claude --version` を実行して成功すればtrue
pub fn check_claude_cli() -> bool {
    Command::new(CLAUDE_BIN)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Claude CLIの存在を確認し、なければエラーを返す
pub fn require_claude_cli() -> Result<()> {
    if !check_claude_cli() {
        return Err(CategoryAgentError::ClaudeNotFound);
    }
    Ok(())
}

fn claude_args(model: Option<&str>) -> Vec<String> {
    let mut args = vec!["--print".to_string()];
    if let Some(model) = model {
        args.push("--model".to_string());
        args.push(model.to_string());
    }
    args
}

/// Claude CLIを実行してプロンプトを処理
///
/// `timeout`を超えた場合はプロセスを終了させてエラーを返す。
/// 非同期ランタイムの内側からは`execute_claude_async`を使うこと。
///
/// # Errors
/// * `ClaudeExecutionFailed` - 起動・書き込み・終了コード・タイムアウトのいずれかが失敗した場合
pub fn execute_claude(
    working_dir: &Path,
    prompt: &str,
    model: Option<&str>,
    timeout: Duration,
) -> Result<String> {
    run_claude(Path::new(CLAUDE_BIN), working_dir, prompt, model, timeout)
}

/// `execute_claude`の非同期版
///
/// `timeout`を超えた場合はプロセスを破棄してエラーを返す。
pub async fn execute_claude_async(
    working_dir: &Path,
    prompt: &str,
    model: Option<&str>,
    timeout: Duration,
) -> Result<String> {
    run_claude_async(Path::new(CLAUDE_BIN), working_dir, prompt, model, timeout).await
}

/// 実行ファイルを指定して同期実行する（current-threadランタイム上で非同期版を回す）
pub(crate) fn run_claude(
    program: &Path,
    working_dir: &Path,
    prompt: &str,
    model: Option<&str>,
    timeout: Duration,
) -> Result<String> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(CategoryAgentError::ClaudeExecutionFailed {
            message: "execute_claude called inside an async runtime; use execute_claude_async"
                .to_string(),
        });
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_claude_async(program, working_dir, prompt, model, timeout))
}

/// 実行ファイルを指定して非同期実行する
pub(crate) async fn run_claude_async(
    program: &Path,
    working_dir: &Path,
    prompt: &str,
    model: Option<&str>,
    timeout: Duration,
) -> Result<String> {
    debug!(
        program = %program.display(),
        prompt_len = prompt.len(),
        ?model,
        timeout_secs = timeout.as_secs(),
        "invoking claude cli"
    );

    let mut child = tokio::process::Command::new(program)
        .args(claude_args(model))
        .current_dir(working_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| CategoryAgentError::ClaudeExecutionFailed {
            message: format!("Failed to spawn claude: {}", e),
        })?;

    let stdin = child.stdin.take();
    let exchange = async move {
        if let Some(mut stdin) = stdin {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| CategoryAgentError::ClaudeExecutionFailed {
                    message: format!("Failed to write prompt: {}", e),
                })?;
        }

        child
            .wait_with_output()
            .await
            .map_err(|e| CategoryAgentError::ClaudeExecutionFailed {
                message: format!("Execution failed: {}", e),
            })
    };

    // 期限切れでfutureが破棄されると、kill_on_dropで子プロセスも終了する
    let output = tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| {
            warn!(timeout_secs = timeout.as_secs(), "claude cli timed out");
            CategoryAgentError::ClaudeExecutionFailed {
                message: format!("Timed out after {}s", timeout.as_secs()),
            }
        })??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CategoryAgentError::ClaudeExecutionFailed {
            message: format!("Claude exited with error: {}", stderr),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claude_args_without_model() {
        assert_eq!(claude_args(None), vec!["--print"]);
    }

    #[test]
    fn test_claude_args_with_model() {
        assert_eq!(
            claude_args(Some("sonnet")),
            vec!["--print", "--model", "sonnet"]
        );
    }

    #[tokio::test]
    async fn test_sync_execution_refuses_inside_runtime() {
        let err = execute_claude(Path::new("."), "prompt", None, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(
            err,
            CategoryAgentError::ClaudeExecutionFailed { ref message } if message.contains("async runtime")
        ));
    }

    #[test]
    fn test_missing_program_is_execution_failure() {
        let err = run_claude(
            Path::new("/nonexistent/claude-cli"),
            Path::new("."),
            "prompt",
            None,
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, CategoryAgentError::ClaudeExecutionFailed { .. }));
    }
}
